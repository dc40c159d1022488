//! Authenticated client for the Birdr API.
//!
//! A [`Client`] holds at most one credential. Every operation other than
//! [`Client::login`] requires it, attaches it through the configured
//! [`AuthScheme`], and maps the HTTP outcome into [`ClientError`].

use std::fmt;
use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::auth::{scheme_for, AuthScheme};
use crate::config::{ClientConfig, ConfigError};
use crate::error::{ClientError, Result};
use crate::media::resolve_avatar;
use crate::models::{
    Comment, ContentBody, Credentials, Message, Post, ProfileUpdate, ReportKind, ReportRequest,
    ReportTarget, User,
};

/// Birdr API client.
///
/// Cloning is cheap; clones share the HTTP connection pool and the stored
/// credential. `login`, `get_or_create_credential` and `logout` hold the
/// credential's write lock for their whole exchange, so concurrent calls on
/// clones observe either the old or the new credential, never a half-finished
/// login.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_url: String,
    scheme: Arc<dyn AuthScheme>,
    credential: Arc<RwLock<Option<String>>>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_url", &self.api_url)
            .field("scheme", &self.scheme.name())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client using the auth scheme named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_scheme(config, scheme_for(config.auth_scheme))
    }

    /// Create a client with a custom auth scheme.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn with_scheme(config: &ClientConfig, scheme: Arc<dyn AuthScheme>) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            api_url: config.base_url().to_string(),
            scheme,
            credential: Arc::new(RwLock::new(None)),
        })
    }

    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Log in and remember the resulting credential.
    ///
    /// With the bearer scheme `credentials` must be a token; the token is
    /// checked against `GET /users/@me`. With the session scheme a password
    /// login is exchanged at `POST /auth/login` for a session token first.
    ///
    /// # Errors
    ///
    /// `AlreadyAuthenticated` if a credential is already held (no request is
    /// made), `InvalidArgument` if the credentials do not suit the scheme,
    /// `AuthenticationFailed` if the service rejects them. When a password
    /// login succeeds but the user lookup fails, the new session is logged
    /// out again before the error is returned.
    pub async fn login(&self, credentials: Credentials) -> Result<User> {
        let mut credential = self.credential.write().await;
        if credential.is_some() {
            return Err(ClientError::AlreadyAuthenticated);
        }

        let (token, user) = self.authenticate(&credentials).await?;
        *credential = Some(token);

        info!(username = %user.username, scheme = self.scheme.name(), "Logged in");
        Ok(user)
    }

    pub async fn is_logged_in(&self) -> bool {
        self.credential.read().await.is_some()
    }

    /// Return the stored credential, logging in with `identifier` and
    /// `password` first if none is held.
    ///
    /// # Errors
    ///
    /// Same as [`Client::login`] when a login is needed.
    pub async fn get_or_create_credential(&self, identifier: &str, password: &str) -> Result<String> {
        let mut credential = self.credential.write().await;
        if let Some(token) = credential.as_ref() {
            return Ok(token.clone());
        }

        let (token, user) = self
            .authenticate(&Credentials::password(identifier, password))
            .await?;
        *credential = Some(token.clone());

        info!(username = %user.username, scheme = self.scheme.name(), "Logged in");
        Ok(token)
    }

    /// Fetch the logged-in user's profile.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a credential, `RemoteRequestFailed` if the
    /// request fails.
    pub async fn current_user(&self) -> Result<User> {
        self.send(Method::GET, "/users/@me", None::<&()>).await
    }

    /// Publish a new post.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a credential, `RemoteRequestFailed` if the
    /// request fails.
    pub async fn send_post(&self, content: &str) -> Result<Post> {
        self.send(Method::PUT, "/posts", Some(&ContentBody { content }))
            .await
    }

    /// Comment on a post.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a credential, `RemoteRequestFailed` if the
    /// request fails.
    pub async fn send_comment(&self, post_id: &str, content: &str) -> Result<Comment> {
        let path = format!("/posts/{}/comments", urlencoding::encode(post_id));
        self.send(Method::PUT, &path, Some(&ContentBody { content }))
            .await
    }

    /// Delete a post. Deleting an unknown id surfaces the service's error.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a credential, `RemoteRequestFailed` if the
    /// request fails.
    pub async fn delete_post(&self, post_id: &str) -> Result<Message> {
        let path = format!("/posts/{}", urlencoding::encode(post_id));
        self.send_ack(Method::DELETE, &path, None::<&()>).await
    }

    /// Delete a comment. Deleting an unknown id surfaces the service's error.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a credential, `RemoteRequestFailed` if the
    /// request fails.
    pub async fn delete_comment(&self, comment_id: &str) -> Result<Message> {
        let path = format!("/comments/{}", urlencoding::encode(comment_id));
        self.send_ack(Method::DELETE, &path, None::<&()>).await
    }

    /// Follow a user. Usernames are case-insensitive and sent lower-cased.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a credential, `RemoteRequestFailed` if the
    /// request fails.
    pub async fn follow(&self, username: &str) -> Result<Message> {
        self.send_ack(Method::PUT, &follow_path(username), None::<&()>)
            .await
    }

    /// Unfollow a user. Usernames are case-insensitive and sent lower-cased.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a credential, `RemoteRequestFailed` if the
    /// request fails.
    pub async fn unfollow(&self, username: &str) -> Result<Message> {
        self.send_ack(Method::DELETE, &follow_path(username), None::<&()>)
            .await
    }

    /// Report a post or comment. `kind` is `"post"` or `"comment"`.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a credential, `InvalidArgument` for any
    /// other `kind` (before a request is made), `RemoteRequestFailed` if the
    /// request fails.
    pub async fn report(
        &self,
        target_id: &str,
        content: &str,
        kind: &str,
        author_id: &str,
    ) -> Result<Message> {
        let token = self.require_credential().await?;
        let kind: ReportKind = kind.parse()?;

        let body = ReportRequest {
            content,
            author_id,
            target: ReportTarget::new(kind, target_id),
        };
        self.execute_ack(Method::POST, "/reports", Some(&body), &token)
            .await
    }

    /// Update profile fields. Only the fields set in `update` are sent.
    ///
    /// The username is lower-cased. The avatar, a URL or a local file path,
    /// is downloaded or read and sent as a base64 data URI.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a credential, `InvalidArgument` if no field
    /// is set, `UnsupportedMediaType` or `InvalidArgument` if the avatar
    /// cannot be used (no profile request is made in either case),
    /// `RemoteRequestFailed` if a request fails.
    pub async fn update_user_info(&self, mut update: ProfileUpdate) -> Result<User> {
        let token = self.require_credential().await?;
        if update.is_empty() {
            return Err(ClientError::InvalidArgument(
                "profile update has no fields set".to_string(),
            ));
        }

        if let Some(username) = update.username.as_mut() {
            *username = username.to_lowercase();
        }
        if let Some(avatar) = update.avatar.take() {
            update.avatar = Some(resolve_avatar(&self.http, &avatar).await?);
        }

        self.execute(Method::PATCH, "/users/@me", Some(&update), &token)
            .await
    }

    /// Change only the username.
    ///
    /// # Errors
    ///
    /// See [`Client::update_user_info`].
    pub async fn change_username(&self, username: &str) -> Result<User> {
        self.update_user_info(ProfileUpdate::default().username(username))
            .await
    }

    /// Change only the display name.
    ///
    /// # Errors
    ///
    /// See [`Client::update_user_info`].
    pub async fn change_display_name(&self, display_name: &str) -> Result<User> {
        self.update_user_info(ProfileUpdate::default().display_name(display_name))
            .await
    }

    /// Change only the avatar.
    ///
    /// # Errors
    ///
    /// See [`Client::update_user_info`].
    pub async fn change_avatar(&self, avatar: &str) -> Result<User> {
        self.update_user_info(ProfileUpdate::default().avatar(avatar))
            .await
    }

    /// Invalidate the credential on the service and forget it locally.
    ///
    /// The local credential is cleared once the service answers with any 2xx
    /// status, with or without a body; a failed logout leaves the client
    /// logged in.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` without a credential, `RemoteRequestFailed` if the
    /// request fails.
    #[doc(alias = "kill_token")]
    pub async fn logout(&self) -> Result<Message> {
        let mut credential = self.credential.write().await;
        let token = credential.clone().ok_or(ClientError::NotAuthenticated)?;

        let message = self
            .execute_ack(Method::POST, "/auth/logout", None::<&()>, &token)
            .await?;
        *credential = None;

        info!(scheme = self.scheme.name(), "Logged out");
        Ok(message)
    }

    /// Run the scheme's login and resolve the user the new token belongs to.
    async fn authenticate(&self, credentials: &Credentials) -> Result<(String, User)> {
        let token = self
            .scheme
            .authenticate(&self.http, &self.api_url, credentials)
            .await
            .map_err(|e| {
                if matches!(e, ClientError::RemoteRequestFailed { .. }) {
                    ClientError::AuthenticationFailed(e.to_string())
                } else {
                    e
                }
            })?;

        match self
            .execute::<(), User>(Method::GET, "/users/@me", None, &token)
            .await
        {
            Ok(user) => Ok((token, user)),
            Err(e) => {
                warn!(scheme = self.scheme.name(), error = %e, "Login rejected");
                // A password login just opened a session; don't leave it live.
                if matches!(credentials, Credentials::Password { .. }) {
                    self.end_session_quietly(&token).await;
                }
                Err(ClientError::AuthenticationFailed(e.to_string()))
            }
        }
    }

    async fn end_session_quietly(&self, token: &str) {
        if let Err(e) = self
            .execute_ack(Method::POST, "/auth/logout", None::<&()>, token)
            .await
        {
            warn!(scheme = self.scheme.name(), error = %e, "Failed to end abandoned session");
        }
    }

    async fn require_credential(&self) -> Result<String> {
        self.credential
            .read()
            .await
            .clone()
            .ok_or(ClientError::NotAuthenticated)
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.require_credential().await?;
        self.execute(method, path, body, &token).await
    }

    /// Send a request and decode the 2xx body as `T`.
    async fn execute<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: &str,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.dispatch(method, path, body, token).await?;
        let status = response.status();

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::RemoteRequestFailed {
                status: Some(status.as_u16()),
                message: format!("failed to parse response: {e}"),
            })
    }

    async fn send_ack<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Message>
    where
        B: Serialize + ?Sized,
    {
        let token = self.require_credential().await?;
        self.execute_ack(method, path, body, &token).await
    }

    /// Send a request whose 2xx reply is only a confirmation. Any 2xx counts;
    /// an empty or unrecognised body yields the status reason as the message.
    async fn execute_ack<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: &str,
    ) -> Result<Message>
    where
        B: Serialize + ?Sized,
    {
        let response = self.dispatch(method, path, body, token).await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        Ok(serde_json::from_str::<Message>(&text).unwrap_or_else(|_| Message {
            message: status.canonical_reason().unwrap_or("OK").to_string(),
        }))
    }

    /// Send an authorized request, mapping transport errors and non-2xx
    /// statuses into `RemoteRequestFailed`.
    async fn dispatch<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: &str,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{path}", self.api_url);
        debug!(method = %method, url = %url, "Sending request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        request = self.scheme.authorize(request, token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(method = %method, url = %url, error = %e, "Request failed to send");
            ClientError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(method = %method, url = %url, status = %status, "Request rejected");
            return Err(ClientError::from_status(status, body));
        }

        Ok(response)
    }
}

fn follow_path(username: &str) -> String {
    format!(
        "/users/{}/follow",
        urlencoding::encode(&username.to_lowercase())
    )
}
