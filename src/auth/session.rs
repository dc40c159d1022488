use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use super::AuthScheme;
use crate::constants::SESSION_COOKIE;
use crate::error::{ClientError, Result};
use crate::models::{Credentials, LoginRequest, LoginResponse};

/// Identifier/password login. The issued token is sent back as a
/// `Cookie: token=<token>` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionAuth;

#[async_trait]
impl AuthScheme for SessionAuth {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn authenticate(
        &self,
        http: &Client,
        api_url: &str,
        credentials: &Credentials,
    ) -> Result<String> {
        let (identifier, password) = match credentials {
            Credentials::Password {
                identifier,
                password,
            } => (identifier, password),
            // A token from an earlier login resumes that session.
            Credentials::Token(token) if !token.is_empty() => return Ok(token.clone()),
            Credentials::Token(_) => {
                return Err(ClientError::InvalidArgument(
                    "token cannot be empty".to_string(),
                ))
            }
        };

        let url = format!("{api_url}/auth/login");
        debug!(url = %url, identifier = %identifier, "Logging in");

        let response = http
            .post(&url)
            .json(&LoginRequest {
                identifier,
                password,
            })
            .send()
            .await
            .map_err(|e| ClientError::AuthenticationFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::AuthenticationFailed(
                ClientError::from_status(status, body).to_string(),
            ));
        }

        token_from_response(response).await
    }

    fn authorize(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header(COOKIE, format!("{SESSION_COOKIE}={token}"))
    }
}

/// Read the session token from the JSON body, falling back to a
/// `Set-Cookie: token=...` header.
async fn token_from_response(response: Response) -> Result<String> {
    let from_header = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find_map(token_from_set_cookie);

    let body = response
        .text()
        .await
        .map_err(|e| ClientError::AuthenticationFailed(e.to_string()))?;
    let from_body = serde_json::from_str::<LoginResponse>(&body)
        .ok()
        .and_then(|r| r.token)
        .filter(|t| !t.is_empty());

    from_body
        .or(from_header)
        .ok_or_else(|| ClientError::AuthenticationFailed("token not received".to_string()))
}

fn token_from_set_cookie(header: &str) -> Option<String> {
    let pair = header.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
}
