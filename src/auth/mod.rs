//! Authentication strategies.
//!
//! The service accepts two schemes: a caller-held API token sent as a bearer
//! header, or a session token obtained from identifier/password login and
//! sent back as a cookie. A [`Client`](crate::Client) uses exactly one scheme,
//! chosen when it is built.

pub mod bearer;
pub mod session;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};

use crate::config::AuthSchemeKind;
use crate::error::Result;
use crate::models::Credentials;

pub use bearer::BearerAuth;
pub use session::SessionAuth;

/// A way of obtaining a credential and attaching it to requests.
#[async_trait]
pub trait AuthScheme: Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Exchange login credentials for the token that later requests carry.
    ///
    /// The token is not considered valid until the client has resolved the
    /// current user with it.
    async fn authenticate(
        &self,
        http: &Client,
        api_url: &str,
        credentials: &Credentials,
    ) -> Result<String>;

    /// Attach `token` to an outgoing request.
    fn authorize(&self, request: RequestBuilder, token: &str) -> RequestBuilder;
}

/// Build the built-in scheme for `kind`.
#[must_use]
pub fn scheme_for(kind: AuthSchemeKind) -> Arc<dyn AuthScheme> {
    match kind {
        AuthSchemeKind::Bearer => Arc::new(BearerAuth),
        AuthSchemeKind::Session => Arc::new(SessionAuth),
    }
}
