use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};

use super::AuthScheme;
use crate::error::{ClientError, Result};
use crate::models::Credentials;

/// Caller-supplied API token, sent as `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerAuth;

#[async_trait]
impl AuthScheme for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer"
    }

    async fn authenticate(
        &self,
        _http: &Client,
        _api_url: &str,
        credentials: &Credentials,
    ) -> Result<String> {
        match credentials {
            Credentials::Token(token) if !token.is_empty() => Ok(token.clone()),
            Credentials::Token(_) => Err(ClientError::InvalidArgument(
                "token cannot be empty".to_string(),
            )),
            Credentials::Password { .. } => Err(ClientError::InvalidArgument(
                "bearer authentication needs a token, not a password".to_string(),
            )),
        }
    }

    fn authorize(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bearer {token}"))
    }
}
