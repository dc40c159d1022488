use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors returned by every [`Client`](crate::Client) operation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not logged in, call login() first")]
    NotAuthenticated,
    #[error("already logged in")]
    AlreadyAuthenticated,
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    /// Transport failure (`status` is `None`) or a non-2xx response, with the
    /// response body when the service sent one.
    #[error("{}", remote_display(.status, .message))]
    RemoteRequestFailed {
        status: Option<u16>,
        message: String,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

fn remote_display(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("request failed with status {code}: {message}"),
        None => format!("request failed: {message}"),
    }
}

impl ClientError {
    /// Build a `RemoteRequestFailed` from a non-2xx status and its body text.
    pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        } else {
            body
        };
        Self::RemoteRequestFailed {
            status: Some(status.as_u16()),
            message,
        }
    }

    /// HTTP status of a remote failure, if the service answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::RemoteRequestFailed {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_keeps_body() {
        let err = ClientError::from_status(StatusCode::NOT_FOUND, r#"{"message":"gone"}"#.into());
        assert_eq!(err.status(), Some(404));
        match err {
            ClientError::RemoteRequestFailed { message, .. } => {
                assert_eq!(message, r#"{"message":"gone"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_status_empty_body_uses_reason() {
        let err = ClientError::from_status(StatusCode::FORBIDDEN, "  ".into());
        assert_eq!(err.to_string(), "request failed with status 403: Forbidden");
    }

    #[test]
    fn test_status_only_for_remote_errors() {
        assert_eq!(ClientError::NotAuthenticated.status(), None);
    }
}
