use thiserror::Error;

use crate::constants::{DEFAULT_API_URL, DEFAULT_USER_AGENT};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as URL: {source}")]
    ParseUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// How the client proves its identity to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthSchemeKind {
    /// Caller-supplied token sent as `Authorization: Bearer <token>`.
    #[default]
    Bearer,
    /// Identifier/password login; the issued token travels as a `token` cookie.
    Session,
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, without a trailing slash.
    pub api_url: String,
    pub user_agent: String,
    pub auth_scheme: AuthSchemeKind,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            auth_scheme: AuthSchemeKind::default(),
        }
    }
}

impl ClientConfig {
    /// Default configuration pointed at another base URL (a staging host or
    /// a local mock server).
    #[must_use]
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn auth_scheme(mut self, auth_scheme: AuthSchemeKind) -> Self {
        self.auth_scheme = auth_scheme;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to the defaults: `BIRDR_API_URL`,
    /// `BIRDR_USER_AGENT`, `BIRDR_AUTH_SCHEME` (`bearer` or `session`).
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: env_or_default("BIRDR_API_URL", DEFAULT_API_URL),
            user_agent: env_or_default("BIRDR_USER_AGENT", DEFAULT_USER_AGENT),
            auth_scheme: parse_auth_scheme(&env_or_default("BIRDR_AUTH_SCHEME", "bearer"))?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.api_url).map_err(|e| ConfigError::ParseUrl {
            name: "BIRDR_API_URL".to_string(),
            source: e,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                name: "BIRDR_API_URL".to_string(),
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.user_agent.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "BIRDR_USER_AGENT".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed.
    pub(crate) fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_auth_scheme(value: &str) -> Result<AuthSchemeKind, ConfigError> {
    match value.to_lowercase().as_str() {
        "bearer" | "token" => Ok(AuthSchemeKind::Bearer),
        "session" | "cookie" => Ok(AuthSchemeKind::Session),
        _ => Err(ConfigError::InvalidValue {
            name: "BIRDR_AUTH_SCHEME".to_string(),
            message: format!("must be 'bearer' or 'session', got '{value}'"),
        }),
    }
}
