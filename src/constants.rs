//! Shared constants used across the client.

/// Base URL of the Birdr v1 REST API.
pub const DEFAULT_API_URL: &str = "https://birdr.vercel.app/api/v1";

/// User agent string sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("birdr-client/", env!("CARGO_PKG_VERSION"));

/// Name of the cookie carrying the session credential.
pub const SESSION_COOKIE: &str = "token";

/// Image types accepted as avatars.
pub const ALLOWED_AVATAR_MIME_TYPES: &[&str] =
    &["image/png", "image/jpeg", "image/jpg", "image/gif"];
