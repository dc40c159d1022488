//! Avatar media resolution.
//!
//! Turns an avatar source (an HTTP(S) URL or a local file path) into a
//! `data:<mime>;base64,<payload>` URI. The MIME type always comes from the
//! source's file extension, never from the bytes themselves.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use tracing::debug;

use crate::constants::ALLOWED_AVATAR_MIME_TYPES;
use crate::error::{ClientError, Result};

/// Resolve an avatar source into a data URI.
///
/// # Errors
///
/// Returns `UnsupportedMediaType` if the extension is not PNG, JPEG or GIF,
/// `InvalidArgument` if the source is neither a URL nor an existing file, and
/// `RemoteRequestFailed` if downloading a URL source fails.
pub async fn resolve_avatar(http: &Client, source: &str) -> Result<String> {
    if is_http_url(source) {
        let url = url::Url::parse(source)
            .map_err(|e| ClientError::InvalidArgument(format!("invalid avatar URL: {e}")))?;
        let mime = allowed_mime_for(url.path())?;

        debug!(url = %url, mime, "Fetching avatar");
        let response = http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status, body));
        }
        let bytes = response.bytes().await?;

        Ok(to_data_uri(mime, &bytes))
    } else if is_existing_file(source).await {
        let mime = allowed_mime_for(source)?;

        debug!(path = %source, mime, "Reading avatar file");
        let bytes = tokio::fs::read(source).await.map_err(|e| {
            ClientError::InvalidArgument(format!("failed to read avatar file {source}: {e}"))
        })?;

        Ok(to_data_uri(mime, &bytes))
    } else {
        Err(ClientError::InvalidArgument(
            "avatar is neither a valid file path nor URL".to_string(),
        ))
    }
}

/// Encode bytes as a base64 data URI.
#[must_use]
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

fn is_http_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

async fn is_existing_file(source: &str) -> bool {
    tokio::fs::metadata(source)
        .await
        .is_ok_and(|m| m.is_file())
}

/// Guess the MIME type from a path's extension and check it against the
/// avatar allow-list.
fn allowed_mime_for(path: &str) -> Result<&'static str> {
    let guessed = mime_guess::from_path(Path::new(path)).first_raw();
    match guessed {
        Some(mime) if ALLOWED_AVATAR_MIME_TYPES.contains(&mime) => Ok(mime),
        Some(mime) => Err(ClientError::UnsupportedMediaType(format!(
            "{mime}; only PNG, JPG, JPEG and GIF are allowed"
        ))),
        None => Err(ClientError::UnsupportedMediaType(format!(
            "cannot determine image type of '{path}'; only PNG, JPG, JPEG and GIF are allowed"
        ))),
    }
}
