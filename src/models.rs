//! Request and response bodies exchanged with the Birdr API.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// An account as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub staff: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub other_badges: Vec<String>,
    #[serde(rename = "__v", default)]
    pub version: u32,
}

/// A post created through [`Client::send_post`](crate::Client::send_post).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    pub author_id: String,
    /// Mentioned username to user id.
    #[serde(default)]
    pub mentions: HashMap<String, String>,
    /// Open Graph preview data for links in the content.
    #[serde(default)]
    pub og_data: serde_json::Value,
    #[serde(default)]
    pub pinned: bool,
    pub posted_at: DateTime<Utc>,
    #[serde(rename = "__v", default)]
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub content: String,
    pub author_id: String,
    #[serde(default)]
    pub mentions: HashMap<String, String>,
    pub posted_at: DateTime<Utc>,
    #[serde(rename = "__v", default)]
    pub version: u32,
}

/// Confirmation returned by delete, follow, report and logout calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ContentBody<'a> {
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// What a login call authenticates with.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// An API token issued by the service.
    Token(String),
    /// Username or email plus password.
    Password { identifier: String, password: String },
}

impl Credentials {
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(token.into())
    }

    pub fn password(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            identifier: identifier.into(),
            password: password.into(),
        }
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
            Self::Password { identifier, .. } => f
                .debug_struct("Password")
                .field("identifier", identifier)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Kind of content a report points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Post,
    Comment,
}

impl FromStr for ReportKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(Self::Post),
            "comment" => Ok(Self::Comment),
            other => Err(ClientError::InvalidArgument(format!(
                "invalid report type '{other}', must be either 'post' or 'comment'"
            ))),
        }
    }
}

/// Report payload. The target serializes as exactly one of `postId` or
/// `commentId`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportRequest<'a> {
    pub content: &'a str,
    pub author_id: &'a str,
    #[serde(flatten)]
    pub target: ReportTarget<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) enum ReportTarget<'a> {
    #[serde(rename = "postId")]
    Post(&'a str),
    #[serde(rename = "commentId")]
    Comment(&'a str),
}

impl<'a> ReportTarget<'a> {
    pub fn new(kind: ReportKind, id: &'a str) -> Self {
        match kind {
            ReportKind::Post => Self::Post(id),
            ReportKind::Comment => Self::Comment(id),
        }
    }
}

/// Partial profile update. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// URL or local file path of the new avatar image. Replaced by a data
    /// URI before the update is sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.display_name.is_none() && self.avatar.is_none()
    }
}
