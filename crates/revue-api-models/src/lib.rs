#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Revue content-management API.
//!
//! The service speaks two casings: authentication uses camelCase keys while the
//! Revue endpoints use PascalCase. Requests are serialised exactly as the
//! service documents them; responses accept either casing so the suite does not
//! break when the server's JSON naming policy changes.
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

/// Login credentials posted to the authentication endpoint.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Account e-mail address.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Build credentials from owned or borrowed strings.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body returned by a successful authentication call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token; absent when the service declines to issue one.
    #[serde(default, alias = "AccessToken")]
    pub access_token: Option<String>,
}

/// Opaque bearer token attached to every authenticated request.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token, rejecting blank values.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Raw token text as sent in the `Authorization` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("AuthToken(<redacted>)")
    }
}

/// Payload used to create or edit a revue.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RevueDto {
    /// Human-readable title.
    #[serde(alias = "title")]
    pub title: String,
    /// Link to the reviewed resource.
    #[serde(alias = "url")]
    pub url: String,
    /// Free-form description.
    #[serde(alias = "description")]
    pub description: String,
}

impl RevueDto {
    /// Payload with every required field left empty.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Generic response envelope returned by the Revue endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiResponseDto {
    /// Status message such as `Successfully created!`.
    #[serde(rename = "Msg", alias = "msg", default)]
    pub msg: Option<String>,
    /// Identifier of the revue the response refers to.
    #[serde(
        rename = "RevueId",
        alias = "revueId",
        default,
        deserialize_with = "string_or_number"
    )]
    pub revue_id: Option<String>,
    /// Remaining fields (title, url, description, ...) kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected revue id as string or number, found {other}"
        ))),
    }
}
