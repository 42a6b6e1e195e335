//! # Design
//!
//! - Centralize setup-level failures (configuration, client, authentication).
//! - Keep error messages constant while carrying context fields for debugging.
//! - Step assertion failures are not errors; they live in the report.

use std::error::Error as StdError;

use thiserror::Error;

/// Result alias for suite operations.
pub type SuiteResult<T> = Result<T, SuiteError>;

/// Failures that prevent the suite from running its steps.
#[derive(Debug, Error)]
pub enum SuiteError {
    /// A configuration value could not be used.
    #[error("invalid suite configuration")]
    InvalidConfig {
        /// Setting that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build http client")]
    ClientBuild {
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// An endpoint URL could not be derived from the base URL.
    #[error("invalid endpoint url")]
    Endpoint {
        /// Endpoint path that failed to join.
        path: &'static str,
        /// Source URL parsing error.
        source: url::ParseError,
    },
    /// The request never produced a response.
    #[error("http request failed")]
    Http {
        /// Operation identifier.
        operation: &'static str,
        /// URL used for the request.
        url: String,
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// The service refused the credentials.
    #[error("authentication rejected")]
    AuthenticationRejected {
        /// HTTP status returned by the service.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// Authentication succeeded but no usable token was returned.
    #[error("authentication response missing access token")]
    MissingAccessToken,
    /// A response body did not match the expected shape.
    #[error("failed to decode response body")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Source serde error.
        source: serde_json::Error,
    },
}

impl SuiteError {
    /// True when the failure stems from operator-supplied settings.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. } | Self::Endpoint { .. })
    }

    /// Single-line description including context fields and the source chain.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut message = match self {
            Self::InvalidConfig {
                field,
                value,
                reason,
            } => format!("{self}: {field}={value:?} ({reason})"),
            Self::Endpoint { path, .. } => format!("{self}: {path}"),
            Self::Http { operation, url, .. } => format!("{self}: {operation} {url}"),
            Self::AuthenticationRejected { status, body } => {
                let body = body.trim();
                if body.is_empty() {
                    format!("{self}: status {status}")
                } else {
                    format!("{self}: status {status}: {body}")
                }
            }
            Self::Decode { operation, .. } => format!("{self}: {operation}"),
            Self::ClientBuild { .. } | Self::MissingAccessToken => self.to_string(),
        };
        let mut source = StdError::source(self);
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }
}
