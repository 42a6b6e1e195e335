//! Target and credential resolution for a suite run.
//!
//! Every setting has an environment variable and a fallback so the suite can
//! run unattended against a local deployment. Blank variables count as unset,
//! except that passwords are taken verbatim and only an empty one is unset.

use std::time::Duration;

use reqwest::Url;
use revue_api_models::Credentials;

use crate::error::{SuiteError, SuiteResult};

/// Environment variable carrying the service base URL.
pub const ENV_BASE_URL: &str = "REVUE_BASE_URL";
/// Environment variable carrying the account e-mail.
pub const ENV_EMAIL: &str = "REVUE_EMAIL";
/// Environment variable carrying the account password.
pub const ENV_PASSWORD: &str = "REVUE_PASSWORD";
/// Environment variable carrying the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "REVUE_HTTP_TIMEOUT_SECS";

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
/// Account e-mail used when none is configured.
pub const DEFAULT_EMAIL: &str = "revue.tester@example.com";
/// Account password used when none is configured.
pub const DEFAULT_PASSWORD: &str = "RevueTester123!";

/// Resolved settings for one suite run.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Root of the Revue deployment.
    pub base_url: Url,
    /// Account used for the single authentication call.
    pub credentials: Credentials,
    /// Per-request timeout; `None` keeps the client default.
    pub timeout: Option<Duration>,
}

impl SuiteConfig {
    /// Build a configuration from already-validated parts.
    #[must_use]
    pub const fn new(base_url: Url, credentials: Credentials, timeout: Option<Duration>) -> Self {
        Self {
            base_url,
            credentials,
            timeout,
        }
    }

    /// Resolve settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::InvalidConfig`] when the base URL or timeout cannot
    /// be parsed.
    pub fn from_env() -> SuiteResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::InvalidConfig`] when the base URL or timeout cannot
    /// be parsed.
    pub fn from_lookup<F>(lookup: F) -> SuiteResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read_raw = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let base_url = parse_base_url(
            read(ENV_BASE_URL)
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL),
        )?;
        let credentials = Credentials::new(
            read(ENV_EMAIL).unwrap_or_else(|| DEFAULT_EMAIL.to_string()),
            read_raw(ENV_PASSWORD).unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
        );
        let timeout = read(ENV_TIMEOUT_SECS)
            .map(|raw| parse_timeout_secs(&raw))
            .transpose()?;

        Ok(Self::new(base_url, credentials, timeout))
    }
}

/// Parse and validate the service base URL.
///
/// # Errors
///
/// Returns [`SuiteError::InvalidConfig`] for unparseable or non-HTTP URLs.
pub fn parse_base_url(input: &str) -> SuiteResult<Url> {
    let url = input
        .trim()
        .parse::<Url>()
        .map_err(|_| SuiteError::InvalidConfig {
            field: "base_url",
            value: input.to_string(),
            reason: "not a valid absolute URL",
        })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SuiteError::InvalidConfig {
            field: "base_url",
            value: input.to_string(),
            reason: "scheme must be http or https",
        });
    }
    Ok(url)
}

/// Parse a whole-second timeout, rejecting zero.
///
/// # Errors
///
/// Returns [`SuiteError::InvalidConfig`] for non-numeric or zero values.
pub fn parse_timeout_secs(input: &str) -> SuiteResult<Duration> {
    let secs = input
        .trim()
        .parse::<u64>()
        .map_err(|_| SuiteError::InvalidConfig {
            field: "timeout",
            value: input.to_string(),
            reason: "expected whole seconds",
        })?;
    if secs == 0 {
        return Err(SuiteError::InvalidConfig {
            field: "timeout",
            value: input.to_string(),
            reason: "must be greater than zero",
        });
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn falls_back_to_defaults_when_unset() {
        let config = SuiteConfig::from_lookup(lookup_from(&[])).expect("defaults resolve");
        assert_eq!(config.base_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.credentials.email, DEFAULT_EMAIL);
        assert_eq!(config.credentials.password, DEFAULT_PASSWORD);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn environment_values_override_defaults() {
        let config = SuiteConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://revue.example.org"),
            (ENV_EMAIL, "qa@example.org"),
            (ENV_PASSWORD, "s3cret"),
            (ENV_TIMEOUT_SECS, "15"),
        ]))
        .expect("overrides resolve");
        assert_eq!(config.base_url.host_str(), Some("revue.example.org"));
        assert_eq!(config.credentials.email, "qa@example.org");
        assert_eq!(config.credentials.password, "s3cret");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let config = SuiteConfig::from_lookup(lookup_from(&[
            (ENV_EMAIL, "   "),
            (ENV_PASSWORD, ""),
            (ENV_TIMEOUT_SECS, " "),
        ]))
        .expect("blank values resolve");
        assert_eq!(config.credentials.email, DEFAULT_EMAIL);
        assert_eq!(config.credentials.password, DEFAULT_PASSWORD);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn passwords_keep_surrounding_whitespace() {
        let config = SuiteConfig::from_lookup(lookup_from(&[
            (ENV_EMAIL, " qa@example.org "),
            (ENV_PASSWORD, " pass word "),
        ]))
        .expect("credentials resolve");
        assert_eq!(config.credentials.email, "qa@example.org");
        assert_eq!(config.credentials.password, " pass word ");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        let err = parse_base_url("not-a-url").expect_err("relative URL rejected");
        assert!(matches!(
            err,
            SuiteError::InvalidConfig {
                field: "base_url",
                ..
            }
        ));

        let err = parse_base_url("ftp://revue.example.org").expect_err("ftp rejected");
        assert!(matches!(
            err,
            SuiteError::InvalidConfig {
                reason: "scheme must be http or https",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_and_non_numeric_timeouts() {
        assert!(parse_timeout_secs("0").is_err());
        assert!(parse_timeout_secs("ten").is_err());
        assert_eq!(
            parse_timeout_secs(" 3 ").expect("valid timeout"),
            Duration::from_secs(3)
        );

        let err = SuiteConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_SECS, "-1")]))
            .expect_err("negative timeout rejected");
        assert!(err.is_config());
    }
}
