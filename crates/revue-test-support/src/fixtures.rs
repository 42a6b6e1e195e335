//! Test fixtures and environment helpers.

use revue_api_models::{Credentials, RevueDto};

/// Environment variable naming a live deployment for opt-in tests.
pub const LIVE_BASE_URL_ENV: &str = "REVUE_LIVE_BASE_URL";

/// Credentials accepted by the mocked service.
#[must_use]
pub fn test_credentials() -> Credentials {
    Credentials::new("fixture@revue.test", "fixture-password")
}

/// Bearer token issued by the mocked service.
pub const TEST_TOKEN: &str = "fixture-jwt-token";

/// Payload used by the create step in deterministic runs.
#[must_use]
pub fn created_revue() -> RevueDto {
    RevueDto {
        title: "Fixture revue".to_string(),
        url: "https://revue.test/articles/fixture".to_string(),
        description: "Created by the integration fixtures".to_string(),
    }
}

/// Payload used by the edit step in deterministic runs.
#[must_use]
pub fn edited_revue() -> RevueDto {
    RevueDto {
        title: "Fixture revue (edited)".to_string(),
        url: "https://revue.test/articles/fixture-edited".to_string(),
        description: "Edited by the integration fixtures".to_string(),
    }
}

/// Base URL of a live Revue deployment, when one is configured.
#[must_use]
pub fn live_base_url() -> Option<String> {
    live_base_url_from(std::env::var(LIVE_BASE_URL_ENV).ok())
}

fn live_base_url_from(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}
