//! HTTP client for the Revue API.
//!
//! [`RevueClient`] only knows how to authenticate. Authenticating consumes it
//! and yields a [`RevueSession`], the sole owner of the bearer token and the
//! only type exposing the CRUD endpoints. CRUD calls hand back the raw
//! [`ApiReply`] so callers decide which statuses count as success.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use revue_api_models::{ApiResponseDto, AuthResponse, AuthToken, Credentials, RevueDto};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::SuiteConfig;
use crate::error::{SuiteError, SuiteResult};

/// Header carrying the per-run correlation identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

pub(crate) const AUTH_PATH: &str = "/api/User/Authentication";
pub(crate) const CREATE_PATH: &str = "/api/Revue/Create";
pub(crate) const LIST_PATH: &str = "/api/Revue/All";
pub(crate) const EDIT_PATH: &str = "/api/Revue/Edit";
pub(crate) const DELETE_PATH: &str = "/api/Revue/Delete";
const REVUE_ID_PARAM: &str = "revueId";

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    /// HTTP status returned by the service.
    pub status: StatusCode,
    /// Raw response body.
    pub body: String,
}

impl ApiReply {
    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self, operation: &'static str) -> SuiteResult<T> {
        serde_json::from_str(&self.body).map_err(|source| SuiteError::Decode { operation, source })
    }

    /// The `Msg` field of a single-object response, when present.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        serde_json::from_str::<ApiResponseDto>(&self.body)
            .ok()
            .and_then(|response| response.msg)
    }
}

/// Unauthenticated client bound to one deployment.
#[derive(Debug, Clone)]
pub struct RevueClient {
    http: Client,
    base_url: Url,
}

impl RevueClient {
    /// Build a client tagged with `request_id` on every request.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::InvalidConfig`] for a request id that is not a
    /// valid header value and [`SuiteError::ClientBuild`] when the TLS backend
    /// cannot be initialised.
    pub fn new(config: &SuiteConfig, request_id: &str) -> SuiteResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id_value =
            HeaderValue::from_str(request_id).map_err(|_| SuiteError::InvalidConfig {
                field: "request_id",
                value: request_id.to_string(),
                reason: "contains characters not allowed in headers",
            })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id_value);

        let mut builder = Client::builder().default_headers(default_headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|source| SuiteError::ClientBuild { source })?;

        Ok(Self::with_http(http, config.base_url.clone()))
    }

    /// Wrap an existing `reqwest` client.
    #[must_use]
    pub const fn with_http(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`SuiteError::AuthenticationRejected`] for any status other than
    /// 200, [`SuiteError::MissingAccessToken`] when the body lacks a usable
    /// token, and transport or decoding errors otherwise.
    pub async fn authenticate(self, credentials: &Credentials) -> SuiteResult<RevueSession> {
        let url = endpoint(&self.base_url, AUTH_PATH)?;
        let request = self.http.post(url.clone()).json(credentials);
        let reply = send("authenticate", url, request).await?;

        if reply.status != StatusCode::OK {
            return Err(SuiteError::AuthenticationRejected {
                status: reply.status.as_u16(),
                body: reply.body,
            });
        }

        let token = reply
            .json::<AuthResponse>("authenticate")?
            .access_token
            .and_then(AuthToken::new)
            .ok_or(SuiteError::MissingAccessToken)?;
        debug!(email = %credentials.email, "authenticated against revue api");

        Ok(RevueSession {
            http: self.http,
            base_url: self.base_url,
            token,
        })
    }
}

/// Authenticated session; every request carries the bearer token.
#[derive(Debug, Clone)]
pub struct RevueSession {
    http: Client,
    base_url: Url,
    token: AuthToken,
}

impl RevueSession {
    /// Token obtained during authentication.
    #[must_use]
    pub const fn token(&self) -> &AuthToken {
        &self.token
    }

    /// `POST /api/Revue/Create`.
    ///
    /// # Errors
    ///
    /// Returns transport or URL errors; HTTP error statuses are not errors.
    pub async fn create_revue(&self, payload: &RevueDto) -> SuiteResult<ApiReply> {
        let url = endpoint(&self.base_url, CREATE_PATH)?;
        let request = self.authorized(self.http.post(url.clone())).json(payload);
        send("create_revue", url, request).await
    }

    /// `GET /api/Revue/All`.
    ///
    /// # Errors
    ///
    /// Returns transport or URL errors; HTTP error statuses are not errors.
    pub async fn list_revues(&self) -> SuiteResult<ApiReply> {
        let url = endpoint(&self.base_url, LIST_PATH)?;
        let request = self.authorized(self.http.get(url.clone()));
        send("list_revues", url, request).await
    }

    /// `PUT /api/Revue/Edit?revueId=<id>`.
    ///
    /// # Errors
    ///
    /// Returns transport or URL errors; HTTP error statuses are not errors.
    pub async fn edit_revue(&self, revue_id: &str, payload: &RevueDto) -> SuiteResult<ApiReply> {
        let url = revue_endpoint(&self.base_url, EDIT_PATH, revue_id)?;
        let request = self.authorized(self.http.put(url.clone())).json(payload);
        send("edit_revue", url, request).await
    }

    /// `DELETE /api/Revue/Delete?revueId=<id>`.
    ///
    /// # Errors
    ///
    /// Returns transport or URL errors; HTTP error statuses are not errors.
    pub async fn delete_revue(&self, revue_id: &str) -> SuiteResult<ApiReply> {
        let url = revue_endpoint(&self.base_url, DELETE_PATH, revue_id)?;
        let request = self.authorized(self.http.delete(url.clone()));
        send("delete_revue", url, request).await
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.token.as_str())
    }
}

/// Resolve `path` beneath the base URL, keeping any path prefix it carries.
fn endpoint(base_url: &Url, path: &'static str) -> SuiteResult<Url> {
    let mut root = base_url.clone();
    if !root.path().ends_with('/') {
        let prefix = format!("{}/", root.path());
        root.set_path(&prefix);
    }
    root.join(path.trim_start_matches('/'))
        .map_err(|source| SuiteError::Endpoint { path, source })
}

fn revue_endpoint(base_url: &Url, path: &'static str, revue_id: &str) -> SuiteResult<Url> {
    let mut url = endpoint(base_url, path)?;
    url.query_pairs_mut().append_pair(REVUE_ID_PARAM, revue_id);
    Ok(url)
}

async fn send(operation: &'static str, url: Url, request: RequestBuilder) -> SuiteResult<ApiReply> {
    let http_error = |source| SuiteError::Http {
        operation,
        url: url.to_string(),
        source,
    };
    let response = request.send().await.map_err(http_error)?;
    let status = response.status();
    let body = response.text().await.map_err(http_error)?;
    debug!(operation, %url, status = status.as_u16(), "revue api call completed");
    Ok(ApiReply { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{DELETE, GET, POST, PUT};
    use httpmock::MockServer;
    use serde_json::json;

    fn client_for(server: &MockServer) -> RevueClient {
        RevueClient::with_http(
            Client::new(),
            server.base_url().parse().expect("valid URL"),
        )
    }

    fn credentials() -> Credentials {
        Credentials::new("user@example.com", "pw")
    }

    async fn session_for(server: &MockServer) -> RevueSession {
        server.mock(|when, then| {
            when.method(POST).path(AUTH_PATH);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"accessToken": "tok"}));
        });
        client_for(server)
            .authenticate(&credentials())
            .await
            .expect("authentication should succeed")
    }

    #[tokio::test]
    async fn authenticate_posts_credentials_and_keeps_token() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(AUTH_PATH)
                .json_body(json!({"email": "user@example.com", "password": "pw"}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"accessToken": "jwt-value"}));
        });

        let session = client_for(&server)
            .authenticate(&credentials())
            .await
            .expect("authentication should succeed");
        mock.assert();
        assert_eq!(session.token().as_str(), "jwt-value");
    }

    #[tokio::test]
    async fn authenticate_rejects_non_ok_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(AUTH_PATH);
            then.status(401).body("invalid credentials");
        });

        let err = client_for(&server)
            .authenticate(&credentials())
            .await
            .expect_err("401 must abort");
        assert!(matches!(
            err,
            SuiteError::AuthenticationRejected { status: 401, ref body }
                if body == "invalid credentials"
        ));
    }

    #[tokio::test]
    async fn authenticate_requires_non_blank_token() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(AUTH_PATH);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"accessToken": ""}));
        });

        let err = client_for(&server)
            .authenticate(&credentials())
            .await
            .expect_err("blank token must abort");
        assert!(matches!(err, SuiteError::MissingAccessToken));
    }

    #[tokio::test]
    async fn authenticate_surfaces_malformed_bodies() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(AUTH_PATH);
            then.status(200).body("<html>login</html>");
        });

        let err = client_for(&server)
            .authenticate(&credentials())
            .await
            .expect_err("non-json body must abort");
        assert!(matches!(
            err,
            SuiteError::Decode {
                operation: "authenticate",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn crud_calls_send_bearer_token_and_query_id() {
        let server = MockServer::start_async().await;
        let session = session_for(&server).await;
        let payload = RevueDto {
            title: "t".into(),
            url: "u".into(),
            description: "d".into(),
        };

        let create = server.mock(|when, then| {
            when.method(POST)
                .path(CREATE_PATH)
                .header("authorization", "Bearer tok")
                .json_body(json!({"Title": "t", "Url": "u", "Description": "d"}));
            then.status(200).json_body(json!({"Msg": "Successfully created!"}));
        });
        let list = server.mock(|when, then| {
            when.method(GET)
                .path(LIST_PATH)
                .header("authorization", "Bearer tok");
            then.status(200).json_body(json!([]));
        });
        let edit = server.mock(|when, then| {
            when.method(PUT)
                .path(EDIT_PATH)
                .query_param("revueId", "abc")
                .header("authorization", "Bearer tok");
            then.status(200).json_body(json!({"Msg": "Edited successfully"}));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE)
                .path(DELETE_PATH)
                .query_param("revueId", "abc")
                .header("authorization", "Bearer tok");
            then.status(400).body("There is no such revue!");
        });

        let reply = session.create_revue(&payload).await.expect("create");
        assert_eq!(reply.message().as_deref(), Some("Successfully created!"));
        let reply = session.list_revues().await.expect("list");
        assert_eq!(reply.status, StatusCode::OK);
        let reply = session.edit_revue("abc", &payload).await.expect("edit");
        assert_eq!(reply.message().as_deref(), Some("Edited successfully"));
        let reply = session.delete_revue("abc").await.expect("delete");
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body, "There is no such revue!");
        assert!(reply.message().is_none());

        create.assert();
        list.assert();
        edit.assert();
        delete.assert();
    }

    #[tokio::test]
    async fn request_id_header_is_attached() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(AUTH_PATH)
                .header(HEADER_REQUEST_ID, "run-1");
            then.status(200).json_body(json!({"accessToken": "tok"}));
        });
        let config = SuiteConfig::new(
            server.base_url().parse().expect("valid URL"),
            credentials(),
            None,
        );

        RevueClient::new(&config, "run-1")
            .expect("client builds")
            .authenticate(&credentials())
            .await
            .expect("authentication should succeed");
        mock.assert();
    }

    #[test]
    fn client_rejects_header_unsafe_request_ids() {
        let config = SuiteConfig::new(
            "http://localhost:5000".parse().expect("valid URL"),
            credentials(),
            None,
        );
        let err = RevueClient::new(&config, "bad\nid").expect_err("newline rejected");
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn transport_errors_name_the_operation() {
        let client = RevueClient::with_http(
            Client::new(),
            "http://127.0.0.1:9".parse().expect("valid URL"),
        );
        let err = client
            .authenticate(&credentials())
            .await
            .expect_err("closed port must fail");
        assert!(matches!(
            err,
            SuiteError::Http {
                operation: "authenticate",
                ..
            }
        ));
    }

    #[test]
    fn revue_endpoint_appends_query() {
        let base: Url = "http://localhost:5000".parse().expect("valid URL");
        let url = revue_endpoint(&base, EDIT_PATH, "a b").expect("join");
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/Revue/Edit?revueId=a+b"
        );
    }

    #[test]
    fn endpoints_stay_under_the_base_path() {
        for base in ["https://host/revue", "https://host/revue/"] {
            let base: Url = base.parse().expect("valid URL");
            let url = endpoint(&base, LIST_PATH).expect("join");
            assert_eq!(url.as_str(), "https://host/revue/api/Revue/All");
        }
    }

    #[tokio::test]
    async fn authenticate_honours_base_path_prefix() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/revue/api/User/Authentication");
            then.status(200).json_body(json!({"accessToken": "tok"}));
        });
        let client = RevueClient::with_http(
            Client::new(),
            server.url("/revue").parse().expect("valid URL"),
        );

        client
            .authenticate(&credentials())
            .await
            .expect("authentication should succeed");
        mock.assert();
    }
}
