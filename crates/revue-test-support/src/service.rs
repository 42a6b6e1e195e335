//! `httpmock` stand-in for the Revue HTTP API.
//!
//! [`ConformingService::mount`] registers every endpoint the suite touches with
//! the responses a healthy deployment returns. Tests that need a misbehaving
//! service mount the individual helpers (or raw `httpmock` mocks) instead.

use httpmock::Method::{DELETE, GET, POST, PUT};
use httpmock::{Mock, MockServer};
use revue_api_models::{Credentials, RevueDto};
use serde_json::{Value, json};

use crate::fixtures::{TEST_TOKEN, created_revue, edited_revue, test_credentials};

/// Path of the authentication endpoint.
pub const AUTH_PATH: &str = "/api/User/Authentication";
/// Path of the create endpoint.
pub const CREATE_PATH: &str = "/api/Revue/Create";
/// Path of the list endpoint.
pub const LIST_PATH: &str = "/api/Revue/All";
/// Path of the edit endpoint.
pub const EDIT_PATH: &str = "/api/Revue/Edit";
/// Path of the delete endpoint.
pub const DELETE_PATH: &str = "/api/Revue/Delete";
/// Identifier the service never knows about.
pub const UNKNOWN_REVUE_ID: &str = "123";
const NEVER_LISTED_ID: &str = "never-listed";

/// Message returned for unknown identifiers.
pub const NO_SUCH_REVUE: &str = "There is no such revue!";

/// Mocks for every endpoint of a well-behaved deployment.
pub struct ConformingService<'a> {
    /// `POST /api/User/Authentication`.
    pub authenticate: Mock<'a>,
    /// `POST /api/Revue/Create` with the fixture payload.
    pub create: Mock<'a>,
    /// `POST /api/Revue/Create` with blank fields.
    pub create_missing_fields: Mock<'a>,
    /// `GET /api/Revue/All`.
    pub list: Mock<'a>,
    /// `PUT /api/Revue/Edit` for the last listed id.
    pub edit: Mock<'a>,
    /// `DELETE /api/Revue/Delete` for the last listed id.
    pub delete: Mock<'a>,
    /// `PUT /api/Revue/Edit` for [`UNKNOWN_REVUE_ID`].
    pub edit_unknown: Mock<'a>,
    /// `DELETE /api/Revue/Delete` for [`UNKNOWN_REVUE_ID`].
    pub delete_unknown: Mock<'a>,
}

impl<'a> ConformingService<'a> {
    /// Register all endpoints; the list returns `listed_ids` in order.
    ///
    /// Edit and delete accept only the last listed id. With an empty listing
    /// they accept an id nobody sends, so only the unknown-id mocks answer.
    #[must_use]
    pub fn mount(server: &'a MockServer, listed_ids: &[&str]) -> Self {
        let last_id = listed_ids.last().copied().unwrap_or(NEVER_LISTED_ID);
        let bearer = bearer_header();
        let created = dto_json(&created_revue());
        let edited = dto_json(&edited_revue());

        let create = server.mock(|when, then| {
            when.method(POST)
                .path(CREATE_PATH)
                .header("authorization", bearer.as_str())
                .json_body(created);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"Msg": "Successfully created!"}));
        });

        let create_missing_fields = server.mock(|when, then| {
            when.method(POST)
                .path(CREATE_PATH)
                .header("authorization", bearer.as_str())
                .json_body(dto_json(&RevueDto::empty()));
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({
                    "title": "One or more validation errors occurred.",
                    "status": 400
                }));
        });

        let edit = server.mock(|when, then| {
            when.method(PUT)
                .path(EDIT_PATH)
                .query_param("revueId", last_id)
                .header("authorization", bearer.as_str())
                .json_body(edited.clone());
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"Msg": "Edited successfully"}));
        });

        let delete = server.mock(|when, then| {
            when.method(DELETE)
                .path(DELETE_PATH)
                .query_param("revueId", last_id)
                .header("authorization", bearer.as_str());
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"Msg": "The revue is deleted!"}));
        });

        let edit_unknown = server.mock(|when, then| {
            when.method(PUT)
                .path(EDIT_PATH)
                .query_param("revueId", UNKNOWN_REVUE_ID)
                .header("authorization", bearer.as_str())
                .json_body(edited);
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({"Msg": NO_SUCH_REVUE}));
        });

        let delete_unknown = server.mock(|when, then| {
            when.method(DELETE)
                .path(DELETE_PATH)
                .query_param("revueId", UNKNOWN_REVUE_ID)
                .header("authorization", bearer.as_str());
            then.status(400)
                .header("content-type", "application/json")
                .json_body(json!({"Msg": NO_SUCH_REVUE}));
        });

        Self {
            authenticate: mount_authentication(server, &test_credentials(), Some(TEST_TOKEN)),
            create,
            create_missing_fields,
            list: mount_list(server, listed_ids),
            edit,
            delete,
            edit_unknown,
            delete_unknown,
        }
    }
}

/// Accept `credentials` and answer 200 with `token` (omitted when `None`).
#[must_use]
pub fn mount_authentication<'a>(
    server: &'a MockServer,
    credentials: &Credentials,
    token: Option<&str>,
) -> Mock<'a> {
    let body = token.map_or_else(|| json!({}), |token| json!({"accessToken": token}));
    server.mock(|when, then| {
        when.method(POST).path(AUTH_PATH).json_body(json!({
            "email": credentials.email,
            "password": credentials.password
        }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(body);
    })
}

/// Answer the list endpoint with one entry per identifier.
#[must_use]
pub fn mount_list<'a>(server: &'a MockServer, ids: &[&str]) -> Mock<'a> {
    let items: Vec<Value> = ids
        .iter()
        .enumerate()
        .map(|(index, id)| {
            json!({
                "Msg": null,
                "RevueId": id,
                "Title": format!("Listed revue {index}"),
                "Url": format!("https://revue.test/articles/{index}"),
                "Description": "listed by the stand-in service"
            })
        })
        .collect();
    let bearer = bearer_header();
    server.mock(|when, then| {
        when.method(GET)
            .path(LIST_PATH)
            .header("authorization", bearer.as_str());
        then.status(200)
            .header("content-type", "application/json")
            .json_body(Value::Array(items));
    })
}

/// `Authorization` header value carrying the fixture token.
#[must_use]
pub fn bearer_header() -> String {
    format!("Bearer {TEST_TOKEN}")
}

/// Wire representation of a revue payload.
#[must_use]
pub fn dto_json(dto: &RevueDto) -> Value {
    json!({
        "Title": dto.title,
        "Url": dto.url,
        "Description": dto.description
    })
}
