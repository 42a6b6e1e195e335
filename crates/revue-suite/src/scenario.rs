//! The ordered CRUD scenario.
//!
//! Authentication happens once in [`run_suite`]; the seven steps in
//! [`StepKind::ORDERED`] then run strictly in sequence against the resulting
//! session. The only state passed between steps is the identifier captured by
//! the list step, carried in [`ScenarioContext`].

use rand::Rng;
use rand::distr::Alphanumeric;
use reqwest::StatusCode;
use revue_api_models::{ApiResponseDto, RevueDto};
use serde::Serialize;
use tracing::{Instrument, info, info_span, warn};

use crate::client::{ApiReply, RevueClient, RevueSession};
use crate::config::SuiteConfig;
use crate::error::SuiteResult;
use crate::report::SuiteReport;

/// Message returned after a successful create.
pub const MSG_CREATED: &str = "Successfully created!";
/// Message returned after a successful edit.
pub const MSG_EDITED: &str = "Edited successfully";
/// Message returned after a successful delete.
pub const MSG_DELETED: &str = "The revue is deleted!";
/// Message returned for identifiers the service does not know.
pub const MSG_NO_SUCH_REVUE: &str = "There is no such revue!";
/// Identifier assumed never to exist on the service.
pub const FAKE_REVUE_ID: &str = "123";

const BODY_SNIPPET_CHARS: usize = 200;

/// One check in the scenario, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Create a revue with every required field populated.
    CreateWithRequiredFields,
    /// List all revues and capture the last identifier.
    ListAll,
    /// Edit the captured revue.
    EditExisting,
    /// Delete the captured revue.
    DeleteExisting,
    /// Create a revue with blank required fields.
    CreateWithMissingFields,
    /// Edit an identifier the service does not know.
    EditNonExisting,
    /// Delete an identifier the service does not know.
    DeleteNonExisting,
}

impl StepKind {
    /// Every step in the order it must run.
    pub const ORDERED: [Self; 7] = [
        Self::CreateWithRequiredFields,
        Self::ListAll,
        Self::EditExisting,
        Self::DeleteExisting,
        Self::CreateWithMissingFields,
        Self::EditNonExisting,
        Self::DeleteNonExisting,
    ];

    /// Stable label used in logs and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreateWithRequiredFields => "create_with_required_fields",
            Self::ListAll => "list_all",
            Self::EditExisting => "edit_existing",
            Self::DeleteExisting => "delete_existing",
            Self::CreateWithMissingFields => "create_with_missing_fields",
            Self::EditNonExisting => "edit_non_existing",
            Self::DeleteNonExisting => "delete_non_existing",
        }
    }
}

/// Verdict for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Every assertion held.
    Passed,
    /// An assertion failed or the request could not be sent.
    Failed,
    /// A prerequisite captured by an earlier step was missing.
    Skipped,
}

impl StepStatus {
    /// Upper-case label used in table output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed => "FAIL",
            Self::Skipped => "SKIP",
        }
    }
}

/// Recorded result of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// Step that produced this outcome.
    pub step: StepKind,
    /// Verdict.
    pub status: StepStatus,
    /// HTTP status observed, when a response arrived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Failure or skip reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StepOutcome {
    const fn passed(step: StepKind, http_status: u16) -> Self {
        Self {
            step,
            status: StepStatus::Passed,
            http_status: Some(http_status),
            detail: None,
        }
    }

    const fn failed(step: StepKind, http_status: Option<u16>, detail: String) -> Self {
        Self {
            step,
            status: StepStatus::Failed,
            http_status,
            detail: Some(detail),
        }
    }

    fn skipped(step: StepKind, detail: &str) -> Self {
        Self {
            step,
            status: StepStatus::Skipped,
            http_status: None,
            detail: Some(detail.to_string()),
        }
    }
}

/// Request bodies sent by the create and edit steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPayloads {
    /// Body for the create step.
    pub create: RevueDto,
    /// Body for both edit steps.
    pub edit: RevueDto,
}

impl ScenarioPayloads {
    /// Payloads tagged with a random suffix so repeated runs stay distinguishable.
    #[must_use]
    pub fn generate() -> Self {
        let suffix = random_suffix(8);
        Self {
            create: RevueDto {
                title: format!("Revue {suffix}"),
                url: format!("https://revue.example.com/articles/{suffix}"),
                description: format!("Created by revue-suite run {suffix}"),
            },
            edit: RevueDto {
                title: format!("Revue {suffix} (edited)"),
                url: format!("https://revue.example.com/articles/{suffix}-edited"),
                description: format!("Edited by revue-suite run {suffix}"),
            },
        }
    }
}

/// State threaded through the steps of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioContext {
    /// Bodies for create and edit.
    pub payloads: ScenarioPayloads,
    /// Identifier of the last item returned by the list step.
    pub last_listed_revue_id: Option<String>,
}

impl ScenarioContext {
    /// Fresh context with nothing captured yet.
    #[must_use]
    pub const fn new(payloads: ScenarioPayloads) -> Self {
        Self {
            payloads,
            last_listed_revue_id: None,
        }
    }
}

/// Authenticate, then run every step in order.
///
/// `request_id` is sent as `x-request-id` on every call and quoted in the
/// report.
///
/// # Errors
///
/// Returns a [`crate::SuiteError`] when the client cannot be built or
/// authentication fails; no step runs in that case. Step failures are
/// reported in the returned [`SuiteReport`], not as errors.
pub async fn run_suite(
    config: &SuiteConfig,
    payloads: ScenarioPayloads,
    request_id: &str,
) -> SuiteResult<SuiteReport> {
    let span = info_span!(
        "revue_suite",
        request_id,
        base_url = %config.base_url
    );

    execute(config, payloads, request_id).instrument(span).await
}

async fn execute(
    config: &SuiteConfig,
    payloads: ScenarioPayloads,
    request_id: &str,
) -> SuiteResult<SuiteReport> {
    let session = RevueClient::new(config, request_id)?
        .authenticate(&config.credentials)
        .await?;
    info!("authenticated; running scenario steps");

    let mut context = ScenarioContext::new(payloads);
    let steps = run_steps(&session, &mut context).await;
    Ok(SuiteReport::new(
        request_id.to_string(),
        config.base_url.to_string(),
        steps,
    ))
}

/// Run every step in [`StepKind::ORDERED`] against an authenticated session.
pub async fn run_steps(session: &RevueSession, context: &mut ScenarioContext) -> Vec<StepOutcome> {
    let mut outcomes = Vec::with_capacity(StepKind::ORDERED.len());
    for step in StepKind::ORDERED {
        let outcome = run_step(step, session, context).await;
        match outcome.status {
            StepStatus::Passed => info!(step = step.label(), "step passed"),
            StepStatus::Failed | StepStatus::Skipped => warn!(
                step = step.label(),
                status = outcome.status.as_str(),
                http_status = outcome.http_status,
                detail = outcome.detail.as_deref().unwrap_or_default(),
                "step did not pass"
            ),
        }
        outcomes.push(outcome);
    }
    outcomes
}

async fn run_step(
    step: StepKind,
    session: &RevueSession,
    context: &mut ScenarioContext,
) -> StepOutcome {
    match step {
        StepKind::CreateWithRequiredFields => {
            let reply = session.create_revue(&context.payloads.create).await;
            judge(step, reply, |reply| {
                expect_status(reply, StatusCode::OK)?;
                expect_message(reply, MSG_CREATED)
            })
        }
        StepKind::ListAll => match session.list_revues().await {
            Ok(reply) => {
                let http_status = reply.status.as_u16();
                match capture_last_revue_id(&reply) {
                    Ok(revue_id) => {
                        context.last_listed_revue_id = Some(revue_id);
                        StepOutcome::passed(step, http_status)
                    }
                    Err(detail) => StepOutcome::failed(step, Some(http_status), detail),
                }
            }
            Err(err) => StepOutcome::failed(step, None, err.describe()),
        },
        StepKind::EditExisting => {
            let Some(revue_id) = context.last_listed_revue_id.as_deref() else {
                return StepOutcome::skipped(step, "no revue id was captured by the list step");
            };
            let reply = session.edit_revue(revue_id, &context.payloads.edit).await;
            judge(step, reply, |reply| {
                expect_status(reply, StatusCode::OK)?;
                expect_message(reply, MSG_EDITED)
            })
        }
        StepKind::DeleteExisting => {
            let Some(revue_id) = context.last_listed_revue_id.as_deref() else {
                return StepOutcome::skipped(step, "no revue id was captured by the list step");
            };
            let reply = session.delete_revue(revue_id).await;
            judge(step, reply, |reply| {
                expect_status(reply, StatusCode::OK)?;
                expect_message(reply, MSG_DELETED)
            })
        }
        StepKind::CreateWithMissingFields => {
            let reply = session.create_revue(&RevueDto::empty()).await;
            judge(step, reply, |reply| {
                expect_status(reply, StatusCode::BAD_REQUEST)
            })
        }
        StepKind::EditNonExisting => {
            let reply = session
                .edit_revue(FAKE_REVUE_ID, &context.payloads.edit)
                .await;
            judge(step, reply, |reply| {
                expect_status(reply, StatusCode::BAD_REQUEST)?;
                expect_body_contains(reply, MSG_NO_SUCH_REVUE)
            })
        }
        StepKind::DeleteNonExisting => {
            let reply = session.delete_revue(FAKE_REVUE_ID).await;
            judge(step, reply, |reply| {
                expect_status(reply, StatusCode::BAD_REQUEST)?;
                expect_body_contains(reply, MSG_NO_SUCH_REVUE)
            })
        }
    }
}

fn judge<F>(step: StepKind, reply: SuiteResult<ApiReply>, check: F) -> StepOutcome
where
    F: FnOnce(&ApiReply) -> Result<(), String>,
{
    match reply {
        Ok(reply) => {
            let http_status = reply.status.as_u16();
            match check(&reply) {
                Ok(()) => StepOutcome::passed(step, http_status),
                Err(detail) => StepOutcome::failed(step, Some(http_status), detail),
            }
        }
        Err(err) => StepOutcome::failed(step, None, err.describe()),
    }
}

fn capture_last_revue_id(reply: &ApiReply) -> Result<String, String> {
    expect_status(reply, StatusCode::OK)?;
    let revues: Vec<ApiResponseDto> = reply
        .json("list_revues")
        .map_err(|err| format!("{}; body: {}", err.describe(), snippet(&reply.body)))?;
    let last = revues
        .last()
        .ok_or_else(|| "expected at least one revue in the listing".to_string())?;
    last.revue_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| "last listed revue has no RevueId".to_string())
}

fn expect_status(reply: &ApiReply, expected: StatusCode) -> Result<(), String> {
    if reply.status == expected {
        Ok(())
    } else {
        Err(format!(
            "expected status {}, got {}; body: {}",
            expected.as_u16(),
            reply.status.as_u16(),
            snippet(&reply.body)
        ))
    }
}

fn expect_message(reply: &ApiReply, expected: &str) -> Result<(), String> {
    match reply.message() {
        Some(message) if message == expected => Ok(()),
        Some(message) => Err(format!("expected message {expected:?}, got {message:?}")),
        None => Err(format!(
            "expected message {expected:?}, body had none: {}",
            snippet(&reply.body)
        )),
    }
}

fn expect_body_contains(reply: &ApiReply, fragment: &str) -> Result<(), String> {
    if reply.body.contains(fragment) {
        Ok(())
    } else {
        Err(format!(
            "expected body to contain {fragment:?}, got: {}",
            snippet(&reply.body)
        ))
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    let mut chars = trimmed.chars();
    let head: String = chars.by_ref().take(BODY_SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn random_suffix(len: usize) -> String {
    let mut rng = rand::rng();
    std::iter::repeat_with(|| char::from(rng.sample(Alphanumeric)))
        .take(len)
        .collect()
}
