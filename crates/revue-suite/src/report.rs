//! Outcome aggregation, rendering, and telemetry forwarding.

use std::fmt::Write as _;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::{SuiteError, SuiteResult};
use crate::scenario::{StepKind, StepOutcome, StepStatus};

/// Environment variable naming the telemetry collector.
pub const ENV_TELEMETRY_ENDPOINT: &str = "REVUE_TELEMETRY_ENDPOINT";

/// Rendering choices for the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned, human-readable rows.
    Table,
    /// Pretty-printed JSON document.
    Json,
}

/// Results of one suite run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Correlation id sent as `x-request-id` on every call.
    pub request_id: String,
    /// Deployment the suite ran against.
    pub base_url: String,
    /// Outcomes in execution order.
    pub steps: Vec<StepOutcome>,
}

impl SuiteReport {
    /// Assemble a report from executed steps.
    #[must_use]
    pub const fn new(request_id: String, base_url: String, steps: Vec<StepOutcome>) -> Self {
        Self {
            request_id,
            base_url,
            steps,
        }
    }

    /// Number of steps with the given status.
    #[must_use]
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps
            .iter()
            .filter(|outcome| outcome.status == status)
            .count()
    }

    /// True when at least one step ran and every step passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.steps.is_empty() && self.count(StepStatus::Passed) == self.steps.len()
    }

    /// Outcome of a particular step, if it ran.
    #[must_use]
    pub fn outcome(&self, step: StepKind) -> Option<&StepOutcome> {
        self.steps.iter().find(|outcome| outcome.step == step)
    }
}

/// Render a report in the requested format.
///
/// # Errors
///
/// Returns [`SuiteError::Decode`] if JSON serialisation fails.
pub fn render_report(report: &SuiteReport, format: OutputFormat) -> SuiteResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report).map_err(|source| {
            SuiteError::Decode {
                operation: "render_report",
                source,
            }
        }),
        OutputFormat::Table => Ok(render_table(report)),
    }
}

fn render_table(report: &SuiteReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "target: {}", report.base_url);
    let _ = writeln!(out, "request id: {}", report.request_id);
    let _ = writeln!(out, "{:<4} {:<28} {:>6} RESULT", "#", "STEP", "HTTP");
    for (index, outcome) in report.steps.iter().enumerate() {
        let http = outcome
            .http_status
            .map_or_else(|| "-".to_string(), |status| status.to_string());
        let _ = writeln!(
            out,
            "{:<4} {:<28} {:>6} {} {}",
            index + 1,
            outcome.step.label(),
            http,
            outcome.status.as_str(),
            outcome.detail.as_deref().unwrap_or("")
        );
    }
    let _ = write!(
        out,
        "passed: {}  failed: {}  skipped: {}",
        report.count(StepStatus::Passed),
        report.count(StepStatus::Failed),
        report.count(StepStatus::Skipped)
    );
    out
}

/// Telemetry emitter used to forward suite outcomes.
#[derive(Clone)]
pub struct TelemetryEmitter {
    client: Client,
    endpoint: Url,
}

impl TelemetryEmitter {
    /// Build an emitter from [`ENV_TELEMETRY_ENDPOINT`], if set and valid.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var(ENV_TELEMETRY_ENDPOINT).ok()?;
        Self::for_endpoint(endpoint.parse().ok()?)
    }

    /// Build an emitter posting to `endpoint`.
    #[must_use]
    pub fn for_endpoint(endpoint: Url) -> Option<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .ok()?;
        Some(Self { client, endpoint })
    }

    /// Post a summary of the run; failures are logged and otherwise ignored.
    pub async fn emit(
        &self,
        request_id: &str,
        outcome: &str,
        exit_code: i32,
        report: Option<&SuiteReport>,
    ) {
        let event = TelemetryEvent {
            suite: "revue-suite",
            outcome,
            request_id,
            exit_code,
            passed: report.map(|report| report.count(StepStatus::Passed)),
            failed: report.map(|report| report.count(StepStatus::Failed)),
            skipped: report.map(|report| report.count(StepStatus::Skipped)),
            build_sha: revue_telemetry::build_sha(),
            timestamp_ms: timestamp_now_ms(),
        };

        if let Err(err) = self
            .client
            .post(self.endpoint.clone())
            .json(&event)
            .send()
            .await
        {
            tracing::debug!(error = %err, "telemetry emit failed");
        }
    }
}

#[derive(Serialize)]
struct TelemetryEvent<'a> {
    suite: &'a str,
    outcome: &'a str,
    request_id: &'a str,
    exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    passed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skipped: Option<usize>,
    build_sha: &'a str,
    timestamp_ms: u64,
}

fn timestamp_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
