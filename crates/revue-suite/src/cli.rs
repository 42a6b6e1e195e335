//! Command-line entrypoint that runs the suite against a live deployment.

use std::fmt;

use anyhow::anyhow;
use clap::Parser;
use revue_telemetry::{LogFormat, LoggingConfig, init_logging};
use uuid::Uuid;

use crate::config::{
    DEFAULT_BASE_URL, DEFAULT_EMAIL, DEFAULT_PASSWORD, ENV_BASE_URL, ENV_EMAIL, ENV_PASSWORD,
    ENV_TIMEOUT_SECS, SuiteConfig,
};
use crate::error::SuiteError;
use crate::report::{OutputFormat, SuiteReport, TelemetryEmitter, render_report};
use crate::scenario::{ScenarioPayloads, run_suite};

const EXIT_STEPS_FAILED: i32 = 1;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl From<SuiteError> for CliError {
    fn from(err: SuiteError) -> Self {
        if err.is_config() {
            Self::validation(err.describe())
        } else {
            Self::failure(anyhow!(err.describe()))
        }
    }
}

#[derive(Parser)]
#[command(
    name = "revue-suite",
    about = "End-to-end CRUD checks against a Revue API deployment"
)]
pub(crate) struct Cli {
    #[arg(long, env = ENV_BASE_URL, default_value = DEFAULT_BASE_URL)]
    base_url: String,
    #[arg(long, env = ENV_EMAIL, default_value = DEFAULT_EMAIL)]
    email: String,
    #[arg(long, env = ENV_PASSWORD, default_value = DEFAULT_PASSWORD, hide_env_values = true)]
    password: String,
    /// Per-request timeout in seconds; unset keeps the HTTP client default.
    #[arg(long, env = ENV_TIMEOUT_SECS)]
    timeout: Option<String>,
    #[arg(long, env = "REVUE_OUTPUT", value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// Log format: `json`, `pretty`, or `auto`.
    #[arg(long, env = "REVUE_LOG_FORMAT", default_value = "auto")]
    log_format: String,
}

impl Cli {
    /// Resolve flags through the same lookup the library uses for the environment.
    fn suite_config(&self) -> Result<SuiteConfig, CliError> {
        let config = SuiteConfig::from_lookup(|name| match name {
            ENV_BASE_URL => Some(self.base_url.clone()),
            ENV_EMAIL => Some(self.email.clone()),
            ENV_PASSWORD => Some(self.password.clone()),
            ENV_TIMEOUT_SECS => self.timeout.clone(),
            _ => None,
        })?;
        Ok(config)
    }
}

impl fmt::Debug for Cli {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Cli")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("output", &self.output)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// Parses CLI arguments, runs the suite, prints the report, and forwards the
/// outcome to telemetry. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let format = cli.log_format.parse::<LogFormat>().unwrap_or_else(|err| {
        eprintln!("warning: {err}; falling back to auto");
        LogFormat::infer()
    });
    let logging = LoggingConfig {
        format,
        ..LoggingConfig::default()
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err}");
    }

    let telemetry = TelemetryEmitter::from_env();
    let output = cli.output;
    let request_id = Uuid::new_v4().to_string();
    let result = dispatch(&cli, &request_id).await;

    let (exit_code, report) = match result {
        Ok(report) => {
            let exit_code = if report.is_success() {
                0
            } else {
                EXIT_STEPS_FAILED
            };
            match render_report(&report, output) {
                Ok(text) => println!("{text}"),
                Err(err) => eprintln!("error: {}", err.describe()),
            }
            (exit_code, Some(report))
        }
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            (err.exit_code(), None)
        }
    };

    if let Some(emitter) = &telemetry {
        emitter
            .emit(&request_id, outcome_label(exit_code), exit_code, report.as_ref())
            .await;
    }

    exit_code
}

async fn dispatch(cli: &Cli, request_id: &str) -> Result<SuiteReport, CliError> {
    let config = cli.suite_config()?;
    tracing::info!(
        request_id,
        base_url = %config.base_url,
        email = %config.credentials.email,
        "starting revue suite"
    );
    let report = run_suite(&config, ScenarioPayloads::generate(), request_id).await?;
    Ok(report)
}

const fn outcome_label(exit_code: i32) -> &'static str {
    match exit_code {
        0 => "success",
        EXIT_STEPS_FAILED => "steps_failed",
        _ => "error",
    }
}
