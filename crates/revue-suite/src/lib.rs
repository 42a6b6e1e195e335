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
#![allow(clippy::redundant_pub_crate)]

//! End-to-end checks for the Revue content-management API.
//!
//! Layout:
//! - `config.rs`: target URL, credentials, and timeout resolution
//! - `client.rs`: HTTP client, authentication, and the authenticated session
//! - `scenario.rs`: the ordered CRUD steps and their shared context
//! - `report.rs`: outcome aggregation, rendering, and telemetry forwarding
//! - `cli.rs`: argument parsing and exit-code mapping for the binary

pub(crate) mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod scenario;

pub use cli::run;
pub use client::{ApiReply, RevueClient, RevueSession};
pub use config::SuiteConfig;
pub use error::{SuiteError, SuiteResult};
pub use report::{OutputFormat, SuiteReport, TelemetryEmitter, render_report};
pub use scenario::{
    ScenarioContext, ScenarioPayloads, StepKind, StepOutcome, StepStatus, run_steps, run_suite,
};
