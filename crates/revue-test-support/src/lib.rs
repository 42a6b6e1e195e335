#![forbid(unsafe_code)]
#![deny(
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

//! Shared test helpers used across the suite's integration tests.
//! Layout: fixtures.rs (payloads and env helpers), service.rs (httpmock stand-in for the Revue API).

pub mod fixtures;
pub mod service;
