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

//! Binary entrypoint that runs the Revue API checks and exits with the suite outcome.

use std::process;

/// Runs the suite and forwards its exit code to the shell.
#[tokio::main]
async fn main() {
    let exit_code = revue_suite::run().await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
