// src/checker/mod.rs
// =============================================================================
// This module contains the link probing engine.
//
// Submodules:
// - links: Pulls URLs out of plain text
// - fetch: The pluggable fetch strategies (browser session, curl)
// - retry: Backoff state machine for rate-limited fetches
// - probe: Checks one URL, never fails (errors become status 0)
// - batch: Runs all probes, one concurrent batch at a time
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

mod batch;
mod fetch;
mod links;
mod probe;
mod retry;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public items from submodules
// This lets users write `checker::extract_links()` instead of
// `checker::links::extract_links()`
pub use batch::{BatchScheduler, DEFAULT_BATCH_SIZE};
pub use fetch::{BrowserTransport, CurlTransport, Transport, DEFAULT_TIMEOUT};
pub use links::extract_links;
pub use probe::{ProbePolicy, ProbeResult, Prober};
pub use retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
