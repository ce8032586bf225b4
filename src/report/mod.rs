// src/report/mod.rs
// =============================================================================
// Everything the user sees on stdout: the live progress line while probes
// run, and the ranked result list once they're done.
// =============================================================================

mod progress;
mod results;

pub use progress::Progress;
pub use results::{print_json, print_results, print_summary, rank};
