// src/report/results.rs
// =============================================================================
// Orders the probe results and prints them.
//
// Worst news first: failures (status 0), then server errors, client errors,
// redirects, successes, and finally anything unusual (1xx and friends).
// Inside one class, lower status codes come first. The sort is stable, so
// results with the same status keep the order they finished in.
//
// Colors:
//   red     = failure or 5xx
//   yellow  = 4xx
//   magenta = 3xx
//   green   = everything else
// =============================================================================

use console::Style;
use std::io::{self, Write};

use crate::checker::ProbeResult;

pub const RESULTS_HEADER: &str = "--- RESULTS ---";

/// Sorts by (severity class, status), keeping ties in their original order.
pub fn rank(results: &mut [ProbeResult]) {
    // sort_by_key is a stable sort
    results.sort_by_key(|r| (r.severity(), r.status));
}

fn style_for(status: u16) -> Style {
    // Forced, because color is decided by the caller, not by tty detection
    let style = Style::new().force_styling(true);
    match status {
        0 | 500..=u16::MAX => style.red(),
        400..=499 => style.yellow(),
        300..=399 => style.magenta(),
        _ => style.green(),
    }
}

pub fn result_line(result: &ProbeResult, color: bool) -> String {
    let line = format!("{} - {}", result.status, result.url);
    if color {
        style_for(result.status).apply_to(line).to_string()
    } else {
        line
    }
}

/// Writes the header and one line per result, worst first.
pub fn print_results<W: Write>(out: &mut W, results: &[ProbeResult], color: bool) -> io::Result<()> {
    let mut ranked = results.to_vec();
    rank(&mut ranked);

    writeln!(out)?;
    writeln!(out, "{}", RESULTS_HEADER)?;
    for result in &ranked {
        writeln!(out, "{}", result_line(result, color))?;
    }
    Ok(())
}

pub fn print_summary<W: Write>(out: &mut W, results: &[ProbeResult]) -> io::Result<()> {
    let ok = results.iter().filter(|r| r.is_ok()).count();
    writeln!(
        out,
        "Summary: {} ok, {} broken, {} total",
        ok,
        results.len() - ok,
        results.len()
    )
}

pub fn print_json<W: Write>(out: &mut W, results: &[ProbeResult]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)?;
    Ok(())
}
