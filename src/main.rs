// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, written to stderr)
// 2. Parse command-line arguments using clap
// 3. Read the file and pull out every link
// 4. Check all links in batches, showing progress
// 5. Print the results worst-first, then how long it took
// 6. Exit with proper code (0 = done, 1 = no file given or broken links
//    with --fail-on-broken, 2 = error during the run)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - link extraction and probing engine
mod cli; // src/cli.rs - command-line parsing and configuration
mod report; // src/report/ - progress line and result printing

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use checker::{BatchScheduler, Prober, ProbeResult, Transport};
use cli::Cli;
use report::Progress;

// Used when RUST_LOG isn't set: only problems, so the progress line stays clean
const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();

    let Some(path) = cli.file.clone() else {
        eprintln!("Please provide a file path as an argument.");
        std::process::exit(1);
    };

    let exit_code = match run(&cli, &path).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error checking links: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(io::stderr)
        .init();
}

// Runs one full check of `path`
// Returns:
//   Ok(0) = finished
//   Ok(1) = finished, broken links found and --fail-on-broken was given
//   Err   = the file couldn't be read or the transport couldn't start
async fn run(cli: &Cli, path: &Path) -> Result<i32> {
    let transport = cli.transport();
    let mut stdout = io::stdout();

    // With --json, stdout is reserved for the JSON document
    if cli.json {
        run_with(cli, path, transport.as_ref(), &mut stdout, &mut io::stderr()).await
    } else {
        run_with(cli, path, transport.as_ref(), &mut stdout, &mut io::stdout()).await
    }
}

// `out` receives the report, `chatter` every other line
async fn run_with<O: Write, C: Write + Send>(
    cli: &Cli,
    path: &Path,
    transport: &dyn Transport,
    out: &mut O,
    chatter: &mut C,
) -> Result<i32> {
    let links = load_links(path).await?;
    writeln!(chatter, "Found {} links. Checking statuses...", links.len())?;

    let started = Instant::now();
    let scheduler = BatchScheduler::new(cli.batch_size, Prober::new(cli.probe_policy()));
    tracing::info!(transport = transport.name(), links = links.len(), "starting run");

    let mut results = {
        let progress = Progress::new(&mut *chatter, links.len());
        scheduler.run_all(transport, links, &progress).await?
    };
    let elapsed = started.elapsed();

    report::rank(&mut results);
    print_report(cli, out, &results)?;

    writeln!(
        chatter,
        "Completed in {:.3} seconds.",
        elapsed.as_secs_f64()
    )?;

    let broken = results.iter().filter(|r| !r.is_ok()).count();
    if cli.fail_on_broken && broken > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

async fn load_links(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("could not read {}", path.display()))?;
    Ok(checker::extract_links(&content))
}

fn print_report<W: Write>(cli: &Cli, out: &mut W, results: &[ProbeResult]) -> Result<()> {
    if cli.json {
        report::print_json(out, results)?;
    } else {
        let color = !cli.no_color && console::colors_enabled();
        report::print_results(out, results, color)?;
        report::print_summary(out, results)?;
    }
    Ok(())
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is run_with() generic over its writers?
//    - stdout and stderr are different types
//    - Tests pass in-memory buffers instead and read back what was printed
//
// 2. Why does run() take &Cli instead of Cli?
//    - run() only reads the configuration, it never needs to own it
//
// 3. What does .with_context() do?
//    - Wraps an error with a human-readable explanation
//    - "could not read notes.txt: No such file or directory (os error 2)"
// -----------------------------------------------------------------------------
