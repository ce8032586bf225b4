// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// The parsed Cli is also our configuration: it knows how to build the
// fetch transport and the probe policy the engine runs with.
// =============================================================================

use clap::builder::RangedU64ValueParser;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::checker::{
    BrowserTransport, CurlTransport, ProbePolicy, RetryPolicy, Transport, DEFAULT_BATCH_SIZE,
};

// Delay per batch slot the browser strategy waits after each navigation
const BROWSER_STAGGER_MS: u64 = 1000;

#[derive(Parser, Debug)]
#[command(
    name = "link-status",
    version,
    about = "Checks the HTTP status of every link found in a text file",
    long_about = "link-status pulls every http:// and https:// URL out of a text file, \
                  checks them in concurrent batches and prints the results worst-first."
)]
pub struct Cli {
    /// Text file to scan for links
    // Optional for clap so main() can print its own message when it's missing
    pub file: Option<PathBuf>,

    /// How each link is fetched
    #[arg(long, value_enum, default_value_t = TransportKind::Browser)]
    pub transport: TransportKind,

    /// Number of links checked concurrently in one batch
    #[arg(
        long,
        default_value_t = DEFAULT_BATCH_SIZE,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub batch_size: usize,

    /// Rate-limited (429) attempts per link before giving up
    #[arg(long, default_value_t = crate::checker::DEFAULT_MAX_ATTEMPTS)]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds, doubled on every attempt
    #[arg(long, default_value_t = crate::checker::DEFAULT_BASE_DELAY.as_millis() as u64)]
    pub base_delay_ms: u64,

    /// Extra wait per batch slot after each probe
    /// (default: 1000 for browser, 0 for curl)
    #[arg(long)]
    pub stagger_ms: Option<u64>,

    /// Also retry 429 answers with the curl transport
    #[arg(long)]
    pub retry: bool,

    /// Per-request timeout in seconds
    #[arg(
        long,
        default_value_t = crate::checker::DEFAULT_TIMEOUT.as_secs(),
        value_parser = RangedU64ValueParser::<u64>::new().range(1..)
    )]
    pub timeout_secs: u64,

    /// Output results in JSON format instead of colored lines
    #[arg(long)]
    pub json: bool,

    /// Don't color the result lines
    #[arg(long)]
    pub no_color: bool,

    /// Exit with code 1 when any link is broken
    #[arg(long)]
    pub fail_on_broken: bool,
}

/// The available fetch strategies
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    /// Browser-like navigation with rotating User-Agents, retries and stagger
    Browser,
    /// One `curl` process per link, fixed User-Agent
    Curl,
}

impl Cli {
    pub fn transport(&self) -> Box<dyn Transport> {
        let timeout = Duration::from_secs(self.timeout_secs);
        match self.transport {
            TransportKind::Browser => Box::new(BrowserTransport::new(timeout)),
            TransportKind::Curl => Box::new(CurlTransport::new(timeout)),
        }
    }

    pub fn probe_policy(&self) -> ProbePolicy {
        let retries = match self.transport {
            TransportKind::Browser => true,
            TransportKind::Curl => self.retry,
        };
        let default_stagger = match self.transport {
            TransportKind::Browser => BROWSER_STAGGER_MS,
            TransportKind::Curl => 0,
        };

        ProbePolicy {
            retry: retries.then(|| RetryPolicy {
                max_attempts: self.max_retries,
                base_delay: Duration::from_millis(self.base_delay_ms),
            }),
            stagger: Duration::from_millis(self.stagger_ms.unwrap_or(default_stagger)),
        }
    }
}


// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is `file` an Option?
//    - If clap required it, a missing path would print clap's own error
//    - We want our own message and exit code, so main() checks it instead
//
// 2. What is ValueEnum?
//    - Lets clap turn `--transport curl` into TransportKind::Curl
//    - Unknown values are rejected with a list of the valid ones
//
// 3. What does bool::then do?
//    - `cond.then(|| value)` is Some(value) when cond is true, None otherwise
//    - Handy for optional config like the retry policy
// -----------------------------------------------------------------------------
