// src/checker/fetch.rs
// =============================================================================
// This module holds the fetch strategies: the pluggable ways of asking
// "what status does this URL answer with?".
//
// Two traits split the job:
// - Transport: knows how to launch a Session (once per run)
// - Session:   fetches one URL and reports the numeric status code
//
// Two strategies ship with the tool:
// - browser: a browser-like navigation session. One HTTP client with a
//   cookie jar is shared by the whole run, every navigation picks a random
//   desktop/mobile User-Agent, follows redirects and gives up after 15s.
// - curl: spawns the `curl` program per URL with a fixed User-Agent and only
//   captures the status code it prints.
//
// The rest of the engine only ever sees `dyn Transport` / `dyn Session`, so
// either strategy (or a test mock) can be plugged in.
//
// Rust concepts:
// - Traits + trait objects: Box<dyn Session> hides which strategy we use
// - async-trait: Lets traits have async methods that work as trait objects
// - thiserror: Derives Display/Error for our error enum
// =============================================================================

use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Navigation timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// User-Agent sent by the curl strategy.
pub const CURL_USER_AGENT: &str = "Mozilla/5.0 (compatible; link-status/0.1)";

/// Pool of desktop and mobile browsers the browser strategy pretends to be.
pub const BROWSER_USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.2 Mobile/15E148 Safari/604.1",
];

// curl's exit code for "operation timed out"
const CURL_TIMEOUT_EXIT: i32 = 28;

/// Everything that can go wrong while fetching a single URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("could not spawn fetch process: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("unexpected fetch output: {0:?}")]
    UnexpectedOutput(String),
    #[error("could not launch session: {0}")]
    Launch(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(error.to_string())
        }
    }
}

/// Something that can open a fetch session for a whole run.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Acquire whatever shared resource the strategy needs.
    async fn launch(&self) -> Result<Box<dyn Session>, FetchError>;
}

/// A live fetch session. One session serves every probe of a run.
#[async_trait]
pub trait Session: Send + Sync {
    /// Fetch `url` and return the status code it answered with.
    async fn fetch(&self, url: &str) -> Result<u16, FetchError>;

    /// Release the session. Called exactly once, after the last batch.
    async fn close(&self) {}
}

// Picks one of the browser User-Agents uniformly at random
pub fn random_user_agent() -> &'static str {
    BROWSER_USER_AGENTS[fastrand::usize(..BROWSER_USER_AGENTS.len())]
}

// -----------------------------------------------------------------------------
// Browser strategy
// -----------------------------------------------------------------------------

pub struct BrowserTransport {
    timeout: Duration,
}

impl BrowserTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Transport for BrowserTransport {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn launch(&self) -> Result<Box<dyn Session>, FetchError> {
        // Like a real browser: keep cookies between pages, follow redirects
        let client = Client::builder()
            .cookie_store(true)
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        info!(timeout_secs = self.timeout.as_secs(), "browser session launched");

        Ok(Box::new(BrowserSession {
            client,
            pages_opened: AtomicUsize::new(0),
        }))
    }
}

struct BrowserSession {
    client: Client,
    pages_opened: AtomicUsize,
}

#[async_trait]
impl Session for BrowserSession {
    async fn fetch(&self, url: &str) -> Result<u16, FetchError> {
        self.pages_opened.fetch_add(1, Ordering::Relaxed);
        let user_agent = random_user_agent();
        debug!(url, user_agent, "navigating");

        // We only need the navigation's status, the body is never read
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await?;

        Ok(response.status().as_u16())
    }

    async fn close(&self) {
        info!(
            pages = self.pages_opened.load(Ordering::Relaxed),
            "browser session closed"
        );
    }
}

// -----------------------------------------------------------------------------
// curl strategy
// -----------------------------------------------------------------------------

pub struct CurlTransport {
    timeout: Duration,
}

impl CurlTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Transport for CurlTransport {
    fn name(&self) -> &'static str {
        "curl"
    }

    // Nothing shared to set up: each probe is its own process
    async fn launch(&self) -> Result<Box<dyn Session>, FetchError> {
        Ok(Box::new(CurlSession {
            timeout: self.timeout,
        }))
    }
}

struct CurlSession {
    timeout: Duration,
}

#[async_trait]
impl Session for CurlSession {
    async fn fetch(&self, url: &str) -> Result<u16, FetchError> {
        let max_time = self.timeout.as_secs().max(1).to_string();
        let output = Command::new("curl")
            .arg("--silent")
            .args(["--output", "/dev/null"])
            .args(["--write-out", "%{http_code}"])
            .args(["--user-agent", CURL_USER_AGENT])
            .args(["--max-time", max_time.as_str()])
            .arg(url)
            .kill_on_drop(true)
            .output()
            .await?;

        classify_curl_outcome(
            output.status.code(),
            output.status.success(),
            &String::from_utf8_lossy(&output.stdout),
        )
    }
}

// Turns curl's exit code and printed %{http_code} into a fetch result
fn classify_curl_outcome(
    exit: Option<i32>,
    success: bool,
    stdout: &str,
) -> Result<u16, FetchError> {
    if exit == Some(CURL_TIMEOUT_EXIT) {
        return Err(FetchError::Timeout);
    }
    if !success {
        return Err(FetchError::Transport(match exit {
            Some(code) => format!("curl exited with code {}", code),
            None => "curl was killed by a signal".to_string(),
        }));
    }

    // curl prints 000 when it never got a response (DNS failure, refused, ...)
    match parse_curl_status(stdout)? {
        0 => Err(FetchError::Transport("curl got no response".to_string())),
        status => Ok(status),
    }
}

// Parses the three digits curl writes for %{http_code}
fn parse_curl_status(stdout: &str) -> Result<u16, FetchError> {
    let trimmed = stdout.trim();
    trimmed
        .parse::<u16>()
        .map_err(|_| FetchError::UnexpectedOutput(trimmed.to_string()))
}
