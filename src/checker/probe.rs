// src/checker/probe.rs
// =============================================================================
// This module checks one URL and turns the answer into a ProbeResult.
//
// Key functionality:
// - Asks the fetch session for the URL's status code
// - Retries with exponential backoff when the server answers 429
// - Optionally waits a little after each probe (stagger) so a batch doesn't
//   hit the same host all at once
// - Never fails: any error becomes the sentinel status 0
//
// Rust concepts:
// - &dyn Trait: We borrow the session, the scheduler keeps ownership
// - loop + match: Drives the Backoff state machine
// - Option<T>: Retry policy is simply absent when retries are off
// =============================================================================

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::fetch::{FetchError, Session};
use super::retry::{Backoff, RetryPolicy, Step};

/// Status code servers use to say "slow down".
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Status reported when a URL's status could not be determined.
pub const UNKNOWN_STATUS: u16 = 0;

// The outcome of probing one link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// The URL that was checked
    pub url: String,
    /// HTTP status code, or 0 if we couldn't get one
    pub status: u16,
}

impl ProbeResult {
    /// Severity bucket: lower means worse, and sorts first.
    ///
    /// 0 = no status, 1 = 5xx, 2 = 4xx, 3 = 3xx, 4 = 2xx, 5 = anything else
    pub fn severity(&self) -> u8 {
        severity_class(self.status)
    }

    /// Successes and redirects count as fine.
    pub fn is_ok(&self) -> bool {
        matches!(self.severity(), 3 | 4)
    }
}

pub fn severity_class(status: u16) -> u8 {
    match status {
        0 => 0,
        500..=u16::MAX => 1,
        400..=499 => 2,
        300..=399 => 3,
        200..=299 => 4,
        _ => 5,
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("max retries reached after {attempts} rate-limited attempts")]
    MaxRetriesExceeded { attempts: u32 },
}

// How a probe behaves around the fetch itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbePolicy {
    /// Backoff on 429; None means a 429 is reported as-is
    pub retry: Option<RetryPolicy>,
    /// Delay per batch slot after the status is known
    pub stagger: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct Prober {
    policy: ProbePolicy,
}

impl Prober {
    pub fn new(policy: ProbePolicy) -> Self {
        Self { policy }
    }

    /// Probes `url`, sitting in position `slot` of its batch.
    pub async fn probe(&self, session: &dyn Session, url: String, slot: usize) -> ProbeResult {
        let status = match self.status_of(session, &url).await {
            Ok(status) => status,
            Err(e) => {
                warn!(url = %url, error = %e, "probe failed");
                UNKNOWN_STATUS
            }
        };
        debug!(url = %url, status, slot, "probe finished");

        // Later slots hold on longer so the batch trickles out
        let pause = self
            .policy
            .stagger
            .saturating_mul(u32::try_from(slot).unwrap_or(u32::MAX));
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        ProbeResult { url, status }
    }

    async fn status_of(&self, session: &dyn Session, url: &str) -> Result<u16, ProbeError> {
        let Some(retry) = self.policy.retry else {
            return Ok(session.fetch(url).await?);
        };

        let mut backoff = Backoff::new(retry);
        loop {
            let status = session.fetch(url).await?;
            if status != TOO_MANY_REQUESTS {
                return Ok(status);
            }

            match backoff.advance() {
                Step::Wait { delay, next } => {
                    warn!(
                        url,
                        attempt = next.attempt(),
                        delay_ms = delay.as_millis() as u64,
                        "received 429, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    backoff = next;
                }
                Step::GiveUp { attempts } => {
                    return Err(ProbeError::MaxRetriesExceeded { attempts });
                }
            }
        }
    }
}
