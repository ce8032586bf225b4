// src/checker/retry.rs
// =============================================================================
// Exponential backoff for rate-limited (HTTP 429) fetches.
//
// Backoff is a tiny state machine: every time a fetch is rate limited the
// prober calls advance(), which either says "wait this long, then try again"
// or "give up". Each URL gets a fresh Backoff, so no counters are shared.
//
// With the defaults (5 attempts, 1000ms base) the schedule is:
//   attempt 1 -> 429 -> wait 2s
//   attempt 2 -> 429 -> wait 4s
//   attempt 3 -> 429 -> wait 8s
//   attempt 4 -> 429 -> wait 16s
//   attempt 5 -> 429 -> give up
// =============================================================================

use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Rate-limited fetch attempts allowed before giving up.
    pub max_attempts: u32,
    /// Delay that gets doubled on every attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    attempt: u32,
    policy: RetryPolicy,
}

/// What to do after a rate-limited attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Wait { delay: Duration, next: Backoff },
    GiveUp { attempts: u32 },
}

impl Backoff {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { attempt: 0, policy }
    }

    /// Number of rate-limited attempts seen so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn advance(self) -> Step {
        let attempt = self.attempt + 1;
        if attempt >= self.policy.max_attempts {
            return Step::GiveUp { attempts: attempt };
        }

        let factor = 2u32.saturating_pow(attempt);
        Step::Wait {
            delay: self.policy.base_delay.saturating_mul(factor),
            next: Backoff { attempt, ..self },
        }
    }
}
