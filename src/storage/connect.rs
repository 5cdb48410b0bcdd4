//! Startup connection to the document store with a fixed retry budget.
//!
//! `Disconnected -> Connecting -> Connected`, or `Disconnected -> Failed` once
//! every attempt has been spent. There is no backoff and no jitter: each failed
//! attempt is followed by the same fixed delay.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting { attempt: u32 },
    Connected,
    Failed,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not connect to the review store after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

/// Drives `attempt` until it succeeds or the budget runs out.
///
/// Each call of `attempt` must both establish the connection and verify it
/// (ping); either failing counts as one failed attempt.
pub struct Bootstrap {
    policy: RetryPolicy,
    state: ConnectionState,
}

impl Bootstrap {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub async fn run<T, E, F, Fut>(&mut self, mut attempt: F) -> Result<T, StartupError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut last_error = String::from("no connection attempt made");

        for n in 1..=self.policy.attempts {
            self.state = ConnectionState::Connecting { attempt: n };
            info!(
                attempt = n,
                attempts_left = self.policy.attempts - n + 1,
                "Connecting to review store..."
            );

            match attempt().await {
                Ok(conn) => {
                    self.state = ConnectionState::Connected;
                    info!(attempt = n, "✅ Connected to review store");
                    return Ok(conn);
                }
                Err(e) => {
                    warn!(attempt = n, error = %e, "⚠️  Review store connection failed");
                    last_error = e.to_string();
                    if n < self.policy.attempts {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }

        self.state = ConnectionState::Failed;
        Err(StartupError::RetriesExhausted {
            attempts: self.policy.attempts,
            last_error,
        })
    }
}
