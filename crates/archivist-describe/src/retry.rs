// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry policy for description provider calls.
//!
//! Transient failures get a bounded number of retries. Throttling is retried
//! without bound when the policy says so, which is safe only because every
//! wait also watches a [`CancellationToken`].

use std::future::Future;
use std::time::Duration;

use archivist_config::model::DescribeConfig;
use archivist_core::ArchivistError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::{FailureClass, ProviderFailure};

/// Retry behaviour for a describer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retry ceiling for transient failures (and throttling when not forever).
    pub max_retries: u32,
    /// Fixed delay before each retry.
    pub backoff: Duration,
    /// Retry throttled calls until success or cancellation.
    pub retry_throttled_forever: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff: Duration::from_secs(2),
            retry_throttled_forever: true,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &DescribeConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_secs(config.retry_backoff_secs),
            retry_throttled_forever: config.retry_throttled_forever,
        }
    }

    /// Zero-backoff policy with the default ceilings, for tests.
    pub fn immediate() -> Self {
        Self {
            backoff: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Run `op` until it succeeds, fails fatally, exhausts its retries, or
    /// `cancel` fires.
    pub async fn run<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<T, ArchivistError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderFailure>>,
    {
        let mut counted_retries: u32 = 0;
        let mut attempt: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(ArchivistError::Cancelled);
            }
            attempt += 1;

            let failure = tokio::select! {
                _ = cancel.cancelled() => return Err(ArchivistError::Cancelled),
                result = op() => match result {
                    Ok(value) => {
                        if attempt > 1 {
                            debug!(attempt, "description call succeeded after retry");
                        }
                        return Ok(value);
                    }
                    Err(failure) => failure,
                },
            };

            let retry = match failure.class {
                FailureClass::Fatal => false,
                FailureClass::Throttled if self.retry_throttled_forever => true,
                FailureClass::Throttled | FailureClass::Transient => {
                    counted_retries += 1;
                    counted_retries <= self.max_retries
                }
            };

            if !retry {
                warn!(
                    attempt,
                    class = ?failure.class,
                    error = %failure.message,
                    "description call failed, giving up"
                );
                return Err(failure.into_unavailable());
            }

            warn!(
                attempt,
                class = ?failure.class,
                error = %failure.message,
                "description call failed, will retry"
            );
            metrics::counter!("archivist_describe_retries_total").increment(1);

            tokio::select! {
                _ = cancel.cancelled() => return Err(ArchivistError::Cancelled),
                _ = tokio::time::sleep(self.backoff) => {}
            }
        }
    }
}
