//! Bounded polling until a condition holds

use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

/// Default time to wait before giving up
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default delay between probes (one display frame)
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WaitError {
    #[error("{what} not found within {timeout:?}")]
    Timeout { what: String, timeout: Duration },
}

#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Name of the thing being waited for, used in errors and logs
    pub what: String,
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitOptions {
    pub fn new(what: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            timeout: DEFAULT_TIMEOUT,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Call `probe` until it yields a value or the timeout passes
///
/// The first probe runs immediately. There is no retry after a timeout.
pub async fn wait_for<T>(mut probe: impl FnMut() -> Option<T>, options: &WaitOptions) -> Result<T, WaitError> {
    let deadline = Instant::now() + options.timeout;
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        if let Some(found) = probe() {
            debug!(what = %options.what, attempts, "wait_for: found");
            return Ok(found);
        }
        if Instant::now() >= deadline {
            debug!(what = %options.what, attempts, "wait_for: timed out");
            return Err(WaitError::Timeout {
                what: options.what.clone(),
                timeout: options.timeout,
            });
        }
        tokio::time::sleep(options.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_for_immediate() {
        let options = WaitOptions::new("anchor");
        assert_eq!(wait_for(|| Some(7), &options).await, Ok(7));
    }

    #[tokio::test]
    async fn test_wait_for_after_some_polls() {
        let mut calls = 0;
        let options = WaitOptions::new("anchor").interval(Duration::from_millis(1));
        let found = wait_for(
            || {
                calls += 1;
                (calls >= 3).then_some("ready")
            },
            &options,
        )
        .await;
        assert_eq!(found, Ok("ready"));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_wait_for_times_out() {
        let options = WaitOptions::new("model selector")
            .timeout(Duration::from_millis(100))
            .interval(Duration::from_millis(10));
        let result: Result<(), WaitError> = wait_for(|| None, &options).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("model selector"));
    }
}
