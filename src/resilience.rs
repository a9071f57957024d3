//! Retry and circuit-breaker wrapper for metered upstream calls.
//!
//! Transient failures (rate limits, 5xx) are retried with exponential
//! backoff; permanent failures abort immediately. When a call exhausts all
//! attempts the circuit opens and subsequent calls fail fast until a
//! cooldown elapses, after which a single probe is let through.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

/// Classification of an upstream failure for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Transient (rate limit, 5xx): retry with backoff.
    Transient,
    /// Permanent (4xx, malformed response, network fault): abort the loop.
    Permanent,
}

/// Errors the resilience layer knows how to triage.
pub trait UpstreamError: std::fmt::Display {
    fn classify(&self) -> FailureClass;
}

#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    /// Retries after the first attempt, so `max_retries + 1` attempts total.
    pub max_retries: u32,
    /// Backoff for attempt `n` is `base_delay * 2^n`.
    pub base_delay: Duration,
    /// How long the circuit stays open before a probe is allowed.
    pub circuit_timeout: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            circuit_timeout: Duration::from_secs(60),
        }
    }
}

struct CircuitState {
    open: bool,
    /// Monotonic instant for the cooldown check plus a wall-clock stamp for
    /// the status endpoint.
    last_failure: Option<(Instant, DateTime<Utc>)>,
}

/// Circuit snapshot for the monitoring endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitStatus {
    pub circuit_open: bool,
    pub last_failure_time: Option<DateTime<Utc>>,
    pub time_since_last_failure_secs: Option<f64>,
}

pub struct ResilienceManager {
    config: ResilienceConfig,
    circuit: Mutex<CircuitState>,
}

impl ResilienceManager {
    pub fn new(config: ResilienceConfig) -> Self {
        Self {
            config,
            circuit: Mutex::new(CircuitState {
                open: false,
                last_failure: None,
            }),
        }
    }

    /// Run `op` under the retry loop and circuit breaker. Returns `None`
    /// when the circuit is open or every permitted attempt failed.
    pub async fn execute<T, E, F, Fut>(&self, mut op: F) -> Option<T>
    where
        E: UpstreamError,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.admit_call().await {
            return None;
        }

        let mut attempt = 0;
        loop {
            match op().await {
                Ok(result) => return Some(result),
                Err(err) => match err.classify() {
                    FailureClass::Transient if attempt < self.config.max_retries => {
                        let wait = self.config.base_delay * 2u32.pow(attempt);
                        warn!(
                            "transient upstream failure, attempt {}/{}: {} (retrying in {:?})",
                            attempt + 1,
                            self.config.max_retries + 1,
                            err,
                            wait
                        );
                        sleep(wait).await;
                        attempt += 1;
                    }
                    FailureClass::Transient => {
                        error!(
                            "all {} attempts failed, opening circuit breaker: {}",
                            self.config.max_retries + 1,
                            err
                        );
                        self.trip().await;
                        return None;
                    }
                    FailureClass::Permanent => {
                        error!("permanent upstream failure, not retrying: {}", err);
                        return None;
                    }
                },
            }
        }
    }

    pub async fn status(&self) -> CircuitStatus {
        let circuit = self.circuit.lock().await;
        CircuitStatus {
            circuit_open: circuit.open,
            last_failure_time: circuit.last_failure.map(|(_, at)| at),
            time_since_last_failure_secs: circuit
                .last_failure
                .map(|(instant, _)| instant.elapsed().as_secs_f64()),
        }
    }

    /// Check the circuit before attempting a call. An open circuit inside
    /// its cooldown rejects the call; past the cooldown it closes and the
    /// call proceeds as the probe.
    async fn admit_call(&self) -> bool {
        let mut circuit = self.circuit.lock().await;
        if !circuit.open {
            return true;
        }
        if let Some((failed_at, _)) = circuit.last_failure {
            if failed_at.elapsed() < self.config.circuit_timeout {
                warn!("circuit breaker open, skipping request");
                return false;
            }
        }
        info!("circuit breaker cooldown elapsed, probing upstream");
        circuit.open = false;
        true
    }

    async fn trip(&self) {
        let mut circuit = self.circuit.lock().await;
        circuit.open = true;
        circuit.last_failure = Some((Instant::now(), Utc::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum TestError {
        RateLimited,
        NotFound,
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::RateLimited => write!(f, "rate limited"),
                Self::NotFound => write!(f, "not found"),
            }
        }
    }

    impl UpstreamError for TestError {
        fn classify(&self) -> FailureClass {
            match self {
                Self::RateLimited => FailureClass::Transient,
                Self::NotFound => FailureClass::Permanent,
            }
        }
    }

    fn manager() -> ResilienceManager {
        ResilienceManager::new(ResilienceConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_passes_through() {
        let calls = AtomicU32::new(0);
        let result = manager()
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, TestError>(42) }
            })
            .await;
        assert_eq!(result, Some(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_retry_with_backoff() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let result = manager()
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(TestError::RateLimited)
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;
        assert_eq!(result, Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Backoff schedule 1s then 2s before the third attempt succeeds.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_aborts_without_retry() {
        let mgr = manager();
        let calls = AtomicU32::new(0);
        let result: Option<u32> = mgr
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::NotFound) }
            })
            .await;
        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // An aborted call is not exhaustion; the circuit stays closed.
        assert!(!mgr.status().await.circuit_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_opens_circuit() {
        let mgr = manager();
        let calls = AtomicU32::new(0);
        let start = Instant::now();
        let result: Option<u32> = mgr
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::RateLimited) }
            })
            .await;
        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 1s + 2s + 4s of backoff between the four attempts.
        assert_eq!(start.elapsed(), Duration::from_secs(7));
        let status = mgr.status().await;
        assert!(status.circuit_open);
        assert!(status.last_failure_time.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_circuit_short_circuits_inside_cooldown() {
        let mgr = manager();
        let result: Option<u32> = mgr
            .execute(|| async { Err(TestError::RateLimited) })
            .await;
        assert_eq!(result, None);

        tokio::time::advance(Duration::from_secs(1)).await;
        let calls = AtomicU32::new(0);
        let result = mgr
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, TestError>(1) }
            })
            .await;
        // Fast-failed without invoking the op at all.
        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_after_cooldown_closes_circuit() {
        let mgr = manager();
        let result: Option<u32> = mgr
            .execute(|| async { Err(TestError::RateLimited) })
            .await;
        assert_eq!(result, None);
        assert!(mgr.status().await.circuit_open);

        tokio::time::advance(Duration::from_secs(61)).await;
        let calls = AtomicU32::new(0);
        let result = mgr
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, TestError>(9) }
            })
            .await;
        // Exactly one probe call, and its success closes the circuit.
        assert_eq!(result, Some(9));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!mgr.status().await.circuit_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_probe_reopens_circuit() {
        let mgr = manager();
        let _: Option<u32> = mgr
            .execute(|| async { Err(TestError::RateLimited) })
            .await;
        tokio::time::advance(Duration::from_secs(61)).await;

        let _: Option<u32> = mgr
            .execute(|| async { Err(TestError::RateLimited) })
            .await;
        let status = mgr.status().await;
        assert!(status.circuit_open);
        // The cooldown restarted from the probe's failure.
        assert!(status.time_since_last_failure_secs.unwrap() < 60.0);
    }
}
