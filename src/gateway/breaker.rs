use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, requests go through.
    Closed,
    /// Too many consecutive failures, requests are refused until the timeout passes.
    Open,
    /// Timeout passed, the next request is a probe.
    HalfOpen,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    opened_at: Option<Instant>,
}

/// Fails fast while the backend is down instead of piling up slow requests.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    failure_threshold: u32,
    timeout: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, timeout_seconds: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                opened_at: None,
            }),
            failure_threshold: failure_threshold.max(1),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn can_execute(&self) -> bool {
        self.can_execute_at(Instant::now())
    }

    pub(crate) fn can_execute_at(&self, now: Instant) -> bool {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map_or(self.timeout, |at| now.saturating_duration_since(at));
                if elapsed >= self.timeout {
                    inner.state = CircuitState::HalfOpen;
                    info!("Circuit breaker transitioning to HalfOpen state");
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        if inner.state == CircuitState::HalfOpen {
            info!("Circuit breaker recovered - transitioning to Closed state");
        }
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.opened_at = None;
    }

    pub fn record_failure(&self) {
        self.record_failure_at(Instant::now());
    }

    pub(crate) fn record_failure_at(&self, now: Instant) {
        let mut inner = self.lock();
        inner.failure_count += 1;
        match inner.state {
            CircuitState::Closed if inner.failure_count >= self.failure_threshold => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(now);
                error!(
                    "Circuit breaker OPENED - {} failures reached threshold {}",
                    inner.failure_count, self.failure_threshold
                );
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(now);
                warn!("Circuit breaker probe failed - returning to Open state");
            }
            _ => {}
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_and_probes_after_timeout() {
        let breaker = CircuitBreaker::new(2, 30);
        let t0 = Instant::now();
        breaker.record_failure_at(t0);
        assert_eq!(breaker.state(), CircuitState::Closed);
        breaker.record_failure_at(t0);
        assert_eq!(breaker.state(), CircuitState::Open);

        assert!(!breaker.can_execute_at(t0 + Duration::from_secs(10)));
        assert!(breaker.can_execute_at(t0 + Duration::from_secs(30)));
        assert_eq!(breaker.state(), CircuitState::HalfOpen);

        breaker.record_success();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn failed_probe_reopens() {
        let breaker = CircuitBreaker::new(1, 5);
        let t0 = Instant::now();
        breaker.record_failure_at(t0);
        assert!(breaker.can_execute_at(t0 + Duration::from_secs(5)));
        breaker.record_failure_at(t0 + Duration::from_secs(5));
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(!breaker.can_execute_at(t0 + Duration::from_secs(6)));
    }

    #[test]
    fn success_resets_the_count() {
        let breaker = CircuitBreaker::new(2, 5);
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
}
