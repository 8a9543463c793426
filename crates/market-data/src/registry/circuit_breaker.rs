//! Per-provider circuit breaker.
//!
//! A provider that keeps getting rate limited or timing out is taken out of
//! rotation for a while instead of being hammered on every symbol:
//!
//! - **Closed**: calls go through; consecutive failures are counted.
//! - **Open**: calls are skipped until the recovery timeout elapses.
//! - **HalfOpen**: probe calls go through; one failure reopens, enough
//!   successes close.
//!
//! State lives in memory for the lifetime of the process.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

/// Circuit breaker state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Closed => "Closed",
            Self::Open => "Open",
            Self::HalfOpen => "HalfOpen",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open a closed circuit.
    pub failure_threshold: u32,
    /// How long an open circuit stays open.
    pub recovery_timeout: Duration,
    /// Probe successes that close a half-open circuit.
    pub half_open_success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(60),
            half_open_success_threshold: 2,
        }
    }
}

#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    failures: u32,
    probe_successes: u32,
    opened_at: Option<Instant>,
}

impl Circuit {
    const fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            probe_successes: 0,
            opened_at: None,
        }
    }

    fn open(&mut self) {
        self.state = CircuitState::Open;
        self.probe_successes = 0;
        self.opened_at = Some(Instant::now());
    }
}

/// Tracks one circuit per provider id.
pub struct CircuitBreaker {
    circuits: Mutex<HashMap<&'static str, Circuit>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::with_config(CircuitBreakerConfig::default())
    }

    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Lock the circuits map, recovering from poison.
    ///
    /// A poisoned map only means slightly stale counters.
    fn lock_circuits(&self) -> MutexGuard<'_, HashMap<&'static str, Circuit>> {
        self.circuits.lock().unwrap_or_else(|poisoned| {
            warn!("Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Whether a call to `provider` may go through right now.
    ///
    /// Moves an open circuit to HalfOpen once the recovery timeout elapsed.
    pub fn is_allowed(&self, provider: &'static str) -> bool {
        let mut circuits = self.lock_circuits();
        let circuit = circuits.entry(provider).or_insert_with(Circuit::closed);

        if circuit.state != CircuitState::Open {
            return true;
        }

        let recovered = circuit
            .opened_at
            .map_or(true, |t| t.elapsed() >= self.config.recovery_timeout);
        if recovered {
            info!("Circuit breaker: '{}' Open -> HalfOpen", provider);
            circuit.state = CircuitState::HalfOpen;
            circuit.probe_successes = 0;
        }
        recovered
    }

    pub fn record_success(&self, provider: &'static str) {
        let mut circuits = self.lock_circuits();
        let circuit = circuits.entry(provider).or_insert_with(Circuit::closed);

        match circuit.state {
            CircuitState::Closed => circuit.failures = 0,
            CircuitState::HalfOpen => {
                circuit.probe_successes += 1;
                if circuit.probe_successes >= self.config.half_open_success_threshold {
                    info!("Circuit breaker: '{}' HalfOpen -> Closed", provider);
                    *circuit = Circuit::closed();
                }
            }
            CircuitState::Open => {
                debug!("Circuit breaker: late success for '{}' while open", provider);
            }
        }
    }

    pub fn record_failure(&self, provider: &'static str) {
        let mut circuits = self.lock_circuits();
        let circuit = circuits.entry(provider).or_insert_with(Circuit::closed);
        circuit.failures += 1;

        match circuit.state {
            CircuitState::Closed if circuit.failures >= self.config.failure_threshold => {
                info!(
                    "Circuit breaker: '{}' Closed -> Open after {} failures",
                    provider, circuit.failures
                );
                circuit.open();
            }
            CircuitState::Closed => {
                debug!(
                    "Circuit breaker: failure for '{}' ({}/{})",
                    provider, circuit.failures, self.config.failure_threshold
                );
            }
            CircuitState::HalfOpen => {
                info!("Circuit breaker: '{}' HalfOpen -> Open", provider);
                circuit.open();
            }
            CircuitState::Open => {}
        }
    }

    pub fn state(&self, provider: &str) -> CircuitState {
        self.lock_circuits()
            .get(provider)
            .map_or(CircuitState::Closed, |c| c.state)
    }

    pub fn failure_count(&self, provider: &str) -> u32 {
        self.lock_circuits().get(provider).map_or(0, |c| c.failures)
    }

    pub fn reset(&self, provider: &str) {
        self.lock_circuits().remove(provider);
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config(threshold: u32) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: threshold,
            recovery_timeout: Duration::from_millis(10),
            half_open_success_threshold: 1,
        }
    }

    #[test]
    fn test_starts_closed() {
        let cb = CircuitBreaker::new();
        assert!(cb.is_allowed("YAHOO"));
        assert_eq!(cb.state("YAHOO"), CircuitState::Closed);
    }

    #[test]
    fn test_opens_after_threshold() {
        let cb = CircuitBreaker::with_config(CircuitBreakerConfig {
            failure_threshold: 3,
            ..Default::default()
        });

        cb.record_failure("FINNHUB");
        cb.record_failure("FINNHUB");
        assert!(cb.is_allowed("FINNHUB"));

        cb.record_failure("FINNHUB");
        assert!(!cb.is_allowed("FINNHUB"));
        assert_eq!(cb.state("FINNHUB"), CircuitState::Open);

        // Other providers are unaffected
        assert!(cb.is_allowed("YAHOO"));
    }

    #[test]
    fn test_success_resets_failures() {
        let cb = CircuitBreaker::new();
        cb.record_failure("FINNHUB");
        cb.record_failure("FINNHUB");
        assert_eq!(cb.failure_count("FINNHUB"), 2);

        cb.record_success("FINNHUB");
        assert_eq!(cb.failure_count("FINNHUB"), 0);
    }

    #[test]
    fn test_recovers_through_half_open() {
        let cb = CircuitBreaker::with_config(fast_config(1));

        cb.record_failure("FINNHUB");
        assert!(!cb.is_allowed("FINNHUB"));

        std::thread::sleep(Duration::from_millis(20));
        assert!(cb.is_allowed("FINNHUB"));
        assert_eq!(cb.state("FINNHUB"), CircuitState::HalfOpen);

        cb.record_success("FINNHUB");
        assert_eq!(cb.state("FINNHUB"), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_failure_reopens() {
        let cb = CircuitBreaker::with_config(fast_config(1));

        cb.record_failure("FINNHUB");
        std::thread::sleep(Duration::from_millis(20));
        assert!(cb.is_allowed("FINNHUB"));

        cb.record_failure("FINNHUB");
        assert_eq!(cb.state("FINNHUB"), CircuitState::Open);
        assert!(!cb.is_allowed("FINNHUB"));
    }

    #[test]
    fn test_reset() {
        let cb = CircuitBreaker::with_config(fast_config(1));
        cb.record_failure("FINNHUB");
        cb.reset("FINNHUB");
        assert_eq!(cb.state("FINNHUB"), CircuitState::Closed);
        assert!(cb.is_allowed("FINNHUB"));
    }
}
