//! Provider registry module.
//!
//! This module wraps quote providers with the machinery every call needs:
//! - Provider tiers and priority ordering
//! - Rate limiting per provider
//! - Circuit breaking for fault tolerance
//! - Raw quote validation
//! - Per-symbol attempt diagnostics

mod circuit_breaker;
mod provider_registry;
mod rate_limiter;
mod skip_reason;
mod validator;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use provider_registry::{FetchOutcome, ProviderRegistry, SourcedQuote, DEFAULT_CALL_TIMEOUT};
pub use rate_limiter::RateLimiter;
pub use skip_reason::{AttemptOutcome, FetchDiagnostics, ProviderAttempt, SkipReason};
pub use validator::{QuoteValidator, ValidationIssue, ValidationSeverity, ValidatorConfig};
