//! Provider capabilities and rate limiting configuration.

use std::time::Duration;

/// Describes which request shapes a quote provider can serve.
///
/// The registry uses this to split providers into the bulk source
/// and the single-symbol fallbacks.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// Whether the provider can quote many symbols in one request.
    pub supports_batch: bool,

    /// Whether the provider can quote one symbol per request.
    pub supports_single: bool,

    /// Upper bound on symbols per batch request. Ignored when
    /// `supports_batch` is false.
    pub max_batch_size: usize,
}

impl ProviderCapabilities {
    pub const fn single_only() -> Self {
        Self {
            supports_batch: false,
            supports_single: true,
            max_batch_size: 1,
        }
    }
}

/// Rate limiting configuration for a provider.
///
/// Controls how aggressively we can call a provider to avoid
/// hitting their rate limits and getting blocked.
#[derive(Clone, Debug)]
pub struct RateLimit {
    /// Maximum requests allowed per minute.
    pub requests_per_minute: u32,

    /// Requests that may go out back to back before the per-minute rate applies.
    pub burst: usize,

    /// Minimum spacing between two consecutive requests.
    pub min_delay: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            burst: 5,
            min_delay: Duration::from_millis(100),
        }
    }
}
