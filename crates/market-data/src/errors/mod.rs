//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryClass`]: Classification for determining cascade behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which determines how the resolution cascade handles the error.
/// Only [`MarketDataError::Configuration`] ever escapes a pipeline run; every
/// other variant is absorbed into per-symbol diagnostics.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The adapter cannot be used at all (missing credential, disabled).
    #[error("Source unavailable: {provider}")]
    SourceUnavailable {
        /// The adapter that reported itself unavailable
        provider: String,
    },

    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider rate limited the request (HTTP 429/403).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider returned a quote that is not usable
    /// (zero, negative or non-finite price).
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// The operation is not implemented by this adapter.
    #[error("Not supported: {operation} by {provider}")]
    NotSupported {
        /// The operation that was attempted
        operation: String,
        /// The adapter that doesn't support it
        provider: String,
    },

    /// Invalid pipeline configuration (e.g. a zero batch size).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A manifest source could not be loaded or parsed.
    #[error("Manifest error: {source_name} - {message}")]
    ManifestError {
        /// The manifest source that failed
        source_name: String,
        /// What went wrong
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use tickerboard_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "FINNHUB".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::FailoverWithPenalty);
    ///
    /// let error = MarketDataError::SourceUnavailable { provider: "FINNHUB".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Unavailable);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::SourceUnavailable { .. } => RetryClass::Unavailable,

            // Transient errors - fail over and penalize
            Self::RateLimited { .. } | Self::Timeout { .. } => RetryClass::FailoverWithPenalty,

            Self::SymbolNotFound(_)
            | Self::ProviderError { .. }
            | Self::ValidationFailed { .. }
            | Self::NotSupported { .. }
            | Self::ManifestError { .. }
            | Self::Network(_)
            | Self::Json(_) => RetryClass::NextProvider,

            Self::Configuration(_) => RetryClass::Abort,
        }
    }
}
