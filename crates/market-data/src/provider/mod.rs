//! Quote provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait that all quote sources implement
//! - Provider capabilities and rate limiting configuration
//! - Concrete providers (Yahoo bulk, Yahoo chart, Finnhub)
//!
//! Providers receive symbols already normalized to their
//! [`SymbolConvention`](crate::resolver::SymbolConvention); they never see
//! canonical manifest symbols.

mod capabilities;
mod traits;

pub mod finnhub;
pub mod yahoo;

pub use capabilities::{ProviderCapabilities, RateLimit};
pub use traits::QuoteProvider;
