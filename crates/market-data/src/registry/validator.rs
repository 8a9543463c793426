//! Raw quote validation.
//!
//! Hard checks reject a quote so the cascade moves on:
//! - price must be finite and strictly positive
//! - price must not round to zero at output precision
//!
//! Soft checks only log: an unusable reference price, an implausible day
//! move or a price above the sanity ceiling are still accepted.

use log::warn;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{round_output, RawQuote, OUTPUT_DECIMALS};

/// Validation severity levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationSeverity {
    /// Reject the quote; try the next step.
    Hard,
    /// Accept the quote but log a warning.
    Soft,
}

#[derive(Clone, Debug)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
}

impl ValidationIssue {
    fn hard(message: impl Into<String>) -> Self {
        Self {
            severity: ValidationSeverity::Hard,
            message: message.into(),
        }
    }

    fn soft(message: impl Into<String>) -> Self {
        Self {
            severity: ValidationSeverity::Soft,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Prices above this are logged as suspicious.
    pub max_price: f64,
    /// Absolute day move (percent) above which a warning is logged.
    pub warn_change_percent: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_price: 1_000_000_000.0,
            warn_change_percent: 500.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct QuoteValidator {
    config: ValidatorConfig,
}

impl QuoteValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Collect every issue with `quote`, hard and soft.
    pub fn issues(&self, quote: &RawQuote) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let price = quote.price;

        if !price.is_finite() {
            issues.push(ValidationIssue::hard(format!("non-finite price {}", price)));
            return issues;
        }
        if price <= 0.0 {
            issues.push(ValidationIssue::hard(format!("non-positive price {}", price)));
            return issues;
        }
        match Decimal::try_from(price) {
            Ok(d) if round_output(d).is_zero() => {
                issues.push(ValidationIssue::hard(format!(
                    "price {} rounds to zero at {} decimals",
                    price, OUTPUT_DECIMALS
                )));
                return issues;
            }
            Ok(_) => {}
            Err(_) => {
                issues.push(ValidationIssue::hard(format!("unrepresentable price {}", price)));
                return issues;
            }
        }
        if price > self.config.max_price {
            issues.push(ValidationIssue::soft(format!(
                "price {} exceeds sanity ceiling {}",
                price, self.config.max_price
            )));
        }

        match (quote.reference_price, quote.usable_reference()) {
            (Some(r), None) => {
                issues.push(ValidationIssue::soft(format!("unusable reference price {}", r)));
            }
            (_, Some(r)) => {
                let change = (price - r) / r * 100.0;
                if change.abs() > self.config.warn_change_percent {
                    issues.push(ValidationIssue::soft(format!(
                        "implausible change {:.2}% (price {}, reference {})",
                        change, price, r
                    )));
                }
            }
            (None, None) => {}
        }

        issues
    }

    /// Validate `quote` for `symbol`.
    ///
    /// Soft issues are logged; the first hard issue becomes the error.
    pub fn validate(&self, symbol: &str, quote: &RawQuote) -> Result<(), MarketDataError> {
        let mut hard = None;
        for issue in self.issues(quote) {
            match issue.severity {
                ValidationSeverity::Soft => warn!("Quote for {}: {}", symbol, issue.message),
                ValidationSeverity::Hard => {
                    if hard.is_none() {
                        hard = Some(issue.message);
                    }
                }
            }
        }

        match hard {
            Some(message) => Err(MarketDataError::ValidationFailed {
                message: format!("{}: {}", symbol, message),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_quote() {
        let v = QuoteValidator::new();
        assert!(v.validate("AAA", &RawQuote::new(10.0, Some(8.0))).is_ok());
        assert!(v.validate("AAA", &RawQuote::new(0.005, None)).is_ok());
    }

    #[test]
    fn test_price_rounding_to_zero_rejected() {
        let v = QuoteValidator::new();
        let err = v.validate("DUST", &RawQuote::new(0.0001, Some(0.0002))).unwrap_err();
        assert!(err.to_string().contains("rounds to zero"));
        assert!(v.validate("DUST", &RawQuote::new(0.004999, None)).is_err());
    }

    #[test]
    fn test_zero_price_rejected() {
        let v = QuoteValidator::new();
        let err = v.validate("AAA", &RawQuote::new(0.0, Some(1.0))).unwrap_err();
        assert!(matches!(err, MarketDataError::ValidationFailed { .. }));
    }

    #[test]
    fn test_negative_and_non_finite_rejected() {
        let v = QuoteValidator::new();
        assert!(v.validate("AAA", &RawQuote::new(-1.0, None)).is_err());
        assert!(v.validate("AAA", &RawQuote::new(f64::NAN, None)).is_err());
        assert!(v.validate("AAA", &RawQuote::new(f64::INFINITY, None)).is_err());
    }

    #[test]
    fn test_ceiling_only_warns() {
        let v = QuoteValidator::with_config(ValidatorConfig {
            max_price: 100.0,
            ..Default::default()
        });
        let quote = RawQuote::new(101.0, None);
        assert_eq!(v.issues(&quote)[0].severity, ValidationSeverity::Soft);
        assert!(v.validate("AAA", &quote).is_ok());

        // Default ceiling: a huge but finite price still passes
        let v = QuoteValidator::new();
        assert!(v.validate("BRK-A", &RawQuote::new(2.5e9, Some(2.4e9))).is_ok());
    }

    #[test]
    fn test_soft_issues_accepted() {
        let v = QuoteValidator::new();
        let quote = RawQuote::new(10.0, Some(f64::NAN));
        let issues = v.issues(&quote);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ValidationSeverity::Soft);
        assert!(v.validate("AAA", &quote).is_ok());

        let spike = RawQuote::new(100.0, Some(1.0));
        assert_eq!(v.issues(&spike)[0].severity, ValidationSeverity::Soft);
        assert!(v.validate("AAA", &spike).is_ok());
    }
}
