use std::borrow::Cow;
use std::sync::Arc;

/// Provider identifier - mostly static constants
pub type ProviderId = Cow<'static, str>;

/// Canonical ticker symbol as it appears in a manifest (case-sensitive)
pub type Symbol = Arc<str>;

/// Symbol after rewriting for one provider's conventions
pub type ProviderSymbol = String;
