use super::normalizer::{normalize, SymbolConvention};

/// Decides whether a secondary quote source may be asked about a symbol.
///
/// Free-tier secondary sources generally cover plain US listings only, so a
/// symbol containing any of the excluded markers is never sent to them.
///
/// Markers are matched against the Yahoo spelling of the symbol, where a
/// share-class dot is already a dash. `BRK.B` and `BRK-B` are the same
/// instrument and get the same answer; only a real exchange suffix such as
/// `VOD.L` keeps its dot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolCompatibility {
    excluded_markers: Vec<String>,
}

impl SymbolCompatibility {
    pub const DEFAULT_MARKERS: [&'static str; 3] = ["^", "=", "."];

    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_markers: markers
                .into_iter()
                .map(Into::into)
                .filter(|m: &String| !m.is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated marker list (`"^,=,."`).
    pub fn from_csv(value: &str) -> Self {
        Self::new(value.split(',').map(str::trim))
    }

    pub fn is_compatible(&self, symbol: &str) -> bool {
        let canonical = normalize(symbol, SymbolConvention::Yahoo);
        !self
            .excluded_markers
            .iter()
            .any(|m| canonical.contains(m.as_str()))
    }

    pub fn markers(&self) -> &[String] {
        &self.excluded_markers
    }
}

impl Default for SymbolCompatibility {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MARKERS)
    }
}
