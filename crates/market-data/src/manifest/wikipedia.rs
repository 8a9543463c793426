//! Index constituents scraped from Wikipedia tables.
//!
//! Each preset names a page, which `<table>` on it to read (counting every
//! table on the page from zero), and the header text of the symbol and name
//! columns. Fetching and parsing are separate so parsing can be tested on
//! static HTML.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::ManifestProvider;
use crate::errors::MarketDataError;
use crate::models::TickerRecord;
use crate::resolver::{apply_exchange_suffix, zero_pad};

const USER_AGENT: &str = "tickerboard/0.1 (market data fetcher)";

/// Where a constituents table lives and how to turn its rows into symbols.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WikipediaTableSpec {
    pub name: &'static str,
    pub url: &'static str,
    pub table_index: usize,
    pub symbol_column: &'static str,
    pub name_column: &'static str,
    /// Yahoo exchange suffix appended to every symbol
    pub suffix: Option<&'static str>,
    /// Left-pad numeric codes to this width before suffixing
    pub pad_width: Option<usize>,
    /// Keep at most this many rows
    pub row_limit: Option<usize>,
}

impl WikipediaTableSpec {
    pub const SP500: Self = Self {
        name: "S&P 500 (USA)",
        url: "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies",
        table_index: 0,
        symbol_column: "Symbol",
        name_column: "Security",
        suffix: None,
        pad_width: None,
        row_limit: None,
    };

    pub const FTSE100: Self = Self {
        name: "FTSE 100 (UK)",
        url: "https://en.wikipedia.org/wiki/FTSE_100_Index",
        table_index: 4,
        symbol_column: "Ticker",
        name_column: "Company",
        suffix: Some(".L"),
        pad_width: None,
        row_limit: None,
    };

    pub const DAX: Self = Self {
        name: "DAX 40 (Germany)",
        url: "https://en.wikipedia.org/wiki/DAX",
        table_index: 4,
        symbol_column: "Ticker symbol",
        name_column: "Company",
        suffix: Some(".DE"),
        pad_width: None,
        row_limit: None,
    };

    pub const CAC40: Self = Self {
        name: "CAC 40 (France)",
        url: "https://en.wikipedia.org/wiki/CAC_40",
        table_index: 4,
        symbol_column: "Ticker",
        name_column: "Company",
        suffix: Some(".PA"),
        pad_width: None,
        row_limit: None,
    };

    pub const NIKKEI225: Self = Self {
        name: "Nikkei 225 (Japan, top 100)",
        url: "https://en.wikipedia.org/wiki/Nikkei_225",
        table_index: 3,
        symbol_column: "Code",
        name_column: "Name",
        suffix: Some(".T"),
        pad_width: None,
        row_limit: Some(100),
    };

    pub const HANG_SENG: Self = Self {
        name: "Hang Seng (Hong Kong, top 50)",
        url: "https://en.wikipedia.org/wiki/Hang_Seng_Index",
        table_index: 3,
        symbol_column: "Stock code",
        name_column: "Stock name",
        suffix: Some(".HK"),
        pad_width: Some(4),
        row_limit: Some(50),
    };

    /// Presets making up the global stocks manifest, in load order.
    pub fn global_presets() -> Vec<Self> {
        vec![
            Self::SP500,
            Self::FTSE100,
            Self::DAX,
            Self::CAC40,
            Self::NIKKEI225,
            Self::HANG_SENG,
        ]
    }

    fn to_symbol(&self, raw: &str) -> String {
        // FTSE tickers are listed with a trailing dot (`BP.`)
        let raw = raw.trim().trim_end_matches('.');
        let ticker = match self.pad_width {
            Some(width) => zero_pad(raw, width),
            None => raw.to_string(),
        };
        match self.suffix {
            Some(suffix) => apply_exchange_suffix(&ticker, suffix),
            None => ticker,
        }
    }
}

fn selector(css: &str, spec: &WikipediaTableSpec) -> Result<Selector, MarketDataError> {
    Selector::parse(css).map_err(|e| MarketDataError::ManifestError {
        source_name: spec.name.to_string(),
        message: format!("bad selector {:?}: {:?}", css, e),
    })
}

/// Visible text of a cell with footnote markers (`[3]`) removed.
fn cell_text(cell: ElementRef<'_>) -> String {
    let raw: String = cell.text().collect();
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for c in raw.chars() {
        match c {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Direct `th`/`td` children of a row.
fn row_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
        .collect()
}

/// Extract ticker records from the configured table of a Wikipedia page.
pub fn parse_table(
    html: &str,
    spec: &WikipediaTableSpec,
) -> Result<Vec<TickerRecord>, MarketDataError> {
    let manifest_error = |message: String| MarketDataError::ManifestError {
        source_name: spec.name.to_string(),
        message,
    };

    let document = Html::parse_document(html);
    let table_sel = selector("table", spec)?;
    let row_sel = selector("tr", spec)?;

    let table = document
        .select(&table_sel)
        .nth(spec.table_index)
        .ok_or_else(|| manifest_error(format!("page has no table #{}", spec.table_index)))?;

    let mut rows = table.select(&row_sel);

    // The header is the first row made only of `th` cells
    let header: Vec<String> = rows
        .by_ref()
        .map(row_cells)
        .find(|cells| !cells.is_empty() && cells.iter().all(|c| c.value().name() == "th"))
        .ok_or_else(|| manifest_error("table has no header row".to_string()))?
        .into_iter()
        .map(cell_text)
        .collect();

    let column = |title: &str| header.iter().position(|h| h == title);
    let symbol_idx = column(spec.symbol_column).ok_or_else(|| {
        manifest_error(format!("column {:?} not found in {:?}", spec.symbol_column, header))
    })?;
    let name_idx = column(spec.name_column);

    let mut records = Vec::new();
    for row in rows {
        if spec.row_limit.is_some_and(|limit| records.len() >= limit) {
            break;
        }

        let cells: Vec<String> = row_cells(row).into_iter().map(cell_text).collect();
        let Some(raw_symbol) = cells.get(symbol_idx).filter(|s| !s.is_empty()) else {
            continue;
        };

        let symbol = spec.to_symbol(raw_symbol);
        let name = name_idx
            .and_then(|i| cells.get(i))
            .filter(|n| !n.is_empty())
            .cloned()
            .unwrap_or_else(|| symbol.clone());

        records.push(TickerRecord::new(&symbol, name));
    }

    debug!("{}: parsed {} rows", spec.name, records.len());
    Ok(records)
}

/// Loads one Wikipedia constituents table.
pub struct WikipediaTableManifest {
    client: Client,
    spec: WikipediaTableSpec,
}

impl WikipediaTableManifest {
    pub fn new(spec: WikipediaTableSpec) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, spec }
    }

    pub fn spec(&self) -> &WikipediaTableSpec {
        &self.spec
    }
}

#[async_trait]
impl ManifestProvider for WikipediaTableManifest {
    fn name(&self) -> &str {
        self.spec.name
    }

    async fn load(&self) -> Result<Vec<TickerRecord>, MarketDataError> {
        let response = self
            .client
            .get(self.spec.url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| MarketDataError::ManifestError {
                source_name: self.spec.name.to_string(),
                message: e.to_string(),
            })?;
        let html = response.text().await?;
        parse_table(&html, &self.spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table class="infobox"><tr><th>Exchange</th><td>LSE</td></tr></table>
        <table class="wikitable">
          <tbody>
            <tr><th>Company</th><th>Ticker</th><th>Sector[1]</th></tr>
            <tr><td><a href="/wiki/BP">BP</a></td><td>BP.</td><td>Energy</td></tr>
            <tr><td>Vodafone Group</td><td> VOD </td><td>Telecom</td></tr>
            <tr><td>Nameless</td><td></td><td>?</td></tr>
            <tr><td></td><td>AZN.L</td><td>Pharma</td></tr>
          </tbody>
        </table>
        </body></html>
    "#;

    fn ftse_like() -> WikipediaTableSpec {
        WikipediaTableSpec {
            table_index: 1,
            ..WikipediaTableSpec::FTSE100
        }
    }

    #[test]
    fn test_parse_selects_table_by_index() {
        let records = parse_table(PAGE, &ftse_like()).unwrap();
        let symbols: Vec<&str> = records.iter().map(|r| r.symbol.as_ref()).collect();
        assert_eq!(symbols, vec!["BP.L", "VOD.L", "AZN.L"]);
    }

    #[test]
    fn test_name_falls_back_to_symbol() {
        let records = parse_table(PAGE, &ftse_like()).unwrap();
        assert_eq!(records[1].display_name, "Vodafone Group");
        assert_eq!(records[2].display_name, "AZN.L");
    }

    #[test]
    fn test_row_limit() {
        let spec = WikipediaTableSpec {
            row_limit: Some(1),
            ..ftse_like()
        };
        assert_eq!(parse_table(PAGE, &spec).unwrap().len(), 1);
    }

    #[test]
    fn test_padding_and_suffix() {
        let html = r#"<table>
            <tr><th>Stock code</th><th>Stock name</th></tr>
            <tr><td>5</td><td>HSBC Holdings</td></tr>
            <tr><td>700</td><td>Tencent</td></tr>
            <tr><td>1299</td><td>AIA</td></tr>
        </table>"#;
        let spec = WikipediaTableSpec {
            table_index: 0,
            ..WikipediaTableSpec::HANG_SENG
        };
        let symbols: Vec<String> = parse_table(html, &spec)
            .unwrap()
            .into_iter()
            .map(|r| r.symbol.to_string())
            .collect();
        assert_eq!(symbols, vec!["0005.HK", "0700.HK", "1299.HK"]);
    }

    #[test]
    fn test_missing_table_is_error() {
        let spec = WikipediaTableSpec {
            table_index: 9,
            ..WikipediaTableSpec::SP500
        };
        let err = parse_table(PAGE, &spec).unwrap_err();
        assert!(matches!(err, MarketDataError::ManifestError { .. }));
    }

    #[test]
    fn test_missing_column_is_error() {
        assert!(parse_table(PAGE, &WikipediaTableSpec { table_index: 1, ..WikipediaTableSpec::SP500 }).is_err());
    }

    #[test]
    fn test_header_footnotes_stripped() {
        let html = r#"<table>
            <tr><th>Ticker symbol[2]</th><th>Company</th></tr>
            <tr><td>SAP</td><td>SAP SE</td></tr>
        </table>"#;
        let spec = WikipediaTableSpec {
            table_index: 0,
            ..WikipediaTableSpec::DAX
        };
        let records = parse_table(html, &spec).unwrap();
        assert_eq!(records[0].symbol.as_ref(), "SAP.DE");
    }

    #[test]
    fn test_global_presets_order() {
        let names: Vec<&str> = WikipediaTableSpec::global_presets()
            .iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names.len(), 6);
        assert!(names[0].starts_with("S&P 500"));
        assert!(names[5].starts_with("Hang Seng"));
    }
}
