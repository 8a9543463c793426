//! Hand-maintained symbol lists.

use async_trait::async_trait;

use super::ManifestProvider;
use crate::errors::MarketDataError;
use crate::models::TickerRecord;

/// Top 30 Philippine stocks by market cap.
pub const PH_STOCKS: &[(&str, &str)] = &[
    ("SM.PS", "SM Investments Corporation"),
    ("BDO.PS", "BDO Unibank"),
    ("ALI.PS", "Ayala Land"),
    ("AC.PS", "Ayala Corporation"),
    ("ICT.PS", "International Container Terminal Services"),
    ("JFC.PS", "Jollibee Foods Corporation"),
    ("BPI.PS", "Bank of the Philippine Islands"),
    ("SMPH.PS", "SM Prime Holdings"),
    ("TEL.PS", "PLDT Inc."),
    ("MBT.PS", "Metrobank"),
    ("GLO.PS", "Globe Telecom"),
    ("URC.PS", "Universal Robina Corporation"),
    ("GTCAP.PS", "GT Capital Holdings"),
    ("DMC.PS", "DMCI Holdings"),
    ("AEV.PS", "Aboitiz Equity Ventures"),
    ("AP.PS", "Aboitiz Power Corporation"),
    ("SECB.PS", "Security Bank Corporation"),
    ("MEG.PS", "Megaworld Corporation"),
    ("PGOLD.PS", "Puregold Price Club"),
    ("RLC.PS", "Robinsons Land Corporation"),
    ("CNPF.PS", "Century Pacific Food"),
    ("MPI.PS", "Metro Pacific Investments Corporation"),
    ("BLOOM.PS", "Bloomberry Resorts Corporation"),
    ("MONDE.PS", "Monde Nissin Corporation"),
    ("LTG.PS", "LT Group"),
    ("AGI.PS", "Alliance Global Group"),
    ("SCC.PS", "Semirara Mining and Power Corporation"),
    ("PCOR.PS", "Petron Corporation"),
    ("CEI.PS", "Crown Equities"),
    ("SEVN.PS", "Philippine Seven Corporation"),
];

/// Major global indices followed by commodity futures.
pub const INDICES_AND_COMMODITIES: &[(&str, &str)] = &[
    ("^GSPC", "S&P 500 Index"),
    ("^IXIC", "NASDAQ Composite"),
    ("^DJI", "Dow Jones Industrial Average"),
    ("^PSI", "PSEi Index (Philippines)"),
    ("^N225", "Nikkei 225 (Japan)"),
    ("^HSI", "Hang Seng Index (Hong Kong)"),
    ("^FTSE", "FTSE 100 (UK)"),
    ("^GDAXI", "DAX (Germany)"),
    ("^FCHI", "CAC 40 (France)"),
    ("^STOXX50E", "Euro Stoxx 50"),
    ("^AXJO", "ASX 200 (Australia)"),
    ("^BVSP", "Bovespa Index (Brazil)"),
    ("GC=F", "Gold Futures"),
    ("SI=F", "Silver Futures"),
    ("CL=F", "Crude Oil WTI Futures"),
    ("BZ=F", "Brent Crude Oil Futures"),
    ("NG=F", "Natural Gas Futures"),
    ("HG=F", "Copper Futures"),
    ("PL=F", "Platinum Futures"),
    ("PA=F", "Palladium Futures"),
];

pub struct StaticManifest {
    name: &'static str,
    entries: &'static [(&'static str, &'static str)],
}

impl StaticManifest {
    pub const fn new(name: &'static str, entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { name, entries }
    }

    pub const fn ph_stocks() -> Self {
        Self::new("Philippine stocks", PH_STOCKS)
    }

    pub const fn indices_and_commodities() -> Self {
        Self::new("Indices & commodities", INDICES_AND_COMMODITIES)
    }

    pub fn records(&self) -> Vec<TickerRecord> {
        self.entries
            .iter()
            .map(|(symbol, name)| TickerRecord::new(symbol, *name))
            .collect()
    }
}

#[async_trait]
impl ManifestProvider for StaticManifest {
    fn name(&self) -> &str {
        self.name
    }

    async fn load(&self) -> Result<Vec<TickerRecord>, MarketDataError> {
        Ok(self.records())
    }
}
