use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// One part of a fetch run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    Crypto,
    Stocks,
    Indices,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Crypto, Stage::Stocks, Stage::Indices];
}

/// Build the ticker catalog and refresh its prices.
#[derive(Debug, Parser)]
#[command(name = "tickerboard", version, about)]
pub struct Cli {
    /// Directory the JSON files are written to (overrides TB_OUTPUT_DIR)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Run only the given stage; repeat for several
    #[arg(long = "only", value_enum, value_name = "STAGE")]
    pub only: Vec<Stage>,
}

impl Cli {
    /// Stages to run, in run order.
    pub fn stages(&self) -> Vec<Stage> {
        if self.only.is_empty() {
            return Stage::ALL.to_vec();
        }
        Stage::ALL
            .into_iter()
            .filter(|s| self.only.contains(s))
            .collect()
    }
}
