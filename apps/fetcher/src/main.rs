mod cli;
mod config;
mod main_lib;
mod sink;

use clap::Parser;
use cli::Cli;
use config::Config;
use main_lib::{init_tracing, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(dir) = cli.output_dir.clone() {
        config.output_dir = dir;
    }
    init_tracing(&config.log_format);

    let stages = cli.stages();
    tracing::info!("Starting tickerboard fetch: {:?}", stages);
    run(&config, &stages).await
}
