use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about = "Fetch a ticker's market data and write a technical analysis report", long_about = None)]
pub struct Args {
    /// Ticker symbol to analyze (e.g. AAPL, PLTR)
    pub ticker: String,

    /// Directory receiving all output artifacts
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Bar interval requested from the provider
    #[arg(long)]
    pub interval: Option<String>,

    /// History range requested from the provider
    #[arg(long)]
    pub range: Option<String>,

    /// Use the in-repo seeded data generator instead of the network
    #[arg(long)]
    pub offline: bool,

    /// Seed for the offline generator
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Optional JSON config file with default settings
    #[arg(long)]
    pub config: Option<String>,
}
