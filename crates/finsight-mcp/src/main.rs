//! Stock-analysis MCP server binary

use clap::Parser;
use finsight_data::MarketConfig;
use finsight_mcp::{AppState, FinsightServer, logging};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "finsight-mcp")]
#[command(about = "Stock analysis MCP server over stdio", long_about = None)]
struct Args {
    /// Directory where rendered charts are written
    #[arg(long, default_value = "./charts")]
    chart_dir: PathBuf,

    /// Alpha Vantage API key; falls back to ALPHA_VANTAGE_API_KEY
    #[arg(long)]
    alpha_vantage_key: Option<String>,

    /// Cache TTL in seconds for quote and price data
    #[arg(long, default_value_t = 60)]
    cache_ttl_secs: u64,

    /// Cache TTL in seconds for statements and company info
    #[arg(long, default_value_t = 3600)]
    fundamental_ttl_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    let args = Args::parse();

    let mut builder = MarketConfig::builder()
        .chart_dir(args.chart_dir)
        .cache_ttl_realtime(Duration::from_secs(args.cache_ttl_secs))
        .cache_ttl_fundamental(Duration::from_secs(args.fundamental_ttl_secs))
        .with_env_api_key();
    if let Some(key) = args.alpha_vantage_key {
        builder = builder.alpha_vantage_api_key(key);
    }
    let config = builder.build()?;

    info!(
        chart_dir = %config.chart_dir.display(),
        fundamental_data = config.alpha_vantage_api_key.is_some(),
        "Starting finsight-mcp server"
    );

    FinsightServer::new(AppState::from_config(config)).serve_stdio().await
}
