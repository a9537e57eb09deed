use clap::Parser;
use std::process;
use stockscope::analyzer::{IndicatorColumns, analyze};
use stockscope::cli::Args;
use stockscope::config::{AppConfig, ConfigFile, load_config};
use stockscope::output::files::{
    analysis_path, chart_image_path, indicators_csv_path, raw_chart_path, raw_holders_path,
    raw_insights_path, write_indicators_csv, write_json,
};
use stockscope::output::render_chart;
use stockscope::provider::{DataProvider, MockProvider, YahooProvider};
use stockscope::report::compose;
use stockscope::series::build_series;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    // Load optional configuration file
    let file_config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Config load error: {}", e);
                process::exit(1);
            }
        },
        None => ConfigFile::default(),
    };
    let config = AppConfig::resolve(&args, file_config);

    if let Err(e) = std::fs::create_dir_all(&config.output_dir) {
        error!(
            "Failed to create output directory {}: {}",
            config.output_dir.display(),
            e
        );
        process::exit(1);
    }

    let provider: Box<dyn DataProvider> = if args.offline {
        info!("Using offline data generator (seed {})", args.seed);
        Box::new(MockProvider::new(args.seed))
    } else {
        Box::new(YahooProvider::new(config.request_timeout_secs))
    };

    let ticker = args.ticker.as_str();
    info!("Analyzing ticker: {}", ticker);

    // Chart data is mandatory; a failed fetch terminates the run.
    info!(
        "Fetching chart data ({} interval, {} range)...",
        config.interval, config.range
    );
    let chart_payload = match provider.chart(ticker, &config.interval, &config.range).await {
        Ok(payload) => payload,
        Err(e) => {
            error!("Chart fetch failed: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = write_json(&raw_chart_path(&config.output_dir, ticker), &chart_payload) {
        warn!("Failed to save raw chart payload: {}", e);
    }

    // Insights and holders are optional; missing data degrades the report.
    info!("Fetching insights data...");
    let insights_payload = match provider.insights(ticker).await {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!("Insights fetch failed, continuing without: {}", e);
            None
        }
    };
    if let Some(payload) = &insights_payload {
        if let Err(e) = write_json(&raw_insights_path(&config.output_dir, ticker), payload) {
            warn!("Failed to save raw insights payload: {}", e);
        }
    }

    info!("Fetching holders data...");
    let holders_payload = match provider.holders(ticker).await {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!("Holders fetch failed, continuing without: {}", e);
            None
        }
    };
    if let Some(payload) = &holders_payload {
        if let Err(e) = write_json(&raw_holders_path(&config.output_dir, ticker), payload) {
            warn!("Failed to save raw holders payload: {}", e);
        }
    }

    info!("Building price series...");
    let series = match build_series(&chart_payload) {
        Ok(series) => series,
        Err(e) => {
            error!("Chart payload invalid: {}", e);
            process::exit(1);
        }
    };
    if series.is_empty() {
        warn!("Price series is empty; indicators will report insufficient data");
    } else {
        info!("Built series with {} bars", series.bars.len());
    }

    let insights = insights_payload
        .as_ref()
        .map(|p| p.snapshot())
        .unwrap_or_default();
    let holders = holders_payload
        .as_ref()
        .map(|p| p.snapshot())
        .unwrap_or_default();

    info!("Computing indicators...");
    let cols = IndicatorColumns::compute(&series.bars);
    let tech = analyze(&series.bars, &cols);

    info!("Composing analysis report...");
    let report = compose(ticker, &series, &tech, &insights, &holders);

    // Each artifact below is independent; a failure is logged, not fatal.
    let report_path = analysis_path(&config.output_dir, ticker);
    match write_json(&report_path, &report) {
        Ok(()) => info!("Analysis report saved to {}", report_path.display()),
        Err(e) => warn!("Failed to save analysis report: {}", e),
    }

    if series.is_empty() {
        warn!("Skipping indicators CSV and chart: no price data");
    } else {
        let csv_path = indicators_csv_path(&config.output_dir, ticker);
        match write_indicators_csv(&csv_path, &series.bars, &cols) {
            Ok(()) => info!("Technical indicators saved to {}", csv_path.display()),
            Err(e) => warn!("Failed to save indicators CSV: {}", e),
        }

        let image_path = chart_image_path(&config.output_dir, ticker);
        match render_chart(
            &image_path,
            &report.basic_info.company_name,
            ticker,
            &report.basic_info.currency,
            &series.bars,
            &cols,
        ) {
            Ok(()) => info!("Stock chart saved to {}", image_path.display()),
            Err(e) => warn!("Chart rendering failed, continuing: {}", e),
        }
    }

    info!("Stock analysis for {} completed", ticker);
}
