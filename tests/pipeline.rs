// End-to-end run of the analysis pipeline against the offline provider.
use stockscope::analyzer::{IndicatorColumns, analyze};
use stockscope::model::{HoldersSnapshot, InsightsSnapshot};
use stockscope::output::files::{
    analysis_path, chart_image_path, indicators_csv_path, write_indicators_csv, write_json,
};
use stockscope::output::render_chart;
use stockscope::provider::{DataProvider, MockProvider};
use stockscope::report::{AnalysisReport, compose};
use stockscope::series::build_series;

#[tokio::test]
async fn offline_run_produces_all_artifacts() {
    let provider = MockProvider::new(99);
    let chart = provider.chart("PLTR", "1d", "1y").await.unwrap();
    let insights = provider.insights("PLTR").await.unwrap();
    let holders = provider.holders("PLTR").await.unwrap();

    let series = build_series(&chart).unwrap();
    assert!(series.bars.len() >= 250, "mock history too short");

    let cols = IndicatorColumns::compute(&series.bars);
    let tech = analyze(&series.bars, &cols);
    let report = compose(
        "PLTR",
        &series,
        &tech,
        &insights.snapshot(),
        &holders.snapshot(),
    );

    let dir = tempfile::tempdir().unwrap();
    write_json(&analysis_path(dir.path(), "PLTR"), &report).unwrap();
    write_indicators_csv(&indicators_csv_path(dir.path(), "PLTR"), &series.bars, &cols).unwrap();
    render_chart(
        &chart_image_path(dir.path(), "PLTR"),
        &report.basic_info.company_name,
        "PLTR",
        &report.basic_info.currency,
        &series.bars,
        &cols,
    )
    .unwrap();

    // Round-trip: the written JSON reproduces the input ticker symbol.
    let json = std::fs::read_to_string(analysis_path(dir.path(), "PLTR")).unwrap();
    let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.basic_info.symbol, "PLTR");
    assert!(parsed.current_price.price.is_some());
    assert!(parsed.technical_analysis.ma_20.is_some());
    assert!(parsed.technical_analysis.support_level.is_some());
    assert!(!parsed.insider_trading.is_empty());

    // One CSV row per bar plus the header.
    let csv = std::fs::read_to_string(indicators_csv_path(dir.path(), "PLTR")).unwrap();
    assert_eq!(csv.lines().count(), series.bars.len() + 1);

    let chart_meta = std::fs::metadata(chart_image_path(dir.path(), "PLTR")).unwrap();
    assert!(chart_meta.len() > 0);
}

#[tokio::test]
async fn degraded_run_without_insights_and_holders() {
    let provider = MockProvider::new(5);
    let chart = provider.chart("TEST", "1d", "1y").await.unwrap();
    let series = build_series(&chart).unwrap();
    let cols = IndicatorColumns::compute(&series.bars);
    let tech = analyze(&series.bars, &cols);

    // Failed optional fetches degrade to empty snapshots.
    let report = compose(
        "TEST",
        &series,
        &tech,
        &InsightsSnapshot::default(),
        &HoldersSnapshot::default(),
    );

    assert_eq!(report.basic_info.symbol, "TEST");
    assert!(report.technical_analysis.support_level.is_none());
    assert!(report.investment_recommendation.target_price.is_none());
    assert_eq!(report.investment_recommendation.rating, "N/A");
    assert!(report.insider_trading.is_empty());
    // The technical side is unaffected by the missing optional payloads.
    assert!(report.technical_analysis.ma_200.is_some());
    assert!(report.current_price.price.is_some());
}
