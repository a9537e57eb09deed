// JSON and CSV artifacts. Each writer is independent; the caller decides
// that a failure here is never fatal for the other artifacts.
use crate::analyzer::IndicatorColumns;
use crate::model::{Bar, OutputError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub fn raw_chart_path(dir: &Path, ticker: &str) -> PathBuf {
    dir.join(format!("{}_stock_data_raw.json", ticker))
}

pub fn raw_insights_path(dir: &Path, ticker: &str) -> PathBuf {
    dir.join(format!("{}_stock_insights_raw.json", ticker))
}

pub fn raw_holders_path(dir: &Path, ticker: &str) -> PathBuf {
    dir.join(format!("{}_stock_holders_raw.json", ticker))
}

pub fn analysis_path(dir: &Path, ticker: &str) -> PathBuf {
    dir.join(format!("{}_analysis_result.json", ticker))
}

pub fn indicators_csv_path(dir: &Path, ticker: &str) -> PathBuf {
    dir.join(format!("{}_technical_indicators.csv", ticker))
}

pub fn chart_image_path(dir: &Path, ticker: &str) -> PathBuf {
    dir.join(format!("{}_stock_chart.png", ticker))
}

/// Writes any serializable value as pretty-printed UTF-8 JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Writes the per-bar indicator columns, one row per session.
pub fn write_indicators_csv(
    path: &Path,
    bars: &[Bar],
    cols: &IndicatorColumns,
) -> Result<(), OutputError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "date",
        "rsi",
        "upper_band",
        "lower_band",
        "macd",
        "signal",
        "ma20",
        "close",
    ])?;
    for (i, bar) in bars.iter().enumerate() {
        writer.write_record(&[
            bar.timestamp.format("%Y-%m-%d").to_string(),
            format!("{:.6}", cols.rsi[i]),
            format!("{:.6}", cols.upper_band[i]),
            format!("{:.6}", cols.lower_band[i]),
            format!("{:.6}", cols.macd[i]),
            format!("{:.6}", cols.signal[i]),
            format!("{:.6}", cols.midline[i]),
            format!("{:.6}", bar.close),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| Bar {
                timestamp: Utc.timestamp_opt(86_400 * (i as i64 + 1), 0).unwrap(),
                open: 10.0 + i as f64,
                high: 11.0 + i as f64,
                low: 9.0 + i as f64,
                close: 10.5 + i as f64,
                volume: 1_000.0,
            })
            .collect()
    }

    #[test]
    fn csv_has_header_and_one_row_per_bar() {
        let dir = tempfile::tempdir().unwrap();
        let path = indicators_csv_path(dir.path(), "TEST");
        let bars = bars(25);
        let cols = IndicatorColumns::compute(&bars);
        write_indicators_csv(&path, &bars, &cols).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 26);
        assert_eq!(
            lines[0],
            "date,rsi,upper_band,lower_band,macd,signal,ma20,close"
        );
        assert!(lines[1].starts_with("1970-01-02,"));
    }

    #[test]
    fn json_writer_produces_parseable_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value.json");
        write_json(&path, &serde_json::json!({"symbol": "TEST"})).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["symbol"], "TEST");
    }

    #[test]
    fn artifact_paths_follow_the_naming_scheme() {
        let dir = Path::new("/tmp/out");
        assert!(
            raw_chart_path(dir, "PLTR")
                .ends_with("PLTR_stock_data_raw.json")
        );
        assert!(analysis_path(dir, "PLTR").ends_with("PLTR_analysis_result.json"));
        assert!(chart_image_path(dir, "PLTR").ends_with("PLTR_stock_chart.png"));
    }
}
