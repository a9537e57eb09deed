// Core structs: Bar, InsightsSnapshot, HoldersSnapshot
use chrono::{DateTime, Utc};
use thiserror::Error;

/// One OHLCV record for a single trading session.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Key technical levels and analyst consensus extracted from the insights
/// payload. Every field is optional: absence means "unavailable", not an
/// error.
#[derive(Debug, Clone, Default)]
pub struct InsightsSnapshot {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub stop_loss: Option<f64>,
    pub target_price: Option<f64>,
    pub recommendation_key: Option<String>,
    pub trend: Vec<RecommendationTrend>,
}

/// Analyst count distribution for one reporting period.
#[derive(Debug, Clone)]
pub struct RecommendationTrend {
    pub period: String,
    pub strong_buy: i64,
    pub buy: i64,
    pub hold: i64,
    pub sell: i64,
    pub strong_sell: i64,
}

/// Insider transactions extracted from the holders payload.
#[derive(Debug, Clone, Default)]
pub struct HoldersSnapshot {
    pub transactions: Vec<InsiderTransaction>,
}

#[derive(Debug, Clone)]
pub struct InsiderTransaction {
    pub name: String,
    pub relation: String,
    pub title: String,
    pub date: Option<String>,
    pub shares: Option<f64>,
    pub value: Option<f64>,
    pub text: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http request failed: {0}")]
    Http(String),
    #[error("provider responded with status {0}")]
    Status(u16),
    #[error("failed to decode payload: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("chart payload contains no result")]
    MissingChartResult,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("chart rendering failed: {0}")]
    Chart(String),
}
