// Wire format of the three provider payloads.
//
// Every leaf is optional: the provider may return partial payloads and the
// caller must never assume a nested key is present. Decoding into these
// typed structs replaces repeated defensive nested lookups; a missing field
// is an explicit `None`, never an error.
use crate::model::{HoldersSnapshot, InsiderTransaction, InsightsSnapshot, RecommendationTrend};
use serde::{Deserialize, Serialize};

/// Formatted value wrapper used throughout the provider API:
/// `{"raw": 170.25, "fmt": "170.25"}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FmtValue {
    #[serde(default)]
    pub raw: Option<f64>,
    #[serde(default)]
    pub fmt: Option<String>,
    #[serde(rename = "longFmt", default, skip_serializing_if = "Option::is_none")]
    pub long_fmt: Option<String>,
}

impl FmtValue {
    pub fn raw(value: f64) -> Self {
        Self {
            raw: Some(value),
            fmt: None,
            long_fmt: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Chart payload: chart.result[0].{meta, timestamp, indicators.quote[0]}
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartPayload {
    #[serde(default)]
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    #[serde(default)]
    pub indicators: Option<ChartIndicators>,
}

/// Instrument metadata attached to the chart payload. The provider's own
/// figures (regular market price, 52-week extremes) take precedence over
/// values derived from the bar history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartMeta {
    pub currency: Option<String>,
    pub symbol: Option<String>,
    pub exchange_name: Option<String>,
    pub full_exchange_name: Option<String>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub regular_market_price: Option<f64>,
    pub regular_market_day_high: Option<f64>,
    pub regular_market_day_low: Option<f64>,
    pub regular_market_volume: Option<f64>,
    pub regular_market_previous_close: Option<f64>,
    pub chart_previous_close: Option<f64>,
    pub previous_close: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub data_granularity: Option<String>,
    pub range: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
}

/// Positional OHLCV arrays. Individual entries may be null for sessions the
/// provider could not price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteBlock {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// Insights payload: finance.result.{instrumentInfo, recommendationTrend, financialData}
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightsPayload {
    #[serde(default)]
    pub finance: InsightsEnvelope,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InsightsEnvelope {
    #[serde(default)]
    pub result: Option<InsightsResult>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightsResult {
    pub symbol: Option<String>,
    pub instrument_info: Option<InstrumentInfo>,
    pub recommendation_trend: Option<TrendBlock>,
    pub financial_data: Option<FinancialData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstrumentInfo {
    pub key_technicals: Option<KeyTechnicals>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyTechnicals {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub stop_loss_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendBlock {
    #[serde(default)]
    pub trend: Vec<TrendEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrendEntry {
    pub period: Option<String>,
    pub strong_buy: Option<i64>,
    pub buy: Option<i64>,
    pub hold: Option<i64>,
    pub sell: Option<i64>,
    pub strong_sell: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialData {
    pub target_mean_price: Option<FmtValue>,
    pub recommendation_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Holders payload: finance.result.insiderTransactions.transactions[]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoldersPayload {
    #[serde(default)]
    pub finance: HoldersEnvelope,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoldersEnvelope {
    #[serde(default)]
    pub result: Option<HoldersResult>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HoldersResult {
    pub symbol: Option<String>,
    pub major_holders_breakdown: Option<serde_json::Value>,
    pub insider_transactions: Option<TransactionBlock>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionBlock {
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionRecord {
    pub filer_name: Option<String>,
    pub filer_relation: Option<String>,
    pub filer_title: Option<String>,
    pub transaction_text: Option<String>,
    pub start_date: Option<FmtValue>,
    pub shares: Option<FmtValue>,
    pub value: Option<FmtValue>,
}

impl InsightsPayload {
    /// Flattens the nested payload into the snapshot consumed by the report
    /// composer. A payload without a result yields the empty snapshot.
    pub fn snapshot(&self) -> InsightsSnapshot {
        let Some(result) = &self.finance.result else {
            return InsightsSnapshot::default();
        };
        let technicals = result
            .instrument_info
            .as_ref()
            .and_then(|i| i.key_technicals.as_ref());
        let financial = result.financial_data.as_ref();
        let trend = result
            .recommendation_trend
            .as_ref()
            .map(|block| {
                block
                    .trend
                    .iter()
                    .map(|t| RecommendationTrend {
                        period: t.period.clone().unwrap_or_default(),
                        strong_buy: t.strong_buy.unwrap_or(0),
                        buy: t.buy.unwrap_or(0),
                        hold: t.hold.unwrap_or(0),
                        sell: t.sell.unwrap_or(0),
                        strong_sell: t.strong_sell.unwrap_or(0),
                    })
                    .collect()
            })
            .unwrap_or_default();

        InsightsSnapshot {
            support: technicals.and_then(|t| t.support),
            resistance: technicals.and_then(|t| t.resistance),
            stop_loss: technicals.and_then(|t| t.stop_loss_price),
            target_price: financial
                .and_then(|f| f.target_mean_price.as_ref())
                .and_then(|p| p.raw),
            recommendation_key: financial.and_then(|f| f.recommendation_key.clone()),
            trend,
        }
    }
}

impl HoldersPayload {
    /// Flattens insider transactions. Records are carried over as-is here;
    /// filtering of unusable records happens in the report composer.
    pub fn snapshot(&self) -> HoldersSnapshot {
        let transactions = self
            .finance
            .result
            .as_ref()
            .and_then(|r| r.insider_transactions.as_ref())
            .map(|block| {
                block
                    .transactions
                    .iter()
                    .map(|t| InsiderTransaction {
                        name: t.filer_name.clone().unwrap_or_else(|| "N/A".into()),
                        relation: t.filer_relation.clone().unwrap_or_else(|| "N/A".into()),
                        title: t.filer_title.clone().unwrap_or_else(|| "N/A".into()),
                        date: t.start_date.as_ref().and_then(|d| d.fmt.clone()),
                        shares: t.shares.as_ref().and_then(|s| s.raw),
                        value: t.value.as_ref().and_then(|v| v.raw),
                        text: t
                            .transaction_text
                            .clone()
                            .filter(|text| !text.trim().is_empty()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        HoldersSnapshot { transactions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_payload_tolerates_missing_keys() {
        let payload: ChartPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.chart.result.is_none());

        let payload: ChartPayload =
            serde_json::from_str(r#"{"chart":{"result":[{"meta":{"symbol":"AAPL"}}]}}"#).unwrap();
        let results = payload.chart.result.unwrap();
        let result = &results[0];
        assert_eq!(result.meta.symbol.as_deref(), Some("AAPL"));
        assert!(result.timestamp.is_none());
        assert!(result.indicators.is_none());
    }

    #[test]
    fn insights_snapshot_from_empty_payload() {
        let payload = InsightsPayload::default();
        let snap = payload.snapshot();
        assert!(snap.support.is_none());
        assert!(snap.target_price.is_none());
        assert!(snap.trend.is_empty());
    }

    #[test]
    fn insights_snapshot_extracts_levels() {
        let json = r#"{
            "finance": {"result": {
                "instrumentInfo": {"keyTechnicals": {"support": 130.5, "resistance": 161.0, "stopLossPrice": 127.25}},
                "recommendationTrend": {"trend": [{"period": "0m", "strongBuy": 7, "buy": 12, "hold": 6, "sell": 1, "strongSell": 0}]},
                "financialData": {"targetMeanPrice": {"raw": 182.4}, "recommendationKey": "buy"}
            }}
        }"#;
        let payload: InsightsPayload = serde_json::from_str(json).unwrap();
        let snap = payload.snapshot();
        assert_eq!(snap.support, Some(130.5));
        assert_eq!(snap.resistance, Some(161.0));
        assert_eq!(snap.stop_loss, Some(127.25));
        assert_eq!(snap.target_price, Some(182.4));
        assert_eq!(snap.recommendation_key.as_deref(), Some("buy"));
        assert_eq!(snap.trend.len(), 1);
        assert_eq!(snap.trend[0].buy, 12);
    }

    #[test]
    fn holders_snapshot_keeps_blank_text_as_none() {
        let json = r#"{
            "finance": {"result": {"insiderTransactions": {"transactions": [
                {"filerName": "Big Fund LP", "transactionText": "  ", "shares": {"raw": 4200.0}, "value": {"raw": 630000.0}},
                {"filerRelation": "Officer", "transactionText": "4,200 shares bought"}
            ]}}}
        }"#;
        let payload: HoldersPayload = serde_json::from_str(json).unwrap();
        let snap = payload.snapshot();
        assert_eq!(snap.transactions.len(), 2);
        assert!(snap.transactions[0].text.is_none());
        assert_eq!(snap.transactions[0].shares, Some(4200.0));
        assert_eq!(snap.transactions[1].name, "N/A");
        assert_eq!(
            snap.transactions[1].text.as_deref(),
            Some("4,200 shares bought")
        );
    }
}
