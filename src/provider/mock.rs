// Deterministic in-repo stand-in for the remote data provider.
//
// Payload shapes mirror the real provider so the rest of the pipeline cannot
// tell the two apart. All variability comes from an explicit seeded generator
// owned by the provider instance; the same seed reproduces the same payloads.
use crate::model::ProviderError;
use crate::provider::payload::{
    ChartEnvelope, ChartIndicators, ChartMeta, ChartPayload, ChartResult, FinancialData, FmtValue,
    HoldersEnvelope, HoldersPayload, HoldersResult, InsightsEnvelope, InsightsPayload,
    InsightsResult, InstrumentInfo, KeyTechnicals, QuoteBlock, TransactionBlock,
    TransactionRecord, TrendBlock, TrendEntry,
};
use crate::provider::traits::DataProvider;
use crate::utils::group_thousands;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

const CHART_SALT: u64 = 0x11;
const INSIGHTS_SALT: u64 = 0x22;
const HOLDERS_SALT: u64 = 0x33;

/// Long-window averages need this much history, so short ranges are
/// backfilled with earlier sessions.
const MIN_SESSIONS: usize = 250;

pub struct MockProvider {
    seed: u64,
}

struct MockBar {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl MockProvider {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng(&self, salt: u64) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ salt)
    }

    fn generate_chart(&self, ticker: &str, interval: &str, range: &str) -> ChartPayload {
        let mut rng = self.rng(CHART_SALT);
        let end = Utc::now().date_naive();
        let span_days = match range {
            "1y" => 365,
            "1mo" => 30,
            _ => 7,
        };
        let start = end - Duration::days(span_days);

        let mut bars: Vec<MockBar> = Vec::new();
        let mut price = 100.0;
        let mut day = start;
        while day <= end {
            if is_trading_day(day) {
                let open = round2(price + (0.5 - rng.random::<f64>()) * 2.0);
                let low = round2(open - rng.random::<f64>() * 2.0);
                let high = round2(open + rng.random::<f64>() * 2.0);
                let close = round2(low + rng.random::<f64>() * (high - low));
                let volume = (1_000_000.0 + rng.random::<f64>() * 500_000.0).floor();
                price = close + (0.5 - rng.random::<f64>());
                bars.push(MockBar {
                    date: day,
                    open,
                    high,
                    low,
                    close,
                    volume,
                });
            }
            day = day + Duration::days(1);
        }

        // Backfill older sessions until long-window averages have history.
        let mut backfill: Vec<MockBar> = Vec::new();
        let mut price = bars.first().map(|b| b.open).unwrap_or(100.0);
        let mut day = start - Duration::days(1);
        while bars.len() + backfill.len() < MIN_SESSIONS {
            if is_trading_day(day) {
                let close = round2(price + (0.5 - rng.random::<f64>()) * 2.0);
                let high = round2(close + rng.random::<f64>() * 2.0);
                let low = round2(close - rng.random::<f64>() * 2.0);
                let open = round2(low + rng.random::<f64>() * (high - low));
                let volume = (1_000_000.0 + rng.random::<f64>() * 500_000.0).floor();
                price = close;
                backfill.push(MockBar {
                    date: day,
                    open,
                    high,
                    low,
                    close,
                    volume,
                });
            }
            day = day - Duration::days(1);
        }
        backfill.reverse();
        backfill.extend(bars);
        let bars = backfill;

        let highest = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let lowest = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        let last = bars.last();
        let first = bars.first();

        let meta = ChartMeta {
            currency: Some("USD".into()),
            symbol: Some(ticker.to_string()),
            exchange_name: Some("NMS".into()),
            full_exchange_name: None,
            short_name: Some(format!("{} Inc.", ticker)),
            long_name: Some(format!("{} Corporation Holdings Inc.", ticker)),
            regular_market_price: last.map(|b| b.close),
            regular_market_day_high: last.map(|b| b.high),
            regular_market_day_low: last.map(|b| b.low),
            regular_market_volume: last.map(|b| b.volume),
            regular_market_previous_close: None,
            chart_previous_close: first.map(|b| b.open),
            previous_close: first.map(|b| b.open),
            fifty_two_week_high: Some(round2(highest)),
            fifty_two_week_low: Some(round2(lowest)),
            data_granularity: Some(interval.to_string()),
            range: Some(range.to_string()),
        };

        let quote = QuoteBlock {
            open: bars.iter().map(|b| Some(b.open)).collect(),
            high: bars.iter().map(|b| Some(b.high)).collect(),
            low: bars.iter().map(|b| Some(b.low)).collect(),
            close: bars.iter().map(|b| Some(b.close)).collect(),
            volume: bars.iter().map(|b| Some(b.volume)).collect(),
        };

        ChartPayload {
            chart: ChartEnvelope {
                result: Some(vec![ChartResult {
                    meta,
                    timestamp: Some(
                        bars.iter()
                            .map(|b| b.date.and_time(NaiveTime::MIN).and_utc().timestamp())
                            .collect(),
                    ),
                    indicators: Some(ChartIndicators { quote: vec![quote] }),
                }]),
                error: None,
            },
        }
    }

    fn generate_insights(&self, ticker: &str) -> InsightsPayload {
        let mut rng = self.rng(INSIGHTS_SALT);
        let support = round2(130.0 + rng.random::<f64>() * 10.0);
        let resistance = round2(160.0 + rng.random::<f64>() * 10.0);
        let stop_loss = round2(125.0 + rng.random::<f64>() * 5.0);
        let trend = TrendEntry {
            period: Some("0m".into()),
            strong_buy: Some((5.0 + rng.random::<f64>() * 5.0) as i64),
            buy: Some((10.0 + rng.random::<f64>() * 5.0) as i64),
            hold: Some((5.0 + rng.random::<f64>() * 3.0) as i64),
            sell: Some((1.0 + rng.random::<f64>() * 2.0) as i64),
            strong_sell: Some((rng.random::<f64>() * 1.0) as i64),
        };
        let target = round2(170.0 + rng.random::<f64>() * 20.0);
        let keys = ["buy", "hold", "sell"];
        let key = keys[(rng.random::<f64>() * keys.len() as f64) as usize % keys.len()];

        InsightsPayload {
            finance: InsightsEnvelope {
                result: Some(InsightsResult {
                    symbol: Some(ticker.to_string()),
                    instrument_info: Some(InstrumentInfo {
                        key_technicals: Some(KeyTechnicals {
                            support: Some(support),
                            resistance: Some(resistance),
                            stop_loss_price: Some(stop_loss),
                        }),
                    }),
                    recommendation_trend: Some(TrendBlock { trend: vec![trend] }),
                    financial_data: Some(FinancialData {
                        target_mean_price: Some(FmtValue::raw(target)),
                        recommendation_key: Some(key.to_string()),
                    }),
                }),
                error: None,
            },
        }
    }

    fn generate_holders(&self, ticker: &str) -> HoldersPayload {
        let mut rng = self.rng(HOLDERS_SALT);
        let names = ["Major Holder LLC", "Insider Trading Co", "Big Fund LP"];
        let relations = ["Officer", "Director", "Beneficial Owner"];
        let titles = ["CEO", "CFO", "Board Member", "Chief Counsel"];
        let today = Utc::now().date_naive();

        let count = (rng.random::<f64>() * 5.0) as usize + 2;
        let mut transactions = Vec::with_capacity(count);
        for _ in 0..count {
            let shares = ((rng.random::<f64>() - 0.4) * 10_000.0).trunc();
            let date = today - Duration::days((rng.random::<f64>() * 180.0) as i64);
            let value = shares.abs() * (150.0 + (rng.random::<f64>() - 0.5) * 20.0);
            let action = if shares > 0.0 { "bought" } else { "sold" };
            let text = if rng.random::<f64>() > 0.3 {
                Some(format!(
                    "{} shares {} (~{} USD)",
                    group_thousands(shares.abs()),
                    action,
                    group_thousands(value)
                ))
            } else {
                None
            };

            transactions.push(TransactionRecord {
                filer_name: Some(pick(&mut rng, &names).to_string()),
                filer_relation: Some(pick(&mut rng, &relations).to_string()),
                filer_title: Some(pick(&mut rng, &titles).to_string()),
                transaction_text: text,
                start_date: Some(FmtValue {
                    raw: Some(date.and_time(NaiveTime::MIN).and_utc().timestamp() as f64),
                    fmt: Some(date.format("%Y-%m-%d").to_string()),
                    long_fmt: None,
                }),
                shares: Some(FmtValue {
                    raw: Some(shares),
                    fmt: None,
                    long_fmt: Some(group_thousands(shares)),
                }),
                value: Some(FmtValue {
                    raw: Some(value),
                    fmt: None,
                    long_fmt: Some(group_thousands(value)),
                }),
            });
        }

        HoldersPayload {
            finance: HoldersEnvelope {
                result: Some(HoldersResult {
                    symbol: Some(ticker.to_string()),
                    major_holders_breakdown: Some(json!({
                        "insidersPercentHeld": {"raw": 0.05 + rng.random::<f64>() * 0.1},
                        "institutionsPercentHeld": {"raw": 0.6 + rng.random::<f64>() * 0.2},
                    })),
                    insider_transactions: Some(TransactionBlock { transactions }),
                }),
                error: None,
            },
        }
    }
}

#[async_trait::async_trait]
impl DataProvider for MockProvider {
    async fn chart(
        &self,
        ticker: &str,
        interval: &str,
        range: &str,
    ) -> Result<ChartPayload, ProviderError> {
        Ok(self.generate_chart(ticker, interval, range))
    }

    async fn insights(&self, ticker: &str) -> Result<InsightsPayload, ProviderError> {
        Ok(self.generate_insights(ticker))
    }

    async fn holders(&self, ticker: &str) -> Result<HoldersPayload, ProviderError> {
        Ok(self.generate_holders(ticker))
    }
}

fn is_trading_day(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options[(rng.random::<f64>() * options.len() as f64) as usize % options.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_seed_reproduces_payloads() {
        let a = MockProvider::new(42);
        let b = MockProvider::new(42);
        let chart_a = a.chart("TEST", "1d", "1y").await.unwrap();
        let chart_b = b.chart("TEST", "1d", "1y").await.unwrap();
        assert_eq!(
            serde_json::to_string(&chart_a).unwrap(),
            serde_json::to_string(&chart_b).unwrap()
        );

        let insights_a = a.insights("TEST").await.unwrap();
        let insights_b = b.insights("TEST").await.unwrap();
        assert_eq!(
            serde_json::to_string(&insights_a).unwrap(),
            serde_json::to_string(&insights_b).unwrap()
        );
    }

    #[tokio::test]
    async fn different_seeds_diverge() {
        let a = MockProvider::new(1);
        let b = MockProvider::new(2);
        let chart_a = a.chart("TEST", "1d", "1y").await.unwrap();
        let chart_b = b.chart("TEST", "1d", "1y").await.unwrap();
        assert_ne!(
            serde_json::to_string(&chart_a).unwrap(),
            serde_json::to_string(&chart_b).unwrap()
        );
    }

    #[tokio::test]
    async fn chart_has_enough_history_for_long_windows() {
        let provider = MockProvider::new(7);
        let payload = provider.chart("TEST", "1d", "1mo").await.unwrap();
        let results = payload.chart.result.unwrap();
        let result = &results[0];
        let timestamps = result.timestamp.as_ref().unwrap();
        assert!(timestamps.len() >= MIN_SESSIONS);
        assert!(timestamps.windows(2).all(|w| w[0] < w[1]));

        let quote = &result.indicators.as_ref().unwrap().quote[0];
        assert_eq!(quote.close.len(), timestamps.len());
        assert_eq!(quote.volume.len(), timestamps.len());
    }

    #[tokio::test]
    async fn chart_skips_weekends() {
        let provider = MockProvider::new(3);
        let payload = provider.chart("TEST", "1d", "1y").await.unwrap();
        let results = payload.chart.result.unwrap();
        let result = &results[0];
        for &ts in result.timestamp.as_ref().unwrap() {
            let day = chrono::DateTime::from_timestamp(ts, 0).unwrap().date_naive();
            assert!(is_trading_day(day), "weekend timestamp {}", day);
        }
    }

    #[tokio::test]
    async fn holders_contains_transactions() {
        let provider = MockProvider::new(11);
        let payload = provider.holders("TEST").await.unwrap();
        let snap = payload.snapshot();
        assert!(snap.transactions.len() >= 2);
    }
}
