// Chart payload -> ordered time series of OHLCV bars.
use crate::model::{Bar, SeriesError};
use crate::provider::payload::{ChartMeta, ChartPayload};
use crate::utils::epoch_to_datetime;

/// An ordered price history plus the instrument metadata it arrived with.
/// Immutable once built; derived indicator columns are computed separately
/// against the same positional index.
#[derive(Debug, Clone)]
pub struct Series {
    pub meta: ChartMeta,
    pub bars: Vec<Bar>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

/// Builds a `Series` from the chart payload.
///
/// A payload without `chart.result[0]` is a hard parse failure (the chart
/// fetch is mandatory). Anything below that level fails softly: missing
/// timestamp or quote arrays yield an empty series, and individual rows
/// missing close or volume are dropped.
pub fn build_series(payload: &ChartPayload) -> Result<Series, SeriesError> {
    let result = payload
        .chart
        .result
        .as_ref()
        .and_then(|results| results.first())
        .ok_or(SeriesError::MissingChartResult)?;

    let meta = result.meta.clone();

    let (Some(timestamps), Some(quote)) = (
        result.timestamp.as_ref(),
        result
            .indicators
            .as_ref()
            .and_then(|ind| ind.quote.first()),
    ) else {
        return Ok(Series {
            meta,
            bars: Vec::new(),
        });
    };

    let mut bars: Vec<Bar> = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(timestamp) = epoch_to_datetime(ts) else {
            continue;
        };
        // close and volume are mandatory per bar; open/high/low fall back to close.
        let (Some(close), Some(volume)) = (value_at(&quote.close, i), value_at(&quote.volume, i))
        else {
            continue;
        };
        let open = value_at(&quote.open, i).unwrap_or(close);
        let high = value_at(&quote.high, i).unwrap_or(close);
        let low = value_at(&quote.low, i).unwrap_or(close);
        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);

    Ok(Series { meta, bars })
}

fn value_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::payload::{ChartIndicators, ChartResult, QuoteBlock};

    fn payload_with(
        timestamps: Option<Vec<i64>>,
        quote: Option<QuoteBlock>,
    ) -> ChartPayload {
        ChartPayload {
            chart: crate::provider::payload::ChartEnvelope {
                result: Some(vec![ChartResult {
                    meta: ChartMeta::default(),
                    timestamp: timestamps,
                    indicators: quote.map(|q| ChartIndicators { quote: vec![q] }),
                }]),
                error: None,
            },
        }
    }

    #[test]
    fn missing_result_is_a_hard_failure() {
        let payload = ChartPayload::default();
        assert!(matches!(
            build_series(&payload),
            Err(SeriesError::MissingChartResult)
        ));
    }

    #[test]
    fn missing_quote_yields_empty_series() {
        let payload = payload_with(Some(vec![86_400, 172_800]), None);
        let series = build_series(&payload).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn missing_timestamps_yield_empty_series() {
        let payload = payload_with(None, Some(QuoteBlock::default()));
        let series = build_series(&payload).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn rows_without_close_or_volume_are_dropped() {
        let quote = QuoteBlock {
            open: vec![Some(10.0), Some(11.0), Some(12.0), None],
            high: vec![Some(10.5), Some(11.5), Some(12.5), Some(13.5)],
            low: vec![Some(9.5), Some(10.5), Some(11.5), Some(12.5)],
            close: vec![Some(10.2), None, Some(12.2), Some(13.2)],
            volume: vec![Some(1000.0), Some(1100.0), None, Some(1300.0)],
        };
        let payload = payload_with(Some(vec![86_400, 172_800, 259_200, 345_600]), Some(quote));
        let series = build_series(&payload).unwrap();

        // Row 1 lacks close, row 2 lacks volume: both dropped.
        assert_eq!(series.bars.len(), 2);
        assert_eq!(series.bars[0].close, 10.2);
        assert_eq!(series.bars[1].close, 13.2);
        // Missing open falls back to close.
        assert_eq!(series.bars[1].open, 13.2);
    }

    #[test]
    fn bars_are_sorted_and_deduplicated() {
        let quote = QuoteBlock {
            open: vec![Some(2.0), Some(1.0), Some(1.5)],
            high: vec![Some(2.0), Some(1.0), Some(1.5)],
            low: vec![Some(2.0), Some(1.0), Some(1.5)],
            close: vec![Some(2.0), Some(1.0), Some(1.5)],
            volume: vec![Some(20.0), Some(10.0), Some(15.0)],
        };
        let payload = payload_with(Some(vec![172_800, 86_400, 172_800]), Some(quote));
        let series = build_series(&payload).unwrap();
        assert_eq!(series.bars.len(), 2);
        assert!(series.bars[0].timestamp < series.bars[1].timestamp);
        assert_eq!(series.bars[0].close, 1.0);
    }

    #[test]
    fn epoch_seconds_become_datetimes() {
        let quote = QuoteBlock {
            open: vec![Some(1.0)],
            high: vec![Some(1.0)],
            low: vec![Some(1.0)],
            close: vec![Some(1.0)],
            volume: vec![Some(1.0)],
        };
        let payload = payload_with(Some(vec![1_700_000_000]), Some(quote));
        let series = build_series(&payload).unwrap();
        assert_eq!(series.bars[0].timestamp.timestamp(), 1_700_000_000);
    }
}
