// Windowed arithmetic over close/volume columns.
//
// All rolling functions use a shrinking window near the start of history:
// the first W-1 outputs average whatever is available instead of being
// undefined. Snapshot-level consumers decide when a value is too thin to
// report (see technicals.rs).
use crate::model::Bar;

pub const RSI_PERIOD: usize = 14;
pub const BOLLINGER_WINDOW: usize = 20;
pub const BOLLINGER_WIDTH: f64 = 2.0;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const MA_FAST: usize = 20;
pub const MA_MID: usize = 50;
pub const MA_SLOW: usize = 200;
pub const VOLUME_MA: usize = 20;
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// Mean of the last `min(window, len)` values. `None` on empty input.
pub fn sma_last(values: &[f64], window: usize) -> Option<f64> {
    if values.is_empty() || window == 0 {
        return None;
    }
    let start = values.len().saturating_sub(window);
    let tail = &values[start..];
    Some(tail.iter().sum::<f64>() / tail.len() as f64)
}

/// Shrinking-window simple moving average, one output per input.
pub fn sma_series(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Shrinking-window sample standard deviation (ddof = 1). A single-point
/// window yields 0 rather than an undefined value.
pub fn rolling_std_series(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return Vec::new();
    }
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            let n = slice.len();
            if n < 2 {
                return 0.0;
            }
            let mean = slice.iter().sum::<f64>() / n as f64;
            let variance =
                slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            variance.sqrt()
        })
        .collect()
}

/// Exponential moving average with the standard recurrence
/// `ema[t] = alpha * x[t] + (1 - alpha) * ema[t-1]`, `alpha = 2 / (span + 1)`,
/// seeded with the first value. One output per input.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    if values.is_empty() || span == 0 {
        return Vec::new();
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(prev);
    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// Relative Strength Index over a rolling window of gains and losses.
///
/// Periods with no usable deltas (the first bar, or a flat window) report
/// the neutral value 50; windows with gains and no losses saturate at 100.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    if closes.is_empty() {
        return Vec::new();
    }
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    gains.push(0.0);
    losses.push(0.0);
    for w in closes.windows(2) {
        let delta = w[1] - w[0];
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let avg_gain = sma_series(&gains, period);
    let avg_loss = sma_series(&losses, period);

    avg_gain
        .iter()
        .zip(avg_loss.iter())
        .map(|(&g, &l)| {
            if l == 0.0 {
                if g == 0.0 { 50.0 } else { 100.0 }
            } else {
                100.0 - 100.0 / (1.0 + g / l)
            }
        })
        .collect()
}

/// MACD line (EMA12 − EMA26) and its 9-period EMA signal line.
pub fn macd_series(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let fast = ema_series(closes, MACD_FAST);
    let slow = ema_series(closes, MACD_SLOW);
    let macd: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
    let signal = ema_series(&macd, MACD_SIGNAL);
    (macd, signal)
}

/// Bollinger band series: midline (SMA) plus upper/lower at ±`width` sample
/// standard deviations.
pub fn bollinger_series(closes: &[f64], window: usize, width: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mid = sma_series(closes, window);
    let std = rolling_std_series(closes, window);
    let upper = mid
        .iter()
        .zip(std.iter())
        .map(|(m, s)| m + width * s)
        .collect();
    let lower = mid
        .iter()
        .zip(std.iter())
        .map(|(m, s)| m - width * s)
        .collect();
    (upper, mid, lower)
}

/// Max/min over the trailing `min(window, len)` values.
pub fn rolling_max_last(values: &[f64], window: usize) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let start = values.len().saturating_sub(window);
    values[start..].iter().copied().reduce(f64::max)
}

pub fn rolling_min_last(values: &[f64], window: usize) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let start = values.len().saturating_sub(window);
    values[start..].iter().copied().reduce(f64::min)
}

/// Per-bar derived columns written to the indicators CSV and drawn on the
/// chart. Positionally indexed against the bars they were computed from.
#[derive(Debug, Clone, Default)]
pub struct IndicatorColumns {
    pub rsi: Vec<f64>,
    pub upper_band: Vec<f64>,
    pub midline: Vec<f64>,
    pub lower_band: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub ma_fast: Vec<f64>,
    pub ma_mid: Vec<f64>,
    pub ma_slow: Vec<f64>,
    pub volume_ma: Vec<f64>,
}

impl IndicatorColumns {
    pub fn compute(bars: &[Bar]) -> Self {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

        let (upper_band, midline, lower_band) =
            bollinger_series(&closes, BOLLINGER_WINDOW, BOLLINGER_WIDTH);
        let (macd, signal) = macd_series(&closes);

        Self {
            rsi: rsi_series(&closes, RSI_PERIOD),
            upper_band,
            midline,
            lower_band,
            macd,
            signal,
            ma_fast: sma_series(&closes, MA_FAST),
            ma_mid: sma_series(&closes, MA_MID),
            ma_slow: sma_series(&closes, MA_SLOW),
            volume_ma: sma_series(&volumes, VOLUME_MA),
        }
    }
}
