// Classification layer on top of the indicator columns.
//
// Everything here degrades to "insufficient data" instead of failing when
// the history is too short for a window.
use crate::analyzer::indicators::{
    IndicatorColumns, MA_FAST, MA_MID, MA_SLOW, TRADING_DAYS_PER_YEAR, rolling_max_last,
    rolling_min_last,
};
use crate::model::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    StrongUp,
    Up,
    Down,
    StrongDown,
    Neutral,
    Insufficient,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::StrongUp => "strong up",
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::StrongDown => "strong down",
            Trend::Neutral => "neutral",
            Trend::Insufficient => "insufficient data",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossStatus {
    Golden,
    Dead,
    FastAbove,
    FastBelow,
    Insufficient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeBand {
    VeryActive,
    Active,
    Low,
    Normal,
    Insufficient,
}

/// Snapshot of every classification and latest indicator value for one
/// series. All cross-bar fields are `None` when fewer than 2 bars exist.
#[derive(Debug, Clone)]
pub struct TechnicalSnapshot {
    pub ma_fast: Option<f64>,
    pub ma_mid: Option<f64>,
    pub ma_slow: Option<f64>,
    pub cross_short: CrossStatus,
    pub cross_long: CrossStatus,
    pub trend: Trend,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub price_change: Option<f64>,
    pub price_change_pct: Option<f64>,
    pub return_1m_pct: Option<f64>,
    pub return_3m_pct: Option<f64>,
    pub return_1y_pct: Option<f64>,
    pub volume_latest: Option<f64>,
    pub volume_ma: Option<f64>,
    pub volume_change_pct: Option<f64>,
    pub volume_band: VolumeBand,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
}

/// Classifies the MA pair cross between yesterday and today.
///
/// A golden cross is the false -> true flip of `fast > slow`, a dead cross
/// the reverse; otherwise the current side is reported. Needs `slow_window`
/// bars of history.
pub fn classify_cross(fast: &[f64], slow: &[f64], slow_window: usize) -> CrossStatus {
    let n = fast.len().min(slow.len());
    if n < slow_window || n < 2 {
        return CrossStatus::Insufficient;
    }
    let above_today = fast[n - 1] > slow[n - 1];
    let above_yesterday = fast[n - 2] > slow[n - 2];
    match (above_yesterday, above_today) {
        (false, true) => CrossStatus::Golden,
        (true, false) => CrossStatus::Dead,
        (true, true) => CrossStatus::FastAbove,
        (false, false) => CrossStatus::FastBelow,
    }
}

/// Ordered comparison of close vs the fast/mid/slow moving averages.
pub fn classify_trend(close: f64, fast: f64, mid: f64, slow: f64) -> Trend {
    if close > fast && fast > mid && mid > slow {
        Trend::StrongUp
    } else if close > fast && fast > mid {
        Trend::Up
    } else if close < fast && fast < mid && mid < slow {
        Trend::StrongDown
    } else if close < fast && fast < mid {
        Trend::Down
    } else {
        Trend::Neutral
    }
}

/// Buckets the latest volume against its moving average.
pub fn classify_volume(latest: f64, average: f64) -> VolumeBand {
    if average <= 0.0 {
        return VolumeBand::Insufficient;
    }
    if latest > average * 1.5 {
        VolumeBand::VeryActive
    } else if latest > average * 1.1 {
        VolumeBand::Active
    } else if latest < average * 0.7 {
        VolumeBand::Low
    } else {
        VolumeBand::Normal
    }
}

pub fn analyze(bars: &[Bar], cols: &IndicatorColumns) -> TechnicalSnapshot {
    let n = bars.len();
    if n == 0 {
        return TechnicalSnapshot {
            ma_fast: None,
            ma_mid: None,
            ma_slow: None,
            cross_short: CrossStatus::Insufficient,
            cross_long: CrossStatus::Insufficient,
            trend: Trend::Insufficient,
            rsi: None,
            macd: None,
            macd_signal: None,
            price_change: None,
            price_change_pct: None,
            return_1m_pct: None,
            return_3m_pct: None,
            return_1y_pct: None,
            volume_latest: None,
            volume_ma: None,
            volume_change_pct: None,
            volume_band: VolumeBand::Insufficient,
            high_52w: None,
            low_52w: None,
        };
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let last = n - 1;
    let latest_close = closes[last];

    let ma_fast = cols.ma_fast[last];
    let ma_mid = cols.ma_mid[last];
    let ma_slow = cols.ma_slow[last];

    // Cross-bar indicators need at least two sessions.
    let enough = n >= 2;
    let (price_change, price_change_pct) = if enough {
        let prev = closes[n - 2];
        let change = latest_close - prev;
        let pct = if prev != 0.0 {
            Some(change / prev * 100.0)
        } else {
            None
        };
        (Some(change), pct)
    } else {
        (None, None)
    };

    let volume_latest = bars[last].volume;
    let volume_ma = cols.volume_ma[last];
    let (volume_change_pct, volume_band) = if enough && volume_ma > 0.0 {
        (
            Some((volume_latest / volume_ma - 1.0) * 100.0),
            classify_volume(volume_latest, volume_ma),
        )
    } else {
        (None, VolumeBand::Insufficient)
    };

    TechnicalSnapshot {
        ma_fast: Some(ma_fast),
        ma_mid: Some(ma_mid),
        ma_slow: Some(ma_slow),
        cross_short: classify_cross(&cols.ma_fast, &cols.ma_mid, MA_MID),
        cross_long: classify_cross(&cols.ma_mid, &cols.ma_slow, MA_SLOW),
        trend: classify_trend(latest_close, ma_fast, ma_mid, ma_slow),
        rsi: enough.then(|| cols.rsi[last]),
        macd: enough.then(|| cols.macd[last]),
        macd_signal: enough.then(|| cols.signal[last]),
        price_change,
        price_change_pct,
        return_1m_pct: trailing_return(&closes, MA_FAST),
        return_3m_pct: trailing_return(&closes, 60),
        return_1y_pct: trailing_return(&closes, TRADING_DAYS_PER_YEAR),
        volume_latest: Some(volume_latest),
        volume_ma: Some(volume_ma),
        volume_change_pct,
        volume_band,
        high_52w: rolling_max_last(&highs, TRADING_DAYS_PER_YEAR),
        low_52w: rolling_min_last(&lows, TRADING_DAYS_PER_YEAR),
    }
}

fn trailing_return(closes: &[f64], horizon: usize) -> Option<f64> {
    if closes.len() < horizon || horizon == 0 {
        return None;
    }
    let base = closes[closes.len() - horizon];
    if base == 0.0 {
        return None;
    }
    let last = closes[closes.len() - 1];
    Some((last - base) / base * 100.0)
}
