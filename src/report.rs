// Merges technicals, insights and holder data into the final report.
//
// Narrative text is pure templating: a classification enum selects a fixed
// template and computed values are substituted in. No scoring or inference
// happens here.
use crate::analyzer::technicals::{CrossStatus, TechnicalSnapshot, Trend, VolumeBand};
use crate::model::{HoldersSnapshot, InsightsSnapshot, RecommendationTrend};
use crate::series::Series;
use crate::utils::group_thousands;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub basic_info: BasicInfo,
    pub current_price: CurrentPrice,
    pub technical_analysis: TechnicalAnalysis,
    pub volume_analysis: VolumeAnalysis,
    pub investment_recommendation: InvestmentRecommendation,
    pub insider_trading: Vec<InsiderRecord>,
    pub conclusion: Conclusion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicInfo {
    pub company_name: String,
    pub symbol: String,
    pub exchange: String,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentPrice {
    pub price: Option<f64>,
    pub week52_high: Option<f64>,
    pub week52_low: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<u64>,
    pub prev_close: Option<f64>,
    pub price_change: Option<f64>,
    pub price_change_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalAnalysis {
    pub ma_20: Option<f64>,
    pub ma_50: Option<f64>,
    pub ma_200: Option<f64>,
    pub ma_cross_status: String,
    pub ma_long_cross_status: String,
    pub trend: String,
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub return_1m_pct: Option<f64>,
    pub return_3m_pct: Option<f64>,
    pub return_1y_pct: Option<f64>,
    pub support_level: Option<f64>,
    pub resistance_level: Option<f64>,
    pub stop_loss: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeAnalysis {
    pub volume_latest: Option<u64>,
    pub volume_ma_20: Option<u64>,
    pub volume_change_pct: Option<f64>,
    pub volume_analysis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentRecommendation {
    pub target_price: Option<f64>,
    pub provider: String,
    pub rating: String,
    pub investment_opinion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsiderRecord {
    pub name: String,
    pub relation: String,
    pub transaction: String,
    pub date: String,
    pub position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conclusion {
    pub trend: String,
    pub trend_analysis: String,
    pub volume_analysis: String,
    pub investment_opinion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
    Unknown,
}

impl Rating {
    pub fn label(&self) -> &'static str {
        match self {
            Rating::StrongBuy => "strong buy",
            Rating::Buy => "buy",
            Rating::Hold => "hold",
            Rating::Sell => "sell",
            Rating::StrongSell => "strong sell",
            Rating::Unknown => "N/A",
        }
    }

    fn from_key(key: &str) -> Option<Rating> {
        match key.to_ascii_lowercase().as_str() {
            "strong_buy" | "strongbuy" => Some(Rating::StrongBuy),
            "buy" | "overweight" => Some(Rating::Buy),
            "hold" | "neutral" => Some(Rating::Hold),
            "sell" | "underperform" => Some(Rating::Sell),
            "strong_sell" | "strongsell" => Some(Rating::StrongSell),
            _ => None,
        }
    }

    /// Derives a rating from an analyst count distribution: the category
    /// with the highest count wins, ties broken most-bullish-first.
    fn from_trend(trend: &RecommendationTrend) -> Rating {
        let counts = [
            (trend.strong_buy, Rating::StrongBuy),
            (trend.buy, Rating::Buy),
            (trend.hold, Rating::Hold),
            (trend.sell, Rating::Sell),
            (trend.strong_sell, Rating::StrongSell),
        ];
        // max_by_key keeps the last maximum, so iterate least-bullish-first
        // to make ties resolve most-bullish-first.
        let (count, rating) = counts
            .iter()
            .rev()
            .copied()
            .max_by_key(|&(count, _)| count)
            .unwrap_or((0, Rating::Unknown));
        if count > 0 { rating } else { Rating::Unknown }
    }
}

/// The provider's own recommendation key takes precedence; the analyst
/// count distribution of the latest period is the fallback.
pub fn derive_rating(insights: &InsightsSnapshot) -> Rating {
    if let Some(rating) = insights
        .recommendation_key
        .as_deref()
        .and_then(Rating::from_key)
    {
        return rating;
    }
    insights
        .trend
        .first()
        .map(Rating::from_trend)
        .unwrap_or(Rating::Unknown)
}

pub fn compose(
    ticker: &str,
    series: &Series,
    tech: &TechnicalSnapshot,
    insights: &InsightsSnapshot,
    holders: &HoldersSnapshot,
) -> AnalysisReport {
    let meta = &series.meta;
    let company_name = meta
        .long_name
        .clone()
        .or_else(|| meta.short_name.clone())
        .unwrap_or_else(|| ticker.to_string());
    let currency = meta.currency.clone().unwrap_or_else(|| "N/A".to_string());

    let basic_info = BasicInfo {
        company_name: company_name.clone(),
        symbol: meta.symbol.clone().unwrap_or_else(|| ticker.to_string()),
        exchange: meta
            .full_exchange_name
            .clone()
            .or_else(|| meta.exchange_name.clone())
            .unwrap_or_else(|| "N/A".to_string()),
        currency: currency.clone(),
    };

    let last = series.bars.last();
    let prev = series.bars.len().checked_sub(2).map(|i| &series.bars[i]);
    let current_price = CurrentPrice {
        price: meta.regular_market_price.or(last.map(|b| b.close)),
        week52_high: meta.fifty_two_week_high.or(tech.high_52w),
        week52_low: meta.fifty_two_week_low.or(tech.low_52w),
        day_high: meta.regular_market_day_high.or(last.map(|b| b.high)),
        day_low: meta.regular_market_day_low.or(last.map(|b| b.low)),
        volume: meta
            .regular_market_volume
            .or(last.map(|b| b.volume))
            .map(|v| v as u64),
        prev_close: meta
            .regular_market_previous_close
            .or(prev.map(|b| b.close)),
        price_change: tech.price_change,
        price_change_pct: tech.price_change_pct,
    };

    // Provider-supplied levels override anything derived from the series.
    let technical_analysis = TechnicalAnalysis {
        ma_20: tech.ma_fast,
        ma_50: tech.ma_mid,
        ma_200: tech.ma_slow,
        ma_cross_status: cross_text(tech.cross_short, 20, 50, "short-term"),
        ma_long_cross_status: cross_text(tech.cross_long, 50, 200, "long-term"),
        trend: tech.trend.as_str().to_string(),
        rsi_14: tech.rsi,
        macd: tech.macd,
        macd_signal: tech.macd_signal,
        return_1m_pct: tech.return_1m_pct,
        return_3m_pct: tech.return_3m_pct,
        return_1y_pct: tech.return_1y_pct,
        support_level: insights.support,
        resistance_level: insights.resistance,
        stop_loss: insights.stop_loss,
    };

    let volume_line = volume_text(tech);
    let volume_analysis = VolumeAnalysis {
        volume_latest: tech.volume_latest.map(|v| v as u64),
        volume_ma_20: tech.volume_ma.map(|v| v as u64),
        volume_change_pct: tech.volume_change_pct,
        volume_analysis: volume_line.clone(),
    };

    let rating = derive_rating(insights);
    let opinion = opinion_text(&company_name, rating, insights.target_price, &currency);
    let investment_recommendation = InvestmentRecommendation {
        target_price: insights.target_price,
        provider: "Multiple Analysts".to_string(),
        rating: rating.label().to_string(),
        investment_opinion: opinion.clone(),
    };

    let insider_trading = normalize_transactions(holders, &currency);

    let mut trend_analysis = format!(
        "The current price trend for {} is assessed as '{}'. {}",
        company_name,
        tech.trend.as_str(),
        trend_conclusion(tech.trend)
    );
    if let Some(addendum) = cross_addendum_short(tech.cross_short) {
        trend_analysis.push(' ');
        trend_analysis.push_str(addendum);
    }
    if let Some(addendum) = cross_addendum_long(tech.cross_long) {
        trend_analysis.push(' ');
        trend_analysis.push_str(addendum);
    }

    let conclusion = Conclusion {
        trend: tech.trend.as_str().to_string(),
        trend_analysis,
        volume_analysis: volume_line,
        investment_opinion: opinion,
    };

    AnalysisReport {
        basic_info,
        current_price,
        technical_analysis,
        volume_analysis,
        investment_recommendation,
        insider_trading,
        conclusion,
    }
}

/// Normalizes raw insider transactions into displayable records. A record
/// without canned text gets one synthesized from shares and value; a record
/// with neither is skipped.
pub fn normalize_transactions(holders: &HoldersSnapshot, currency: &str) -> Vec<InsiderRecord> {
    let mut records = Vec::with_capacity(holders.transactions.len());
    for t in &holders.transactions {
        let transaction = match (&t.text, t.shares, t.value) {
            (Some(text), _, _) => text.clone(),
            (None, Some(shares), Some(value)) => {
                let action = if shares >= 0.0 { "bought" } else { "sold" };
                format!(
                    "{} shares {} (~{} {})",
                    group_thousands(shares.abs()),
                    action,
                    group_thousands(value.abs()),
                    currency
                )
            }
            _ => continue,
        };
        records.push(InsiderRecord {
            name: t.name.clone(),
            relation: t.relation.clone(),
            transaction,
            date: t.date.clone().unwrap_or_else(|| "N/A".to_string()),
            position: t.title.clone(),
        });
    }
    records
}

fn cross_text(status: CrossStatus, fast: usize, slow: usize, horizon: &str) -> String {
    match status {
        CrossStatus::Golden => format!(
            "golden cross: the {fast}-day moving average crossed above the {slow}-day ({horizon} bullish signal)"
        ),
        CrossStatus::Dead => format!(
            "dead cross: the {fast}-day moving average crossed below the {slow}-day ({horizon} bearish signal)"
        ),
        CrossStatus::FastAbove => format!(
            "the {fast}-day moving average is holding above the {slow}-day ({horizon} uptrend intact)"
        ),
        CrossStatus::FastBelow => format!(
            "the {fast}-day moving average is holding below the {slow}-day ({horizon} downtrend intact)"
        ),
        CrossStatus::Insufficient => "insufficient data".to_string(),
    }
}

fn trend_conclusion(trend: Trend) -> &'static str {
    match trend {
        Trend::StrongUp => {
            "All major moving averages (20, 50 and 200-day) are stacked bullishly with the price above them, a very positive configuration."
        }
        Trend::Up => {
            "The short and mid-term moving averages (20 and 50-day) point upward with the price above both."
        }
        Trend::Down => {
            "The short and mid-term moving averages (20 and 50-day) point downward with the price below both; caution is warranted."
        }
        Trend::StrongDown => {
            "All major moving averages (20, 50 and 200-day) are stacked bearishly with the price below them, a strongly negative configuration."
        }
        Trend::Neutral => {
            "The price is moving between its moving averages without a clear direction; further confirmation is needed."
        }
        Trend::Insufficient => {
            "The price history is too short to establish a reliable trend."
        }
    }
}

fn cross_addendum_short(status: CrossStatus) -> Option<&'static str> {
    match status {
        CrossStatus::Golden => {
            Some("The recent 20/50-day golden cross adds short-term bullish momentum.")
        }
        CrossStatus::Dead => {
            Some("The recent 20/50-day dead cross signals short-term bearish momentum.")
        }
        _ => None,
    }
}

fn cross_addendum_long(status: CrossStatus) -> Option<&'static str> {
    match status {
        CrossStatus::Golden => {
            Some("The 50/200-day golden cross also strengthens the longer-term outlook.")
        }
        CrossStatus::Dead => {
            Some("The 50/200-day dead cross also calls for longer-term caution.")
        }
        _ => None,
    }
}

fn volume_text(tech: &TechnicalSnapshot) -> String {
    let (Some(latest), Some(average), Some(pct)) =
        (tech.volume_latest, tech.volume_ma, tech.volume_change_pct)
    else {
        return "insufficient volume data".to_string();
    };
    let latest = group_thousands(latest);
    let average = group_thousands(average);
    match tech.volume_band {
        VolumeBand::VeryActive => format!(
            "Latest volume ({latest}) is {pct:.2}% above its 20-day average ({average}); trading is very active."
        ),
        VolumeBand::Active => format!(
            "Latest volume ({latest}) is {pct:.2}% above its 20-day average ({average}); trading is on the active side."
        ),
        VolumeBand::Low => format!(
            "Latest volume ({latest}) is {:.2}% below its 20-day average ({average}); trading is relatively quiet.",
            pct.abs()
        ),
        VolumeBand::Normal => format!(
            "Latest volume ({latest}) is holding near its 20-day average ({average}) ({pct:+.2}%)."
        ),
        VolumeBand::Insufficient => "insufficient volume data".to_string(),
    }
}

fn opinion_text(company: &str, rating: Rating, target_price: Option<f64>, currency: &str) -> String {
    let mut opinion = format!(
        "The current analyst consensus on {} is '{}'.",
        company,
        rating.label()
    );
    match target_price {
        Some(target) => opinion.push_str(&format!(
            " Analysts quote a mean target price of {:.2} {}.",
            target, currency
        )),
        None => opinion.push_str(" No explicit target price is currently available."),
    }
    let outlook = match rating {
        Rating::Buy | Rating::StrongBuy => {
            " This suggests upside potential from the current price level."
        }
        Rating::Sell | Rating::StrongSell => {
            " This suggests downside risk or an overvalued price level."
        }
        _ => " This suggests the price is seen as fairly valued, with no clear directional catalyst.",
    };
    opinion.push_str(outlook);
    opinion
}
