//! Market context: volatility and market regime, expected move, volume
//!
//! Context is informational. It is reported alongside the signal and never
//! feeds back into the composite score.

use crate::config::ContextConfig;
use crate::indicators::volume_profile;
use crate::types::{
    IndicatorResult, MarketContext, MarketRegime, Sample, TimeframeClassification, VolatilityRegime,
};

/// Bucket a volatility reading
pub fn volatility_regime(volatility: f64, config: &ContextConfig) -> VolatilityRegime {
    if volatility > config.high_volatility {
        VolatilityRegime::High
    } else if volatility < config.low_volatility {
        VolatilityRegime::Low
    } else {
        VolatilityRegime::Normal
    }
}

/// Bucket the percent change of the longest timeframe
pub fn market_regime(change_pct: f64, config: &ContextConfig) -> MarketRegime {
    let magnitude = change_pct.abs();
    if magnitude > config.trending_change_pct {
        MarketRegime::Trending
    } else if magnitude < config.sideways_change_pct {
        MarketRegime::Sideways
    } else {
        MarketRegime::Mixed
    }
}

/// Expected move in percent of price
///
/// Starts from volatility in percent, grows 20% when the longest timeframe
/// moved more than 1%, then scales with signal strength `|composite| / 2`.
pub fn expected_move(
    volatility: f64,
    change_pct: f64,
    composite_score: f64,
    config: &ContextConfig,
) -> f64 {
    let mut estimate = volatility * 100.0;
    if change_pct.abs() > 1.0 {
        estimate *= 1.2;
    }
    let strength = (composite_score.abs() / 2.0).min(1.0);
    estimate *= 1.0 + 0.5 * strength;
    estimate.clamp(config.min_expected_move_pct, config.max_expected_move_pct)
}

/// Assemble the context of one scoring call
///
/// `volatility` is the volatility indicator result; when it was computed
/// from too few samples the regime and expected move are absent. `window`
/// is the longest timeframe's snapshot, used for the volume profile.
pub fn build(
    volatility: &IndicatorResult,
    timeframes: &[TimeframeClassification],
    window: &[Sample],
    composite_score: f64,
    config: &ContextConfig,
) -> MarketContext {
    let change_pct = timeframes.last().map(|t| t.percent_change).unwrap_or(0.0);

    let (volatility_regime, expected_move_percent) = if volatility.sufficient {
        (
            Some(volatility_regime(volatility.value, config)),
            Some(expected_move(volatility.value, change_pct, composite_score, config)),
        )
    } else {
        (None, None)
    };

    MarketContext {
        volatility_regime,
        market_regime: market_regime(change_pct, config),
        expected_move_percent,
        volume: volume_profile(window),
    }
}
