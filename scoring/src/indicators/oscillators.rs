//! Oscillators: RSI and momentum

use super::{prices, scaled_percent};
use crate::types::{IndicatorKind, IndicatorResult, Sample};

/// Neutral RSI reading
pub const RSI_NEUTRAL: f64 = 50.0;

/// Wilder RSI of a price series, `None` with fewer than `period` prices
///
/// The average gain and loss are seeded from the price changes inside the
/// first `period` prices, then smoothed with factor `1/period` over every
/// later change. A series with no movement reads 50.
pub fn rsi_value(prices: &[f64], period: usize) -> Option<f64> {
    if period < 2 || prices.len() < period {
        return None;
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let (seed, rest) = changes.split_at(period - 1);

    let seed_len = seed.len() as f64;
    let mut avg_gain = seed.iter().map(|c| c.max(0.0)).sum::<f64>() / seed_len;
    let mut avg_loss = seed.iter().map(|c| (-c).max(0.0)).sum::<f64>() / seed_len;

    let smoothing = (period - 1) as f64;
    for &change in rest {
        avg_gain = (avg_gain * smoothing + change.max(0.0)) / period as f64;
        avg_loss = (avg_loss * smoothing + (-change).max(0.0)) / period as f64;
    }

    let value = if avg_gain == 0.0 && avg_loss == 0.0 {
        RSI_NEUTRAL
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };
    Some(value)
}

/// Relative Strength Index
///
/// Contribution is `(50 - RSI) / 50`: oversold leans bullish, overbought
/// leans bearish. Minimum samples: `period`; below that the reading is 50.
pub fn rsi(samples: &[Sample], period: usize) -> IndicatorResult {
    let name = format!("RSI({period})");
    match rsi_value(&prices(samples), period) {
        Some(value) => IndicatorResult::computed(
            IndicatorKind::Rsi,
            name,
            value,
            (RSI_NEUTRAL - value) / RSI_NEUTRAL,
        ),
        None => IndicatorResult::neutral(IndicatorKind::Rsi, name, RSI_NEUTRAL),
    }
}

/// Momentum acceleration over lookback `k`
///
/// Value is `(p[t] - p[t-k]) - (p[t-k] - p[t-2k])`; positive means the
/// move up is accelerating. Contribution is the value in percent of price
/// over `saturation_pct`. Minimum samples: `2k + 1`.
pub fn momentum(samples: &[Sample], k: usize, saturation_pct: f64) -> IndicatorResult {
    let name = format!("Momentum({k})");
    let n = samples.len();
    if k == 0 || n < 2 * k + 1 {
        return IndicatorResult::neutral(IndicatorKind::Momentum, name, 0.0);
    }

    let now = samples[n - 1].price;
    let mid = samples[n - 1 - k].price;
    let early = samples[n - 1 - 2 * k].price;
    let value = (now - mid) - (mid - early);

    IndicatorResult::computed(
        IndicatorKind::Momentum,
        name,
        value,
        scaled_percent(value, now, saturation_pct),
    )
}
