//! Trend-following indicators: SMA, moving-average confluence, EMA and MACD

use super::{prices, scaled_percent};
use crate::types::{IndicatorKind, IndicatorResult, Sample};

/// Mean of the last `period` prices, `None` if there are fewer
pub fn sma_value(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Simple Moving Average
///
/// Value is the mean of the last `period` prices. The contribution is the
/// last price's distance from the mean in percent, saturating at
/// `saturation_pct`. Minimum samples: `period`.
pub fn sma(samples: &[Sample], period: usize, saturation_pct: f64) -> IndicatorResult {
    let name = format!("SMA({period})");
    let prices = prices(samples);

    match (sma_value(&prices, period), prices.last()) {
        (Some(mean), Some(&last)) => IndicatorResult::computed(
            IndicatorKind::Sma,
            name,
            mean,
            scaled_percent(last - mean, mean, saturation_pct),
        ),
        _ => IndicatorResult::neutral(IndicatorKind::Sma, name, prices.last().copied().unwrap_or(0.0)),
    }
}

/// Moving-average confluence across several SMA periods
///
/// Each SMA gives an opinion from the price's distance to it; the
/// confluence is their average, so it is strongest when price sits on the
/// same side of every average. Value is the mean percent distance.
/// Minimum samples: the largest period.
pub fn ma_confluence(samples: &[Sample], periods: &[usize], saturation_pct: f64) -> IndicatorResult {
    let label: Vec<String> = periods.iter().map(|p| p.to_string()).collect();
    let name = format!("MA Confluence({})", label.join("/"));

    let longest = periods.iter().copied().max().unwrap_or(0);
    if periods.is_empty() || samples.len() < longest {
        return IndicatorResult::neutral(IndicatorKind::MaConfluence, name, 0.0);
    }

    let last = samples[samples.len() - 1].price;
    let mut distance_sum = 0.0;
    let mut contribution_sum = 0.0;
    for &period in periods {
        let result = sma(samples, period, saturation_pct);
        let distance = (last - result.value) / result.value * 100.0;
        // an SMA that overflowed carries no distance opinion
        if distance.is_finite() {
            distance_sum += distance;
        }
        contribution_sum += result.normalized_contribution;
    }
    let n = periods.len() as f64;

    IndicatorResult::computed(
        IndicatorKind::MaConfluence,
        name,
        distance_sum / n,
        contribution_sum / n,
    )
}

/// Exponential moving average series seeded with the SMA of the first `period` values
///
/// Element `i` of the result corresponds to `values[i + period - 1]`.
/// Empty when there are fewer than `period` values.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(seed);
    let mut prev = seed;
    for &value in &values[period..] {
        // prev + alpha * delta keeps a flat input exactly flat
        prev += alpha * (value - prev);
        result.push(prev);
    }
    result
}

/// MACD line, signal line and histogram of a price series
pub(crate) fn macd_lines(prices: &[f64], fast: usize, slow: usize, signal: usize) -> Option<(f64, f64, f64)> {
    if fast == 0 || slow <= fast || signal == 0 || prices.len() < slow + signal - 1 {
        return None;
    }

    let fast_ema = ema_series(prices, fast);
    let slow_ema = ema_series(prices, slow);
    let offset = slow - fast;

    let macd_line: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, slow_value)| fast_ema[i + offset] - slow_value)
        .collect();

    let signal_line = ema_series(&macd_line, signal);
    let macd = *macd_line.last()?;
    let signal_value = *signal_line.last()?;
    Some((macd, signal_value, macd - signal_value))
}

/// Moving Average Convergence Divergence
///
/// Value is the histogram (MACD line minus signal line). The contribution
/// carries its sign, with magnitude equal to the histogram in percent of
/// price over `saturation_pct`, capped at 1.
/// Minimum samples: `slow + signal - 1`.
pub fn macd(
    samples: &[Sample],
    fast: usize,
    slow: usize,
    signal: usize,
    saturation_pct: f64,
) -> IndicatorResult {
    let name = format!("MACD({fast},{slow},{signal})");
    let prices = prices(samples);

    match (macd_lines(&prices, fast, slow, signal), prices.last()) {
        (Some((_, _, histogram)), Some(&last)) => IndicatorResult::computed(
            IndicatorKind::Macd,
            name,
            histogram,
            scaled_percent(histogram, last, saturation_pct),
        ),
        _ => IndicatorResult::neutral(IndicatorKind::Macd, name, 0.0),
    }
}
