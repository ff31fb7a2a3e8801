//! Support/resistance and Bollinger bands

use crate::types::{IndicatorKind, IndicatorResult, Sample};

const SUPPORT_ZONE: f64 = 0.2;
const RESISTANCE_ZONE: f64 = 0.8;

/// Position of the current price within the window's `[min, max]` range
///
/// Value is the position in `[0, 1]`. Below 0.2 (near support) contributes
/// +1, above 0.8 (near resistance) -1, and in between the contribution runs
/// linearly through 0 at mid-range. A window with no range is neutral.
/// Minimum samples: `window`.
pub fn support_resistance(samples: &[Sample], window: usize) -> IndicatorResult {
    let name = format!("Support/Resistance({window})");
    if window < 2 || samples.len() < window {
        return IndicatorResult::neutral(IndicatorKind::SupportResistance, name, 0.5);
    }

    let recent = &samples[samples.len() - window..];
    let current = recent[recent.len() - 1].price;
    let (low, high) = recent.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s.price), hi.max(s.price))
    });

    let range = high - low;
    if range <= 0.0 {
        return IndicatorResult::computed(IndicatorKind::SupportResistance, name, 0.5, 0.0);
    }

    let position = (current - low) / range;
    let contribution = if position < SUPPORT_ZONE {
        1.0
    } else if position > RESISTANCE_ZONE {
        -1.0
    } else {
        (0.5 - position) / (0.5 - SUPPORT_ZONE)
    };

    IndicatorResult::computed(IndicatorKind::SupportResistance, name, position, contribution)
}

/// Bollinger %B: position of the price between bands `mean ± std_dev * sigma`
///
/// Sigma is the population standard deviation of the last `period` prices.
/// Below %B 0.2 the contribution rises linearly to +1 at %B 0 (and stays
/// there beneath the lower band); above 0.8 it falls the same way to -1.
/// Bands of zero width read 0.5 with no contribution.
/// Minimum samples: `period`.
pub fn bollinger(samples: &[Sample], period: usize, std_dev: f64) -> IndicatorResult {
    let name = format!("Bollinger %B({period},{std_dev})");
    if period < 2 || samples.len() < period {
        return IndicatorResult::neutral(IndicatorKind::Bollinger, name, 0.5);
    }

    let recent = &samples[samples.len() - period..];
    let current = recent[recent.len() - 1].price;
    let mean = recent.iter().map(|s| s.price).sum::<f64>() / period as f64;
    let variance = recent.iter().map(|s| (s.price - mean).powi(2)).sum::<f64>() / period as f64;
    let width = 2.0 * std_dev * variance.sqrt();
    if !(width > 0.0 && width.is_finite()) {
        return IndicatorResult::computed(IndicatorKind::Bollinger, name, 0.5, 0.0);
    }

    let lower = mean - width / 2.0;
    let percent_b = (current - lower) / width;
    let contribution = if percent_b < SUPPORT_ZONE {
        (SUPPORT_ZONE - percent_b) * 5.0
    } else if percent_b > RESISTANCE_ZONE {
        -(percent_b - RESISTANCE_ZONE) * 5.0
    } else {
        0.0
    };

    IndicatorResult::computed(IndicatorKind::Bollinger, name, percent_b, contribution)
}
