//! Volatility and volume participation

use crate::types::{IndicatorKind, IndicatorResult, Sample, VolumeProfile, VolumeSpike};

/// Mean absolute log return over the last `window` returns
///
/// Not directional: the contribution is always 0. The value feeds the
/// optional confidence penalty and the volatility regime.
/// Minimum samples: `window + 1`.
pub fn volatility(samples: &[Sample], window: usize) -> IndicatorResult {
    let name = format!("Volatility({window})");
    if window == 0 || samples.len() < window + 1 {
        return IndicatorResult::neutral(IndicatorKind::Volatility, name, 0.0);
    }

    let recent = &samples[samples.len() - window - 1..];
    let total: f64 = recent
        .windows(2)
        .map(|w| (w[1].price / w[0].price).ln().abs())
        .sum();

    IndicatorResult::computed(IndicatorKind::Volatility, name, total / window as f64, 0.0)
}

/// On-balance volume over the last `lookback` price changes
///
/// Each change adds its sample's volume when the price rose and subtracts it
/// when the price fell. The value is that signed sum; the contribution divides
/// it by the window's total volume, so +1 means every unit of volume traded on
/// an up move. Needs a volume on each of the last `lookback + 1` samples and a
/// non-zero total, otherwise the result is neutral 0.
/// Minimum samples: `lookback + 1`.
pub fn obv_trend(samples: &[Sample], lookback: usize) -> IndicatorResult {
    let name = format!("OBV Trend({lookback})");
    if lookback == 0 || samples.len() < lookback + 1 {
        return IndicatorResult::neutral(IndicatorKind::Obv, name, 0.0);
    }

    let recent = &samples[samples.len() - lookback - 1..];
    let volumes: Option<Vec<f64>> = recent.iter().map(|s| s.volume.map(|v| v as f64)).collect();
    let Some(volumes) = volumes else {
        return IndicatorResult::neutral(IndicatorKind::Obv, name, 0.0);
    };

    let mut signed = 0.0;
    let mut total = 0.0;
    for (i, pair) in recent.windows(2).enumerate() {
        let volume = volumes[i + 1];
        total += volume;
        if pair[1].price > pair[0].price {
            signed += volume;
        } else if pair[1].price < pair[0].price {
            signed -= volume;
        }
    }
    if total <= 0.0 {
        return IndicatorResult::neutral(IndicatorKind::Obv, name, 0.0);
    }

    IndicatorResult::computed(IndicatorKind::Obv, name, signed, signed / total)
}

/// Volume participation of the latest sample relative to the window
///
/// Requires a volume on the latest sample and at least two earlier samples
/// with volume; returns `None` otherwise or when the history averages zero.
pub fn volume_profile(samples: &[Sample]) -> Option<VolumeProfile> {
    let current = samples.last()?.volume? as f64;
    let history: Vec<f64> = samples[..samples.len() - 1]
        .iter()
        .filter_map(|s| s.volume.map(|v| v as f64))
        .collect();
    if history.len() < 2 {
        return None;
    }

    let mean = history.iter().sum::<f64>() / history.len() as f64;
    if mean <= 0.0 {
        return None;
    }
    let peak = history.iter().copied().fold(0.0, f64::max);

    let spike = if current > peak * 1.5 {
        VolumeSpike::Exceptional
    } else if current > mean * 2.0 {
        VolumeSpike::Significant
    } else {
        VolumeSpike::None
    };

    let mut all = history;
    all.push(current);

    Some(VolumeProfile {
        ratio: current / mean,
        trend: volume_trend(&all),
        spike,
    })
}

/// Recent third of volumes against the oldest third, scaled x2 into [-1, 1]
fn volume_trend(volumes: &[f64]) -> f64 {
    let third = volumes.len() / 3;
    if third == 0 {
        return 0.0;
    }
    let older = volumes[..third].iter().sum::<f64>() / third as f64;
    let recent = volumes[volumes.len() - third..].iter().sum::<f64>() / third as f64;
    if older <= 0.0 {
        return 0.0;
    }
    ((recent - older) / older * 2.0).clamp(-1.0, 1.0)
}
