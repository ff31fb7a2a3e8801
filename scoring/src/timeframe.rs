//! Multi-timeframe trend classification

use crate::buffer::SeriesBuffer;
use crate::config::BucketThresholds;
use crate::error::ScoringResult;
use crate::types::{IndicatorKind, IndicatorResult, Sample, TimeframeClassification, TrendBucket};

/// Classify one trailing window by its first-to-last percent change
///
/// Windows with fewer than two samples are Flat.
pub fn classify_window(
    window_size: usize,
    samples: &[Sample],
    thresholds: &BucketThresholds,
) -> TimeframeClassification {
    let percent_change = match (samples.first(), samples.last()) {
        (Some(first), Some(last)) if samples.len() >= 2 => {
            (last.price - first.price) / first.price * 100.0
        }
        _ => 0.0,
    };
    let trend_bucket = TrendBucket::classify(percent_change, thresholds);

    TimeframeClassification {
        window_size,
        sample_count: samples.len(),
        percent_change,
        trend_bucket,
        numeric_score: trend_bucket.score(),
    }
}

/// Classify every window in order
///
/// Windows must already be validated as strictly ascending; a window larger
/// than the buffer capacity surfaces as `InsufficientData` from the snapshot.
pub fn classify_all(
    buffer: &SeriesBuffer,
    windows: &[usize],
    thresholds: &BucketThresholds,
) -> ScoringResult<Vec<TimeframeClassification>> {
    windows
        .iter()
        .map(|&window| {
            let samples = buffer.snapshot(window)?;
            Ok(classify_window(window, &samples, thresholds))
        })
        .collect()
}

/// Agreement across timeframes as a weighted indicator
///
/// Value is the mean bucket score in [-2, 2]; the contribution halves it
/// into [-1, 1]. Needs at least one window with two samples.
pub fn agreement(classifications: &[TimeframeClassification]) -> IndicatorResult {
    let labels: Vec<String> = classifications.iter().map(|c| c.window_size.to_string()).collect();
    let name = format!("Timeframe Agreement({})", labels.join("/"));

    if !classifications.iter().any(|c| c.sample_count >= 2) {
        return IndicatorResult::neutral(IndicatorKind::TimeframeAgreement, name, 0.0);
    }

    let mean = classifications.iter().map(|c| c.numeric_score).sum::<f64>()
        / classifications.len() as f64;
    IndicatorResult::computed(IndicatorKind::TimeframeAgreement, name, mean, mean / 2.0)
}
