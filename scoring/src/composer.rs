//! Confidence composition
//!
//! Merges weighted indicator contributions into one composite score, buckets
//! it, and derives a bounded confidence from how many indicators agree.

use crate::config::{ConfidenceConfig, IndicatorWeights};
use crate::types::{IndicatorKind, IndicatorResult, TrendBucket};

/// Outcome of composing one set of indicator results
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub overall_bucket: TrendBucket,
    pub composite_score: f64,
    pub confidence_percent: f64,
    /// Share of weighted indicators on the dominant side
    pub agreement_ratio: f64,
    /// Confidence points removed by the volatility modifier
    pub volatility_penalty: f64,
    /// True when no weighted indicator had enough samples
    pub insufficient_data: bool,
}

impl Composition {
    fn insufficient() -> Self {
        Self {
            overall_bucket: TrendBucket::Flat,
            composite_score: 0.0,
            confidence_percent: 0.0,
            agreement_ratio: 0.0,
            volatility_penalty: 0.0,
            insufficient_data: true,
        }
    }
}

/// Weighted combination of indicator results
pub struct ConfidenceComposer<'a> {
    weights: &'a IndicatorWeights,
    config: &'a ConfidenceConfig,
}

impl<'a> ConfidenceComposer<'a> {
    pub fn new(weights: &'a IndicatorWeights, config: &'a ConfidenceConfig) -> Self {
        Self { weights, config }
    }

    /// Compose indicator results into a score, bucket and confidence
    ///
    /// Indicators without a weight (volatility, plain SMA) do not vote; the
    /// volatility result, if present, only feeds the optional penalty.
    pub fn compose(&self, indicators: &[IndicatorResult]) -> Composition {
        let weighted: Vec<(&IndicatorResult, f64)> = indicators
            .iter()
            .map(|r| (r, self.weights.weight_for(r.kind)))
            .filter(|(_, w)| *w > 0.0)
            .collect();

        if !weighted.iter().any(|(r, _)| r.sufficient) {
            return Composition::insufficient();
        }

        let weighted_sum: f64 = weighted
            .iter()
            .map(|(r, w)| r.normalized_contribution * w)
            .sum();
        let composite_score = (weighted_sum * 2.0).clamp(-2.0, 2.0);
        let overall_bucket = TrendBucket::classify(composite_score, &self.config.composite_thresholds);

        let results: Vec<&IndicatorResult> = weighted.iter().map(|(r, _)| *r).collect();
        let agreement_ratio = self.agreement_ratio(&results);
        let mut confidence_percent = self.base_confidence(agreement_ratio);

        let mut volatility_penalty = 0.0;
        let penalty = &self.config.volatility_penalty;
        if penalty.enabled {
            if let Some(vol) = indicators
                .iter()
                .find(|r| r.kind == IndicatorKind::Volatility && r.sufficient)
            {
                if vol.value > penalty.threshold {
                    volatility_penalty = (vol.value - penalty.threshold) * penalty.penalty_per_unit;
                }
            }
            confidence_percent = (confidence_percent - volatility_penalty)
                .max(penalty.floor)
                .min(self.config.max_confidence);
        }

        Composition {
            overall_bucket,
            composite_score,
            confidence_percent,
            agreement_ratio,
            volatility_penalty,
            insufficient_data: false,
        }
    }

    /// `max(positive, negative) / count` over the given directional results
    ///
    /// Contributions inside the neutral band count for neither side but
    /// still count in the denominator, so agreement only grows when more
    /// indicators take the same side.
    pub fn agreement_ratio(&self, results: &[&IndicatorResult]) -> f64 {
        if results.is_empty() {
            return 0.0;
        }
        let band = self.config.neutral_band;
        let positive = results
            .iter()
            .filter(|r| r.normalized_contribution > band)
            .count();
        let negative = results
            .iter()
            .filter(|r| r.normalized_contribution < -band)
            .count();
        positive.max(negative) as f64 / results.len() as f64
    }

    /// `clamp(base + ratio * bonus, 0, max)`
    pub fn base_confidence(&self, agreement_ratio: f64) -> f64 {
        (self.config.base_confidence + agreement_ratio * self.config.agreement_bonus_max)
            .clamp(0.0, self.config.max_confidence)
    }
}
