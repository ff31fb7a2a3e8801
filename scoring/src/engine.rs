//! Scoring engine
//!
//! Ties the indicator library, timeframe aggregator, composer, market
//! context and reporter together. The engine holds only validated
//! configuration; every call is a pure function of the buffer it is given.

use crate::attribution::AttributionReporter;
use crate::buffer::SeriesBuffer;
use crate::composer::ConfidenceComposer;
use crate::config::{validate_windows, ScoringConfig};
use crate::context;
use crate::error::ScoringResult;
use crate::indicators;
use crate::timeframe;
use crate::types::{IndicatorResult, Sample, SignalResult, TimeframeClassification};
use tracing::debug;

/// Deterministic signal scorer
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    /// Create an engine, rejecting invalid configuration up front
    pub fn new(config: ScoringConfig) -> ScoringResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Empty buffer sized from the configuration
    pub fn new_buffer(&self) -> SeriesBuffer {
        SeriesBuffer::new(self.config.buffer.capacity)
    }

    /// Score a buffer over the configured timeframe windows
    pub fn score(&self, buffer: &SeriesBuffer) -> ScoringResult<SignalResult> {
        self.score_windows(buffer, &self.config.timeframes.windows)
    }

    /// Score a buffer over caller-supplied timeframe windows
    ///
    /// The windows are validated like configuration: non-empty, positive,
    /// strictly ascending and no larger than the buffer's capacity.
    pub fn score_with_windows(
        &self,
        buffer: &SeriesBuffer,
        windows: &[usize],
    ) -> ScoringResult<SignalResult> {
        validate_windows(windows, buffer.capacity())?;
        self.score_windows(buffer, windows)
    }

    fn score_windows(&self, buffer: &SeriesBuffer, windows: &[usize]) -> ScoringResult<SignalResult> {
        let samples: Vec<Sample> = buffer.samples().copied().collect();

        let per_timeframe =
            timeframe::classify_all(buffer, windows, &self.config.timeframes.thresholds)?;
        let volatility = indicators::volatility(&samples, self.config.indicators.volatility_window);

        let mut per_indicator = self.directional_indicators(&samples, &per_timeframe);
        per_indicator.push(volatility.clone());

        let composer = ConfidenceComposer::new(&self.config.weights, &self.config.confidence);
        let composition = composer.compose(&per_indicator);

        let longest = windows.last().copied().unwrap_or_else(|| buffer.capacity());
        let longest_window = buffer.snapshot(longest)?;
        let context = context::build(
            &volatility,
            &per_timeframe,
            &longest_window,
            composition.composite_score,
            &self.config.context,
        );

        let reporter = AttributionReporter::new(self.config.confidence.neutral_band);
        let explanation = reporter.explain(&composition, &per_indicator, &per_timeframe, &context);

        debug!(
            samples = samples.len(),
            bucket = %composition.overall_bucket,
            composite = composition.composite_score,
            confidence = composition.confidence_percent,
            agreement = composition.agreement_ratio,
            "Scored series"
        );

        Ok(SignalResult {
            overall_bucket: composition.overall_bucket,
            composite_score: composition.composite_score,
            confidence_percent: composition.confidence_percent,
            per_indicator,
            per_timeframe,
            context,
            explanation,
        })
    }

    /// Weighted indicators in reporting order
    fn directional_indicators(
        &self,
        samples: &[Sample],
        per_timeframe: &[TimeframeClassification],
    ) -> Vec<IndicatorResult> {
        let ind = &self.config.indicators;
        vec![
            indicators::ma_confluence(samples, &ind.ma_periods, ind.ma_saturation_pct),
            timeframe::agreement(per_timeframe),
            indicators::rsi(samples, ind.rsi_period),
            indicators::macd(
                samples,
                ind.macd_fast,
                ind.macd_slow,
                ind.macd_signal,
                ind.macd_saturation_pct,
            ),
            indicators::support_resistance(samples, ind.support_resistance_window),
            indicators::momentum(samples, ind.momentum_lookback, ind.momentum_saturation_pct),
            indicators::bollinger(samples, ind.bollinger_period, ind.bollinger_std_dev),
            indicators::obv_trend(samples, ind.obv_lookback),
        ]
    }
}
