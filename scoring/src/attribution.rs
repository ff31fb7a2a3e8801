//! Human-readable attribution of a signal

use crate::composer::Composition;
use crate::types::{
    IndicatorKind, IndicatorResult, Lean, MarketContext, TimeframeClassification, VolumeSpike,
};

/// Renders the explanation lines of a [`crate::SignalResult`]
///
/// Pure: the same inputs always produce the same lines in the same order.
pub struct AttributionReporter {
    neutral_band: f64,
}

impl AttributionReporter {
    pub fn new(neutral_band: f64) -> Self {
        Self { neutral_band }
    }

    /// Explanation lines: indicators with an opinion, then timeframes, then context
    pub fn explain(
        &self,
        composition: &Composition,
        indicators: &[IndicatorResult],
        timeframes: &[TimeframeClassification],
        context: &MarketContext,
    ) -> Vec<String> {
        let mut lines = Vec::new();

        if composition.insufficient_data {
            lines.push(format!(
                "insufficient data: no weighted indicator has enough samples ({} timeframes checked)",
                timeframes.len()
            ));
        }

        for result in indicators {
            if let Some(line) = self.indicator_line(result) {
                lines.push(line);
            }
        }

        for tf in timeframes {
            lines.push(format!(
                "{}-sample window: {} ({:+.2}% over {} samples)",
                tf.window_size, tf.trend_bucket, tf.percent_change, tf.sample_count
            ));
        }

        lines.extend(context_lines(context));

        if composition.volatility_penalty > 0.0 {
            lines.push(format!(
                "Confidence reduced by {:.1} points for elevated volatility",
                composition.volatility_penalty
            ));
        }

        lines
    }

    fn indicator_line(&self, result: &IndicatorResult) -> Option<String> {
        let lean = result.lean(self.neutral_band);
        if lean == Lean::Neutral {
            return None;
        }
        Some(format!(
            "{} = {:.2}: {} ({:+.2}), {}",
            result.name,
            result.value,
            lean,
            result.normalized_contribution,
            reason(result.kind, lean)
        ))
    }
}

fn reason(kind: IndicatorKind, lean: Lean) -> &'static str {
    let bullish = lean == Lean::Bullish;
    match kind {
        IndicatorKind::Rsi if bullish => "oversold",
        IndicatorKind::Rsi => "overbought",
        IndicatorKind::SupportResistance if bullish => "near support",
        IndicatorKind::SupportResistance => "near resistance",
        IndicatorKind::Macd if bullish => "MACD above its signal line",
        IndicatorKind::Macd => "MACD below its signal line",
        IndicatorKind::Momentum if bullish => "momentum accelerating upward",
        IndicatorKind::Momentum => "momentum accelerating downward",
        IndicatorKind::MaConfluence | IndicatorKind::Sma if bullish => "price above its moving averages",
        IndicatorKind::MaConfluence | IndicatorKind::Sma => "price below its moving averages",
        IndicatorKind::TimeframeAgreement if bullish => "timeframes lean up",
        IndicatorKind::TimeframeAgreement => "timeframes lean down",
        IndicatorKind::Bollinger if bullish => "near the lower Bollinger band",
        IndicatorKind::Bollinger => "near the upper Bollinger band",
        IndicatorKind::Obv if bullish => "volume confirms buying",
        IndicatorKind::Obv => "volume confirms selling",
        IndicatorKind::Volatility => "volatility",
    }
}

fn context_lines(context: &MarketContext) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(regime) = context.volatility_regime {
        lines.push(format!("Volatility regime: {regime}"));
    }
    lines.push(format!("Market regime: {}", context.market_regime));
    if let Some(expected) = context.expected_move_percent {
        lines.push(format!("Expected move: {expected:.2}%"));
    }
    if let Some(volume) = &context.volume {
        let spike = match volume.spike {
            VolumeSpike::Exceptional => ", exceptional spike",
            VolumeSpike::Significant => ", significant spike",
            VolumeSpike::None => "",
        };
        lines.push(format!(
            "Volume: {:.2}x average, trend {:+.2}{spike}",
            volume.ratio, volume.trend
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MarketRegime, TrendBucket, VolatilityRegime, VolumeProfile};

    fn composition(insufficient_data: bool, volatility_penalty: f64) -> Composition {
        Composition {
            overall_bucket: TrendBucket::Flat,
            composite_score: 0.0,
            confidence_percent: 75.0,
            agreement_ratio: 0.0,
            volatility_penalty,
            insufficient_data,
        }
    }

    fn quiet_context() -> MarketContext {
        MarketContext {
            volatility_regime: None,
            market_regime: MarketRegime::Sideways,
            expected_move_percent: None,
            volume: None,
        }
    }

    #[test]
    fn test_only_opinionated_indicators_listed() {
        let reporter = AttributionReporter::new(0.1);
        let indicators = vec![
            IndicatorResult::computed(IndicatorKind::Rsi, "RSI(14)", 25.0, 0.5),
            IndicatorResult::computed(IndicatorKind::Momentum, "Momentum(2)", 0.01, 0.05),
            IndicatorResult::computed(IndicatorKind::SupportResistance, "Support/Resistance(10)", 0.9, -1.0),
        ];
        let lines = reporter.explain(&composition(false, 0.0), &indicators, &[], &quiet_context());

        assert_eq!(lines[0], "RSI(14) = 25.00: bullish (+0.50), oversold");
        assert_eq!(lines[1], "Support/Resistance(10) = 0.90: bearish (-1.00), near resistance");
        assert!(!lines.iter().any(|l| l.starts_with("Momentum")));
        assert_eq!(lines.last().map(String::as_str), Some("Market regime: Sideways"));
    }

    #[test]
    fn test_timeframe_lines() {
        let reporter = AttributionReporter::new(0.1);
        let timeframes = vec![TimeframeClassification {
            window_size: 5,
            sample_count: 5,
            percent_change: 1.234,
            trend_bucket: TrendBucket::Up,
            numeric_score: 1.0,
        }];
        let lines = reporter.explain(&composition(false, 0.0), &[], &timeframes, &quiet_context());
        assert_eq!(lines[0], "5-sample window: Up (+1.23% over 5 samples)");
    }

    #[test]
    fn test_insufficient_data_line_first() {
        let reporter = AttributionReporter::new(0.1);
        let lines = reporter.explain(&composition(true, 0.0), &[], &[], &quiet_context());
        assert!(lines[0].starts_with("insufficient data"));
    }

    #[test]
    fn test_context_and_penalty_lines() {
        let reporter = AttributionReporter::new(0.1);
        let context = MarketContext {
            volatility_regime: Some(VolatilityRegime::High),
            market_regime: MarketRegime::Trending,
            expected_move_percent: Some(3.5),
            volume: Some(VolumeProfile {
                ratio: 2.4,
                trend: 0.3,
                spike: VolumeSpike::Exceptional,
            }),
        };
        let lines = reporter.explain(&composition(false, 12.5), &[], &[], &context);
        assert_eq!(
            lines,
            vec![
                "Volatility regime: High".to_string(),
                "Market regime: Trending".to_string(),
                "Expected move: 3.50%".to_string(),
                "Volume: 2.40x average, trend +0.30, exceptional spike".to_string(),
                "Confidence reduced by 12.5 points for elevated volatility".to_string(),
            ]
        );
    }
}
