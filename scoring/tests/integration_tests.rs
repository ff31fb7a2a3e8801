//! Integration tests for the scoring engine
//!
//! These tests drive whole scoring calls through the public API: sample
//! ingestion, determinism, bucket and confidence bounds, and the reference
//! price scenarios.

use approx::assert_relative_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use confluence_scoring::{
    BucketThresholds, ConfidenceComposer, ConfidenceConfig, IndicatorKind, IndicatorResult,
    IndicatorWeights, InstrumentSession, Sample, ScoringConfig, ScoringEngine, ScoringError,
    SeriesBuffer, SharedSeries, SignalResult, TrendBucket,
};
use proptest::prelude::*;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 31, 3, 45, 0).unwrap()
}

fn samples(prices: &[f64]) -> Vec<Sample> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| Sample::new(base() + Duration::minutes(i as i64), p))
        .collect()
}

fn score_prices(config: ScoringConfig, prices: &[f64]) -> SignalResult {
    let mut session = InstrumentSession::new("TEST", config).unwrap();
    for sample in samples(prices) {
        session.append(sample).unwrap();
    }
    session.score().unwrap()
}

fn alternating(n: usize) -> Vec<f64> {
    (0..n).map(|i| if i % 2 == 0 { 100.0 } else { 99.0 }).collect()
}

fn is_insufficient(result: &SignalResult) -> bool {
    result
        .explanation
        .first()
        .is_some_and(|line| line.starts_with("insufficient data"))
}

#[test]
fn test_scoring_is_deterministic() {
    let prices: Vec<f64> = (0..50)
        .map(|i| 25700.0 + (i as f64 * 0.7).sin() * 40.0 + i as f64 * 3.0)
        .collect();
    let mut session = InstrumentSession::new("NIFTY", ScoringConfig::default()).unwrap();
    for sample in samples(&prices) {
        session.append(sample).unwrap();
    }

    let first = session.score().unwrap();
    let second = session.score().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.composite_score.to_bits(), second.composite_score.to_bits());
    assert_eq!(first.confidence_percent.to_bits(), second.confidence_percent.to_bits());
}

#[test]
fn test_constant_series_is_flat() {
    let result = score_prices(ScoringConfig::default(), &[100.0; 50]);

    assert_eq!(result.overall_bucket, TrendBucket::Flat);
    assert_eq!(result.composite_score, 0.0);
    assert_eq!(result.confidence_percent, 75.0);

    let rsi = result.indicator(IndicatorKind::Rsi).unwrap();
    assert!(rsi.sufficient);
    assert_eq!(rsi.value, 50.0);

    let macd = result.indicator(IndicatorKind::Macd).unwrap();
    assert!(macd.sufficient);
    assert_eq!(macd.value, 0.0);

    let momentum = result.indicator(IndicatorKind::Momentum).unwrap();
    assert_eq!(momentum.value, 0.0);

    assert!(result
        .per_timeframe
        .iter()
        .all(|tf| tf.trend_bucket == TrendBucket::Flat));
}

#[test]
fn test_rising_series_is_bullish() {
    let prices: Vec<f64> = (100..=110).map(f64::from).collect();
    let result = score_prices(ScoringConfig::default(), &prices);

    assert!(matches!(
        result.overall_bucket,
        TrendBucket::Up | TrendBucket::StrongUp
    ));
    assert!(result.composite_score > 0.5);
    assert!(result.confidence_percent > 75.0);
    assert!(result.confidence_percent <= 95.0);
}

#[test]
fn test_alternating_series_is_flat() {
    for n in [20, 21] {
        let result = score_prices(ScoringConfig::default(), &alternating(n));
        assert_eq!(result.overall_bucket, TrendBucket::Flat, "{n} samples");
        assert!(result.composite_score.abs() < 0.5, "{n} samples");
    }
}

#[test]
fn test_rsi_minimum_data_policy() {
    let mut config = ScoringConfig::default();
    config.indicators.rsi_period = 14;

    let prices: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();

    let short = score_prices(config.clone(), &prices[..13]);
    let rsi = short.indicator(IndicatorKind::Rsi).unwrap();
    assert!(!rsi.sufficient);
    assert_eq!(rsi.value, 50.0);
    assert_eq!(rsi.normalized_contribution, 0.0);

    let enough = score_prices(config, &prices);
    let rsi = enough.indicator(IndicatorKind::Rsi).unwrap();
    assert!(rsi.sufficient);
    assert_eq!(rsi.value, 100.0);
}

#[test]
fn test_eviction_keeps_latest_in_order() {
    let capacity = 10;
    let mut buffer = SeriesBuffer::new(capacity);
    let all = samples(&(0..=capacity).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
    for sample in &all {
        buffer.append(*sample).unwrap();
    }

    assert_eq!(buffer.len(), capacity);
    let kept: Vec<Sample> = buffer.samples().copied().collect();
    assert_eq!(kept.first(), Some(&all[1]));
    assert_eq!(kept.last(), Some(&all[capacity]));
    assert!(kept.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn test_out_of_order_append_rejected() {
    let mut session = InstrumentSession::new("BANKNIFTY", ScoringConfig::default()).unwrap();
    let series = samples(&[100.0, 101.0, 102.0]);
    session.append(series[0]).unwrap();
    session.append(series[2]).unwrap();

    let err = session.append(series[1]).unwrap_err();
    assert!(matches!(err, ScoringError::OutOfOrder { .. }));
    assert_eq!(session.buffer().len(), 2);

    // equal timestamps are rejected too
    assert!(session.append(series[2]).is_err());
    assert_eq!(session.buffer().len(), 2);
}

#[test]
fn test_invalid_configuration_rejected() {
    let cases: Vec<Box<dyn Fn(&mut ScoringConfig)>> = vec![
        Box::new(|c: &mut ScoringConfig| c.weights.momentum = 0.2),
        Box::new(|c: &mut ScoringConfig| c.weights.rsi = -0.1),
        Box::new(|c: &mut ScoringConfig| c.indicators.rsi_period = 0),
        Box::new(|c: &mut ScoringConfig| {
            c.indicators.macd_fast = 26;
            c.indicators.macd_slow = 12;
        }),
        Box::new(|c: &mut ScoringConfig| c.timeframes.windows = vec![15, 5, 50]),
        Box::new(|c: &mut ScoringConfig| c.timeframes.windows = vec![5, 15, 100]),
        Box::new(|c: &mut ScoringConfig| c.confidence.max_confidence = 100.0),
        Box::new(|c: &mut ScoringConfig| c.timeframes.thresholds = BucketThresholds { strong: 0.5, mild: 2.0 }),
        // indicators the buffer could never fill
        Box::new(|c: &mut ScoringConfig| c.indicators.rsi_period = 60),
        Box::new(|c: &mut ScoringConfig| {
            c.buffer.capacity = 20;
            c.timeframes.windows = vec![5, 10, 20];
        }),
        Box::new(|c: &mut ScoringConfig| {
            c.buffer.capacity = 20;
            c.timeframes.windows = vec![5, 10, 20];
            c.indicators.macd_slow = 10;
            c.indicators.macd_fast = 5;
            c.indicators.macd_signal = 5;
            c.indicators.bollinger_period = 14;
            c.indicators.rsi_period = 40;
        }),
        Box::new(|c: &mut ScoringConfig| c.indicators.ma_periods = vec![3, 5, 60]),
        Box::new(|c: &mut ScoringConfig| c.indicators.momentum_lookback = 25),
        Box::new(|c: &mut ScoringConfig| c.indicators.volatility_window = 50),
        Box::new(|c: &mut ScoringConfig| c.indicators.obv_lookback = 50),
    ];

    for (i, mutate) in cases.iter().enumerate() {
        let mut config = ScoringConfig::default();
        mutate(&mut config);
        assert!(
            matches!(
                ScoringEngine::new(config),
                Err(ScoringError::InvalidConfiguration(_))
            ),
            "case {i} should be rejected"
        );
    }
}

#[test]
fn test_insufficient_data_output() {
    for n in [0, 1] {
        let prices = vec![100.0; n];
        let result = score_prices(ScoringConfig::default(), &prices);
        assert_eq!(result.overall_bucket, TrendBucket::Flat);
        assert_eq!(result.composite_score, 0.0);
        assert_eq!(result.confidence_percent, 0.0);
        assert!(is_insufficient(&result), "{n} samples");
    }
}

#[test]
fn test_timeframe_thresholds_are_configuration() {
    // +1.5% over five samples
    let prices = [100.0, 100.3, 100.6, 101.0, 101.5];
    let cases = [
        (BucketThresholds { strong: 2.0, mild: 0.5 }, TrendBucket::Up),
        (BucketThresholds { strong: 1.0, mild: 0.25 }, TrendBucket::StrongUp),
        (BucketThresholds { strong: 5.0, mild: 2.0 }, TrendBucket::Flat),
    ];

    for (thresholds, expected) in cases {
        let mut config = ScoringConfig::default();
        config.timeframes.thresholds = thresholds;
        let result = score_prices(config, &prices);
        assert_eq!(result.per_timeframe[0].trend_bucket, expected, "{thresholds:?}");
        assert_relative_eq!(result.per_timeframe[0].percent_change, 1.5, epsilon = 1e-9);
    }
}

#[test]
fn test_composite_thresholds_are_configuration() {
    let weights = IndicatorWeights::default();
    // 2 * (0.30 + 0.25) = 1.1
    let indicators = vec![
        IndicatorResult::computed(IndicatorKind::MaConfluence, "MA Confluence(3/5/10)", 1.0, 1.0),
        IndicatorResult::computed(IndicatorKind::TimeframeAgreement, "Timeframe Agreement(5/15/50)", 2.0, 1.0),
    ];

    let cases = [
        (BucketThresholds { strong: 1.5, mild: 0.5 }, TrendBucket::Up),
        (BucketThresholds { strong: 1.0, mild: 0.5 }, TrendBucket::StrongUp),
        (BucketThresholds { strong: 1.8, mild: 1.2 }, TrendBucket::Flat),
    ];
    for (thresholds, expected) in cases {
        let config = ConfidenceConfig {
            composite_thresholds: thresholds,
            ..ConfidenceConfig::default()
        };
        let composition = ConfidenceComposer::new(&weights, &config).compose(&indicators);
        assert_relative_eq!(composition.composite_score, 1.1, epsilon = 1e-9);
        assert_eq!(composition.overall_bucket, expected);
    }
}

#[test]
fn test_window_override_per_call() {
    let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 0.1).collect();
    let mut session = InstrumentSession::new("SENSEX", ScoringConfig::default()).unwrap();
    for sample in samples(&prices) {
        session.append(sample).unwrap();
    }

    let result = session.score_with_windows(&[3, 10, 30]).unwrap();
    let windows: Vec<usize> = result.per_timeframe.iter().map(|tf| tf.window_size).collect();
    assert_eq!(windows, vec![3, 10, 30]);
    assert_eq!(result.per_timeframe[2].sample_count, 30);

    assert!(matches!(
        session.score_with_windows(&[10, 3]),
        Err(ScoringError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_shared_series_scoring() {
    let engine = ScoringEngine::new(ScoringConfig::default()).unwrap();
    let shared = SharedSeries::from(engine.new_buffer());

    let writer = {
        let shared = shared.clone();
        std::thread::spawn(move || {
            for sample in samples(&(0..40).map(|i| 100.0 + i as f64).collect::<Vec<_>>()) {
                shared.append(sample).unwrap();
            }
        })
    };
    writer.join().unwrap();

    let result = shared.read(|buffer| engine.score(buffer)).unwrap();
    assert_eq!(shared.len(), 40);
    assert!(result.composite_score > 0.0);
    assert!(result
        .per_timeframe
        .iter()
        .all(|tf| tf.trend_bucket == TrendBucket::StrongUp));
}

#[test]
fn test_explanation_lists_timeframes() {
    let prices: Vec<f64> = (100..=110).map(f64::from).collect();
    let result = score_prices(ScoringConfig::default(), &prices);

    assert!(result
        .explanation
        .iter()
        .any(|line| line.starts_with("5-sample window: StrongUp")));
    assert!(result
        .explanation
        .iter()
        .any(|line| line.starts_with("Support/Resistance(10)") && line.contains("near resistance")));
    assert!(!result.explanation.iter().any(|line| line.starts_with("RSI")));
}

#[test]
fn test_bollinger_and_obv_weights_are_opt_in() {
    let volumed: Vec<Sample> = (0..25)
        .map(|i| Sample::with_volume(base() + Duration::minutes(i), 100.0 + i as f64, 1_000))
        .collect();
    let score = |config: ScoringConfig| {
        let mut session = InstrumentSession::new("TEST", config).unwrap();
        for sample in &volumed {
            session.append(*sample).unwrap();
        }
        session.score().unwrap()
    };

    let unweighted = score(ScoringConfig::default());
    let bollinger = unweighted.indicator(IndicatorKind::Bollinger).unwrap();
    let obv = unweighted.indicator(IndicatorKind::Obv).unwrap();
    assert!(bollinger.sufficient && obv.sufficient);
    // a steady climb sits high in its bands on rising volume
    assert!(bollinger.normalized_contribution < 0.0);
    assert_eq!(obv.normalized_contribution, 1.0);
    assert!(unweighted
        .explanation
        .iter()
        .any(|line| line.starts_with("OBV Trend(10)") && line.contains("volume confirms buying")));

    let mut config = ScoringConfig::default();
    config.weights.ma_confluence = 0.20;
    config.weights.bollinger = 0.05;
    config.weights.obv = 0.05;
    let weighted = score(config);

    assert!((weighted.composite_score - unweighted.composite_score).abs() > 1e-6);
    assert_eq!(weighted.per_indicator, unweighted.per_indicator);
}

#[test]
fn test_signal_result_serializes() {
    let result = score_prices(ScoringConfig::default(), &[100.0, 100.5, 101.0]);
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"overall_bucket\""));
    assert!(json.contains("\"per_timeframe\""));
}

proptest! {
    #[test]
    fn prop_bucket_monotonic_in_score(
        a in -2.0f64..2.0,
        b in -2.0f64..2.0,
        mild in 0.0f64..1.0,
        gap in 0.01f64..1.0,
    ) {
        let thresholds = BucketThresholds { strong: mild + gap, mild };
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            TrendBucket::classify(low, &thresholds).rank()
                <= TrendBucket::classify(high, &thresholds).rank()
        );
    }

    #[test]
    fn prop_confidence_bounds(prices in prop::collection::vec(50.0f64..150.0, 0..60)) {
        let result = score_prices(ScoringConfig::default(), &prices);
        prop_assert!(result.confidence_percent >= 0.0);
        prop_assert!(result.confidence_percent <= 95.0);
        prop_assert!(result.composite_score.abs() <= 2.0);
        if is_insufficient(&result) {
            prop_assert_eq!(result.confidence_percent, 0.0);
        }
    }

    #[test]
    fn prop_confidence_floor_with_volatility_penalty(
        prices in prop::collection::vec(1.0f64..200.0, 2..60)
    ) {
        let mut config = ScoringConfig::default();
        config.confidence.volatility_penalty.enabled = true;
        let floor = config.confidence.volatility_penalty.floor;

        let result = score_prices(config, &prices);
        prop_assert!(!is_insufficient(&result));
        prop_assert!(result.confidence_percent >= floor);
        prop_assert!(result.confidence_percent <= 95.0);
    }

    #[test]
    fn prop_agreement_never_lowers_confidence(agreeing in 0usize..6) {
        let weights = IndicatorWeights::default();
        let config = ConfidenceConfig::default();
        let composer = ConfidenceComposer::new(&weights, &config);
        let kinds = [
            IndicatorKind::MaConfluence,
            IndicatorKind::TimeframeAgreement,
            IndicatorKind::Rsi,
            IndicatorKind::Macd,
            IndicatorKind::SupportResistance,
            IndicatorKind::Momentum,
        ];
        let build = |n: usize| -> Vec<IndicatorResult> {
            kinds
                .iter()
                .enumerate()
                .map(|(i, &k)| {
                    let c = if i < n { 0.6 } else { 0.0 };
                    IndicatorResult::computed(k, k.to_string(), 0.0, c)
                })
                .collect()
        };
        let fewer = composer.compose(&build(agreeing)).confidence_percent;
        let more = composer.compose(&build(agreeing + 1)).confidence_percent;
        prop_assert!(more >= fewer);
    }
}
