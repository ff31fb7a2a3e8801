//! Core types for the scoring engine

use crate::config::BucketThresholds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One price/volume observation for an instrument
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Observation timestamp
    pub timestamp: DateTime<Utc>,
    /// Traded or quoted price
    pub price: f64,
    /// Traded volume, when the feed provides it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl Sample {
    /// Create a sample without volume
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp,
            price,
            volume: None,
        }
    }

    /// Create a sample with volume
    pub fn with_volume(timestamp: DateTime<Utc>, price: f64, volume: u64) -> Self {
        Self {
            timestamp,
            price,
            volume: Some(volume),
        }
    }
}

/// Discrete trend category shared by timeframes and the overall signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendBucket {
    StrongUp,
    Up,
    Flat,
    Down,
    StrongDown,
}

impl TrendBucket {
    /// Bucket a value against symmetric thresholds.
    ///
    /// Comparisons are strict, so a value sitting exactly on a threshold
    /// falls into the weaker bucket.
    pub fn classify(value: f64, thresholds: &BucketThresholds) -> Self {
        if value > thresholds.strong {
            TrendBucket::StrongUp
        } else if value > thresholds.mild {
            TrendBucket::Up
        } else if value < -thresholds.strong {
            TrendBucket::StrongDown
        } else if value < -thresholds.mild {
            TrendBucket::Down
        } else {
            TrendBucket::Flat
        }
    }

    /// Numeric score in `{2, 1, 0, -1, -2}`
    pub fn score(&self) -> f64 {
        match self {
            TrendBucket::StrongUp => 2.0,
            TrendBucket::Up => 1.0,
            TrendBucket::Flat => 0.0,
            TrendBucket::Down => -1.0,
            TrendBucket::StrongDown => -2.0,
        }
    }

    /// Ordinal rank, StrongDown = 0 up to StrongUp = 4
    pub fn rank(&self) -> u8 {
        match self {
            TrendBucket::StrongDown => 0,
            TrendBucket::Down => 1,
            TrendBucket::Flat => 2,
            TrendBucket::Up => 3,
            TrendBucket::StrongUp => 4,
        }
    }
}

impl fmt::Display for TrendBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendBucket::StrongUp => write!(f, "StrongUp"),
            TrendBucket::Up => write!(f, "Up"),
            TrendBucket::Flat => write!(f, "Flat"),
            TrendBucket::Down => write!(f, "Down"),
            TrendBucket::StrongDown => write!(f, "StrongDown"),
        }
    }
}

/// Which indicator produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    Sma,
    MaConfluence,
    TimeframeAgreement,
    Rsi,
    Macd,
    SupportResistance,
    Momentum,
    Bollinger,
    Obv,
    Volatility,
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Sma => write!(f, "SMA"),
            IndicatorKind::MaConfluence => write!(f, "MA Confluence"),
            IndicatorKind::TimeframeAgreement => write!(f, "Timeframe Agreement"),
            IndicatorKind::Rsi => write!(f, "RSI"),
            IndicatorKind::Macd => write!(f, "MACD"),
            IndicatorKind::SupportResistance => write!(f, "Support/Resistance"),
            IndicatorKind::Momentum => write!(f, "Momentum"),
            IndicatorKind::Bollinger => write!(f, "Bollinger %B"),
            IndicatorKind::Obv => write!(f, "OBV Trend"),
            IndicatorKind::Volatility => write!(f, "Volatility"),
        }
    }
}

/// Directional lean of a contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lean {
    Bullish,
    Neutral,
    Bearish,
}

impl fmt::Display for Lean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lean::Bullish => write!(f, "bullish"),
            Lean::Neutral => write!(f, "neutral"),
            Lean::Bearish => write!(f, "bearish"),
        }
    }
}

/// Output of one indicator over a sample window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    /// Indicator family
    pub kind: IndicatorKind,
    /// Display name including parameters, e.g. "RSI(14)"
    pub name: String,
    /// Raw indicator value (or its neutral default)
    pub value: f64,
    /// Directional opinion in [-1, 1]; positive is bullish
    pub normalized_contribution: f64,
    /// False when the window was below the indicator's minimum sample count
    pub sufficient: bool,
}

impl IndicatorResult {
    /// Result computed from enough data; the contribution is clamped to [-1, 1]
    pub fn computed(kind: IndicatorKind, name: impl Into<String>, value: f64, contribution: f64) -> Self {
        let normalized_contribution = if contribution.is_finite() {
            contribution.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        Self {
            kind,
            name: name.into(),
            value,
            normalized_contribution,
            sufficient: true,
        }
    }

    /// Neutral default emitted when the window is too short
    pub fn neutral(kind: IndicatorKind, name: impl Into<String>, default_value: f64) -> Self {
        Self {
            kind,
            name: name.into(),
            value: default_value,
            normalized_contribution: 0.0,
            sufficient: false,
        }
    }

    /// Lean of this result given the no-opinion band
    pub fn lean(&self, neutral_band: f64) -> Lean {
        if self.normalized_contribution > neutral_band {
            Lean::Bullish
        } else if self.normalized_contribution < -neutral_band {
            Lean::Bearish
        } else {
            Lean::Neutral
        }
    }
}

/// Coarse trend classification of one trailing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeClassification {
    /// Configured window size in samples
    pub window_size: usize,
    /// Samples actually available in the window
    pub sample_count: usize,
    /// Percent change from the first to the last sample
    pub percent_change: f64,
    /// Bucket derived from the percent change
    pub trend_bucket: TrendBucket,
    /// Bucket score in [-2, 2]
    pub numeric_score: f64,
}

/// Volatility regime derived from mean absolute log returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityRegime {
    Low,
    Normal,
    High,
}

impl fmt::Display for VolatilityRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolatilityRegime::Low => write!(f, "Low"),
            VolatilityRegime::Normal => write!(f, "Normal"),
            VolatilityRegime::High => write!(f, "High"),
        }
    }
}

/// Market regime derived from the longest timeframe's move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketRegime {
    Trending,
    Mixed,
    Sideways,
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketRegime::Trending => write!(f, "Trending"),
            MarketRegime::Mixed => write!(f, "Mixed"),
            MarketRegime::Sideways => write!(f, "Sideways"),
        }
    }
}

/// Size of the latest volume relative to history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeSpike {
    None,
    Significant,
    Exceptional,
}

/// Participation summary over the longest timeframe window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    /// Latest volume divided by the mean of the preceding volumes
    pub ratio: f64,
    /// Recent-versus-older volume trend in [-1, 1]
    pub trend: f64,
    /// Spike classification of the latest volume
    pub spike: VolumeSpike,
}

/// Informational market context; never feeds the composite score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub volatility_regime: Option<VolatilityRegime>,
    pub market_regime: MarketRegime,
    /// Expected move in percent of price
    pub expected_move_percent: Option<f64>,
    pub volume: Option<VolumeProfile>,
}

/// Result of one scoring call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    /// Bucket of the composite score
    pub overall_bucket: TrendBucket,
    /// Weighted composite score in [-2, 2]
    pub composite_score: f64,
    /// Confidence in [0, 100), never 100
    pub confidence_percent: f64,
    /// Indicator results in evaluation order
    pub per_indicator: Vec<IndicatorResult>,
    /// Timeframe classifications in ascending window order
    pub per_timeframe: Vec<TimeframeClassification>,
    /// Regime and volume context
    pub context: MarketContext,
    /// Human-readable attribution lines
    pub explanation: Vec<String>,
}

impl SignalResult {
    /// Look up the result of a given indicator family
    pub fn indicator(&self, kind: IndicatorKind) -> Option<&IndicatorResult> {
        self.per_indicator.iter().find(|r| r.kind == kind)
    }
}
