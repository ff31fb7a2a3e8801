//! Scoring configuration
//!
//! Every period, window, weight and threshold used by the pipeline lives
//! here and is passed explicitly to [`crate::ScoringEngine`]. Configurations
//! are validated once at construction; invalid ones are rejected rather than
//! renormalized.

use crate::error::{ScoringError, ScoringResult};
use crate::types::IndicatorKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Complete scoring configuration, typically loaded from YAML
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Series buffer sizing
    #[serde(default)]
    pub buffer: BufferConfig,

    /// Indicator periods and scaling
    #[serde(default)]
    pub indicators: IndicatorConfig,

    /// Multi-timeframe windows and bucket thresholds
    #[serde(default)]
    pub timeframes: TimeframeConfig,

    /// Composite weights per indicator
    #[serde(default)]
    pub weights: IndicatorWeights,

    /// Confidence constants
    #[serde(default)]
    pub confidence: ConfidenceConfig,

    /// Market context thresholds
    #[serde(default)]
    pub context: ContextConfig,
}

/// Series buffer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Maximum number of samples kept per instrument
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// Indicator periods and saturation scales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// SMA periods used for moving-average confluence, ascending
    #[serde(default = "default_ma_periods")]
    pub ma_periods: Vec<usize>,

    /// Percent distance from an SMA at which its opinion saturates
    #[serde(default = "default_ma_saturation_pct")]
    pub ma_saturation_pct: f64,

    /// RSI lookback
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// MACD fast EMA period
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    /// MACD slow EMA period
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    /// MACD signal EMA period
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    /// Histogram size, in percent of price, at which MACD saturates
    #[serde(default = "default_macd_saturation_pct")]
    pub macd_saturation_pct: f64,

    /// Momentum lookback `k`
    #[serde(default = "default_momentum_lookback")]
    pub momentum_lookback: usize,

    /// Momentum size, in percent of price, at which it saturates
    #[serde(default = "default_momentum_saturation_pct")]
    pub momentum_saturation_pct: f64,

    /// Support/resistance window
    #[serde(default = "default_support_resistance_window")]
    pub support_resistance_window: usize,

    /// Volatility window in returns
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,

    /// Bollinger band period
    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,

    /// Bollinger band width in standard deviations
    #[serde(default = "default_bollinger_std_dev")]
    pub bollinger_std_dev: f64,

    /// On-balance volume lookback in price changes
    #[serde(default = "default_obv_lookback")]
    pub obv_lookback: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ma_periods: default_ma_periods(),
            ma_saturation_pct: default_ma_saturation_pct(),
            rsi_period: default_rsi_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            macd_saturation_pct: default_macd_saturation_pct(),
            momentum_lookback: default_momentum_lookback(),
            momentum_saturation_pct: default_momentum_saturation_pct(),
            support_resistance_window: default_support_resistance_window(),
            volatility_window: default_volatility_window(),
            bollinger_period: default_bollinger_period(),
            bollinger_std_dev: default_bollinger_std_dev(),
            obv_lookback: default_obv_lookback(),
        }
    }
}

/// Symmetric bucket thresholds: `> strong`, `> mild`, `< -mild`, `< -strong`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketThresholds {
    pub strong: f64,
    pub mild: f64,
}

impl BucketThresholds {
    fn validate(&self, what: &str) -> ScoringResult<()> {
        if !(self.mild.is_finite() && self.strong.is_finite()) {
            return Err(ScoringError::config(format!("{what} thresholds must be finite")));
        }
        if self.mild < 0.0 || self.strong <= self.mild {
            return Err(ScoringError::config(format!(
                "{what} thresholds need 0 <= mild < strong (got mild {}, strong {})",
                self.mild, self.strong
            )));
        }
        Ok(())
    }
}

/// Multi-timeframe configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeConfig {
    /// Trailing window sizes, strictly ascending
    #[serde(default = "default_windows")]
    pub windows: Vec<usize>,

    /// Percent-change thresholds
    #[serde(default = "default_timeframe_thresholds")]
    pub thresholds: BucketThresholds,
}

impl Default for TimeframeConfig {
    fn default() -> Self {
        Self {
            windows: default_windows(),
            thresholds: default_timeframe_thresholds(),
        }
    }
}

/// Composite weights; must sum to 1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorWeights {
    #[serde(default = "default_ma_confluence_weight")]
    pub ma_confluence: f64,
    #[serde(default = "default_timeframe_agreement_weight")]
    pub timeframe_agreement: f64,
    #[serde(default = "default_rsi_weight")]
    pub rsi: f64,
    #[serde(default = "default_macd_weight")]
    pub macd: f64,
    #[serde(default = "default_support_resistance_weight")]
    pub support_resistance: f64,
    #[serde(default = "default_momentum_weight")]
    pub momentum: f64,
    /// Bollinger %B; unweighted unless a profile opts in
    #[serde(default)]
    pub bollinger: f64,
    /// On-balance volume trend; unweighted unless a profile opts in
    #[serde(default)]
    pub obv: f64,
}

impl Default for IndicatorWeights {
    fn default() -> Self {
        Self {
            ma_confluence: default_ma_confluence_weight(),
            timeframe_agreement: default_timeframe_agreement_weight(),
            rsi: default_rsi_weight(),
            macd: default_macd_weight(),
            support_resistance: default_support_resistance_weight(),
            momentum: default_momentum_weight(),
            bollinger: 0.0,
            obv: 0.0,
        }
    }
}

impl IndicatorWeights {
    /// Weight applied to an indicator family; non-directional ones weigh 0
    pub fn weight_for(&self, kind: IndicatorKind) -> f64 {
        match kind {
            IndicatorKind::MaConfluence => self.ma_confluence,
            IndicatorKind::TimeframeAgreement => self.timeframe_agreement,
            IndicatorKind::Rsi => self.rsi,
            IndicatorKind::Macd => self.macd,
            IndicatorKind::SupportResistance => self.support_resistance,
            IndicatorKind::Momentum => self.momentum,
            IndicatorKind::Bollinger => self.bollinger,
            IndicatorKind::Obv => self.obv,
            IndicatorKind::Sma | IndicatorKind::Volatility => 0.0,
        }
    }

    fn all(&self) -> [(&'static str, f64); 8] {
        [
            ("ma_confluence", self.ma_confluence),
            ("timeframe_agreement", self.timeframe_agreement),
            ("rsi", self.rsi),
            ("macd", self.macd),
            ("support_resistance", self.support_resistance),
            ("momentum", self.momentum),
            ("bollinger", self.bollinger),
            ("obv", self.obv),
        ]
    }

    /// Sum of all weights
    pub fn sum(&self) -> f64 {
        self.all().iter().map(|(_, w)| w).sum()
    }
}

/// Volatility penalty applied to confidence, off unless enabled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPenaltyConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Mean absolute log return above which the penalty starts
    #[serde(default = "default_penalty_threshold")]
    pub threshold: f64,

    /// Confidence points removed per unit of volatility above the threshold
    #[serde(default = "default_penalty_per_unit")]
    pub penalty_per_unit: f64,

    /// Lowest confidence the penalty may produce
    #[serde(default = "default_confidence_floor")]
    pub floor: f64,
}

impl Default for VolatilityPenaltyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: default_penalty_threshold(),
            penalty_per_unit: default_penalty_per_unit(),
            floor: default_confidence_floor(),
        }
    }
}

/// Confidence composition constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    #[serde(default = "default_base_confidence")]
    pub base_confidence: f64,

    #[serde(default = "default_agreement_bonus_max")]
    pub agreement_bonus_max: f64,

    /// Upper bound on confidence; always below 100
    #[serde(default = "default_max_confidence")]
    pub max_confidence: f64,

    /// Contributions within this band count as no opinion
    #[serde(default = "default_neutral_band")]
    pub neutral_band: f64,

    /// Composite-score thresholds for the overall bucket
    #[serde(default = "default_composite_thresholds")]
    pub composite_thresholds: BucketThresholds,

    #[serde(default)]
    pub volatility_penalty: VolatilityPenaltyConfig,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            base_confidence: default_base_confidence(),
            agreement_bonus_max: default_agreement_bonus_max(),
            max_confidence: default_max_confidence(),
            neutral_band: default_neutral_band(),
            composite_thresholds: default_composite_thresholds(),
            volatility_penalty: VolatilityPenaltyConfig::default(),
        }
    }
}

/// Thresholds for the informational market context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_high_volatility")]
    pub high_volatility: f64,
    #[serde(default = "default_low_volatility")]
    pub low_volatility: f64,
    /// Longest-window move (percent) above which the market is trending
    #[serde(default = "default_trending_change_pct")]
    pub trending_change_pct: f64,
    /// Longest-window move (percent) below which the market is sideways
    #[serde(default = "default_sideways_change_pct")]
    pub sideways_change_pct: f64,
    #[serde(default = "default_min_expected_move_pct")]
    pub min_expected_move_pct: f64,
    #[serde(default = "default_max_expected_move_pct")]
    pub max_expected_move_pct: f64,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            high_volatility: default_high_volatility(),
            low_volatility: default_low_volatility(),
            trending_change_pct: default_trending_change_pct(),
            sideways_change_pct: default_sideways_change_pct(),
            min_expected_move_pct: default_min_expected_move_pct(),
            max_expected_move_pct: default_max_expected_move_pct(),
        }
    }
}

impl ScoringConfig {
    /// Parse a configuration from YAML and validate it
    pub fn from_yaml(yaml: &str) -> ScoringResult<Self> {
        let config: ScoringConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON and validate it
    pub fn from_json(json: &str) -> ScoringResult<Self> {
        let config: ScoringConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file; `.json` files are parsed as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> ScoringResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    /// Check every invariant the pipeline relies on
    pub fn validate(&self) -> ScoringResult<()> {
        if self.buffer.capacity == 0 {
            return Err(ScoringError::config("buffer capacity must be positive"));
        }

        self.validate_indicators()?;

        validate_windows(&self.timeframes.windows, self.buffer.capacity)?;
        self.timeframes.thresholds.validate("timeframe")?;

        for (name, weight) in self.weights.all() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ScoringError::config(format!(
                    "weight {name} must be a non-negative number (got {weight})"
                )));
            }
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringError::config(format!(
                "weights must sum to 1.0 (got {sum})"
            )));
        }

        self.validate_confidence()?;
        self.validate_context()
    }

    fn validate_indicators(&self) -> ScoringResult<()> {
        let ind = &self.indicators;

        if ind.ma_periods.is_empty() {
            return Err(ScoringError::config("ma_periods must not be empty"));
        }
        if ind.ma_periods.iter().any(|&p| p == 0) {
            return Err(ScoringError::config("ma_periods must be positive"));
        }
        if ind.ma_periods.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ScoringError::config("ma_periods must be strictly ascending"));
        }
        if ind.rsi_period < 2 {
            return Err(ScoringError::config("rsi_period must be at least 2"));
        }
        if ind.macd_fast == 0 || ind.macd_signal == 0 {
            return Err(ScoringError::config("MACD periods must be positive"));
        }
        if ind.macd_fast >= ind.macd_slow {
            return Err(ScoringError::config(format!(
                "macd_fast ({}) must be below macd_slow ({})",
                ind.macd_fast, ind.macd_slow
            )));
        }
        if ind.momentum_lookback == 0 {
            return Err(ScoringError::config("momentum_lookback must be positive"));
        }
        if ind.support_resistance_window < 2 {
            return Err(ScoringError::config("support_resistance_window must be at least 2"));
        }
        if ind.volatility_window == 0 {
            return Err(ScoringError::config("volatility_window must be positive"));
        }
        if ind.bollinger_period < 2 {
            return Err(ScoringError::config("bollinger_period must be at least 2"));
        }
        if ind.obv_lookback == 0 {
            return Err(ScoringError::config("obv_lookback must be positive"));
        }

        for (name, scale) in [
            ("ma_saturation_pct", ind.ma_saturation_pct),
            ("macd_saturation_pct", ind.macd_saturation_pct),
            ("momentum_saturation_pct", ind.momentum_saturation_pct),
            ("bollinger_std_dev", ind.bollinger_std_dev),
        ] {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(ScoringError::config(format!("{name} must be positive (got {scale})")));
            }
        }

        // every indicator must be able to fill from the buffer
        let capacity = self.buffer.capacity;
        for (name, needed) in self.indicator_minimums() {
            if needed > capacity {
                return Err(ScoringError::config(format!(
                    "{name} needs {needed} samples but buffer capacity is {capacity}"
                )));
            }
        }
        Ok(())
    }

    /// Minimum sample count of every configured indicator
    fn indicator_minimums(&self) -> [(&'static str, usize); 8] {
        let ind = &self.indicators;
        [
            ("ma_periods", ind.ma_periods.iter().copied().max().unwrap_or(0)),
            ("rsi_period", ind.rsi_period),
            ("macd", ind.macd_slow + ind.macd_signal - 1),
            ("momentum_lookback", 2 * ind.momentum_lookback + 1),
            ("support_resistance_window", ind.support_resistance_window),
            ("volatility_window", ind.volatility_window + 1),
            ("bollinger_period", ind.bollinger_period),
            ("obv_lookback", ind.obv_lookback + 1),
        ]
    }

    fn validate_confidence(&self) -> ScoringResult<()> {
        let conf = &self.confidence;

        if !(0.0..100.0).contains(&conf.max_confidence) || conf.max_confidence <= 0.0 {
            return Err(ScoringError::config(format!(
                "max_confidence must be in (0, 100) (got {})",
                conf.max_confidence
            )));
        }
        if !(0.0..=100.0).contains(&conf.base_confidence) {
            return Err(ScoringError::config(format!(
                "base_confidence must be in [0, 100] (got {})",
                conf.base_confidence
            )));
        }
        if !conf.agreement_bonus_max.is_finite() || conf.agreement_bonus_max < 0.0 {
            return Err(ScoringError::config("agreement_bonus_max must be non-negative"));
        }
        if !(0.0..1.0).contains(&conf.neutral_band) {
            return Err(ScoringError::config("neutral_band must be in [0, 1)"));
        }
        conf.composite_thresholds.validate("composite")?;

        let penalty = &conf.volatility_penalty;
        if !penalty.threshold.is_finite() || penalty.threshold < 0.0 {
            return Err(ScoringError::config("volatility penalty threshold must be non-negative"));
        }
        if !penalty.penalty_per_unit.is_finite() || penalty.penalty_per_unit < 0.0 {
            return Err(ScoringError::config("penalty_per_unit must be non-negative"));
        }
        if !(0.0..=conf.max_confidence).contains(&penalty.floor) {
            return Err(ScoringError::config(format!(
                "confidence floor must be in [0, max_confidence] (got {})",
                penalty.floor
            )));
        }
        Ok(())
    }

    fn validate_context(&self) -> ScoringResult<()> {
        let ctx = &self.context;
        if !(ctx.low_volatility >= 0.0 && ctx.low_volatility < ctx.high_volatility) {
            return Err(ScoringError::config("context needs 0 <= low_volatility < high_volatility"));
        }
        if !(ctx.sideways_change_pct >= 0.0 && ctx.sideways_change_pct < ctx.trending_change_pct) {
            return Err(ScoringError::config(
                "context needs 0 <= sideways_change_pct < trending_change_pct",
            ));
        }
        if !(ctx.min_expected_move_pct > 0.0 && ctx.min_expected_move_pct <= ctx.max_expected_move_pct) {
            return Err(ScoringError::config(
                "context needs 0 < min_expected_move_pct <= max_expected_move_pct",
            ));
        }
        Ok(())
    }
}

/// Windows must be non-empty, positive, strictly ascending and fit the buffer
pub(crate) fn validate_windows(windows: &[usize], capacity: usize) -> ScoringResult<()> {
    if windows.is_empty() {
        return Err(ScoringError::config("at least one timeframe window is required"));
    }
    if windows.iter().any(|&w| w == 0) {
        return Err(ScoringError::config("timeframe windows must be positive"));
    }
    if windows.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ScoringError::config(format!(
            "timeframe windows must be strictly ascending (got {windows:?})"
        )));
    }
    if let Some(&largest) = windows.last() {
        if largest > capacity {
            return Err(ScoringError::config(format!(
                "timeframe window {largest} exceeds buffer capacity {capacity}"
            )));
        }
    }
    Ok(())
}

// Default value functions
fn default_capacity() -> usize {
    50
}

fn default_ma_periods() -> Vec<usize> {
    vec![3, 5, 10]
}

fn default_ma_saturation_pct() -> f64 {
    2.0
}

fn default_rsi_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_macd_saturation_pct() -> f64 {
    0.1
}

fn default_momentum_lookback() -> usize {
    2
}

fn default_momentum_saturation_pct() -> f64 {
    0.5
}

fn default_support_resistance_window() -> usize {
    10
}

fn default_volatility_window() -> usize {
    10
}

fn default_bollinger_period() -> usize {
    20
}

fn default_bollinger_std_dev() -> f64 {
    2.0
}

fn default_obv_lookback() -> usize {
    10
}

fn default_windows() -> Vec<usize> {
    vec![5, 15, 50]
}

fn default_timeframe_thresholds() -> BucketThresholds {
    BucketThresholds { strong: 2.0, mild: 0.5 }
}

fn default_ma_confluence_weight() -> f64 {
    0.30
}

fn default_timeframe_agreement_weight() -> f64 {
    0.25
}

fn default_rsi_weight() -> f64 {
    0.10
}

fn default_macd_weight() -> f64 {
    0.10
}

fn default_support_resistance_weight() -> f64 {
    0.15
}

fn default_momentum_weight() -> f64 {
    0.10
}

fn default_penalty_threshold() -> f64 {
    0.025
}

fn default_penalty_per_unit() -> f64 {
    1000.0
}

fn default_confidence_floor() -> f64 {
    30.0
}

fn default_base_confidence() -> f64 {
    75.0
}

fn default_agreement_bonus_max() -> f64 {
    20.0
}

fn default_max_confidence() -> f64 {
    95.0
}

fn default_neutral_band() -> f64 {
    0.1
}

fn default_composite_thresholds() -> BucketThresholds {
    BucketThresholds { strong: 1.5, mild: 0.5 }
}

fn default_high_volatility() -> f64 {
    0.025
}

fn default_low_volatility() -> f64 {
    0.012
}

fn default_trending_change_pct() -> f64 {
    1.5
}

fn default_sideways_change_pct() -> f64 {
    0.5
}

fn default_min_expected_move_pct() -> f64 {
    0.5
}

fn default_max_expected_move_pct() -> f64 {
    5.0
}
