//! # confluence-scoring: Deterministic Signal Confidence Scoring
//!
//! This library turns a bounded, time-ordered price series into a directional
//! signal with a bounded confidence and a human-readable attribution. The
//! same buffer and configuration always produce the same result.
//!
//! ## Core Components
//!
//! - **SeriesBuffer / SharedSeries**: Fixed-capacity, strictly ordered sample storage
//! - **Indicators**: SMA, MA confluence, RSI, MACD, momentum, support/resistance,
//!   Bollinger %B, OBV trend, volatility
//! - **Timeframes**: Percent-change trend buckets over several trailing windows
//! - **ConfidenceComposer**: Weighted composite score, bucket and agreement-based confidence
//! - **AttributionReporter**: Explanation lines for each scoring call
//! - **ScoringEngine / InstrumentSession**: Validated configuration and per-instrument state
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use confluence_scoring::{InstrumentSession, Sample, ScoringConfig};
//! use chrono::{Duration, Utc};
//!
//! let config = ScoringConfig::load("profiles/nifty.yaml")?;
//! let mut session = InstrumentSession::new("NIFTY", config)?;
//!
//! let start = Utc::now();
//! for (i, price) in [25700.0, 25712.5, 25731.0].iter().enumerate() {
//!     session.append(Sample::new(start + Duration::minutes(i as i64), *price))?;
//! }
//!
//! let signal = session.score()?;
//! println!("{} ({:.1}%)", signal.overall_bucket, signal.confidence_percent);
//! for line in &signal.explanation {
//!     println!("  {line}");
//! }
//! # Ok::<(), confluence_scoring::ScoringError>(())
//! ```

pub mod attribution;
pub mod buffer;
pub mod composer;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod session;
pub mod timeframe;
pub mod types;

// Re-export main types
pub use attribution::AttributionReporter;
pub use buffer::{SeriesBuffer, SharedSeries};
pub use composer::{Composition, ConfidenceComposer};
pub use config::{
    BucketThresholds, BufferConfig, ConfidenceConfig, ContextConfig, IndicatorConfig,
    IndicatorWeights, ScoringConfig, TimeframeConfig, VolatilityPenaltyConfig,
};
pub use engine::ScoringEngine;
pub use error::{ScoringError, ScoringResult};
pub use session::InstrumentSession;
pub use types::{
    IndicatorKind, IndicatorResult, Lean, MarketContext, MarketRegime, Sample, SignalResult,
    TimeframeClassification, TrendBucket, VolatilityRegime, VolumeProfile, VolumeSpike,
};
