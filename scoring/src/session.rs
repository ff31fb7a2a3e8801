//! Per-instrument scoring session

use crate::buffer::SeriesBuffer;
use crate::config::ScoringConfig;
use crate::engine::ScoringEngine;
use crate::error::ScoringResult;
use crate::types::{Sample, SignalResult};
use std::sync::Arc;
use tracing::info;

/// One instrument's buffer paired with the engine that scores it
///
/// Sessions are independent; instruments that share a profile share the
/// engine through an `Arc`, never through global state.
#[derive(Debug, Clone)]
pub struct InstrumentSession {
    symbol: String,
    buffer: SeriesBuffer,
    engine: Arc<ScoringEngine>,
}

impl InstrumentSession {
    /// Create a session with its own engine
    ///
    /// # Arguments
    /// * `symbol` - Instrument name used in logs and reports
    /// * `config` - Scoring configuration; validated here
    pub fn new(symbol: impl Into<String>, config: ScoringConfig) -> ScoringResult<Self> {
        let engine = Arc::new(ScoringEngine::new(config)?);
        Ok(Self::with_engine(symbol, engine))
    }

    /// Create a session around an existing engine
    pub fn with_engine(symbol: impl Into<String>, engine: Arc<ScoringEngine>) -> Self {
        let symbol = symbol.into();
        info!(symbol = %symbol, capacity = engine.config().buffer.capacity, "Created session");
        Self {
            symbol,
            buffer: engine.new_buffer(),
            engine,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn append(&mut self, sample: Sample) -> ScoringResult<()> {
        self.buffer.append(sample)
    }

    pub fn score(&self) -> ScoringResult<SignalResult> {
        self.engine.score(&self.buffer)
    }

    pub fn score_with_windows(&self, windows: &[usize]) -> ScoringResult<SignalResult> {
        self.engine.score_with_windows(&self.buffer, windows)
    }

    pub fn buffer(&self) -> &SeriesBuffer {
        &self.buffer
    }

    pub fn engine(&self) -> &Arc<ScoringEngine> {
        &self.engine
    }
}
