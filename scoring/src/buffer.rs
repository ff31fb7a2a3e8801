//! Bounded, time-ordered sample storage

use crate::error::{ScoringError, ScoringResult};
use crate::types::Sample;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{trace, warn};

/// Fixed-capacity series of samples for one instrument
///
/// Samples are kept in strictly increasing timestamp order. Appending past
/// capacity evicts the oldest sample.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SeriesBuffer {
    /// Create an empty buffer
    ///
    /// Capacity is validated by [`crate::ScoringConfig`]; a zero capacity is
    /// bumped to one so the buffer can always hold the latest sample.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one when full
    ///
    /// Fails with [`ScoringError::OutOfOrder`] unless the timestamp is
    /// strictly after the last stored one. The buffer is unchanged on error.
    pub fn append(&mut self, sample: Sample) -> ScoringResult<()> {
        if !sample.price.is_finite() || sample.price <= 0.0 {
            warn!(price = sample.price, "Rejected sample with unusable price");
            return Err(ScoringError::InvalidSample(format!(
                "price must be finite and positive (got {})",
                sample.price
            )));
        }

        if let Some(last) = self.samples.back() {
            if sample.timestamp <= last.timestamp {
                warn!(
                    last = %last.timestamp,
                    attempted = %sample.timestamp,
                    "Rejected out of order sample"
                );
                return Err(ScoringError::OutOfOrder {
                    last: last.timestamp,
                    attempted: sample.timestamp,
                });
            }
        }

        if self.samples.len() == self.capacity {
            if let Some(evicted) = self.samples.pop_front() {
                trace!(timestamp = %evicted.timestamp, "Evicted oldest sample");
            }
        }
        self.samples.push_back(sample);
        Ok(())
    }

    /// Most recent `min(window_size, len)` samples, oldest first
    pub fn snapshot(&self, window_size: usize) -> ScoringResult<Vec<Sample>> {
        if window_size == 0 || window_size > self.capacity {
            return Err(ScoringError::InsufficientData {
                requested: window_size,
                capacity: self.capacity,
            });
        }
        let start = self.samples.len().saturating_sub(window_size);
        Ok(self.samples.range(start..).copied().collect())
    }

    /// All buffered samples, oldest first
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Buffered prices, oldest first
    pub fn prices(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.price).collect()
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Series buffer shared between producer and reader threads
///
/// Appends serialize behind the write lock. Snapshots copy the window under
/// the read lock, so readers always see a state between two whole appends.
#[derive(Debug, Clone)]
pub struct SharedSeries {
    inner: Arc<RwLock<SeriesBuffer>>,
}

impl SharedSeries {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SeriesBuffer::new(capacity))),
        }
    }

    /// Append under the write lock
    pub fn append(&self, sample: Sample) -> ScoringResult<()> {
        self.inner.write().append(sample)
    }

    /// Copy of the most recent window
    pub fn snapshot(&self, window_size: usize) -> ScoringResult<Vec<Sample>> {
        self.inner.read().snapshot(window_size)
    }

    /// Run `f` against a consistent view of the buffer
    pub fn read<R>(&self, f: impl FnOnce(&SeriesBuffer) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl From<SeriesBuffer> for SharedSeries {
    fn from(buffer: SeriesBuffer) -> Self {
        Self {
            inner: Arc::new(RwLock::new(buffer)),
        }
    }
}
