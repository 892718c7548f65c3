//! Bounded moving average used to smooth the remaining-time estimate.

use thiserror::Error;

/// Errors from [`MovingAverage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EstimatorError {
    /// `average()` was called before any sample was added.
    #[error("moving average has no samples")]
    NoSamples,
}

/// Fixed-capacity ring buffer of integer samples.
///
/// Once more than `capacity` samples have been added, each new sample
/// overwrites the oldest one, so only the most recent `capacity` samples
/// contribute to [`average`](Self::average).
#[derive(Debug, Clone)]
pub struct MovingAverage {
    slots: Vec<u64>,
    count: u64,
}

impl MovingAverage {
    /// Creates an empty window holding up to `capacity` samples.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![0; capacity.max(1)],
            count: 0,
        }
    }

    /// Records one sample, replacing the oldest once the window is full.
    pub fn add_sample(&mut self, value: u64) {
        let capacity = self.slots.len() as u64;
        // count % capacity < capacity <= usize::MAX
        #[allow(clippy::cast_possible_truncation)]
        let slot = (self.count % capacity) as usize;
        self.slots[slot] = value;
        self.count = self.count.saturating_add(1);
    }

    /// Truncated arithmetic mean of the samples currently held.
    ///
    /// # Errors
    ///
    /// Returns [`EstimatorError::NoSamples`] if nothing has been added yet.
    pub fn average(&self) -> Result<u64, EstimatorError> {
        let filled = self.len();
        if filled == 0 {
            return Err(EstimatorError::NoSamples);
        }
        let sum: u128 = self.slots[..filled].iter().map(|&v| u128::from(v)).sum();
        let mean = sum / filled as u128;
        // The mean of u64 values always fits in u64.
        Ok(u64::try_from(mean).unwrap_or(u64::MAX))
    }

    /// Whether at least `capacity` samples have been recorded.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.count >= self.slots.len() as u64
    }

    /// Number of samples currently held (at most `capacity`).
    #[must_use]
    pub fn len(&self) -> usize {
        usize::try_from(self.count)
            .unwrap_or(usize::MAX)
            .min(self.slots.len())
    }

    /// Whether no samples have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Maximum number of samples held.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
