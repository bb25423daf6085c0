//! Rolling store of the most recent input samples.

use std::collections::VecDeque;

/// Fixed-length history, oldest sample first. New blocks push the oldest
/// samples out. Starts filled with silence.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: std::iter::repeat_n(0.0, capacity).collect(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a block, discarding the same number of oldest samples.
    pub fn push(&mut self, block: &[f32]) {
        let keep = block.len().min(self.capacity);
        let block = &block[block.len() - keep..];
        self.samples.drain(..keep);
        self.samples.extend(block.iter().copied());
    }

    /// Copy of the whole history, oldest first.
    pub fn snapshot(&self) -> Vec<f32> {
        self.samples.iter().copied().collect()
    }

    /// Copy of the most recent `n` samples (fewer if the history is shorter).
    pub fn latest(&self, n: usize) -> Vec<f32> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).copied().collect()
    }
}
