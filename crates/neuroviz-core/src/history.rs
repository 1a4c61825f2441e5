//! Bounded history of received samples.
//!
//! # Invariants
//!
//! - `len() <= capacity()` at all times
//! - Iteration order is arrival order (oldest first), which is also the
//!   left-to-right display order
//! - Pushing at capacity evicts exactly the oldest sample

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

/// One received data frame, as kept by the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Local arrival sequence number. Strictly increasing per session.
    pub sequence: u64,
    /// Server clock in milliseconds, if the frame carried one.
    pub server_timestamp: Option<f64>,
    /// Acquisition rate reported by the server, if any.
    pub sample_rate: Option<u32>,
    /// Readings per channel. Keys are channels selected at arrival time.
    pub channel_samples: BTreeMap<String, Vec<f64>>,
}

impl Sample {
    /// Readings for `channel`, if the sample carries it.
    pub fn readings(&self, channel: &str) -> Option<&[f64]> {
        self.channel_samples.get(channel).map(Vec::as_slice)
    }

    /// First reading for `channel`. This is the value the signal chart plots.
    pub fn leading_value(&self, channel: &str) -> Option<f64> {
        self.readings(channel).and_then(|readings| readings.first().copied())
    }
}

/// FIFO ring of the most recent samples.
#[derive(Debug, Clone)]
pub struct History {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl History {
    /// Empty history holding at most `capacity` samples.
    ///
    /// A zero capacity is raised to one; configuration validation rejects it
    /// before it gets here.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { samples: VecDeque::with_capacity(capacity), capacity }
    }

    /// Append `sample`, evicting and returning the oldest one when full.
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        let evicted =
            if self.samples.len() == self.capacity { self.samples.pop_front() } else { None };
        self.samples.push_back(sample);
        debug_assert!(self.samples.len() <= self.capacity);
        evicted
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Samples oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample> + ExactSizeIterator {
        self.samples.iter()
    }

    /// `(sequence, first reading)` for every sample carrying `channel`, oldest
    /// first.
    pub fn trace(&self, channel: &str) -> Vec<(u64, f64)> {
        self.samples
            .iter()
            .filter_map(|sample| sample.leading_value(channel).map(|value| (sample.sequence, value)))
            .collect()
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if no samples are held.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
