//! Accepted events → per-feature bounded FIFO buffers → snapshot.

use super::WindowSnapshot;
use crate::events::InferenceEvent;
use std::collections::VecDeque;

/// Most recent `capacity` values per tracked feature, oldest first.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    capacity: usize,
    features: Vec<String>,
    buffers: Vec<VecDeque<f64>>,
}

impl SlidingWindow {
    pub fn new(capacity: usize, features: Vec<String>) -> Self {
        let capacity = capacity.max(1);
        let buffers = features
            .iter()
            .map(|_| VecDeque::with_capacity(capacity.min(4096)))
            .collect();
        Self {
            capacity,
            features,
            buffers,
        }
    }

    /// Append the event's tracked values, evicting the oldest once full.
    pub fn push(&mut self, event: &InferenceEvent) {
        for (name, buf) in self.features.iter().zip(self.buffers.iter_mut()) {
            let Some(v) = event.value(name) else {
                continue;
            };
            buf.push_back(v);
            while buf.len() > self.capacity {
                buf.pop_front();
            }
        }
    }

    pub fn extend<'a>(&mut self, events: impl IntoIterator<Item = &'a InferenceEvent>) {
        for e in events {
            self.push(e);
        }
    }

    /// Fresh copy of the current contents.
    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot::new(
            self.features
                .iter()
                .zip(&self.buffers)
                .map(|(name, buf)| (name.clone(), buf.iter().copied().collect()))
                .collect(),
        )
    }

    pub fn values(&self, feature: &str) -> Option<Vec<f64>> {
        let idx = self.features.iter().position(|f| f == feature)?;
        Some(self.buffers[idx].iter().copied().collect())
    }

    /// Longest per-feature buffer.
    pub fn len(&self) -> usize {
        self.buffers.iter().map(VecDeque::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
