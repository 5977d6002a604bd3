//! Bounded per-feature view of recent production traffic.

mod sliding;

pub use sliding::SlidingWindow;

/// Per-feature window contents for one cycle, in tracked order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowSnapshot {
    samples: Vec<(String, Vec<f64>)>,
}

impl WindowSnapshot {
    pub fn new(samples: Vec<(String, Vec<f64>)>) -> Self {
        Self { samples }
    }

    pub fn get(&self, feature: &str) -> Option<&[f64]> {
        self.samples
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, v)| v.as_slice())
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.samples.iter().map(|(name, _)| name.as_str())
    }

    /// Longest per-feature sample.
    pub fn len(&self) -> usize {
        self.samples.iter().map(|(_, v)| v.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
