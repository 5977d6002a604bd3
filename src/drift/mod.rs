//! Baseline-versus-window distribution comparison.

mod comparator;
pub mod ks;

pub use comparator::{Comparator, Comparison, FeatureResult, Verdict};
pub use ks::{ks_2samp, KsOutcome, PValueMethod};
