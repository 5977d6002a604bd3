//! fraud-drift - distribution-drift monitor for a fraud-risk classifier.
//!
//! Modular structure:
//! - [`baseline`] - Frozen training-time reference samples
//! - [`events`] - Inference event log: append, parse, incremental read
//! - [`window`] - Bounded per-feature FIFO window of recent traffic
//! - [`drift`] - Two-sample Kolmogorov–Smirnov comparison
//! - [`report`] - Drift report, overall alert, operator rendering
//! - [`monitor`] - Evaluation cycle and recurring scheduler
//! - [`logging`] - Structured JSON logging

pub mod config;
pub mod error;
pub mod baseline;
pub mod events;
pub mod window;
pub mod drift;
pub mod report;
pub mod monitor;
pub mod logging;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use baseline::BaselineStore;
pub use events::{EventIngester, EventLog, InferenceEvent};
pub use window::SlidingWindow;
pub use drift::{Comparator, Verdict};
pub use report::DriftReport;
pub use monitor::{CycleOutcome, DriftMonitor, Scheduler};
pub use logging::StructuredLogger;
