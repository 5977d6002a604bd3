//! Per-cycle drift report: a pure reduction over the comparator output.

mod render;

pub use render::render;

use crate::drift::{Comparison, FeatureResult, Verdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Cycle facts the report carries alongside the per-feature results.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CycleContext {
    /// Observations per feature in the evaluated window
    pub window_len: usize,
    /// Malformed records skipped while ingesting for this cycle
    pub dropped_records: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub cycle_id: String,
    pub evaluated_at: DateTime<Utc>,
    /// In tracked-feature order
    pub features: Vec<FeatureResult>,
    /// True iff at least one feature drifted
    pub alert: bool,
    pub threshold: f64,
    pub window_len: usize,
    pub dropped_records: u64,
}

/// Combine one cycle's comparison into a report.
pub fn aggregate(comparison: Comparison, ctx: CycleContext) -> DriftReport {
    let alert = comparison.results.iter().any(FeatureResult::is_drift);
    DriftReport {
        cycle_id: uuid::Uuid::new_v4().to_string(),
        evaluated_at: Utc::now(),
        features: comparison.results,
        alert,
        threshold: comparison.effective_threshold,
        window_len: ctx.window_len,
        dropped_records: ctx.dropped_records,
    }
}

impl DriftReport {
    /// Feature → p-value for every conclusive feature.
    pub fn p_values(&self) -> Vec<(&str, f64)> {
        self.features
            .iter()
            .filter_map(|r| r.p_value.map(|p| (r.feature.as_str(), p)))
            .collect()
    }

    /// Feature → drift flag for every conclusive feature.
    pub fn verdicts(&self) -> Vec<(&str, bool)> {
        self.features
            .iter()
            .filter(|r| r.verdict != Verdict::Inconclusive)
            .map(|r| (r.feature.as_str(), r.is_drift()))
            .collect()
    }

    pub fn inconclusive(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|r| r.verdict == Verdict::Inconclusive)
            .map(|r| r.feature.as_str())
            .collect()
    }

    pub fn drifted(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|r| r.is_drift())
            .map(|r| r.feature.as_str())
            .collect()
    }

    pub fn result(&self, feature: &str) -> Option<&FeatureResult> {
        self.features.iter().find(|r| r.feature == feature)
    }

    /// Compact machine-readable form for alert pipes.
    pub fn to_json(&self) -> Value {
        let p_values: Map<String, Value> = self
            .p_values()
            .into_iter()
            .map(|(f, p)| (f.to_string(), json!(p)))
            .collect();
        let drift: Map<String, Value> = self
            .verdicts()
            .into_iter()
            .map(|(f, d)| (f.to_string(), json!(d)))
            .collect();
        json!({
            "cycle_id": self.cycle_id,
            "evaluated_at": self.evaluated_at.to_rfc3339(),
            "p_values": p_values,
            "drift": drift,
            "inconclusive": self.inconclusive(),
            "alert": self.alert,
            "threshold": self.threshold,
            "window_len": self.window_len,
            "dropped_records": self.dropped_records,
        })
    }
}
