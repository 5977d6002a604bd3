//! Runs the KS test per feature and turns p-values into verdicts.

use super::ks::{ks_2samp_presorted, PValueMethod};
use crate::baseline::BaselineStore;
use crate::config::Correction;
use crate::window::WindowSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Stable,
    Drift,
    /// The test could not be run; never contributes to the alert.
    Inconclusive,
}

impl Verdict {
    pub fn from_p_value(p_value: f64, threshold: f64) -> Self {
        if p_value < threshold {
            Verdict::Drift
        } else {
            Verdict::Stable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Stable => "Stable",
            Verdict::Drift => "Drift",
            Verdict::Inconclusive => "Inconclusive",
        }
    }
}

/// Comparison outcome for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureResult {
    pub feature: String,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistic: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<PValueMethod>,
    /// Why the feature is inconclusive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub baseline_n: usize,
    pub window_n: usize,
}

impl FeatureResult {
    pub fn is_drift(&self) -> bool {
        self.verdict == Verdict::Drift
    }
}

/// Per-feature results for one cycle plus the cutoff they were judged by.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub results: Vec<FeatureResult>,
    pub effective_threshold: f64,
}

pub struct Comparator {
    threshold: f64,
    correction: Correction,
}

impl Comparator {
    pub fn new(threshold: f64, correction: Correction) -> Self {
        Self {
            threshold,
            correction,
        }
    }

    /// Compare every feature in `features` that has both a baseline and at
    /// least one windowed value. Features without production data are left
    /// out of the result entirely.
    pub fn compare(
        &self,
        baseline: &BaselineStore,
        window: &WindowSnapshot,
        features: &[String],
    ) -> Comparison {
        let mut results = Vec::with_capacity(features.len());
        for name in features {
            let (Some(base), Some(current)) = (baseline.sample(name), window.get(name)) else {
                continue;
            };
            if current.is_empty() {
                continue;
            }
            let result = match ks_2samp_presorted(base, current) {
                Ok(ks) => FeatureResult {
                    feature: name.clone(),
                    verdict: Verdict::Stable,
                    statistic: Some(ks.statistic),
                    p_value: Some(ks.p_value),
                    method: Some(ks.method),
                    reason: None,
                    baseline_n: base.len(),
                    window_n: current.len(),
                },
                Err(why) => FeatureResult {
                    feature: name.clone(),
                    verdict: Verdict::Inconclusive,
                    statistic: None,
                    p_value: None,
                    method: None,
                    reason: Some(why.to_string()),
                    baseline_n: base.len(),
                    window_n: current.len(),
                },
            };
            results.push(result);
        }

        let conclusive = results.iter().filter(|r| r.p_value.is_some()).count();
        let effective_threshold = match self.correction {
            Correction::None => self.threshold,
            Correction::Bonferroni if conclusive > 1 => self.threshold / conclusive as f64,
            Correction::Bonferroni => self.threshold,
        };
        for r in &mut results {
            if let Some(p) = r.p_value {
                r.verdict = Verdict::from_p_value(p, effective_threshold);
            }
        }

        Comparison {
            results,
            effective_threshold,
        }
    }
}
