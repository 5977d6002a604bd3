//! Operator-facing table.

use super::DriftReport;
use crate::drift::Verdict;
use std::fmt::Write;

pub const HEALTHY: &str = "System Healthy";
pub const DRIFT_DETECTED: &str = "Data Drift Detected";

/// Render one row per feature in report order, then a one-line verdict.
pub fn render(report: &DriftReport) -> String {
    let width = report
        .features
        .iter()
        .map(|r| r.feature.len())
        .max()
        .unwrap_or(0)
        .max("Feature".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$} | {:<10} | Status", "Feature", "P-Value");
    let _ = writeln!(out, "{}", "-".repeat(width + 24));
    for r in &report.features {
        let p = match (r.verdict, r.p_value) {
            (Verdict::Inconclusive, _) | (_, None) => "-".to_string(),
            (_, Some(p)) => format!("{:.4}", p),
        };
        let _ = writeln!(out, "{:<width$} | {:<10} | {}", r.feature, p, r.verdict.label());
    }
    out.push_str(if report.alert { DRIFT_DETECTED } else { HEALTHY });
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::Comparison;
    use crate::report::tests::result;
    use crate::report::{aggregate, CycleContext};

    #[test]
    fn rows_follow_feature_order() {
        let report = aggregate(
            Comparison {
                results: vec![
                    result("V1", Some(0.83421), Verdict::Stable),
                    result("V2", None, Verdict::Inconclusive),
                    result("Amount", Some(0.00001), Verdict::Drift),
                ],
                effective_threshold: 0.05,
            },
            CycleContext::default(),
        );
        let text = render(&report);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Feature | P-Value    | Status");
        assert_eq!(lines[2], "V1      | 0.8342     | Stable");
        assert_eq!(lines[3], "V2      | -          | Inconclusive");
        assert_eq!(lines[4], "Amount  | 0.0000     | Drift");
        assert_eq!(lines[5], DRIFT_DETECTED);
    }

    #[test]
    fn healthy_verdict_line() {
        let report = aggregate(
            Comparison {
                results: vec![result("V1", Some(0.5), Verdict::Stable)],
                effective_threshold: 0.05,
            },
            CycleContext::default(),
        );
        assert_eq!(render(&report).lines().last(), Some(HEALTHY));
    }
}
