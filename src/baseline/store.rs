//! Frozen training-time reference samples, one per tracked feature.

use crate::error::MonitorError;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Per-feature baseline samples, sorted ascending. Immutable after construction;
/// share it across cycles with `Arc`.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    features: Vec<String>,
    samples: HashMap<String, Vec<f64>>,
    rows: usize,
}

impl BaselineStore {
    /// Load tracked columns from a headered CSV. Untracked columns (the label,
    /// `Time`) are ignored.
    pub fn load(path: &Path, features: &[String]) -> Result<Self, MonitorError> {
        if !path.exists() {
            return Err(MonitorError::baseline(path, "file not found"));
        }
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| MonitorError::baseline(path, e.to_string()))?;

        let headers = reader
            .headers()
            .map_err(|e| MonitorError::baseline(path, format!("unreadable header: {}", e)))?
            .clone();

        let mut columns = Vec::with_capacity(features.len());
        for name in features {
            let idx = headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| MonitorError::baseline(path, format!("missing column {}", name)))?;
            columns.push((name.as_str(), idx));
        }

        let mut samples: HashMap<String, Vec<f64>> =
            features.iter().map(|f| (f.clone(), Vec::new())).collect();
        for (row, record) in reader.records().enumerate() {
            let record =
                record.map_err(|e| MonitorError::baseline(path, format!("row {}: {}", row + 1, e)))?;
            for &(name, idx) in &columns {
                let cell = record.get(idx).unwrap_or("");
                let value: f64 = cell.parse().map_err(|_| {
                    MonitorError::baseline(
                        path,
                        format!("row {}: column {} is not numeric ({:?})", row + 1, name, cell),
                    )
                })?;
                if let Some(s) = samples.get_mut(name) {
                    s.push(value);
                }
            }
        }

        let store = Self::build(path, features, samples)?;
        info!(
            path = %path.display(),
            features = store.features.len(),
            rows = store.rows,
            "baseline loaded"
        );
        Ok(store)
    }

    /// Build a store from in-memory samples, keeping the given order.
    pub fn from_samples<I, S>(samples: I) -> Result<Self, MonitorError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut features = Vec::new();
        let mut map = HashMap::new();
        for (name, values) in samples {
            let name = name.into();
            features.push(name.clone());
            map.insert(name, values);
        }
        Self::build(Path::new("<memory>"), &features, map)
    }

    fn build(
        path: &Path,
        features: &[String],
        mut samples: HashMap<String, Vec<f64>>,
    ) -> Result<Self, MonitorError> {
        let mut rows = 0;
        for name in features {
            let s = samples
                .get_mut(name)
                .ok_or_else(|| MonitorError::baseline(path, format!("missing feature {}", name)))?;
            if s.is_empty() {
                return Err(MonitorError::baseline(path, format!("no rows for {}", name)));
            }
            s.sort_by(f64::total_cmp);
            rows = rows.max(s.len());
        }
        Ok(Self {
            features: features.to_vec(),
            samples,
            rows,
        })
    }

    /// Sorted reference sample for `feature`.
    pub fn sample(&self, feature: &str) -> Option<&[f64]> {
        self.samples.get(feature).map(Vec::as_slice)
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Number of training rows (longest sample).
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn loads_tracked_columns_and_ignores_label() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "Time,V1,Amount,Class").unwrap();
        writeln!(f, "0,0.5,120.0,0").unwrap();
        writeln!(f, "1,-0.25,3.5,1").unwrap();
        writeln!(f, "2,0.1,80,0").unwrap();

        let store = BaselineStore::load(f.path(), &names(&["V1", "Amount"])).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.sample("V1").unwrap(), &[-0.25, 0.1, 0.5]);
        assert_eq!(store.sample("Amount").unwrap(), &[3.5, 80.0, 120.0]);
        assert!(store.sample("Class").is_none());
        assert_eq!(store.features(), &names(&["V1", "Amount"])[..]);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = BaselineStore::load(Path::new("/nonexistent/train.csv"), &names(&["V1"]))
            .unwrap_err();
        assert!(matches!(err, MonitorError::BaselineUnavailable { .. }));
    }

    #[test]
    fn missing_column_is_unavailable() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "V1,Class").unwrap();
        writeln!(f, "0.5,0").unwrap();
        let err = BaselineStore::load(f.path(), &names(&["V1", "Amount"])).unwrap_err();
        assert!(err.to_string().contains("Amount"));
    }

    #[test]
    fn header_only_is_unavailable() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "V1,Amount").unwrap();
        let err = BaselineStore::load(f.path(), &names(&["V1"])).unwrap_err();
        assert!(matches!(err, MonitorError::BaselineUnavailable { .. }));
    }

    #[test]
    fn non_numeric_cell_is_unavailable() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "V1").unwrap();
        writeln!(f, "abc").unwrap();
        assert!(BaselineStore::load(f.path(), &names(&["V1"])).is_err());
    }

    #[test]
    fn from_samples_rejects_empty() {
        assert!(BaselineStore::from_samples(vec![("V1", vec![])]).is_err());
        let s = BaselineStore::from_samples(vec![("V1", vec![3.0, 1.0, 2.0])]).unwrap();
        assert_eq!(s.sample("V1").unwrap(), &[1.0, 2.0, 3.0]);
    }
}
