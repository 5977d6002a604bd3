//! One evaluation cycle: baseline → new events → window → comparator → report.

use crate::baseline::BaselineStore;
use crate::config::MonitorConfig;
use crate::drift::Comparator;
use crate::error::MonitorError;
use crate::events::{EventIngester, SourceStatus};
use crate::report::{aggregate, CycleContext, DriftReport};
use crate::window::SlidingWindow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The event source does not exist yet
    SourceAbsent,
    /// The source exists but no accepted event has been seen
    NoEvents,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Report(DriftReport),
    SkippedNoData { reason: SkipReason },
}

impl CycleOutcome {
    pub fn report(&self) -> Option<&DriftReport> {
        match self {
            CycleOutcome::Report(r) => Some(r),
            CycleOutcome::SkippedNoData { .. } => None,
        }
    }

    pub fn into_report(self) -> Option<DriftReport> {
        match self {
            CycleOutcome::Report(r) => Some(r),
            CycleOutcome::SkippedNoData { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, CycleOutcome::SkippedNoData { .. })
    }
}

/// A monitor instance: one config, one frozen baseline, one read cursor and
/// the window it has built so far. Each cycle folds in only records appended
/// since the previous one.
pub struct DriftMonitor {
    config: MonitorConfig,
    baseline: Option<Arc<BaselineStore>>,
    ingester: EventIngester,
    comparator: Comparator,
    window: SlidingWindow,
    cursor: u64,
    dropped_total: u64,
}

impl DriftMonitor {
    /// The baseline is loaded on the first cycle and retried on later ones
    /// until it succeeds.
    pub fn new(config: MonitorConfig) -> Result<Self, MonitorError> {
        config.validate()?;
        Ok(Self {
            ingester: EventIngester::new(config.features.clone()),
            comparator: Comparator::new(config.drift_threshold, config.correction),
            window: SlidingWindow::new(config.window_size, config.features.clone()),
            baseline: None,
            cursor: 0,
            dropped_total: 0,
            config,
        })
    }

    /// Use an already loaded baseline, e.g. one shared between monitors.
    pub fn with_baseline(
        config: MonitorConfig,
        baseline: Arc<BaselineStore>,
    ) -> Result<Self, MonitorError> {
        let mut m = Self::new(config)?;
        m.baseline = Some(baseline);
        Ok(m)
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn baseline(&self) -> Option<&Arc<BaselineStore>> {
        self.baseline.as_ref()
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    /// Byte offset of the next unread record.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Malformed records skipped over the monitor's lifetime.
    pub fn dropped_total(&self) -> u64 {
        self.dropped_total
    }

    fn ensure_baseline(&mut self) -> Result<Arc<BaselineStore>, MonitorError> {
        if let Some(b) = &self.baseline {
            return Ok(Arc::clone(b));
        }
        let b = Arc::new(BaselineStore::load(
            &self.config.baseline_path,
            &self.config.features,
        )?);
        self.baseline = Some(Arc::clone(&b));
        Ok(b)
    }

    pub fn run_cycle(&mut self) -> Result<CycleOutcome, MonitorError> {
        self.run_cycle_cancellable(&AtomicBool::new(false))
    }

    /// Run one cycle. Cursor and window are committed only at the end, and
    /// not at all once `cancel` is set. `cancel` is also checked before the
    /// cycle starts and between records while reading the event source.
    pub fn run_cycle_cancellable(&mut self, cancel: &AtomicBool) -> Result<CycleOutcome, MonitorError> {
        if cancel.load(Ordering::Relaxed) {
            return Err(MonitorError::Cancelled);
        }
        let baseline = self.ensure_baseline().map_err(|e| {
            warn!(error = %e, "baseline unavailable; cycle skipped");
            e
        })?;

        let mut window = self.window.clone();
        let summary = self.ingester.ingest_cancellable(
            &self.config.event_source_path,
            self.cursor,
            cancel,
            |ev| window.push(&ev),
        )?;

        if summary.status == SourceStatus::Absent {
            return Ok(CycleOutcome::SkippedNoData {
                reason: SkipReason::SourceAbsent,
            });
        }

        let snapshot = window.snapshot();
        let comparison = (!snapshot.is_empty())
            .then(|| self.comparator.compare(&baseline, &snapshot, &self.config.features));

        if cancel.load(Ordering::Relaxed) {
            return Err(MonitorError::Cancelled);
        }
        self.window = window;
        self.cursor = summary.next_cursor;
        self.dropped_total += summary.dropped;

        let Some(comparison) = comparison else {
            info!(dropped = summary.dropped, "no production events yet; cycle skipped");
            return Ok(CycleOutcome::SkippedNoData {
                reason: SkipReason::NoEvents,
            });
        };

        let report = aggregate(
            comparison,
            CycleContext {
                window_len: snapshot.len(),
                dropped_records: summary.dropped,
            },
        );
        info!(
            cycle_id = %report.cycle_id,
            alert = report.alert,
            drifted = report.drifted().len(),
            inconclusive = report.inconclusive().len(),
            window_len = report.window_len,
            accepted = summary.accepted,
            dropped = summary.dropped,
            "drift cycle complete"
        );
        Ok(CycleOutcome::Report(report))
    }
}

/// Minimal one-shot cycle: load the baseline, read the whole event history
/// and evaluate it from scratch.
pub fn run_cycle(config: &MonitorConfig) -> Result<CycleOutcome, MonitorError> {
    DriftMonitor::new(config.clone())?.run_cycle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventLog, InferenceEvent};
    use std::path::Path;

    fn config(dir: &Path, window_size: usize) -> MonitorConfig {
        MonitorConfig {
            baseline_path: dir.join("train.csv"),
            event_source_path: dir.join("predictions.json"),
            window_size,
            features: vec!["Amount".into()],
            ..MonitorConfig::default()
        }
    }

    fn baseline() -> Arc<BaselineStore> {
        Arc::new(BaselineStore::from_samples(vec![("Amount", (0..100).map(|i| i as f64).collect())]).unwrap())
    }

    fn append(log: &EventLog, values: impl IntoIterator<Item = f64>) {
        for v in values {
            log.append(&InferenceEvent::new(vec![("Amount".to_string(), v)])).unwrap();
        }
    }

    #[test]
    fn missing_baseline_fails_cycle_and_retries() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = DriftMonitor::new(config(dir.path(), 10)).unwrap();
        assert!(matches!(m.run_cycle(), Err(MonitorError::BaselineUnavailable { .. })));
        assert!(m.baseline().is_none());

        std::fs::write(dir.path().join("train.csv"), "Amount,Class\n1,0\n2,0\n3,1\n").unwrap();
        let out = m.run_cycle().unwrap();
        assert_eq!(out, CycleOutcome::SkippedNoData { reason: SkipReason::SourceAbsent });
        assert_eq!(m.baseline().unwrap().len(), 3);
    }

    #[test]
    fn absent_source_skips() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = DriftMonitor::with_baseline(config(dir.path(), 10), baseline()).unwrap();
        let out = m.run_cycle().unwrap();
        assert!(out.is_skipped());
        assert_eq!(m.cursor(), 0);
    }

    #[test]
    fn only_malformed_events_skip_with_count() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 10);
        std::fs::write(&cfg.event_source_path, "{\"Amount\": \"x\"}\nnope\n").unwrap();
        let mut m = DriftMonitor::with_baseline(cfg, baseline()).unwrap();
        let out = m.run_cycle().unwrap();
        assert_eq!(out, CycleOutcome::SkippedNoData { reason: SkipReason::NoEvents });
        assert_eq!(m.dropped_total(), 2);
    }

    #[test]
    fn window_is_maintained_across_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 10);
        let log = EventLog::open(&cfg.event_source_path).unwrap();
        let mut m = DriftMonitor::with_baseline(cfg, baseline()).unwrap();

        append(&log, (0..4).map(|i| i as f64));
        let first = m.run_cycle().unwrap().into_report().unwrap();
        assert_eq!(first.window_len, 4);

        // Nothing new: the accumulating window is unchanged.
        let again = m.run_cycle().unwrap().into_report().unwrap();
        assert_eq!(again.window_len, 4);
        assert_eq!(m.window().values("Amount").unwrap(), vec![0.0, 1.0, 2.0, 3.0]);

        append(&log, (4..15).map(|i| i as f64));
        let third = m.run_cycle().unwrap().into_report().unwrap();
        assert_eq!(third.window_len, 10);
        let expected: Vec<f64> = (5..15).map(|i| i as f64).collect();
        assert_eq!(m.window().values("Amount").unwrap(), expected);
    }

    #[test]
    fn cancelled_cycle_commits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 10);
        let log = EventLog::open(&cfg.event_source_path).unwrap();
        append(&log, [1.0, 2.0, 3.0]);
        let mut m = DriftMonitor::with_baseline(cfg, baseline()).unwrap();

        let cancel = AtomicBool::new(true);
        assert!(matches!(m.run_cycle_cancellable(&cancel), Err(MonitorError::Cancelled)));
        assert_eq!(m.cursor(), 0);
        assert!(m.window().is_empty());

        let out = m.run_cycle().unwrap();
        assert_eq!(out.report().unwrap().window_len, 3);
        assert!(m.cursor() > 0);
    }

    #[test]
    fn stateless_cycle_rereads_history() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), 10);
        std::fs::write(&cfg.baseline_path, "Amount\n1\n2\n3\n4\n").unwrap();
        let log = EventLog::open(&cfg.event_source_path).unwrap();
        append(&log, [1.0, 2.0, 3.0]);

        let first = run_cycle(&cfg).unwrap().into_report().unwrap();
        let second = run_cycle(&cfg).unwrap().into_report().unwrap();
        assert_eq!(first.window_len, 3);
        assert_eq!(second.window_len, 3);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = MonitorConfig::default();
        cfg.window_size = 0;
        assert!(matches!(DriftMonitor::new(cfg), Err(MonitorError::InvalidConfig(_))));
    }
}
