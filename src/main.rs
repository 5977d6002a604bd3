//! fraud-drift entrypoint: runs a single evaluation cycle, or a daemon loop
//! when `schedule.interval_secs` is non-zero. Reports go to stdout as a table
//! plus one JSON line; logs go to stderr.

use fraud_drift::{
    config::MonitorConfig,
    logging::StructuredLogger,
    monitor::{ctrlc_shutdown, CycleOutcome, DriftMonitor, Scheduler},
    report::render,
    MonitorError,
};
use tracing::{info, warn};

fn publish(outcome: &Result<CycleOutcome, MonitorError>) {
    let Ok(CycleOutcome::Report(report)) = outcome else {
        return;
    };
    print!("{}", render(report));
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = StructuredLogger::emit_json(&report.to_json(), &mut stdout) {
        warn!(error = %e, "failed to write report");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("DRIFT_CONFIG_PATH")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("config.json"));
    let (config, config_warning) = MonitorConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);
    if let Some(w) = config_warning {
        warn!("{}", w);
    }

    info!(
        baseline = %config.baseline_path.display(),
        events = %config.event_source_path.display(),
        window_size = config.window_size,
        threshold = config.drift_threshold,
        features = config.features.len(),
        "drift monitor starting"
    );

    let interval = config.schedule.interval();
    let timeout = config.schedule.cycle_timeout();
    let mut monitor = DriftMonitor::new(config)?;

    let Some(interval) = interval else {
        let outcome = monitor.run_cycle();
        publish(&outcome);
        match outcome {
            Ok(CycleOutcome::SkippedNoData { reason }) => info!(?reason, "no data to evaluate"),
            Ok(CycleOutcome::Report(_)) => info!("drift cycle complete"),
            // A failed cycle is reported, not fatal.
            Err(e) => warn!(error = %e, "drift cycle failed"),
        }
        return Ok(());
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()?;
    // stop_tx lives until the scheduler returns.
    let (stop_tx, stop_rx) = ctrlc_shutdown();

    info!(interval_secs = interval.as_secs(), "daemon mode (Ctrl+C to stop)");
    let scheduler = Scheduler::new(monitor, interval, timeout);
    runtime.block_on(scheduler.run(stop_rx, |_, outcome| publish(outcome)));
    drop(stop_tx);
    info!("drift monitor stopping");
    Ok(())
}
