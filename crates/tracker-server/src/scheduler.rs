//! The scheduled archival trigger.

use std::time::Duration;

use tokio::{
  task::JoinHandle,
  time::{MissedTickBehavior, interval},
};
use tracker_core::{service::Tracker, store::TableStore};

/// Run an archival pass every `every`, starting one period from now.
///
/// Outcomes are logged only. A pass that overruns the period delays the next
/// one rather than stacking them up.
pub fn spawn_archival<S: TableStore + 'static>(
  tracker: Tracker<S>,
  every: Duration,
) -> JoinHandle<()> {
  tokio::spawn(async move {
    let mut timer = interval(every);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Skip the first immediate tick.
    timer.tick().await;

    tracing::info!(every_secs = every.as_secs(), "archival scheduler started");

    loop {
      timer.tick().await;
      match tracker.run_archival().await {
        Ok(report) => tracing::info!(
          moved = report.moved(),
          sort_errors = report.sort_errors.len(),
          "scheduled archival finished"
        ),
        Err(e) if e.is_lock_timeout() => {
          tracing::warn!("archival already running; skipping this run")
        }
        Err(e) => tracing::error!(error = %e, "scheduled archival failed"),
      }
    }
  })
}
