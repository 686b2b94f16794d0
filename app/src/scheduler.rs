// app/src/scheduler.rs

//! Daily timer for the database export.

use crate::pipelines::nightly_export::run_nightly_export;
use crate::state::AppState;
use chrono::{DateTime, Days, FixedOffset, NaiveTime, TimeZone, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// First instant strictly after `now` whose wall-clock time at `offset` is `time`.
pub fn next_run_after(now: DateTime<Utc>, time: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
  let local_now = now.with_timezone(&offset);
  let today = local_now.date_naive();

  let candidate = |date: chrono::NaiveDate| {
    offset
      .from_local_datetime(&date.and_time(time))
      .single()
      .map(|dt| dt.with_timezone(&Utc))
  };

  match candidate(today) {
    Some(at) if at > now => at,
    _ => today
      .checked_add_days(Days::new(1))
      .and_then(candidate)
      .unwrap_or(now + chrono::Duration::days(1)),
  }
}

/// Runs the export every day at the configured time until the task is aborted.
pub fn spawn_nightly_export(app_state: AppState) -> JoinHandle<()> {
  tokio::spawn(async move {
    loop {
      let now = Utc::now();
      let next = next_run_after(now, app_state.config.export_time, app_state.config.store_offset);
      info!(next_run = %next, "Next database export scheduled.");

      let wait = (next - now).to_std().unwrap_or_default();
      tokio::time::sleep(wait).await;

      // A failed run is not retried; the next attempt is tomorrow's.
      match run_nightly_export(&app_state, Utc::now()).await {
        Ok(report) => info!(prefix = %report.prefix, "Scheduled export succeeded."),
        Err(e) => error!(error = %e, "Scheduled export failed."),
      }
    }
  })
}
