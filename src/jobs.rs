//! Periodic background jobs: average-attempts cache refresh and reminder sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::service::{HangmanService, Reminder};

pub fn spawn_average_attempts_job(service: Arc<HangmanService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = service.refresh_average_attempts().await {
                warn!(error = %e, "average attempts refresh failed");
            }
        }
    })
}

pub fn spawn_reminder_job(service: Arc<HangmanService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately; skip it.
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = run_reminder_sweep(&service).await {
                warn!(error = %e, "reminder sweep failed");
            }
        }
    })
}

/// One pass of the reminder job. Delivery is left to whoever reads the log.
pub async fn run_reminder_sweep(service: &HangmanService) -> Result<Vec<Reminder>, ServiceError> {
    let reminders = service.pending_reminders().await?;
    for reminder in &reminders {
        info!(
            user = %reminder.user_name,
            email = %reminder.email,
            subject = %reminder.subject,
            "{}",
            reminder.body
        );
    }
    info!(count = reminders.len(), "reminder sweep done");
    Ok(reminders)
}
