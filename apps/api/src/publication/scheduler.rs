//! Weekly publication schedule. One background task at most; it sleeps until
//! the next configured slot, runs the cycle job, and repeats until stopped.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Datelike, Days, FixedOffset, TimeZone, Utc};
use futures::future::BoxFuture;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::ScheduleConfig;

/// The work fired at every slot. Errors are the job's own business.
pub type CycleJob = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// First slot strictly after `after`, evaluated in the schedule's fixed UTC offset.
pub fn next_fire_after(schedule: &ScheduleConfig, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let offset = FixedOffset::east_opt(schedule.utc_offset_hours * 3600)?;
    let today = after.with_timezone(&offset).date_naive();

    // Eight days covers "today's slot already passed, same weekday next week".
    (0..=7u64)
        .filter_map(|d| today.checked_add_days(Days::new(d)))
        .filter(|date| schedule.days.contains(&date.weekday()))
        .filter_map(|date| date.and_hms_opt(schedule.hour, 0, 0))
        .filter_map(|local| offset.from_local_datetime(&local).single())
        .map(|slot| slot.with_timezone(&Utc))
        .find(|slot| *slot > after)
}

struct Running {
    schedule: ScheduleConfig,
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
pub struct Scheduler {
    running: Mutex<Option<Running>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Spawns the loop. Returns false (and changes nothing) when a loop is
    /// already running or the schedule has no days.
    pub fn start(&self, schedule: ScheduleConfig, job: CycleJob) -> bool {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            warn!("Scheduler already running");
            return false;
        }
        if schedule.days.is_empty() {
            warn!("Scheduler not started: no publication days configured");
            return false;
        }

        let (stop, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(schedule.clone(), job, stop_rx));
        info!(
            days = ?schedule.days,
            hour = schedule.hour,
            utc_offset = schedule.utc_offset_hours,
            "Scheduler started"
        );
        *slot = Some(Running {
            schedule,
            stop,
            handle,
        });
        true
    }

    /// Signals the loop to exit. Returns whether one was running.
    pub fn stop(&self) -> bool {
        match self.slot().take() {
            Some(running) => {
                let _ = running.stop.send(true);
                let was_running = !running.handle.is_finished();
                info!("Scheduler stopped");
                was_running
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.slot()
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        let slot = self.slot();
        let running = slot.as_ref().filter(|r| !r.handle.is_finished())?;
        next_fire_after(&running.schedule, Utc::now())
    }
}

async fn run_loop(schedule: ScheduleConfig, job: CycleJob, mut stop: watch::Receiver<bool>) {
    // Wall-clock time follows the runtime clock from a single anchor, so
    // sleeps and slot arithmetic agree.
    let (anchor, anchor_utc) = (Instant::now(), Utc::now());
    let now = || {
        anchor_utc
            + chrono::Duration::from_std(anchor.elapsed()).unwrap_or_else(|_| chrono::Duration::zero())
    };

    // Never re-fire a slot: the cursor only moves forward.
    let mut cursor = now();
    loop {
        let Some(next) = next_fire_after(&schedule, cursor) else {
            warn!("No upcoming publication slot; scheduler exiting");
            return;
        };
        let wait = (next - now()).to_std().unwrap_or_default();
        info!(next_run = %next, "Next publication cycle scheduled");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                info!("Scheduled publication cycle triggered");
                job().await;
                cursor = next.max(now());
            }
            _ = stop.changed() => return,
        }
    }
}
