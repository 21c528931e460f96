//! Periodic job runtime.
//!
//! A [`ScheduledJob`] pairs a [`Job`] with a [`Cadence`] and a [`SingleFlight`]
//! guard. A firing that lands while the previous run of the same job is still
//! going is skipped and logged, never overlapped. With a [`RunLease`] attached
//! the same holds across processes sharing the database.

use crate::libs::escalation::Escalator;
use crate::libs::lease::RunLease;
use crate::libs::messages::Message;
use crate::libs::priority::PriorityRecalculator;
use crate::{msg_debug, msg_error, msg_info, msg_success, msg_warning};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};

pub const PRIORITY_JOB: &str = "priority";
pub const ESCALATION_JOB: &str = "escalation";

#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self) -> crate::libs::error::Result<()>;
}

#[async_trait]
impl Job for PriorityRecalculator {
    fn name(&self) -> &'static str {
        PRIORITY_JOB
    }

    async fn execute(&self) -> crate::libs::error::Result<()> {
        let report = self.run()?;
        msg_info!(Message::PriorityRunSummary(
            report.scanned,
            report.updated,
            report.unchanged,
            report.overdue,
            report.failures.len()
        ));
        Ok(())
    }
}

#[async_trait]
impl Job for Escalator {
    fn name(&self) -> &'static str {
        ESCALATION_JOB
    }

    async fn execute(&self) -> crate::libs::error::Result<()> {
        let report = self.run().await?;
        msg_info!(Message::EscalationRunSummary(
            report.selected,
            report.called(),
            report.answered(),
            report.skipped(),
            report.failed()
        ));
        Ok(())
    }
}

/// When a job fires, in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Once a day at `hour:minute`.
    Daily { hour: u32, minute: u32 },
    /// Every hour at `minute`.
    Hourly { minute: u32 },
}

impl Cadence {
    /// First firing strictly after `after`.
    pub fn next_after(&self, after: NaiveDateTime) -> NaiveDateTime {
        match *self {
            Cadence::Daily { hour, minute } => {
                let at = NaiveTime::from_hms_opt(hour.min(23), minute.min(59), 0).unwrap_or(NaiveTime::MIN);
                let candidate = after.date().and_time(at);
                if candidate > after {
                    candidate
                } else {
                    candidate + TimeDelta::days(1)
                }
            }
            Cadence::Hourly { minute } => {
                let at = NaiveTime::from_hms_opt(after.hour(), minute.min(59), 0).unwrap_or(NaiveTime::MIN);
                let candidate = after.date().and_time(at);
                if candidate > after {
                    candidate
                } else {
                    candidate + TimeDelta::hours(1)
                }
            }
        }
    }

    /// Next firing as a local instant. Times skipped by a DST jump fire an hour later.
    pub fn next_local(&self, now: DateTime<Local>) -> DateTime<Local> {
        let next = self.next_after(now.naive_local());
        Local
            .from_local_datetime(&next)
            .earliest()
            .or_else(|| Local.from_local_datetime(&(next + TimeDelta::hours(1))).earliest())
            .unwrap_or_else(|| now + TimeDelta::hours(1))
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cadence::Daily { hour, minute } => write!(f, "daily at {:02}:{:02}", hour, minute),
            Cadence::Hourly { minute } => write!(f, "hourly at minute {:02}", minute),
        }
    }
}

/// At most one run in progress.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    running: Arc<AtomicBool>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the flight, or `None` while another run holds it.
    pub fn try_begin(&self) -> Option<FlightGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                running: Arc::clone(&self.running),
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Releases the flight when dropped, including when the run is cancelled.
#[derive(Debug)]
pub struct FlightGuard {
    running: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    Completed,
    Failed(String),
    /// The previous run was still in progress.
    Skipped,
}

pub struct ScheduledJob {
    job: Arc<dyn Job>,
    cadence: Cadence,
    flight: SingleFlight,
    lease: Option<RunLease>,
}

impl ScheduledJob {
    pub fn new(job: Arc<dyn Job>, cadence: Cadence) -> Self {
        Self {
            job,
            cadence,
            flight: SingleFlight::new(),
            lease: None,
        }
    }

    /// Also requires the job's lease before each run.
    pub fn with_lease(mut self, lease: RunLease) -> Self {
        self.lease = Some(lease);
        self
    }

    pub fn name(&self) -> &'static str {
        self.job.name()
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Runs the job once, now, unless a run is already in flight here or,
    /// with a lease attached, in another process.
    pub async fn trigger(&self) -> TriggerOutcome {
        let Some(_flight) = self.flight.try_begin() else {
            msg_warning!(Message::JobSkippedInFlight(self.name().to_string()));
            return TriggerOutcome::Skipped;
        };

        let lease = match self.lease.as_ref().map(|lease| lease.acquire(self.name())).transpose() {
            Ok(Some(None)) => {
                msg_warning!(Message::JobHeldElsewhere(self.name().to_string()));
                return TriggerOutcome::Skipped;
            }
            Ok(lease) => lease.flatten(),
            Err(e) => {
                msg_error!(Message::JobFailed(self.name().to_string(), e.to_string()));
                return TriggerOutcome::Failed(e.to_string());
            }
        };

        msg_info!(Message::JobStarted(self.name().to_string()));
        let result = match &lease {
            Some(guard) => guard.hold(self.job.execute()).await,
            None => self.job.execute().await,
        };

        match result {
            Ok(()) => {
                msg_success!(Message::JobCompleted(self.name().to_string()));
                TriggerOutcome::Completed
            }
            Err(e) => {
                msg_error!(Message::JobFailed(self.name().to_string(), e.to_string()));
                TriggerOutcome::Failed(e.to_string())
            }
        }
    }

    /// Fires the job on its cadence until the returned handle is aborted.
    ///
    /// Each firing runs on its own task so a long run never delays the next
    /// tick; the single-flight guard turns an overlapping tick into a skip.
    /// Aborting the handle also aborts a run still in progress.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        self.spawn_with(|job| {
            let now = Local::now();
            let next = job.cadence.next_local(now);
            msg_debug!(Message::JobScheduled(job.name().to_string(), next.to_rfc3339()));
            (next - now).to_std().unwrap_or_default()
        })
    }

    fn spawn_with(self: Arc<Self>, mut next_delay: impl FnMut(&ScheduledJob) -> Duration + Send + 'static) -> JoinHandle<()> {
        tokio::spawn(async move {
            // Dropped with this task, which aborts every run it still owns
            let mut runs = JoinSet::new();

            loop {
                tokio::time::sleep(next_delay(&self)).await;
                while runs.try_join_next().is_some() {}

                let job = Arc::clone(&self);
                runs.spawn(async move {
                    job.trigger().await;
                });
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn daily_rolls_to_next_day() {
        let daily = Cadence::Daily { hour: 0, minute: 0 };
        assert_eq!(daily.next_after(at(31, 12, 0, 0)), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap().and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(daily.next_after(at(10, 0, 0, 0)), at(11, 0, 0, 0));
    }

    #[test]
    fn hourly_fires_at_minute() {
        let hourly = Cadence::Hourly { minute: 0 };
        assert_eq!(hourly.next_after(at(10, 9, 30, 0)), at(10, 10, 0, 0));
        assert_eq!(hourly.next_after(at(10, 23, 0, 0)), at(11, 0, 0, 0));
        let quarter = Cadence::Hourly { minute: 15 };
        assert_eq!(quarter.next_after(at(10, 9, 14, 59)), at(10, 9, 15, 0));
    }

    #[derive(Default)]
    struct Sleeper {
        started: std::sync::atomic::AtomicUsize,
        finished: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl Job for Sleeper {
        fn name(&self) -> &'static str {
            "sleeper"
        }

        async fn execute(&self) -> crate::libs::error::Result<()> {
            self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(300)).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn aborting_the_loop_stops_the_run_in_progress() {
        let job = Arc::new(Sleeper::default());
        let scheduled = Arc::new(ScheduledJob::new(job.clone(), Cadence::Hourly { minute: 0 }));

        let handle = Arc::clone(&scheduled).spawn_with(|_| Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();
        let _ = handle.await;

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(job.started.load(Ordering::SeqCst) >= 1);
        assert_eq!(job.finished.load(Ordering::SeqCst), 0);
        assert!(!scheduled.flight.is_running());
    }

    #[test]
    fn single_flight_releases_on_drop() {
        let flight = SingleFlight::new();
        let guard = flight.try_begin();
        assert!(guard.is_some());
        assert!(flight.try_begin().is_none());
        drop(guard);
        assert!(!flight.is_running());
        assert!(flight.try_begin().is_some());
    }
}
