//! Hourly escalation of overdue tasks by phone.
//!
//! A run selects live, unfinished tasks whose due date has passed, pairs each
//! with its owner and orders the pairs by the owner's priority class, then by
//! due date. Candidates are then worked strictly one after another:
//!
//! ```text
//! Selected ──cooldown──▶ Skipped
//!    │
//!    └─place_call──▶ Called ──pacing──▶ AwaitingOutcome ──poll──▶ Resolved
//!         │                                   │
//!         └────────────── error ──────────────┴──────────▶ Failed
//! ```
//!
//! Only an answered call updates the contact ledger, so an unanswered user is
//! tried again on the next run.

use crate::api::{CallGateway, CallHandle, CallOutcome};
use crate::libs::clock::Clock;
use crate::libs::contacts::{within_cooldown, ContactLedger};
use crate::libs::error::{Error, Result};
use crate::libs::messages::Message;
use crate::libs::store::RecordStore;
use crate::libs::task::{Task, TaskFilter};
use crate::libs::user::{PriorityClass, User};
use crate::{msg_debug, msg_info, msg_warning};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_COOLDOWN_HOURS: i64 = 24;
pub const DEFAULT_PACING_SECS: u64 = 20;
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Text spoken to the user for an overdue task.
pub fn call_message(title: &str) -> String {
    format!("Hello User, the task \"{}\" is due. Please complete it at your earliest convenience.", title)
}

#[derive(Debug, Clone, PartialEq)]
pub struct EscalationSettings {
    /// Minimum time between two answered calls to the same user.
    pub cooldown: TimeDelta,
    /// Wait between placing a call and asking for its outcome.
    pub pacing: Duration,
    /// Upper bound on a single outcome poll.
    pub poll_timeout: Duration,
}

impl Default for EscalationSettings {
    fn default() -> Self {
        Self {
            cooldown: TimeDelta::hours(DEFAULT_COOLDOWN_HOURS),
            pacing: Duration::from_secs(DEFAULT_PACING_SECS),
            poll_timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CandidateState {
    Selected,
    Called(CallHandle),
    AwaitingOutcome(CallHandle),
    Resolved(CallOutcome),
    /// Answered a call less than the cooldown ago.
    Skipped { last_contact: DateTime<Utc> },
    Failed(String),
}

impl CandidateState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CandidateState::Resolved(_) | CandidateState::Skipped { .. } | CandidateState::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateReport {
    pub task_id: i64,
    pub user_id: i64,
    pub priority_class: PriorityClass,
    pub state: CandidateState,
}

/// Outcome of one escalation run, candidates in the order they were worked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EscalationReport {
    /// Overdue tasks returned by the selection.
    pub selected: usize,
    /// Tasks dropped because their owner could not be loaded.
    pub dropped: usize,
    pub candidates: Vec<CandidateReport>,
}

impl EscalationReport {
    fn count(&self, pred: impl Fn(&CandidateState) -> bool) -> usize {
        self.candidates.iter().filter(|c| pred(&c.state)).count()
    }

    pub fn called(&self) -> usize {
        self.count(|s| matches!(s, CandidateState::Resolved(_)))
    }

    pub fn answered(&self) -> usize {
        self.count(|s| matches!(s, CandidateState::Resolved(CallOutcome::Completed)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, CandidateState::Skipped { .. }))
    }

    /// Gateway or ledger failures plus dropped tasks.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, CandidateState::Failed(_))) + self.dropped
    }
}

struct Candidate {
    task: Task,
    user: User,
}

pub struct Escalator {
    store: Arc<dyn RecordStore>,
    ledger: Arc<dyn ContactLedger>,
    gateway: Arc<dyn CallGateway>,
    clock: Arc<dyn Clock>,
    settings: EscalationSettings,
}

impl Escalator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        ledger: Arc<dyn ContactLedger>,
        gateway: Arc<dyn CallGateway>,
        clock: Arc<dyn Clock>,
        settings: EscalationSettings,
    ) -> Self {
        Self {
            store,
            ledger,
            gateway,
            clock,
            settings,
        }
    }

    /// Runs one escalation pass.
    ///
    /// Fails only when the overdue selection itself fails; everything after
    /// that is isolated per candidate and shows up in the report.
    pub async fn run(&self) -> Result<EscalationReport> {
        let now = self.clock.now();
        let tasks = self.store.find_live_tasks(&TaskFilter::Overdue(now))?;
        let mut report = EscalationReport {
            selected: tasks.len(),
            ..EscalationReport::default()
        };

        let mut candidates = Vec::with_capacity(tasks.len());
        for task in tasks {
            match self.store.find_user(task.user_id) {
                Ok(Some(user)) => candidates.push(Candidate { task, user }),
                Ok(None) => {
                    msg_warning!(Message::CandidateDropped(task.id.unwrap_or_default(), format!("user {} not found", task.user_id)));
                    report.dropped += 1;
                }
                Err(e) => {
                    msg_warning!(Message::CandidateDropped(task.id.unwrap_or_default(), e.to_string()));
                    report.dropped += 1;
                }
            }
        }

        // sort_by_key is stable, so equal keys keep the selection order
        candidates.sort_by_key(|c| (c.user.priority_class, c.task.due_date));
        msg_info!(Message::EscalationRunStarted(candidates.len()));

        for candidate in &candidates {
            let state = self.escalate(candidate).await;
            report.candidates.push(CandidateReport {
                task_id: candidate.task.id.unwrap_or_default(),
                user_id: candidate.user.id.unwrap_or_default(),
                priority_class: candidate.user.priority_class,
                state,
            });
        }

        Ok(report)
    }

    /// Drives one candidate from `Selected` to a terminal state.
    async fn escalate(&self, candidate: &Candidate) -> CandidateState {
        let mut state = CandidateState::Selected;

        while !state.is_terminal() {
            state = match state {
                CandidateState::Selected => self.place(candidate).await,
                CandidateState::Called(handle) => {
                    tokio::time::sleep(self.settings.pacing).await;
                    CandidateState::AwaitingOutcome(handle)
                }
                CandidateState::AwaitingOutcome(handle) => self.resolve(candidate, &handle).await,
                terminal => terminal,
            };
        }

        state
    }

    async fn place(&self, candidate: &Candidate) -> CandidateState {
        let user_id = candidate.user.id.unwrap_or_default();
        let task_id = candidate.task.id.unwrap_or_default();

        let last_contact = match self.ledger.last_contact(user_id) {
            Ok(last) => last,
            Err(e) => {
                msg_warning!(Message::CallFailed(task_id, e.to_string()));
                return CandidateState::Failed(e.to_string());
            }
        };

        match last_contact {
            Some(last) if within_cooldown(Some(last), self.clock.now(), self.settings.cooldown) => {
                msg_info!(Message::CandidateSkipped(user_id, candidate.user.priority_class.value(), last.to_rfc3339()));
                return CandidateState::Skipped { last_contact: last };
            }
            _ => {}
        }

        let message = call_message(&candidate.task.title);
        match self.gateway.place_call(&candidate.user.phone_number, &message).await {
            Ok(handle) => {
                msg_info!(Message::CallPlaced(user_id, candidate.user.priority_class.value(), candidate.task.title.clone()));
                CandidateState::Called(handle)
            }
            Err(e) => {
                msg_warning!(Message::CallFailed(task_id, e.to_string()));
                CandidateState::Failed(e.to_string())
            }
        }
    }

    async fn resolve(&self, candidate: &Candidate, handle: &CallHandle) -> CandidateState {
        let user_id = candidate.user.id.unwrap_or_default();
        let task_id = candidate.task.id.unwrap_or_default();

        let outcome = match tokio::time::timeout(self.settings.poll_timeout, self.gateway.poll_outcome(handle)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                msg_warning!(Message::CallFailed(task_id, e.to_string()));
                return CandidateState::Failed(e.to_string());
            }
            Err(_) => {
                let e = Error::GatewayFailure(format!("no outcome for call {} within {:?}", handle, self.settings.poll_timeout));
                msg_warning!(Message::CallFailed(task_id, e.to_string()));
                return CandidateState::Failed(e.to_string());
            }
        };

        match &outcome {
            CallOutcome::Completed => {
                msg_info!(Message::CallAnswered(user_id, candidate.user.priority_class.value()));
                if let Err(e) = self.ledger.record_contact(user_id, self.clock.now()) {
                    msg_warning!(Message::ContactRecordFailed(user_id, e.to_string()));
                }
            }
            CallOutcome::NotCompleted(status) => {
                msg_info!(Message::CallNotAnswered(user_id, candidate.user.priority_class.value(), status.clone()));
            }
        }
        msg_debug!(Message::CallResolved(handle.to_string()));

        CandidateState::Resolved(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_quotes_the_title() {
        assert_eq!(
            call_message("Pay rent"),
            "Hello User, the task \"Pay rent\" is due. Please complete it at your earliest convenience."
        );
    }

    #[test]
    fn report_counters() {
        let class = PriorityClass::try_from(0).unwrap();
        let entry = |state| CandidateReport {
            task_id: 1,
            user_id: 1,
            priority_class: class,
            state,
        };
        let report = EscalationReport {
            selected: 4,
            dropped: 1,
            candidates: vec![
                entry(CandidateState::Resolved(CallOutcome::Completed)),
                entry(CandidateState::Resolved(CallOutcome::NotCompleted("busy".into()))),
                entry(CandidateState::Failed("boom".into())),
            ],
        };
        assert_eq!(report.called(), 2);
        assert_eq!(report.answered(), 1);
        assert_eq!(report.skipped(), 0);
        assert_eq!(report.failed(), 2);
    }
}
