//! Daily recomputation of task priority from the distance to the due date.
//!
//! | days until due | priority |
//! |----------------|----------|
//! | < 0 (overdue)  | unchanged |
//! | 0              | 0 |
//! | 1-2            | 1 |
//! | 3-4            | 2 |
//! | 5+             | 3 |
//!
//! Days are whole calendar days in the local time zone.

use crate::libs::clock::Clock;
use crate::libs::error::Result;
use crate::libs::messages::Message;
use crate::libs::store::RecordStore;
use crate::libs::task::{Task, TaskFilter, TaskPriority};
use crate::{msg_debug, msg_warning};
use chrono::{Local, NaiveDate};
use std::sync::Arc;

/// Priority for a task due on `due` as seen on `today`; `None` when overdue.
pub fn priority_for(due: NaiveDate, today: NaiveDate) -> Option<TaskPriority> {
    let days = (due - today).num_days();

    match days {
        d if d < 0 => None,
        0 => Some(TaskPriority::URGENT),
        1..=2 => Some(TaskPriority::HIGH),
        3..=4 => Some(TaskPriority::MEDIUM),
        _ => Some(TaskPriority::LOW),
    }
}

/// A task the run could not update, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityFailure {
    pub task_id: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriorityReport {
    pub scanned: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub overdue: usize,
    pub failures: Vec<PriorityFailure>,
}

pub struct PriorityRecalculator {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl PriorityRecalculator {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Recomputes the priority of every live task that is not done.
    ///
    /// Only a failing selection aborts the run; per-task failures are
    /// collected in the report.
    pub fn run(&self) -> Result<PriorityReport> {
        let today = self.clock.today();
        let tasks = self.store.find_live_tasks(&TaskFilter::Active)?;
        let mut report = PriorityReport {
            scanned: tasks.len(),
            ..PriorityReport::default()
        };

        for task in tasks {
            let Some(task_id) = task.id else { continue };

            match self.recalculate(task, today) {
                Ok(Outcome::Updated) => report.updated += 1,
                Ok(Outcome::Unchanged) => report.unchanged += 1,
                Ok(Outcome::Overdue) => report.overdue += 1,
                Err(e) => {
                    msg_warning!(Message::PriorityUpdateFailed(task_id, e.to_string()));
                    report.failures.push(PriorityFailure {
                        task_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    fn recalculate(&self, task: Task, today: NaiveDate) -> Result<Outcome> {
        let task_id = task.id.unwrap_or_default();
        let due = task.due_date.with_timezone(&Local).date_naive();

        let Some(priority) = priority_for(due, today) else {
            msg_debug!(Message::TaskOverdue(task_id, due.to_string()));
            return Ok(Outcome::Overdue);
        };

        if task.priority == priority {
            return Ok(Outcome::Unchanged);
        }

        msg_debug!(Message::PriorityUpdated(task_id, task.priority.value(), priority.value()));
        self.store.set_task_priority(task_id, priority)?;
        Ok(Outcome::Updated)
    }
}

enum Outcome {
    Updated,
    Unchanged,
    Overdue,
}
