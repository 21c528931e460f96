//! Task status derived from the task's live subtasks.
//!
//! A task's status is never set directly. Every subtask mutation re-derives it:
//!
//! - no live subtasks, or none complete: `TODO`
//! - some but not all complete: `IN_PROGRESS`
//! - all complete: `DONE`

use crate::libs::error::{Entity, Error, Result};
use crate::libs::messages::Message;
use crate::libs::store::RecordStore;
use crate::libs::subtask::Subtask;
use crate::libs::task::TaskStatus;
use crate::msg_debug;

/// Status implied by a set of live subtasks.
pub fn derive_status(subtasks: &[Subtask]) -> TaskStatus {
    let completed = subtasks.iter().filter(|s| s.status.is_complete()).count();

    match completed {
        0 => TaskStatus::Todo,
        n if n == subtasks.len() => TaskStatus::Done,
        _ => TaskStatus::InProgress,
    }
}

/// Re-derives and persists the status of `task_id`.
///
/// The task is written only when its status actually changes. Returns the
/// status the task holds afterwards.
pub fn aggregate(store: &dyn RecordStore, task_id: i64) -> Result<TaskStatus> {
    let task = store.find_task(task_id)?.ok_or(Error::NotFound(Entity::Task, task_id))?;
    let subtasks = store.find_live_subtasks_by_task(task_id)?;
    let status = derive_status(&subtasks);

    if task.status != status {
        msg_debug!(Message::TaskStatusChanged(task_id, task.status.to_string(), status.to_string()));
        store.set_task_status(task_id, status)?;
    }

    Ok(status)
}
