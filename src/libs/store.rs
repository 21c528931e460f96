//! Record store contract consumed by the aggregator and the periodic jobs.
//!
//! Reads return `Option`/`Vec` rather than erroring on absence; writes are
//! single-record upserts that return the row id. The SQLite implementation
//! lives in [`crate::db::store`].

use crate::libs::error::Result;
use crate::libs::subtask::Subtask;
use crate::libs::task::{Task, TaskFilter, TaskPage, TaskPriority, TaskQuery, TaskStatus};
use crate::libs::user::User;

pub trait RecordStore: Send + Sync {
    fn find_task(&self, id: i64) -> Result<Option<Task>>;

    fn find_live_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    fn find_tasks_page(&self, query: &TaskQuery) -> Result<TaskPage>;

    /// Inserts when `task.id` is `None`, updates otherwise.
    fn save_task(&self, task: &Task) -> Result<i64>;

    /// Writes only the priority of a live task, leaving its other columns as stored.
    fn set_task_priority(&self, task_id: i64, priority: TaskPriority) -> Result<()>;

    /// Writes only the status of a live task, leaving its other columns as stored.
    fn set_task_status(&self, task_id: i64, status: TaskStatus) -> Result<()>;

    fn find_subtask(&self, id: i64) -> Result<Option<Subtask>>;

    fn find_live_subtasks_by_task(&self, task_id: i64) -> Result<Vec<Subtask>>;

    fn find_live_subtasks_by_user(&self, user_id: i64) -> Result<Vec<Subtask>>;

    fn save_subtask(&self, subtask: &Subtask) -> Result<i64>;

    fn find_user(&self, id: i64) -> Result<Option<User>>;

    fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<User>>;

    fn list_users(&self) -> Result<Vec<User>>;

    fn save_user(&self, user: &User) -> Result<i64>;
}
