//! User, task and subtask mutations.
//!
//! Every subtask mutation ends by re-deriving the owning task's status in the
//! same call, so a caller never observes a task whose status disagrees with
//! its live subtasks.

use crate::libs::clock::Clock;
use crate::libs::error::{Entity, Error, Result};
use crate::libs::status::aggregate;
use crate::libs::store::RecordStore;
use crate::libs::subtask::{Subtask, SubtaskFilter, SubtaskStatus};
use crate::libs::task::{Task, TaskPage, TaskQuery};
use crate::libs::user::{PriorityClass, User};
use chrono::{DateTime, Utc};

/// Registers a user. Phone numbers are unique.
pub fn register_user(store: &dyn RecordStore, phone_number: &str, priority_class: PriorityClass) -> Result<User> {
    let user = User::new(phone_number, priority_class)?;

    if store.find_user_by_phone(&user.phone_number)?.is_some() {
        return Err(Error::invalid("User already exists with this phone number"));
    }

    let id = store.save_user(&user)?;
    store.find_user(id)?.ok_or(Error::NotFound(Entity::User, id))
}

pub struct TaskService<'a> {
    store: &'a dyn RecordStore,
    clock: &'a dyn Clock,
}

impl<'a> TaskService<'a> {
    pub fn new(store: &'a dyn RecordStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Creates a task for an existing user. New tasks start as `TODO` with priority 0.
    pub fn create(&self, user_id: i64, title: &str, description: &str, due_date: DateTime<Utc>) -> Result<Task> {
        self.store.find_user(user_id)?.ok_or(Error::NotFound(Entity::User, user_id))?;

        let task = Task::new(user_id, title, description, due_date)?;
        let id = self.store.save_task(&task)?;
        self.store.find_task(id)?.ok_or(Error::NotFound(Entity::Task, id))
    }

    pub fn list(&self, query: &TaskQuery) -> Result<TaskPage> {
        self.store.find_tasks_page(query)
    }

    /// Moves the due date of a live task.
    pub fn update_due_date(&self, task_id: i64, due_date: DateTime<Utc>) -> Result<Task> {
        let mut task = self.live_task(task_id)?;
        task.due_date = due_date;
        self.store.save_task(&task)?;
        Ok(task)
    }

    /// Soft-deletes a task together with its live subtasks.
    pub fn soft_delete(&self, task_id: i64) -> Result<Task> {
        let mut task = self.store.find_task(task_id)?.ok_or(Error::NotFound(Entity::Task, task_id))?;
        if let Some(deleted_at) = task.deleted_at {
            return Err(Error::invalid(format!("Task already deleted on {}", deleted_at)));
        }

        let now = self.clock.now();
        for mut subtask in self.store.find_live_subtasks_by_task(task_id)? {
            subtask.deleted_at = Some(now);
            self.store.save_subtask(&subtask)?;
        }

        task.soft_delete(now);
        self.store.save_task(&task)?;
        Ok(task)
    }

    fn live_task(&self, task_id: i64) -> Result<Task> {
        let task = self.store.find_task(task_id)?.ok_or(Error::NotFound(Entity::Task, task_id))?;
        match task.deleted_at {
            Some(deleted_at) => Err(Error::invalid(format!("Task was deleted on {}", deleted_at))),
            None => Ok(task),
        }
    }
}

pub struct SubtaskService<'a> {
    store: &'a dyn RecordStore,
    clock: &'a dyn Clock,
}

impl<'a> SubtaskService<'a> {
    pub fn new(store: &'a dyn RecordStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Adds an incomplete subtask to a live task.
    pub fn create(&self, task_id: i64) -> Result<Subtask> {
        let task = self.store.find_task(task_id)?.ok_or(Error::NotFound(Entity::Task, task_id))?;
        if let Some(deleted_at) = task.deleted_at {
            return Err(Error::invalid(format!("Task was deleted on {}", deleted_at)));
        }

        let id = self.store.save_subtask(&Subtask::new(task_id))?;
        aggregate(self.store, task_id)?;
        self.store.find_subtask(id)?.ok_or(Error::NotFound(Entity::Subtask, id))
    }

    pub fn update_status(&self, subtask_id: i64, status: SubtaskStatus) -> Result<Subtask> {
        let mut subtask = self.store.find_subtask(subtask_id)?.ok_or(Error::NotFound(Entity::Subtask, subtask_id))?;
        if let Some(deleted_at) = subtask.deleted_at {
            return Err(Error::invalid(format!("Subtask was deleted on {}", deleted_at)));
        }

        subtask.status = status;
        self.store.save_subtask(&subtask)?;
        aggregate(self.store, subtask.task_id)?;
        Ok(subtask)
    }

    pub fn soft_delete(&self, subtask_id: i64) -> Result<Subtask> {
        let mut subtask = self.store.find_subtask(subtask_id)?.ok_or(Error::NotFound(Entity::Subtask, subtask_id))?;
        if let Some(deleted_at) = subtask.deleted_at {
            return Err(Error::invalid(format!("Subtask already deleted on {}", deleted_at)));
        }

        subtask.deleted_at = Some(self.clock.now());
        self.store.save_subtask(&subtask)?;
        aggregate(self.store, subtask.task_id)?;
        Ok(subtask)
    }

    pub fn list(&self, filter: SubtaskFilter) -> Result<Vec<Subtask>> {
        match filter {
            SubtaskFilter::ByTask(task_id) => self.store.find_live_subtasks_by_task(task_id),
            SubtaskFilter::ByUser(user_id) => self.store.find_live_subtasks_by_user(user_id),
        }
    }
}
