//! SQLite-backed [`RecordStore`], [`ContactLedger`] and [`LeaseStore`].
//!
//! One connection guarded by a mutex; each save is a single statement.

use crate::db::contacts::Contacts;
use crate::db::db::Db;
use crate::db::leases::Leases;
use crate::db::subtasks::Subtasks;
use crate::db::tasks::Tasks;
use crate::db::users::Users;
use crate::libs::contacts::ContactLedger;
use crate::libs::error::{Entity, Error, Result};
use crate::libs::lease::LeaseStore;
use crate::libs::store::RecordStore;
use crate::libs::subtask::Subtask;
use crate::libs::task::{Task, TaskFilter, TaskPage, TaskPriority, TaskQuery, TaskStatus};
use crate::libs::user::User;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Store in the platform data directory.
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::from_db(Db::new()?))
    }

    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Ok(Self::from_db(Db::open(path)?))
    }

    pub fn from_db(db: Db) -> Self {
        SqliteStore { conn: Mutex::new(db.conn) }
    }
}

/// Tells a missing row apart from a refused undelete after an update touched nothing.
fn unchanged_row(entity: Entity, id: i64, exists: bool) -> Error {
    if exists {
        Error::invalid(format!("{} {} is deleted and cannot be restored", entity, id))
    } else {
        Error::NotFound(entity, id)
    }
}

impl RecordStore for SqliteStore {
    fn find_task(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.conn.lock();
        Ok(Tasks::new(&conn).get(id)?)
    }

    fn find_live_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let conn = self.conn.lock();
        Ok(Tasks::new(&conn).fetch(filter)?)
    }

    fn find_tasks_page(&self, query: &TaskQuery) -> Result<TaskPage> {
        let conn = self.conn.lock();
        Ok(Tasks::new(&conn).page(query)?)
    }

    fn save_task(&self, task: &Task) -> Result<i64> {
        let conn = self.conn.lock();
        let tasks = Tasks::new(&conn);
        let now = Utc::now();

        match task.id {
            None => Ok(tasks.insert(task, now)?),
            Some(id) => match tasks.update(id, task, now)? {
                0 => Err(unchanged_row(Entity::Task, id, tasks.get(id)?.is_some())),
                _ => Ok(id),
            },
        }
    }

    fn set_task_priority(&self, task_id: i64, priority: TaskPriority) -> Result<()> {
        let conn = self.conn.lock();
        let tasks = Tasks::new(&conn);
        match tasks.update_priority(task_id, priority, Utc::now())? {
            0 => Err(unchanged_row(Entity::Task, task_id, tasks.get(task_id)?.is_some())),
            _ => Ok(()),
        }
    }

    fn set_task_status(&self, task_id: i64, status: TaskStatus) -> Result<()> {
        let conn = self.conn.lock();
        let tasks = Tasks::new(&conn);
        match tasks.update_status(task_id, status, Utc::now())? {
            0 => Err(unchanged_row(Entity::Task, task_id, tasks.get(task_id)?.is_some())),
            _ => Ok(()),
        }
    }

    fn find_subtask(&self, id: i64) -> Result<Option<Subtask>> {
        let conn = self.conn.lock();
        Ok(Subtasks::new(&conn).get(id)?)
    }

    fn find_live_subtasks_by_task(&self, task_id: i64) -> Result<Vec<Subtask>> {
        let conn = self.conn.lock();
        Ok(Subtasks::new(&conn).fetch_live_by_task(task_id)?)
    }

    fn find_live_subtasks_by_user(&self, user_id: i64) -> Result<Vec<Subtask>> {
        let conn = self.conn.lock();
        Ok(Subtasks::new(&conn).fetch_live_by_user(user_id)?)
    }

    fn save_subtask(&self, subtask: &Subtask) -> Result<i64> {
        let conn = self.conn.lock();
        let subtasks = Subtasks::new(&conn);
        let now = Utc::now();

        match subtask.id {
            None => Ok(subtasks.insert(subtask, now)?),
            Some(id) => match subtasks.update(id, subtask, now)? {
                0 => Err(unchanged_row(Entity::Subtask, id, subtasks.get(id)?.is_some())),
                _ => Ok(id),
            },
        }
    }

    fn find_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn.lock();
        Ok(Users::new(&conn).get(id)?)
    }

    fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        Ok(Users::new(&conn).get_by_phone(phone_number)?)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock();
        Ok(Users::new(&conn).fetch_all()?)
    }

    fn save_user(&self, user: &User) -> Result<i64> {
        let conn = self.conn.lock();
        let users = Users::new(&conn);

        match user.id {
            None => Ok(users.insert(user, Utc::now())?),
            Some(id) => match users.update(id, user)? {
                0 => Err(Error::NotFound(Entity::User, id)),
                _ => Ok(id),
            },
        }
    }
}

impl ContactLedger for SqliteStore {
    fn last_contact(&self, user_id: i64) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn.lock();
        Ok(Contacts::new(&conn).get(user_id)?)
    }

    fn record_contact(&self, user_id: i64, at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock();
        Ok(Contacts::new(&conn).upsert(user_id, at)?)
    }
}

impl LeaseStore for SqliteStore {
    fn try_acquire_lease(&self, name: &str, holder: &str, now: DateTime<Utc>, expires_at: DateTime<Utc>) -> Result<bool> {
        let conn = self.conn.lock();
        Ok(Leases::new(&conn).claim(name, holder, now, expires_at)?)
    }

    fn renew_lease(&self, name: &str, holder: &str, expires_at: DateTime<Utc>) -> Result<bool> {
        let conn = self.conn.lock();
        Ok(Leases::new(&conn).renew(name, holder, expires_at)?)
    }

    fn release_lease(&self, name: &str, holder: &str) -> Result<()> {
        let conn = self.conn.lock();
        Ok(Leases::new(&conn).release(name, holder)?)
    }
}
