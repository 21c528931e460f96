use crate::libs::subtask::{Subtask, SubtaskStatus};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

const INSERT_SUBTASK: &str = "INSERT INTO subtasks (task_id, status, deleted_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)";
const UPDATE_SUBTASK: &str = "UPDATE subtasks SET task_id = ?2, status = ?3, deleted_at = COALESCE(deleted_at, ?4), updated_at = ?5
    WHERE id = ?1 AND (deleted_at IS NULL OR ?4 IS NOT NULL)";
const SELECT_BY_ID: &str = "SELECT id, task_id, status, deleted_at, created_at, updated_at FROM subtasks WHERE id = ?1";
const SELECT_LIVE_BY_TASK: &str = "SELECT id, task_id, status, deleted_at, created_at, updated_at FROM subtasks
    WHERE task_id = ?1 AND deleted_at IS NULL ORDER BY id";
const SELECT_LIVE_BY_USER: &str = "SELECT s.id, s.task_id, s.status, s.deleted_at, s.created_at, s.updated_at
    FROM subtasks s JOIN tasks t ON t.id = s.task_id
    WHERE t.user_id = ?1 AND s.deleted_at IS NULL ORDER BY s.task_id, s.id";

impl ToSql for SubtaskStatus {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(*self)))
    }
}

impl FromSql for SubtaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        SubtaskStatus::try_from(value.as_i64()?).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

fn map_subtask(row: &Row) -> Result<Subtask> {
    Ok(Subtask {
        id: row.get(0)?,
        task_id: row.get(1)?,
        status: row.get(2)?,
        deleted_at: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub struct Subtasks<'a> {
    conn: &'a Connection,
}

impl<'a> Subtasks<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Subtasks { conn }
    }

    pub fn insert(&self, subtask: &Subtask, now: DateTime<Utc>) -> Result<i64> {
        self.conn
            .execute(INSERT_SUBTASK, params![subtask.task_id, subtask.status, subtask.deleted_at, now])?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, subtask: &Subtask, now: DateTime<Utc>) -> Result<usize> {
        self.conn
            .execute(UPDATE_SUBTASK, params![id, subtask.task_id, subtask.status, subtask.deleted_at, now])
    }

    pub fn get(&self, id: i64) -> Result<Option<Subtask>> {
        self.conn.query_row(SELECT_BY_ID, [id], map_subtask).optional()
    }

    pub fn fetch_live_by_task(&self, task_id: i64) -> Result<Vec<Subtask>> {
        let mut stmt = self.conn.prepare(SELECT_LIVE_BY_TASK)?;
        let subtask_iter = stmt.query_map([task_id], map_subtask)?;
        let mut subtasks = Vec::new();
        for subtask in subtask_iter {
            subtasks.push(subtask?);
        }

        Ok(subtasks)
    }

    /// Live subtasks across every task the user owns.
    pub fn fetch_live_by_user(&self, user_id: i64) -> Result<Vec<Subtask>> {
        let mut stmt = self.conn.prepare(SELECT_LIVE_BY_USER)?;
        let subtasks = stmt.query_map([user_id], map_subtask)?.collect::<Result<Vec<_>>>()?;

        Ok(subtasks)
    }
}
