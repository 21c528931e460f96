use crate::libs::task::{Task, TaskFilter, TaskPage, TaskPriority, TaskQuery, TaskStatus};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result, Row};

const TASK_COLUMNS: &str = "id, user_id, title, description, due_date, priority, status, deleted_at, created_at, updated_at";
const INSERT_TASK: &str = "INSERT INTO tasks (user_id, title, description, due_date, priority, status, deleted_at, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)";
// A set deleted_at is never cleared: the row only matches while it is live or the new value is set too.
const UPDATE_TASK: &str = "UPDATE tasks SET user_id = ?2, title = ?3, description = ?4, due_date = ?5, priority = ?6, status = ?7,
    deleted_at = COALESCE(deleted_at, ?8), updated_at = ?9
    WHERE id = ?1 AND (deleted_at IS NULL OR ?8 IS NOT NULL)";
const UPDATE_PRIORITY: &str = "UPDATE tasks SET priority = ?2, updated_at = ?3 WHERE id = ?1 AND deleted_at IS NULL";
const UPDATE_STATUS: &str = "UPDATE tasks SET status = ?2, updated_at = ?3 WHERE id = ?1 AND deleted_at IS NULL";
const WHERE_LIVE: &str = "WHERE deleted_at IS NULL";
const AND_OPEN: &str = "AND status IN ('TODO', 'IN_PROGRESS')";

impl ToSql for TaskStatus {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for TaskPriority {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(*self)))
    }
}

impl FromSql for TaskPriority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        TaskPriority::try_from(value.as_i64()?).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

fn map_task(row: &Row) -> Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        due_date: row.get(4)?,
        priority: row.get(5)?,
        status: row.get(6)?,
        deleted_at: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Queries over the `tasks` table on a borrowed connection.
pub struct Tasks<'a> {
    conn: &'a Connection,
}

impl<'a> Tasks<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Tasks { conn }
    }

    pub fn insert(&self, task: &Task, now: DateTime<Utc>) -> Result<i64> {
        self.conn.execute(
            INSERT_TASK,
            params![task.user_id, task.title, task.description, task.due_date, task.priority, task.status, task.deleted_at, now],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Returns the number of rows changed; 0 means missing or an attempt to undelete.
    pub fn update(&self, id: i64, task: &Task, now: DateTime<Utc>) -> Result<usize> {
        self.conn.execute(
            UPDATE_TASK,
            params![id, task.user_id, task.title, task.description, task.due_date, task.priority, task.status, task.deleted_at, now],
        )
    }

    /// Touches only the priority column of a live task; returns the rows changed.
    pub fn update_priority(&self, id: i64, priority: TaskPriority, now: DateTime<Utc>) -> Result<usize> {
        self.conn.execute(UPDATE_PRIORITY, params![id, priority, now])
    }

    /// Touches only the status column of a live task; returns the rows changed.
    pub fn update_status(&self, id: i64, status: TaskStatus, now: DateTime<Utc>) -> Result<usize> {
        self.conn.execute(UPDATE_STATUS, params![id, status, now])
    }

    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        self.conn
            .query_row(&format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS), [id], map_task)
            .optional()
    }

    pub fn fetch(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let (sql, params): (String, Vec<Box<dyn ToSql>>) = match filter {
            TaskFilter::All => (format!("SELECT {} FROM tasks {} ORDER BY id", TASK_COLUMNS, WHERE_LIVE), vec![]),
            TaskFilter::Active => (format!("SELECT {} FROM tasks {} {} ORDER BY id", TASK_COLUMNS, WHERE_LIVE, AND_OPEN), vec![]),
            TaskFilter::Overdue(now) => (
                format!("SELECT {} FROM tasks {} {} AND due_date < ?1 ORDER BY due_date, id", TASK_COLUMNS, WHERE_LIVE, AND_OPEN),
                vec![Box::new(*now)],
            ),
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let task_iter = stmt.query_map(params_from_iter(params.iter()), map_task)?;
        let mut tasks = Vec::new();
        for task in task_iter {
            tasks.push(task?);
        }

        Ok(tasks)
    }

    /// One page of live tasks matching `query`, soonest due first.
    pub fn page(&self, query: &TaskQuery) -> Result<TaskPage> {
        let mut clauses = vec!["deleted_at IS NULL".to_string()];
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(user_id) = query.user_id {
            params.push(Box::new(user_id));
            clauses.push(format!("user_id = ?{}", params.len()));
        }
        if let Some(priority) = query.priority {
            params.push(Box::new(priority));
            clauses.push(format!("priority = ?{}", params.len()));
        }
        if let Some(status) = query.status {
            params.push(Box::new(status));
            clauses.push(format!("status = ?{}", params.len()));
        }
        if let Some(due_before) = query.due_before {
            params.push(Box::new(due_before));
            clauses.push(format!("due_date <= ?{}", params.len()));
        }

        let where_clause = clauses.join(" AND ");
        let total: u32 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM tasks WHERE {}", where_clause),
            params_from_iter(params.iter()),
            |row| row.get(0),
        )?;

        let limit = query.limit.max(1);
        let sql = format!(
            "SELECT {} FROM tasks WHERE {} ORDER BY due_date, id LIMIT {} OFFSET {}",
            TASK_COLUMNS,
            where_clause,
            limit,
            query.offset()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params_from_iter(params.iter()), map_task)?
            .collect::<Result<Vec<_>>>()?;

        Ok(TaskPage {
            tasks,
            total,
            page: query.page.max(1),
            limit,
        })
    }
}
