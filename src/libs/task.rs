use crate::libs::error::{Error, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Derived completion state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }

    /// Statuses that still need attention and may be escalated.
    pub fn is_open(&self) -> bool {
        !matches!(self, TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            other => Err(Error::invalid(format!("unknown task status '{}'", other))),
        }
    }
}

/// Urgency tier of a task, 0 (most urgent) to 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TaskPriority(u8);

impl TaskPriority {
    pub const MAX: u8 = 3;

    pub const URGENT: TaskPriority = TaskPriority(0);
    pub const HIGH: TaskPriority = TaskPriority(1);
    pub const MEDIUM: TaskPriority = TaskPriority(2);
    pub const LOW: TaskPriority = TaskPriority(3);

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for TaskPriority {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        if (0..=Self::MAX as i64).contains(&value) {
            Ok(TaskPriority(value as u8))
        } else {
            Err(Error::invalid(format!("task priority must be between 0 and {}, got {}", Self::MAX, value)))
        }
    }
}

impl From<TaskPriority> for i64 {
    fn from(priority: TaskPriority) -> Self {
        priority.0 as i64
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<i64>,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Builds a new, unsaved task. Title and description are required.
    pub fn new(user_id: i64, title: &str, description: &str, due_date: DateTime<Utc>) -> Result<Self> {
        if title.trim().is_empty() || description.trim().is_empty() {
            return Err(Error::invalid("title, description, and due date are required"));
        }

        Ok(Task {
            id: None,
            user_id,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            due_date,
            priority: TaskPriority::default(),
            status: TaskStatus::Todo,
            deleted_at: None,
            created_at: None,
            updated_at: None,
        })
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Live, not done and due strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_live() && self.status.is_open() && self.due_date < now
    }

    /// Marks the task deleted. A task that is already deleted keeps its first timestamp.
    pub fn soft_delete(&mut self, at: DateTime<Utc>) {
        self.deleted_at.get_or_insert(at);
    }
}

/// Selections the jobs run against live tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskFilter {
    /// Every live task.
    All,
    /// Live tasks that are not done.
    Active,
    /// Live, not done, due strictly before the given instant; ordered by due date.
    Overdue(DateTime<Utc>),
}

pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Paginated task listing with optional filters.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    pub user_id: Option<i64>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    /// Only tasks due at or before this instant.
    pub due_before: Option<DateTime<Utc>>,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            priority: None,
            status: None,
            due_before: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl TaskQuery {
    /// Rows to skip; saturates instead of overflowing on absurd page numbers.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1).saturating_mul(i64::from(self.limit.max(1)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub total: u32,
    pub page: u32,
    pub limit: u32,
}

impl TaskPage {
    pub fn total_pages(&self) -> u32 {
        let limit = self.limit.max(1);
        self.total.div_ceil(limit)
    }
}

/// Parses a due date given on the command line.
///
/// Accepts RFC 3339 (`2024-05-01T17:00:00Z`), local `YYYY-MM-DD HH:MM`, or a
/// bare `YYYY-MM-DD`, which means the start of that day in local time.
pub fn parse_due_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = if let Ok(ndt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        ndt
    } else if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        date.and_time(NaiveTime::MIN)
    } else {
        return Err(Error::invalid(format!("cannot parse due date '{}'", input)));
    };

    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| Error::invalid(format!("'{}' does not exist in the local time zone", input)))
}
