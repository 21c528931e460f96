use crate::libs::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum SubtaskStatus {
    #[default]
    Incomplete,
    Complete,
}

impl SubtaskStatus {
    pub fn is_complete(self) -> bool {
        matches!(self, SubtaskStatus::Complete)
    }
}

impl TryFrom<i64> for SubtaskStatus {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(SubtaskStatus::Incomplete),
            1 => Ok(SubtaskStatus::Complete),
            other => Err(Error::invalid(format!("subtask status must be 0 or 1, got {}", other))),
        }
    }
}

impl From<SubtaskStatus> for i64 {
    fn from(status: SubtaskStatus) -> Self {
        match status {
            SubtaskStatus::Incomplete => 0,
            SubtaskStatus::Complete => 1,
        }
    }
}

impl fmt::Display for SubtaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", i64::from(*self))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: Option<i64>,
    pub task_id: i64,
    pub status: SubtaskStatus,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Subtask {
    pub fn new(task_id: i64) -> Self {
        Subtask {
            id: None,
            task_id,
            status: SubtaskStatus::Incomplete,
            deleted_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Scopes for listing live subtasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtaskFilter {
    ByTask(i64),
    ByUser(i64),
}
