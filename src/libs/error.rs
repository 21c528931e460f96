//! Domain errors shared by the store, the gateway and the jobs.
//!
//! Library code returns [`Result`]; the command layer lifts these into
//! `anyhow::Error` at the edge.

use std::fmt;
use thiserror::Error;

/// Kind of record a lookup was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Task,
    Subtask,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::User => "User",
            Entity::Task => "Task",
            Entity::Subtask => "Subtask",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A user, task or subtask with the given id does not exist.
    #[error("{0} with ID {1} not found")]
    NotFound(Entity, i64),

    /// A value outside its allowed range or a mutation on a deleted record.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Placing a call or polling its outcome failed.
    #[error("Call gateway failure: {0}")]
    GatewayFailure(String),

    /// The record store could not read or write.
    #[error("Record store failure: {0}")]
    StoreFailure(String),
}

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::StoreFailure(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::GatewayFailure(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
