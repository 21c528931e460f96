//! Core library modules for duecall.
//!
//! - **Domain**: users, tasks, subtasks and their status rules
//! - **Jobs**: priority recalculation, overdue escalation and the cadence scheduler
//! - **Infrastructure**: configuration, clock, contact ledger, run leases, data storage, messaging
//! - **User Interface**: console tables
//!
//! ## Usage
//!
//! ```rust,no_run
//! use duecall::db::store::SqliteStore;
//! use duecall::libs::clock::SystemClock;
//! use duecall::libs::workflow::SubtaskService;
//!
//! let store = SqliteStore::new()?;
//! let subtask = SubtaskService::new(&store, &SystemClock).create(1)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod clock;
pub mod config;
pub mod contacts;
pub mod daemon;
pub mod data_storage;
pub mod engine;
pub mod error;
pub mod escalation;
pub mod jobs;
pub mod lease;
pub mod messages;
pub mod priority;
pub mod status;
pub mod store;
pub mod subtask;
pub mod task;
pub mod user;
pub mod view;
pub mod workflow;
