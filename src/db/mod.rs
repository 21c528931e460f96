//! Database layer for duecall.
//!
//! SQLite persistence for users, tasks, subtasks and contact recency, with a
//! versioned migration system bootstrapping the schema on open.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use duecall::db::store::SqliteStore;
//! use duecall::libs::store::RecordStore;
//! use duecall::libs::task::TaskFilter;
//!
//! let store = SqliteStore::new()?;
//! let active = store.find_live_tasks(&TaskFilter::Active)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Connection setup and migration bootstrap.
pub mod db;

/// Versioned schema migrations.
pub mod migrations;

/// Last answered call per user.
pub mod contacts;

/// Job run leases shared across processes.
pub mod leases;

/// Thread-safe store implementing the record store and contact ledger traits.
pub mod store;

pub mod subtasks;

/// Task rows, filters and pagination.
pub mod tasks;

pub mod users;
