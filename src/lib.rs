//! # Duecall - task status aggregation and overdue call escalation
//!
//! Tracks tasks made of subtasks for registered users, keeps every task's
//! status and urgency current, and phones users about overdue work.
//!
//! ## Features
//!
//! - **Status Aggregation**: Task status is derived from its live subtasks on every subtask change
//! - **Priority Recalculation**: A daily job maps time-to-due-date onto urgency tiers
//! - **Escalation**: An hourly job calls users about overdue tasks, most urgent users first
//! - **Dedupe and Pacing**: Answered calls start a cooldown; calls are paced against the provider
//! - **Single-flight Jobs**: A slow run is never overlapped by the next trigger
//!
//! ## Usage
//!
//! ```rust,no_run
//! use duecall::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod db;
pub mod libs;
