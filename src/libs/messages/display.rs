//! Display implementation for duecall messages.
//!
//! All user-facing text lives here, so wording stays consistent between the
//! CLI, the job logs and the daemon.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === USER MESSAGES ===
            Message::UserRegistered(id, phone) => format!("User {} registered with phone {}", id, phone),
            Message::UsersHeader => "Users:".to_string(),
            Message::NoUsersFound => "No users registered yet".to_string(),

            // === TASK MESSAGES ===
            Message::TaskCreated(id) => format!("Task {} created", id),
            Message::TaskUpdated(id) => format!("Task {} updated", id),
            Message::TaskDeleted(id) => format!("Task {} and its subtasks deleted", id),
            Message::TasksHeader => "Tasks:".to_string(),
            Message::TasksNotFound => "Tasks not found".to_string(),
            Message::TaskStatusChanged(id, from, to) => format!("Task {} status {} -> {}", id, from, to),

            // === SUBTASK MESSAGES ===
            Message::SubtaskCreated(id, task_id) => format!("Subtask {} added to task {}", id, task_id),
            Message::SubtaskUpdated(id) => format!("Subtask {} updated", id),
            Message::SubtaskDeleted(id) => format!("Subtask {} deleted", id),
            Message::SubtasksHeader => "Subtasks:".to_string(),
            Message::NoSubtasksFound => "No subtasks found".to_string(),
            Message::SubtaskFilterRequired => "Pass --task or --user to list subtasks".to_string(),

            // === PRIORITY MESSAGES ===
            Message::PriorityUpdated(id, from, to) => format!("Task {} priority {} -> {}", id, from, to),
            Message::TaskOverdue(id, due) => format!("Task {} is overdue (due {}), priority unchanged", id, due),
            Message::PriorityUpdateFailed(id, error) => format!("Failed to update priority of task {}: {}", id, error),
            Message::PriorityRunSummary(scanned, updated, unchanged, overdue, failed) => format!(
                "Priority run: {} scanned, {} updated, {} unchanged, {} overdue, {} failed",
                scanned, updated, unchanged, overdue, failed
            ),

            // === ESCALATION MESSAGES ===
            Message::EscalationRunStarted(count) => format!("Escalating {} overdue task(s)", count),
            Message::NoOverdueTasks => "No overdue tasks".to_string(),
            Message::CandidateDropped(task_id, reason) => format!("Task {} dropped from escalation: {}", task_id, reason),
            Message::CandidateSkipped(user_id, class, last) => {
                format!("User {} (class {}) was contacted at {}, skipping", user_id, class, last)
            }
            Message::CallPlaced(user_id, class, title) => format!("Calling user {} (class {}) about '{}'", user_id, class, title),
            Message::CallQueued(sid, status) => format!("Call {} accepted by provider ({})", sid, status),
            Message::CallFailed(task_id, error) => format!("Call for task {} failed: {}", task_id, error),
            Message::CallAnswered(user_id, class) => format!("User {} (class {}) answered", user_id, class),
            Message::CallNotAnswered(user_id, class, status) => {
                format!("User {} (class {}) did not answer ({})", user_id, class, status)
            }
            Message::CallResolved(handle) => format!("Call {} resolved", handle),
            Message::ContactRecordFailed(user_id, error) => format!("Could not record contact for user {}: {}", user_id, error),
            Message::DryRunCall(phone, message) => format!("[dry run] would call {}: \"{}\"", phone, message),
            Message::GatewayNotConfigured => {
                "Call gateway is not configured, calls will only be logged. Run `duecall init` or set TWILIO_* variables".to_string()
            }
            Message::DryRunLedgerInMemory => "Dry run: answered calls are kept in memory and not saved to the contacts table".to_string(),
            Message::EscalationRunSummary(selected, called, answered, skipped, failed) => format!(
                "Escalation run: {} selected, {} called, {} answered, {} skipped, {} failed",
                selected, called, answered, skipped, failed
            ),

            // === JOB MESSAGES ===
            Message::JobRegistered(name, cadence) => format!("Job '{}' registered ({})", name, cadence),
            Message::JobScheduled(name, next) => format!("Job '{}' next run at {}", name, next),
            Message::JobStarted(name) => format!("Job '{}' started", name),
            Message::JobCompleted(name) => format!("Job '{}' completed", name),
            Message::JobFailed(name, error) => format!("Job '{}' failed: {}", name, error),
            Message::JobSkippedInFlight(name) => format!("Job '{}' is still running, trigger skipped", name),
            Message::JobHeldElsewhere(name) => format!("Job '{}' is running in another process, skipped", name),
            Message::LeaseLost(name) => format!("Lease of job '{}' was taken over by another process", name),
            Message::LeaseRenewFailed(name, error) => format!("Could not renew lease of job '{}': {}", name, error),
            Message::LeaseReleaseFailed(name, error) => format!("Could not release lease of job '{}': {}", name, error),

            // === DAEMON MESSAGES ===
            Message::DaemonStarted(pid) => format!("Scheduler running (PID: {}). Press Ctrl+C to stop", pid),
            Message::DaemonStopped => "Scheduler stopped".to_string(),
            Message::StalePidFile(pid) => format!("Found pid file of a previous run (PID: {}), replacing it", pid),
            Message::ReceivedSigterm => "Received SIGTERM, shutting down".to_string(),
            Message::ReceivedSigint => "Received SIGINT, shutting down".to_string(),
            Message::ReceivedCtrlC => "Received Ctrl+C, shutting down".to_string(),
            Message::SignalHandlerFailed(error) => format!("Failed to install signal handler: {}", error),

            // === CONFIG MESSAGES ===
            Message::ConfigSaved => "Configuration saved".to_string(),
            Message::ConfigModuleGateway => "Call gateway (Twilio)".to_string(),
            Message::ConfigModuleScheduler => "Scheduler".to_string(),
            Message::LedgerDatabase => "Database (survives restarts)".to_string(),
            Message::LedgerMemory => "Memory (forgotten on restart)".to_string(),
            Message::HourOutOfRange => "Hour must be between 0 and 23".to_string(),
            Message::MinuteOutOfRange => "Minute must be between 0 and 59".to_string(),

            // === PROMPTS ===
            Message::PromptSelectModules => "Select modules to configure".to_string(),
            Message::PromptAccountSid => "Enter the Twilio account SID".to_string(),
            Message::PromptAuthToken => "Enter the Twilio auth token".to_string(),
            Message::PromptFromNumber => "Enter the number calls are placed from".to_string(),
            Message::PromptGatewayApiUrl => "Enter the Twilio API URL".to_string(),
            Message::PromptContactLedger => "Where should contact times be kept".to_string(),
            Message::PromptCooldownHours => "Hours before an answered user may be called again".to_string(),
            Message::PromptPacingSecs => "Seconds to wait between calls".to_string(),
            Message::PromptPollTimeoutSecs => "Seconds to wait for a call outcome".to_string(),
            Message::PromptPriorityHour => "Hour of the daily priority run (0-23)".to_string(),
            Message::PromptPriorityMinute => "Minute of the daily priority run (0-59)".to_string(),
            Message::PromptEscalationMinute => "Minute past each hour for escalation (0-59)".to_string(),

            // === MIGRATION MESSAGES ===
            Message::MigrationsFound(count) => format!("Found {} pending database migrations", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationCompleted(version) => format!("✓ Migration v{} completed", version),
            Message::MigrationFailed(version, error) => format!("✗ Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All database migrations completed successfully".to_string(),
            Message::DatabaseVersion(version) => format!("Current database version: {}", version),
            Message::DatabaseUpToDate => "Database schema is up to date".to_string(),
            Message::DatabaseNeedsUpdate => "Database schema needs to be updated".to_string(),
            Message::MigrationHistory => "Migration history:".to_string(),
            Message::NothingToRollback => "Nothing to rollback".to_string(),
            Message::RollingBack(from, to) => format!("Rolling back from v{} to v{}", from, to),
            Message::RollbackCompleted(version) => format!("Rollback to v{} completed", version),
        };

        write!(f, "{}", text)
    }
}
