use super::escalation::{CandidateState, EscalationReport};
use super::priority::PriorityReport;
use super::subtask::Subtask;
use super::task::{Task, TaskPage};
use super::user::User;
use crate::api::CallOutcome;
use chrono::{DateTime, Local, Utc};
use prettytable::{row, Table};

pub struct View {}

fn local(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn state_label(state: &CandidateState) -> String {
    match state {
        CandidateState::Selected => "selected".to_string(),
        CandidateState::Called(handle) | CandidateState::AwaitingOutcome(handle) => format!("pending {}", handle),
        CandidateState::Resolved(CallOutcome::Completed) => "answered".to_string(),
        CandidateState::Resolved(CallOutcome::NotCompleted(status)) => format!("not answered ({})", status),
        CandidateState::Skipped { last_contact } => format!("skipped, answered {}", local(*last_contact)),
        CandidateState::Failed(reason) => format!("failed: {}", reason),
    }
}

impl View {
    pub fn users(users: &[User]) {
        let mut table = Table::new();

        table.add_row(row!["ID", "PHONE", "PRIORITY CLASS", "CREATED"]);
        for user in users {
            table.add_row(row![
                user.id.unwrap_or(0),
                user.dial_string(),
                user.priority_class,
                user.created_at.map(local).unwrap_or_default()
            ]);
        }
        table.printstd();
    }

    pub fn tasks(page: &TaskPage) {
        Self::task_table(&page.tasks);
        println!("Page {} of {} ({} tasks)", page.page, page.total_pages().max(1), page.total);
    }

    pub fn task_table(tasks: &[Task]) {
        let mut table = Table::new();

        table.add_row(row!["ID", "USER", "TITLE", "DESCRIPTION", "DUE", "PRIORITY", "STATUS"]);
        for task in tasks {
            table.add_row(row![
                task.id.unwrap_or(0),
                task.user_id,
                task.title,
                task.description,
                local(task.due_date),
                task.priority,
                task.status
            ]);
        }
        table.printstd();
    }

    pub fn subtasks(subtasks: &[Subtask]) {
        let mut table = Table::new();

        table.add_row(row!["ID", "TASK ID", "STATUS", "UPDATED"]);
        for subtask in subtasks {
            let status = if subtask.status.is_complete() { "complete" } else { "incomplete" };
            table.add_row(row![
                subtask.id.unwrap_or(0),
                subtask.task_id,
                status,
                subtask.updated_at.map(local).unwrap_or_default()
            ]);
        }
        table.printstd();
    }

    pub fn priority_report(report: &PriorityReport) {
        let mut table = Table::new();

        table.add_row(row!["SCANNED", "UPDATED", "UNCHANGED", "OVERDUE", "FAILED"]);
        table.add_row(row![report.scanned, report.updated, report.unchanged, report.overdue, report.failures.len()]);
        table.printstd();

        if !report.failures.is_empty() {
            let mut failures = Table::new();
            failures.add_row(row!["TASK ID", "REASON"]);
            for failure in &report.failures {
                failures.add_row(row![failure.task_id, failure.reason]);
            }
            failures.printstd();
        }
    }

    pub fn escalation_report(report: &EscalationReport) {
        let mut table = Table::new();

        table.add_row(row!["#", "TASK ID", "USER ID", "CLASS", "RESULT"]);
        for (i, candidate) in report.candidates.iter().enumerate() {
            table.add_row(row![
                i + 1,
                candidate.task_id,
                candidate.user_id,
                candidate.priority_class,
                state_label(&candidate.state)
            ]);
        }
        table.printstd();
    }
}
