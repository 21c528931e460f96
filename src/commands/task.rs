use crate::{
    db::store::SqliteStore,
    libs::{
        clock::SystemClock,
        messages::Message,
        task::{parse_due_date, TaskPriority, TaskQuery, TaskStatus, DEFAULT_PAGE_LIMIT},
        view::View,
        workflow::TaskService,
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    command: TaskCommand,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// Create a task for a user
    Add {
        title: String,
        #[arg(short, long)]
        user: i64,
        #[arg(short, long)]
        description: String,
        /// RFC 3339, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD" (local time)
        #[arg(long)]
        due: String,
    },
    /// List live tasks, soonest due first
    List {
        #[arg(short, long)]
        user: Option<i64>,
        #[arg(short, long)]
        priority: Option<i64>,
        /// TODO, IN_PROGRESS or DONE
        #[arg(short, long)]
        status: Option<String>,
        /// Only tasks due at or before this date
        #[arg(long)]
        due_before: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },
    /// Move the due date of a task
    Update {
        id: i64,
        #[arg(long)]
        due: String,
    },
    /// Soft-delete a task and its subtasks
    Delete { id: i64 },
}

pub fn cmd(args: TaskArgs) -> Result<()> {
    let store = SqliteStore::new()?;
    let clock = SystemClock;
    let tasks = TaskService::new(&store, &clock);

    match args.command {
        TaskCommand::Add { title, user, description, due } => {
            let task = tasks.create(user, &title, &description, parse_due_date(&due)?)?;
            msg_success!(Message::TaskCreated(task.id.unwrap_or_default()));
        }
        TaskCommand::List {
            user,
            priority,
            status,
            due_before,
            page,
            limit,
        } => {
            let query = TaskQuery {
                user_id: user,
                priority: priority.map(TaskPriority::try_from).transpose()?,
                status: status.as_deref().map(str::parse::<TaskStatus>).transpose()?,
                due_before: due_before.as_deref().map(parse_due_date).transpose()?,
                page,
                limit,
            };
            let page = tasks.list(&query)?;
            if page.tasks.is_empty() {
                msg_info!(Message::TasksNotFound);
                return Ok(());
            }

            msg_print!(Message::TasksHeader, true);
            View::tasks(&page);
        }
        TaskCommand::Update { id, due } => {
            tasks.update_due_date(id, parse_due_date(&due)?)?;
            msg_success!(Message::TaskUpdated(id));
        }
        TaskCommand::Delete { id } => {
            tasks.soft_delete(id)?;
            msg_success!(Message::TaskDeleted(id));
        }
    }

    Ok(())
}
