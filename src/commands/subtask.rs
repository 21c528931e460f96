use crate::{
    db::store::SqliteStore,
    libs::{
        clock::SystemClock,
        messages::Message,
        subtask::{SubtaskFilter, SubtaskStatus},
        view::View,
        workflow::SubtaskService,
    },
    msg_bail_anyhow, msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct SubtaskArgs {
    #[command(subcommand)]
    command: SubtaskCommand,
}

#[derive(Debug, Subcommand)]
enum SubtaskCommand {
    /// Add an incomplete subtask to a task
    Add { task_id: i64 },
    /// List live subtasks of a task or of all tasks of a user
    List {
        #[arg(short, long, conflicts_with = "user")]
        task: Option<i64>,
        #[arg(short, long)]
        user: Option<i64>,
    },
    /// Mark a subtask complete
    Done { id: i64 },
    /// Mark a subtask incomplete again
    Undo { id: i64 },
    /// Soft-delete a subtask
    Delete { id: i64 },
}

pub fn cmd(args: SubtaskArgs) -> Result<()> {
    let store = SqliteStore::new()?;
    let clock = SystemClock;
    let subtasks = SubtaskService::new(&store, &clock);

    match args.command {
        SubtaskCommand::Add { task_id } => {
            let subtask = subtasks.create(task_id)?;
            msg_success!(Message::SubtaskCreated(subtask.id.unwrap_or_default(), task_id));
        }
        SubtaskCommand::List { task, user } => {
            let filter = match (task, user) {
                (Some(task_id), _) => SubtaskFilter::ByTask(task_id),
                (None, Some(user_id)) => SubtaskFilter::ByUser(user_id),
                (None, None) => msg_bail_anyhow!(Message::SubtaskFilterRequired),
            };

            let list = subtasks.list(filter)?;
            if list.is_empty() {
                msg_info!(Message::NoSubtasksFound);
                return Ok(());
            }

            msg_print!(Message::SubtasksHeader, true);
            View::subtasks(&list);
        }
        SubtaskCommand::Done { id } => {
            subtasks.update_status(id, SubtaskStatus::Complete)?;
            msg_success!(Message::SubtaskUpdated(id));
        }
        SubtaskCommand::Undo { id } => {
            subtasks.update_status(id, SubtaskStatus::Incomplete)?;
            msg_success!(Message::SubtaskUpdated(id));
        }
        SubtaskCommand::Delete { id } => {
            subtasks.soft_delete(id)?;
            msg_success!(Message::SubtaskDeleted(id));
        }
    }

    Ok(())
}
