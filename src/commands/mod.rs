pub mod escalate;
pub mod init;
#[cfg(debug_assertions)]
pub mod migrations;
pub mod priority;
pub mod serve;
pub mod subtask;
pub mod task;
pub mod user;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Register and list users")]
    User(user::UserArgs),
    #[command(about = "Create, list, update and delete tasks")]
    Task(task::TaskArgs),
    #[command(about = "Manage subtasks; task status follows them")]
    Subtask(subtask::SubtaskArgs),
    #[command(about = "Recalculate task priorities from due dates now")]
    Priority,
    #[command(about = "Call users about overdue tasks now")]
    Escalate(escalate::EscalateArgs),
    #[command(about = "Run the daily priority and hourly escalation jobs until stopped")]
    Serve,
    #[cfg(debug_assertions)]
    #[command(about = "Inspect database migrations (debug builds only)")]
    Migrations(migrations::MigrationsArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::User(args) => user::cmd(args),
            Commands::Task(args) => task::cmd(args),
            Commands::Subtask(args) => subtask::cmd(args),
            Commands::Priority => priority::cmd(),
            Commands::Escalate(args) => escalate::cmd(args).await,
            Commands::Serve => serve::cmd().await,
            #[cfg(debug_assertions)]
            Commands::Migrations(args) => migrations::cmd(args),
        }
    }
}
