use crate::{
    db::store::SqliteStore,
    libs::{messages::Message, store::RecordStore, user::PriorityClass, view::View, workflow::register_user},
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct UserArgs {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Debug, Subcommand)]
enum UserCommand {
    /// Register a user by phone number
    Add {
        /// Phone number with country code, e.g. +16414183307
        phone: String,
        /// Contact priority class, 0 (called first) to 2
        #[arg(short, long, default_value_t = 0)]
        class: i64,
    },
    List,
}

pub fn cmd(args: UserArgs) -> Result<()> {
    let store = SqliteStore::new()?;

    match args.command {
        UserCommand::Add { phone, class } => {
            let user = register_user(&store, &phone, PriorityClass::try_from(class)?)?;
            msg_success!(Message::UserRegistered(user.id.unwrap_or_default(), user.dial_string()));
        }
        UserCommand::List => {
            let users = store.list_users()?;
            if users.is_empty() {
                msg_info!(Message::NoUsersFound);
                return Ok(());
            }

            msg_print!(Message::UsersHeader, true);
            View::users(&users);
        }
    }

    Ok(())
}
