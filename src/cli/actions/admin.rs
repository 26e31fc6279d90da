use crate::{
    api::Reply,
    cli::{
        actions::{enter, print_location, report},
        globals::GlobalArgs,
    },
};
use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsersCommand {
    List,
    Get(i64),
    Delete(i64),
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub command: UsersCommand,
}

/// User management from the admin page.
///
/// # Errors
/// Returns an error if the backend refuses the call or cannot be reached.
pub async fn execute(args: Args) -> Result<()> {
    let context = args.globals.connect()?;
    if !enter(&context, "/admin")? {
        return Ok(());
    }

    match args.command {
        UsersCommand::List => {
            let reply = context.client.list_users().await?;
            report(&context, reply)
        }
        UsersCommand::Get(id) => match context.client.get_user(id).await? {
            Reply::Data(Some(user)) => report(&context, Reply::Data(user)),
            Reply::Data(None) => bail!("no user with id {id}"),
            Reply::Suppressed => {
                print_location(&context);
                Ok(())
            }
        },
        UsersCommand::Delete(id) => match context.client.delete_user(id).await? {
            Reply::Data(()) => {
                println!("deleted user {id}");
                Ok(())
            }
            Reply::Suppressed => {
                print_location(&context);
                Ok(())
            }
        },
    }
}
