use crate::{
    account,
    api::{ProfileUpdate, Reply, parse_flag},
    cli::{
        actions::{enter, print_location, report},
        globals::GlobalArgs,
    },
};
use anyhow::{Result, bail};
use tracing::debug;

#[derive(Debug)]
pub struct UpdateArgs {
    pub globals: GlobalArgs,
    pub update: ProfileUpdate,
}

#[derive(Debug)]
pub struct DeleteArgs {
    pub globals: GlobalArgs,
    pub confirmed: bool,
}

/// # Errors
/// Returns an error if the profile cannot be fetched.
pub async fn show(globals: &GlobalArgs) -> Result<()> {
    let context = globals.connect()?;
    if !enter(&context, "/user")? {
        return Ok(());
    }
    let reply = context.client.get_profile().await?;
    report(&context, reply)
}

/// # Errors
/// Returns an error when no field is given, the email is malformed or the backend refuses.
pub async fn update(args: UpdateArgs) -> Result<()> {
    if args.update.is_empty() {
        bail!("nothing to update: pass --nickname, --email or --avatar-url");
    }
    if let Some(email) = &args.update.email
        && !account::valid_email(email)
    {
        bail!("invalid email address: {email}");
    }

    let context = args.globals.connect()?;
    if !enter(&context, "/user")? {
        return Ok(());
    }
    let reply = context.client.update_profile(&args.update).await?;
    report(&context, reply)
}

/// Prints the server's answer verbatim and refreshes the cached admin flag.
///
/// # Errors
/// Returns an error if the server cannot be reached or the session cannot be written.
pub async fn is_admin(globals: &GlobalArgs) -> Result<()> {
    let context = globals.connect()?;
    if !enter(&context, "/user")? {
        return Ok(());
    }

    let Reply::Data(text) = context.client.check_is_admin().await? else {
        print_location(&context);
        return Ok(());
    };
    if let Some(admin) = parse_flag(&text) {
        context.session.set_admin(admin)?;
        debug!("admin flag refreshed: {admin}");
    }
    println!("{text}");
    Ok(())
}

/// # Errors
/// Returns an error without `--yes`, or when the backend refuses the deletion.
pub async fn delete(args: DeleteArgs) -> Result<()> {
    let context = args.globals.connect()?;
    if !enter(&context, "/delete-account")? {
        return Ok(());
    }
    if !args.confirmed {
        bail!("refusing to delete the account without --yes");
    }

    match account::close_account(&context.client).await? {
        Reply::Data(message) => {
            println!("{message}");
            context.router.navigate("/")?;
        }
        Reply::Suppressed => print_location(&context),
    }
    Ok(())
}
