use crate::{
    account,
    api::{Reply, ResetGrant},
    cli::{
        actions::{enter, print_location, report},
        globals::GlobalArgs,
    },
};
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub struct VerifyArgs {
    pub globals: GlobalArgs,
    pub username: String,
    pub email: String,
}

#[derive(Debug)]
pub struct ResetArgs {
    pub globals: GlobalArgs,
    pub user_id: i64,
    pub reset_token: SecretString,
    pub new_password: SecretString,
    pub confirm_password: SecretString,
}

#[derive(Debug)]
pub struct ForgotArgs {
    pub globals: GlobalArgs,
    pub username: String,
    pub email: String,
    pub new_password: SecretString,
    pub confirm_password: SecretString,
}

/// Prints the reset grant so it can be passed to `reset-password`.
///
/// # Errors
/// Returns an error if the username and email do not match.
pub async fn verify(args: VerifyArgs) -> Result<()> {
    let context = args.globals.connect()?;
    if !enter(&context, "/forgot-password")? {
        return Ok(());
    }
    let reply = account::verify_identity(&context.client, &args.username, &args.email).await?;
    report(&context, reply)
}

/// # Errors
/// Returns an error if the passwords differ or the grant is no longer valid.
pub async fn reset(args: ResetArgs) -> Result<()> {
    let context = args.globals.connect()?;
    if !enter(&context, "/forgot-password")? {
        return Ok(());
    }

    let grant = ResetGrant {
        user_id: args.user_id,
        reset_token: args.reset_token.expose_secret().to_string(),
    };
    let reply = account::reset_password(
        &context.client,
        &grant,
        &args.new_password,
        &args.confirm_password,
    )
    .await?;
    finish(&context, reply)
}

/// # Errors
/// See [`verify`] and [`reset`].
pub async fn forgot(args: ForgotArgs) -> Result<()> {
    let context = args.globals.connect()?;
    if !enter(&context, "/forgot-password")? {
        return Ok(());
    }

    let reply = account::recover_password(
        &context.client,
        &args.username,
        &args.email,
        &args.new_password,
        &args.confirm_password,
    )
    .await?;
    finish(&context, reply)
}

// A successful reset sends the user back to sign in with the new password.
fn finish(context: &crate::cli::globals::Context, reply: Reply<String>) -> Result<()> {
    match reply {
        Reply::Data(message) => {
            println!("{message}");
            let navigation = context.router.navigate("/login")?;
            println!("now at {}", navigation.location);
        }
        Reply::Suppressed => print_location(context),
    }
    Ok(())
}
