use crate::{
    api::{ProfileUpdate, RegisterForm},
    cli::{
        actions::{
            Action,
            account::{LoginArgs, RegisterArgs},
            admin::{self, UsersCommand},
            navigate,
            profile::{DeleteArgs, UpdateArgs},
            recovery::{ForgotArgs, ResetArgs, VerifyArgs},
        },
        globals::GlobalArgs,
    },
};
use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};

fn optional(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_one::<String>(id).cloned()
}

fn required(matches: &ArgMatches, id: &str) -> Result<String> {
    optional(matches, id).with_context(|| format!("missing required argument: --{id}"))
}

fn secret(matches: &ArgMatches, id: &str) -> Result<SecretString> {
    required(matches, id).map(SecretString::from)
}

fn global_args(matches: &ArgMatches) -> Result<GlobalArgs> {
    let api_url = required(matches, "api-url")?;
    let session_file = matches.get_one::<String>("session-file").map(PathBuf::from);
    let timeout = matches
        .get_one::<u64>("timeout")
        .copied()
        .context("missing required argument: --timeout")?;

    Ok(GlobalArgs::new(
        api_url,
        session_file,
        Duration::from_secs(timeout),
    ))
}

fn users_command(matches: &ArgMatches) -> Result<UsersCommand> {
    let (name, sub) = matches.subcommand().context("missing users command")?;
    let id = || {
        sub.get_one::<i64>("id")
            .copied()
            .context("missing required argument: id")
    };

    match name {
        "list" => Ok(UsersCommand::List),
        "get" => Ok(UsersCommand::Get(id()?)),
        "delete" => Ok(UsersCommand::Delete(id()?)),
        other => Err(anyhow!("unknown users command: {other}")),
    }
}

/// Turns parsed arguments into the action to run.
///
/// # Errors
/// Returns an error if a required argument is missing or the subcommand is unknown.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let globals = global_args(matches)?;
    let (name, sub) = matches.subcommand().context("missing subcommand")?;

    let action = match name {
        "login" => Action::Login(LoginArgs {
            globals,
            username: required(sub, "username")?,
            password: secret(sub, "password")?,
            redirect: optional(sub, "redirect").unwrap_or_else(|| "/".to_string()),
        }),
        "register" => Action::Register(RegisterArgs {
            globals,
            form: RegisterForm {
                username: required(sub, "username")?,
                nickname: required(sub, "nickname")?,
                email: required(sub, "email")?,
                avatar_url: optional(sub, "avatar-url"),
                password: secret(sub, "password")?,
                confirm_password: secret(sub, "confirm-password")?,
            },
        }),
        "logout" => Action::Logout(globals),
        "status" => Action::Status(globals),
        "profile" => Action::Profile(globals),
        "update-profile" => Action::UpdateProfile(UpdateArgs {
            globals,
            update: ProfileUpdate {
                nickname: optional(sub, "nickname"),
                email: optional(sub, "email"),
                avatar_url: optional(sub, "avatar-url"),
            },
        }),
        "is-admin" => Action::IsAdmin(globals),
        "delete-account" => Action::DeleteAccount(DeleteArgs {
            globals,
            confirmed: sub.get_flag("yes"),
        }),
        "verify-identity" => Action::VerifyIdentity(VerifyArgs {
            globals,
            username: required(sub, "username")?,
            email: required(sub, "email")?,
        }),
        "reset-password" => Action::ResetPassword(ResetArgs {
            globals,
            user_id: sub
                .get_one::<i64>("user-id")
                .copied()
                .context("missing required argument: --user-id")?,
            reset_token: secret(sub, "reset-token")?,
            new_password: secret(sub, "new-password")?,
            confirm_password: secret(sub, "confirm-password")?,
        }),
        "forgot-password" => Action::ForgotPassword(ForgotArgs {
            globals,
            username: required(sub, "username")?,
            email: required(sub, "email")?,
            new_password: secret(sub, "new-password")?,
            confirm_password: secret(sub, "confirm-password")?,
        }),
        "navigate" => Action::Navigate(navigate::Args {
            globals,
            path: required(sub, "path")?,
        }),
        "users" => Action::Users(admin::Args {
            globals,
            command: users_command(sub)?,
        }),
        other => return Err(anyhow!("unknown command: {other}")),
    };

    Ok(action)
}
