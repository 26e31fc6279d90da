pub mod account;
pub mod admin;
pub mod navigate;
pub mod profile;
pub mod recovery;

// Internal "interpreter" for `Action`.
// We keep the match in a separate module so `mod.rs` stays small as more actions are added.
mod run;

use crate::{
    api::Reply,
    cli::globals::{Context, GlobalArgs},
    router::{RouteName, by_name},
};
use anyhow::Result;
use serde::Serialize;

#[derive(Debug)]
pub enum Action {
    Login(account::LoginArgs),
    Register(account::RegisterArgs),
    Logout(GlobalArgs),
    Status(GlobalArgs),
    Profile(GlobalArgs),
    UpdateProfile(profile::UpdateArgs),
    IsAdmin(GlobalArgs),
    DeleteAccount(profile::DeleteArgs),
    VerifyIdentity(recovery::VerifyArgs),
    ResetPassword(recovery::ResetArgs),
    ForgotPassword(recovery::ForgotArgs),
    Navigate(navigate::Args),
    Users(admin::Args),
}

impl Action {
    // Convenience wrapper so call sites can do `action.execute().await`.
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

/// Opens the page at `path` through the guard. Returns `false` after printing
/// where the user ended up when the guard redirected.
fn enter(context: &Context, path: &str) -> Result<bool> {
    let navigation = context.router.navigate(path)?;
    if navigation.proceeded() {
        return Ok(true);
    }
    println!("redirected to {}", navigation.location);
    Ok(false)
}

/// A suppressed reply already moved the view; show where it went.
fn print_location(context: &Context) {
    let location = context
        .router
        .current()
        .unwrap_or_else(|| by_name(RouteName::Login).path.to_string());
    println!("redirected to {location}");
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report<T: Serialize>(context: &Context, reply: Reply<T>) -> Result<()> {
    match reply {
        Reply::Data(value) => print_json(&value),
        Reply::Suppressed => {
            print_location(context);
            Ok(())
        }
    }
}
