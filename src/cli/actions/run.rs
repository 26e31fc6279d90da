use crate::cli::actions::{Action, account, admin, navigate, profile, recovery};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
// To add a new action, add a new `Action::*` variant and a corresponding `*_::execute` call here.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => account::login(args).await,
        Action::Register(args) => account::register(args).await,
        Action::Logout(globals) => account::logout(&globals),
        Action::Status(globals) => account::status(&globals).await,
        Action::Profile(globals) => profile::show(&globals).await,
        Action::UpdateProfile(args) => profile::update(args).await,
        Action::IsAdmin(globals) => profile::is_admin(&globals).await,
        Action::DeleteAccount(args) => profile::delete(args).await,
        Action::VerifyIdentity(args) => recovery::verify(args).await,
        Action::ResetPassword(args) => recovery::reset(args).await,
        Action::ForgotPassword(args) => recovery::forgot(args).await,
        Action::Navigate(args) => navigate::execute(&args),
        Action::Users(args) => admin::execute(args).await,
    }
}
