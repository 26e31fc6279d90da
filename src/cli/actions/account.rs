use crate::{
    account,
    api::{RegisterForm, Reply},
    cli::{
        actions::{enter, print_json, print_location},
        globals::GlobalArgs,
    },
};
use anyhow::Result;
use secrecy::SecretString;
use serde_json::json;

#[derive(Debug)]
pub struct LoginArgs {
    pub globals: GlobalArgs,
    pub username: String,
    pub password: SecretString,
    pub redirect: String,
}

#[derive(Debug)]
pub struct RegisterArgs {
    pub globals: GlobalArgs,
    pub form: RegisterForm,
}

/// Signs in from the login page, then opens the page given by `--redirect`.
///
/// # Errors
/// Returns an error if the credentials are rejected or the session cannot be stored.
pub async fn login(args: LoginArgs) -> Result<()> {
    let context = args.globals.connect()?;
    if !enter(&context, "/login")? {
        return Ok(());
    }

    match account::sign_in(&context.client, &args.username, &args.password).await? {
        Reply::Data(_) => {
            let navigation = context.router.navigate(&args.redirect)?;
            println!("signed in, now at {}", navigation.location);
        }
        Reply::Suppressed => print_location(&context),
    }
    Ok(())
}

/// # Errors
/// Returns an error if the form is invalid or the backend refuses it.
pub async fn register(args: RegisterArgs) -> Result<()> {
    let context = args.globals.connect()?;
    if !enter(&context, "/register")? {
        return Ok(());
    }

    match account::sign_up(&context.client, &args.form).await? {
        Reply::Data(_) => {
            let navigation = context.router.navigate("/")?;
            println!("registered {}, now at {}", args.form.username, navigation.location);
        }
        Reply::Suppressed => print_location(&context),
    }
    Ok(())
}

/// # Errors
/// Returns an error if the session file cannot be written.
pub fn logout(globals: &GlobalArgs) -> Result<()> {
    let context = globals.connect()?;
    account::sign_out(&context.session)?;
    println!("signed out");
    Ok(())
}

/// Local session state next to what the server thinks of the token.
///
/// # Errors
/// Returns an error if the server cannot be reached.
pub async fn status(globals: &GlobalArgs) -> Result<()> {
    let context = globals.connect()?;
    enter(&context, "/")?;

    let Reply::Data(server) = context.client.check_logged_in().await? else {
        print_location(&context);
        return Ok(());
    };
    let local = context.session.snapshot();

    print_json(&json!({
        "session_file": globals.session_file,
        "logged_in": local.logged_in,
        "admin": local.admin,
        "server_logged_in": server,
    }))
}
