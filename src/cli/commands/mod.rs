use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::{
        ValueParser,
        styling::{AnsiColor, Effects, Styles},
    },
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>()
            && parsed <= 5
        {
            return Ok(parsed);
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

fn password_arg(name: &'static str, long: &'static str, env: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(long)
        .help(help)
        .env(env)
        .hide_env_values(true)
        .required(true)
}

fn user_id_arg() -> Arg {
    Arg::new("id")
        .help("User id")
        .required(true)
        .value_parser(clap::value_parser!(i64))
}

fn global_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Base URL of the user service")
                .default_value(crate::api::DEFAULT_BASE_URL)
                .env("GUDUCAT_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("session-file")
                .long("session-file")
                .help("Where the session is kept (default: ~/.guducat/session.json)")
                .env("GUDUCAT_SESSION_FILE")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Request timeout in seconds")
                .default_value("10")
                .env("GUDUCAT_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .help("Emit logs as JSON lines")
                .env("GUDUCAT_LOG_JSON")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("GUDUCAT_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}

fn account_commands() -> Vec<Command> {
    vec![
        Command::new("login")
            .about("Sign in and cache the session")
            .arg(
                Arg::new("username")
                    .short('u')
                    .long("username")
                    .help("Username or email")
                    .env("GUDUCAT_USERNAME")
                    .required(true),
            )
            .arg(password_arg(
                "password",
                "password",
                "GUDUCAT_PASSWORD",
                "Account password",
            ))
            .arg(
                Arg::new("redirect")
                    .long("redirect")
                    .help("Page to open after signing in")
                    .default_value("/"),
            ),
        Command::new("register")
            .about("Create an account and sign in")
            .arg(Arg::new("username").long("username").required(true))
            .arg(Arg::new("nickname").long("nickname").required(true))
            .arg(Arg::new("email").long("email").required(true))
            .arg(Arg::new("avatar-url").long("avatar-url"))
            .arg(password_arg(
                "password",
                "password",
                "GUDUCAT_PASSWORD",
                "Account password",
            ))
            .arg(password_arg(
                "confirm-password",
                "confirm-password",
                "GUDUCAT_CONFIRM_PASSWORD",
                "Repeat the password",
            )),
        Command::new("logout").about("Forget the cached session"),
        Command::new("status").about("Show local and server-side login state"),
    ]
}

fn profile_commands() -> Vec<Command> {
    vec![
        Command::new("profile").about("Show the signed-in user's profile"),
        Command::new("update-profile")
            .about("Change nickname, email or avatar")
            .arg(Arg::new("nickname").long("nickname"))
            .arg(Arg::new("email").long("email"))
            .arg(Arg::new("avatar-url").long("avatar-url")),
        Command::new("is-admin").about("Ask the server whether the session has the admin role"),
        Command::new("delete-account")
            .about("Permanently delete the signed-in account")
            .arg(
                Arg::new("yes")
                    .long("yes")
                    .help("Confirm the deletion")
                    .action(ArgAction::SetTrue),
            ),
    ]
}

fn recovery_commands() -> Vec<Command> {
    vec![
        Command::new("verify-identity")
            .about("Prove username and email belong together; prints a reset grant")
            .arg(Arg::new("username").long("username").required(true))
            .arg(Arg::new("email").long("email").required(true)),
        Command::new("reset-password")
            .about("Set a new password using a reset grant")
            .arg(
                Arg::new("user-id")
                    .long("user-id")
                    .required(true)
                    .value_parser(clap::value_parser!(i64)),
            )
            .arg(password_arg(
                "reset-token",
                "reset-token",
                "GUDUCAT_RESET_TOKEN",
                "Token from verify-identity",
            ))
            .arg(password_arg(
                "new-password",
                "new-password",
                "GUDUCAT_NEW_PASSWORD",
                "New password",
            ))
            .arg(password_arg(
                "confirm-password",
                "confirm-password",
                "GUDUCAT_CONFIRM_PASSWORD",
                "Repeat the new password",
            )),
        Command::new("forgot-password")
            .about("Verify identity and reset the password in one step")
            .arg(Arg::new("username").long("username").required(true))
            .arg(Arg::new("email").long("email").required(true))
            .arg(password_arg(
                "new-password",
                "new-password",
                "GUDUCAT_NEW_PASSWORD",
                "New password",
            ))
            .arg(password_arg(
                "confirm-password",
                "confirm-password",
                "GUDUCAT_CONFIRM_PASSWORD",
                "Repeat the new password",
            )),
    ]
}

fn admin_commands() -> Command {
    Command::new("users")
        .about("Manage users (admin only)")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List all users"))
        .subcommand(Command::new("get").about("Show one user").arg(user_id_arg()))
        .subcommand(Command::new("delete").about("Delete one user").arg(user_id_arg()))
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("guducat")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommands(account_commands())
        .subcommands(profile_commands())
        .subcommands(recovery_commands())
        .subcommand(admin_commands())
        .subcommand(
            Command::new("navigate")
                .about("Open a page through the navigation guard")
                .arg(Arg::new("path").help("Page path, e.g. /user").required(true)),
        );

    global_args(command)
}
