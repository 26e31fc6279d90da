use crate::cli::{actions::Action, commands, dispatch::handler, telemetry};
use anyhow::Result;

/// Start the CLI
///
/// # Errors
/// Returns an error if logging cannot be initialised or the arguments do not
/// form a valid action.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let verbosity = matches.get_one::<u8>("verbosity").map_or(0, |&v| v);
    let json = matches.get_flag("log-json");

    telemetry::init(Some(telemetry::level_from_verbosity(verbosity)), json)?;

    let action = handler(&matches)?;

    Ok(action)
}
