use crate::cli::{actions::print_json, globals::GlobalArgs};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub path: String,
}

/// Runs the guard for `path` and prints where the user lands.
///
/// # Errors
/// Returns an error for unknown pages or redirect loops.
pub fn execute(args: &Args) -> Result<()> {
    let context = args.globals.connect()?;
    let navigation = context.router.navigate(&args.path)?;
    print_json(&navigation)
}
