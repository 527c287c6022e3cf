//! Command dispatch: bridges CLI args -> console flows -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod zones;

use dnsdeck_core::Console;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a console-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    console: &Console,
    global: &GlobalOpts,
    profile: &str,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(console, args, global, profile).await,
        Command::Logout => {
            auth::logout(console);
            Ok(())
        }
        Command::Whoami => auth::whoami(console, global, profile),
        Command::Zones(args) => zones::handle(console, args, global, profile).await,
        // Config and Completions are handled before a console is built.
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need a console".into(),
        )),
    }
}
