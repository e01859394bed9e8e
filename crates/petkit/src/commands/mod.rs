//! Command handlers, one module per top-level subcommand.

pub mod actions;
pub mod api;
pub mod config_cmd;
pub mod control;
pub mod devices;
pub mod login;
pub mod pets;
pub mod status;

use petkit_core::PetkitClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an account-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &PetkitClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => login::handle(client, args, global).await,
        Command::Devices(args) => devices::handle(client, args, global).await,
        Command::Status(args) => status::handle(client, args, global).await,
        Command::Pets => pets::handle(client, global).await,
        Command::Control(args) => control::handle(client, args, global).await,
        Command::Setting(args) => control::handle_setting(client, args, global).await,
        Command::Api(args) => api::handle(client, args, global).await,
        // Actions, Config and Completions are handled before dispatch
        Command::Actions(_) | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
