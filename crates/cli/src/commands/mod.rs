//! Subcommand handlers. Each handler builds the manager it needs from the
//! resolved [`StorageConfig`], performs one operation and prints the result.

pub mod model;
pub mod preset;

use log::debug;
use ra_aid_start_core::config::StorageConfig;
use ra_aid_start_core::error::Result;

use crate::cli_args::{Args, Command};

/// Resolves the storage configuration from the global options.
pub fn storage_config(args: &Args) -> StorageConfig {
    let config = StorageConfig::resolve(&args.storage_root);
    match &args.shell {
        Some(shell) => config.with_shell(shell.clone()),
        None => config,
    }
}

/// Runs the subcommand selected by `args`.
///
/// # Errors
///
/// Returns the error of the failed operation.
pub fn execute(args: &Args) -> Result<()> {
    let config = storage_config(args);
    debug!("Storage root: `{}`", config.root.display());

    match &args.command {
        Command::Preset(command) => preset::execute(&config, command),
        Command::Model(command) => model::execute(&config, command),
    }
}
