//! Command-line argument parsing.
//!
//! This module defines the command-line interface structure of the `ras`
//! binary using the `clap` crate.

use clap::{Parser, Subcommand};

/// Command-line arguments for the ra-aid-start CLI tool.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use ra_aid_start_cli::cli_args::Args;
///
/// let args = Args::parse_from(["ras", "preset", "list"]);
/// assert!(args.storage_root.is_none());
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(name = "ras", version, about = "Manage ra-aid presets and models")]
#[command(term_width = 0)] // Just to make testing across clap features easier
pub struct Args {
    /// Directory holding the `presets` and `models` storage.
    ///
    /// If not provided, `$RA_AID_START_HOME` is used, then `~/.ra-aid-start`.
    #[arg(long, short = 's', global = true)]
    pub storage_root: Option<String>,

    /// Shell used to run preset commands. Defaults to `/bin/sh`.
    #[arg(long, global = true)]
    pub shell: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage and run presets
    #[command(subcommand)]
    Preset(PresetCommand),

    /// Manage per-provider model lists
    #[command(subcommand)]
    Model(ModelCommand),
}

#[derive(Subcommand, Debug)]
pub enum PresetCommand {
    /// List all presets
    List,

    /// Show a preset and its command
    Show { name: String },

    /// Create a preset
    Create {
        name: String,

        /// Operation mode: chat, message, file, server, run_script,
        /// execute_tool or agent
        #[arg(long, short = 'm')]
        mode: String,

        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Flag in the format `key` or `key=value`, repeatable.
        ///
        /// # Examples
        /// ```bash
        /// ras preset create daily -m chat -f cowboy_mode -f temperature=0.7
        /// ```
        #[arg(long = "flag", short = 'f', action = clap::ArgAction::Append)]
        flags: Vec<String>,

        /// Replace an existing preset with the same name
        #[arg(long, action)]
        overwrite: bool,

        /// Save even if flag values look invalid
        #[arg(long, action)]
        force: bool,
    },

    /// Change the mode, description or flags of a preset
    Update {
        name: String,

        #[arg(long, short = 'm')]
        mode: Option<String>,

        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Flag to add or change, in the format `key` or `key=value`
        #[arg(long = "flag", short = 'f', action = clap::ArgAction::Append)]
        flags: Vec<String>,

        /// Flag key to remove
        #[arg(long, short = 'u', action = clap::ArgAction::Append)]
        unset: Vec<String>,

        /// Save even if flag values look invalid
        #[arg(long, action)]
        force: bool,
    },

    /// Rename a preset
    Rename { old_name: String, new_name: String },

    /// Delete a preset
    Delete { name: String },

    /// Run the command of a preset
    Run {
        name: String,

        /// Working directory for the command. Defaults to the current one.
        #[arg(long)]
        cwd: Option<String>,

        /// Run without first confirming
        #[arg(long, short = 'y', action)]
        yes: bool,

        /// Print the command but do not execute it
        #[arg(long, short = 'd', action)]
        dry_run: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModelCommand {
    /// List providers that have models
    Providers,

    /// List the models of a provider
    List { provider: String },

    /// Add a model to a provider
    Add {
        provider: String,
        name: String,

        #[arg(long, short = 'd')]
        description: Option<String>,

        #[arg(long)]
        context_window: Option<u64>,

        /// Make this the provider's default model
        #[arg(long, action)]
        default: bool,

        /// Any other model field, in the format `key=value`
        #[arg(long = "set", action = clap::ArgAction::Append)]
        fields: Vec<String>,
    },

    /// Change fields of a model, e.g. `--set is_default=true`
    Update {
        provider: String,
        name: String,

        #[arg(long = "set", action = clap::ArgAction::Append)]
        fields: Vec<String>,
    },

    /// Remove a model from a provider
    Remove { provider: String, name: String },

    /// Export models as JSON
    Export {
        /// Only export this provider
        #[arg(long, short = 'p')]
        provider: Option<String>,

        /// File to write. Prints to stdout if not provided.
        #[arg(long, short = 'o')]
        output: Option<String>,
    },

    /// Import models from a JSON export or a list of models
    Import {
        file: String,

        /// Provider for list entries that don't name one
        #[arg(long, short = 'p')]
        provider: Option<String>,

        /// Replace each imported provider's models instead of merging
        #[arg(long, action)]
        overwrite: bool,
    },

    /// Restore the built-in default models
    Restore {
        /// Only restore this provider
        #[arg(long, short = 'p')]
        provider: Option<String>,

        /// Restore without first confirming
        #[arg(long, short = 'y', action)]
        yes: bool,
    },
}
