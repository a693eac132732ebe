//! ra-aid-start CLI Library
//!
//! This crate provides the command-line interface for ra-aid-start. Every
//! core preset and model operation is exposed as a non-interactive
//! subcommand of the `ras` binary.
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`arguments`]: Parsing of `key=value` flag arguments into JSON values
//! - [`commands`]: Subcommand handlers for presets and models
//! - [`output`]: Colored output, confirmation prompt and name suggestions
//!
//! # Examples
//!
//! ```bash
//! # Create a preset and look at its command
//! ras preset create daily --mode chat -f cowboy_mode -f temperature=0.7
//! ras preset show daily
//!
//! # Print the command without running it
//! ras preset run daily --dry-run
//!
//! # Manage models
//! ras model list Anthropic
//! ras model update Anthropic claude-3-haiku-20240307 --set is_default=true
//! ras model export --output ~/models.json
//! ```

pub mod arguments;
pub mod cli_args;
pub mod commands;
pub mod output;
