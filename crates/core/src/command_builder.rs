//! Translation of presets into `ra-aid` command lines.
//!
//! [`CommandBuilder`] accumulates flags and renders them as one shell
//! command string. Flag names are stored without leading dashes; rendering
//! adds `-` for single-character names and `--` otherwise.
//!
//! # Examples
//!
//! ```
//! use ra_aid_start_core::command_builder::CommandBuilder;
//! use serde_json::json;
//!
//! let command = CommandBuilder::new()
//!     .add_flag("verbose", None)
//!     .add_flag("model", json!("gpt-4o"))
//!     .add_flag("no-backup", json!(false))
//!     .get_command_string();
//! assert_eq!(command, "ra-aid --verbose --model gpt-4o");
//! ```

use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, warn};
use serde_json::Value;

use crate::preset::Preset;

/// Executable invoked by generated commands
pub const BASE_COMMAND: &str = "ra-aid";

#[derive(Debug, Clone)]
pub struct CommandBuilder {
    base_command: String,
    flags: IndexMap<String, Option<Value>>,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_flag(flag: &str) -> &str {
    flag.trim_start_matches('-')
}

/// Renders a flag value as command-line text.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_object())
            .map(render_value)
            .join(" "),
        Value::Null => String::new(),
        // Numbers keep the exact text they were parsed from
        other => other.to_string(),
    }
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

impl CommandBuilder {
    pub fn new() -> Self {
        Self::with_base_command(BASE_COMMAND)
    }

    pub fn with_base_command(base_command: impl Into<String>) -> Self {
        Self {
            base_command: base_command.into(),
            flags: IndexMap::new(),
        }
    }

    pub fn base_command(&self) -> &str {
        &self.base_command
    }

    /// Adds or replaces a flag. `None` marks a flag that takes no value.
    ///
    /// Leading dashes are ignored, so `--x` and `x` refer to the same flag.
    pub fn add_flag(&mut self, flag: &str, value: impl Into<Option<Value>>) -> &mut Self {
        let name = normalize_flag(flag);
        if name.is_empty() {
            warn!("Ignoring flag `{flag}` with an empty name");
            return self;
        }

        self.flags.insert(name.to_string(), value.into());
        self
    }

    /// Removes a flag if present.
    pub fn remove_flag(&mut self, flag: &str) -> &mut Self {
        self.flags.shift_remove(normalize_flag(flag));
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.flags.clear();
        self
    }

    /// Renders the base command followed by every flag in insertion order.
    ///
    /// `null`/`true` values render as a bare flag, `false` values are left
    /// out, object values are skipped with a warning, anything else renders
    /// as `--flag value`, with the value wrapped in double quotes when it
    /// contains a space.
    pub fn get_command_string(&self) -> String {
        let mut parts = vec![self.base_command.clone()];

        for (flag, value) in &self.flags {
            let prefix = if flag.chars().count() > 1 { "--" } else { "-" };

            match value {
                None | Some(Value::Null | Value::Bool(true)) => {
                    parts.push(format!("{prefix}{flag}"));
                }
                Some(Value::Bool(false)) => {}
                Some(Value::Object(_)) => {
                    warn!("Skipping flag `{flag}`: object values can't be passed on the command line");
                }
                Some(value) => {
                    let text = render_value(value);
                    if text.contains(' ') && !is_quoted(&text) {
                        parts.push(format!("{prefix}{flag} \"{text}\""));
                    } else {
                        parts.push(format!("{prefix}{flag} {text}"));
                    }
                }
            }
        }

        parts.join(" ")
    }

    /// Builds the full command line for `preset`.
    ///
    /// Previously accumulated flags are discarded. The operation mode maps to
    /// its mode flag and every preset flag key is converted from snake_case
    /// to kebab-case. An unknown operation mode contributes no flag.
    pub fn build_command_from_preset(&mut self, preset: &Preset) -> String {
        self.flags.clear();

        match preset.mode() {
            Some(mode) => {
                self.add_flag(mode.flag(), None);
            }
            None => debug!(
                "Preset `{}` has unknown operation mode `{}`, no mode flag added",
                preset.name, preset.operation_mode
            ),
        }

        for (key, value) in &preset.flags {
            self.add_flag(&key.replace('_', "-"), value.clone());
        }

        self.get_command_string()
    }

    /// Shallow sanity check: the command must start with the base command.
    pub fn validate_command(&self, command: &str) -> bool {
        !command.is_empty() && command.trim().starts_with(self.base_command.as_str())
    }
}
