use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::now;

/// Ordered mapping of snake_case flag keys to their values.
pub type Flags = IndexMap<String, Value>;

/// The primary behaviour selector of the wrapped `ra-aid` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationMode {
    Chat,
    Message,
    File,
    Server,
    RunScript,
    ExecuteTool,
    Agent,
}

impl OperationMode {
    pub const ALL: [OperationMode; 7] = [
        OperationMode::Chat,
        OperationMode::Message,
        OperationMode::File,
        OperationMode::Server,
        OperationMode::RunScript,
        OperationMode::ExecuteTool,
        OperationMode::Agent,
    ];

    /// The value stored in a preset's `operation_mode` field.
    pub fn as_str(self) -> &'static str {
        match self {
            OperationMode::Chat => "chat",
            OperationMode::Message => "message",
            OperationMode::File => "file",
            OperationMode::Server => "server",
            OperationMode::RunScript => "run_script",
            OperationMode::ExecuteTool => "execute_tool",
            OperationMode::Agent => "agent",
        }
    }

    /// The CLI flag (without dashes) that selects this mode.
    pub fn flag(self) -> &'static str {
        match self {
            OperationMode::Chat => "chat",
            OperationMode::Message => "message",
            OperationMode::File => "file",
            OperationMode::Server => "server",
            OperationMode::RunScript => "script-mode",
            OperationMode::ExecuteTool => "tool-mode",
            OperationMode::Agent => "agent-mode",
        }
    }
}

impl FromStr for OperationMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        OperationMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| Error::validation("operation mode", format!("unknown mode `{value}`")))
    }
}

impl Display for OperationMode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A named, persisted bundle of `ra-aid` configuration.
///
/// `command` is derived from `operation_mode` and `flags` whenever the preset
/// is saved; edits made in memory are not reflected until the next save.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub operation_mode: String,
    #[serde(default)]
    pub flags: Flags,
    #[serde(default = "now")]
    pub created_at: NaiveDateTime,
    #[serde(default = "now")]
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub command: String,
}

impl Preset {
    /// Creates a preset with no flags and fresh timestamps.
    pub fn new(name: impl Into<String>, operation_mode: impl Into<String>) -> Self {
        let timestamp = now();
        Self {
            name: name.into(),
            description: String::new(),
            operation_mode: operation_mode.into(),
            flags: Flags::new(),
            created_at: timestamp,
            updated_at: timestamp,
            command: String::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_flag(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.flags.insert(key.into(), value.into());
        self
    }

    /// Builds a validated preset from plain JSON data.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `name` or `operation_mode` is missing
    /// or blank, a field has the wrong type, or the name cannot be used as a
    /// storage key.
    pub fn from_value(value: Value) -> Result<Self> {
        let preset: Self =
            serde_json::from_value(value).map_err(|e| Error::validation("preset", e.to_string()))?;
        preset.validate()?;
        Ok(preset)
    }

    /// Same as [`Preset::from_value`] for a JSON object.
    ///
    /// # Errors
    ///
    /// See [`Preset::from_value`].
    pub fn from_map(data: Map<String, Value>) -> Result<Self> {
        Self::from_value(Value::Object(data))
    }

    /// # Errors
    ///
    /// Returns an error for an unusable name or a blank operation mode.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;

        if self.operation_mode.trim().is_empty() {
            return Err(Error::validation(
                "preset",
                format!("operation mode of `{}` may not be empty", self.name),
            ));
        }

        Ok(())
    }

    /// The parsed operation mode, or None for a mode the tool doesn't know.
    pub fn mode(&self) -> Option<OperationMode> {
        self.operation_mode.parse().ok()
    }

    /// Case-folded key used for the preset's file name.
    pub fn storage_key(&self) -> String {
        storage_key(&self.name)
    }

    /// Refreshes `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = now();
    }

    /// The preset as a JSON object, in file layout.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => unreachable!("a preset always serializes to a JSON object"),
        }
    }
}

impl Display for Preset {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        if self.description.is_empty() {
            write!(formatter, "{} [{}]", self.name, self.operation_mode)
        } else {
            write!(
                formatter,
                "{} [{}] ({})",
                self.name, self.operation_mode, self.description
            )
        }
    }
}

/// Rejects names that are empty or could escape the presets directory.
///
/// # Errors
///
/// Returns [`Error::InvalidPresetName`] for such names.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(Error::InvalidPresetName(name.to_string()));
    }

    Ok(())
}

/// Preset lookups ignore case: `CaseTest` and `casetest` share one file.
pub fn storage_key(name: &str) -> String {
    name.to_lowercase()
}
