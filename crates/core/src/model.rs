use std::fmt::{Display, Formatter};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// `created_by` value for catalog and imported records
pub const CREATED_BY_SYSTEM: &str = "system";
/// `created_by` value for models added by the user
pub const CREATED_BY_USER: &str = "user";

fn default_true() -> bool {
    true
}

fn default_created_by() -> String {
    CREATED_BY_SYSTEM.to_string()
}

pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Metadata for one LLM model offered by a provider.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Model {
    pub name: String,
    pub provider: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recommended_for: Vec<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_true")]
    pub supports_temperature: bool,
    #[serde(default)]
    pub context_window: Option<u64>,
    #[serde(default = "default_created_by")]
    pub created_by: String,
    #[serde(default = "now")]
    pub created_at: NaiveDateTime,
}

impl Model {
    /// Creates a model with default metadata.
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            description: String::new(),
            recommended_for: Vec::new(),
            is_default: false,
            supports_temperature: true,
            context_window: None,
            created_by: default_created_by(),
            created_at: now(),
        }
    }

    /// Builds a validated model from plain JSON data.
    ///
    /// # Errors
    ///
    /// Returns a validation error if required fields are missing, a field has
    /// the wrong type, or [`Model::validate`] rejects the result.
    pub fn from_value(value: Value) -> Result<Self> {
        let model: Self =
            serde_json::from_value(value).map_err(|e| Error::validation("model", e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// Same as [`Model::from_value`] for a JSON object.
    ///
    /// # Errors
    ///
    /// See [`Model::from_value`].
    pub fn from_map(data: Map<String, Value>) -> Result<Self> {
        Self::from_value(Value::Object(data))
    }

    /// Checks the invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name or provider, or a zero
    /// context window.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("model", "name may not be empty"));
        }

        if self.provider.trim().is_empty() {
            return Err(Error::validation(
                "model",
                format!("provider of `{}` may not be empty", self.name),
            ));
        }

        if self.context_window == Some(0) {
            return Err(Error::validation(
                "model",
                format!("context window of `{}` must be positive", self.name),
            ));
        }

        Ok(())
    }

    /// The model as a JSON object, in file layout.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => unreachable!("a model always serializes to a JSON object"),
        }
    }
}

impl Display for Model {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{} - {}", self.provider, self.name)
    }
}
