use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not initialize {} storage at `{}`: {}", .description, .path, .original)]
    StorageInit {
        description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Json {
        action: String,
        file_description: String,
        path: String,
        original: serde_json::Error,
    },

    #[error("Invalid {}: {}", .0, .1)]
    Validation(String, String),

    #[error("Invalid preset name `{}`: name may not be empty or contain `/`, `\\` or `..`", .0)]
    InvalidPresetName(String),

    #[error("Invalid provider name `{}`: it does not produce a usable file name", .0)]
    InvalidProviderName(String),

    #[error("Preset `{}` was not found", .0)]
    PresetNotFound(String),

    #[error("Preset `{}` already exists", .0)]
    PresetExists(String),

    #[error("Preset `{}` has no command to execute", .0)]
    EmptyCommand(String),

    #[error("Model `{}` was not found for provider `{}`", .1, .0)]
    ModelNotFound(String, String),

    #[error("Model `{}` already exists for provider `{}`", .1, .0)]
    DuplicateModel(String, String),

    #[error("Provider `{}` has no built-in default models", .0)]
    NoDefaultModels(String),

    #[error("No default models could be restored")]
    RestoreFailed,

    #[error("Import file `{}` has an unsupported structure (expected an object or a list)", .0)]
    UnsupportedImportFormat(String),

    #[error("No valid models were found to import from `{}`", .0)]
    NothingImported(String),

    #[error("Invalid flag argument `{}`: expected `key` or `key=value`", .0)]
    FlagFormat(String),

    #[error("Flags of preset `{}` have problems: {}", .0, .1)]
    InvalidFlags(String, String),

    #[error("STDIO error: {}", .0)]
    Stdio(std::io::Error),

    #[error("The sub process exited with non-success {}.", .status)]
    SubProcessExit { status: String, stderr: String },

    #[error("Command not found: `{}`", .0)]
    CommandNotFound(String),

    #[error("Error with sub process: {}", .0)]
    SubProcess(#[from] std::io::Error),
}

impl Error {
    pub fn storage_init(description: &str, path: String, original: std::io::Error) -> Self {
        Self::StorageInit {
            description: description.to_string(),
            path,
            original,
        }
    }

    pub fn json_error(
        action: &str,
        file_description: &str,
        path: String,
        original: serde_json::Error,
    ) -> Self {
        Self::Json {
            action: action.to_string(),
            file_description: file_description.to_string(),
            path,
            original,
        }
    }

    pub fn io_error(file_description: &str, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description: file_description.to_string(),
            path,
            original,
        }
    }

    pub fn validation(entity: &str, message: impl Into<String>) -> Self {
        Self::Validation(entity.to_string(), message.into())
    }
}
