//! Storage configuration for ra-aid-start.
//!
//! This module resolves the storage root that holds the preset and model
//! directories, and expands shell variables like `~` in user-supplied paths.
//! The resolved [`StorageConfig`] is passed explicitly to each manager.

use std::env;
use std::path::{Path, PathBuf};

/// Default storage root for presets and models
const DEFAULT_STORAGE_ROOT: &str = "~/.ra-aid-start";

/// Environment variable that overrides the default storage root
pub const STORAGE_ROOT_ENV: &str = "RA_AID_START_HOME";

/// Sub-directory of the storage root holding one JSON file per preset
pub const PRESETS_DIR_NAME: &str = "presets";

/// Sub-directory of the storage root holding one JSON file per provider
pub const MODELS_DIR_NAME: &str = "models";

/// Default shell used to execute preset commands
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Where presets and models live, and how preset commands are run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub root: PathBuf,
    pub shell: String,
}

impl StorageConfig {
    /// Creates a configuration rooted at `root` using the default shell.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            shell: DEFAULT_SHELL.to_string(),
        }
    }

    /// Resolves the storage root from an optional argument, the
    /// `RA_AID_START_HOME` environment variable, or the default path.
    ///
    /// # Examples
    ///
    /// ```
    /// use ra_aid_start_core::config::StorageConfig;
    ///
    /// let config = StorageConfig::resolve(&Some("/tmp/ras".to_string()));
    /// assert_eq!(config.presets_dir(), std::path::PathBuf::from("/tmp/ras/presets"));
    /// ```
    pub fn resolve(storage_root_arg: &Option<String>) -> Self {
        Self::new(get_storage_root(storage_root_arg))
    }

    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn presets_dir(&self) -> PathBuf {
        self.root.join(PRESETS_DIR_NAME)
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join(MODELS_DIR_NAME)
    }
}

/// Resolves the storage root path.
///
/// An explicit argument wins over the `RA_AID_START_HOME` environment
/// variable, which wins over the default `~/.ra-aid-start`. Shell expansions
/// like `~` are resolved.
pub fn get_storage_root(storage_root_arg: &Option<String>) -> String {
    let from_env = env::var(STORAGE_ROOT_ENV).ok().filter(|v| !v.is_empty());

    let storage_root = match (storage_root_arg, &from_env) {
        (Some(storage_root), _) => storage_root.as_str(),
        (None, Some(storage_root)) => storage_root.as_str(),
        (None, None) => DEFAULT_STORAGE_ROOT,
    };

    shellexpand::tilde(storage_root).to_string()
}

/// Expands shell variables in a working directory path.
///
/// Returns None if no working directory is provided.
///
/// # Examples
///
/// ```
/// use ra_aid_start_core::config::expand_working_directory;
///
/// let expanded = expand_working_directory(&Some("~/projects".to_string()));
/// assert!(expanded.is_some());
///
/// assert!(expand_working_directory(&None).is_none());
/// ```
pub fn expand_working_directory(working_directory: &Option<String>) -> Option<PathBuf> {
    working_directory.as_deref().map(expand_path)
}

/// Expands `~` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

pub(crate) fn display_path(path: &Path) -> String {
    path.display().to_string()
}
