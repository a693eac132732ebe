//! CRUD and execution for presets stored as one JSON file each.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde_json::{Map, Value};

use crate::command_builder::CommandBuilder;
use crate::config::{display_path, StorageConfig};
use crate::error::{Error, Result};
use crate::execution::{run_shell_command, CommandOutput};
use crate::file_handling::{list_files_with_suffix, load_json_if_exists, save_json};
use crate::preset::{self, Preset};

const PRESET_FILE_DESCRIPTION: &str = "preset";
const PRESET_FILE_SUFFIX: &str = ".json";

/// Keys an update patch may never change.
const IMMUTABLE_PRESET_KEYS: [&str; 2] = ["name", "created_at"];

#[derive(Debug, Clone)]
pub struct PresetManager {
    storage_path: PathBuf,
    shell: String,
}

impl PresetManager {
    /// Creates a manager rooted at `<root>/presets`, creating the directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageInit`] if the directory cannot be created.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let storage_path = config.presets_dir();
        fs::create_dir_all(&storage_path).map_err(|e| {
            error!(
                "Failed to create preset storage directory `{}`: {}",
                storage_path.display(),
                e
            );
            Error::storage_init("preset", display_path(&storage_path), e)
        })?;

        info!("Preset storage: `{}`", storage_path.display());

        Ok(Self {
            storage_path,
            shell: config.shell.clone(),
        })
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    fn preset_path(&self, name: &str) -> Result<PathBuf> {
        preset::validate_name(name)?;
        Ok(self
            .storage_path
            .join(format!("{}{}", preset::storage_key(name), PRESET_FILE_SUFFIX)))
    }

    fn load_preset_file(path: &Path) -> Result<Option<Preset>> {
        let Some(data) = load_json_if_exists(path, PRESET_FILE_DESCRIPTION)? else {
            return Ok(None);
        };

        Preset::from_value(data).map(Some)
    }

    /// Loads the preset called `name` (case-insensitive).
    ///
    /// Returns `Ok(None)` when no such preset exists.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid name, unreadable or malformed JSON, or
    /// data that fails validation.
    pub fn load_preset(&self, name: &str) -> Result<Option<Preset>> {
        let path = self.preset_path(name)?;
        debug!("Loading preset `{}` from `{}`", name, path.display());

        match Self::load_preset_file(&path) {
            Ok(None) => {
                info!("Preset `{name}` not found");
                Ok(None)
            }
            Ok(Some(preset)) => Ok(Some(preset)),
            Err(e) => {
                error!("Failed to load preset `{name}`: {e}");
                Err(e)
            }
        }
    }

    pub fn preset_exists(&self, name: &str) -> bool {
        self.preset_path(name).is_ok_and(|path| path.is_file())
    }

    /// Loads every preset in the storage directory, ordered by file name.
    ///
    /// Files that cannot be read or validated are logged and skipped.
    pub fn list_presets(&self) -> Vec<Preset> {
        let files = match list_files_with_suffix(&self.storage_path, PRESET_FILE_SUFFIX) {
            Ok(files) => files,
            Err(e) => {
                warn!("Cannot list presets: {e}");
                return Vec::new();
            }
        };

        let presets: Vec<Preset> = files
            .iter()
            .filter_map(|path| match Self::load_preset_file(path) {
                Ok(preset) => preset,
                Err(e) => {
                    warn!("Skipping preset file `{}`: {}", path.display(), e);
                    None
                }
            })
            .collect();

        info!(
            "Found {} presets in `{}`",
            presets.len(),
            self.storage_path.display()
        );
        presets
    }

    /// Regenerates the preset's command, refreshes `updated_at` and writes
    /// the preset, replacing any preset with the same (case-folded) name.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid name or if the file cannot be written.
    pub fn save_preset(&self, preset: &mut Preset) -> Result<()> {
        let path = self.preset_path(&preset.name).inspect_err(|e| {
            error!("Cannot save preset: {e}");
        })?;

        let mut builder = CommandBuilder::new();
        let command = builder.build_command_from_preset(preset);
        if builder.validate_command(&command) {
            debug!("Generated command for preset `{}`: {}", preset.name, command);
            preset.command = command;
        } else {
            warn!(
                "Generated command for preset `{}` is invalid, keeping the previous command",
                preset.name
            );
        }

        preset.touch();

        save_json(&path, preset, PRESET_FILE_DESCRIPTION).inspect_err(|e| {
            error!("Failed to save preset `{}`: {}", preset.name, e);
        })?;

        info!("Preset `{}` saved to `{}`", preset.name, path.display());
        Ok(())
    }

    /// Validates `data` into a preset and saves it.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `name` or `operation_mode` is missing or
    /// invalid, or an IO error if saving fails.
    pub fn create_preset(&self, data: Value) -> Result<Preset> {
        let mut preset = Preset::from_value(data).inspect_err(|e| {
            error!("Invalid data for new preset: {e}");
        })?;

        self.save_preset(&mut preset)?;
        info!("Preset `{}` created", preset.name);
        Ok(preset)
    }

    /// Applies `patch` to the stored preset `name` and saves the result.
    ///
    /// `name` and `created_at` in the patch are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PresetNotFound`] if there's no such preset, a
    /// validation error if the merged data is invalid, or an IO error.
    pub fn update_preset(&self, name: &str, mut patch: Map<String, Value>) -> Result<Preset> {
        let existing = self
            .load_preset(name)?
            .ok_or_else(|| Error::PresetNotFound(name.to_string()))
            .inspect_err(|e| error!("Cannot update preset: {e}"))?;

        for key in IMMUTABLE_PRESET_KEYS {
            if patch.remove(key).is_some() {
                debug!("Ignoring `{key}` in update of preset `{name}`");
            }
        }

        let mut merged = existing.to_map();
        merged.extend(patch);

        let mut updated = Preset::from_map(merged).inspect_err(|e| {
            error!("Invalid data for updating preset `{name}`: {e}");
        })?;

        self.save_preset(&mut updated)?;
        info!("Preset `{name}` updated");
        Ok(updated)
    }

    /// Renames a preset by writing it under the new name and removing the
    /// old file.
    ///
    /// Changing only the case of a name keeps the same file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PresetNotFound`] if `old_name` doesn't exist,
    /// [`Error::PresetExists`] if another preset already uses `new_name`, or
    /// an IO error.
    pub fn rename_preset(&self, old_name: &str, new_name: &str) -> Result<Preset> {
        let mut preset = self
            .load_preset(old_name)?
            .ok_or_else(|| Error::PresetNotFound(old_name.to_string()))?;

        let old_path = self.preset_path(old_name)?;
        let new_path = self.preset_path(new_name)?;
        let same_file = old_path == new_path;

        if !same_file && new_path.exists() {
            error!("Cannot rename preset `{old_name}`: `{new_name}` already exists");
            return Err(Error::PresetExists(new_name.to_string()));
        }

        preset.name = new_name.to_string();
        self.save_preset(&mut preset)?;

        if !same_file {
            fs::remove_file(&old_path)
                .map_err(|e| Error::io_error(PRESET_FILE_DESCRIPTION, display_path(&old_path), e))
                .inspect_err(|e| error!("Renamed preset but failed to remove the old file: {e}"))?;
        }

        info!("Preset `{old_name}` renamed to `{new_name}`");
        Ok(preset)
    }

    /// Deletes the preset file. A missing preset counts as deleted.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid name or if the file cannot be removed.
    pub fn delete_preset(&self, name: &str) -> Result<()> {
        let path = self.preset_path(name).inspect_err(|e| {
            error!("Cannot delete preset: {e}");
        })?;

        if !path.exists() {
            info!("Preset `{name}` not found, nothing to delete");
            return Ok(());
        }

        fs::remove_file(&path)
            .map_err(|e| Error::io_error(PRESET_FILE_DESCRIPTION, display_path(&path), e))
            .inspect_err(|e| error!("Failed to delete preset `{name}`: {e}"))?;

        info!("Preset `{name}` deleted");
        Ok(())
    }

    /// Runs the stored command of preset `name` through the configured shell.
    ///
    /// The command runs in `working_directory`, or the current directory when
    /// None, and blocks until it exits. Output is captured and logged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PresetNotFound`] or [`Error::EmptyCommand`] before
    /// launching anything, then any error of
    /// [`run_shell_command`](crate::execution::run_shell_command).
    pub fn execute_preset(
        &self,
        name: &str,
        working_directory: Option<&Path>,
    ) -> Result<CommandOutput> {
        let preset = self
            .load_preset(name)?
            .ok_or_else(|| Error::PresetNotFound(name.to_string()))
            .inspect_err(|e| error!("Cannot execute preset: {e}"))?;

        if preset.command.trim().is_empty() {
            warn!("Preset `{name}` has no command defined, nothing to execute");
            return Err(Error::EmptyCommand(name.to_string()));
        }

        let working_directory = match working_directory {
            Some(directory) => directory.to_path_buf(),
            None => env::current_dir().map_err(Error::Stdio)?,
        };

        match run_shell_command(&self.shell, &preset.command, &working_directory) {
            Ok(output) => {
                info!("Command for preset `{name}` executed successfully");
                if !output.stdout.is_empty() {
                    info!("Stdout:\n{}", output.stdout);
                }
                if !output.stderr.is_empty() {
                    warn!("Stderr:\n{}", output.stderr);
                }
                Ok(output)
            }
            Err(e) => {
                match &e {
                    Error::SubProcessExit { status, stderr } => {
                        error!("Command for preset `{name}` failed with {status}");
                        if !stderr.is_empty() {
                            error!("Stderr:\n{stderr}");
                        }
                    }
                    Error::CommandNotFound(program) => {
                        error!("Command not found when executing preset `{name}`: {program}");
                    }
                    other => {
                        error!("Could not launch command for preset `{name}`: {other}");
                    }
                }
                Err(e)
            }
        }
    }
}
