//! Per-provider model lists stored as one JSON array file each.
//!
//! Provider display names are mapped to file names by
//! [`sanitize_provider_name`]. Every read goes back to disk; nothing is
//! cached between calls.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, error, info, warn};
use serde_json::{Map, Value};

use crate::config::{display_path, StorageConfig};
use crate::default_models::{default_catalog, default_models_for};
use crate::error::{Error, Result};
use crate::file_handling::{list_files_with_suffix, load_json, load_json_if_exists, save_json};
use crate::model::{Model, CREATED_BY_USER};

const MODELS_FILE_DESCRIPTION: &str = "provider models";
const MODELS_FILE_SUFFIX: &str = "_models.json";
const EXPORT_FILE_DESCRIPTION: &str = "model export";
const IMPORT_FILE_DESCRIPTION: &str = "model import";

/// Keys an update patch may never change.
const IMMUTABLE_MODEL_KEYS: [&str; 3] = ["name", "provider", "created_at"];

/// Maps a provider display name to the stem of its storage file.
///
/// The name is lowercased, spaces and path separators become `_`, and any
/// other character that isn't alphanumeric, `_` or `-` is dropped.
///
/// # Errors
///
/// Returns [`Error::InvalidProviderName`] if nothing usable is left.
///
/// # Examples
///
/// ```
/// use ra_aid_start_core::model_manager::sanitize_provider_name;
///
/// assert_eq!(sanitize_provider_name("My Provider/v2").unwrap(), "my_provider_v2");
/// assert!(sanitize_provider_name("???").is_err());
/// ```
pub fn sanitize_provider_name(provider: &str) -> Result<String> {
    let sanitized: String = provider
        .to_lowercase()
        .chars()
        .map(|c| if matches!(c, ' ' | '/' | '\\') { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();

    if sanitized.is_empty() {
        return Err(Error::InvalidProviderName(provider.to_string()));
    }

    Ok(sanitized)
}

/// Reads the entries of a provider file, or None if it is missing, broken or
/// not a list.
fn read_entries(path: &Path) -> Option<Vec<Value>> {
    match load_json_if_exists(path, MODELS_FILE_DESCRIPTION) {
        Ok(Some(Value::Array(entries))) => Some(entries),
        Ok(Some(_)) => {
            warn!("Models file `{}` does not contain a list", path.display());
            None
        }
        Ok(None) => None,
        Err(e) => {
            error!("Failed to read models file: {e}");
            None
        }
    }
}

/// The provider recorded in the first valid entry of a provider file.
fn recorded_provider(path: &Path) -> Option<String> {
    read_entries(path)?
        .into_iter()
        .find_map(|entry| Model::from_value(entry).ok())
        .map(|model| model.provider)
}

/// Parses a stored entry as a model of `provider`, skipping invalid entries.
fn parse_entry(entry: Value, provider: &str) -> Option<Model> {
    let Value::Object(mut data) = entry else {
        warn!("Skipping non-object entry in models of `{provider}`");
        return None;
    };

    if let Some(recorded) = data.get("provider").and_then(Value::as_str) {
        if recorded != provider {
            warn!("Entry records provider `{recorded}` but is stored under `{provider}`");
        }
    }
    data.insert("provider".to_string(), Value::String(provider.to_string()));

    match Model::from_map(data) {
        Ok(model) => Some(model),
        Err(e) => {
            warn!("Skipping invalid model of `{provider}`: {e}");
            None
        }
    }
}

/// Parses an import entry destined for `provider`, keeping the raw fields for
/// merging.
fn parse_import_entry(entry: Value, provider: &str) -> Option<(Model, Map<String, Value>)> {
    let Value::Object(mut data) = entry else {
        warn!("Skipping non-object import entry for `{provider}`");
        return None;
    };
    data.insert("provider".to_string(), Value::String(provider.to_string()));

    match Model::from_map(data.clone()) {
        Ok(model) => Some((model, data)),
        Err(e) => {
            warn!("Skipping invalid import entry for `{provider}`: {e}");
            None
        }
    }
}

type ImportedModels = IndexMap<String, Vec<(Model, Map<String, Value>)>>;

fn collect_import(
    path: &Path,
    data: Value,
    default_provider: Option<&str>,
) -> Result<ImportedModels> {
    let mut imported = ImportedModels::new();

    match data {
        Value::Object(by_provider) => {
            for (provider, entries) in by_provider {
                let Value::Array(entries) = entries else {
                    warn!("Skipping `{provider}` in import: expected a list of models");
                    continue;
                };

                let parsed = entries
                    .into_iter()
                    .filter_map(|entry| parse_import_entry(entry, &provider))
                    .collect_vec();
                if !parsed.is_empty() {
                    imported.entry(provider).or_default().extend(parsed);
                }
            }
        }
        Value::Array(entries) => {
            for entry in entries {
                let provider = entry
                    .get("provider")
                    .and_then(Value::as_str)
                    .filter(|provider| !provider.trim().is_empty())
                    .or(default_provider)
                    .map(ToString::to_string);

                let Some(provider) = provider else {
                    warn!("Skipping import entry without a provider: {entry}");
                    continue;
                };

                if let Some(parsed) = parse_import_entry(entry, &provider) {
                    imported.entry(provider).or_default().push(parsed);
                }
            }
        }
        _ => {
            error!("Unsupported import structure in `{}`", path.display());
            return Err(Error::UnsupportedImportFormat(display_path(path)));
        }
    }

    Ok(imported)
}

#[derive(Debug, Clone)]
pub struct ModelManager {
    storage_path: PathBuf,
}

impl ModelManager {
    /// Creates a manager rooted at `<root>/models`, creating the directory
    /// and writing the built-in models of every provider that has no file
    /// yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageInit`] if the directory cannot be created.
    /// Seeding failures are logged only.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let storage_path = config.models_dir();
        fs::create_dir_all(&storage_path).map_err(|e| {
            error!(
                "Failed to create model storage directory `{}`: {}",
                storage_path.display(),
                e
            );
            Error::storage_init("model", display_path(&storage_path), e)
        })?;

        info!("Model storage: `{}`", storage_path.display());

        let manager = Self { storage_path };
        manager.seed_defaults();
        Ok(manager)
    }

    fn seed_defaults(&self) {
        for (provider, models) in default_catalog() {
            let path = match self.provider_file(&provider) {
                Ok(path) => path,
                Err(e) => {
                    warn!("Cannot seed default models: {e}");
                    continue;
                }
            };

            if path.exists() {
                continue;
            }

            match save_json(&path, &models, MODELS_FILE_DESCRIPTION) {
                Ok(()) => info!("Seeded default models for `{provider}`"),
                Err(e) => warn!("Failed to seed default models for `{provider}`: {e}"),
            }
        }
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    fn provider_file(&self, provider: &str) -> Result<PathBuf> {
        let stem = sanitize_provider_name(provider)?;
        Ok(self.storage_path.join(format!("{stem}{MODELS_FILE_SUFFIX}")))
    }

    fn provider_files(&self) -> Vec<PathBuf> {
        list_files_with_suffix(&self.storage_path, MODELS_FILE_SUFFIX).unwrap_or_else(|e| {
            warn!("Cannot list model files: {e}");
            Vec::new()
        })
    }

    /// Loads the valid models stored for `provider`.
    ///
    /// Missing, unreadable or malformed files give an empty list. Each
    /// returned model has its `provider` set to `provider`.
    pub fn get_models_for_provider(&self, provider: &str) -> Vec<Model> {
        let path = match self.provider_file(provider) {
            Ok(path) => path,
            Err(e) => {
                warn!("{e}");
                return Vec::new();
            }
        };

        let Some(entries) = read_entries(&path) else {
            debug!("No models stored for `{provider}`");
            return Vec::new();
        };

        entries
            .into_iter()
            .filter_map(|entry| parse_entry(entry, provider))
            .collect()
    }

    /// Providers that have a readable file with at least one valid model,
    /// as recorded in the file's first valid entry.
    pub fn get_available_providers(&self) -> Vec<String> {
        self.provider_files()
            .iter()
            .filter_map(|path| recorded_provider(path))
            .sorted()
            .dedup()
            .collect()
    }

    /// Replaces the stored models of `provider`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unusable provider name or if writing fails.
    pub fn save_models_for_provider(&self, provider: &str, models: &[Model]) -> Result<()> {
        let path = self.provider_file(provider).inspect_err(|e| {
            error!("Cannot save models: {e}");
        })?;

        if let Some(recorded) = recorded_provider(&path) {
            if recorded != provider {
                warn!(
                    "Models of `{}` will overwrite `{}`, which holds models of `{}`",
                    provider,
                    path.display(),
                    recorded
                );
            }
        }

        save_json(&path, models, MODELS_FILE_DESCRIPTION).inspect_err(|e| {
            error!("Failed to save models for `{provider}`: {e}");
        })?;

        info!(
            "Saved {} models for `{}` to `{}`",
            models.len(),
            provider,
            path.display()
        );
        Ok(())
    }

    /// Adds a new model to `provider`.
    ///
    /// The `provider` field of `data` is overridden, and `created_by`
    /// defaults to `"user"`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid data,
    /// [`Error::DuplicateModel`] if the name is taken, or an IO error.
    pub fn add_model(&self, provider: &str, mut data: Map<String, Value>) -> Result<Model> {
        if let Some(given) = data.get("provider").and_then(Value::as_str) {
            if given != provider {
                warn!("Overriding provider `{given}` with `{provider}` for new model");
            }
        }
        data.insert("provider".to_string(), Value::String(provider.to_string()));
        data.entry("created_by")
            .or_insert_with(|| Value::String(CREATED_BY_USER.to_string()));

        let model = Model::from_map(data).inspect_err(|e| {
            error!("Invalid data for new model of `{provider}`: {e}");
        })?;

        let mut models = self.get_models_for_provider(provider);
        if models.iter().any(|existing| existing.name == model.name) {
            error!("Model `{}` already exists for `{}`", model.name, provider);
            return Err(Error::DuplicateModel(provider.to_string(), model.name));
        }

        models.push(model.clone());
        self.save_models_for_provider(provider, &models)?;

        info!("Model `{}` added to `{}`", model.name, provider);
        Ok(model)
    }

    /// Applies `patch` to the model `name` of `provider`.
    ///
    /// `name`, `provider` and `created_at` can't be changed and keys that
    /// aren't model fields are ignored. Making a model the default clears
    /// the flag on every other model of the provider.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelNotFound`], a validation error for the merged
    /// data, or an IO error.
    pub fn update_model(
        &self,
        provider: &str,
        name: &str,
        mut patch: Map<String, Value>,
    ) -> Result<Model> {
        let mut models = self.get_models_for_provider(provider);
        let index = models
            .iter()
            .position(|model| model.name == name)
            .ok_or_else(|| Error::ModelNotFound(provider.to_string(), name.to_string()))
            .inspect_err(|e| error!("Cannot update model: {e}"))?;

        for key in IMMUTABLE_MODEL_KEYS {
            if patch.remove(key).is_some() {
                debug!("Ignoring `{key}` in update of model `{name}`");
            }
        }

        let mut merged = models[index].to_map();
        for (key, value) in patch {
            if merged.contains_key(&key) {
                merged.insert(key, value);
            } else {
                warn!("Ignoring unknown field `{key}` in update of model `{name}`");
            }
        }

        let updated = Model::from_map(merged).inspect_err(|e| {
            error!("Invalid data for updating model `{name}` of `{provider}`: {e}");
        })?;

        if updated.is_default {
            for (position, model) in models.iter_mut().enumerate() {
                if position != index && model.is_default {
                    info!("Model `{}` is no longer the default for `{}`", model.name, provider);
                    model.is_default = false;
                }
            }
        }

        models[index] = updated.clone();
        self.save_models_for_provider(provider, &models)?;

        info!("Model `{name}` of `{provider}` updated");
        Ok(updated)
    }

    /// Removes the model `name` from `provider`. A missing model counts as
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the remaining models cannot be saved.
    pub fn remove_model(&self, provider: &str, name: &str) -> Result<()> {
        let mut models = self.get_models_for_provider(provider);
        let before = models.len();
        models.retain(|model| model.name != name);

        if models.len() == before {
            info!("Model `{name}` not found for `{provider}`, nothing to remove");
            return Ok(());
        }

        self.save_models_for_provider(provider, &models)?;
        info!("Model `{name}` removed from `{provider}`");
        Ok(())
    }

    pub fn get_default_model(&self, provider: &str) -> Option<Model> {
        self.get_models_for_provider(provider)
            .into_iter()
            .find(|model| model.is_default)
    }

    /// Collects models by provider.
    ///
    /// With a provider, the result holds just that provider's list. Without
    /// one, every provider file is scanned and models are grouped by their
    /// recorded provider, keeping the first model of each name.
    pub fn export_models(&self, provider: Option<&str>) -> IndexMap<String, Vec<Model>> {
        if let Some(provider) = provider {
            let mut export = IndexMap::new();
            export.insert(provider.to_string(), self.get_models_for_provider(provider));
            return export;
        }

        let mut export: IndexMap<String, Vec<Model>> = IndexMap::new();
        for path in self.provider_files() {
            let Some(entries) = read_entries(&path) else {
                continue;
            };

            for entry in entries {
                let model = match Model::from_value(entry) {
                    Ok(model) => model,
                    Err(e) => {
                        warn!("Skipping invalid model in `{}`: {}", path.display(), e);
                        continue;
                    }
                };

                let models = export.entry(model.provider.clone()).or_default();
                if models.iter().any(|existing| existing.name == model.name) {
                    debug!("Skipping duplicate model `{model}` in export");
                } else {
                    models.push(model);
                }
            }
        }

        export
    }

    /// Writes [`ModelManager::export_models`] to `path` and returns the number
    /// of models written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export_models_to_file(&self, path: &Path, provider: Option<&str>) -> Result<usize> {
        let export = self.export_models(provider);
        let count: usize = export.values().map(Vec::len).sum();

        save_json(path, &export, EXPORT_FILE_DESCRIPTION).inspect_err(|e| {
            error!("Failed to export models: {e}");
        })?;

        info!("Exported {} models to `{}`", count, path.display());
        Ok(count)
    }

    /// Imports models from a JSON file holding either a provider to list
    /// mapping or a flat list of models.
    ///
    /// Flat list entries without a `provider` use `default_provider`, and
    /// are skipped when there is none. With `merge`, imported models update
    /// existing models of the same name field by field and new ones are
    /// appended. Without it, each imported provider's list is replaced.
    ///
    /// Returns the number of valid models read from the file. Failing to save
    /// one provider is logged and doesn't stop the others.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or parsed,
    /// [`Error::UnsupportedImportFormat`] for any other JSON structure, and
    /// [`Error::NothingImported`] if no valid model was found.
    pub fn import_models(
        &self,
        path: &Path,
        default_provider: Option<&str>,
        merge: bool,
    ) -> Result<usize> {
        let data = load_json(path, IMPORT_FILE_DESCRIPTION).inspect_err(|e| {
            error!("Cannot import models: {e}");
        })?;

        let imported = collect_import(path, data, default_provider)?;
        let count: usize = imported.values().map(Vec::len).sum();
        if count == 0 {
            error!("No valid models found in `{}`", path.display());
            return Err(Error::NothingImported(display_path(path)));
        }

        for (provider, entries) in imported {
            let models = if merge {
                self.merge_models(&provider, entries)
            } else {
                entries
                    .into_iter()
                    .map(|(model, _)| model)
                    .unique_by(|model| model.name.clone())
                    .collect_vec()
            };

            if let Err(e) = self.save_models_for_provider(&provider, &models) {
                error!("Failed to import models for `{provider}`: {e}");
            }
        }

        info!("Imported {} models from `{}`", count, path.display());
        Ok(count)
    }

    fn merge_models(
        &self,
        provider: &str,
        entries: Vec<(Model, Map<String, Value>)>,
    ) -> Vec<Model> {
        let mut models = self.get_models_for_provider(provider);
        let entries = entries
            .into_iter()
            .unique_by(|(model, _)| model.name.clone());

        for (model, fields) in entries {
            let Some(existing) = models.iter_mut().find(|m| m.name == model.name) else {
                models.push(model);
                continue;
            };

            let mut merged = existing.to_map();
            for (key, value) in fields {
                if key != "created_at" {
                    merged.insert(key, value);
                }
            }

            match Model::from_map(merged) {
                Ok(updated) => *existing = updated,
                Err(e) => warn!("Keeping existing model `{existing}`, merge failed: {e}"),
            }
        }

        models
    }

    /// Rewrites provider files from the built-in catalog.
    ///
    /// With a provider, only that provider is restored. Without one, every
    /// catalog provider is restored and other providers are left alone.
    /// Returns the number of providers restored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDefaultModels`] for a provider outside the catalog,
    /// an IO error if its file can't be written, or [`Error::RestoreFailed`]
    /// when no catalog provider could be restored.
    pub fn restore_defaults(&self, provider: Option<&str>) -> Result<usize> {
        if let Some(provider) = provider {
            let models = default_models_for(provider)
                .ok_or_else(|| Error::NoDefaultModels(provider.to_string()))
                .inspect_err(|e| error!("Cannot restore defaults: {e}"))?;

            self.save_models_for_provider(provider, &models)?;
            info!("Restored default models for `{provider}`");
            return Ok(1);
        }

        let mut restored = 0;
        for (provider, models) in default_catalog() {
            match self.save_models_for_provider(&provider, &models) {
                Ok(()) => restored += 1,
                Err(e) => error!("Failed to restore default models for `{provider}`: {e}"),
            }
        }

        if restored == 0 {
            error!("No default models could be restored");
            return Err(Error::RestoreFailed);
        }

        info!("Restored default models for {restored} providers");
        Ok(restored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn manager() -> (TempDir, ModelManager) {
        let temp_dir = TempDir::new().unwrap();
        let manager = ModelManager::new(&StorageConfig::new(temp_dir.path())).unwrap();
        (temp_dir, manager)
    }

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("Expected an object, got {other}"),
        }
    }

    fn names(models: &[Model]) -> Vec<&str> {
        models.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_sanitize_provider_name() {
        assert_eq!(sanitize_provider_name("OpenAI").unwrap(), "openai");
        assert_eq!(
            sanitize_provider_name("openai-compatible").unwrap(),
            "openai-compatible"
        );
        assert_eq!(sanitize_provider_name("a\\b c").unwrap(), "a_b_c");
        assert_eq!(sanitize_provider_name("x.ai").unwrap(), "xai");
        assert!(matches!(
            sanitize_provider_name("..."),
            Err(Error::InvalidProviderName(_))
        ));
    }

    #[test]
    fn test_new_seeds_every_catalog_provider() {
        let (_temp_dir, manager) = manager();
        assert!(manager.storage_path().join("openai_models.json").is_file());
        assert_eq!(
            manager.get_available_providers(),
            vec![
                "Anthropic",
                "Google",
                "OpenAI",
                "deepseek",
                "fireworks",
                "ollama",
                "openai-compatible",
                "openrouter"
            ]
        );
    }

    #[test]
    fn test_new_keeps_existing_provider_files() {
        let temp_dir = TempDir::new().unwrap();
        let models_dir = temp_dir.path().join("models");
        fs::create_dir_all(&models_dir).unwrap();
        fs::write(
            models_dir.join("openai_models.json"),
            json!([{"name": "custom", "provider": "OpenAI"}]).to_string(),
        )
        .unwrap();

        let manager = ModelManager::new(&StorageConfig::new(temp_dir.path())).unwrap();
        assert_eq!(names(&manager.get_models_for_provider("OpenAI")), vec!["custom"]);
    }

    #[test]
    fn test_get_models_for_unknown_provider_is_empty() {
        let (_temp_dir, manager) = manager();
        assert!(manager.get_models_for_provider("nobody").is_empty());
        assert!(manager.get_models_for_provider("???").is_empty());
    }

    #[test]
    fn test_get_models_forces_provider_and_skips_invalid_entries() {
        let (_temp_dir, manager) = manager();
        fs::write(
            manager.storage_path().join("custom_models.json"),
            json!([
                {"name": "good", "provider": "Elsewhere"},
                {"provider": "custom"},
                "not a model",
                {"name": "also-good"}
            ])
            .to_string(),
        )
        .unwrap();

        let models = manager.get_models_for_provider("custom");
        assert_eq!(names(&models), vec!["good", "also-good"]);
        assert!(models.iter().all(|m| m.provider == "custom"));
    }

    #[test]
    fn test_file_that_is_not_a_list_is_empty() {
        let (_temp_dir, manager) = manager();
        fs::write(
            manager.storage_path().join("odd_models.json"),
            json!({"name": "m"}).to_string(),
        )
        .unwrap();

        assert!(manager.get_models_for_provider("odd").is_empty());
        assert!(!manager.get_available_providers().contains(&"odd".to_string()));
    }

    #[test]
    fn test_add_model_defaults() {
        let (_temp_dir, manager) = manager();
        let model = manager
            .add_model(
                "Local",
                data(json!({"name": "llama3", "provider": "Wrong", "context_window": 8192})),
            )
            .unwrap();

        assert_eq!(model.provider, "Local");
        assert_eq!(model.created_by, CREATED_BY_USER);
        assert_eq!(manager.get_models_for_provider("Local"), vec![model]);
    }

    #[test]
    fn test_add_model_keeps_given_created_by() {
        let (_temp_dir, manager) = manager();
        let model = manager
            .add_model("Local", data(json!({"name": "m", "created_by": "script"})))
            .unwrap();
        assert_eq!(model.created_by, "script");
    }

    #[test]
    fn test_add_duplicate_model_fails() {
        let (_temp_dir, manager) = manager();
        manager.add_model("Local", data(json!({"name": "m"}))).unwrap();

        let result = manager.add_model("Local", data(json!({"name": "m"})));
        assert!(matches!(result, Err(Error::DuplicateModel(_, _))));
        assert_eq!(manager.get_models_for_provider("Local").len(), 1);
    }

    #[test]
    fn test_add_invalid_model_fails() {
        let (_temp_dir, manager) = manager();
        let result = manager.add_model("Local", data(json!({"description": "no name"})));
        assert!(matches!(result, Err(Error::Validation(_, _))));
    }

    #[test]
    fn test_update_model_moves_default() {
        let (_temp_dir, manager) = manager();
        let haiku = "claude-3-haiku-20240307";

        let updated = manager
            .update_model("Anthropic", haiku, data(json!({"is_default": true})))
            .unwrap();
        assert!(updated.is_default);

        let defaults: Vec<_> = manager
            .get_models_for_provider("Anthropic")
            .into_iter()
            .filter(|m| m.is_default)
            .map(|m| m.name)
            .collect();
        assert_eq!(defaults, vec![haiku]);
        assert_eq!(manager.get_default_model("Anthropic").unwrap().name, haiku);
    }

    #[test]
    fn test_update_model_ignores_immutable_and_unknown_keys() {
        let (_temp_dir, manager) = manager();
        let before = manager.get_models_for_provider("OpenAI")[0].clone();

        let updated = manager
            .update_model(
                "OpenAI",
                &before.name,
                data(json!({
                    "name": "renamed",
                    "provider": "Other",
                    "created_at": "2000-01-01T00:00:00",
                    "colour": "blue",
                    "description": "Updated"
                })),
            )
            .unwrap();

        assert_eq!(updated.name, before.name);
        assert_eq!(updated.provider, "OpenAI");
        assert_eq!(updated.created_at, before.created_at);
        assert_eq!(updated.description, "Updated");
    }

    #[test]
    fn test_update_model_invalid_patch_leaves_file_untouched() {
        let (_temp_dir, manager) = manager();
        let before = manager.get_models_for_provider("OpenAI");

        let result = manager.update_model(
            "OpenAI",
            &before[0].name,
            data(json!({"context_window": 0})),
        );
        assert!(matches!(result, Err(Error::Validation(_, _))));
        assert_eq!(manager.get_models_for_provider("OpenAI"), before);
    }

    #[test]
    fn test_update_missing_model() {
        let (_temp_dir, manager) = manager();
        let result = manager.update_model("OpenAI", "nope", Map::new());
        assert!(matches!(result, Err(Error::ModelNotFound(_, _))));
    }

    #[test]
    fn test_remove_model_is_idempotent() {
        let (_temp_dir, manager) = manager();
        manager.remove_model("OpenAI", "gpt-4o").unwrap();
        manager.remove_model("OpenAI", "gpt-4o").unwrap();

        assert_eq!(
            names(&manager.get_models_for_provider("OpenAI")),
            vec!["gpt-4-turbo", "gpt-3.5-turbo"]
        );
        assert!(manager.get_default_model("OpenAI").is_none());
    }

    #[test]
    fn test_import_flat_list_uses_default_provider() {
        let (temp_dir, manager) = manager();
        let path = temp_dir.path().join("import.json");
        fs::write(
            &path,
            json!([{"name": "m1"}, {"name": "m2", "provider": "X"}]).to_string(),
        )
        .unwrap();

        let count = manager.import_models(&path, Some("Y"), true).unwrap();
        assert_eq!(count, 2);
        assert_eq!(names(&manager.get_models_for_provider("Y")), vec!["m1"]);
        assert_eq!(names(&manager.get_models_for_provider("X")), vec!["m2"]);
    }

    #[test]
    fn test_import_flat_list_without_provider_skips_entry() {
        let (temp_dir, manager) = manager();
        let path = temp_dir.path().join("import.json");
        fs::write(
            &path,
            json!([{"name": "orphan"}, {"name": "m2", "provider": "X"}]).to_string(),
        )
        .unwrap();

        assert_eq!(manager.import_models(&path, None, true).unwrap(), 1);
    }

    #[test]
    fn test_import_merge_updates_and_appends() {
        let (temp_dir, manager) = manager();
        let original = manager.get_models_for_provider("OpenAI");
        let path = temp_dir.path().join("import.json");
        fs::write(
            &path,
            json!({"OpenAI": [
                {"name": "gpt-4o", "description": "Imported", "created_at": "2000-01-01T00:00:00"},
                {"name": "gpt-5"}
            ]})
            .to_string(),
        )
        .unwrap();

        assert_eq!(manager.import_models(&path, None, true).unwrap(), 2);

        let models = manager.get_models_for_provider("OpenAI");
        assert_eq!(
            names(&models),
            vec!["gpt-4o", "gpt-4-turbo", "gpt-3.5-turbo", "gpt-5"]
        );
        assert_eq!(models[0].description, "Imported");
        assert_eq!(models[0].created_at, original[0].created_at);
        assert_eq!(models[0].context_window, original[0].context_window);
        assert!(models[0].is_default);
    }

    #[test]
    fn test_import_overwrite_replaces_and_dedupes() {
        let (temp_dir, manager) = manager();
        let path = temp_dir.path().join("import.json");
        fs::write(
            &path,
            json!({"OpenAI": [
                {"name": "only", "description": "first"},
                {"name": "only", "description": "second"}
            ]})
            .to_string(),
        )
        .unwrap();

        assert_eq!(manager.import_models(&path, None, false).unwrap(), 2);

        let models = manager.get_models_for_provider("OpenAI");
        assert_eq!(names(&models), vec!["only"]);
        assert_eq!(models[0].description, "first");
    }

    #[test]
    fn test_import_merge_keeps_first_duplicate() {
        let (temp_dir, manager) = manager();
        let path = temp_dir.path().join("import.json");
        fs::write(
            &path,
            json!({"Local": [
                {"name": "n", "description": "first"},
                {"name": "n", "description": "second"}
            ]})
            .to_string(),
        )
        .unwrap();

        assert_eq!(manager.import_models(&path, None, true).unwrap(), 2);

        let models = manager.get_models_for_provider("Local");
        assert_eq!(names(&models), vec!["n"]);
        assert_eq!(models[0].description, "first");
    }

    #[test]
    fn test_import_errors() {
        let (temp_dir, manager) = manager();
        let path = temp_dir.path().join("import.json");

        fs::write(&path, "42").unwrap();
        assert!(matches!(
            manager.import_models(&path, None, true),
            Err(Error::UnsupportedImportFormat(_))
        ));

        fs::write(&path, json!([{"description": "nameless"}]).to_string()).unwrap();
        assert!(matches!(
            manager.import_models(&path, Some("Y"), true),
            Err(Error::NothingImported(_))
        ));

        assert!(matches!(
            manager.import_models(&temp_dir.path().join("missing.json"), None, true),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn test_restore_single_provider() {
        let (_temp_dir, manager) = manager();
        manager.remove_model("Google", "gemini-1.0-pro").unwrap();

        assert_eq!(manager.restore_defaults(Some("Google")).unwrap(), 1);
        assert_eq!(manager.get_models_for_provider("Google").len(), 2);
    }

    #[test]
    fn test_restore_unknown_provider() {
        let (_temp_dir, manager) = manager();
        assert!(matches!(
            manager.restore_defaults(Some("Nobody")),
            Err(Error::NoDefaultModels(_))
        ));
    }

    #[test]
    fn test_restore_all_leaves_custom_providers() {
        let (_temp_dir, manager) = manager();
        manager.add_model("Local", data(json!({"name": "m"}))).unwrap();
        manager.remove_model("deepseek", "deepseek-coder").unwrap();

        assert_eq!(manager.restore_defaults(None).unwrap(), 8);
        assert_eq!(manager.get_models_for_provider("deepseek").len(), 1);
        assert_eq!(manager.get_models_for_provider("Local").len(), 1);
    }

    #[test]
    fn test_export_single_provider() {
        let (_temp_dir, manager) = manager();
        let export = manager.export_models(Some("nobody"));
        assert_eq!(export.len(), 1);
        assert!(export["nobody"].is_empty());
    }

    #[test]
    fn test_export_all_groups_by_recorded_provider() {
        let (_temp_dir, manager) = manager();
        fs::write(
            manager.storage_path().join("extra_models.json"),
            json!([
                {"name": "claude-3-haiku-20240307", "provider": "Anthropic"},
                {"name": "claude-next", "provider": "Anthropic"}
            ])
            .to_string(),
        )
        .unwrap();

        let export = manager.export_models(None);
        assert_eq!(export.len(), 8);
        assert!(!export.contains_key("extra"));
        assert_eq!(export["Anthropic"].len(), 4);
        assert_eq!(export["OpenAI"].len(), 3);
    }

    #[test]
    fn test_export_to_file() {
        let (temp_dir, manager) = manager();
        let path = temp_dir.path().join("export.json");

        let count = manager.export_models_to_file(&path, Some("OpenAI")).unwrap();
        assert_eq!(count, 3);

        let written = load_json(&path, "test").unwrap();
        assert_eq!(written["OpenAI"].as_array().unwrap().len(), 3);
    }
}
