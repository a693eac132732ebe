use ra_aid_start_core::config::{expand_path, StorageConfig};
use ra_aid_start_core::error::{Error, Result};
use ra_aid_start_core::model::Model;
use ra_aid_start_core::model_manager::ModelManager;
use serde_json::{Map, Value};

use crate::arguments::parse_flag_arguments;
use crate::cli_args::ModelCommand;
use crate::output::{confirm, print_heading, print_success, print_suggestions, print_warning};

/// Runs one `ras model` subcommand.
///
/// # Errors
///
/// Returns an error if the storage can't be opened or the operation fails.
pub fn execute(config: &StorageConfig, command: &ModelCommand) -> Result<()> {
    let manager = ModelManager::new(config)?;

    match command {
        ModelCommand::Providers => {
            let providers = manager.get_available_providers();
            if providers.is_empty() {
                println!("No providers found in `{}`", manager.storage_path().display());
            }
            for provider in providers {
                println!("{provider}");
            }
            Ok(())
        }
        ModelCommand::List { provider } => list(&manager, provider),
        ModelCommand::Add {
            provider,
            name,
            description,
            context_window,
            default,
            fields,
        } => {
            let mut data = fields_map(fields)?;
            data.insert("name".to_string(), Value::String(name.clone()));
            if let Some(description) = description {
                data.insert("description".to_string(), Value::String(description.clone()));
            }
            if let Some(context_window) = context_window {
                data.insert("context_window".to_string(), Value::from(*context_window));
            }
            add(&manager, provider, data, *default)
        }
        ModelCommand::Update {
            provider,
            name,
            fields,
        } => {
            let updated = suggest_on_missing(
                &manager,
                manager.update_model(provider, name, fields_map(fields)?),
            )?;
            print_success(&format!("Model `{updated}` updated"))
        }
        ModelCommand::Remove { provider, name } => {
            let existed = manager
                .get_models_for_provider(provider)
                .iter()
                .any(|model| model.name == *name);
            manager.remove_model(provider, name)?;
            if existed {
                print_success(&format!("Model `{name}` removed from `{provider}`"))
            } else {
                print_warning(&format!("Model `{name}` did not exist for `{provider}`"))
            }
        }
        ModelCommand::Export { provider, output } => {
            export(&manager, provider.as_deref(), output.as_deref())
        }
        ModelCommand::Import {
            file,
            provider,
            overwrite,
        } => {
            let path = expand_path(file);
            let count = manager.import_models(&path, provider.as_deref(), !*overwrite)?;
            print_success(&format!("Imported {count} models from `{file}`"))
        }
        ModelCommand::Restore { provider, yes } => restore(&manager, provider.as_deref(), *yes),
    }
}

fn fields_map(fields: &[String]) -> Result<Map<String, Value>> {
    Ok(parse_flag_arguments(fields)?.into_iter().collect())
}

/// Prints name suggestions when `result` is a missing model.
fn suggest_on_missing<T>(manager: &ModelManager, result: Result<T>) -> Result<T> {
    if let Err(Error::ModelNotFound(provider, name)) = &result {
        let models = manager.get_models_for_provider(provider);
        print_suggestions(name, models.iter().map(|model| model.name.as_str()))?;
    }
    result
}

fn format_model(model: &Model) -> String {
    let mut line = model.name.clone();
    if model.is_default {
        line.push_str(" (default)");
    }
    if let Some(context_window) = model.context_window {
        line.push_str(&format!(" [{context_window} tokens]"));
    }
    if !model.description.is_empty() {
        line.push_str(&format!(": {}", model.description));
    }
    line
}

fn list(manager: &ModelManager, provider: &str) -> Result<()> {
    let models = manager.get_models_for_provider(provider);
    if models.is_empty() {
        print_warning(&format!("No models found for `{provider}`"))?;
        let providers = manager.get_available_providers();
        return print_suggestions(provider, providers.iter().map(String::as_str));
    }

    print_heading(provider)?;
    for model in &models {
        println!("    {}", format_model(model));
        if !model.recommended_for.is_empty() {
            println!("        recommended for: {}", model.recommended_for.join(", "));
        }
    }
    Ok(())
}

fn add(
    manager: &ModelManager,
    provider: &str,
    mut data: Map<String, Value>,
    default: bool,
) -> Result<()> {
    // The default is set through `update_model`, which clears the previous one
    let default = default || data.remove("is_default") == Some(Value::Bool(true));
    let mut model = manager.add_model(provider, data)?;

    if default {
        let mut patch = Map::new();
        patch.insert("is_default".to_string(), Value::Bool(true));
        model = manager.update_model(provider, &model.name, patch)?;
    }

    print_success(&format!("Model `{model}` added"))
}

fn export(manager: &ModelManager, provider: Option<&str>, output: Option<&str>) -> Result<()> {
    match output {
        Some(output) => {
            let path = expand_path(output);
            let count = manager.export_models_to_file(&path, provider)?;
            print_success(&format!("Exported {count} models to `{}`", path.display()))
        }
        None => {
            let export = manager.export_models(provider);
            let text = serde_json::to_string_pretty(&export).map_err(|e| {
                Error::json_error("writing", "model export", "<stdout>".to_string(), e)
            })?;
            println!("{text}");
            Ok(())
        }
    }
}

fn restore(manager: &ModelManager, provider: Option<&str>, yes: bool) -> Result<()> {
    let target = provider.unwrap_or("every built-in provider");
    let question = format!("Replace the models of {target} with the defaults?");
    if !yes && !confirm(&question)? {
        println!("Restore cancelled.");
        return Ok(());
    }

    let restored = manager.restore_defaults(provider)?;
    print_success(&format!("Restored default models for {restored} providers"))
}
