use ra_aid_start_core::config::{expand_working_directory, StorageConfig};
use ra_aid_start_core::error::{Error, Result};
use ra_aid_start_core::preset::{Flags, OperationMode, Preset};
use ra_aid_start_core::preset_manager::PresetManager;
use ra_aid_start_core::validation::validate_preset_flags;
use serde_json::{Map, Value};

use crate::arguments::parse_flag_arguments;
use crate::cli_args::PresetCommand;
use crate::output::{confirm, print_heading, print_success, print_suggestions, print_warning};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Runs one `ras preset` subcommand.
///
/// # Errors
///
/// Returns an error if the storage can't be opened or the operation fails.
pub fn execute(config: &StorageConfig, command: &PresetCommand) -> Result<()> {
    let manager = PresetManager::new(config)?;

    match command {
        PresetCommand::List => list(&manager),
        PresetCommand::Show { name } => show(&manager, name),
        PresetCommand::Create {
            name,
            mode,
            description,
            flags,
            overwrite,
            force,
        } => create(
            &manager,
            name,
            mode,
            description.as_deref(),
            flags,
            *overwrite,
            *force,
        ),
        PresetCommand::Update {
            name,
            mode,
            description,
            flags,
            unset,
            force,
        } => {
            let mut patch = Map::new();
            if let Some(mode) = mode {
                warn_on_unknown_mode(mode)?;
                patch.insert("operation_mode".to_string(), Value::String(mode.clone()));
            }
            if let Some(description) = description {
                patch.insert("description".to_string(), Value::String(description.clone()));
            }
            update(&manager, name, patch, flags, unset, *force)
        }
        PresetCommand::Rename { old_name, new_name } => {
            let renamed = suggest_on_missing(&manager, manager.rename_preset(old_name, new_name))?;
            print_success(&format!("Preset `{old_name}` renamed to `{}`", renamed.name))
        }
        PresetCommand::Delete { name } => {
            let existed = manager.preset_exists(name);
            manager.delete_preset(name)?;
            if existed {
                print_success(&format!("Preset `{name}` deleted"))
            } else {
                print_warning(&format!("Preset `{name}` did not exist"))
            }
        }
        PresetCommand::Run {
            name,
            cwd,
            yes,
            dry_run,
        } => run(&manager, name, cwd, *yes, *dry_run),
    }
}

/// Prints name suggestions when `result` is a missing preset.
fn suggest_on_missing<T>(manager: &PresetManager, result: Result<T>) -> Result<T> {
    if let Err(Error::PresetNotFound(name)) = &result {
        let presets = manager.list_presets();
        print_suggestions(name, presets.iter().map(|preset| preset.name.as_str()))?;
    }
    result
}

fn load_existing(manager: &PresetManager, name: &str) -> Result<Preset> {
    let loaded = manager
        .load_preset(name)
        .and_then(|preset| preset.ok_or_else(|| Error::PresetNotFound(name.to_string())));
    suggest_on_missing(manager, loaded)
}

fn warn_on_unknown_mode(mode: &str) -> Result<()> {
    if mode.parse::<OperationMode>().is_ok() {
        return Ok(());
    }

    let known = OperationMode::ALL.map(OperationMode::as_str).join(", ");
    print_warning(&format!(
        "Unknown operation mode `{mode}` adds no mode flag (known modes: {known})"
    ))
}

/// Prints flag problems and refuses to continue unless forced.
fn check_flags(name: &str, flags: &Flags, force: bool) -> Result<()> {
    let problems = validate_preset_flags(flags);
    if problems.is_empty() {
        return Ok(());
    }

    for problem in &problems {
        print_warning(problem)?;
    }

    if force {
        return print_warning("Saving anyway because --force was given");
    }

    Err(Error::InvalidFlags(name.to_string(), problems.join("; ")))
}

fn flags_value(flags: Flags) -> Value {
    Value::Object(flags.into_iter().collect())
}

fn list(manager: &PresetManager) -> Result<()> {
    let presets = manager.list_presets();
    if presets.is_empty() {
        println!("No presets found in `{}`", manager.storage_path().display());
        return Ok(());
    }

    for preset in presets {
        print_heading(&preset.to_string())?;
        println!("    {}", preset.command);
    }
    Ok(())
}

fn show(manager: &PresetManager, name: &str) -> Result<()> {
    let preset = load_existing(manager, name)?;

    print_heading(&preset.name)?;
    if !preset.description.is_empty() {
        println!("Description: {}", preset.description);
    }
    println!("Operation mode: {}", preset.operation_mode);
    if preset.flags.is_empty() {
        println!("Flags: none");
    } else {
        println!("Flags:");
        for (key, value) in &preset.flags {
            println!("    {key} = {value}");
        }
    }
    println!("Command: {}", preset.command);
    println!("Created: {}", preset.created_at.format(TIMESTAMP_FORMAT));
    println!("Updated: {}", preset.updated_at.format(TIMESTAMP_FORMAT));

    for problem in validate_preset_flags(&preset.flags) {
        print_warning(&problem)?;
    }
    Ok(())
}

fn create(
    manager: &PresetManager,
    name: &str,
    mode: &str,
    description: Option<&str>,
    flag_arguments: &[String],
    overwrite: bool,
    force: bool,
) -> Result<()> {
    if manager.preset_exists(name) && !overwrite {
        return Err(Error::PresetExists(name.to_string()));
    }

    let flags = parse_flag_arguments(flag_arguments)?;
    check_flags(name, &flags, force)?;
    warn_on_unknown_mode(mode)?;

    let mut data = Map::new();
    data.insert("name".to_string(), Value::String(name.to_string()));
    data.insert(
        "description".to_string(),
        Value::String(description.unwrap_or_default().to_string()),
    );
    data.insert("operation_mode".to_string(), Value::String(mode.to_string()));
    data.insert("flags".to_string(), flags_value(flags));

    let preset = manager.create_preset(Value::Object(data))?;
    print_success(&format!("Preset `{}` saved", preset.name))?;
    println!("Command: {}", preset.command);
    Ok(())
}

fn update(
    manager: &PresetManager,
    name: &str,
    mut patch: Map<String, Value>,
    flag_arguments: &[String],
    unset: &[String],
    force: bool,
) -> Result<()> {
    let existing = load_existing(manager, name)?;

    let mut flags = existing.flags;
    for key in unset {
        if flags.shift_remove(key).is_none() {
            print_warning(&format!("Flag `{key}` is not set"))?;
        }
    }
    flags.extend(parse_flag_arguments(flag_arguments)?);
    check_flags(&existing.name, &flags, force)?;

    patch.insert("flags".to_string(), flags_value(flags));

    let updated = manager.update_preset(name, patch)?;
    print_success(&format!("Preset `{}` updated", updated.name))?;
    println!("Command: {}", updated.command);
    Ok(())
}

fn run(
    manager: &PresetManager,
    name: &str,
    cwd: &Option<String>,
    yes: bool,
    dry_run: bool,
) -> Result<()> {
    let preset = load_existing(manager, name)?;
    let working_directory = expand_working_directory(cwd);

    print_heading("Executing command:")?;
    println!("{}", preset.command);
    if let Some(working_directory) = &working_directory {
        println!("In directory: {}", working_directory.display());
    }

    if dry_run {
        println!("Dry run is specified, exiting without executing.");
        return Ok(());
    }

    if !yes && !confirm("Are you sure you want to run?")? {
        println!("Command execution cancelled.");
        return Ok(());
    }

    let output = manager.execute_preset(name, working_directory.as_deref())?;
    if !output.stdout.is_empty() {
        println!("{}", output.stdout);
    }
    if !output.stderr.is_empty() {
        eprintln!("{}", output.stderr);
    }

    print_success(&format!("Preset `{}` finished successfully", preset.name))
}
