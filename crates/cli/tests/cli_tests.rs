//! End-to-end tests of the `ras` subcommands against a temporary storage root.

use std::fs;

use clap::Parser;
use ra_aid_start_cli::cli_args::Args;
use ra_aid_start_cli::commands;
use ra_aid_start_core::config::StorageConfig;
use ra_aid_start_core::error::{Error, Result};
use ra_aid_start_core::model_manager::ModelManager;
use ra_aid_start_core::preset_manager::PresetManager;
use serde_json::json;
use tempfile::TempDir;

fn run(temp_dir: &TempDir, arguments: &[&str]) -> Result<()> {
    let root = temp_dir.path().to_str().unwrap();
    let mut full = vec!["ras", "--storage-root", root];
    full.extend_from_slice(arguments);
    commands::execute(&Args::parse_from(full))
}

fn presets(temp_dir: &TempDir) -> PresetManager {
    PresetManager::new(&StorageConfig::new(temp_dir.path())).unwrap()
}

fn models(temp_dir: &TempDir) -> ModelManager {
    ModelManager::new(&StorageConfig::new(temp_dir.path())).unwrap()
}

#[test]
fn test_storage_config_from_global_options() {
    let args = Args::parse_from(["ras", "-s", "/data/ras", "--shell", "/bin/bash", "preset", "list"]);
    let config = commands::storage_config(&args);

    assert_eq!(config.root, std::path::PathBuf::from("/data/ras"));
    assert_eq!(config.shell, "/bin/bash");
}

#[test]
fn test_create_and_update_preset() {
    let temp_dir = TempDir::new().unwrap();

    run(
        &temp_dir,
        &[
            "preset", "create", "Daily", "-m", "chat", "-d", "Everyday", "-f", "cowboy_mode", "-f",
            "temperature=0.7",
        ],
    )
    .unwrap();

    let preset = presets(&temp_dir).load_preset("daily").unwrap().unwrap();
    assert_eq!(preset.name, "Daily");
    assert_eq!(preset.description, "Everyday");
    assert_eq!(preset.command, "ra-aid --chat --cowboy-mode --temperature 0.7");

    run(
        &temp_dir,
        &["preset", "update", "daily", "-u", "cowboy_mode", "-f", "temperature=0.2", "-m", "agent"],
    )
    .unwrap();

    let preset = presets(&temp_dir).load_preset("Daily").unwrap().unwrap();
    assert_eq!(preset.operation_mode, "agent");
    assert_eq!(preset.command, "ra-aid --agent-mode --temperature 0.2");
}

#[test]
fn test_create_refuses_existing_preset_without_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    run(&temp_dir, &["preset", "create", "p", "-m", "chat"]).unwrap();

    let result = run(&temp_dir, &["preset", "create", "P", "-m", "file"]);
    assert!(matches!(result, Err(Error::PresetExists(_))));

    run(&temp_dir, &["preset", "create", "P", "-m", "file", "--overwrite"]).unwrap();
    let preset = presets(&temp_dir).load_preset("p").unwrap().unwrap();
    assert_eq!(preset.operation_mode, "file");
}

#[test]
fn test_invalid_flags_need_force() {
    let temp_dir = TempDir::new().unwrap();

    let result = run(&temp_dir, &["preset", "create", "hot", "-m", "chat", "-f", "temperature=5"]);
    assert!(matches!(result, Err(Error::InvalidFlags(_, _))));
    assert!(!presets(&temp_dir).preset_exists("hot"));

    run(
        &temp_dir,
        &["preset", "create", "hot", "-m", "chat", "-f", "temperature=5", "--force"],
    )
    .unwrap();
    assert!(presets(&temp_dir).preset_exists("hot"));
}

#[test]
fn test_malformed_flag_argument() {
    let temp_dir = TempDir::new().unwrap();
    let result = run(&temp_dir, &["preset", "create", "p", "-m", "chat", "-f", "=oops"]);
    assert!(matches!(result, Err(Error::FlagFormat(_))));
}

#[test]
fn test_show_rename_and_delete() {
    let temp_dir = TempDir::new().unwrap();
    run(&temp_dir, &["preset", "create", "research", "-m", "message"]).unwrap();

    run(&temp_dir, &["preset", "show", "research"]).unwrap();
    assert!(matches!(
        run(&temp_dir, &["preset", "show", "reserch"]),
        Err(Error::PresetNotFound(_))
    ));

    run(&temp_dir, &["preset", "rename", "research", "deep-research"]).unwrap();
    assert!(presets(&temp_dir).preset_exists("deep-research"));

    run(&temp_dir, &["preset", "delete", "deep-research"]).unwrap();
    run(&temp_dir, &["preset", "delete", "deep-research"]).unwrap();
    run(&temp_dir, &["preset", "list"]).unwrap();
    assert!(presets(&temp_dir).list_presets().is_empty());
}

#[test]
fn test_run_preset() {
    let temp_dir = TempDir::new().unwrap();
    let manager = presets(&temp_dir);
    for (name, command) in [("greet", "echo hello"), ("fails", "false")] {
        fs::write(
            manager.storage_path().join(format!("{name}.json")),
            json!({"name": name, "operation_mode": "chat", "command": command}).to_string(),
        )
        .unwrap();
    }

    run(&temp_dir, &["preset", "run", "fails", "--dry-run"]).unwrap();
    run(&temp_dir, &["preset", "run", "greet", "--yes"]).unwrap();

    let cwd = temp_dir.path().to_str().unwrap();
    run(&temp_dir, &["preset", "run", "greet", "--yes", "--cwd", cwd]).unwrap();

    assert!(matches!(
        run(&temp_dir, &["preset", "run", "fails", "--yes"]),
        Err(Error::SubProcessExit { .. })
    ));
}

#[test]
fn test_model_add_and_update() {
    let temp_dir = TempDir::new().unwrap();

    run(
        &temp_dir,
        &[
            "model", "add", "Anthropic", "claude-next", "--context-window", "200000", "--default",
            "--set", "recommended_for=[\"coding\"]",
        ],
    )
    .unwrap();

    let manager = models(&temp_dir);
    let default = manager.get_default_model("Anthropic").unwrap();
    assert_eq!(default.name, "claude-next");
    assert_eq!(default.context_window, Some(200_000));
    assert_eq!(default.recommended_for, vec!["coding"]);
    assert_eq!(default.created_by, "user");
    assert_eq!(
        manager
            .get_models_for_provider("Anthropic")
            .iter()
            .filter(|model| model.is_default)
            .count(),
        1
    );

    run(
        &temp_dir,
        &["model", "update", "Anthropic", "claude-next", "--set", "description=Preview"],
    )
    .unwrap();
    assert_eq!(
        models(&temp_dir).get_default_model("Anthropic").unwrap().description,
        "Preview"
    );

    assert!(matches!(
        run(&temp_dir, &["model", "update", "Anthropic", "claude-nxt"]),
        Err(Error::ModelNotFound(_, _))
    ));
    assert!(matches!(
        run(&temp_dir, &["model", "add", "Anthropic", "claude-next"]),
        Err(Error::DuplicateModel(_, _))
    ));
}

#[test]
fn test_model_add_default_through_fields() {
    let temp_dir = TempDir::new().unwrap();
    let previous = models(&temp_dir).get_default_model("Anthropic").unwrap();

    run(
        &temp_dir,
        &["model", "add", "Anthropic", "claude-local", "--default", "--set", "is_default=true"],
    )
    .unwrap();
    run(
        &temp_dir,
        &["model", "add", "Anthropic", "claude-other", "--set", "is_default=true"],
    )
    .unwrap();

    let manager = models(&temp_dir);
    let defaults: Vec<_> = manager
        .get_models_for_provider("Anthropic")
        .into_iter()
        .filter(|model| model.is_default)
        .map(|model| model.name)
        .collect();
    assert_eq!(defaults, vec!["claude-other"]);
    assert_ne!(previous.name, "claude-other");
}

#[test]
fn test_model_listing_commands() {
    let temp_dir = TempDir::new().unwrap();
    run(&temp_dir, &["model", "providers"]).unwrap();
    run(&temp_dir, &["model", "list", "OpenAI"]).unwrap();
    run(&temp_dir, &["model", "list", "openaii"]).unwrap();
    run(&temp_dir, &["model", "export", "--provider", "Google"]).unwrap();
}

#[test]
fn test_model_export_import_and_restore() {
    let source = TempDir::new().unwrap();
    run(&source, &["model", "add", "Local", "llama3"]).unwrap();
    run(&source, &["model", "remove", "OpenAI", "gpt-3.5-turbo"]).unwrap();

    let export_path = source.path().join("export.json");
    let export = export_path.to_str().unwrap();
    run(&source, &["model", "export", "-o", export]).unwrap();

    let target = TempDir::new().unwrap();
    run(&target, &["model", "import", export, "--overwrite"]).unwrap();

    let manager = models(&target);
    assert_eq!(manager.get_models_for_provider("OpenAI").len(), 2);
    assert_eq!(manager.get_models_for_provider("Local").len(), 1);

    run(&target, &["model", "restore", "-p", "OpenAI", "--yes"]).unwrap();
    assert_eq!(models(&target).get_models_for_provider("OpenAI").len(), 3);

    assert!(matches!(
        run(&target, &["model", "restore", "-p", "Local", "--yes"]),
        Err(Error::NoDefaultModels(_))
    ));
}
