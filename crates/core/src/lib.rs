//! ra-aid-start Core Library
//!
//! This crate provides the core functionality for ra-aid-start, a preset and
//! model manager for the `ra-aid` command-line tool. Presets are named
//! bundles of `ra-aid` flags that are turned into shell command lines and can
//! be executed; models are per-provider LLM metadata lists.
//!
//! # Key Features
//!
//! - **Presets**: Create, update, rename, delete and execute stored presets
//! - **Command Building**: Render presets as safely quoted `ra-aid` commands
//! - **Model Catalog**: Per-provider model lists seeded from built-in defaults
//! - **Import/Export**: Move model lists between installations as JSON
//! - **Error Handling**: Typed errors for every failure mode
//!
//! # Examples
//!
//! Creating and inspecting a preset:
//!
//! ```no_run
//! use ra_aid_start_core::config::StorageConfig;
//! use ra_aid_start_core::preset_manager::PresetManager;
//! use serde_json::json;
//!
//! let manager = PresetManager::new(&StorageConfig::resolve(&None))?;
//! let preset = manager.create_preset(json!({
//!     "name": "daily",
//!     "operation_mode": "chat",
//!     "flags": {"cowboy_mode": true}
//! }))?;
//! println!("{}", preset.command);
//! # Ok::<(), ra_aid_start_core::error::Error>(())
//! ```

pub mod command_builder;
pub mod config;
pub mod default_models;
pub mod error;
pub mod execution;
pub mod file_handling;
pub mod model;
pub mod model_manager;
pub mod preset;
pub mod preset_manager;
pub mod validation;
