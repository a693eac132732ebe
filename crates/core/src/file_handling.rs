//! JSON file handling for ra-aid-start storage.
//!
//! This module provides the small set of file primitives the managers are
//! built on: reading and writing JSON documents, making sure a directory
//! exists, and listing the JSON files of a storage directory.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};

use crate::config::display_path;
use crate::error::{Error, Result};

const JSON_INDENT: &[u8] = b"    ";

fn get_reader(file_description: &str, path: &Path) -> Result<File> {
    File::open(path).map_err(|e| Error::io_error(file_description, display_path(path), e))
}

/// Creates `directory` and all of its parents if they are missing.
///
/// # Errors
///
/// Returns an IO error if the directory cannot be created, or if the path
/// exists and is not a directory.
pub fn ensure_dir_exists(directory: &Path, description: &str) -> Result<()> {
    fs::create_dir_all(directory)
        .map_err(|e| Error::io_error(description, display_path(directory), e))
}

/// Reads and parses a JSON document.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or does not contain valid JSON.
pub fn load_json(path: &Path, file_description: &str) -> Result<Value> {
    let reader = BufReader::new(get_reader(file_description, path)?);

    // Schema checks happen per entry in the callers
    serde_json::from_reader(reader)
        .map_err(|e| Error::json_error("reading", file_description, display_path(path), e))
}

/// Reads a JSON document, returning None if the file doesn't exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_json_if_exists(path: &Path, file_description: &str) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }

    load_json(path, file_description).map(Some)
}

/// Serializes `data` as 4-space indented JSON, overwriting `path`.
///
/// The parent directory is created if needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created, or if
/// serialization or writing fails.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T, file_description: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent, file_description)?;
    }

    let file = File::create(path)
        .map_err(|e| Error::io_error(file_description, display_path(path), e))?;
    let mut writer = BufWriter::new(file);

    let mut serializer =
        Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(JSON_INDENT));
    data.serialize(&mut serializer)
        .map_err(|e| Error::json_error("writing", file_description, display_path(path), e))?;

    writer
        .flush()
        .map_err(|e| Error::io_error(file_description, display_path(path), e))
}

/// Lists the files in `directory` whose names end with `suffix`, sorted by
/// file name.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn list_files_with_suffix(directory: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(directory)
        .map_err(|e| Error::io_error("storage directory", display_path(directory), e))?;

    Ok(entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(suffix))
        })
        .sorted()
        .collect())
}
