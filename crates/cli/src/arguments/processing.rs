use ra_aid_start_core::error::Error::FlagFormat;
use ra_aid_start_core::error::Result;
use ra_aid_start_core::preset::Flags;
use serde_json::Value;

/// Converts the text after `=` into a JSON value.
///
/// JSON scalars and lists are parsed as such. Objects and anything that
/// isn't valid JSON are kept as plain strings.
pub fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(_)) | Err(_) => Value::String(raw.to_string()),
        Ok(value) => value,
    }
}

/// Parses one `key` or `key=value` argument.
///
/// # Errors
///
/// Returns an error if the key is empty.
pub fn parse_flag_argument(argument: &str) -> Result<(String, Value)> {
    let (key, value) = match argument.split_once('=') {
        Some((key, raw)) => (key.trim(), parse_value(raw)),
        None => (argument.trim(), Value::Bool(true)),
    };

    if key.is_empty() {
        return Err(FlagFormat(argument.to_string()));
    }

    Ok((key.to_string(), value))
}

/// Parses repeated flag arguments in order. A repeated key keeps its first
/// position and its last value.
///
/// # Errors
///
/// Returns an error for the first malformed argument.
pub fn parse_flag_arguments(arguments: &[String]) -> Result<Flags> {
    let mut flags = Flags::new();
    for argument in arguments {
        let (key, value) = parse_flag_argument(argument)?;
        flags.insert(key, value);
    }
    Ok(flags)
}
