//! Advisory checks for preset flag values.
//!
//! These rules never reject a preset on their own. They return a list of
//! human-readable problems that a front end can show or enforce.

use serde_json::Value;

use crate::preset::Flags;

struct NumericRange {
    key: &'static str,
    min: f64,
    max: Option<f64>,
}

const NUMERIC_RANGES: &[NumericRange] = &[
    NumericRange { key: "recursion_limit", min: 0.0, max: None },
    NumericRange { key: "max_total_tokens", min: 1.0, max: None },
    NumericRange { key: "max_input_tokens", min: 1.0, max: None },
    NumericRange { key: "max_output_tokens", min: 1.0, max: None },
    NumericRange { key: "temperature", min: 0.0, max: Some(2.0) },
    NumericRange { key: "top_p", min: 0.0, max: Some(1.0) },
    NumericRange { key: "top_k", min: 0.0, max: None },
    NumericRange { key: "frequency_penalty", min: -2.0, max: Some(2.0) },
    NumericRange { key: "presence_penalty", min: -2.0, max: Some(2.0) },
    NumericRange { key: "api_port", min: 0.0, max: Some(65535.0) },
];

const PATH_KEYS: [&str; 6] = [
    "chat_history_file",
    "chat_persona_file",
    "project_state_dir",
    "custom_tools",
    "log_file",
    "aider_config",
];

const PAIRED_KEYS: [(&str, &str); 2] = [
    ("main_model_provider", "main_model_name"),
    ("provider", "model"),
];

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

fn check_range(range: &NumericRange, value: &Value) -> Option<String> {
    let Some(number) = value.as_f64() else {
        return Some(format!("`{}` must be a number, got {}", range.key, value));
    };

    let too_high = range.max.is_some_and(|max| number > max);
    if number < range.min || too_high {
        let bounds = match range.max {
            Some(max) => format!("between {} and {}", range.min, max),
            None => format!("at least {}", range.min),
        };
        return Some(format!("`{}` must be {}, got {}", range.key, bounds, value));
    }

    None
}

/// Returns every problem found in `flags`. An empty list means the flags
/// look usable.
pub fn validate_preset_flags(flags: &Flags) -> Vec<String> {
    let mut problems = Vec::new();

    for range in NUMERIC_RANGES {
        if let Some(value) = flags.get(range.key) {
            problems.extend(check_range(range, value));
        }
    }

    for key in PATH_KEYS {
        match flags.get(key) {
            None | Some(Value::String(_)) => {}
            Some(other) => problems.push(format!("`{key}` must be a path string, got {other}")),
        }
    }

    for (first, second) in PAIRED_KEYS {
        let first_value = flags.get(first);
        let second_value = flags.get(second);
        if first_value.is_none() && second_value.is_none() {
            continue;
        }

        if is_blank(first_value) || is_blank(second_value) {
            problems.push(format!("`{first}` and `{second}` must be set together"));
        }
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flags(value: Value) -> Flags {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_flags_have_no_problems() {
        assert!(validate_preset_flags(&Flags::new()).is_empty());
    }

    #[test]
    fn test_values_in_range() {
        let flags = flags(json!({
            "temperature": 0.7,
            "top_p": 1,
            "recursion_limit": 0,
            "max_total_tokens": 1,
            "frequency_penalty": -2,
            "api_port": 8080,
            "cowboy_mode": true
        }));
        assert!(validate_preset_flags(&flags).is_empty());
    }

    #[test]
    fn test_values_out_of_range() {
        let flags = flags(json!({
            "temperature": 2.5,
            "top_p": -0.1,
            "max_output_tokens": 0,
            "api_port": 70000
        }));
        let problems = validate_preset_flags(&flags);
        assert_eq!(problems.len(), 4);
        assert!(problems[0].starts_with("`max_output_tokens` must be at least 1"));
        assert!(problems[1].starts_with("`temperature` must be between 0 and 2"));
    }

    #[test]
    fn test_non_numeric_value() {
        let problems = validate_preset_flags(&flags(json!({"temperature": "hot"})));
        assert_eq!(problems, vec!["`temperature` must be a number, got \"hot\""]);
    }

    #[test]
    fn test_path_keys_must_be_strings() {
        let problems = validate_preset_flags(&flags(json!({
            "log_file": "ras.log",
            "custom_tools": 3
        })));
        assert_eq!(problems, vec!["`custom_tools` must be a path string, got 3"]);
    }

    #[test]
    fn test_provider_and_model_go_together() {
        assert!(validate_preset_flags(&flags(json!({
            "provider": "anthropic",
            "model": "claude-3-haiku-20240307"
        })))
        .is_empty());

        let problems = validate_preset_flags(&flags(json!({"main_model_provider": "openai"})));
        assert_eq!(
            problems,
            vec!["`main_model_provider` and `main_model_name` must be set together"]
        );

        let problems = validate_preset_flags(&flags(json!({"provider": "openai", "model": " "})));
        assert_eq!(problems.len(), 1);
    }
}
