//! Flag argument processing for the ras CLI.
//!
//! Preset flags and model fields are given on the command line as repeated
//! `key` or `key=value` arguments:
//! - **Bare keys**: `-f cowboy_mode` sets the flag to `true`
//! - **JSON values**: `-f temperature=0.7` or `-f files=["a.py","b.py"]`
//! - **Plain text**: anything that isn't a JSON scalar or list is kept as a
//!   string, so `-f model=gpt-4o` needs no quoting

pub mod processing;

pub use processing::{parse_flag_argument, parse_flag_arguments, parse_value};
