//! Terminal output helpers: colored status lines, the run confirmation
//! prompt and "did you mean" suggestions for unknown names.

use std::io::{stdin, stdout, BufRead, Write};

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use itertools::Itertools;
use ra_aid_start_core::error::{Error, Result};

const MAX_SUGGESTIONS: usize = 3;

fn print_colored(color: Color, message: &str) -> Result<()> {
    let mut stdout = stdout();
    queue!(
        stdout,
        SetForegroundColor(color),
        Print(message),
        ResetColor,
        Print("\n")
    )
    .map_err(Error::Stdio)?;
    stdout.flush().map_err(Error::Stdio)
}

pub fn print_success(message: &str) -> Result<()> {
    print_colored(Color::Green, message)
}

pub fn print_warning(message: &str) -> Result<()> {
    print_colored(Color::Yellow, message)
}

pub fn print_heading(message: &str) -> Result<()> {
    print_colored(Color::Cyan, message)
}

/// Asks a yes/no question, defaulting to yes on empty input.
pub fn confirm(question: &str) -> Result<bool> {
    confirm_from(question, &mut stdin().lock())
}

fn confirm_from(question: &str, input: &mut impl BufRead) -> Result<bool> {
    loop {
        print!("{question} ([Y]es/[n]o): ");
        stdout().flush().map_err(Error::Stdio)?;

        let mut answer = String::new();
        if input.read_line(&mut answer).map_err(Error::Stdio)? == 0 {
            // Closed stdin
            return Ok(false);
        }

        match answer.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {}
        }
    }
}

/// The candidates that best fuzzy-match `target`, best match first.
pub fn suggestions<'a>(target: &str, candidates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let matcher = SkimMatcherV2::default().ignore_case();

    candidates
        .into_iter()
        .filter_map(|candidate| {
            matcher
                .fuzzy_match(candidate, target)
                .map(|score| (score, candidate))
        })
        .sorted_by(|(s1, c1), (s2, c2)| s2.cmp(s1).then_with(|| c1.cmp(c2)))
        .map(|(_, candidate)| candidate.to_string())
        .dedup()
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Prints suggestions for an unknown `target`, if there are any.
pub fn print_suggestions<'a>(
    target: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let suggestions = suggestions(target, candidates);
    if suggestions.is_empty() {
        return Ok(());
    }

    print_warning(&format!("Did you mean: {}?", suggestions.join(", ")))
}
