//! Album selection expressions: `all`, `3`, `1-5`, `1,3-7,10`.
//!
//! Indices are 1-based. A selection is accepted only when every index it
//! names exists in the catalog.

use crate::scanner::Album;
use album_utils::{report_recoverable, AppError, Prompter};
use std::collections::BTreeSet;
use std::io;
use std::num::IntErrorKind;
use tracing::{debug, info};

/// Longest range accepted in a single token.
pub const MAX_RANGE_SPAN: usize = 100_000;

const SELECTION_EXAMPLES: &str = "Examples: '1,3,5' or '1-5' or '1,3-7,10' or 'all'";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Indices(BTreeSet<usize>),
}

/// Digits too large for `usize` saturate; no catalog is that long, so they
/// fail validation as out of range.
fn parse_index(token: &str, text: &str) -> Result<usize, AppError> {
    let text = text.trim();
    match text.parse::<usize>() {
        Ok(index) => Ok(index),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(usize::MAX),
        Err(_) => Err(AppError::parse(token, format!("'{}' is not a number", text))),
    }
}

fn parse_token(token: &str, into: &mut BTreeSet<usize>) -> Result<(), AppError> {
    if token.is_empty() {
        return Err(AppError::parse(token, "empty entry"));
    }

    match token.split_once('-') {
        Some((start, end)) => {
            let start = parse_index(token, start)?;
            let end = parse_index(token, end)?;
            if start > end {
                return Err(AppError::parse(token, "range start is after range end"));
            }
            if end - start >= MAX_RANGE_SPAN {
                return Err(AppError::parse(token, "range is too large"));
            }
            into.extend(start..=end);
        }
        None => {
            into.insert(parse_index(token, token)?);
        }
    }
    Ok(())
}

/// Parse operator input. `Ok(None)` means the line was empty.
pub fn parse_selection(input: &str) -> Result<Option<Selection>, AppError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    if input.eq_ignore_ascii_case("all") {
        return Ok(Some(Selection::All));
    }

    let mut indices = BTreeSet::new();
    for token in input.split(',') {
        parse_token(token.trim(), &mut indices)?;
    }
    Ok(Some(Selection::Indices(indices)))
}

/// Validate against a catalog of `len` albums; returns sorted 1-based indices.
pub fn resolve(selection: &Selection, len: usize) -> Result<Vec<usize>, AppError> {
    match selection {
        Selection::All => Ok((1..=len).collect()),
        Selection::Indices(indices) => {
            let invalid: Vec<usize> = indices
                .iter()
                .copied()
                .filter(|i| *i < 1 || *i > len)
                .collect();
            if !invalid.is_empty() {
                return Err(AppError::ValidationError { invalid });
            }
            Ok(indices.iter().copied().collect())
        }
    }
}

/// Parse and resolve in one step, returning the chosen albums in index order.
pub fn select<'a>(input: &str, albums: &'a [Album]) -> Result<Option<Vec<&'a Album>>, AppError> {
    let Some(selection) = parse_selection(input)? else {
        return Ok(None);
    };
    let indices = resolve(&selection, albums.len())?;
    Ok(Some(indices.into_iter().map(|i| &albums[i - 1]).collect()))
}

/// Interactive select-and-confirm loop.
///
/// Invalid input re-prompts. Declining the confirmation starts a new
/// selection. Closed stdin ends selection with nothing chosen.
pub fn prompt_selection(
    albums: &[Album],
    source_label: &str,
    prompter: &mut dyn Prompter,
) -> io::Result<Vec<Album>> {
    if albums.is_empty() {
        return Ok(Vec::new());
    }

    loop {
        println!("\nSelect albums to convert (1-{}):", albums.len());
        println!("{}", SELECTION_EXAMPLES);

        let Some(line) = prompter.ask("Selection: ")? else {
            println!("\nOperation cancelled.");
            return Ok(Vec::new());
        };

        let chosen = match select(&line, albums) {
            Ok(Some(chosen)) => chosen,
            Ok(None) => continue,
            Err(e) => {
                debug!(input = %line, error = %e, "Rejected selection");
                report_recoverable("Invalid input", &e, None);
                continue;
            }
        };

        println!("\nSelected {} albums:", chosen.len());
        for album in &chosen {
            println!(
                "  - {} ({} {} files)",
                album.relative_path,
                album.source_count(),
                source_label
            );
        }

        match prompter.confirm("\nProceed with conversion?")? {
            Some(true) => {
                info!(albums = chosen.len(), "Selection confirmed");
                return Ok(chosen.into_iter().cloned().collect());
            }
            Some(false) => {
                println!("Selection cancelled.");
                continue;
            }
            None => {
                println!("\nOperation cancelled.");
                return Ok(Vec::new());
            }
        }
    }
}
