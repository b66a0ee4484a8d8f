//! # Ingredient Parser
//!
//! This module turns one free-text recipe line into a structured
//! [`IngredientLine`] with an exact amount, a registered unit and a normalized
//! name.
//!
//! ## Features
//!
//! - Integers, decimals, fractions, mixed numbers and vulgar fractions
//! - Ranges ("2-3", "2 to 3"), read as their upper bound
//! - Units matched longest alias first, at a word boundary ("500g flour")
//! - Imprecise measures ("1 pinch salt") read as unspecified amounts
//! - Preparation notes split from the name
//! - English and French unit spellings
//!
//! Parsing never fails on a non-empty line: text that cannot be read degrades to
//! an unspecified amount with the normalized line as its name.
//!
//! ## Usage
//!
//! ```rust
//! use pantry_list::ingredient_parser::parse;
//!
//! let line = parse("1 1/2 cups all-purpose flour, sifted")?;
//! assert_eq!(line.ingredient_name, "all-purpose flour");
//! assert_eq!(line.unit.as_deref(), Some("cup"));
//! assert_eq!(line.note.as_deref(), Some("sifted"));
//! # Ok::<(), pantry_list::errors::ShoppingError>(())
//! ```

use tracing::{debug, trace};

use crate::errors::{Result, ShoppingError};
use crate::ingredient_model::IngredientLine;
use crate::measurement_patterns::IMPRECISE_MEASURES;
use crate::quantity::leading_quantity;
use crate::text_processing::{normalize_ingredient_name, split_note};
use crate::unit_table::aliases_longest_first;

/// Match `word` case-insensitively at the start of `text`, ending at a word
/// boundary. An abbreviation dot after the word is consumed.
fn match_word<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let head = text.get(..word.len())?;
    if !head.eq_ignore_ascii_case(word) {
        return None;
    }

    let mut rest = &text[word.len()..];
    if let Some(stripped) = rest.strip_prefix('.') {
        rest = stripped;
    }

    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() => None,
        _ => Some(rest),
    }
}

/// Registered unit at the start of `text`, and the text after it
fn match_unit(text: &str) -> Option<(&'static str, &str)> {
    aliases_longest_first()
        .iter()
        .find_map(|(alias, symbol)| match_word(text, alias).map(|rest| (*symbol, rest)))
}

/// Imprecise measure at the start of `text` ("pinch", "dashes"), and the text after it
fn match_imprecise(text: &str) -> Option<&str> {
    IMPRECISE_MEASURES
        .iter()
        .find_map(|measure| match_word(text, measure))
}

/// Parse one ingredient line
///
/// # Errors
///
/// `InvalidInput` when the line is empty or whitespace only. Every other line
/// parses.
pub fn parse(raw_text: &str) -> Result<IngredientLine> {
    let trimmed = raw_text.trim();
    if trimmed.is_empty() {
        return Err(ShoppingError::invalid_input("ingredient line is empty"));
    }

    let (body, note) = split_note(trimmed);

    let (mut amount, mut rest) = match leading_quantity(&body) {
        Some((amount, end)) => (Some(amount), body[end..].trim_start()),
        None => (None, body.as_str()),
    };

    let mut unit = None;
    if amount.is_some() {
        if let Some((symbol, after)) = match_unit(rest) {
            unit = Some(symbol);
            rest = after;
        } else if let Some(after) = match_imprecise(rest) {
            trace!(line = %trimmed, "Imprecise measure, amount left unspecified");
            amount = None;
            rest = after;
        }
    }

    let ingredient_name = normalize_ingredient_name(rest);
    if ingredient_name.is_empty() {
        debug!(line = %trimmed, "No ingredient name after quantity, keeping whole line");
        let mut fallback = normalize_ingredient_name(trimmed);
        if fallback.is_empty() {
            fallback = trimmed.to_lowercase();
        }
        return Ok(IngredientLine::new(trimmed, &fallback));
    }

    let mut line = IngredientLine::new(trimmed, &ingredient_name);
    if let Some(amount) = amount {
        line = line.with_amount(amount, unit);
    }
    if let Some(note) = note {
        line = line.with_note(&note);
    }

    trace!(
        line = %trimmed,
        name = %line.ingredient_name,
        unit = ?line.unit,
        "Parsed ingredient line"
    );
    Ok(line)
}

/// Parse every non-blank line of a block of text
pub fn parse_ingredient_list(text: &str) -> Vec<IngredientLine> {
    let lines: Vec<IngredientLine> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse(line).ok())
        .collect();

    debug!(lines = lines.len(), "Parsed ingredient list");
    lines
}
