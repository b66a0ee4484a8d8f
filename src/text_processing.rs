//! # Text Processing Module
//!
//! This module turns the free text left after the quantity and unit into the
//! grouping key used by the aggregator, and splits off preparation notes.
//!
//! ## Features
//!
//! - Preparation notes in parentheses or after the first comma
//! - Lowercasing, punctuation removal and whitespace collapsing
//! - Removal of leading articles and prepositions (English and French)
//! - Removal of imprecision phrases such as "to taste" or "pinch of"

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

lazy_static! {
    static ref PARENTHESIZED_NOTE: Regex =
        Regex::new(r"\(([^()]*)\)").expect("Parenthesized note pattern should be valid");
}

/// Words and phrases dropped from the start of a name ("a pinch of salt")
const LEADING_PHRASES: &[&str] = &[
    // English
    "a", "an", "of", "the", "some", "pinch of", "pinches of", "dash of", "dashes of",
    "handful of", "splash of", "sprinkle of", "few", "a few", // French
    "de", "du", "des", "la", "le", "les", "un", "une", "une pincée de", "pincée de",
    "quelques", "un peu de",
];

/// Phrases dropped from the end of a name ("salt to taste")
const TRAILING_PHRASES: &[&str] = &[
    // English
    "to taste", "or to taste", "as needed", "as required", "if desired", "optional",
    "for garnish", "for serving", "for decoration", "for frying", // French
    "au goût", "à goût", "selon le goût", "facultatif", "optionnel",
];

/// French elided articles ("d'huile", "l'ail")
const ELIDED_PREFIXES: &[&str] = &["d'", "l'"];

/// Split preparation notes off an ingredient line
///
/// Notes are taken from parenthesized groups and from the text after the first
/// comma. A comma between two digits ("1,5 kg") is a decimal separator and is
/// left alone.
///
/// # Examples
///
/// ```rust
/// use pantry_list::text_processing::split_note;
///
/// let (body, note) = split_note("2 cups onion (about 2 medium), diced");
/// assert_eq!(body, "2 cups onion");
/// assert_eq!(note.as_deref(), Some("about 2 medium; diced"));
/// ```
pub fn split_note(text: &str) -> (String, Option<String>) {
    let mut notes: Vec<String> = PARENTHESIZED_NOTE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|note| !note.is_empty())
        .collect();

    let without_parens = PARENTHESIZED_NOTE.replace_all(text, " ");

    let body = match note_comma(&without_parens) {
        Some(index) => {
            let trailing = without_parens[index + 1..].trim();
            if !trailing.is_empty() {
                notes.push(trailing.to_string());
            }
            without_parens[..index].to_string()
        }
        None => without_parens.into_owned(),
    };

    let body = body.split_whitespace().collect::<Vec<&str>>().join(" ");
    let note = if notes.is_empty() {
        None
    } else {
        Some(notes.join("; "))
    };

    (body, note)
}

/// Byte index of the first comma that is not a decimal separator
fn note_comma(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    text.char_indices()
        .filter(|&(_, c)| c == ',')
        .map(|(index, _)| index)
        .find(|&index| {
            let digit_before = index > 0 && bytes[index - 1].is_ascii_digit();
            let digit_after = bytes.get(index + 1).is_some_and(u8::is_ascii_digit);
            !(digit_before && digit_after)
        })
}

/// Letters, digits, hyphens and apostrophes survive; anything else separates words
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '\''
}

fn phrase_words(phrase: &str) -> Vec<&str> {
    phrase.split_whitespace().collect()
}

/// Remove one leading phrase or elided article. Never empties the name.
fn strip_leading(words: &mut Vec<String>) -> bool {
    for phrase in LEADING_PHRASES {
        let parts = phrase_words(phrase);
        if words.len() > parts.len() && words.iter().zip(&parts).all(|(w, p)| w == p) {
            words.drain(..parts.len());
            return true;
        }
    }

    if let Some(first) = words.first_mut() {
        for prefix in ELIDED_PREFIXES {
            if let Some(rest) = first.strip_prefix(prefix) {
                if !rest.is_empty() {
                    *first = rest.to_string();
                    return true;
                }
            }
        }
    }

    false
}

/// Remove one trailing phrase. Never empties the name.
fn strip_trailing(words: &mut Vec<String>) -> bool {
    for phrase in TRAILING_PHRASES {
        let parts = phrase_words(phrase);
        if words.len() > parts.len()
            && words[words.len() - parts.len()..]
                .iter()
                .zip(&parts)
                .all(|(w, p)| w == p)
        {
            words.truncate(words.len() - parts.len());
            return true;
        }
    }
    false
}

/// Normalize an ingredient name into its grouping key
///
/// Lowercases, strips punctuation, collapses whitespace and removes leading
/// articles and imprecision phrases. Returns an empty string when the text has
/// no letters or digits at all.
///
/// # Examples
///
/// ```rust
/// use pantry_list::text_processing::normalize_ingredient_name;
///
/// assert_eq!(normalize_ingredient_name("Salt to taste"), "salt");
/// assert_eq!(normalize_ingredient_name("of All-Purpose Flour."), "all-purpose flour");
/// assert_eq!(normalize_ingredient_name("d'huile d'olive"), "huile d'olive");
/// ```
pub fn normalize_ingredient_name(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .replace('’', "'")
        .chars()
        .map(|c| if is_name_char(c) { c } else { ' ' })
        .collect();

    let mut words: Vec<String> = lowered
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| c == '-' || c == '\'').to_string())
        .filter(|word| !word.is_empty())
        .collect();

    while strip_leading(&mut words) || strip_trailing(&mut words) {}

    let name = words.join(" ");
    trace!(raw = %text, normalized = %name, "Normalized ingredient name");
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize_ingredient_name("  Brown   SUGAR "), "brown sugar");
    }

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize_ingredient_name("flour!"), "flour");
        assert_eq!(normalize_ingredient_name("salt & pepper"), "salt pepper");
        assert_eq!(normalize_ingredient_name("baker's yeast"), "baker's yeast");
        assert_eq!(normalize_ingredient_name("1/2"), "1 2");
    }

    #[test]
    fn test_normalize_removes_leading_articles() {
        assert_eq!(normalize_ingredient_name("of flour"), "flour");
        assert_eq!(normalize_ingredient_name("the eggs"), "eggs");
        assert_eq!(normalize_ingredient_name("a pinch of salt"), "salt");
        assert_eq!(normalize_ingredient_name("de tomates"), "tomates");
        assert_eq!(normalize_ingredient_name("d'huile"), "huile");
    }

    #[test]
    fn test_normalize_removes_imprecision_phrases() {
        assert_eq!(normalize_ingredient_name("Salt to taste"), "salt");
        assert_eq!(normalize_ingredient_name("parsley for garnish"), "parsley");
        assert_eq!(normalize_ingredient_name("some chili flakes, optional"), "chili flakes");
        assert_eq!(normalize_ingredient_name("sel au goût"), "sel");
    }

    #[test]
    fn test_normalize_never_empties_a_name() {
        assert_eq!(normalize_ingredient_name("to taste"), "to taste");
        assert_eq!(normalize_ingredient_name("the"), "the");
        assert_eq!(normalize_ingredient_name("!!!"), "");
    }

    #[test]
    fn test_flour_and_flour_tortillas_stay_distinct() {
        assert_ne!(
            normalize_ingredient_name("flour"),
            normalize_ingredient_name("flour tortillas")
        );
    }

    #[test]
    fn test_split_note_parentheses_and_comma() {
        let (body, note) = split_note("1 (14 oz) can tomatoes");
        assert_eq!(body, "1 can tomatoes");
        assert_eq!(note.as_deref(), Some("14 oz"));

        let (body, note) = split_note("2 cups onion, finely diced");
        assert_eq!(body, "2 cups onion");
        assert_eq!(note.as_deref(), Some("finely diced"));
    }

    #[test]
    fn test_split_note_keeps_decimal_comma() {
        let (body, note) = split_note("1,5 kg farine");
        assert_eq!(body, "1,5 kg farine");
        assert_eq!(note, None);
    }

    #[test]
    fn test_split_note_without_note() {
        let (body, note) = split_note("3 eggs");
        assert_eq!(body, "3 eggs");
        assert_eq!(note, None);
    }
}
