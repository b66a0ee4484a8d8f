//! # Quantity Helpers
//!
//! Exact parsing of the numeric part of an ingredient line into a [`Fraction`],
//! and the presentation-time formatting of summed amounts.
//!
//! Supported formats:
//! - Whole numbers: "2" → 2/1
//! - Decimals: "0.5", "0,5" → 1/2 (exact, no floating point)
//! - Pure fractions: "1/2" → 1/2
//! - Mixed numbers: "1 1/2" → 3/2
//! - Vulgar fractions: "½", "1½" → 1/2, 3/2
//! - Ranges: "2-3", "2 to 3" → 3 (upper bound)

use fraction::{CheckedAdd, Fraction};
use regex::Captures;

use crate::measurement_patterns::{vulgar_fraction, QUANTITY_REGEX};

/// Denominators that read naturally as kitchen fractions
const KITCHEN_DENOMINATORS: &[u64] = &[2, 3, 4, 8];

/// Parse a decimal or integer literal exactly ("1.25" or "1,25" → 5/4)
pub fn parse_decimal(literal: &str) -> Option<Fraction> {
    let (int_part, frac_part) = match literal.split_once(|c: char| c == '.' || c == ',') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (literal, ""),
    };

    let whole: u64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };

    if frac_part.is_empty() {
        return Some(Fraction::new(whole, 1u64));
    }

    let denominator = 10u64.checked_pow(u32::try_from(frac_part.len()).ok()?)?;
    let fractional: u64 = frac_part.parse().ok()?;
    let numerator = whole.checked_mul(denominator)?.checked_add(fractional)?;
    Some(Fraction::new(numerator, denominator))
}

fn ratio(whole: u64, numerator: u64, denominator: u64) -> Option<Fraction> {
    if denominator == 0 {
        return None;
    }
    let numerator = whole.checked_mul(denominator)?.checked_add(numerator)?;
    Some(Fraction::new(numerator, denominator))
}

fn number(caps: &Captures<'_>, name: &str) -> Option<u64> {
    caps.name(name)?.as_str().parse().ok()
}

fn vulgar(caps: &Captures<'_>, name: &str) -> Option<(u64, u64)> {
    let symbol = caps.name(name)?.as_str().chars().next()?;
    vulgar_fraction(symbol)
}

/// Turn a match of the quantity pattern into an exact amount
///
/// Returns `None` for numbers that do not fit, or a zero denominator.
fn amount_from_captures(caps: &Captures<'_>) -> Option<Fraction> {
    if caps.name("whole").is_some() {
        return ratio(
            number(caps, "whole")?,
            number(caps, "mixed_num")?,
            number(caps, "mixed_den")?,
        );
    }

    if let Some(high) = caps.name("high") {
        // A shopping list has to cover the upper end of a range
        return parse_decimal(high.as_str());
    }

    if caps.name("num").is_some() {
        return ratio(0, number(caps, "num")?, number(caps, "den")?);
    }

    if let Some(literal) = caps.name("number") {
        let base = parse_decimal(literal.as_str())?;
        return match vulgar(caps, "vulgar") {
            Some((numerator, denominator)) => base.checked_add(&Fraction::new(numerator, denominator)),
            None => Some(base),
        };
    }

    let (numerator, denominator) = vulgar(caps, "lone")?;
    Some(Fraction::new(numerator, denominator))
}

/// Find the quantity at the start of `text`
///
/// Returns the amount and the byte offset where the quantity ends. `None` if the
/// text does not start with a usable number.
pub fn leading_quantity(text: &str) -> Option<(Fraction, usize)> {
    let caps = QUANTITY_REGEX.captures(text)?;
    let end = caps.get(0)?.end();
    let amount = amount_from_captures(&caps)?;
    Some((amount, end))
}

/// Parse a standalone quantity string such as "1 1/2" or "0.75"
///
/// The whole string has to be a quantity; "2 cups" is rejected.
pub fn parse_quantity(text: &str) -> Option<Fraction> {
    let trimmed = text.trim();
    let (amount, end) = leading_quantity(trimmed)?;
    if trimmed[end..].trim().is_empty() {
        Some(amount)
    } else {
        None
    }
}

/// Approximate decimal value, for presentation only
pub fn to_f64(amount: Fraction) -> Option<f64> {
    let numerator = *amount.numer()? as f64;
    let denominator = *amount.denom()? as f64;
    Some(numerator / denominator)
}

/// Decimal value rounded to `places` digits, for presentation only
pub fn round_to(amount: Fraction, places: i32) -> Option<f64> {
    let scale = 10f64.powi(places);
    to_f64(amount).map(|value| (value * scale).round() / scale)
}

/// Format an amount for a shopping list
///
/// Formats:
/// - Whole numbers: 2/1 → "2"
/// - Kitchen fractions: 3/2 → "1 1/2", 1/4 → "1/4"
/// - Anything else: two decimal places, trailing zeros trimmed (453.59237 → "453.59")
pub fn format_quantity(amount: Fraction) -> String {
    let (numerator, denominator) = match (amount.numer(), amount.denom()) {
        (Some(numerator), Some(denominator)) => (*numerator, *denominator),
        _ => return amount.to_string(),
    };

    if denominator == 1 {
        return numerator.to_string();
    }

    if KITCHEN_DENOMINATORS.contains(&denominator) {
        let whole = numerator / denominator;
        let remainder = numerator % denominator;
        return if whole == 0 {
            format!("{remainder}/{denominator}")
        } else {
            format!("{whole} {remainder}/{denominator}")
        };
    }

    match round_to(amount, 2) {
        Some(value) => {
            let text = format!("{value:.2}");
            text.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        None => amount.to_string(),
    }
}
