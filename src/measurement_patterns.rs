//! # Measurement Patterns Module
//!
//! This module contains regex patterns and constants used for quantity detection.

use lazy_static::lazy_static;
use regex::Regex;

// Leading quantity of an ingredient line. Alternatives are tried in order:
// mixed number ("1 1/2", "1-1/2"), range ("2-3", "2 to 3"), simple fraction ("1/2"),
// integer or decimal with an optional vulgar fraction ("1½"), lone vulgar fraction.
// Decimals accept a comma separator ("1,5 kg").
pub const QUANTITY_PATTERN: &str = r"^(?:(?P<whole>\d+)(?:\s+|-)(?P<mixed_num>\d+)\s*[/⁄]\s*(?P<mixed_den>\d+)|(?P<low>\d+(?:[.,]\d+)?)\s*(?:-|–|—|to)\s*(?P<high>\d+(?:[.,]\d+)?)|(?P<num>\d+)\s*[/⁄]\s*(?P<den>\d+)|(?P<number>\d*[.,]\d+|\d+)\s*(?P<vulgar>[½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞])?|(?P<lone>[½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞]))";

// Imprecise measures that carry no purchasable amount ("1 pinch salt")
pub const IMPRECISE_MEASURES: &[&str] = &[
    "pinches", "pinch", "dashes", "dash", "handfuls", "handful", "sprinkles", "sprinkle",
    "splashes", "splash", "drops", "drop",
];

// Lazy static regex for the quantity pattern to avoid recompilation
lazy_static! {
    pub static ref QUANTITY_REGEX: Regex =
        Regex::new(QUANTITY_PATTERN).expect("Quantity pattern should be valid");
}

/// Numerator and denominator of a unicode vulgar fraction
pub fn vulgar_fraction(symbol: char) -> Option<(u64, u64)> {
    let value = match symbol {
        '½' => (1, 2),
        '⅓' => (1, 3),
        '⅔' => (2, 3),
        '¼' => (1, 4),
        '¾' => (3, 4),
        '⅕' => (1, 5),
        '⅖' => (2, 5),
        '⅗' => (3, 5),
        '⅘' => (4, 5),
        '⅙' => (1, 6),
        '⅚' => (5, 6),
        '⅛' => (1, 8),
        '⅜' => (3, 8),
        '⅝' => (5, 8),
        '⅞' => (7, 8),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_regex_alternatives() {
        let caps = QUANTITY_REGEX.captures("1 1/2 cups flour").unwrap();
        assert_eq!(&caps["whole"], "1");
        assert_eq!(&caps["mixed_num"], "1");
        assert_eq!(&caps["mixed_den"], "2");

        let caps = QUANTITY_REGEX.captures("1/2 tsp salt").unwrap();
        assert_eq!(&caps["num"], "1");
        assert_eq!(&caps["den"], "2");

        let caps = QUANTITY_REGEX.captures("1-1/2 cups sugar").unwrap();
        assert_eq!(&caps["whole"], "1");
        assert_eq!(&caps["mixed_den"], "2");

        let caps = QUANTITY_REGEX.captures("2-3 tbsp oil").unwrap();
        assert_eq!(&caps["low"], "2");
        assert_eq!(&caps["high"], "3");

        let caps = QUANTITY_REGEX.captures("0.5 kg sugar").unwrap();
        assert_eq!(&caps["number"], "0.5");

        let caps = QUANTITY_REGEX.captures("1,5 kg farine").unwrap();
        assert_eq!(&caps["number"], "1,5");

        let caps = QUANTITY_REGEX.captures("1½ cups milk").unwrap();
        assert_eq!(&caps["number"], "1");
        assert_eq!(&caps["vulgar"], "½");
    }

    #[test]
    fn test_quantity_regex_requires_leading_number() {
        assert!(QUANTITY_REGEX.captures("salt to taste").is_none());
        assert!(QUANTITY_REGEX.captures("pepper 2 tsp").is_none());
    }

    #[test]
    fn test_two_tomatoes_is_not_a_range() {
        let caps = QUANTITY_REGEX.captures("2 tomatoes").unwrap();
        assert!(caps.name("low").is_none());
        assert_eq!(&caps["number"], "2");
    }

    #[test]
    fn test_vulgar_fraction_lookup() {
        assert_eq!(vulgar_fraction('¾'), Some((3, 4)));
        assert_eq!(vulgar_fraction('x'), None);
    }
}
