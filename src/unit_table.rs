//! # Unit Conversion Table
//!
//! Registry of the measurement units the shopping list understands. Units are
//! grouped into dimensions (volume, mass, count); each dimension has a fixed
//! base unit and every unit carries an exact rational factor to that base.
//!
//! ## Base units
//!
//! - Volume: milliliter (`ml`)
//! - Mass: gram (`g`)
//! - Count: each (`each`)
//!
//! All arithmetic stays in [`Fraction`] so that summing many small amounts
//! never accumulates rounding error. Rounding belongs to presentation only.
//!
//! ## Usage
//!
//! ```rust
//! use fraction::Fraction;
//! use pantry_list::unit_table::convert;
//!
//! let cups = convert(Fraction::new(8u64, 1u64), "tbsp", "cup").unwrap();
//! assert_eq!(cups, Fraction::new(1u64, 2u64));
//! ```

use fraction::{CheckedDiv, CheckedMul, Fraction};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::errors::UnitError;

/// A category of mutually convertible units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Volume,
    Mass,
    Count,
}

/// A registered unit and its exact relation to the dimension's base unit
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDefinition {
    /// Canonical short form (e.g. "cup", "tbsp", "g")
    pub symbol: &'static str,
    pub dimension: Dimension,
    /// Multiplier turning one of this unit into the base unit. Always positive.
    pub factor_to_base: Fraction,
    /// Whether shopping list totals may be expressed in this unit
    pub display: bool,
}

impl UnitDefinition {
    fn new(
        symbol: &'static str,
        dimension: Dimension,
        factor_to_base: Fraction,
        display: bool,
    ) -> Self {
        Self {
            symbol,
            dimension,
            factor_to_base,
            display,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Volume => "volume",
            Dimension::Mass => "mass",
            Dimension::Count => "count",
        };
        write!(f, "{name}")
    }
}

fn ratio(numerator: u64, denominator: u64) -> Fraction {
    Fraction::new(numerator, denominator)
}

/// Registered units, coarse to fine within each dimension.
///
/// Customary volume follows the US nutrition-labelling cup (240 ml), which
/// keeps 16 tbsp = 1 cup and 8 fl oz = 1 cup exact. Mass uses the
/// international avoirdupois pound (453.59237 g).
static UNITS: LazyLock<Vec<UnitDefinition>> = LazyLock::new(|| {
    use Dimension::*;

    vec![
        UnitDefinition::new("gallon", Volume, ratio(3840, 1), true),
        UnitDefinition::new("l", Volume, ratio(1000, 1), true),
        UnitDefinition::new("quart", Volume, ratio(960, 1), true),
        UnitDefinition::new("pint", Volume, ratio(480, 1), false),
        UnitDefinition::new("cup", Volume, ratio(240, 1), true),
        UnitDefinition::new("fl oz", Volume, ratio(30, 1), false),
        UnitDefinition::new("tbsp", Volume, ratio(15, 1), true),
        UnitDefinition::new("tsp", Volume, ratio(5, 1), true),
        UnitDefinition::new("ml", Volume, ratio(1, 1), true),
        UnitDefinition::new("kg", Mass, ratio(1000, 1), true),
        UnitDefinition::new("lb", Mass, ratio(45_359_237, 100_000), true),
        UnitDefinition::new("oz", Mass, ratio(45_359_237, 1_600_000), true),
        UnitDefinition::new("g", Mass, ratio(1, 1), true),
        UnitDefinition::new("dozen", Count, ratio(12, 1), true),
        UnitDefinition::new("each", Count, ratio(1, 1), true),
    ]
});

/// Accepted spellings for each registered symbol (lowercase)
static UNIT_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Volume units
    for alias in ["tsp", "teaspoon", "teaspoons", "tsps"] {
        map.insert(alias, "tsp");
    }
    for alias in ["tbsp", "tablespoon", "tablespoons", "tbsps", "tbs", "tbl"] {
        map.insert(alias, "tbsp");
    }
    for alias in ["cup", "cups", "c"] {
        map.insert(alias, "cup");
    }
    for alias in ["fl oz", "fl. oz", "floz", "fluid ounce", "fluid ounces"] {
        map.insert(alias, "fl oz");
    }
    for alias in ["pint", "pints", "pt"] {
        map.insert(alias, "pint");
    }
    for alias in ["quart", "quarts", "qt"] {
        map.insert(alias, "quart");
    }
    for alias in ["gallon", "gallons", "gal"] {
        map.insert(alias, "gallon");
    }
    for alias in ["ml", "milliliter", "milliliters", "millilitre", "millilitres"] {
        map.insert(alias, "ml");
    }
    for alias in ["l", "liter", "liters", "litre", "litres"] {
        map.insert(alias, "l");
    }

    // Weight units
    for alias in ["g", "gram", "grams", "gramme", "grammes"] {
        map.insert(alias, "g");
    }
    for alias in ["kg", "kilogram", "kilograms", "kilogramme", "kilogrammes"] {
        map.insert(alias, "kg");
    }
    for alias in ["oz", "ounce", "ounces"] {
        map.insert(alias, "oz");
    }
    for alias in ["lb", "lbs", "pound", "pounds"] {
        map.insert(alias, "lb");
    }

    // Count units
    for alias in ["each", "ea", "piece", "pieces", "item", "items", "whole"] {
        map.insert(alias, "each");
    }
    for alias in ["dozen", "doz"] {
        map.insert(alias, "dozen");
    }

    // French units
    for alias in ["cuillère à café", "cuillères à café", "cac"] {
        map.insert(alias, "tsp");
    }
    for alias in ["cuillère à soupe", "cuillères à soupe", "cas"] {
        map.insert(alias, "tbsp");
    }
    for alias in ["tasse", "tasses"] {
        map.insert(alias, "cup");
    }
    for alias in ["pièce", "pièces"] {
        map.insert(alias, "each");
    }

    map
});

/// Aliases sorted longest first, so "tablespoons" wins over "tablespoon"
static ALIASES_LONGEST_FIRST: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    let mut aliases: Vec<(&'static str, &'static str)> =
        UNIT_ALIASES.iter().map(|(alias, symbol)| (*alias, *symbol)).collect();
    aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
    aliases
});

/// All registered units, coarse to fine within each dimension
pub fn registered_units() -> &'static [UnitDefinition] {
    &UNITS
}

/// Every accepted spelling paired with its canonical symbol, longest first
pub fn aliases_longest_first() -> &'static [(&'static str, &'static str)] {
    &ALIASES_LONGEST_FIRST
}

/// Find a unit by symbol or alias (case-insensitive, trailing '.' ignored)
pub fn lookup(name: &str) -> Option<&'static UnitDefinition> {
    let key = name.trim().trim_end_matches('.').to_lowercase();
    let symbol = UNIT_ALIASES.get(key.as_str()).copied().unwrap_or(key.as_str());
    UNITS.iter().find(|unit| unit.symbol == symbol)
}

fn require(name: &str) -> Result<&'static UnitDefinition, UnitError> {
    lookup(name).ok_or_else(|| UnitError::UnknownUnit(name.trim().to_string()))
}

/// Base unit of a dimension
pub fn base_unit(dimension: Dimension) -> &'static UnitDefinition {
    let symbol = match dimension {
        Dimension::Volume => "ml",
        Dimension::Mass => "g",
        Dimension::Count => "each",
    };
    UNITS
        .iter()
        .find(|unit| unit.symbol == symbol)
        .expect("every dimension has a registered base unit")
}

/// Express `amount` of `unit` in its dimension's base unit
pub fn to_base(amount: Fraction, unit: &str) -> Result<(Fraction, Dimension), UnitError> {
    let definition = require(unit)?;
    let base = amount
        .checked_mul(&definition.factor_to_base)
        .ok_or(UnitError::Overflow)?;
    Ok((base, definition.dimension))
}

/// Express a base-unit amount in `unit`
pub fn from_base(base_amount: Fraction, unit: &str) -> Result<Fraction, UnitError> {
    let definition = require(unit)?;
    base_amount
        .checked_div(&definition.factor_to_base)
        .ok_or(UnitError::Overflow)
}

/// Convert an amount between two units of the same dimension
///
/// # Errors
///
/// * [`UnitError::UnknownUnit`] if either unit is not registered
/// * [`UnitError::IncompatibleDimensions`] if the units measure different things
/// * [`UnitError::Overflow`] if the exact result does not fit
pub fn convert(amount: Fraction, from: &str, to: &str) -> Result<Fraction, UnitError> {
    let from_unit = require(from)?;
    let to_unit = require(to)?;

    if from_unit.dimension != to_unit.dimension {
        return Err(UnitError::IncompatibleDimensions {
            from: from_unit.symbol.to_string(),
            from_dimension: from_unit.dimension.to_string(),
            to: to_unit.symbol.to_string(),
            to_dimension: to_unit.dimension.to_string(),
        });
    }

    amount
        .checked_mul(&from_unit.factor_to_base)
        .and_then(|base| base.checked_div(&to_unit.factor_to_base))
        .ok_or(UnitError::Overflow)
}

/// Pick the unit a summed total should be shown in
///
/// The ladder is the dimension's display units, coarse to fine. Count totals
/// only use count units that actually contributed, so twelve eggs never turn
/// into a dozen on their own. The largest ladder unit in which the total is at
/// least one wins; otherwise the finest ladder unit is used.
pub fn presentation_unit(
    base_amount: Fraction,
    dimension: Dimension,
    used: &[&'static UnitDefinition],
) -> &'static UnitDefinition {
    let ladder: Vec<&'static UnitDefinition> = UNITS
        .iter()
        .filter(|unit| unit.dimension == dimension && unit.display)
        .filter(|unit| {
            dimension != Dimension::Count || used.iter().any(|u| u.symbol == unit.symbol)
        })
        .collect();

    let one = Fraction::new(1u64, 1u64);
    ladder
        .iter()
        .find(|unit| {
            base_amount
                .checked_div(&unit.factor_to_base)
                .is_some_and(|amount| amount >= one)
        })
        .or_else(|| ladder.last())
        .copied()
        .unwrap_or_else(|| base_unit(dimension))
}
