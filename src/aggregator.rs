//! # Shopping List Aggregator
//!
//! Scales every scheduled recipe to the requested servings, groups the
//! resulting lines by ingredient name and dimension, converts each group to a
//! common unit and sums it exactly.
//!
//! - "1 cup flour" + "8 tbsp flour" = "1 1/2 cup flour"
//! - "salt to taste" twice = one "salt" entry used by two recipes
//! - "1 can tomatoes" cannot be converted and stays a separate annotated entry
//!
//! The aggregation is pure: the same scheduled servings and recipes always give
//! the same list.

use fraction::{CheckedAdd, Fraction};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::errors::{Result, ShoppingError, UnitError};
use crate::ingredient_model::{
    AggregatedEntry, IngredientLine, LineDimension, Recipe, RecipeId, RecipeIngredient,
    ScheduledServing,
};
use crate::ingredient_parser::parse;
use crate::quantity::format_quantity;
use crate::text_processing::normalize_ingredient_name;
use crate::unit_table::{self, Dimension, UnitDefinition};

/// Bare numbers ("3 eggs") are counted in this unit
const COUNT_UNIT: &str = "each";

/// One scaled amount contributing to a partition
#[derive(Debug, Clone)]
struct Contribution {
    amount: Fraction,
    unit: Option<String>,
    /// Scale factor that could not be applied without overflowing
    unapplied_factor: Option<Fraction>,
}

impl Contribution {
    fn unit_symbol(&self) -> &str {
        self.unit.as_deref().unwrap_or(COUNT_UNIT)
    }

    fn scaled_amount(&self) -> std::result::Result<Fraction, UnitError> {
        match self.unapplied_factor {
            Some(_) => Err(UnitError::Overflow),
            None => Ok(self.amount),
        }
    }

    /// Free-form "amount unit" text kept when the partition cannot be summed
    fn annotation(&self) -> String {
        let mut text = format_quantity(self.amount);
        if let Some(unit) = &self.unit {
            text = format!("{text} {unit}");
        }
        if let Some(factor) = self.unapplied_factor {
            text = format!("{text} x {}", format_quantity(factor));
        }
        text
    }
}

/// All lines sharing one ingredient name and one dimension
#[derive(Debug, Default)]
struct Partition {
    recipe_ids: BTreeSet<RecipeId>,
    contributions: Vec<Contribution>,
}

impl Partition {
    /// Add `line` scaled by `factor`, keeping the unscaled amount on overflow
    fn add(&mut self, recipe_id: RecipeId, line: &IngredientLine, factor: Fraction) {
        self.recipe_ids.insert(recipe_id);
        let (amount, unapplied_factor) = match line.scaled(factor) {
            Ok(scaled) => (scaled.amount, None),
            Err(e) => {
                warn!(recipe_id, ingredient = %line.ingredient_name, error = %e, "Could not scale ingredient");
                (line.amount, Some(factor))
            }
        };
        if let Some(amount) = amount {
            self.contributions.push(Contribution {
                amount,
                unit: line.unit.clone(),
                unapplied_factor,
            });
        }
    }

    fn annotations(&self) -> Vec<String> {
        self.contributions.iter().map(Contribution::annotation).collect()
    }
}

/// Resolve a recipe ingredient into a line keyed by its normalized name
///
/// Returns `None` for blank text lines.
fn resolve_line(recipe: &Recipe, ingredient: &RecipeIngredient) -> Option<IngredientLine> {
    match ingredient {
        RecipeIngredient::Text(text) => match parse(text) {
            Ok(line) => Some(line),
            Err(e) => {
                warn!(recipe_id = recipe.id, error = %e, "Skipping blank ingredient line");
                None
            }
        },
        RecipeIngredient::Line(line) => {
            let mut line = line.clone();
            let normalized = normalize_ingredient_name(&line.ingredient_name);
            line.ingredient_name = if normalized.is_empty() {
                line.ingredient_name.trim().to_lowercase()
            } else {
                normalized
            };
            Some(line)
        }
    }
}

/// Convert and sum a partition of one known dimension
fn sum_measured(
    dimension: Dimension,
    partition: &Partition,
) -> std::result::Result<(Fraction, &'static UnitDefinition), UnitError> {
    let mut total = Fraction::new(0u64, 1u64);
    let mut used: Vec<&'static UnitDefinition> = Vec::new();

    for contribution in &partition.contributions {
        let symbol = contribution.unit_symbol();
        let (base, found) = unit_table::to_base(contribution.scaled_amount()?, symbol)?;
        if found != dimension {
            return Err(UnitError::IncompatibleDimensions {
                from: symbol.to_string(),
                from_dimension: found.to_string(),
                to: unit_table::base_unit(dimension).symbol.to_string(),
                to_dimension: dimension.to_string(),
            });
        }
        total = total.checked_add(&base).ok_or(UnitError::Overflow)?;

        let definition = unit_table::lookup(symbol)
            .ok_or_else(|| UnitError::UnknownUnit(symbol.to_string()))?;
        if !used.iter().any(|u| u.symbol == definition.symbol) {
            used.push(definition);
        }
    }

    let presentation = unit_table::presentation_unit(total, dimension, &used);
    let amount = unit_table::from_base(total, presentation.symbol)?;
    Ok((amount, presentation))
}

fn build_entry(name: &str, dimension: &LineDimension, partition: Partition) -> AggregatedEntry {
    let mut entry = AggregatedEntry::new(name);

    match dimension {
        LineDimension::Measured(measured) => match sum_measured(*measured, &partition) {
            Ok((amount, unit)) => {
                entry.total_amount = Some(amount);
                entry.unit = Some(unit.symbol.to_string());
            }
            Err(e) => {
                warn!(ingredient = %name, error = %e, "Could not sum ingredient, keeping raw amounts");
                entry.annotations = partition.annotations();
            }
        },
        LineDimension::Unknown(raw_unit) => {
            warn!(ingredient = %name, unit = %raw_unit, "Unknown unit, keeping raw amounts");
            entry.unit = Some(raw_unit.clone());
            entry.annotations = partition.annotations();
        }
        LineDimension::Unspecified => {}
    }

    entry.contributing_recipe_ids = partition.recipe_ids;
    entry
}

/// Aggregate scheduled servings into shopping list entries
///
/// `lookup` resolves a recipe id to its recipe. Entries are ordered by
/// ingredient name, then volume, mass, count, unknown units and finally the
/// unspecified entry.
///
/// # Errors
///
/// - `RecipeNotFound` when a scheduled recipe cannot be resolved
/// - `InvalidInput` for non-positive requested or base servings
///
/// Either error aborts the whole aggregation. Unit failures never do; they only
/// degrade the affected entry.
pub fn aggregate<'r, F>(scheduled: &[ScheduledServing], lookup: F) -> Result<Vec<AggregatedEntry>>
where
    F: Fn(RecipeId) -> Option<&'r Recipe>,
{
    let mut scaled: Vec<(&'r Recipe, Fraction)> = Vec::with_capacity(scheduled.len());
    for serving in scheduled {
        let recipe = lookup(serving.recipe_id).ok_or(ShoppingError::RecipeNotFound(serving.recipe_id))?;
        let factor = serving.scale_factor(recipe)?;
        scaled.push((recipe, factor));
    }

    let mut partitions: BTreeMap<(String, LineDimension), Partition> = BTreeMap::new();
    for (recipe, factor) in scaled {
        for ingredient in &recipe.ingredients {
            let Some(line) = resolve_line(recipe, ingredient) else {
                continue;
            };
            partitions
                .entry((line.ingredient_name.clone(), line.dimension()))
                .or_default()
                .add(recipe.id, &line, factor);
        }
    }

    let entries: Vec<AggregatedEntry> = partitions
        .into_iter()
        .map(|((name, dimension), partition)| build_entry(&name, &dimension, partition))
        .collect();

    debug!(
        servings = scheduled.len(),
        entries = entries.len(),
        "Aggregated shopping list"
    );
    Ok(entries)
}
