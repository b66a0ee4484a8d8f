//! # Ingredient, Recipe and Shopping List Data Model
//!
//! This module defines the data structures flowing through shopping list
//! generation: parsed ingredient lines, the recipes and meal plans supplied by
//! the stores, and the aggregated entries handed back to callers.
//!
//! ## Core Concepts
//!
//! - **IngredientLine**: one recipe line with an exact amount, a unit and a
//!   normalized name used as the grouping key
//! - **Recipe**: base servings plus ingredient lines (raw text or structured)
//! - **ScheduledServing**: a recipe cooked on a date for a number of servings
//! - **AggregatedEntry**: one line of the final shopping list
//!
//! ## Usage
//!
//! ```rust
//! use fraction::Fraction;
//! use pantry_list::ingredient_model::{IngredientLine, LineDimension};
//! use pantry_list::unit_table::Dimension;
//!
//! let flour = IngredientLine::new("2 cups flour", "flour")
//!     .with_amount(Fraction::new(2u64, 1u64), Some("cup"));
//! assert_eq!(flour.dimension(), LineDimension::Measured(Dimension::Volume));
//! ```

use chrono::NaiveDate;
use fraction::{CheckedMul, Fraction};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::{ShoppingError, UnitError};
use crate::quantity::{format_quantity, round_to};
use crate::unit_table::{self, Dimension};

pub type RecipeId = i64;
pub type MealPlanId = i64;

/// A single ingredient line, parsed or supplied pre-structured by a store
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientLine {
    /// Original text, kept for display and debugging
    pub raw_text: String,

    /// Lowercased, punctuation-free name used as the grouping key
    pub ingredient_name: String,

    /// Exact amount; `None` means unspecified ("to taste")
    pub amount: Option<Fraction>,

    /// Unit symbol; `None` for bare counts ("3 eggs") and unspecified amounts
    pub unit: Option<String>,

    /// Preparation note split off the name ("diced", "softened")
    pub note: Option<String>,
}

/// Which partition of an ingredient group a line falls into
///
/// The derived ordering is the order entries appear in for one ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LineDimension {
    /// A registered unit, or a bare number (count)
    Measured(Dimension),
    /// A unit string the unit table does not know
    Unknown(String),
    /// No amount at all
    Unspecified,
}

impl IngredientLine {
    /// Create a line with no amount
    pub fn new(raw_text: &str, ingredient_name: &str) -> Self {
        Self {
            raw_text: raw_text.to_string(),
            ingredient_name: ingredient_name.to_string(),
            amount: None,
            unit: None,
            note: None,
        }
    }

    /// Set the amount and (optional) unit of this line
    pub fn with_amount(mut self, amount: Fraction, unit: Option<&str>) -> Self {
        self.amount = Some(amount);
        self.unit = unit.map(str::to_string);
        self
    }

    /// Attach a preparation note
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    pub fn has_quantity(&self) -> bool {
        self.amount.is_some()
    }

    /// Dimension of this line's amount
    pub fn dimension(&self) -> LineDimension {
        if self.amount.is_none() {
            return LineDimension::Unspecified;
        }
        match self.unit.as_deref() {
            None => LineDimension::Measured(Dimension::Count),
            Some(unit) => match unit_table::lookup(unit) {
                Some(definition) => LineDimension::Measured(definition.dimension),
                None => LineDimension::Unknown(unit.trim().to_lowercase()),
            },
        }
    }

    /// Copy of this line with its amount multiplied by `factor`
    ///
    /// Fails with [`UnitError::Overflow`] when the exact product does not fit.
    pub fn scaled(&self, factor: Fraction) -> Result<Self, UnitError> {
        let mut line = self.clone();
        line.amount = self
            .amount
            .map(|amount| amount.checked_mul(&factor).ok_or(UnitError::Overflow))
            .transpose()?;
        Ok(line)
    }
}

/// Meal slot of a scheduled serving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl FromStr for MealType {
    type Err = ShoppingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            other => Err(ShoppingError::invalid_input(format!("unknown meal type '{other}'"))),
        }
    }
}

/// An ingredient as stored on a recipe
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeIngredient {
    /// Free text still to be parsed ("2 cups flour")
    Text(String),
    /// Already structured line
    Line(IngredientLine),
}

/// A recipe as supplied by the recipe store
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    /// Servings the ingredient amounts are written for. Defaults to 1.
    pub base_servings: Option<i64>,
    pub ingredients: Vec<RecipeIngredient>,
}

impl Recipe {
    pub fn new(id: RecipeId, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            base_servings: None,
            ingredients: Vec::new(),
        }
    }

    pub fn with_base_servings(mut self, servings: i64) -> Self {
        self.base_servings = Some(servings);
        self
    }

    /// Add a free-text ingredient line
    pub fn with_ingredient(mut self, text: &str) -> Self {
        self.ingredients.push(RecipeIngredient::Text(text.to_string()));
        self
    }

    /// Add a pre-structured ingredient line
    pub fn with_line(mut self, line: IngredientLine) -> Self {
        self.ingredients.push(RecipeIngredient::Line(line));
        self
    }

    /// Base servings, defaulting to 1
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the stored value is zero or negative
    pub fn effective_base_servings(&self) -> Result<i64, ShoppingError> {
        match self.base_servings {
            None => Ok(1),
            Some(servings) if servings > 0 => Ok(servings),
            Some(servings) => Err(ShoppingError::invalid_input(format!(
                "recipe {} has non-positive base servings ({servings})",
                self.id
            ))),
        }
    }
}

/// A meal plan header as supplied by the meal-plan store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: MealPlanId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl MealPlan {
    /// Whether `date` falls inside the plan (inclusive)
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// A recipe scheduled on a day of a meal plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledServing {
    pub recipe_id: RecipeId,
    pub date: NaiveDate,
    pub servings_requested: i64,
    pub meal_type: Option<MealType>,
}

impl ScheduledServing {
    pub fn new(recipe_id: RecipeId, date: NaiveDate, servings_requested: i64) -> Self {
        Self {
            recipe_id,
            date,
            servings_requested,
            meal_type: None,
        }
    }

    pub fn with_meal_type(mut self, meal_type: MealType) -> Self {
        self.meal_type = Some(meal_type);
        self
    }

    /// `servings_requested / recipe.base_servings`
    ///
    /// # Errors
    ///
    /// `InvalidInput` if either side is zero or negative
    pub fn scale_factor(&self, recipe: &Recipe) -> Result<Fraction, ShoppingError> {
        if self.servings_requested <= 0 {
            return Err(ShoppingError::invalid_input(format!(
                "servings requested for recipe {} on {} must be positive, got {}",
                self.recipe_id, self.date, self.servings_requested
            )));
        }
        let base = recipe.effective_base_servings()?;
        Ok(Fraction::new(self.servings_requested as u64, base as u64))
    }
}

/// One line of a generated shopping list
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedEntry {
    pub ingredient_name: String,
    /// Summed amount in `unit`; `None` when unspecified or degraded
    pub total_amount: Option<Fraction>,
    pub unit: Option<String>,
    pub contributing_recipe_ids: BTreeSet<RecipeId>,
    /// Raw "amount unit" strings kept when an entry could not be summed
    pub annotations: Vec<String>,
}

impl AggregatedEntry {
    pub fn new(ingredient_name: &str) -> Self {
        Self {
            ingredient_name: ingredient_name.to_string(),
            total_amount: None,
            unit: None,
            contributing_recipe_ids: BTreeSet::new(),
            annotations: Vec::new(),
        }
    }

    /// Number of distinct recipes asking for this ingredient
    pub fn recipe_count(&self) -> usize {
        self.contributing_recipe_ids.len()
    }

    pub fn is_unspecified(&self) -> bool {
        self.total_amount.is_none()
    }

    /// Human-readable amount ("1 1/2"), rounded only here
    pub fn display_amount(&self) -> Option<String> {
        self.total_amount.map(format_quantity)
    }
}

impl Serialize for AggregatedEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AggregatedEntry", 7)?;
        state.serialize_field("ingredientName", &self.ingredient_name)?;
        state.serialize_field(
            "totalAmount",
            &self.total_amount.and_then(|amount| round_to(amount, 3)),
        )?;
        state.serialize_field("displayAmount", &self.display_amount())?;
        state.serialize_field("unit", &self.unit)?;
        state.serialize_field("contributingRecipeIds", &self.contributing_recipe_ids)?;
        state.serialize_field("recipeCount", &self.recipe_count())?;
        state.serialize_field("annotations", &self.annotations)?;
        state.end()
    }
}

impl Serialize for IngredientLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("IngredientLine", 5)?;
        state.serialize_field("rawText", &self.raw_text)?;
        state.serialize_field("ingredientName", &self.ingredient_name)?;
        state.serialize_field("amount", &self.amount.map(format_quantity))?;
        state.serialize_field("unit", &self.unit)?;
        state.serialize_field("note", &self.note)?;
        state.end()
    }
}

/// A generated shopping list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub meal_plan_id: MealPlanId,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub entries: Vec<AggregatedEntry>,
}

impl ShoppingList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries for one ingredient, in list order
    pub fn entries_for<'a>(&'a self, ingredient_name: &'a str) -> impl Iterator<Item = &'a AggregatedEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.ingredient_name == ingredient_name)
    }
}

impl fmt::Display for IngredientLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.amount, &self.unit) {
            (Some(amount), Some(unit)) => {
                write!(f, "{} {} {}", format_quantity(*amount), unit, self.ingredient_name)?
            }
            (Some(amount), None) => write!(f, "{} {}", format_quantity(*amount), self.ingredient_name)?,
            (None, _) => write!(f, "{}", self.ingredient_name)?,
        }

        if let Some(note) = &self.note {
            write!(f, " ({})", note)?;
        }

        Ok(())
    }
}

impl fmt::Display for AggregatedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.display_amount(), self.unit.as_deref()) {
            (Some(amount), Some("each")) | (Some(amount), None) => {
                write!(f, "{} {}", amount, self.ingredient_name)?
            }
            (Some(amount), Some(unit)) => write!(f, "{} {} {}", amount, unit, self.ingredient_name)?,
            (None, _) => write!(f, "{}", self.ingredient_name)?,
        }

        if !self.annotations.is_empty() {
            write!(f, " [{}]", self.annotations.join(", "))?;
        } else if self.is_unspecified() {
            write!(f, " (as needed, {} recipe(s))", self.recipe_count())?;
        }

        Ok(())
    }
}

impl fmt::Display for ShoppingList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shopping list for meal plan {}", self.meal_plan_id)?;
        if let (Some(from), Some(to)) = (self.from, self.to) {
            write!(f, " ({from} to {to})")?;
        }
        writeln!(f, " - {} item(s):", self.entries.len())?;

        for entry in &self.entries {
            writeln!(f, "  • {}", entry)?;
        }

        Ok(())
    }
}
