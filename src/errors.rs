//! # Error Types Module
//!
//! This module defines the error types surfaced by the shopping list engine.
//! `ShoppingError` aborts a whole request; `UnitError` is internal to the unit
//! table and is recovered by the aggregator.

use thiserror::Error;

use crate::ingredient_model::{MealPlanId, RecipeId};

/// Errors that abort shopping list generation
#[derive(Debug, Error)]
pub enum ShoppingError {
    /// Caller supplied something unusable (empty line, non-positive servings)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A referenced recipe does not exist
    #[error("Recipe {0} not found")]
    RecipeNotFound(RecipeId),

    /// The requested meal plan does not exist
    #[error("Meal plan {0} not found")]
    MealPlanNotFound(MealPlanId),

    /// The backing store failed
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ShoppingError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ShoppingError::InvalidInput(message.into())
    }

    /// Whether this error means a referenced entity is missing
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ShoppingError::RecipeNotFound(_) | ShoppingError::MealPlanNotFound(_)
        )
    }
}

/// Unit table failures. Never leave the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Cannot convert {from} ({from_dimension}) to {to} ({to_dimension})")]
    IncompatibleDimensions {
        from: String,
        from_dimension: String,
        to: String,
        to_dimension: String,
    },

    /// An exact amount no longer fits in 64-bit numerator and denominator
    #[error("Amount too large to compute exactly")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, ShoppingError>;
