//! # Pantry List
//!
//! Turns a meal plan (recipes scheduled on dates for a number of servings)
//! into one shopping list. Ingredient lines are parsed into exact amounts,
//! converted between compatible units and summed per ingredient; amounts that
//! cannot be summed are kept as separate annotated entries.

pub mod aggregator;
pub mod config;
pub mod db;
pub mod errors;
pub mod ingredient_model;
pub mod ingredient_parser;
pub mod logging;
pub mod measurement_patterns;
pub mod quantity;
pub mod shopping_list;
pub mod store;
pub mod text_processing;
pub mod unit_table;
