//! # PostgreSQL Store
//!
//! Reads recipes and meal plans from the relational schema of the meal
//! planning application. The engine never writes to these tables; the schema
//! helper exists for local setups and tests.

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::ingredient_model::{
    IngredientLine, MealPlan, MealPlanId, MealType, Recipe, RecipeId, RecipeIngredient,
    ScheduledServing,
};
use crate::quantity::parse_quantity;
use crate::store::{MealPlanStore, RecipeStore};
use crate::unit_table;

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> anyhow::Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS recipes (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            servings INTEGER
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create recipes table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS ingredients (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            category TEXT
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create ingredients table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS recipe_ingredients (
            id BIGSERIAL PRIMARY KEY,
            recipe_id BIGINT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            ingredient_id BIGINT NOT NULL REFERENCES ingredients(id),
            quantity TEXT,
            unit TEXT,
            raw_text TEXT
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create recipe_ingredients table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS meal_plans (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT,
            name TEXT NOT NULL,
            start_date DATE NOT NULL,
            end_date DATE NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create meal_plans table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS meal_plan_items (
            id BIGSERIAL PRIMARY KEY,
            meal_plan_id BIGINT NOT NULL REFERENCES meal_plans(id) ON DELETE CASCADE,
            recipe_id BIGINT NOT NULL,
            meal_date DATE NOT NULL,
            meal_type TEXT,
            servings INTEGER DEFAULT 1
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create meal_plan_items table")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_meal_plan_items_plan ON meal_plan_items(meal_plan_id, meal_date)",
    )
    .execute(pool)
    .await
    .context("Failed to create meal_plan_items index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Recipe and meal plan store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool sized by the configuration
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let database_url = config.require_database_url()?;
        info!(max_connections = config.max_connections, "Connecting to database");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// One `recipe_ingredients` row joined with its ingredient name
type IngredientRow = (String, Option<String>, Option<String>, Option<String>);

/// Turn a stored ingredient row into a recipe ingredient
///
/// Rows keeping their original text are parsed like any free-text line; other
/// rows are taken as structured data.
fn ingredient_from_row(recipe_id: RecipeId, row: IngredientRow) -> RecipeIngredient {
    let (name, quantity, unit, raw_text) = row;

    if let Some(raw_text) = raw_text.filter(|text| !text.trim().is_empty()) {
        return RecipeIngredient::Text(raw_text);
    }

    let quantity = quantity.filter(|q| !q.trim().is_empty());
    let unit = unit.filter(|u| !u.trim().is_empty());

    let raw_text = [quantity.as_deref(), unit.as_deref(), Some(name.as_str())]
        .into_iter()
        .flatten()
        .collect::<Vec<&str>>()
        .join(" ");
    let mut line = IngredientLine::new(&raw_text, &name);

    if let Some(quantity) = quantity.as_deref() {
        match parse_quantity(quantity) {
            Some(amount) => {
                let unit = unit.as_deref().map(|u| match unit_table::lookup(u) {
                    Some(definition) => definition.symbol,
                    None => u.trim(),
                });
                line = line.with_amount(amount, unit);
            }
            None => {
                warn!(recipe_id, quantity = %quantity, ingredient = %name, "Unreadable stored quantity");
            }
        }
    }

    RecipeIngredient::Line(line)
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>> {
        let row: Option<(i64, String, Option<i32>)> =
            sqlx::query_as("SELECT id, title, servings FROM recipes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some((recipe_id, title, servings)) = row else {
            debug!(recipe_id = id, "Recipe not found");
            return Ok(None);
        };

        let rows: Vec<IngredientRow> = sqlx::query_as(
            "SELECT i.name, ri.quantity, ri.unit, ri.raw_text
             FROM recipe_ingredients ri
             JOIN ingredients i ON ri.ingredient_id = i.id
             WHERE ri.recipe_id = $1
             ORDER BY ri.id",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await?;

        let mut recipe = Recipe::new(recipe_id, &title);
        recipe.base_servings = servings.map(i64::from);
        recipe.ingredients = rows
            .into_iter()
            .map(|row| ingredient_from_row(recipe_id, row))
            .collect();

        debug!(recipe_id, ingredients = recipe.ingredients.len(), "Loaded recipe");
        Ok(Some(recipe))
    }
}

#[async_trait]
impl MealPlanStore for PgStore {
    async fn get_meal_plan(&self, id: MealPlanId) -> Result<Option<MealPlan>> {
        let row: Option<(i64, String, NaiveDate, NaiveDate)> = sqlx::query_as(
            "SELECT id, name, start_date, end_date FROM meal_plans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name, start_date, end_date)| MealPlan {
            id,
            name,
            start_date,
            end_date,
        }))
    }

    async fn get_scheduled_servings(&self, id: MealPlanId) -> Result<Vec<ScheduledServing>> {
        let rows: Vec<(i64, NaiveDate, Option<i32>, Option<String>)> = sqlx::query_as(
            "SELECT recipe_id, meal_date, servings, meal_type
             FROM meal_plan_items
             WHERE meal_plan_id = $1
             ORDER BY meal_date, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let servings = rows
            .into_iter()
            .map(|(recipe_id, date, servings, meal_type)| {
                let mut serving =
                    ScheduledServing::new(recipe_id, date, servings.map(i64::from).unwrap_or(1));
                serving.meal_type = meal_type.and_then(|value| match value.parse::<MealType>() {
                    Ok(meal_type) => Some(meal_type),
                    Err(e) => {
                        warn!(meal_plan_id = id, recipe_id, error = %e, "Ignoring meal type");
                        None
                    }
                });
                serving
            })
            .collect::<Vec<_>>();

        debug!(meal_plan_id = id, servings = servings.len(), "Loaded scheduled servings");
        Ok(servings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraction::Fraction;

    fn row(name: &str, quantity: Option<&str>, unit: Option<&str>, raw: Option<&str>) -> IngredientRow {
        (
            name.to_string(),
            quantity.map(str::to_string),
            unit.map(str::to_string),
            raw.map(str::to_string),
        )
    }

    #[test]
    fn test_row_with_raw_text_is_parsed_later() {
        let ingredient = ingredient_from_row(1, row("flour", Some("2"), Some("cups"), Some("2 cups flour")));
        assert_eq!(ingredient, RecipeIngredient::Text("2 cups flour".to_string()));
    }

    #[test]
    fn test_structured_row_resolves_unit_alias() {
        let ingredient = ingredient_from_row(1, row("Flour", Some("1 1/2"), Some("Cups"), None));
        match ingredient {
            RecipeIngredient::Line(line) => {
                assert_eq!(line.amount, Some(Fraction::new(3u64, 2u64)));
                assert_eq!(line.unit.as_deref(), Some("cup"));
                assert_eq!(line.raw_text, "1 1/2 Cups Flour");
            }
            other => panic!("expected structured line, got {other:?}"),
        }
    }

    #[test]
    fn test_structured_row_keeps_unknown_unit() {
        match ingredient_from_row(1, row("tomatoes", Some("1"), Some("can"), Some(" "))) {
            RecipeIngredient::Line(line) => assert_eq!(line.unit.as_deref(), Some("can")),
            other => panic!("expected structured line, got {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_quantity_is_unspecified() {
        match ingredient_from_row(1, row("salt", Some("to taste"), None, None)) {
            RecipeIngredient::Line(line) => {
                assert_eq!(line.amount, None);
                assert_eq!(line.unit, None);
            }
            other => panic!("expected structured line, got {other:?}"),
        }
    }
}
