//! # Shopping List Service
//!
//! Loads a meal plan and its recipes from the stores and hands them to the
//! aggregator. A missing recipe or meal plan fails the whole request; no
//! partial list is ever returned.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::aggregator::aggregate;
use crate::errors::{Result, ShoppingError};
use crate::ingredient_model::{MealPlanId, Recipe, RecipeId, ScheduledServing, ShoppingList};
use crate::store::{MealPlanStore, RecipeStore};

/// Generates shopping lists from stored meal plans
#[derive(Clone)]
pub struct ShoppingListService {
    recipes: Arc<dyn RecipeStore>,
    meal_plans: Arc<dyn MealPlanStore>,
}

impl ShoppingListService {
    pub fn new(recipes: Arc<dyn RecipeStore>, meal_plans: Arc<dyn MealPlanStore>) -> Self {
        Self {
            recipes,
            meal_plans,
        }
    }

    /// Build one store-backed service from a type implementing both stores
    pub fn from_store<S>(store: S) -> Self
    where
        S: RecipeStore + MealPlanStore + 'static,
    {
        let store = Arc::new(store);
        Self::new(store.clone(), store)
    }

    /// Shopping list covering every serving scheduled on the meal plan
    ///
    /// # Errors
    ///
    /// - `MealPlanNotFound` if the plan does not exist
    /// - `RecipeNotFound` if any scheduled recipe does not exist
    /// - `InvalidInput` for non-positive servings
    /// - `Database`/`Storage` when a store fails
    pub async fn generate_shopping_list(&self, meal_plan_id: MealPlanId) -> Result<ShoppingList> {
        let servings = self.load_plan(meal_plan_id).await?;
        self.build(meal_plan_id, None, servings).await
    }

    /// Shopping list restricted to servings dated `from..=to`
    ///
    /// # Errors
    ///
    /// As [`generate_shopping_list`](Self::generate_shopping_list), plus
    /// `InvalidInput` when `from` is after `to`.
    pub async fn generate_shopping_list_between(
        &self,
        meal_plan_id: MealPlanId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<ShoppingList> {
        if from > to {
            return Err(ShoppingError::invalid_input(format!(
                "date window starts after it ends ({from} > {to})"
            )));
        }

        let servings = self.load_plan(meal_plan_id).await?;
        let in_window: Vec<ScheduledServing> = servings
            .into_iter()
            .filter(|serving| from <= serving.date && serving.date <= to)
            .collect();

        self.build(meal_plan_id, Some((from, to)), in_window).await
    }

    /// Scheduled servings of an existing plan
    async fn load_plan(&self, meal_plan_id: MealPlanId) -> Result<Vec<ScheduledServing>> {
        let plan = self
            .meal_plans
            .get_meal_plan(meal_plan_id)
            .await?
            .ok_or(ShoppingError::MealPlanNotFound(meal_plan_id))?;

        let servings = self.meal_plans.get_scheduled_servings(meal_plan_id).await?;

        for serving in servings.iter().filter(|serving| !plan.covers(serving.date)) {
            warn!(
                meal_plan_id,
                recipe_id = serving.recipe_id,
                date = %serving.date,
                "Serving scheduled outside the meal plan dates"
            );
        }

        debug!(meal_plan_id, servings = servings.len(), "Loaded meal plan");
        Ok(servings)
    }

    /// Fetch every distinct recipe once. Any missing recipe aborts.
    async fn load_recipes(&self, servings: &[ScheduledServing]) -> Result<HashMap<RecipeId, Recipe>> {
        let ids: BTreeSet<RecipeId> = servings.iter().map(|serving| serving.recipe_id).collect();

        let mut recipes = HashMap::with_capacity(ids.len());
        for id in ids {
            let recipe = self
                .recipes
                .get_recipe(id)
                .await?
                .ok_or(ShoppingError::RecipeNotFound(id))?;
            recipes.insert(id, recipe);
        }
        Ok(recipes)
    }

    async fn build(
        &self,
        meal_plan_id: MealPlanId,
        window: Option<(NaiveDate, NaiveDate)>,
        servings: Vec<ScheduledServing>,
    ) -> Result<ShoppingList> {
        let recipes = self.load_recipes(&servings).await?;
        let entries = aggregate(&servings, |id| recipes.get(&id))?;

        info!(
            meal_plan_id,
            servings = servings.len(),
            recipes = recipes.len(),
            entries = entries.len(),
            "Generated shopping list"
        );

        Ok(ShoppingList {
            meal_plan_id,
            from: window.map(|(from, _)| from),
            to: window.map(|(_, to)| to),
            entries,
        })
    }
}
