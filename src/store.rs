//! # Recipe and Meal Plan Stores
//!
//! Read-side interfaces the shopping list service depends on, plus an
//! in-memory implementation.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::Result;
use crate::ingredient_model::{MealPlan, MealPlanId, Recipe, RecipeId, ScheduledServing};

#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Fetch one recipe with its ingredient lines. `Ok(None)` if it does not exist.
    async fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>>;
}

#[async_trait]
pub trait MealPlanStore: Send + Sync {
    /// Fetch a meal plan header. `Ok(None)` if it does not exist.
    async fn get_meal_plan(&self, id: MealPlanId) -> Result<Option<MealPlan>>;

    /// Every recipe serving scheduled on the plan, ordered by date
    async fn get_scheduled_servings(&self, id: MealPlanId) -> Result<Vec<ScheduledServing>>;
}

/// Store backed by plain maps
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    recipes: HashMap<RecipeId, Recipe>,
    meal_plans: HashMap<MealPlanId, MealPlan>,
    servings: HashMap<MealPlanId, Vec<ScheduledServing>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_recipe(&mut self, recipe: Recipe) {
        self.recipes.insert(recipe.id, recipe);
    }

    pub fn add_meal_plan(&mut self, plan: MealPlan) {
        self.servings.entry(plan.id).or_default();
        self.meal_plans.insert(plan.id, plan);
    }

    /// Schedule a serving on an existing or future meal plan
    pub fn schedule(&mut self, meal_plan_id: MealPlanId, serving: ScheduledServing) {
        self.servings.entry(meal_plan_id).or_default().push(serving);
    }
}

#[async_trait]
impl RecipeStore for InMemoryStore {
    async fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>> {
        Ok(self.recipes.get(&id).cloned())
    }
}

#[async_trait]
impl MealPlanStore for InMemoryStore {
    async fn get_meal_plan(&self, id: MealPlanId) -> Result<Option<MealPlan>> {
        Ok(self.meal_plans.get(&id).cloned())
    }

    async fn get_scheduled_servings(&self, id: MealPlanId) -> Result<Vec<ScheduledServing>> {
        let mut servings = self.servings.get(&id).cloned().unwrap_or_default();
        servings.sort_by_key(|serving| serving.date);
        Ok(servings)
    }
}
