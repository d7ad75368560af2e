//! Recipe MCP Tools
//!
//! Tools for saving recipes picked from search results and browsing the
//! local recipe store.

use serde::Serialize;

use crate::db::Database;
use crate::models::{MealPlanAssignment, Recipe, RecipeDeleteOutcome, RecipeSave};

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 200;

/// Response for save_recipe
#[derive(Debug, Serialize)]
pub struct SaveRecipeResponse {
    pub recipe: Recipe,
    /// False when an existing recipe with the same external id was refreshed
    pub created: bool,
}

/// Recipe with the number of meal plan entries using it
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub meal_plan_uses: i64,
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct RecipeListResponse {
    pub recipes: Vec<Recipe>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for delete_recipe
#[derive(Debug, Serialize)]
pub struct DeleteRecipeResponse {
    pub id: i64,
    #[serde(flatten)]
    pub outcome: RecipeDeleteOutcome,
}

pub fn save_recipe(db: &Database, data: RecipeSave) -> Result<SaveRecipeResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let existing = match data.external_id.as_deref() {
        Some(external_id) => Recipe::get_by_external_id(&conn, external_id)
            .map_err(|e| format!("Failed to look up recipe: {}", e))?,
        None => None,
    };

    let recipe = Recipe::save(&conn, &data).map_err(|e| format!("Failed to save recipe: {}", e))?;

    Ok(SaveRecipeResponse { recipe, created: existing.is_none() })
}

pub fn get_recipe(db: &Database, id: i64) -> Result<Option<RecipeDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = match Recipe::get_by_id(&conn, id).map_err(|e| format!("Failed to get recipe: {}", e))? {
        Some(recipe) => recipe,
        None => return Ok(None),
    };

    let meal_plan_uses = MealPlanAssignment::count_for_recipe(&conn, id)
        .map_err(|e| format!("Failed to count recipe usage: {}", e))?;

    Ok(Some(RecipeDetail { recipe, meal_plan_uses }))
}

/// List saved recipes, optionally filtered by a title substring
pub fn list_recipes(
    db: &Database,
    query: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<RecipeListResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    let query = query.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let recipes = Recipe::list(&conn, query, limit, offset)
        .map_err(|e| format!("Failed to list recipes: {}", e))?;
    let total = Recipe::count(&conn, query).map_err(|e| format!("Failed to count recipes: {}", e))?;

    Ok(RecipeListResponse { recipes, total, limit, offset })
}

/// Delete a recipe; refused while any meal plan entry references it
pub fn delete_recipe(db: &Database, id: i64) -> Result<DeleteRecipeResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let outcome = Recipe::delete(&conn, id).map_err(|e| format!("Failed to delete recipe: {}", e))?;

    Ok(DeleteRecipeResponse { id, outcome })
}
