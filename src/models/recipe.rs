//! Recipe model
//!
//! Recipes saved locally from search results so meal plans can reference them.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::db::{DbError, DbResult};
use super::MealPlanAssignment;

/// A locally saved recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    /// Identifier assigned by the recipe search service, if any
    pub external_id: Option<String>,
    pub title: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub ready_in_minutes: i64,
    pub servings: i64,
    pub calories_per_serving: f64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for saving a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSave {
    pub external_id: Option<String>,
    pub title: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: i64,
    #[serde(default = "default_servings")]
    pub servings: i64,
    #[serde(default)]
    pub calories_per_serving: f64,
    pub notes: Option<String>,
}

fn default_servings() -> i64 {
    1
}

/// Result of a delete request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecipeDeleteOutcome {
    Deleted,
    NotFound,
    /// Still referenced by meal plan assignments
    InUse { assignments: i64 },
}

impl RecipeSave {
    fn validate(&self) -> DbResult<()> {
        if self.title.trim().is_empty() {
            return Err(DbError::InvalidInput("Recipe title must not be empty".to_string()));
        }
        if self.servings < 1 {
            return Err(DbError::InvalidInput(format!(
                "Servings must be at least 1, got {}",
                self.servings
            )));
        }
        if self.ready_in_minutes < 0 {
            return Err(DbError::InvalidInput("ready_in_minutes must not be negative".to_string()));
        }
        if !(self.calories_per_serving >= 0.0) {
            return Err(DbError::InvalidInput(format!(
                "calories_per_serving must not be negative, got {}",
                self.calories_per_serving
            )));
        }
        Ok(())
    }
}

impl Recipe {
    /// Create a Recipe from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            external_id: row.get("external_id")?,
            title: row.get("title")?,
            image_url: row.get("image_url")?,
            source_url: row.get("source_url")?,
            ready_in_minutes: row.get("ready_in_minutes")?,
            servings: row.get("servings")?,
            calories_per_serving: row.get("calories_per_serving")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Save a recipe.
    ///
    /// A recipe whose `external_id` is already stored is refreshed in place
    /// and keeps its local id, so saving the same search result twice never
    /// duplicates it.
    pub fn save(conn: &Connection, data: &RecipeSave) -> DbResult<Self> {
        data.validate()?;

        let id: i64 = conn.query_row(
            r#"
            INSERT INTO recipes (
                external_id, title, image_url, source_url,
                ready_in_minutes, servings, calories_per_serving, notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(external_id) DO UPDATE SET
                title = excluded.title,
                image_url = excluded.image_url,
                source_url = excluded.source_url,
                ready_in_minutes = excluded.ready_in_minutes,
                servings = excluded.servings,
                calories_per_serving = excluded.calories_per_serving,
                notes = COALESCE(excluded.notes, recipes.notes),
                updated_at = datetime('now')
            RETURNING id
            "#,
            params![
                data.external_id,
                data.title.trim(),
                data.image_url,
                data.source_url,
                data.ready_in_minutes,
                data.servings,
                data.calories_per_serving,
                data.notes,
            ],
            |row| row.get(0),
        )?;

        debug!(recipe_id = id, external_id = ?data.external_id, "saved recipe");
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Recipe", id })
    }

    /// Get a recipe by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a recipe by its search service identifier
    pub fn get_by_external_id(conn: &Connection, external_id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE external_id = ?1")?;

        let result = stmt.query_row([external_id], Self::from_row);
        match result {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List recipes, optionally filtered by a title substring
    pub fn list(conn: &Connection, query: Option<&str>, limit: i64, offset: i64) -> DbResult<Vec<Self>> {
        let recipes = match query {
            Some(q) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM recipes WHERE title LIKE ?1 ORDER BY title, id LIMIT ?2 OFFSET ?3",
                )?;
                let rows = stmt
                    .query_map(params![format!("%{}%", q), limit, offset], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt =
                    conn.prepare("SELECT * FROM recipes ORDER BY title, id LIMIT ?1 OFFSET ?2")?;
                let rows = stmt
                    .query_map(params![limit, offset], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(recipes)
    }

    /// Count recipes, optionally filtered by a title substring
    pub fn count(conn: &Connection, query: Option<&str>) -> DbResult<i64> {
        let count: i64 = match query {
            Some(q) => conn.query_row(
                "SELECT COUNT(*) FROM recipes WHERE title LIKE ?1",
                [format!("%{}%", q)],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// Delete a recipe unless a meal plan still uses it
    pub fn delete(conn: &Connection, id: i64) -> DbResult<RecipeDeleteOutcome> {
        if Self::get_by_id(conn, id)?.is_none() {
            return Ok(RecipeDeleteOutcome::NotFound);
        }

        let assignments = MealPlanAssignment::count_for_recipe(conn, id)?;
        if assignments > 0 {
            return Ok(RecipeDeleteOutcome::InUse { assignments });
        }

        conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        info!(recipe_id = id, "deleted recipe");
        Ok(RecipeDeleteOutcome::Deleted)
    }
}
