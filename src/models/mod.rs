//! Data models
//!
//! Rust structs representing database entities.

mod meal_plan;
mod profile;
mod recipe;
mod user;

pub use meal_plan::{
    day_name, today, DayPlanSummary, MealPlanAssignment, MealPlanAssignmentCreate, MealPlanRow,
    MealSlot, DAY_NAMES,
};
pub use profile::{UserProfile, UserProfileSet};
pub use recipe::{Recipe, RecipeDeleteOutcome, RecipeSave};
pub use user::{User, UserCreate};

#[cfg(test)]
pub(crate) mod testing {
    use rusqlite::Connection;

    use super::{Recipe, RecipeSave, User, UserCreate};
    use crate::db::migrations::run_migrations;

    /// Fresh in-memory database with the schema applied
    pub fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    pub fn user(conn: &Connection, email: &str) -> i64 {
        User::create(conn, &UserCreate {
            name: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
        })
        .unwrap()
        .id
    }

    pub fn recipe(conn: &Connection, title: &str, calories_per_serving: f64) -> i64 {
        Recipe::save(conn, &RecipeSave {
            external_id: None,
            title: title.to_string(),
            image_url: None,
            source_url: None,
            ready_in_minutes: 15,
            servings: 1,
            calories_per_serving,
            notes: None,
        })
        .unwrap()
        .id
    }
}
