//! Meal Plan model
//!
//! Weekly assignments of recipes to (day of week, meal slot) pairs, plus the
//! joined read model used for display.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::db::{DbError, DbResult};

/// Day names indexed by `day_of_week` (0 = Monday)
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Name of a day index, or `None` outside 0-6
pub fn day_name(day_of_week: u8) -> Option<&'static str> {
    DAY_NAMES.get(day_of_week as usize).copied()
}

/// Today's `day_of_week` in local time
pub fn today() -> u8 {
    use chrono::Datelike;
    chrono::Local::now().weekday().num_days_from_monday() as u8
}

fn check_day(day_of_week: u8) -> DbResult<()> {
    if day_name(day_of_week).is_none() {
        return Err(DbError::InvalidInput(format!(
            "day_of_week must be between 0 (Monday) and 6 (Sunday), got {}",
            day_of_week
        )));
    }
    Ok(())
}

/// Meal slot within a day. Declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealSlot::Breakfast),
            "lunch" => Some(MealSlot::Lunch),
            "dinner" => Some(MealSlot::Dinner),
            "snack" | "snacks" => Some(MealSlot::Snack),
            _ => None,
        }
    }

    /// Position in the fixed display order
    pub fn sort_order(&self) -> u8 {
        *self as u8
    }
}

impl ToSql for MealSlot {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MealSlot {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        MealSlot::from_str(s).ok_or_else(|| FromSqlError::Other(format!("unknown meal slot: {}", s).into()))
    }
}

/// SQL ordering expression matching `MealSlot::sort_order`
const SLOT_ORDER_SQL: &str = "CASE mp.meal_slot \
    WHEN 'breakfast' THEN 0 \
    WHEN 'lunch' THEN 1 \
    WHEN 'dinner' THEN 2 \
    ELSE 3 END";

/// A single (user, recipe, day, slot) meal plan entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanAssignment {
    pub id: i64,
    pub user_id: i64,
    pub recipe_id: i64,
    pub day_of_week: u8,
    pub meal_slot: MealSlot,
    pub created_at: String,
}

/// Key of an assignment; also the data needed to create one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanAssignmentCreate {
    pub user_id: i64,
    pub recipe_id: i64,
    pub day_of_week: u8,
    pub meal_slot: MealSlot,
}

/// Assignment joined with the recipe fields shown in the weekly plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanRow {
    pub assignment_id: i64,
    pub user_id: i64,
    pub day_of_week: u8,
    pub day_name: String,
    pub meal_slot: MealSlot,
    pub recipe_id: i64,
    pub recipe_title: String,
    pub image_url: Option<String>,
    pub ready_in_minutes: i64,
    pub servings: i64,
    pub calories_per_serving: f64,
}

/// Planned totals for one day of the week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlanSummary {
    pub day_of_week: u8,
    pub day_name: String,
    pub meal_count: i64,
    pub planned_calories: f64,
}

impl MealPlanRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let day_of_week: u8 = row.get("day_of_week")?;
        Ok(Self {
            assignment_id: row.get("assignment_id")?,
            user_id: row.get("user_id")?,
            day_of_week,
            day_name: day_name(day_of_week).unwrap_or("Unknown").to_string(),
            meal_slot: row.get("meal_slot")?,
            recipe_id: row.get("recipe_id")?,
            recipe_title: row.get("title")?,
            image_url: row.get("image_url")?,
            ready_in_minutes: row.get("ready_in_minutes")?,
            servings: row.get("servings")?,
            calories_per_serving: row.get("calories_per_serving")?,
        })
    }
}

const JOINED_SELECT: &str = r#"
    SELECT
        mp.id AS assignment_id, mp.user_id, mp.day_of_week, mp.meal_slot,
        r.id AS recipe_id, r.title, r.image_url, r.ready_in_minutes,
        r.servings, r.calories_per_serving
    FROM meal_plan mp
    JOIN recipes r ON r.id = mp.recipe_id
"#;

impl MealPlanAssignment {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            recipe_id: row.get("recipe_id")?,
            day_of_week: row.get("day_of_week")?,
            meal_slot: row.get("meal_slot")?,
            created_at: row.get("created_at")?,
        })
    }

    fn find_id(conn: &Connection, key: &MealPlanAssignmentCreate) -> DbResult<Option<i64>> {
        let id = conn
            .query_row(
                r#"
                SELECT id FROM meal_plan
                WHERE user_id = ?1 AND recipe_id = ?2 AND day_of_week = ?3 AND meal_slot = ?4
                "#,
                params![key.user_id, key.recipe_id, key.day_of_week, key.meal_slot],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Add a recipe to a day/slot, reusing the existing assignment if the same
    /// key is already planned.
    ///
    /// Returns the assignment id and whether a new row was created. The lookup
    /// and insert run in one immediate transaction, so concurrent callers with
    /// the same key all receive the same id.
    pub fn insert_or_reuse(conn: &mut Connection, data: &MealPlanAssignmentCreate) -> DbResult<(i64, bool)> {
        check_day(data.day_of_week)?;

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(id) = Self::find_id(&tx, data)? {
            tx.commit()?;
            debug!(assignment_id = id, "meal plan assignment already present");
            return Ok((id, false));
        }

        let user_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            [data.user_id],
            |row| row.get(0),
        )?;
        if !user_exists {
            return Err(DbError::NotFound { entity: "User", id: data.user_id });
        }

        let recipe_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM recipes WHERE id = ?1)",
            [data.recipe_id],
            |row| row.get(0),
        )?;
        if !recipe_exists {
            return Err(DbError::NotFound { entity: "Recipe", id: data.recipe_id });
        }

        tx.execute(
            r#"
            INSERT INTO meal_plan (user_id, recipe_id, day_of_week, meal_slot)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![data.user_id, data.recipe_id, data.day_of_week, data.meal_slot],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(
            assignment_id = id,
            user_id = data.user_id,
            recipe_id = data.recipe_id,
            day_of_week = data.day_of_week,
            meal_slot = data.meal_slot.as_str(),
            "added recipe to meal plan"
        );
        Ok((id, true))
    }

    /// Get an assignment by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meal_plan WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(assignment) => Ok(Some(assignment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether this exact key is already planned
    pub fn exists(conn: &Connection, key: &MealPlanAssignmentCreate) -> DbResult<bool> {
        Ok(Self::find_id(conn, key)?.is_some())
    }

    /// The user's whole week, ordered by day then breakfast, lunch, dinner, snack
    pub fn list_for_user(conn: &Connection, user_id: i64) -> DbResult<Vec<MealPlanRow>> {
        let sql = format!(
            "{} WHERE mp.user_id = ?1 ORDER BY mp.day_of_week ASC, {}, mp.id ASC",
            JOINED_SELECT, SLOT_ORDER_SQL
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map([user_id], MealPlanRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// One day of the user's plan, in slot order
    pub fn list_for_day(conn: &Connection, user_id: i64, day_of_week: u8) -> DbResult<Vec<MealPlanRow>> {
        check_day(day_of_week)?;

        let sql = format!(
            "{} WHERE mp.user_id = ?1 AND mp.day_of_week = ?2 ORDER BY {}, mp.id ASC",
            JOINED_SELECT, SLOT_ORDER_SQL
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt
            .query_map(params![user_id, day_of_week], MealPlanRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Number of assignments the user has
    pub fn count_for_user(conn: &Connection, user_id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM meal_plan WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Number of assignments referencing a recipe, across all users
    pub fn count_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM meal_plan WHERE recipe_id = ?1",
            [recipe_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Per-day meal counts and planned calories for all seven days
    pub fn planned_calories_by_day(conn: &Connection, user_id: i64) -> DbResult<Vec<DayPlanSummary>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT mp.day_of_week, COUNT(*), COALESCE(SUM(r.calories_per_serving), 0)
            FROM meal_plan mp
            JOIN recipes r ON r.id = mp.recipe_id
            WHERE mp.user_id = ?1
            GROUP BY mp.day_of_week
            "#,
        )?;

        let totals = stmt
            .query_map([user_id], |row| {
                Ok((row.get::<_, u8>(0)?, row.get::<_, i64>(1)?, row.get::<_, f64>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let summaries = (0u8..7)
            .map(|day| {
                let (meal_count, planned_calories) = totals
                    .iter()
                    .find(|(d, _, _)| *d == day)
                    .map(|(_, count, kcal)| (*count, *kcal))
                    .unwrap_or((0, 0.0));
                DayPlanSummary {
                    day_of_week: day,
                    day_name: DAY_NAMES[day as usize].to_string(),
                    meal_count,
                    planned_calories,
                }
            })
            .collect();

        Ok(summaries)
    }

    /// Delete a single assignment
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meal_plan WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Delete every assignment for one user on one day
    pub fn delete_for_day(conn: &Connection, user_id: i64, day_of_week: u8) -> DbResult<usize> {
        check_day(day_of_week)?;

        let rows = conn.execute(
            "DELETE FROM meal_plan WHERE user_id = ?1 AND day_of_week = ?2",
            params![user_id, day_of_week],
        )?;
        info!(user_id, day_of_week, removed = rows, "cleared meal plan day");
        Ok(rows)
    }

    /// Delete every assignment owned by a user
    pub fn delete_all_for_user(conn: &Connection, user_id: i64) -> DbResult<usize> {
        let rows = conn.execute("DELETE FROM meal_plan WHERE user_id = ?1", [user_id])?;
        info!(user_id, removed = rows, "cleared meal plan");
        Ok(rows)
    }
}
