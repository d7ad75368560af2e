//! User profile model
//!
//! Stores a user's body metrics and daily goals, always in metric units.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::{DbError, DbResult};
use crate::nutrition::{
    is_valid_age, is_valid_calorie_goal, is_valid_height, is_valid_water_goal, is_valid_weight,
    ActivityLevel, BodyMetrics, Height, HeightUnit, Sex, UnitSystem, Weight, WeightUnit,
};

/// Stored profile for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
    pub unit_system: UnitSystem,
    pub calorie_goal_kcal: i32,
    pub water_goal_ml: i32,
    pub updated_at: String,
}

/// Data for setting a profile
///
/// Goals left as `None` are derived from the body metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileSet {
    pub metrics: BodyMetrics,
    pub unit_system: UnitSystem,
    pub calorie_goal_kcal: Option<i32>,
    pub water_goal_ml: Option<i32>,
}

impl UserProfileSet {
    /// Range-check the metrics and fill in missing goals
    fn resolve(&self) -> DbResult<(f64, f64, i32, i32)> {
        let m = &self.metrics;
        if !is_valid_weight(m.weight.value, m.weight.unit) {
            return Err(DbError::InvalidInput(format!(
                "Weight {} {} is outside 30-300 kg",
                m.weight.value,
                m.weight.unit.symbol()
            )));
        }
        if !is_valid_height(m.height.value, m.height.unit) {
            return Err(DbError::InvalidInput(format!(
                "Height {} {} is outside 100-250 cm",
                m.height.value,
                m.height.unit.symbol()
            )));
        }
        if !is_valid_age(m.age) {
            return Err(DbError::InvalidInput(format!("Age {} is outside 13-120", m.age)));
        }

        let goals = m
            .compute_goals()
            .map_err(|e| DbError::InvalidInput(e.to_string()))?;

        let calorie_goal = self.calorie_goal_kcal.unwrap_or(goals.daily_calories_kcal);
        if !is_valid_calorie_goal(calorie_goal) {
            return Err(DbError::InvalidInput(format!(
                "Calorie goal {} kcal is outside 800-5000",
                calorie_goal
            )));
        }

        let water_goal = self.water_goal_ml.unwrap_or(goals.water_intake_ml);
        if !is_valid_water_goal(water_goal) {
            return Err(DbError::InvalidInput(format!(
                "Water goal {} ml is outside 500-5000",
                water_goal
            )));
        }

        Ok((goals.weight_kg, goals.height_cm, calorie_goal, water_goal))
    }
}

impl UserProfile {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let sex: String = row.get("sex")?;
        let activity_level: String = row.get("activity_level")?;
        let unit_system: String = row.get("unit_system")?;
        Ok(Self {
            user_id: row.get("user_id")?,
            weight_kg: row.get("weight_kg")?,
            height_cm: row.get("height_cm")?,
            age: row.get("age")?,
            sex: Sex::from_label_lossy(&sex),
            activity_level: ActivityLevel::from_label_lossy(&activity_level),
            unit_system: UnitSystem::from_str(&unit_system).unwrap_or_default(),
            calorie_goal_kcal: row.get("calorie_goal_kcal")?,
            water_goal_ml: row.get("water_goal_ml")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get a user's profile
    pub fn get(conn: &Connection, user_id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM user_profiles WHERE user_id = ?1")?;

        let result = stmt.query_row([user_id], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set or replace a user's profile (upsert)
    pub fn upsert(conn: &Connection, user_id: i64, data: &UserProfileSet) -> DbResult<Self> {
        let (weight_kg, height_cm, calorie_goal, water_goal) = data.resolve()?;

        let user_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
            [user_id],
            |row| row.get(0),
        )?;
        if !user_exists {
            return Err(DbError::NotFound { entity: "User", id: user_id });
        }

        conn.execute(
            r#"
            INSERT INTO user_profiles (
                user_id, weight_kg, height_cm, age, sex, activity_level,
                unit_system, calorie_goal_kcal, water_goal_ml
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(user_id) DO UPDATE SET
                weight_kg = excluded.weight_kg,
                height_cm = excluded.height_cm,
                age = excluded.age,
                sex = excluded.sex,
                activity_level = excluded.activity_level,
                unit_system = excluded.unit_system,
                calorie_goal_kcal = excluded.calorie_goal_kcal,
                water_goal_ml = excluded.water_goal_ml,
                updated_at = datetime('now')
            "#,
            params![
                user_id,
                weight_kg,
                height_cm,
                data.metrics.age,
                data.metrics.sex.as_str(),
                data.metrics.activity_level.as_str(),
                data.unit_system.to_db_str(),
                calorie_goal,
                water_goal,
            ],
        )?;

        info!(user_id, calorie_goal, water_goal, "saved user profile");
        Self::get(conn, user_id)?.ok_or(DbError::NotFound { entity: "UserProfile", id: user_id })
    }

    /// Stored metrics as a `BodyMetrics` value in metric units
    pub fn metrics(&self) -> BodyMetrics {
        BodyMetrics {
            weight: Weight { value: self.weight_kg, unit: WeightUnit::Kilograms },
            height: Height { value: self.height_cm, unit: HeightUnit::Centimeters },
            age: self.age,
            sex: self.sex,
            activity_level: self.activity_level,
        }
    }
}
