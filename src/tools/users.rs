//! User and Profile Tools

use serde::Serialize;

use crate::db::Database;
use crate::models::{MealPlanAssignment, User, UserCreate, UserProfile, UserProfileSet};
use crate::nutrition::{
    format_bmi, format_calories, format_height, format_water, format_weight, BodyMetrics,
    HealthGoals, Height, UnitSystem, Weight,
};
use crate::tools::calculator::{parse_activity_level, parse_height_unit, parse_sex, parse_weight_unit};

/// User with profile and plan summary
#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub user: User,
    pub profile: Option<UserProfile>,
    pub planned_meals: i64,
}

/// Profile with goals recomputed from the stored metrics
#[derive(Debug, Serialize)]
pub struct ProfileDetail {
    pub profile: UserProfile,
    pub computed: HealthGoals,
    pub display: ProfileDisplay,
}

/// Profile values formatted in the user's preferred unit system
#[derive(Debug, Serialize)]
pub struct ProfileDisplay {
    pub weight: String,
    pub height: String,
    pub bmi: String,
    pub calorie_goal: String,
    pub water_goal: String,
}

/// Response for delete_user
#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub success: bool,
    pub id: i64,
    pub meal_plan_entries_removed: usize,
}

pub fn create_user(db: &Database, name: String, email: String) -> Result<User, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if User::get_by_email(&conn, &email)
        .map_err(|e| format!("Failed to check email: {}", e))?
        .is_some()
    {
        return Err(format!("A user with email {} already exists", email.trim()));
    }

    User::create(&conn, &UserCreate { name, email })
        .map_err(|e| format!("Failed to create user: {}", e))
}

pub fn get_user(db: &Database, id: i64) -> Result<Option<UserDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let user = match User::get_by_id(&conn, id).map_err(|e| format!("Failed to get user: {}", e))? {
        Some(user) => user,
        None => return Ok(None),
    };

    let profile = UserProfile::get(&conn, id)
        .map_err(|e| format!("Failed to get profile: {}", e))?;
    let planned_meals = MealPlanAssignment::count_for_user(&conn, id)
        .map_err(|e| format!("Failed to count meal plan: {}", e))?;

    Ok(Some(UserDetail { user, profile, planned_meals }))
}

/// Delete a user together with their profile and meal plan
pub fn delete_user(db: &Database, id: i64) -> Result<DeleteUserResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let removed = User::delete(&conn, id).map_err(|e| format!("Failed to delete user: {}", e))?;

    Ok(DeleteUserResponse {
        success: removed.is_some(),
        id,
        meal_plan_entries_removed: removed.unwrap_or(0),
    })
}

/// Set a user's body metrics and goals; missing goals are derived
#[allow(clippy::too_many_arguments)]
pub fn set_profile(
    db: &Database,
    user_id: i64,
    weight: f64,
    weight_unit: &str,
    height: f64,
    height_unit: &str,
    age: u32,
    sex: &str,
    activity_level: &str,
    unit_system: Option<&str>,
    calorie_goal_kcal: Option<i32>,
    water_goal_ml: Option<i32>,
) -> Result<ProfileDetail, String> {
    let weight_unit = parse_weight_unit(weight_unit)?;
    let height_unit = parse_height_unit(height_unit)?;

    // Default the display system to whatever the weight was entered in
    let unit_system = match unit_system {
        Some(s) => UnitSystem::from_str(s).ok_or_else(|| format!("Unknown unit system: {}", s))?,
        None if weight_unit == UnitSystem::Imperial.weight_unit() => UnitSystem::Imperial,
        None => UnitSystem::Metric,
    };

    let data = UserProfileSet {
        metrics: BodyMetrics {
            weight: Weight { value: weight, unit: weight_unit },
            height: Height { value: height, unit: height_unit },
            age,
            sex: parse_sex(sex, false)?,
            activity_level: parse_activity_level(activity_level, false)?,
        },
        unit_system,
        calorie_goal_kcal,
        water_goal_ml,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = UserProfile::upsert(&conn, user_id, &data)
        .map_err(|e| format!("Failed to save profile: {}", e))?;

    profile_detail(profile)
}

pub fn get_profile(db: &Database, user_id: i64) -> Result<Option<ProfileDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    match UserProfile::get(&conn, user_id).map_err(|e| format!("Failed to get profile: {}", e))? {
        Some(profile) => profile_detail(profile).map(Some),
        None => Ok(None),
    }
}

fn profile_detail(profile: UserProfile) -> Result<ProfileDetail, String> {
    let computed = profile.metrics().compute_goals().map_err(|e| e.to_string())?;
    let system = profile.unit_system;

    let display = ProfileDisplay {
        weight: format_weight(profile.weight_kg, system.weight_unit()),
        height: format_height(profile.height_cm, system.height_unit()),
        bmi: format_bmi(computed.bmi),
        calorie_goal: format_calories(profile.calorie_goal_kcal),
        water_goal: format_water(profile.water_goal_ml),
    };

    Ok(ProfileDetail { profile, computed, display })
}
