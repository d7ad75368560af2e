//! Meal Plan MCP Tools
//!
//! Tools for building and clearing a user's weekly meal plan.

use serde::Serialize;

use crate::db::{Database, DbError};
use crate::models::{
    day_name, today, DayPlanSummary, MealPlanAssignment, MealPlanAssignmentCreate, MealPlanRow,
    MealSlot, User, UserProfile,
};

/// Response for add_recipe_to_meal_plan
#[derive(Debug, Serialize)]
pub struct AddToMealPlanResponse {
    pub assignment_id: i64,
    /// False when the same recipe was already planned for this day and slot
    pub created: bool,
    pub user_id: i64,
    pub recipe_id: i64,
    pub day_of_week: u8,
    pub day_name: &'static str,
    pub meal_slot: MealSlot,
}

/// One day of the weekly plan
#[derive(Debug, Serialize)]
pub struct MealPlanDay {
    pub day_of_week: u8,
    pub day_name: &'static str,
    pub meals: Vec<MealPlanRow>,
    pub planned_calories: f64,
}

/// Response for list_meal_plan
#[derive(Debug, Serialize)]
pub struct MealPlanResponse {
    pub user_id: i64,
    pub today: u8,
    pub total_entries: usize,
    pub days: Vec<MealPlanDay>,
}

/// Planned calories for a day compared to the user's goal
#[derive(Debug, Serialize)]
pub struct DayGoalComparison {
    #[serde(flatten)]
    pub summary: DayPlanSummary,
    /// Goal minus planned calories; negative when over the goal
    pub remaining_kcal: Option<f64>,
}

/// Response for get_meal_plan_summary
#[derive(Debug, Serialize)]
pub struct MealPlanSummaryResponse {
    pub user_id: i64,
    pub calorie_goal_kcal: Option<i32>,
    pub weekly_planned_calories: f64,
    pub days_over_goal: usize,
    pub days: Vec<DayGoalComparison>,
}

/// Response for the remove_* tools
#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub success: bool,
    pub removed: usize,
}

fn parse_meal_slot(label: &str) -> Result<MealSlot, String> {
    MealSlot::from_str(label).ok_or_else(|| {
        format!(
            "Unknown meal slot '{}'. Expected one of: breakfast, lunch, dinner, snack",
            label
        )
    })
}

fn check_day(day_of_week: u8) -> Result<&'static str, String> {
    day_name(day_of_week).ok_or_else(|| {
        format!("day_of_week must be between 0 (Monday) and 6 (Sunday), got {}", day_of_week)
    })
}

/// Add a recipe to a user's day and slot; re-adding the same entry is a no-op
pub fn add_recipe_to_meal_plan(
    db: &Database,
    user_id: i64,
    recipe_id: i64,
    day_of_week: u8,
    meal_slot: &str,
) -> Result<AddToMealPlanResponse, String> {
    let day_name = check_day(day_of_week)?;
    let meal_slot = parse_meal_slot(meal_slot)?;

    let key = MealPlanAssignmentCreate { user_id, recipe_id, day_of_week, meal_slot };
    let (assignment_id, created) = db
        .with_conn_mut(|conn| MealPlanAssignment::insert_or_reuse(conn, &key))
        .map_err(|e| match e {
            DbError::NotFound { .. } => e.to_string(),
            e => format!("Failed to add recipe to meal plan: {}", e),
        })?;

    Ok(AddToMealPlanResponse {
        assignment_id,
        created,
        user_id,
        recipe_id,
        day_of_week,
        day_name,
        meal_slot,
    })
}

/// The user's plan grouped by day. With `day_of_week` only that day is returned.
pub fn list_meal_plan(
    db: &Database,
    user_id: i64,
    day_of_week: Option<u8>,
) -> Result<MealPlanResponse, String> {
    if let Some(day) = day_of_week {
        check_day(day)?;
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let rows = match day_of_week {
        Some(day) => MealPlanAssignment::list_for_day(&conn, user_id, day),
        None => MealPlanAssignment::list_for_user(&conn, user_id),
    }
    .map_err(|e| format!("Failed to list meal plan: {}", e))?;

    let total_entries = rows.len();
    let days = group_by_day(rows);

    Ok(MealPlanResponse { user_id, today: today(), total_entries, days })
}

/// Rows arrive ordered by day, so consecutive runs form the groups
fn group_by_day(rows: Vec<MealPlanRow>) -> Vec<MealPlanDay> {
    let mut days: Vec<MealPlanDay> = Vec::new();

    for row in rows {
        match days.last_mut() {
            Some(day) if day.day_of_week == row.day_of_week => {
                day.planned_calories += row.calories_per_serving;
                day.meals.push(row);
            }
            _ => days.push(MealPlanDay {
                day_of_week: row.day_of_week,
                day_name: day_name(row.day_of_week).unwrap_or("Unknown"),
                planned_calories: row.calories_per_serving,
                meals: vec![row],
            }),
        }
    }

    days
}

/// Planned calories for each day of the week against the profile's goal
pub fn get_meal_plan_summary(db: &Database, user_id: i64) -> Result<MealPlanSummaryResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if User::get_by_id(&conn, user_id)
        .map_err(|e| format!("Failed to get user: {}", e))?
        .is_none()
    {
        return Err(format!("User not found: {}", user_id));
    }

    let calorie_goal_kcal = UserProfile::get(&conn, user_id)
        .map_err(|e| format!("Failed to get profile: {}", e))?
        .map(|p| p.calorie_goal_kcal);

    let summaries = MealPlanAssignment::planned_calories_by_day(&conn, user_id)
        .map_err(|e| format!("Failed to summarize meal plan: {}", e))?;

    let weekly_planned_calories = summaries.iter().map(|s| s.planned_calories).sum();
    let days: Vec<DayGoalComparison> = summaries
        .into_iter()
        .map(|summary| DayGoalComparison {
            remaining_kcal: calorie_goal_kcal.map(|goal| goal as f64 - summary.planned_calories),
            summary,
        })
        .collect();
    let days_over_goal = days
        .iter()
        .filter(|d| d.remaining_kcal.is_some_and(|r| r < 0.0))
        .count();

    Ok(MealPlanSummaryResponse {
        user_id,
        calorie_goal_kcal,
        weekly_planned_calories,
        days_over_goal,
        days,
    })
}

pub fn remove_meal_plan_entry(db: &Database, assignment_id: i64) -> Result<RemoveResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let success = MealPlanAssignment::delete(&conn, assignment_id)
        .map_err(|e| format!("Failed to remove meal plan entry: {}", e))?;

    Ok(RemoveResponse { success, removed: usize::from(success) })
}

pub fn remove_meal_plan_day(db: &Database, user_id: i64, day_of_week: u8) -> Result<RemoveResponse, String> {
    check_day(day_of_week)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let removed = MealPlanAssignment::delete_for_day(&conn, user_id, day_of_week)
        .map_err(|e| format!("Failed to clear meal plan day: {}", e))?;

    Ok(RemoveResponse { success: true, removed })
}

pub fn remove_all_meal_plan(db: &Database, user_id: i64) -> Result<RemoveResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let removed = MealPlanAssignment::delete_all_for_user(&conn, user_id)
        .map_err(|e| format!("Failed to clear meal plan: {}", e))?;

    Ok(RemoveResponse { success: true, removed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::RecipeSave;
    use crate::tools::recipes::save_recipe;
    use crate::tools::users::{create_user, set_profile};

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();
        db
    }

    fn recipe(db: &Database, title: &str, kcal: f64) -> i64 {
        save_recipe(db, RecipeSave {
            external_id: None,
            title: title.to_string(),
            image_url: None,
            source_url: None,
            ready_in_minutes: 10,
            servings: 1,
            calories_per_serving: kcal,
            notes: None,
        })
        .unwrap()
        .recipe
        .id
    }

    fn user(db: &Database, email: &str) -> i64 {
        create_user(db, "Test".to_string(), email.to_string()).unwrap().id
    }

    #[test]
    fn test_add_is_idempotent() {
        let db = test_db();
        let u = user(&db, "a@example.com");
        let r = recipe(&db, "Oats", 350.0);

        let first = add_recipe_to_meal_plan(&db, u, r, 0, "Breakfast").unwrap();
        let second = add_recipe_to_meal_plan(&db, u, r, 0, "breakfast").unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.assignment_id, second.assignment_id);
        assert_eq!(first.day_name, "Monday");
        assert_eq!(list_meal_plan(&db, u, None).unwrap().total_entries, 1);
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let db = test_db();
        let u = user(&db, "a@example.com");
        let r = recipe(&db, "Oats", 350.0);

        assert!(add_recipe_to_meal_plan(&db, u, r, 7, "lunch").unwrap_err().contains("day_of_week"));
        assert!(add_recipe_to_meal_plan(&db, u, r, 1, "brunch").unwrap_err().contains("meal slot"));
        assert!(add_recipe_to_meal_plan(&db, u, 999, 1, "lunch").unwrap_err().contains("Recipe"));
        assert!(add_recipe_to_meal_plan(&db, 999, r, 1, "lunch").unwrap_err().contains("User"));
    }

    #[test]
    fn test_list_groups_by_day_in_slot_order() {
        let db = test_db();
        let u = user(&db, "a@example.com");
        let soup = recipe(&db, "Soup", 300.0);
        let toast = recipe(&db, "Toast", 200.0);
        let curry = recipe(&db, "Curry", 650.0);

        add_recipe_to_meal_plan(&db, u, curry, 3, "dinner").unwrap();
        add_recipe_to_meal_plan(&db, u, soup, 1, "snack").unwrap();
        add_recipe_to_meal_plan(&db, u, toast, 3, "breakfast").unwrap();
        add_recipe_to_meal_plan(&db, u, soup, 1, "lunch").unwrap();

        let plan = list_meal_plan(&db, u, None).unwrap();
        assert_eq!(plan.total_entries, 4);
        assert_eq!(plan.days.len(), 2);

        let tuesday = &plan.days[0];
        assert_eq!(tuesday.day_name, "Tuesday");
        let slots: Vec<MealSlot> = tuesday.meals.iter().map(|m| m.meal_slot).collect();
        assert_eq!(slots, vec![MealSlot::Lunch, MealSlot::Snack]);
        assert!((tuesday.planned_calories - 600.0).abs() < 1e-9);

        let thursday = &plan.days[1];
        assert_eq!(thursday.meals[0].recipe_title, "Toast");
        assert_eq!(thursday.meals[1].recipe_title, "Curry");

        let only_thursday = list_meal_plan(&db, u, Some(3)).unwrap();
        assert_eq!(only_thursday.days.len(), 1);
        assert_eq!(only_thursday.total_entries, 2);
    }

    #[test]
    fn test_summary_against_goal() {
        let db = test_db();
        let u = user(&db, "a@example.com");
        set_profile(&db, u, 70.0, "kg", 175.0, "cm", 30, "male", "moderate", None, Some(2000), None).unwrap();

        let big = recipe(&db, "Feast", 1500.0);
        let small = recipe(&db, "Salad", 400.0);
        add_recipe_to_meal_plan(&db, u, big, 5, "lunch").unwrap();
        add_recipe_to_meal_plan(&db, u, big, 5, "dinner").unwrap();
        add_recipe_to_meal_plan(&db, u, small, 6, "lunch").unwrap();

        let summary = get_meal_plan_summary(&db, u).unwrap();
        assert_eq!(summary.calorie_goal_kcal, Some(2000));
        assert_eq!(summary.days.len(), 7);
        assert_eq!(summary.days_over_goal, 1);
        assert!((summary.weekly_planned_calories - 3400.0).abs() < 1e-9);

        let saturday = &summary.days[5];
        assert_eq!(saturday.summary.meal_count, 2);
        assert_eq!(saturday.remaining_kcal, Some(-1000.0));
        assert_eq!(summary.days[0].remaining_kcal, Some(2000.0));
    }

    #[test]
    fn test_summary_without_profile_or_user() {
        let db = test_db();
        let u = user(&db, "a@example.com");

        let summary = get_meal_plan_summary(&db, u).unwrap();
        assert_eq!(summary.calorie_goal_kcal, None);
        assert!(summary.days.iter().all(|d| d.remaining_kcal.is_none()));

        assert!(get_meal_plan_summary(&db, 999).is_err());
    }

    #[test]
    fn test_remove_tools() {
        let db = test_db();
        let u = user(&db, "a@example.com");
        let other = user(&db, "b@example.com");
        let r = recipe(&db, "Oats", 350.0);

        let entry = add_recipe_to_meal_plan(&db, u, r, 0, "breakfast").unwrap();
        add_recipe_to_meal_plan(&db, u, r, 1, "breakfast").unwrap();
        add_recipe_to_meal_plan(&db, u, r, 1, "snack").unwrap();
        add_recipe_to_meal_plan(&db, u, r, 2, "breakfast").unwrap();
        add_recipe_to_meal_plan(&db, other, r, 1, "breakfast").unwrap();

        let removed = remove_meal_plan_entry(&db, entry.assignment_id).unwrap();
        assert!(removed.success);
        assert!(!remove_meal_plan_entry(&db, entry.assignment_id).unwrap().success);

        assert_eq!(remove_meal_plan_day(&db, u, 1).unwrap().removed, 2);
        assert!(remove_meal_plan_day(&db, u, 9).is_err());
        assert_eq!(list_meal_plan(&db, other, None).unwrap().total_entries, 1);

        assert_eq!(remove_all_meal_plan(&db, u).unwrap().removed, 1);
        assert_eq!(list_meal_plan(&db, u, None).unwrap().total_entries, 0);
        assert_eq!(list_meal_plan(&db, other, None).unwrap().total_entries, 1);
    }

    #[test]
    fn test_concurrent_adds_share_one_entry() {
        let path = std::env::temp_dir().join(format!(
            "nutriplan-meal-plan-{}-{:?}.db",
            std::process::id(),
            std::thread::current().id()
        ));
        let remove_files = || {
            for suffix in ["", "-wal", "-shm"] {
                let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
            }
        };
        remove_files();

        let db = Database::with_pool_size(&path, 8).unwrap();
        db.with_conn(run_migrations).unwrap();
        let u = user(&db, "a@example.com");
        let r = recipe(&db, "Soup", 300.0);

        for day in 0u8..5 {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let db = db.clone();
                    std::thread::spawn(move || add_recipe_to_meal_plan(&db, u, r, day, "lunch"))
                })
                .collect();

            let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            assert!(results.iter().all(|res| res.is_ok()), "{:?}", results);

            let mut ids: Vec<i64> = results.iter().map(|res| res.as_ref().unwrap().assignment_id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), 1, "day {} produced ids {:?}", day, ids);
            assert_eq!(results.iter().filter(|res| res.as_ref().unwrap().created).count(), 1);
        }

        let plan = list_meal_plan(&db, u, None).unwrap();
        assert_eq!(plan.total_entries, 5);

        drop(db);
        remove_files();
    }
}
