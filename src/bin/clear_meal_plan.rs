//! Utility to clear a user's whole meal plan
//!
//! Usage: clear_meal_plan <user_id>

use nutriplan::config::Config;
use nutriplan::db::migrations;
use nutriplan::models::{MealPlanAssignment, User};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let user_id: i64 = match std::env::args().nth(1).map(|arg| arg.parse()) {
        Some(Ok(id)) => id,
        Some(Err(e)) => return Err(format!("Invalid user id: {}", e).into()),
        None => return Err("Usage: clear_meal_plan <user_id>".into()),
    };

    let config = Config::from_env();
    println!("Database path: {}", config.database_path.display());

    let database = config.open_database()?;
    database.with_conn(migrations::run_migrations)?;

    database.with_conn(|conn| {
        match User::get_by_id(conn, user_id)? {
            Some(user) => println!("Clearing meal plan for {} <{}>", user.name, user.email),
            None => println!("No user with id {}; removing any orphaned entries", user_id),
        }

        let removed = MealPlanAssignment::delete_all_for_user(conn, user_id)?;
        println!("Removed {} meal plan entries", removed);
        Ok(())
    })?;

    Ok(())
}
