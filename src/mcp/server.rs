//! NutriPlan MCP Server Implementation
//!
//! Implements the MCP server with all NutriPlan tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::RecipeSave;
use crate::tools::calculator;
use crate::tools::meal_plan;
use crate::tools::recipes;
use crate::tools::status::StatusTracker;
use crate::tools::users;

/// NutriPlan MCP Service
#[derive(Clone)]
pub struct NutriplanService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<NutriplanService>,
}

impl NutriplanService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))
}

fn not_found(entity: &str, id: i64) -> String {
    format!(r#"{{"error": "{} not found", "id": {}}}"#, entity, id)
}

// ============================================================================
// Calculator Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct HealthGoalsParams {
    /// Body weight
    pub weight: f64,
    /// Unit of weight: "kg" or "lbs" (default "kg")
    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,
    /// Body height
    pub height: f64,
    /// Unit of height: "cm" or "in" (default "cm")
    #[serde(default = "default_height_unit")]
    pub height_unit: String,
    /// Age in years
    pub age: u32,
    /// "male" or "female"
    pub sex: String,
    /// sedentary, light, moderate, active, or very_active (default moderate)
    #[serde(default = "default_activity_level")]
    pub activity_level: String,
    /// Accept unrecognized sex/activity labels using the legacy fallbacks (default false)
    #[serde(default)]
    pub lenient: bool,
}

fn default_weight_unit() -> String { "kg".to_string() }
fn default_height_unit() -> String { "cm".to_string() }
fn default_activity_level() -> String { "moderate".to_string() }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BmiParams {
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Height in meters
    pub height_m: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BmrParams {
    /// Weight in kilograms
    pub weight_kg: f64,
    /// Height in centimeters
    pub height_cm: f64,
    /// Age in years
    pub age: u32,
    /// "male" or "female"
    pub sex: String,
    #[serde(default)]
    pub lenient: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DailyCaloriesParams {
    /// Basal metabolic rate in kcal/day
    pub bmr: f64,
    #[serde(default = "default_activity_level")]
    pub activity_level: String,
    #[serde(default)]
    pub lenient: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WaterIntakeParams {
    /// Weight in kilograms
    pub weight_kg: f64,
    #[serde(default = "default_activity_level")]
    pub activity_level: String,
    #[serde(default)]
    pub lenient: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertParams {
    pub value: f64,
    /// Source unit (kg/lbs for weight, cm/in for height)
    pub from_unit: String,
    /// Target unit
    pub to_unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ValidateBodyMetricsParams {
    pub weight: Option<f64>,
    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,
    pub height: Option<f64>,
    #[serde(default = "default_height_unit")]
    pub height_unit: String,
    pub age: Option<u32>,
    pub calorie_goal_kcal: Option<i32>,
    pub water_goal_ml: Option<i32>,
}

// ============================================================================
// User and Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateUserParams {
    pub name: String,
    /// Email address (unique, case-insensitive)
    pub email: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserIdParams {
    /// User ID
    pub user_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetProfileParams {
    pub user_id: i64,
    pub weight: f64,
    /// "kg" or "lbs" (default "kg")
    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,
    pub height: f64,
    /// "cm" or "in" (default "cm")
    #[serde(default = "default_height_unit")]
    pub height_unit: String,
    pub age: u32,
    /// "male" or "female"
    pub sex: String,
    #[serde(default = "default_activity_level")]
    pub activity_level: String,
    /// "metric" or "imperial" for display; defaults to the system of the weight unit
    pub unit_system: Option<String>,
    /// Daily calorie goal (800-5000); derived from the metrics when omitted
    pub calorie_goal_kcal: Option<i32>,
    /// Daily water goal in ml (500-5000); derived from the metrics when omitted
    pub water_goal_ml: Option<i32>,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveRecipeParams {
    /// ID from the recipe search service; saving the same ID again refreshes the recipe
    pub external_id: Option<String>,
    pub title: String,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: i64,
    /// Number of servings (default 1)
    #[serde(default = "default_servings")]
    pub servings: i64,
    #[serde(default)]
    pub calories_per_serving: f64,
    pub notes: Option<String>,
}

fn default_servings() -> i64 { 1 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeIdParams {
    /// Recipe ID
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecipesParams {
    /// Search query for recipe title (optional)
    pub query: Option<String>,
    /// Max results (default 50, max 200)
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ============================================================================
// Meal Plan Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddToMealPlanParams {
    pub user_id: i64,
    pub recipe_id: i64,
    /// 0 = Monday ... 6 = Sunday
    pub day_of_week: u8,
    /// breakfast, lunch, dinner, or snack
    pub meal_slot: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListMealPlanParams {
    pub user_id: i64,
    /// Only this day (0 = Monday ... 6 = Sunday); whole week when omitted
    pub day_of_week: Option<u8>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveMealPlanEntryParams {
    /// Assignment ID from list_meal_plan
    pub assignment_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveMealPlanDayParams {
    pub user_id: i64,
    /// 0 = Monday ... 6 = Sunday
    pub day_of_week: u8,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl NutriplanService {
    // --- Status ---

    #[tool(description = "Get the current status of the NutriPlan service including build info, database status, and process information")]
    async fn nutriplan_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        Ok(CallToolResult::success(vec![Content::text(to_json(&status)?)]))
    }

    #[tool(description = "Get step-by-step instructions for setting goals and planning meals. Call this when starting a planning session or when unsure how to use the tools.")]
    fn planner_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::PLANNER_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(PLANNER_INSTRUCTIONS)]))
    }

    // --- Calculator ---

    #[tool(description = "Calculate BMI, BMR, daily calorie needs and water intake from body metrics in metric or imperial units")]
    fn calculate_health_goals(&self, Parameters(p): Parameters<HealthGoalsParams>) -> Result<CallToolResult, McpError> {
        let result = calculator::calculate_health_goals(
            p.weight, &p.weight_unit, p.height, &p.height_unit, p.age, &p.sex, &p.activity_level, p.lenient,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Calculate BMI from weight (kg) and height (m). Returns 0 with no category when either input is not positive.")]
    fn calculate_bmi(&self, Parameters(p): Parameters<BmiParams>) -> Result<CallToolResult, McpError> {
        let result = calculator::bmi(p.weight_kg, p.height_m);
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Calculate basal metabolic rate (revised Harris-Benedict) from weight (kg), height (cm), age and sex")]
    fn calculate_bmr(&self, Parameters(p): Parameters<BmrParams>) -> Result<CallToolResult, McpError> {
        let result = calculator::bmr(p.weight_kg, p.height_cm, p.age, &p.sex, p.lenient)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Calculate daily calorie needs from BMR and activity level")]
    fn calculate_daily_calories(&self, Parameters(p): Parameters<DailyCaloriesParams>) -> Result<CallToolResult, McpError> {
        let result = calculator::daily_calories(p.bmr, &p.activity_level, p.lenient)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Calculate recommended daily water intake (ml) from weight (kg) and activity level")]
    fn calculate_water_intake(&self, Parameters(p): Parameters<WaterIntakeParams>) -> Result<CallToolResult, McpError> {
        let result = calculator::water_intake(p.weight_kg, &p.activity_level, p.lenient)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Convert a weight between kg and lbs")]
    fn convert_weight(&self, Parameters(p): Parameters<ConvertParams>) -> Result<CallToolResult, McpError> {
        let result = calculator::convert_weight(p.value, &p.from_unit, &p.to_unit)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Convert a height between cm and in")]
    fn convert_height(&self, Parameters(p): Parameters<ConvertParams>) -> Result<CallToolResult, McpError> {
        let result = calculator::convert_height(p.value, &p.from_unit, &p.to_unit)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Check body metrics and goals against the accepted ranges (weight 30-300 kg, height 100-250 cm, age 13-120, calories 800-5000, water 500-5000 ml). Only supplied values are checked.")]
    fn validate_body_metrics(&self, Parameters(p): Parameters<ValidateBodyMetricsParams>) -> Result<CallToolResult, McpError> {
        let result = calculator::validate_body_metrics(
            p.weight.map(|w| (w, p.weight_unit.as_str())),
            p.height.map(|h| (h, p.height_unit.as_str())),
            p.age,
            p.calorie_goal_kcal,
            p.water_goal_ml,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    // --- Users ---

    #[tool(description = "Create a user")]
    fn create_user(&self, Parameters(p): Parameters<CreateUserParams>) -> Result<CallToolResult, McpError> {
        let result = users::create_user(&self.database, p.name, p.email)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Get a user with their profile and number of planned meals")]
    fn get_user(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let result = users::get_user(&self.database, p.user_id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(detail) => to_json(&detail)?,
            None => not_found("User", p.user_id),
        };
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a user along with their profile and meal plan")]
    fn delete_user(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let result = users::delete_user(&self.database, p.user_id).map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Set a user's body metrics and daily goals. Weight and height may be in metric or imperial units; goals are derived when omitted.")]
    fn set_profile(&self, Parameters(p): Parameters<SetProfileParams>) -> Result<CallToolResult, McpError> {
        let result = users::set_profile(
            &self.database,
            p.user_id,
            p.weight,
            &p.weight_unit,
            p.height,
            &p.height_unit,
            p.age,
            &p.sex,
            &p.activity_level,
            p.unit_system.as_deref(),
            p.calorie_goal_kcal,
            p.water_goal_ml,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Get a user's profile with computed goals and values formatted in their preferred units")]
    fn get_profile(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let result = users::get_profile(&self.database, p.user_id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(detail) => to_json(&detail)?,
            None => not_found("Profile", p.user_id),
        };
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Recipes ---

    #[tool(description = "Save a recipe from search results. Saving the same external_id again refreshes the stored recipe.")]
    fn save_recipe(&self, Parameters(p): Parameters<SaveRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeSave {
            external_id: p.external_id, title: p.title, image_url: p.image_url, source_url: p.source_url,
            ready_in_minutes: p.ready_in_minutes, servings: p.servings,
            calories_per_serving: p.calories_per_serving, notes: p.notes,
        };
        let result = recipes::save_recipe(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Get a saved recipe and how many meal plan entries use it")]
    fn get_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(detail) => to_json(&detail)?,
            None => not_found("Recipe", p.id),
        };
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List saved recipes with optional title search and pagination")]
    fn list_recipes(&self, Parameters(p): Parameters<ListRecipesParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes(&self.database, p.query, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Delete a saved recipe (refused while it is in any meal plan)")]
    fn delete_recipe(&self, Parameters(p): Parameters<RecipeIdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::delete_recipe(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    // --- Meal Plan ---

    #[tool(description = "Add a recipe to a user's meal plan for a day of the week (0 = Monday) and meal slot. Adding the same entry twice returns the existing one.")]
    fn add_recipe_to_meal_plan(&self, Parameters(p): Parameters<AddToMealPlanParams>) -> Result<CallToolResult, McpError> {
        let result = meal_plan::add_recipe_to_meal_plan(&self.database, p.user_id, p.recipe_id, p.day_of_week, &p.meal_slot)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "List a user's meal plan grouped by day, in breakfast/lunch/dinner/snack order")]
    fn list_meal_plan(&self, Parameters(p): Parameters<ListMealPlanParams>) -> Result<CallToolResult, McpError> {
        let result = meal_plan::list_meal_plan(&self.database, p.user_id, p.day_of_week)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Planned calories for each day of the week compared to the user's calorie goal")]
    fn get_meal_plan_summary(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let result = meal_plan::get_meal_plan_summary(&self.database, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Remove a single meal plan entry")]
    fn remove_meal_plan_entry(&self, Parameters(p): Parameters<RemoveMealPlanEntryParams>) -> Result<CallToolResult, McpError> {
        let result = meal_plan::remove_meal_plan_entry(&self.database, p.assignment_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Remove every meal planned for a user on one day of the week")]
    fn remove_meal_plan_day(&self, Parameters(p): Parameters<RemoveMealPlanDayParams>) -> Result<CallToolResult, McpError> {
        let result = meal_plan::remove_meal_plan_day(&self.database, p.user_id, p.day_of_week)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }

    #[tool(description = "Remove a user's entire meal plan")]
    fn remove_all_meal_plan(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let result = meal_plan::remove_all_meal_plan(&self.database, p.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(to_json(&result)?)]))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for NutriplanService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutriplan".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("NutriPlan".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "NutriPlan - Nutrition goals and weekly meal planning. \
                 IMPORTANT: Call planner_instructions before planning meals. \
                 Calculator: calculate_health_goals, calculate_bmi/bmr/daily_calories/water_intake, \
                 convert_weight, convert_height, validate_body_metrics. \
                 Users: create_user/get_user/delete_user, set_profile/get_profile. \
                 Recipes: save/get/list/delete_recipe. \
                 Meal plan (day_of_week 0 = Monday): add_recipe_to_meal_plan, list_meal_plan, \
                 get_meal_plan_summary, remove_meal_plan_entry, remove_meal_plan_day, remove_all_meal_plan."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn service() -> NutriplanService {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(run_migrations).unwrap();
        NutriplanService::new(PathBuf::from(":memory:"), db)
    }

    #[test]
    fn test_server_info() {
        let info = service().get_info();
        assert_eq!(info.server_info.name, "nutriplan");
        assert!(info.instructions.unwrap().contains("planner_instructions"));
    }

    #[test]
    fn test_params_defaults() {
        let p: HealthGoalsParams = serde_json::from_str(r#"{"weight": 70, "height": 175, "age": 30, "sex": "male"}"#).unwrap();
        assert_eq!(p.weight_unit, "kg");
        assert_eq!(p.height_unit, "cm");
        assert_eq!(p.activity_level, "moderate");
        assert!(!p.lenient);

        let p: SaveRecipeParams = serde_json::from_str(r#"{"title": "Soup"}"#).unwrap();
        assert_eq!(p.servings, 1);
        assert_eq!(p.calories_per_serving, 0.0);
    }

    #[test]
    fn test_missing_user_is_json_error() {
        let result = service().get_user(Parameters(UserIdParams { user_id: 42 })).unwrap();
        let wire = serde_json::to_value(&result).unwrap();
        let text = wire["content"][0]["text"].as_str().unwrap();
        let value: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(value["error"], "User not found");
        assert_eq!(value["id"], 42);
    }
}
