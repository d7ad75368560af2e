//! NutriPlan Tools module
//!
//! MCP tool implementations for the NutriPlan service.

pub mod calculator;
pub mod meal_plan;
pub mod recipes;
pub mod status;
pub mod users;
