//! NutriPlan Library
//!
//! Nutrition goal calculations and weekly meal planning, exposed over MCP.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
