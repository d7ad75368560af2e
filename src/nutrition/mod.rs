//! Nutrition calculation module
//!
//! Body metric conversions, goal formulas, validation and display helpers.

pub mod calculator;
pub mod format;
pub mod units;
pub mod validation;

pub use calculator::{
    bmi_category, calculate_bmi, calculate_bmr, calculate_daily_calorie_needs,
    calculate_water_intake, try_calculate_bmi, ActivityLevel, BmiCategory, BodyMetrics,
    CalcError, HealthGoals, Sex,
};
pub use format::{format_bmi, format_calories, format_height, format_water, format_weight};
pub use units::{
    convert_height_from_cm, convert_height_to_cm, convert_weight_from_kg, convert_weight_to_kg,
    Height, HeightUnit, UnitSystem, Weight, WeightUnit,
};
pub use validation::{
    is_valid_age, is_valid_calorie_goal, is_valid_height, is_valid_water_goal, is_valid_weight,
};
