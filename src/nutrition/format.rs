//! Display strings for calculated values

use super::calculator::bmi_category;
use super::units::{convert_height_from_cm, convert_weight_from_kg, HeightUnit, WeightUnit};

/// "BMI: 23.4 (Normal)"
pub fn format_bmi(bmi: f64) -> String {
    format!("BMI: {:.1} ({})", bmi, bmi_category(bmi).label())
}

/// Weight in the requested unit with one decimal, e.g. "70.0 kg" or "154.3 lbs"
pub fn format_weight(weight_kg: f64, unit: WeightUnit) -> String {
    format!("{:.1} {}", convert_weight_from_kg(weight_kg, unit), unit.symbol())
}

/// Height in the requested unit with one decimal, e.g. "175.0 cm" or "68.9 in"
pub fn format_height(height_cm: f64, unit: HeightUnit) -> String {
    format!("{:.1} {}", convert_height_from_cm(height_cm, unit), unit.symbol())
}

pub fn format_calories(kcal: i32) -> String {
    format!("{} kcal", kcal)
}

pub fn format_water(ml: i32) -> String {
    format!("{} ml", ml)
}
