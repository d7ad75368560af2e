//! Advisory range checks for user-entered values
//!
//! Callers use these to reject obviously wrong input before running the
//! formulas. The formulas themselves never enforce these ranges.

use std::ops::RangeInclusive;

use super::units::{convert_height_to_cm, convert_weight_to_kg, HeightUnit, WeightUnit};

pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 30.0..=300.0;
pub const HEIGHT_RANGE_CM: RangeInclusive<f64> = 100.0..=250.0;
pub const AGE_RANGE: RangeInclusive<u32> = 13..=120;
pub const CALORIE_GOAL_RANGE: RangeInclusive<i32> = 800..=5000;
pub const WATER_GOAL_RANGE_ML: RangeInclusive<i32> = 500..=5000;

/// Weight is plausible once converted to kilograms
pub fn is_valid_weight(value: f64, unit: WeightUnit) -> bool {
    WEIGHT_RANGE_KG.contains(&convert_weight_to_kg(value, unit))
}

/// Height is plausible once converted to centimeters
pub fn is_valid_height(value: f64, unit: HeightUnit) -> bool {
    HEIGHT_RANGE_CM.contains(&convert_height_to_cm(value, unit))
}

pub fn is_valid_age(age: u32) -> bool {
    AGE_RANGE.contains(&age)
}

pub fn is_valid_calorie_goal(kcal: i32) -> bool {
    CALORIE_GOAL_RANGE.contains(&kcal)
}

pub fn is_valid_water_goal(ml: i32) -> bool {
    WATER_GOAL_RANGE_ML.contains(&ml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_range_after_conversion() {
        assert!(is_valid_weight(30.0, WeightUnit::Kilograms));
        assert!(is_valid_weight(300.0, WeightUnit::Kilograms));
        assert!(!is_valid_weight(29.9, WeightUnit::Kilograms));
        // 60 lbs is ~27.2 kg
        assert!(!is_valid_weight(60.0, WeightUnit::Pounds));
        assert!(is_valid_weight(154.0, WeightUnit::Pounds));
        // 661 lbs is ~299.8 kg, 662 lbs is ~300.3 kg
        assert!(is_valid_weight(661.0, WeightUnit::Pounds));
        assert!(!is_valid_weight(662.0, WeightUnit::Pounds));
    }

    #[test]
    fn test_height_range_after_conversion() {
        assert!(is_valid_height(100.0, HeightUnit::Centimeters));
        assert!(is_valid_height(250.0, HeightUnit::Centimeters));
        assert!(!is_valid_height(251.0, HeightUnit::Centimeters));
        // 39 in is 99.06 cm
        assert!(!is_valid_height(39.0, HeightUnit::Inches));
        assert!(is_valid_height(70.0, HeightUnit::Inches));
    }

    #[test]
    fn test_age_and_goal_ranges() {
        assert!(!is_valid_age(12));
        assert!(is_valid_age(13));
        assert!(is_valid_age(120));
        assert!(!is_valid_age(121));

        assert!(is_valid_calorie_goal(800));
        assert!(!is_valid_calorie_goal(799));
        assert!(is_valid_calorie_goal(5000));
        assert!(!is_valid_calorie_goal(5001));

        assert!(is_valid_water_goal(500));
        assert!(!is_valid_water_goal(499));
        assert!(!is_valid_water_goal(5001));
    }

    #[test]
    fn test_nan_is_never_valid() {
        assert!(!is_valid_weight(f64::NAN, WeightUnit::Kilograms));
        assert!(!is_valid_height(f64::NAN, HeightUnit::Inches));
    }
}
