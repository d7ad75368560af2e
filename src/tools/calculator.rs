//! Calculator Tools
//!
//! Stateless tools wrapping the nutrition formulas. Labels are parsed strictly
//! unless `lenient` is set, in which case unknown sex labels mean female and
//! unknown activity levels mean moderate.

use serde::Serialize;

use crate::nutrition::{
    self, bmi_category, calculate_bmi, calculate_bmr, calculate_daily_calorie_needs,
    calculate_water_intake, format_bmi, format_calories, format_height, format_water,
    format_weight, ActivityLevel, BmiCategory, BodyMetrics, CalcError, HealthGoals, Height,
    HeightUnit, Sex, Weight, WeightUnit,
};

/// Response for calculate_health_goals
#[derive(Debug, Serialize)]
pub struct HealthGoalsResponse {
    pub goals: HealthGoals,
    pub display: GoalsDisplay,
    /// Advisory range problems with the input; the goals are still computed
    pub warnings: Vec<String>,
}

/// Preformatted strings for the computed goals
#[derive(Debug, Serialize)]
pub struct GoalsDisplay {
    pub bmi: String,
    pub weight: String,
    pub height: String,
    pub daily_calories: String,
    pub water_intake: String,
}

/// Response for calculate_bmi
#[derive(Debug, Serialize)]
pub struct BmiResponse {
    /// 0 when weight or height is not positive
    pub bmi: f64,
    pub category: Option<BmiCategory>,
    pub display: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BmrResponse {
    pub bmr: f64,
    pub sex: Sex,
}

#[derive(Debug, Serialize)]
pub struct DailyCaloriesResponse {
    pub daily_calories_kcal: i32,
    pub activity_level: ActivityLevel,
    pub display: String,
}

#[derive(Debug, Serialize)]
pub struct WaterIntakeResponse {
    pub water_intake_ml: i32,
    pub activity_level: ActivityLevel,
    pub display: String,
}

#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    pub value: f64,
    pub from_unit: String,
    pub converted: f64,
    pub to_unit: String,
}

/// Response for validate_body_metrics
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub weight_valid: Option<bool>,
    pub height_valid: Option<bool>,
    pub age_valid: Option<bool>,
    pub calorie_goal_valid: Option<bool>,
    pub water_goal_valid: Option<bool>,
}

// ============================================================================
// Label Parsing
// ============================================================================

pub fn parse_sex(label: &str, lenient: bool) -> Result<Sex, String> {
    if lenient {
        return Ok(Sex::from_label_lossy(label));
    }
    Sex::from_str(label).ok_or_else(|| {
        CalcError::UnknownLabel { kind: "sex", label: label.to_string() }.to_string()
    })
}

pub fn parse_activity_level(label: &str, lenient: bool) -> Result<ActivityLevel, String> {
    if lenient {
        return Ok(ActivityLevel::from_label_lossy(label));
    }
    ActivityLevel::from_str(label).ok_or_else(|| {
        CalcError::UnknownLabel { kind: "activity level", label: label.to_string() }.to_string()
    })
}

pub fn parse_weight_unit(label: &str) -> Result<WeightUnit, String> {
    WeightUnit::from_str(label).ok_or_else(|| {
        CalcError::UnknownLabel { kind: "weight unit", label: label.to_string() }.to_string()
    })
}

pub fn parse_height_unit(label: &str) -> Result<HeightUnit, String> {
    HeightUnit::from_str(label).ok_or_else(|| {
        CalcError::UnknownLabel { kind: "height unit", label: label.to_string() }.to_string()
    })
}

// ============================================================================
// Tools
// ============================================================================

/// Compute every goal from unit-tagged body metrics
#[allow(clippy::too_many_arguments)]
pub fn calculate_health_goals(
    weight: f64,
    weight_unit: &str,
    height: f64,
    height_unit: &str,
    age: u32,
    sex: &str,
    activity_level: &str,
    lenient: bool,
) -> Result<HealthGoalsResponse, String> {
    let weight_unit = parse_weight_unit(weight_unit)?;
    let height_unit = parse_height_unit(height_unit)?;

    let metrics = BodyMetrics {
        weight: Weight { value: weight, unit: weight_unit },
        height: Height { value: height, unit: height_unit },
        age,
        sex: parse_sex(sex, lenient)?,
        activity_level: parse_activity_level(activity_level, lenient)?,
    };

    let goals = metrics.compute_goals().map_err(|e| e.to_string())?;

    let mut warnings = Vec::new();
    if !nutrition::is_valid_weight(weight, weight_unit) {
        warnings.push(format!("Weight {} is outside the 30-300 kg range", format_weight(goals.weight_kg, weight_unit)));
    }
    if !nutrition::is_valid_height(height, height_unit) {
        warnings.push(format!("Height {} is outside the 100-250 cm range", format_height(goals.height_cm, height_unit)));
    }
    if !nutrition::is_valid_age(age) {
        warnings.push(format!("Age {} is outside the 13-120 range", age));
    }

    let display = GoalsDisplay {
        bmi: format_bmi(goals.bmi),
        weight: format_weight(goals.weight_kg, weight_unit),
        height: format_height(goals.height_cm, height_unit),
        daily_calories: format_calories(goals.daily_calories_kcal),
        water_intake: format_water(goals.water_intake_ml),
    };

    Ok(HealthGoalsResponse { goals, display, warnings })
}

/// BMI from metric inputs, 0 when not computable
pub fn bmi(weight_kg: f64, height_m: f64) -> BmiResponse {
    let bmi = calculate_bmi(weight_kg, height_m);
    if bmi == 0.0 {
        return BmiResponse { bmi, category: None, display: None };
    }
    BmiResponse {
        bmi,
        category: Some(bmi_category(bmi)),
        display: Some(format_bmi(bmi)),
    }
}

pub fn bmr(weight_kg: f64, height_cm: f64, age: u32, sex: &str, lenient: bool) -> Result<BmrResponse, String> {
    let sex = parse_sex(sex, lenient)?;
    Ok(BmrResponse {
        bmr: calculate_bmr(weight_kg, height_cm, age, sex),
        sex,
    })
}

pub fn daily_calories(bmr: f64, activity_level: &str, lenient: bool) -> Result<DailyCaloriesResponse, String> {
    let activity_level = parse_activity_level(activity_level, lenient)?;
    let kcal = calculate_daily_calorie_needs(bmr, activity_level);
    Ok(DailyCaloriesResponse {
        daily_calories_kcal: kcal,
        activity_level,
        display: format_calories(kcal),
    })
}

pub fn water_intake(weight_kg: f64, activity_level: &str, lenient: bool) -> Result<WaterIntakeResponse, String> {
    let activity_level = parse_activity_level(activity_level, lenient)?;
    let ml = calculate_water_intake(weight_kg, activity_level);
    Ok(WaterIntakeResponse {
        water_intake_ml: ml,
        activity_level,
        display: format_water(ml),
    })
}

pub fn convert_weight(value: f64, from_unit: &str, to_unit: &str) -> Result<ConversionResponse, String> {
    let from = parse_weight_unit(from_unit)?;
    let to = parse_weight_unit(to_unit)?;
    let kg = nutrition::convert_weight_to_kg(value, from);
    Ok(ConversionResponse {
        value,
        from_unit: from.symbol().to_string(),
        converted: nutrition::convert_weight_from_kg(kg, to),
        to_unit: to.symbol().to_string(),
    })
}

pub fn convert_height(value: f64, from_unit: &str, to_unit: &str) -> Result<ConversionResponse, String> {
    let from = parse_height_unit(from_unit)?;
    let to = parse_height_unit(to_unit)?;
    let cm = nutrition::convert_height_to_cm(value, from);
    Ok(ConversionResponse {
        value,
        from_unit: from.symbol().to_string(),
        converted: nutrition::convert_height_from_cm(cm, to),
        to_unit: to.symbol().to_string(),
    })
}

/// Check whichever values were supplied against the advisory ranges
pub fn validate_body_metrics(
    weight: Option<(f64, &str)>,
    height: Option<(f64, &str)>,
    age: Option<u32>,
    calorie_goal_kcal: Option<i32>,
    water_goal_ml: Option<i32>,
) -> Result<ValidationResponse, String> {
    let weight_valid = match weight {
        Some((value, unit)) => Some(nutrition::is_valid_weight(value, parse_weight_unit(unit)?)),
        None => None,
    };
    let height_valid = match height {
        Some((value, unit)) => Some(nutrition::is_valid_height(value, parse_height_unit(unit)?)),
        None => None,
    };
    let age_valid = age.map(nutrition::is_valid_age);
    let calorie_goal_valid = calorie_goal_kcal.map(nutrition::is_valid_calorie_goal);
    let water_goal_valid = water_goal_ml.map(nutrition::is_valid_water_goal);

    let valid = [weight_valid, height_valid, age_valid, calorie_goal_valid, water_goal_valid]
        .iter()
        .all(|v| v.unwrap_or(true));

    Ok(ValidationResponse {
        valid,
        weight_valid,
        height_valid,
        age_valid,
        calorie_goal_valid,
        water_goal_valid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_goals_with_imperial_input() {
        let result = calculate_health_goals(154.0, "lbs", 69.0, "in", 30, "male", "moderate", false).unwrap();
        assert!(result.warnings.is_empty());
        assert_eq!(result.goals.bmi_category, BmiCategory::Normal);
        assert_eq!(result.display.weight, "154.0 lbs");
        assert!(result.display.daily_calories.ends_with(" kcal"));
    }

    #[test]
    fn test_health_goals_strict_rejects_unknown_labels() {
        let err = calculate_health_goals(70.0, "kg", 175.0, "cm", 30, "unknown", "moderate", false).unwrap_err();
        assert!(err.contains("sex"));
        let err = calculate_health_goals(70.0, "kg", 175.0, "cm", 30, "male", "extreme", false).unwrap_err();
        assert!(err.contains("activity level"));
    }

    #[test]
    fn test_health_goals_lenient_falls_back() {
        let lenient = calculate_health_goals(70.0, "kg", 175.0, "cm", 30, "unknown", "extreme", true).unwrap();
        let explicit = calculate_health_goals(70.0, "kg", 175.0, "cm", 30, "female", "moderate", false).unwrap();
        assert_eq!(lenient.goals, explicit.goals);
    }

    #[test]
    fn test_health_goals_warns_but_computes() {
        let result = calculate_health_goals(25.0, "kg", 175.0, "cm", 10, "female", "light", false).unwrap();
        assert_eq!(result.warnings.len(), 2);
        assert!(result.goals.bmr > 0.0);
    }

    #[test]
    fn test_health_goals_zero_height_is_error() {
        assert!(calculate_health_goals(70.0, "kg", 0.0, "cm", 30, "male", "light", false).is_err());
    }

    #[test]
    fn test_bmi_tool_sentinel() {
        let invalid = bmi(70.0, 0.0);
        assert_eq!(invalid.bmi, 0.0);
        assert!(invalid.category.is_none());

        let valid = bmi(70.0, 1.75);
        assert_eq!(valid.category, Some(BmiCategory::Normal));
        assert_eq!(valid.display.as_deref(), Some("BMI: 22.9 (Normal)"));
    }

    #[test]
    fn test_conversions() {
        let w = convert_weight(100.0, "lbs", "kg").unwrap();
        assert!((w.converted - 45.3592).abs() < 1e-9);
        let h = convert_height(70.0, "in", "cm").unwrap();
        assert!((h.converted - 177.8).abs() < 1e-9);
        assert!(convert_weight(1.0, "stone", "kg").is_err());
    }

    #[test]
    fn test_validation() {
        let ok = validate_body_metrics(Some((70.0, "kg")), Some((175.0, "cm")), Some(30), Some(2000), None).unwrap();
        assert!(ok.valid);
        assert_eq!(ok.water_goal_valid, None);

        let bad = validate_body_metrics(None, None, Some(30), Some(6000), Some(2000)).unwrap();
        assert!(!bad.valid);
        assert_eq!(bad.calorie_goal_valid, Some(false));
        assert_eq!(bad.water_goal_valid, Some(true));
    }

    #[test]
    fn test_daily_calories_and_water_tools() {
        let kcal = daily_calories(2000.0, "sedentary", false).unwrap();
        assert_eq!(kcal.daily_calories_kcal, 2400);
        assert_eq!(kcal.display, "2400 kcal");

        let water = water_intake(70.0, "very_active", false).unwrap();
        assert_eq!(water.water_intake_ml, 3250);

        let fallback = water_intake(70.0, "???", true).unwrap();
        assert_eq!(fallback.activity_level, ActivityLevel::Moderate);

        let b = bmr(70.0, 175.0, 30, "Male", false).unwrap();
        assert_eq!(b.sex, Sex::Male);
    }
}
