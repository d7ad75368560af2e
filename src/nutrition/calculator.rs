//! Health goal calculations
//!
//! BMI, BMR (revised Harris-Benedict), daily energy needs and water intake.
//!
//! The plain `calculate_*` functions keep the historical sentinel behavior:
//! inputs that cannot be computed yield `0` and unrecognized labels fall back
//! to a default branch. The `try_*` functions and `BodyMetrics::compute_goals`
//! report `CalcError` instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::units::{Height, Weight};

/// Calculation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Invalid {field}: {value} (must be greater than 0)")]
    InvalidInput { field: &'static str, value: f64 },

    #[error("Unrecognized {kind}: {label}")]
    UnknownLabel { kind: &'static str, label: String },
}

// ============================================================================
// Enumerations
// ============================================================================

/// Biological sex category, only used to pick the BMR coefficient set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Strict parse: only "male" and "female" (case-insensitive) are accepted
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => None,
        }
    }

    /// Legacy parse: anything not exactly "male" (ignoring case) is treated
    /// as female, including padded labels such as " male "
    pub fn from_label_lossy(s: &str) -> Self {
        if s.eq_ignore_ascii_case("male") {
            Sex::Male
        } else {
            Sex::Female
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

/// Typical physical activity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    /// Strict parse of the canonical labels
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" => Some(ActivityLevel::Light),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            "very_active" => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }

    /// Legacy parse: unrecognized labels fall back to `Moderate`
    pub fn from_label_lossy(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    /// Multiplier applied to BMR for total daily energy expenditure
    pub fn calorie_multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    /// Extra water on top of the weight-based baseline, in milliliters
    pub fn water_bonus_ml(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 0.0,
            ActivityLevel::Light => 200.0,
            ActivityLevel::Moderate => 400.0,
            ActivityLevel::Active => 600.0,
            ActivityLevel::VeryActive => 800.0,
        }
    }
}

/// Coarse weight classification derived from BMI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

// ============================================================================
// Formulas
// ============================================================================

/// Milliliters of water per kilogram of body weight
pub const WATER_ML_PER_KG: f64 = 35.0;

/// BMI as `weight / height²`, or an error if either input is not positive
pub fn try_calculate_bmi(weight_kg: f64, height_m: f64) -> Result<f64, CalcError> {
    if weight_kg.is_nan() || weight_kg <= 0.0 {
        return Err(CalcError::InvalidInput { field: "weight", value: weight_kg });
    }
    if height_m.is_nan() || height_m <= 0.0 {
        return Err(CalcError::InvalidInput { field: "height", value: height_m });
    }
    Ok(weight_kg / (height_m * height_m))
}

/// BMI, returning `0.0` when it cannot be computed
pub fn calculate_bmi(weight_kg: f64, height_m: f64) -> f64 {
    try_calculate_bmi(weight_kg, height_m).unwrap_or(0.0)
}

/// Classify a BMI value; each threshold belongs to the higher category
pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Basal metabolic rate in kcal/day (revised Harris-Benedict)
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age: u32, sex: Sex) -> f64 {
    let age = age as f64;
    match sex {
        Sex::Male => 88.362 + 13.397 * weight_kg + 4.799 * height_cm - 5.677 * age,
        Sex::Female => 447.593 + 9.247 * weight_kg + 3.098 * height_cm - 4.330 * age,
    }
}

/// Daily calorie needs in kcal, truncated toward zero
pub fn calculate_daily_calorie_needs(bmr: f64, activity: ActivityLevel) -> i32 {
    (bmr * activity.calorie_multiplier()) as i32
}

/// Recommended daily water intake in milliliters, truncated toward zero
pub fn calculate_water_intake(weight_kg: f64, activity: ActivityLevel) -> i32 {
    (weight_kg * WATER_ML_PER_KG + activity.water_bonus_ml()) as i32
}

// ============================================================================
// Body Metrics
// ============================================================================

/// Body measurements supplied for a single goal calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMetrics {
    pub weight: Weight,
    pub height: Height,
    pub age: u32,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
}

/// Goals derived from body metrics, always in kcal and milliliters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthGoals {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub bmr: f64,
    pub daily_calories_kcal: i32,
    pub water_intake_ml: i32,
}

impl BodyMetrics {
    /// Normalize to metric and run every formula
    pub fn compute_goals(&self) -> Result<HealthGoals, CalcError> {
        let weight_kg = self.weight.to_kg();
        let height_cm = self.height.to_cm();
        let bmi = try_calculate_bmi(weight_kg, self.height.to_meters())?;
        let bmr = calculate_bmr(weight_kg, height_cm, self.age, self.sex);

        Ok(HealthGoals {
            weight_kg,
            height_cm,
            bmi,
            bmi_category: bmi_category(bmi),
            bmr,
            daily_calories_kcal: calculate_daily_calorie_needs(bmr, self.activity_level),
            water_intake_ml: calculate_water_intake(weight_kg, self.activity_level),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_bmi_sentinel_on_invalid_input() {
        assert_eq!(calculate_bmi(0.0, 1.7), 0.0);
        assert_eq!(calculate_bmi(70.0, 0.0), 0.0);
        assert_eq!(calculate_bmi(-5.0, 1.7), 0.0);
        assert_eq!(calculate_bmi(f64::NAN, 1.7), 0.0);
    }

    #[test]
    fn test_try_bmi_reports_field() {
        assert_eq!(
            try_calculate_bmi(70.0, 0.0),
            Err(CalcError::InvalidInput { field: "height", value: 0.0 })
        );
        assert!(matches!(
            try_calculate_bmi(0.0, 1.75),
            Err(CalcError::InvalidInput { field: "weight", .. })
        ));
    }

    #[test]
    fn test_bmi_value() {
        assert!(approx(calculate_bmi(70.0, 1.75), 22.857, 0.001));
    }

    #[test]
    fn test_bmi_category_boundaries() {
        assert_eq!(bmi_category(18.49), BmiCategory::Underweight);
        assert_eq!(bmi_category(18.5), BmiCategory::Normal);
        assert_eq!(bmi_category(24.99), BmiCategory::Normal);
        assert_eq!(bmi_category(25.0), BmiCategory::Overweight);
        assert_eq!(bmi_category(29.99), BmiCategory::Overweight);
        assert_eq!(bmi_category(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_bmr_male() {
        // 88.362 + 937.79 + 839.825 - 170.31
        assert!(approx(calculate_bmr(70.0, 175.0, 30, Sex::Male), 1695.667, 0.001));
    }

    #[test]
    fn test_bmr_female() {
        // 447.593 + 554.82 + 511.17 - 108.25
        assert!(approx(calculate_bmr(60.0, 165.0, 25, Sex::Female), 1405.333, 0.001));
    }

    #[test]
    fn test_unknown_sex_label_uses_female_coefficients() {
        let female = calculate_bmr(70.0, 175.0, 30, Sex::Female);
        let unknown = calculate_bmr(70.0, 175.0, 30, Sex::from_label_lossy("unknown"));
        assert_eq!(unknown, female);
        assert_eq!(Sex::from_label_lossy("MALE"), Sex::Male);
        assert_eq!(Sex::from_str("unknown"), None);
    }

    #[test]
    fn test_lossy_sex_requires_exact_label() {
        assert_eq!(Sex::from_label_lossy("Male"), Sex::Male);
        assert_eq!(Sex::from_label_lossy(" male "), Sex::Female);
        assert_eq!(Sex::from_label_lossy("males"), Sex::Female);
        assert_eq!(Sex::from_label_lossy(""), Sex::Female);
    }

    #[test]
    fn test_daily_calories_truncate() {
        // 1695.667 * 1.55 = 2628.28
        let bmr = calculate_bmr(70.0, 175.0, 30, Sex::Male);
        assert_eq!(calculate_daily_calorie_needs(bmr, ActivityLevel::Moderate), 2628);
        // 1000.9 * 1.2 = 1201.08
        assert_eq!(calculate_daily_calorie_needs(1000.9, ActivityLevel::Sedentary), 1201);
        // 1999.0 * 1.9 = 3798.1
        assert_eq!(calculate_daily_calorie_needs(1999.0, ActivityLevel::VeryActive), 3798);
    }

    #[test]
    fn test_unknown_activity_matches_moderate() {
        let fallback = ActivityLevel::from_label_lossy("couch_athlete");
        assert_eq!(fallback, ActivityLevel::Moderate);
        assert_eq!(
            calculate_daily_calorie_needs(1500.0, fallback),
            calculate_daily_calorie_needs(1500.0, ActivityLevel::Moderate)
        );
        assert_eq!(
            calculate_water_intake(70.0, fallback),
            calculate_water_intake(70.0, ActivityLevel::Moderate)
        );
        assert_eq!(ActivityLevel::from_str("couch_athlete"), None);
    }

    #[test]
    fn test_water_intake() {
        assert_eq!(calculate_water_intake(70.0, ActivityLevel::Sedentary), 2450);
        assert_eq!(calculate_water_intake(70.0, ActivityLevel::Moderate), 2850);
        assert_eq!(calculate_water_intake(70.0, ActivityLevel::VeryActive), 3250);
        // 65.5 * 35 = 2292.5, +200
        assert_eq!(calculate_water_intake(65.5, ActivityLevel::Light), 2492);
    }

    #[test]
    fn test_activity_labels_round_trip() {
        for level in ActivityLevel::ALL {
            assert_eq!(ActivityLevel::from_str(level.as_str()), Some(level));
        }
    }

    #[test]
    fn test_compute_goals_imperial_matches_metric() {
        let imperial = BodyMetrics {
            weight: Weight::pounds(70.0 / 0.453592),
            height: Height::inches(175.0 / 2.54),
            age: 30,
            sex: Sex::Male,
            activity_level: ActivityLevel::Moderate,
        };
        let metric = BodyMetrics {
            weight: Weight::kilograms(70.0),
            height: Height::centimeters(175.0),
            ..imperial
        };

        let a = imperial.compute_goals().unwrap();
        let b = metric.compute_goals().unwrap();
        assert!(approx(a.weight_kg, 70.0, 1e-9));
        assert!(approx(a.height_cm, 175.0, 1e-9));
        assert!(approx(a.bmi, b.bmi, 1e-9));
        assert!(approx(a.bmr, b.bmr, 1e-9));
        assert_eq!(b.bmi_category, BmiCategory::Normal);
        assert_eq!(b.daily_calories_kcal, 2628);
        assert_eq!(b.water_intake_ml, 2850);
    }

    #[test]
    fn test_compute_goals_rejects_zero_height() {
        let metrics = BodyMetrics {
            weight: Weight::kilograms(70.0),
            height: Height::centimeters(0.0),
            age: 30,
            sex: Sex::Female,
            activity_level: ActivityLevel::Light,
        };
        assert!(matches!(
            metrics.compute_goals(),
            Err(CalcError::InvalidInput { field: "height", .. })
        ));
    }
}
