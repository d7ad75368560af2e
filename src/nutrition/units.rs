//! Body measurement units and conversions
//!
//! Weight and height arrive tagged with the unit the user entered them in.
//! Everything downstream of this module works in kilograms and centimeters.

use serde::{Deserialize, Serialize};

// ============================================================================
// Conversion Constants
// ============================================================================

/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.453592;
/// Meters per inch
pub const M_PER_INCH: f64 = 0.0254;
/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;
/// Centimeters per meter
pub const CM_PER_M: f64 = 100.0;

// ============================================================================
// Unit Types
// ============================================================================

/// Measurement system a user prefers for display and input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Parse from string ("metric"/"imperial", plus common shorthands)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "si" => Some(UnitSystem::Metric),
            "imperial" | "us" => Some(UnitSystem::Imperial),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    /// Weight unit used by this system
    pub fn weight_unit(&self) -> WeightUnit {
        match self {
            UnitSystem::Metric => WeightUnit::Kilograms,
            UnitSystem::Imperial => WeightUnit::Pounds,
        }
    }

    /// Height unit used by this system
    pub fn height_unit(&self) -> HeightUnit {
        match self {
            UnitSystem::Metric => HeightUnit::Centimeters,
            UnitSystem::Imperial => HeightUnit::Inches,
        }
    }
}

/// Unit a weight value is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kilograms,
    Pounds,
}

impl WeightUnit {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Some(WeightUnit::Kilograms),
            "lb" | "lbs" | "pound" | "pounds" => Some(WeightUnit::Pounds),
            _ => None,
        }
    }

    /// Short display suffix
    pub fn symbol(&self) -> &'static str {
        match self {
            WeightUnit::Kilograms => "kg",
            WeightUnit::Pounds => "lbs",
        }
    }
}

/// Unit a height value is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    Centimeters,
    Inches,
}

impl HeightUnit {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" => Some(HeightUnit::Centimeters),
            "in" | "inch" | "inches" => Some(HeightUnit::Inches),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            HeightUnit::Centimeters => "cm",
            HeightUnit::Inches => "in",
        }
    }
}

/// A weight tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: f64,
    pub unit: WeightUnit,
}

impl Weight {
    pub fn kilograms(value: f64) -> Self {
        Self { value, unit: WeightUnit::Kilograms }
    }

    pub fn pounds(value: f64) -> Self {
        Self { value, unit: WeightUnit::Pounds }
    }

    pub fn to_kg(&self) -> f64 {
        convert_weight_to_kg(self.value, self.unit)
    }
}

/// A height tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Height {
    pub value: f64,
    pub unit: HeightUnit,
}

impl Height {
    pub fn centimeters(value: f64) -> Self {
        Self { value, unit: HeightUnit::Centimeters }
    }

    pub fn inches(value: f64) -> Self {
        Self { value, unit: HeightUnit::Inches }
    }

    pub fn to_cm(&self) -> f64 {
        convert_height_to_cm(self.value, self.unit)
    }

    pub fn to_meters(&self) -> f64 {
        match self.unit {
            HeightUnit::Centimeters => cm_to_meters(self.value),
            HeightUnit::Inches => inches_to_meters(self.value),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

pub fn lbs_to_kg(lbs: f64) -> f64 {
    lbs * KG_PER_LB
}

pub fn kg_to_lbs(kg: f64) -> f64 {
    kg / KG_PER_LB
}

pub fn inches_to_meters(inches: f64) -> f64 {
    inches * M_PER_INCH
}

pub fn cm_to_meters(cm: f64) -> f64 {
    cm / CM_PER_M
}

pub fn inches_to_cm(inches: f64) -> f64 {
    inches * CM_PER_INCH
}

pub fn cm_to_inches(cm: f64) -> f64 {
    cm / CM_PER_INCH
}

/// Convert a weight in `from` units to kilograms
pub fn convert_weight_to_kg(value: f64, from: WeightUnit) -> f64 {
    match from {
        WeightUnit::Kilograms => value,
        WeightUnit::Pounds => lbs_to_kg(value),
    }
}

/// Convert kilograms to a weight in `to` units
pub fn convert_weight_from_kg(kg: f64, to: WeightUnit) -> f64 {
    match to {
        WeightUnit::Kilograms => kg,
        WeightUnit::Pounds => kg_to_lbs(kg),
    }
}

/// Convert a height in `from` units to centimeters
pub fn convert_height_to_cm(value: f64, from: HeightUnit) -> f64 {
    match from {
        HeightUnit::Centimeters => value,
        HeightUnit::Inches => inches_to_cm(value),
    }
}

/// Convert centimeters to a height in `to` units
pub fn convert_height_from_cm(cm: f64, to: HeightUnit) -> f64 {
    match to {
        HeightUnit::Centimeters => cm,
        HeightUnit::Inches => cm_to_inches(cm),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pound_kilogram_round_trip() {
        for x in [30.0, 70.0, 154.3, 299.9] {
            let kg = convert_weight_to_kg(x, WeightUnit::Pounds);
            let back = convert_weight_from_kg(kg, WeightUnit::Pounds);
            assert!((back - x).abs() < 1e-9, "{} round-tripped to {}", x, back);
        }
    }

    #[test]
    fn test_pounds_to_kg() {
        assert!((lbs_to_kg(100.0) - 45.3592).abs() < 1e-9);
        assert!((kg_to_lbs(45.3592) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_height_conversions() {
        assert!((inches_to_meters(70.0) - 1.778).abs() < 1e-9);
        assert!((cm_to_meters(175.0) - 1.75).abs() < 1e-12);
        assert!((inches_to_cm(70.0) - 177.8).abs() < 1e-9);
        assert!((convert_height_from_cm(177.8, HeightUnit::Inches) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_metric_is_identity() {
        assert_eq!(convert_weight_to_kg(70.0, WeightUnit::Kilograms), 70.0);
        assert_eq!(convert_height_to_cm(175.0, HeightUnit::Centimeters), 175.0);
    }

    #[test]
    fn test_tagged_values() {
        assert!((Weight::pounds(220.0).to_kg() - 99.79024).abs() < 1e-6);
        assert!((Height::inches(70.0).to_meters() - 1.778).abs() < 1e-9);
        assert!((Height::centimeters(175.0).to_meters() - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(UnitSystem::from_str("Imperial"), Some(UnitSystem::Imperial));
        assert_eq!(UnitSystem::from_str("metric"), Some(UnitSystem::Metric));
        assert_eq!(UnitSystem::from_str("cubits"), None);
        assert_eq!(WeightUnit::from_str("lbs"), Some(WeightUnit::Pounds));
        assert_eq!(HeightUnit::from_str("cm"), Some(HeightUnit::Centimeters));
        assert_eq!(HeightUnit::from_str("ft"), None);
        assert_eq!(UnitSystem::Imperial.weight_unit(), WeightUnit::Pounds);
        assert_eq!(UnitSystem::Metric.height_unit(), HeightUnit::Centimeters);
    }
}
