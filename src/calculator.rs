// 🧮 BMI Calculator - unit conversion, BMI formula and category breakpoints
// Pure functions only; nothing here touches the filesystem

use crate::error::InputError;
use crate::units::{HeightUnit, WeightUnit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper end of the gauge scale shown in the UI
pub const GAUGE_MAX_BMI: f64 = 50.0;

/// Decimals kept for weight and height in history
pub const MEASUREMENT_DECIMALS: i32 = 1;

/// Decimals kept for BMI in history
pub const BMI_DECIMALS: i32 = 2;

// ============================================================================
// MEASUREMENT
// ============================================================================

/// Weight and height exactly as the user entered them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub height: f64,
    pub height_unit: HeightUnit,
}

impl Measurement {
    /// Build a measurement, rejecting non-finite and non-positive values and
    /// anything that would not survive rounding into a history record
    pub fn new(
        weight: f64,
        weight_unit: WeightUnit,
        height: f64,
        height_unit: HeightUnit,
    ) -> Result<Self, InputError> {
        Measurement {
            weight: ensure_positive("weight", weight)?,
            weight_unit,
            height: ensure_positive("height", height)?,
            height_unit,
        }
        .ensure_recordable()
    }

    /// Parse raw form text for both fields
    pub fn parse(
        weight: &str,
        weight_unit: WeightUnit,
        height: &str,
        height_unit: HeightUnit,
    ) -> Result<Self, InputError> {
        Measurement {
            weight: parse_measurement("weight", weight)?,
            weight_unit,
            height: parse_measurement("height", height)?,
            height_unit,
        }
        .ensure_recordable()
    }

    pub fn weight_kg(&self) -> f64 {
        self.weight_unit.to_kg(self.weight)
    }

    pub fn height_m(&self) -> f64 {
        self.height_unit.to_meters(self.height)
    }

    pub fn bmi(&self) -> f64 {
        let height_m = self.height_m();
        self.weight_kg() / (height_m * height_m)
    }

    /// Every stored value must stay finite and above zero once rounded,
    /// otherwise the history file would hold a record it cannot load back
    fn ensure_recordable(self) -> Result<Self, InputError> {
        ensure_in_range("weight", self.weight, MEASUREMENT_DECIMALS)?;
        ensure_in_range("height", self.height, MEASUREMENT_DECIMALS)?;
        ensure_in_range("bmi", self.bmi(), BMI_DECIMALS)?;
        Ok(self)
    }
}

/// Parse one numeric form field
pub fn parse_measurement(field: &'static str, text: &str) -> Result<f64, InputError> {
    let trimmed = text.trim();
    let value: f64 = trimmed.parse().map_err(|_| InputError::NotANumber {
        field,
        value: trimmed.to_string(),
    })?;
    ensure_positive(field, value)
}

fn ensure_positive(field: &'static str, value: f64) -> Result<f64, InputError> {
    if !value.is_finite() {
        return Err(InputError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(InputError::NotPositive { field, value });
    }
    Ok(value)
}

fn ensure_in_range(field: &'static str, value: f64, decimals: i32) -> Result<(), InputError> {
    let rounded = round_to(value, decimals);
    if rounded.is_finite() && rounded > 0.0 {
        Ok(())
    } else {
        Err(InputError::OutOfRange { field, value })
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// BMI = weight(kg) / height(m)²
pub fn calculate_bmi(
    weight: f64,
    weight_unit: WeightUnit,
    height: f64,
    height_unit: HeightUnit,
) -> Result<f64, InputError> {
    Ok(Measurement::new(weight, weight_unit, height, height_unit)?.bmi())
}

/// Share of the gauge filled for this BMI, 0-100
pub fn gauge_percent(bmi: f64) -> u16 {
    if !bmi.is_finite() || bmi <= 0.0 {
        return 0;
    }
    ((bmi / GAUGE_MAX_BMI) * 100.0).min(100.0) as u16
}

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Severe Underweight")]
    SevereUnderweight,
    #[serde(rename = "Underweight")]
    Underweight,
    #[serde(rename = "Normal", alias = "Normal Weight")]
    Normal,
    #[serde(rename = "Overweight")]
    Overweight,
    #[serde(rename = "Obese Class I")]
    ObeseClassI,
    #[serde(rename = "Obese Class II")]
    ObeseClassII,
}

/// The four broad bands the categories fall into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Healthy,
    Caution,
    Warning,
    Critical,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::SevereUnderweight,
        Category::Underweight,
        Category::Normal,
        Category::Overweight,
        Category::ObeseClassI,
        Category::ObeseClassII,
    ];

    /// Classify a BMI value. Lower bounds are inclusive: 18.5 is Normal, 25.0 is Overweight.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 16.0 {
            Category::SevereUnderweight
        } else if bmi < 18.5 {
            Category::Underweight
        } else if bmi < 25.0 {
            Category::Normal
        } else if bmi < 30.0 {
            Category::Overweight
        } else if bmi < 35.0 {
            Category::ObeseClassI
        } else {
            Category::ObeseClassII
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::SevereUnderweight => "Severe Underweight",
            Category::Underweight => "Underweight",
            Category::Normal => "Normal",
            Category::Overweight => "Overweight",
            Category::ObeseClassI => "Obese Class I",
            Category::ObeseClassII => "Obese Class II",
        }
    }

    pub fn band(&self) -> Band {
        match self {
            Category::SevereUnderweight | Category::Underweight => Band::Underweight,
            Category::Normal => Band::Normal,
            Category::Overweight => Band::Overweight,
            Category::ObeseClassI | Category::ObeseClassII => Band::Obese,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Category::Normal => Severity::Healthy,
            Category::Underweight | Category::Overweight => Severity::Caution,
            Category::ObeseClassI => Severity::Warning,
            Category::SevereUnderweight | Category::ObeseClassII => Severity::Critical,
        }
    }

    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            Category::SevereUnderweight => &[
                "Urgent medical attention required",
                "Consult with healthcare provider immediately",
                "Work with a registered dietitian",
                "Regular health monitoring needed",
            ],
            Category::Underweight => &[
                "Increase caloric intake with nutrient-rich foods",
                "Consider consulting a nutritionist",
                "Add strength training exercises",
                "Monitor your progress regularly",
                "Focus on protein-rich foods",
            ],
            Category::Normal => &[
                "Maintain a balanced diet",
                "Regular exercise (150 minutes/week)",
                "Stay hydrated",
                "Get adequate sleep (7-9 hours)",
                "Regular health check-ups",
            ],
            Category::Overweight => &[
                "Monitor portion sizes",
                "Increase physical activity",
                "Reduce processed food intake",
                "Consider keeping a food diary",
                "Aim for gradual weight loss",
            ],
            Category::ObeseClassI => &[
                "Consult a healthcare provider",
                "Create a sustainable exercise routine",
                "Focus on whole foods",
                "Set realistic weight loss goals",
                "Consider working with a fitness trainer",
            ],
            Category::ObeseClassII => &[
                "Immediate medical consultation required",
                "Supervised weight loss program recommended",
                "Regular health monitoring",
                "Consider professional support",
                "Focus on sustainable lifestyle changes",
            ],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Band {
    pub fn label(&self) -> &'static str {
        match self {
            Band::Underweight => "Underweight",
            Band::Normal => "Normal",
            Band::Overweight => "Overweight",
            Band::Obese => "Obese",
        }
    }
}

// ============================================================================
// ASSESSMENT
// ============================================================================

/// BMI plus its category, as shown to the user after a calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub bmi: f64,
    pub category: Category,
}

impl Assessment {
    pub fn of(measurement: &Measurement) -> Self {
        let bmi = measurement.bmi();
        Assessment {
            bmi,
            category: Category::from_bmi(bmi),
        }
    }
}

/// Validate, convert, compute and classify in one step
pub fn assess(
    weight: f64,
    weight_unit: WeightUnit,
    height: f64,
    height_unit: HeightUnit,
) -> Result<Assessment, InputError> {
    let measurement = Measurement::new(weight, weight_unit, height, height_unit)?;
    Ok(Assessment::of(&measurement))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{CM_PER_INCH, KG_PER_LB};

    #[test]
    fn test_reference_value() {
        let result = assess(70.0, WeightUnit::Kg, 175.0, HeightUnit::Cm).unwrap();
        assert!((result.bmi - 22.857).abs() < 0.001);
        assert_eq!(format!("{:.2}", result.bmi), "22.86");
        assert_eq!(result.category, Category::Normal);
        assert_eq!(result.category.band(), Band::Normal);
    }

    #[test]
    fn test_imperial_matches_metric() {
        let metric = calculate_bmi(70.0, WeightUnit::Kg, 175.0, HeightUnit::Cm).unwrap();
        let imperial = calculate_bmi(
            70.0 / KG_PER_LB,
            WeightUnit::Lbs,
            175.0 / CM_PER_INCH,
            HeightUnit::Inches,
        )
        .unwrap();
        assert!((metric - imperial).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_in_weight_and_height() {
        let mut previous = 0.0;
        for weight in [40.0, 55.5, 70.0, 90.0, 130.0] {
            let bmi = calculate_bmi(weight, WeightUnit::Kg, 170.0, HeightUnit::Cm).unwrap();
            assert!(bmi > previous);
            previous = bmi;
        }

        let mut previous = f64::MAX;
        for height in [140.0, 155.0, 170.0, 185.0, 210.0] {
            let bmi = calculate_bmi(70.0, WeightUnit::Kg, height, HeightUnit::Cm).unwrap();
            assert!(bmi < previous);
            previous = bmi;
        }
    }

    #[test]
    fn test_category_boundaries() {
        assert_eq!(Category::from_bmi(15.99), Category::SevereUnderweight);
        assert_eq!(Category::from_bmi(16.0), Category::Underweight);
        assert_eq!(Category::from_bmi(18.49), Category::Underweight);
        assert_eq!(Category::from_bmi(18.5), Category::Normal);
        assert_eq!(Category::from_bmi(24.99), Category::Normal);
        assert_eq!(Category::from_bmi(25.0), Category::Overweight);
        assert_eq!(Category::from_bmi(29.99), Category::Overweight);
        assert_eq!(Category::from_bmi(30.0), Category::ObeseClassI);
        assert_eq!(Category::from_bmi(34.99), Category::ObeseClassI);
        assert_eq!(Category::from_bmi(35.0), Category::ObeseClassII);
    }

    #[test]
    fn test_bands_cover_broad_thresholds() {
        assert_eq!(Category::from_bmi(17.0).band(), Band::Underweight);
        assert_eq!(Category::from_bmi(27.0).band(), Band::Overweight);
        assert_eq!(Category::from_bmi(31.0).band(), Band::Obese);
        assert_eq!(Category::from_bmi(42.0).band(), Band::Obese);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            parse_measurement("weight", "seventy"),
            Err(InputError::NotANumber { field: "weight", .. })
        ));
        assert!(matches!(
            parse_measurement("height", "0"),
            Err(InputError::NotPositive { field: "height", .. })
        ));
        assert!(matches!(
            parse_measurement("height", "-170"),
            Err(InputError::NotPositive { .. })
        ));
        assert!(matches!(
            parse_measurement("weight", "inf"),
            Err(InputError::NotFinite { .. })
        ));
        assert!(matches!(
            parse_measurement("weight", "NaN"),
            Err(InputError::NotFinite { .. })
        ));
        assert_eq!(parse_measurement("weight", " 70.5 ").unwrap(), 70.5);
    }

    #[test]
    fn test_rejects_values_lost_to_rounding() {
        // BMI rounds to 0.00
        assert!(matches!(
            Measurement::new(0.1, WeightUnit::Kg, 500.0, HeightUnit::Cm),
            Err(InputError::OutOfRange { field: "bmi", .. })
        ));
        // weight rounds to 0.0
        assert!(matches!(
            Measurement::new(0.01, WeightUnit::Kg, 500.0, HeightUnit::Cm),
            Err(InputError::OutOfRange { field: "weight", .. })
        ));
        assert!(matches!(
            Measurement::new(0.04, WeightUnit::Kg, 1.0, HeightUnit::Cm),
            Err(InputError::OutOfRange { field: "weight", .. })
        ));
        // height rounds to 0.0
        assert!(matches!(
            Measurement::new(1e300, WeightUnit::Kg, 1e-300, HeightUnit::Cm),
            Err(InputError::OutOfRange { field: "height", .. })
        ));
        // BMI overflows to infinity
        assert!(matches!(
            Measurement::parse("1e307", WeightUnit::Kg, "0.1", HeightUnit::Cm),
            Err(InputError::OutOfRange { field: "bmi", .. })
        ));
        assert!(Measurement::new(0.1, WeightUnit::Kg, 100.0, HeightUnit::Cm).is_ok());
    }

    #[test]
    fn test_gauge_percent() {
        assert_eq!(gauge_percent(25.0), 50);
        assert_eq!(gauge_percent(60.0), 100);
        assert_eq!(gauge_percent(f64::NAN), 0);
    }

    #[test]
    fn test_every_category_has_recommendations() {
        for category in Category::ALL {
            assert!(!category.recommendations().is_empty());
        }
    }

    #[test]
    fn test_legacy_label_alias() {
        let category: Category = serde_json::from_str("\"Normal Weight\"").unwrap();
        assert_eq!(category, Category::Normal);
        assert_eq!(serde_json::to_string(&Category::ObeseClassI).unwrap(), "\"Obese Class I\"");
    }
}
