// 📏 Units - weight and height units and their conversion to metric

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const KG_PER_LB: f64 = 0.453592;
pub const CM_PER_INCH: f64 = 2.54;

// ============================================================================
// WEIGHT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    #[serde(alias = "lb")]
    Lbs,
}

impl WeightUnit {
    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lbs => value * KG_PER_LB,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            WeightUnit::Kg => WeightUnit::Lbs,
            WeightUnit::Lbs => WeightUnit::Kg,
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for WeightUnit {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilograms" => Ok(WeightUnit::Kg),
            "lb" | "lbs" | "pounds" => Ok(WeightUnit::Lbs),
            _ => Err(InputError::UnknownUnit {
                kind: "weight",
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// HEIGHT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    #[default]
    Cm,
    #[serde(alias = "in", alias = "inch")]
    Inches,
}

impl HeightUnit {
    pub fn to_cm(&self, value: f64) -> f64 {
        match self {
            HeightUnit::Cm => value,
            HeightUnit::Inches => value * CM_PER_INCH,
        }
    }

    pub fn to_meters(&self, value: f64) -> f64 {
        self.to_cm(value) / 100.0
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            HeightUnit::Cm => "cm",
            HeightUnit::Inches => "in",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            HeightUnit::Cm => HeightUnit::Inches,
            HeightUnit::Inches => HeightUnit::Cm,
        }
    }
}

impl fmt::Display for HeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for HeightUnit {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cm" | "centimeters" => Ok(HeightUnit::Cm),
            "in" | "inch" | "inches" => Ok(HeightUnit::Inches),
            _ => Err(InputError::UnknownUnit {
                kind: "height",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(WeightUnit::Kg.to_kg(70.0), 70.0);
        assert!((WeightUnit::Lbs.to_kg(100.0) - 45.3592).abs() < 1e-9);
        assert!((HeightUnit::Inches.to_cm(10.0) - 25.4).abs() < 1e-9);
        assert!((HeightUnit::Cm.to_meters(175.0) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_parse_units() {
        assert_eq!("KG".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
        assert_eq!(" lb ".parse::<WeightUnit>().unwrap(), WeightUnit::Lbs);
        assert_eq!("inches".parse::<HeightUnit>().unwrap(), HeightUnit::Inches);
        assert_eq!("in".parse::<HeightUnit>().unwrap(), HeightUnit::Inches);

        let err = "stone".parse::<WeightUnit>().unwrap_err();
        assert_eq!(err.field(), "weight");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&WeightUnit::Lbs).unwrap(), "\"lbs\"");
        assert_eq!(serde_json::to_string(&HeightUnit::Inches).unwrap(), "\"inches\"");
        let unit: HeightUnit = serde_json::from_str("\"inch\"").unwrap();
        assert_eq!(unit, HeightUnit::Inches);
    }

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(WeightUnit::Kg.toggle().toggle(), WeightUnit::Kg);
        assert_eq!(HeightUnit::Cm.toggle(), HeightUnit::Inches);
    }
}
