// 📝 BMI Record - one immutable history entry
// BMI and category are always derived; there is no way to set them directly

use crate::calculator::{round_to, Category, Measurement, BMI_DECIMALS, MEASUREMENT_DECIMALS};
use crate::units::{HeightUnit, WeightUnit};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Timestamp format used by history files written by the old desktop app
pub const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format used when showing timestamps in tables
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredRecord")]
pub struct BmiRecord {
    #[serde(serialize_with = "timestamp::serialize")]
    timestamp: DateTime<Local>,
    weight: f64,
    weight_unit: WeightUnit,
    height: f64,
    height_unit: HeightUnit,
    bmi: f64,
    category: Category,
}

impl BmiRecord {
    /// Compute a record for `measurement` taken at `timestamp`.
    /// Weight/height keep one decimal, BMI two; the category follows the stored BMI.
    pub fn new(measurement: &Measurement, timestamp: DateTime<Local>) -> Self {
        let bmi = round_to(measurement.bmi(), BMI_DECIMALS);
        BmiRecord {
            timestamp,
            weight: round_to(measurement.weight, MEASUREMENT_DECIMALS),
            weight_unit: measurement.weight_unit,
            height: round_to(measurement.height, MEASUREMENT_DECIMALS),
            height_unit: measurement.height_unit,
            bmi,
            category: Category::from_bmi(bmi),
        }
    }

    pub fn now(measurement: &Measurement) -> Self {
        Self::new(measurement, Local::now())
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn weight_unit(&self) -> WeightUnit {
        self.weight_unit
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn height_unit(&self) -> HeightUnit {
        self.height_unit
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn display_timestamp(&self) -> String {
        self.timestamp.format(DISPLAY_TIMESTAMP_FORMAT).to_string()
    }

    pub fn display_weight(&self) -> String {
        format!("{:.1} {}", self.weight, self.weight_unit)
    }

    pub fn display_height(&self) -> String {
        format!("{:.1} {}", self.height, self.height_unit)
    }
}

// ============================================================================
// PERSISTED SHAPE
// ============================================================================

/// What is accepted from disk. Units default to metric and `date` is read as
/// `timestamp`, so files from the old desktop app still load.
#[derive(Debug, Deserialize)]
struct StoredRecord {
    #[serde(alias = "date", deserialize_with = "timestamp::deserialize")]
    timestamp: DateTime<Local>,
    weight: f64,
    #[serde(default)]
    weight_unit: WeightUnit,
    height: f64,
    #[serde(default)]
    height_unit: HeightUnit,
    bmi: f64,
}

impl TryFrom<StoredRecord> for BmiRecord {
    type Error = String;

    fn try_from(stored: StoredRecord) -> Result<Self, Self::Error> {
        if !stored.bmi.is_finite() || stored.bmi <= 0.0 {
            return Err(format!("invalid bmi {}", stored.bmi));
        }

        Ok(BmiRecord {
            timestamp: stored.timestamp,
            weight: stored.weight,
            weight_unit: stored.weight_unit,
            height: stored.height,
            height_unit: stored.height_unit,
            bmi: stored.bmi,
            category: Category::from_bmi(stored.bmi),
        })
    }
}

mod timestamp {
    use super::LEGACY_TIMESTAMP_FORMAT;
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Local>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("unrecognised timestamp {:?}", raw)))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Local>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Local));
        }
        let naive = NaiveDateTime::parse_from_str(raw, LEGACY_TIMESTAMP_FORMAT).ok()?;
        Local.from_local_datetime(&naive).earliest()
    }
}

// ============================================================================
// TESTS
// ============================================================================
