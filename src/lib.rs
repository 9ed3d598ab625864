// BMI Tracker - Core Library
// Calculator, history store and statistics shared by the CLI and the TUI

pub mod calculator;
pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod stats;
pub mod store;
pub mod units;

// Re-export commonly used types
pub use calculator::{
    assess, calculate_bmi, gauge_percent, parse_measurement,
    Assessment, Band, Category, Measurement, Severity,
};
pub use config::{CliOverrides, Config, Settings};
pub use error::InputError;
pub use record::BmiRecord;
pub use stats::{trend_series, HistoryStats};
pub use store::{HistoryStore, LoadOutcome};
pub use units::{HeightUnit, WeightUnit};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
