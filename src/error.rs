// ⚠️ Input Errors - what the user typed could not be used
// Everything else in the crate propagates anyhow::Error with context

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} {value} is outside the range that can be recorded")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("unknown {kind} unit {value:?}")]
    UnknownUnit { kind: &'static str, value: String },
}

impl InputError {
    /// Name of the offending form field ("weight", "height", ...)
    pub fn field(&self) -> &'static str {
        match self {
            InputError::NotANumber { field, .. }
            | InputError::NotPositive { field, .. }
            | InputError::NotFinite { field }
            | InputError::OutOfRange { field, .. } => field,
            InputError::UnknownUnit { kind, .. } => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = InputError::NotANumber {
            field: "weight",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "weight must be a number, got \"abc\"");
        assert_eq!(err.field(), "weight");

        let err = InputError::NotPositive { field: "height", value: -2.0 };
        assert_eq!(err.to_string(), "height must be greater than zero, got -2");
    }
}
