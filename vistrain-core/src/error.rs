use thiserror::Error;

/// Rejected configuration values. Raised only when loading settings; trial
/// input and stimulus parameters are clamped instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("{field} range is empty: min {min} > max {max}")]
    EmptyRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl ConfigError {
    pub fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
        if value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::NotPositive { field })
        }
    }

    pub fn check_range(field: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
        if min <= max {
            Ok(())
        } else {
            Err(ConfigError::EmptyRange { field, min, max })
        }
    }

    pub fn check_within(
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), ConfigError> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            })
        }
    }
}
