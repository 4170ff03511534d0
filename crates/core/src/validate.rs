// crates/core/src/validate.rs
//! Range checks for caller-supplied satisfaction input.

use crate::error::ValidationError;
use crate::satisfaction::Dimensions;
use crate::score::{LEVEL_MAX, LEVEL_MIN};

/// Checks user-submitted dimension sets and user ids.
///
/// Built once at startup and shared through application state.
#[derive(Debug, Clone)]
pub struct Validator {
    min: f64,
    max: f64,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            min: LEVEL_MIN,
            max: LEVEL_MAX,
        }
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every field must be finite and within [0, 100]. Reports the first offender.
    pub fn check_levels(&self, dims: &Dimensions) -> Result<(), ValidationError> {
        for (dimension, value) in dims.iter() {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite { dimension });
            }
            if value < self.min || value > self.max {
                return Err(ValidationError::OutOfRange {
                    dimension,
                    value,
                    min: self.min,
                    max: self.max,
                });
            }
        }
        Ok(())
    }

    pub fn check_user_id(&self, user_id: &str) -> Result<(), ValidationError> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        Ok(())
    }
}
