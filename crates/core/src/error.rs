// crates/core/src/error.rs
use thiserror::Error;

use crate::satisfaction::Dimension;

/// Errors raised while checking caller-supplied satisfaction input.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{dimension} must be between {min} and {max}, got {value}")]
    OutOfRange {
        dimension: Dimension,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{dimension} must be a finite number")]
    NotFinite { dimension: Dimension },

    #[error("unknown event kind: {0}")]
    UnknownEventKind(String),

    #[error("user id must not be empty")]
    EmptyUserId,
}

impl ValidationError {
    /// The offending field, when the error concerns a single dimension.
    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            Self::OutOfRange { dimension, .. } | Self::NotFinite { dimension } => Some(*dimension),
            _ => None,
        }
    }
}
