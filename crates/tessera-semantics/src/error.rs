//! Error type for semantics construction

use crate::axis::Axis;
use thiserror::Error;

/// Errors raised while configuring a semantics value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticsError {
    #[error("tag {tag} is not a valid {axis} value")]
    InvalidTag { axis: Axis, tag: i32 },

    #[error("unknown {axis} value: {value}")]
    UnknownValue { axis: Axis, value: String },

    #[error("unknown semantics axis: {0}")]
    UnknownAxis(String),
}
