//! Semantics value and its builder
//!
//! A [`SemanticsBuilder`] is the only way to change an axis. Calling
//! [`SemanticsBuilder::build`] consumes the builder, so a [`Semantics`] that
//! has been handed out (typically as `Arc<Semantics>`) is immutable for the
//! rest of its life.

use crate::axis::{
    Atomicity, Axis, AxisValue, Concurrency, Consistency, Persistency, Safety, Security,
};
use crate::error::SemanticsError;
use crate::template::Template;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Immutable consistency semantics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Semantics {
    atomicity: Atomicity,
    concurrency: Concurrency,
    consistency: Consistency,
    persistency: Persistency,
    safety: Safety,
    security: Security,
}

impl Semantics {
    /// Semantics with the defaults of `template`
    #[must_use]
    pub const fn new(template: Template) -> Self {
        match template {
            Template::Default => Self {
                atomicity: Atomicity::None,
                concurrency: Concurrency::Overlapping,
                consistency: Consistency::Immediate,
                persistency: Persistency::Eventual,
                safety: Safety::None,
                security: Security::Strict,
            },
            Template::Posix => Self {
                atomicity: Atomicity::Operation,
                concurrency: Concurrency::Overlapping,
                consistency: Consistency::Immediate,
                persistency: Persistency::Eventual,
                safety: Safety::None,
                security: Security::Strict,
            },
            Template::Checkpoint => Self {
                atomicity: Atomicity::None,
                concurrency: Concurrency::NonOverlapping,
                consistency: Consistency::Eventual,
                persistency: Persistency::Eventual,
                safety: Safety::None,
                security: Security::None,
            },
        }
    }

    /// Start configuring semantics from `template`
    #[must_use]
    pub const fn builder(template: Template) -> SemanticsBuilder {
        SemanticsBuilder {
            values: Self::new(template),
        }
    }

    /// Start a new builder seeded with these values. The receiver is not
    /// affected by anything done to the builder.
    #[must_use]
    pub const fn to_builder(&self) -> SemanticsBuilder {
        SemanticsBuilder { values: *self }
    }

    /// Current value of `axis`
    #[must_use]
    pub const fn get(&self, axis: Axis) -> AxisValue {
        match axis {
            Axis::Atomicity => AxisValue::Atomicity(self.atomicity),
            Axis::Concurrency => AxisValue::Concurrency(self.concurrency),
            Axis::Consistency => AxisValue::Consistency(self.consistency),
            Axis::Persistency => AxisValue::Persistency(self.persistency),
            Axis::Safety => AxisValue::Safety(self.safety),
            Axis::Security => AxisValue::Security(self.security),
        }
    }

    /// Integer tag of the current value of `axis`
    #[must_use]
    pub const fn get_tag(&self, axis: Axis) -> i32 {
        self.get(axis).tag()
    }

    pub const fn atomicity(&self) -> Atomicity {
        self.atomicity
    }

    pub const fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    pub const fn consistency(&self) -> Consistency {
        self.consistency
    }

    pub const fn persistency(&self) -> Persistency {
        self.persistency
    }

    pub const fn safety(&self) -> Safety {
        self.safety
    }

    pub const fn security(&self) -> Security {
        self.security
    }

    /// All six axis values in canonical order
    #[must_use]
    pub fn values(&self) -> [AxisValue; 6] {
        Axis::ALL.map(|axis| self.get(axis))
    }
}

impl Default for Semantics {
    fn default() -> Self {
        Self::new(Template::Default)
    }
}

/// Renders the canonical `axis=value` list accepted by [`crate::parse`]
impl fmt::Display for Semantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values().iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// Mutable configuration phase of a [`Semantics`] value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SemanticsBuilder {
    values: Semantics,
}

impl SemanticsBuilder {
    /// Builder seeded with the defaults of `template`
    #[must_use]
    pub const fn new(template: Template) -> Self {
        Semantics::builder(template)
    }

    /// Set one axis
    pub fn set(&mut self, value: impl Into<AxisValue>) -> &mut Self {
        let v = &mut self.values;
        match value.into() {
            AxisValue::Atomicity(x) => v.atomicity = x,
            AxisValue::Concurrency(x) => v.concurrency = x,
            AxisValue::Consistency(x) => v.consistency = x,
            AxisValue::Persistency(x) => v.persistency = x,
            AxisValue::Safety(x) => v.safety = x,
            AxisValue::Security(x) => v.security = x,
        }
        self
    }

    /// Set one axis by its integer tag
    pub fn set_tag(&mut self, axis: Axis, tag: i32) -> Result<&mut Self, SemanticsError> {
        let value =
            AxisValue::from_tag(axis, tag).ok_or(SemanticsError::InvalidTag { axis, tag })?;
        Ok(self.set(value))
    }

    /// Set one axis by its lowercase names
    pub fn set_named(&mut self, axis: &str, value: &str) -> Result<&mut Self, SemanticsError> {
        let axis =
            Axis::from_name(axis).ok_or_else(|| SemanticsError::UnknownAxis(axis.to_string()))?;
        let value = AxisValue::from_name(axis, value).ok_or_else(|| {
            SemanticsError::UnknownValue {
                axis,
                value: value.to_string(),
            }
        })?;
        Ok(self.set(value))
    }

    /// Chaining form of [`SemanticsBuilder::set`]
    #[must_use]
    pub fn with(mut self, value: impl Into<AxisValue>) -> Self {
        self.set(value);
        self
    }

    /// Value currently configured for `axis`
    #[must_use]
    pub const fn get(&self, axis: Axis) -> AxisValue {
        self.values.get(axis)
    }

    /// Finish configuration
    #[must_use]
    pub fn build(self) -> Semantics {
        self.values
    }

    /// Finish configuration and wrap the value for sharing
    #[must_use]
    pub fn share(self) -> Arc<Semantics> {
        Arc::new(self.build())
    }
}

impl Default for SemanticsBuilder {
    fn default() -> Self {
        Self::new(Template::Default)
    }
}
