//! Semantics axes and their closed value domains
//!
//! Every axis value has a lowercase name (used by the textual grammar and by
//! serde) and a stable integer tag (used where semantics travel as numbers).

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six independent consistency dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Atomicity,
    Concurrency,
    Consistency,
    Persistency,
    Safety,
    Security,
}

impl Axis {
    /// All axes in canonical order
    pub const ALL: [Self; 6] = [
        Self::Atomicity,
        Self::Concurrency,
        Self::Consistency,
        Self::Persistency,
        Self::Safety,
        Self::Security,
    ];

    /// Lowercase axis name as used in `axis=value` tokens
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Atomicity => "atomicity",
            Self::Concurrency => "concurrency",
            Self::Consistency => "consistency",
            Self::Persistency => "persistency",
            Self::Safety => "safety",
            Self::Security => "security",
        }
    }

    /// Case-sensitive lookup by lowercase name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|axis| axis.name() == name)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Granularity at which a group of writes becomes visible all-or-nothing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Atomicity {
    None = 0,
    Operation = 1,
    Batch = 2,
}

impl Atomicity {
    pub const ALL: [Self; 3] = [Self::None, Self::Operation, Self::Batch];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Operation => "operation",
            Self::Batch => "batch",
        }
    }
}

/// Whether concurrent operations on the same target may interleave
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Concurrency {
    None = 0,
    NonOverlapping = 1,
    Overlapping = 2,
}

impl Concurrency {
    pub const ALL: [Self; 3] = [Self::None, Self::NonOverlapping, Self::Overlapping];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::NonOverlapping => "non-overlapping",
            Self::Overlapping => "overlapping",
        }
    }
}

/// Whether a reader sees a writer's effect immediately or after some delay
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Consistency {
    None = 0,
    Eventual = 1,
    Immediate = 2,
}

impl Consistency {
    pub const ALL: [Self; 3] = [Self::None, Self::Eventual, Self::Immediate];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Eventual => "eventual",
            Self::Immediate => "immediate",
        }
    }
}

/// Durability strength required before an operation is reported complete
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Persistency {
    None = 0,
    Eventual = 1,
    Immediate = 2,
}

impl Persistency {
    pub const ALL: [Self; 3] = [Self::None, Self::Eventual, Self::Immediate];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Eventual => "eventual",
            Self::Immediate => "immediate",
        }
    }

    /// Whether completion may be reported before the operation is committed
    #[must_use]
    pub const fn is_deferrable(&self) -> bool {
        !matches!(self, Self::Immediate)
    }
}

/// Failure domain against which durability is guaranteed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Safety {
    None = 0,
    Network = 1,
    Storage = 2,
}

impl Safety {
    pub const ALL: [Self; 3] = [Self::None, Self::Network, Self::Storage];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Network => "network",
            Self::Storage => "storage",
        }
    }
}

/// Whether access is access-controlled
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Security {
    None = 0,
    Strict = 1,
}

impl Security {
    pub const ALL: [Self; 2] = [Self::None, Self::Strict];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Strict => "strict",
        }
    }
}

/// A value on any one axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisValue {
    Atomicity(Atomicity),
    Concurrency(Concurrency),
    Consistency(Consistency),
    Persistency(Persistency),
    Safety(Safety),
    Security(Security),
}

impl AxisValue {
    /// Axis this value belongs to
    pub const fn axis(&self) -> Axis {
        match self {
            Self::Atomicity(_) => Axis::Atomicity,
            Self::Concurrency(_) => Axis::Concurrency,
            Self::Consistency(_) => Axis::Consistency,
            Self::Persistency(_) => Axis::Persistency,
            Self::Safety(_) => Axis::Safety,
            Self::Security(_) => Axis::Security,
        }
    }

    /// Lowercase value name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Atomicity(v) => v.name(),
            Self::Concurrency(v) => v.name(),
            Self::Consistency(v) => v.name(),
            Self::Persistency(v) => v.name(),
            Self::Safety(v) => v.name(),
            Self::Security(v) => v.name(),
        }
    }

    /// Integer tag of the value within its axis
    pub const fn tag(&self) -> i32 {
        match self {
            Self::Atomicity(v) => *v as i32,
            Self::Concurrency(v) => *v as i32,
            Self::Consistency(v) => *v as i32,
            Self::Persistency(v) => *v as i32,
            Self::Safety(v) => *v as i32,
            Self::Security(v) => *v as i32,
        }
    }

    /// Look up a value by axis and lowercase name (case-sensitive)
    #[must_use]
    pub fn from_name(axis: Axis, name: &str) -> Option<Self> {
        Self::domain(axis).into_iter().find(|v| v.name() == name)
    }

    /// Look up a value by axis and integer tag
    #[must_use]
    pub fn from_tag(axis: Axis, tag: i32) -> Option<Self> {
        Self::domain(axis).into_iter().find(|v| v.tag() == tag)
    }

    /// Every value accepted on `axis`
    #[must_use]
    pub fn domain(axis: Axis) -> Vec<Self> {
        match axis {
            Axis::Atomicity => Atomicity::ALL.into_iter().map(Self::from).collect(),
            Axis::Concurrency => Concurrency::ALL.into_iter().map(Self::from).collect(),
            Axis::Consistency => Consistency::ALL.into_iter().map(Self::from).collect(),
            Axis::Persistency => Persistency::ALL.into_iter().map(Self::from).collect(),
            Axis::Safety => Safety::ALL.into_iter().map(Self::from).collect(),
            Axis::Security => Security::ALL.into_iter().map(Self::from).collect(),
        }
    }
}

impl fmt::Display for AxisValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.axis(), self.name())
    }
}

impl From<Atomicity> for AxisValue {
    fn from(v: Atomicity) -> Self {
        Self::Atomicity(v)
    }
}

impl From<Concurrency> for AxisValue {
    fn from(v: Concurrency) -> Self {
        Self::Concurrency(v)
    }
}

impl From<Consistency> for AxisValue {
    fn from(v: Consistency) -> Self {
        Self::Consistency(v)
    }
}

impl From<Persistency> for AxisValue {
    fn from(v: Persistency) -> Self {
        Self::Persistency(v)
    }
}

impl From<Safety> for AxisValue {
    fn from(v: Safety) -> Self {
        Self::Safety(v)
    }
}

impl From<Security> for AxisValue {
    fn from(v: Security) -> Self {
        Self::Security(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_names_round_trip() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_name(axis.name()), Some(axis));
        }
        assert_eq!(Axis::from_name("Atomicity"), None);
        assert_eq!(Axis::from_name("durability"), None);
    }

    #[test]
    fn test_value_lookup_is_per_axis() {
        assert_eq!(
            AxisValue::from_name(Axis::Atomicity, "batch"),
            Some(AxisValue::Atomicity(Atomicity::Batch))
        );
        // "batch" is not a concurrency value
        assert_eq!(AxisValue::from_name(Axis::Concurrency, "batch"), None);
        assert_eq!(
            AxisValue::from_name(Axis::Concurrency, "non-overlapping"),
            Some(AxisValue::Concurrency(Concurrency::NonOverlapping))
        );
        assert_eq!(AxisValue::from_name(Axis::Security, "eventual"), None);
    }

    #[test]
    fn test_tags_are_stable() {
        assert_eq!(AxisValue::from(Atomicity::Batch).tag(), 2);
        assert_eq!(AxisValue::from(Security::Strict).tag(), 1);
        assert_eq!(
            AxisValue::from_tag(Axis::Safety, 1),
            Some(AxisValue::Safety(Safety::Network))
        );
        assert_eq!(AxisValue::from_tag(Axis::Security, 2), None);
        assert_eq!(AxisValue::from_tag(Axis::Atomicity, -1), None);
    }

    #[test]
    fn test_domain_sizes() {
        assert_eq!(AxisValue::domain(Axis::Security).len(), 2);
        for axis in Axis::ALL {
            assert!(AxisValue::domain(axis).iter().all(|v| v.axis() == axis));
        }
    }

    #[test]
    fn test_serde_uses_grammar_names() {
        let json = serde_json::to_string(&Concurrency::NonOverlapping).unwrap();
        assert_eq!(json, "\"non-overlapping\"");
        let parsed: Persistency = serde_json::from_str("\"immediate\"").unwrap();
        assert_eq!(parsed, Persistency::Immediate);
    }

    #[test]
    fn test_persistency_deferrable() {
        assert!(Persistency::None.is_deferrable());
        assert!(Persistency::Eventual.is_deferrable());
        assert!(!Persistency::Immediate.is_deferrable());
    }
}
