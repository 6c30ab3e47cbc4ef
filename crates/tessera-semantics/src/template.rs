//! Named presets of axis defaults

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// A named bundle of axis defaults
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Default = 0,
    Posix = 1,
    Checkpoint = 2,
}

impl Template {
    pub const ALL: [Self; 3] = [Self::Default, Self::Posix, Self::Checkpoint];

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Posix => "posix",
            Self::Checkpoint => "checkpoint",
        }
    }

    /// Match a template name case-sensitively.
    ///
    /// Only `posix` and `checkpoint` select a preset; every other string,
    /// including `default` and the empty string, selects [`Template::Default`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "posix" => Self::Posix,
            "checkpoint" => Self::Checkpoint,
            _ => Self::Default,
        }
    }

    /// Resolve a numeric template tag. Unknown tags fall back to the default
    /// template with a warning.
    #[must_use]
    pub fn from_tag(tag: i32) -> Self {
        match tag {
            0 => Self::Default,
            1 => Self::Posix,
            2 => Self::Checkpoint,
            _ => {
                warn!("Unknown semantics template tag {tag}, using default template");
                Self::Default
            }
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
