//! Core type definitions for Tessera

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Index of a backend server inside a connection pool.
///
/// Data and metadata servers are numbered by their position in the
/// configured server lists. The metadata backend used for store listings is
/// always [`BackendIndex::METADATA`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BackendIndex(u32);

impl BackendIndex {
    /// Reserved index of the metadata backend
    pub const METADATA: Self = Self(0);

    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Index as a slot position
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BackendIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage backend plugin selected in the configuration file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Discards data, keeps metadata in memory
    Null,
    /// Generic I/O backend
    Gio,
    /// POSIX filesystem backend
    #[default]
    Posix,
}

impl StorageBackend {
    /// All accepted backends, in the order shown to users
    pub const ALL: [Self; 3] = [Self::Null, Self::Gio, Self::Posix];

    /// Get the backend name as written in the configuration file
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Gio => "gio",
            Self::Posix => "posix",
        }
    }

    /// Whether this backend keeps anything across process restarts
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        !matches!(self, Self::Null)
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(Self::Null),
            "gio" => Ok(Self::Gio),
            "posix" => Ok(Self::Posix),
            _ => Err(format!("unknown storage backend: {s}")),
        }
    }
}
