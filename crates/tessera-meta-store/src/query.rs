//! Query parameters for namespace scans.

use serde_json::{Map, Value};

/// Equality filter over top-level document fields. An empty filter matches
/// every document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter(Map<String, Value>);

impl Filter {
    /// Filter matching every document
    #[must_use]
    pub fn all() -> Self {
        Self(Map::new())
    }

    /// Filter requiring `key == value`
    #[must_use]
    pub fn equals(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(key, value)
    }

    /// Add another required field
    #[must_use]
    pub fn and(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Cursor behaviour flags carried for protocol compatibility.
///
/// The embedded store accepts them but does not change its behaviour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CursorFlags(u32);

impl CursorFlags {
    pub const NONE: Self = Self(0);
    pub const TAILABLE: Self = Self(1 << 1);
    pub const NO_TIMEOUT: Self = Self(1 << 4);
    pub const PARTIAL: Self = Self(1 << 7);

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Parameters of a `find` call.
///
/// The default is a full scan: no filter, no projection, no skip, no limit,
/// no flags, in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindOptions {
    pub filter: Filter,
    /// Top-level fields to return (plus `_id`); `None` returns whole documents
    pub projection: Option<Vec<String>>,
    /// Matching documents to pass over before the first result
    pub skip: u64,
    /// Maximum number of results, `0` meaning unlimited
    pub limit: u64,
    pub flags: CursorFlags,
}

impl FindOptions {
    /// Unfiltered, unsorted, unlimited scan
    #[must_use]
    pub fn scan() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_projection(mut self, fields: &[&str]) -> Self {
        self.projection = Some(fields.iter().map(|f| (*f).to_string()).collect());
        self
    }

    #[must_use]
    pub const fn with_skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub const fn with_flags(mut self, flags: CursorFlags) -> Self {
        self.flags = flags;
        self
    }
}
