//! Native object and signal handler identities.

use std::fmt;

/// Identity of a native object created through a [`Toolkit`](crate::Toolkit).
///
/// Ids are allocated monotonically per toolkit and never reused, so a stale
/// id can be detected instead of aliasing a newer object. Allocation starts
/// at 1; the default id `#0` never names a live object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a connected signal handler, returned by `connect_*` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Wraps a raw id handed out by a handler registry.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}
