//! Opaque type handles used as cache keys throughout the crate.

use std::fmt;

/// An opaque identifier for a registered type.
///
/// Handles are the cache key for every map in this crate. They are allocated
/// by the [`crate::metadata::registry::TypeRegistry`] from an atomic counter:
/// values below [`crate::metadata::primitives::FIRST_USER_HANDLE`] are
/// reserved for primitive types, everything above is assigned to user
/// registrations in order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeHandle(pub u32);

impl TypeHandle {
    /// Creates a new handle from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        TypeHandle(value)
    }

    /// Returns the raw handle value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Returns true if this is a null handle (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for TypeHandle {
    fn from(value: u32) -> Self {
        TypeHandle(value)
    }
}

impl From<TypeHandle> for u32 {
    fn from(handle: TypeHandle) -> Self {
        handle.0
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle(0x{:08x})", self.0)
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
