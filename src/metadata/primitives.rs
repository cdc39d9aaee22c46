//! Reserved descriptors for primitive scalar types.
//!
//! Constructor parameters ultimately bottom out in scalar values that the
//! external deserializer coerces from raw strings. So that deserializer
//! implementations have stable targets to dispatch on, the registry
//! pre-registers one descriptor per primitive kind with a fixed, well-known
//! handle. User registrations start above the reserved range.

use crate::metadata::handle::TypeHandle;

/// First handle value available for user-registered types.
///
/// Everything below this value is reserved for primitives.
pub const FIRST_USER_HANDLE: u32 = 0x20;

/// The primitive scalar kinds known to the registry.
///
/// Each kind maps to a fixed [`TypeHandle`] that is identical in every
/// process, so deserializers can match on handles without a registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// The unit type, carrying no value
    Unit,
    /// Boolean
    Bool,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// Owned UTF-8 string
    String,
}

impl PrimitiveKind {
    /// All primitive kinds, in registration order.
    pub const ALL: [PrimitiveKind; 7] = [
        PrimitiveKind::Unit,
        PrimitiveKind::Bool,
        PrimitiveKind::Int32,
        PrimitiveKind::Int64,
        PrimitiveKind::Float32,
        PrimitiveKind::Float64,
        PrimitiveKind::String,
    ];

    /// The fixed handle reserved for this primitive kind.
    #[must_use]
    pub fn handle(&self) -> TypeHandle {
        match self {
            PrimitiveKind::Unit => TypeHandle::new(0x01),
            PrimitiveKind::Bool => TypeHandle::new(0x02),
            PrimitiveKind::Int32 => TypeHandle::new(0x03),
            PrimitiveKind::Int64 => TypeHandle::new(0x04),
            PrimitiveKind::Float32 => TypeHandle::new(0x05),
            PrimitiveKind::Float64 => TypeHandle::new(0x06),
            PrimitiveKind::String => TypeHandle::new(0x07),
        }
    }

    /// The simple name under which the primitive is registered.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Unit => "Unit",
            PrimitiveKind::Bool => "Bool",
            PrimitiveKind::Int32 => "Int32",
            PrimitiveKind::Int64 => "Int64",
            PrimitiveKind::Float32 => "Float32",
            PrimitiveKind::Float64 => "Float64",
            PrimitiveKind::String => "String",
        }
    }

    /// The namespace under which all primitives are registered.
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        "core"
    }
}
