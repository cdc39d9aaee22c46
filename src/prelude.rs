//! # beanscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! and traits from the beanscope library. Import this module to get quick
//! access to the essential types for type registration, materialization and
//! namespace scanning.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all beanscope operations
pub use crate::Error;

/// The result type used throughout beanscope
pub use crate::Result;

// ================================================================================================
// Type Metadata
// ================================================================================================

/// Opaque identifier for a registered type
pub use crate::metadata::handle::TypeHandle;

/// Reserved primitive scalar kinds with fixed handles
pub use crate::metadata::primitives::PrimitiveKind;

/// Structural descriptors and type-erased value aliases
pub use crate::metadata::descriptor::{
    ArgList, BoxedValue, ConstructorDescriptor, Instance, MemberFlags, ParamDescriptor,
    PropertyDescriptor, StaticMemberDescriptor, TypeDescriptor, TypeKind,
};

/// Process-wide descriptor registry
pub use crate::metadata::registry::TypeRegistry;

/// Fluent registration builder
pub use crate::metadata::builder::TypeDescriptorBuilder;

/// Memoized per-type structural facts
pub use crate::metadata::cache::{ConstructorMetadata, ReflectionCache};

/// Property accessor resolution
pub use crate::metadata::accessor::PropertyAccessorResolver;

// ================================================================================================
// Materialization
// ================================================================================================

/// Instance construction from string-keyed parameter maps
pub use crate::materialize::{Materializer, ValueDeserializer};

// ================================================================================================
// Scanning and Filtering
// ================================================================================================

/// Namespace scanning over code units
pub use crate::scanner::{scan_for_types, ScanCache, SkipLog};

/// The loader seam and its search-path implementation
pub use crate::scanner::loader::{CodeLoader, ResourceLocation, SearchPathLoader};

/// Narrowing discovered types to a capability
pub use crate::assignable::filter_assignable;
