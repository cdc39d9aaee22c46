//! Type metadata: handles, descriptors, registry and the reflection caches.
//!
//! This module is the structural heart of the engine. Hosts register a
//! [`descriptor::TypeDescriptor`] per type through the
//! [`builder::TypeDescriptorBuilder`]; the [`registry::TypeRegistry`] stores
//! them for the process lifetime; the [`cache::ReflectionCache`] memoizes the
//! per-type facts the materializer consumes (singleton/companion instances,
//! constructor metadata, property name lists), and the
//! [`accessor::PropertyAccessorResolver`] answers property lookups by name.
//!
//! # Key Components
//!
//! - [`handle::TypeHandle`]: opaque identifier for a registered type, the
//!   cache key everywhere
//! - [`descriptor::TypeDescriptor`]: complete structural facts about one type
//! - [`registry::TypeRegistry`]: process-wide, append-only descriptor store
//! - [`cache::ReflectionCache`]: compute-once, cache-forever structural facts
//! - [`primitives::PrimitiveKind`]: reserved scalar types with fixed handles

pub mod accessor;
pub mod builder;
pub mod cache;
pub mod descriptor;
pub mod handle;
pub mod primitives;
pub mod registry;
