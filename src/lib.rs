// Copyright 2026 beanscope contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # beanscope
//!
//! A runtime type-introspection and dynamic object-materialization engine.
//! Given a target type and a flat mapping of string-keyed parameter values -
//! as arrive from an HTTP request, a config file, or an RPC payload -
//! `beanscope` locates the type's single designated constructor, coerces each
//! raw string into the correctly-typed argument through an external
//! deserializer collaborator, and produces an instance, without the caller
//! writing any per-type marshalling code. A companion subsystem discovers
//! candidate types at startup by scanning code units (on-disk directories of
//! compiled type files and bundled archives) under a namespace prefix, so a
//! plugin/route/handler registry can be built without static registration
//! lists.
//!
//! ## Architecture
//!
//! There is no runtime reflection facility to lean on, so the engine is built
//! around an explicit type-descriptor registry:
//!
//! - [`metadata`] - type handles, descriptors, the process-wide
//!   [`metadata::registry::TypeRegistry`], the fluent
//!   [`metadata::builder::TypeDescriptorBuilder`], and the memoized
//!   [`metadata::cache::ReflectionCache`]
//! - [`materialize`] - the [`materialize::Materializer`] building instances
//!   from parameter maps, delegating scalar coercion to a
//!   [`materialize::ValueDeserializer`]
//! - [`scanner`] - namespace scans over directory and archive code units,
//!   memoized per `(loader, prefix)` in a [`scanner::ScanCache`]
//! - [`assignable`] - narrowing discovered types to a target capability
//!
//! ## Quick Start
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use beanscope::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! struct Scalars;
//! impl ValueDeserializer for Scalars {
//!     fn deserialize(
//!         &self,
//!         raw: &str,
//!         target: TypeHandle,
//!     ) -> std::result::Result<BoxedValue, Box<dyn std::error::Error + Send + Sync>> {
//!         if target == PrimitiveKind::Int32.handle() {
//!             Ok(Box::new(raw.parse::<i32>()?))
//!         } else {
//!             Ok(Box::new(raw.to_string()))
//!         }
//!     }
//! }
//!
//! // Register types once at startup.
//! let registry = Arc::new(TypeRegistry::new());
//! let int32 = PrimitiveKind::Int32.handle();
//! let point = TypeDescriptorBuilder::new(&registry, "demo.geometry", "Point")
//!     .constructor(
//!         vec![
//!             ParamDescriptor::required("x", int32),
//!             ParamDescriptor::required("y", int32),
//!         ],
//!         |mut args| Ok(Arc::new(Point { x: args.take(0)?, y: args.take(1)? }) as Instance),
//!     )
//!     .field_property("x", int32, |p: &Point| p.x)
//!     .field_property("y", int32, |p: &Point| p.y)
//!     .register()?;
//!
//! // Materialize per request.
//! let materializer = Materializer::new(
//!     Arc::new(ReflectionCache::new(registry)),
//!     Arc::new(Scalars),
//! );
//! let params: HashMap<String, String> = [("x", "3"), ("y", "4")]
//!     .iter()
//!     .map(|(k, v)| (k.to_string(), v.to_string()))
//!     .collect();
//! let instance = materializer.build_instance(point, &params)?;
//! assert_eq!(*instance.downcast_ref::<Point>().unwrap(), Point { x: 3, y: 4 });
//! # Ok::<(), beanscope::Error>(())
//! ```
//!
//! ## Concurrency
//!
//! The engine is a passive library invoked from many independently-scheduled
//! worker threads. Every cache is compute-once, cache-forever and safe under
//! arbitrary concurrent access without external locking: when two threads
//! race to resolve the same previously-uncached key, both may compute the
//! value, but the cache settles on a single agreed value for all subsequent
//! readers. Caches are append-only for the process lifetime and torn down
//! only at process exit.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result), raised synchronously
//! to the immediate caller; nothing is retried internally. Scan-time load
//! failures for individual candidate names are swallowed, counted and
//! recorded rather than propagated, since a namespace scan may legitimately
//! enumerate non-type resources.

pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```
/// use beanscope::prelude::*;
///
/// let registry = std::sync::Arc::new(TypeRegistry::new());
/// assert!(!registry.is_empty());
/// ```
pub mod prelude;

/// Narrowing discovered types to a target capability.
///
/// See [`assignable::filter_assignable`].
pub mod assignable;

/// Bean materialization from string-keyed parameter maps.
///
/// See [`materialize::Materializer`] and the [`materialize::ValueDeserializer`]
/// collaborator trait.
pub mod materialize;

/// Type metadata: handles, descriptors, registry and the reflection caches.
///
/// See [`metadata::registry::TypeRegistry`], [`metadata::builder::TypeDescriptorBuilder`]
/// and [`metadata::cache::ReflectionCache`].
pub mod metadata;

/// Namespace scanning over directory and archive code units.
///
/// See [`scanner::ScanCache`] and the [`scanner::loader::CodeLoader`] seam.
pub mod scanner;

/// `beanscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`]. Used consistently throughout the crate for all fallible
/// operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `beanscope` Error type
///
/// The main error type for all operations in this crate. See the variant
/// documentation for the materialization, introspection and scanning failure
/// modes.
pub use error::Error;
