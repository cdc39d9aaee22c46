//! Central type-descriptor registry.
//!
//! The registry is the process-wide, append-only store of every
//! [`TypeDescriptor`] the host has registered. It is created once at process
//! start, shared via `Arc` by all request-handling threads, and torn down only
//! at process exit. Entries are never evicted or invalidated.
//!
//! # Registry Architecture
//!
//! - **Handle-based lookup**: primary index, a lock-free skip list keyed by
//!   [`TypeHandle`]
//! - **Name-based lookup**: concurrent secondary index keyed by full name
//! - **Handle allocation**: atomic counter, user handles starting above the
//!   reserved primitive range
//!
//! # Thread Safety
//!
//! All operations are safe under arbitrary concurrent access without external
//! locking: lock-free primary storage (`SkipMap`), a concurrent hash map for
//! the name index (`DashMap`), and atomic handle generation.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::metadata::descriptor::{TypeDescriptor, TypeDescriptorRc, TypeKind};
use crate::metadata::handle::TypeHandle;
use crate::metadata::primitives::{PrimitiveKind, FIRST_USER_HANDLE};
use crate::{Error, Result};

/// Central registry for all type descriptors in the process.
///
/// # Examples
///
/// ```
/// use beanscope::metadata::registry::TypeRegistry;
/// use beanscope::metadata::primitives::PrimitiveKind;
///
/// let registry = TypeRegistry::new();
///
/// // Primitive descriptors are immediately available
/// let int32 = registry.get(PrimitiveKind::Int32.handle()).unwrap();
/// assert_eq!(int32.fullname(), "core.Int32");
/// ```
pub struct TypeRegistry {
    /// Primary descriptor storage indexed by handle
    types: SkipMap<TypeHandle, TypeDescriptorRc>,
    /// Secondary index: full name (`Namespace.Name`) to handle
    by_fullname: DashMap<String, TypeHandle>,
    /// Atomic counter for allocating user handles
    next_handle: AtomicU32,
}

impl TypeRegistry {
    /// Create a new registry with the primitive descriptors pre-registered.
    #[must_use]
    pub fn new() -> Self {
        let registry = TypeRegistry {
            types: SkipMap::new(),
            by_fullname: DashMap::new(),
            next_handle: AtomicU32::new(FIRST_USER_HANDLE),
        };

        for kind in PrimitiveKind::ALL {
            let descriptor = Arc::new(TypeDescriptor {
                handle: kind.handle(),
                namespace: kind.namespace().to_string(),
                name: kind.name().to_string(),
                kind: TypeKind::Plain,
                base: None,
                interfaces: Vec::new(),
                constructors: Vec::new(),
                properties: Vec::new(),
                statics: Vec::new(),
            });
            registry
                .by_fullname
                .insert(descriptor.fullname(), kind.handle());
            registry.types.insert(kind.handle(), descriptor);
        }

        registry
    }

    /// Allocate the next user handle.
    fn allocate_handle(&self) -> TypeHandle {
        TypeHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a descriptor built around a freshly allocated handle.
    ///
    /// The `build` closure receives the handle the descriptor will be stored
    /// under, so the descriptor can carry its own identity.
    ///
    /// # Errors
    /// Returns [`Error::TypeInsert`] if a type with the same full name is
    /// already registered; the registry is append-only and names are unique
    /// for the process lifetime.
    pub fn register_with(
        &self,
        build: impl FnOnce(TypeHandle) -> TypeDescriptor,
    ) -> Result<TypeHandle> {
        let handle = self.allocate_handle();
        let descriptor = Arc::new(build(handle));
        let fullname = descriptor.fullname();

        match self.by_fullname.entry(fullname.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(Error::TypeInsert(fullname)),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(handle);
                self.types.insert(handle, descriptor);
                Ok(handle)
            }
        }
    }

    /// Look up a descriptor by handle.
    #[must_use]
    pub fn get(&self, handle: TypeHandle) -> Option<TypeDescriptorRc> {
        self.types.get(&handle).map(|entry| entry.value().clone())
    }

    /// Look up a descriptor by handle, failing if it is not registered.
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for an unknown handle.
    pub fn require(&self, handle: TypeHandle) -> Result<TypeDescriptorRc> {
        self.get(handle).ok_or(Error::TypeNotFound(handle))
    }

    /// Look up a descriptor by its full name (`Namespace.Name`).
    #[must_use]
    pub fn get_by_fullname(&self, fullname: &str) -> Option<TypeDescriptorRc> {
        self.handle_by_fullname(fullname)
            .and_then(|handle| self.get(handle))
    }

    /// Look up a handle by full name.
    #[must_use]
    pub fn handle_by_fullname(&self, fullname: &str) -> Option<TypeHandle> {
        self.by_fullname.get(fullname).map(|entry| *entry.value())
    }

    /// Number of registered types, primitives included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if the registry holds no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The runtime "is-a" relation between registered types.
    ///
    /// Reflexive; walks the candidate's base chain and, transitively, its
    /// implemented interfaces. Unregistered handles are assignable to nothing
    /// but themselves.
    #[must_use]
    pub fn is_assignable(&self, candidate: TypeHandle, target: TypeHandle) -> bool {
        if candidate == target {
            return true;
        }
        let Some(descriptor) = self.get(candidate) else {
            return false;
        };
        if let Some(base) = descriptor.base {
            if self.is_assignable(base, target) {
                return true;
            }
        }
        descriptor
            .interfaces
            .iter()
            .any(|&interface| self.is_assignable(interface, target))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        TypeRegistry::new()
    }
}
