//! Property accessor resolution.
//!
//! Given a type and a property name, finds the matching accessor and caches
//! the outcome forever, absence included. A property matches by its
//! backing-field name if one exists, otherwise by its accessor name with the
//! conventional `get` prefix stripped and the first letter lower-cased. At
//! most one property may match a given name; zero or multiple matches resolve
//! as absent.

use std::sync::Arc;

use dashmap::DashMap;

use crate::metadata::descriptor::{BoxedValue, Instance, PropertyRc};
use crate::metadata::handle::TypeHandle;
use crate::metadata::registry::TypeRegistry;
use crate::{Error, Result};

/// Resolves `(type, property name)` pairs to accessors, consulting and
/// populating a process-lifetime cache.
pub struct PropertyAccessorResolver {
    registry: Arc<TypeRegistry>,
    /// Cached resolutions; `None` records a confirmed-absent accessor
    accessors: DashMap<(TypeHandle, String), Option<PropertyRc>>,
}

impl PropertyAccessorResolver {
    /// Create a resolver over the given registry.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        PropertyAccessorResolver {
            registry,
            accessors: DashMap::new(),
        }
    }

    /// Resolve the accessor for `name` on the type behind `handle`.
    ///
    /// The first resolution for a given key runs the matching scan; all
    /// callers observe the same result thereafter, including the cached
    /// absent outcome.
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if `handle` is not registered.
    pub fn resolve(&self, handle: TypeHandle, name: &str) -> Result<Option<PropertyRc>> {
        let key = (handle, name.to_string());
        if let Some(hit) = self.accessors.get(&key) {
            return Ok(hit.clone());
        }

        let descriptor = self.registry.require(handle)?;
        let mut matches = descriptor
            .properties
            .iter()
            .filter(|property| property.resolved_name().as_deref() == Some(name));

        // Exactly one property may claim a name; ambiguity resolves as absent.
        let resolved = match (matches.next(), matches.next()) {
            (Some(property), None) => Some(property.clone()),
            _ => None,
        };

        Ok(self.accessors.entry(key).or_insert(resolved).clone())
    }

    /// Resolve and invoke the accessor for `name` on `instance`.
    ///
    /// Returns `Ok(None)` when the property exists but its value is null.
    ///
    /// # Errors
    /// Returns [`Error::PropertyNotFound`] if no accessor resolves - a
    /// programmer/configuration error - and [`Error::TypeNotFound`] for an
    /// unregistered handle.
    pub fn property_value(
        &self,
        handle: TypeHandle,
        instance: &Instance,
        name: &str,
    ) -> Result<Option<BoxedValue>> {
        match self.resolve(handle, name)? {
            Some(property) => Ok((property.getter)(instance)),
            None => {
                let type_name = self
                    .registry
                    .get(handle)
                    .map_or_else(|| handle.to_string(), |d| d.fullname());
                Err(Error::PropertyNotFound {
                    property: name.to_string(),
                    type_name,
                })
            }
        }
    }

    /// Number of cached resolutions, absent outcomes included.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.accessors.len()
    }
}
