//! Process-wide memoized store of per-type structural facts.
//!
//! Every lookup here is compute-once, cache-forever: the first caller for a
//! given key runs the underlying resolution against the descriptor registry;
//! all callers, concurrent or not, observe the same result thereafter. The
//! maps are append-only for the process lifetime and are torn down only at
//! process exit.
//!
//! Absence is a valid, cacheable outcome. The singleton and companion maps
//! store `Option<Instance>` values, so a map miss means "not yet checked",
//! `Some(None)` means "confirmed absent", and `Some(Some(v))` means "found" -
//! repeated negative lookups never rerun the scan.
//!
//! # Thread Safety
//!
//! All maps are `DashMap`s; when two threads race to resolve the same
//! previously-uncached key, both may compute the value, but the entry API
//! settles the cache on a single agreed value for all subsequent readers.

use std::sync::Arc;

use dashmap::DashMap;

use crate::metadata::accessor::PropertyAccessorResolver;
use crate::metadata::descriptor::{
    BoxedValue, ConstructorRc, Instance, MemberFlags, ParamDescriptor, PropertyRc, TypeDescriptor,
};
use crate::metadata::handle::TypeHandle;
use crate::metadata::registry::TypeRegistry;
use crate::{Error, Result};

/// Reference to a cached [`ConstructorMetadata`]
pub type ConstructorMetadataRc = Arc<ConstructorMetadata>;

/// Immutable facts about a type's single designated public constructor.
#[derive(Debug)]
pub struct ConstructorMetadata {
    /// The constructor itself, including its invocation closure
    pub constructor: ConstructorRc,
    /// Declared parameter types, in order
    pub param_types: Vec<TypeHandle>,
    /// Full parameter descriptors, in order
    pub params: Vec<ParamDescriptor>,
}

/// Memoized per-type structural facts: singleton/companion instances,
/// constructor metadata, primary property names and property accessors.
pub struct ReflectionCache {
    registry: Arc<TypeRegistry>,
    /// Singleton instances; `None` records confirmed absence
    singletons: DashMap<TypeHandle, Option<Instance>>,
    /// Companion instances; `None` records confirmed absence
    companions: DashMap<TypeHandle, Option<Instance>>,
    /// Constructor metadata for materializable types
    constructors: DashMap<TypeHandle, ConstructorMetadataRc>,
    /// Primary property name lists
    primary_properties: DashMap<TypeHandle, Arc<Vec<String>>>,
    /// Property accessor resolution
    accessors: PropertyAccessorResolver,
}

impl ReflectionCache {
    /// Create a cache over the given registry.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        ReflectionCache {
            accessors: PropertyAccessorResolver::new(Arc::clone(&registry)),
            registry,
            singletons: DashMap::new(),
            companions: DashMap::new(),
            constructors: DashMap::new(),
            primary_properties: DashMap::new(),
        }
    }

    /// The registry this cache resolves against.
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// The type's singleton instance, if it has one.
    ///
    /// Resolution scans the type's public static members for one whose
    /// declared type is a module-kind type (and not a companion); the first
    /// such member's value is the singleton. Resolved once, cached forever.
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if `handle` is not registered.
    pub fn singleton(&self, handle: TypeHandle) -> Result<Option<Instance>> {
        if let Some(hit) = self.singletons.get(&handle) {
            return Ok(hit.clone());
        }
        let descriptor = self.registry.require(handle)?;
        let resolved = self.resolve_static_instance(&descriptor, false);
        Ok(self.singletons.entry(handle).or_insert(resolved).clone())
    }

    /// The type's companion instance, if it has one.
    ///
    /// Same scan as [`ReflectionCache::singleton`], but the member's declared
    /// type must be flagged as a companion rather than a plain module object.
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if `handle` is not registered.
    pub fn companion(&self, handle: TypeHandle) -> Result<Option<Instance>> {
        if let Some(hit) = self.companions.get(&handle) {
            return Ok(hit.clone());
        }
        let descriptor = self.registry.require(handle)?;
        let resolved = self.resolve_static_instance(&descriptor, true);
        Ok(self.companions.entry(handle).or_insert(resolved).clone())
    }

    /// Metadata for the type's single designated public constructor.
    ///
    /// # Errors
    /// Returns [`Error::NotMaterializable`] if the type declares zero or more
    /// than one public constructor - a configuration error surfaced at
    /// materialization time and never cached - and [`Error::TypeNotFound`]
    /// for an unregistered handle.
    pub fn constructor_metadata(&self, handle: TypeHandle) -> Result<ConstructorMetadataRc> {
        if let Some(hit) = self.constructors.get(&handle) {
            return Ok(hit.clone());
        }

        let descriptor = self.registry.require(handle)?;
        let constructor = primary_constructor(&descriptor)?;
        let metadata = Arc::new(ConstructorMetadata {
            param_types: constructor.params.iter().map(|p| p.declared_type).collect(),
            params: constructor.params.clone(),
            constructor,
        });

        Ok(self
            .constructors
            .entry(handle)
            .or_insert(metadata)
            .clone())
    }

    /// Names of the type's primary constructor parameters, in declared order.
    ///
    /// Empty when the type has no single public constructor.
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if `handle` is not registered.
    pub fn primary_property_names(&self, handle: TypeHandle) -> Result<Arc<Vec<String>>> {
        if let Some(hit) = self.primary_properties.get(&handle) {
            return Ok(hit.clone());
        }

        let descriptor = self.registry.require(handle)?;
        let names = match primary_constructor(&descriptor) {
            Ok(constructor) => constructor.params.iter().map(|p| p.name.clone()).collect(),
            Err(_) => Vec::new(),
        };

        Ok(self
            .primary_properties
            .entry(handle)
            .or_insert_with(|| Arc::new(names))
            .clone())
    }

    /// Resolve the accessor for `name` on the type behind `handle`.
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if `handle` is not registered.
    pub fn accessor(&self, handle: TypeHandle, name: &str) -> Result<Option<PropertyRc>> {
        self.accessors.resolve(handle, name)
    }

    /// Resolve and invoke the accessor for `name` on `instance`.
    ///
    /// # Errors
    /// Returns [`Error::PropertyNotFound`] if no accessor resolves.
    pub fn property_value(
        &self,
        handle: TypeHandle,
        instance: &Instance,
        name: &str,
    ) -> Result<Option<BoxedValue>> {
        self.accessors.property_value(handle, instance, name)
    }

    /// Scan public static members for one whose declared type is a
    /// module-kind type (`companion` selects companion-flagged types instead).
    fn resolve_static_instance(
        &self,
        descriptor: &TypeDescriptor,
        companion: bool,
    ) -> Option<Instance> {
        let wanted = MemberFlags::PUBLIC | MemberFlags::STATIC;
        descriptor
            .statics
            .iter()
            .filter(|member| member.flags.contains(wanted))
            .find(|member| {
                self.registry
                    .get(member.declared_type)
                    .is_some_and(|declared| {
                        if companion {
                            declared.is_companion()
                        } else {
                            declared.is_module_object()
                        }
                    })
            })
            .map(|member| member.value.clone())
    }
}

/// The type's unique public constructor.
fn primary_constructor(descriptor: &TypeDescriptor) -> Result<ConstructorRc> {
    let publics: Vec<&ConstructorRc> = descriptor.public_constructors().collect();
    match publics.as_slice() {
        [constructor] => Ok((*constructor).clone()),
        _ => Err(Error::NotMaterializable {
            type_name: descriptor.fullname(),
            found: publics.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::builder::TypeDescriptorBuilder;
    use crate::metadata::descriptor::{ArgList, MemberFlags};
    use crate::metadata::primitives::PrimitiveKind;

    struct AppConfig {
        port: u16,
    }

    struct Service;

    fn fixture() -> (Arc<TypeRegistry>, TypeHandle, TypeHandle) {
        let registry = Arc::new(TypeRegistry::new());

        let config = TypeDescriptorBuilder::new(&registry, "app", "AppConfig")
            .module_object(AppConfig { port: 8080 })
            .register()
            .unwrap();

        let service = TypeDescriptorBuilder::new(&registry, "app", "Service")
            .static_member(
                "Config",
                config,
                Arc::new(AppConfig { port: 8080 }) as Instance,
            )
            .constructor(vec![], |_args: ArgList| Ok(Arc::new(Service) as Instance))
            .register()
            .unwrap();

        (registry, config, service)
    }

    #[test]
    fn test_singleton_on_module_object_itself() {
        let (registry, config, _) = fixture();
        let cache = ReflectionCache::new(registry);

        let instance = cache.singleton(config).unwrap().unwrap();
        let config = instance.downcast_ref::<AppConfig>().unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_singleton_through_declared_static_member() {
        let (registry, _, service) = fixture();
        let cache = ReflectionCache::new(registry);

        // Service declares a public static of the module-kind AppConfig.
        let instance = cache.singleton(service).unwrap().unwrap();
        assert!(instance.downcast_ref::<AppConfig>().is_some());
    }

    #[test]
    fn test_singleton_absence_is_cached() {
        let registry = Arc::new(TypeRegistry::new());
        let plain = TypeDescriptorBuilder::new(&registry, "app", "Plain")
            .register()
            .unwrap();
        let cache = ReflectionCache::new(registry);

        assert!(cache.singleton(plain).unwrap().is_none());
        assert!(cache.singleton(plain).unwrap().is_none());
    }

    #[test]
    fn test_companion_resolution() {
        let registry = Arc::new(TypeRegistry::new());
        let companion = TypeDescriptorBuilder::new(&registry, "app", "Widget.Companion")
            .companion_object(7i64)
            .register()
            .unwrap();
        let widget = TypeDescriptorBuilder::new(&registry, "app", "Widget")
            .static_member("Companion", companion, Arc::new(7i64) as Instance)
            .register()
            .unwrap();

        let cache = ReflectionCache::new(registry);
        let instance = cache.companion(widget).unwrap().unwrap();
        assert_eq!(*instance.downcast_ref::<i64>().unwrap(), 7);
        // The companion member is not a plain module object.
        assert!(cache.singleton(widget).unwrap().is_none());
    }

    #[test]
    fn test_constructor_metadata() {
        let registry = Arc::new(TypeRegistry::new());
        let int32 = PrimitiveKind::Int32.handle();
        let string = PrimitiveKind::String.handle();
        let handle = TypeDescriptorBuilder::new(&registry, "app", "User")
            .constructor(
                vec![
                    ParamDescriptor::required("id", int32),
                    ParamDescriptor::nullable("nick", string),
                ],
                |_args| Ok(Arc::new(Service) as Instance),
            )
            .register()
            .unwrap();

        let cache = ReflectionCache::new(registry);
        let metadata = cache.constructor_metadata(handle).unwrap();
        assert_eq!(metadata.param_types, vec![int32, string]);
        assert_eq!(metadata.params[0].name, "id");
        assert!(!metadata.params[0].nullable);
        assert!(metadata.params[1].nullable);
    }

    #[test]
    fn test_constructor_metadata_is_shared_after_first_resolution() {
        let (registry, _, service) = fixture();
        let cache = ReflectionCache::new(registry);

        let first = cache.constructor_metadata(service).unwrap();
        let second = cache.constructor_metadata(service).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_zero_constructors_not_materializable() {
        let registry = Arc::new(TypeRegistry::new());
        let handle = TypeDescriptorBuilder::new(&registry, "app", "NoCtor")
            .register()
            .unwrap();

        let cache = ReflectionCache::new(registry);
        let err = cache.constructor_metadata(handle).unwrap_err();
        assert!(matches!(
            err,
            Error::NotMaterializable { type_name, found }
                if type_name == "app.NoCtor" && found == 0
        ));
    }

    #[test]
    fn test_multiple_public_constructors_not_materializable() {
        let registry = Arc::new(TypeRegistry::new());
        let handle = TypeDescriptorBuilder::new(&registry, "app", "TwoCtors")
            .constructor(vec![], |_| Ok(Arc::new(Service) as Instance))
            .constructor(vec![], |_| Ok(Arc::new(Service) as Instance))
            .register()
            .unwrap();

        let cache = ReflectionCache::new(registry);
        let err = cache.constructor_metadata(handle).unwrap_err();
        assert!(matches!(
            err,
            Error::NotMaterializable { found, .. } if found == 2
        ));
    }

    #[test]
    fn test_private_constructor_not_counted() {
        let registry = Arc::new(TypeRegistry::new());
        let handle = TypeDescriptorBuilder::new(&registry, "app", "Mixed")
            .constructor(vec![], |_| Ok(Arc::new(Service) as Instance))
            .constructor_with_flags(MemberFlags::empty(), vec![], |_| {
                Ok(Arc::new(Service) as Instance)
            })
            .register()
            .unwrap();

        let cache = ReflectionCache::new(registry);
        assert!(cache.constructor_metadata(handle).is_ok());
    }

    #[test]
    fn test_primary_property_names() {
        let registry = Arc::new(TypeRegistry::new());
        let int32 = PrimitiveKind::Int32.handle();
        let point = TypeDescriptorBuilder::new(&registry, "app", "Point")
            .constructor(
                vec![
                    ParamDescriptor::required("x", int32),
                    ParamDescriptor::required("y", int32),
                ],
                |_| Ok(Arc::new(Service) as Instance),
            )
            .register()
            .unwrap();
        let bare = TypeDescriptorBuilder::new(&registry, "app", "Bare")
            .register()
            .unwrap();

        let cache = ReflectionCache::new(registry);
        assert_eq!(
            *cache.primary_property_names(point).unwrap(),
            vec!["x".to_string(), "y".to_string()]
        );
        assert!(cache.primary_property_names(bare).unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_resolution_settles_on_one_value() {
        let (registry, config, _) = fixture();
        let cache = Arc::new(ReflectionCache::new(registry));

        let mut threads = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            threads.push(std::thread::spawn(move || {
                cache.singleton(config).unwrap().unwrap()
            }));
        }

        let instances: Vec<Instance> = threads
            .into_iter()
            .map(|t| t.join().unwrap())
            .collect();
        for instance in &instances[1..] {
            assert!(Arc::ptr_eq(&instances[0], instance));
        }
    }
}
