//! Builder for type descriptors.
//!
//! This module provides the [`TypeDescriptorBuilder`], a fluent API for
//! assembling and registering [`TypeDescriptor`]s against a shared
//! [`TypeRegistry`]. Hosts call it once per type at startup; everything the
//! materializer and the caches later consult is captured here.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use beanscope::metadata::builder::TypeDescriptorBuilder;
//! use beanscope::metadata::descriptor::{Instance, ParamDescriptor};
//! use beanscope::metadata::primitives::PrimitiveKind;
//! use beanscope::metadata::registry::TypeRegistry;
//!
//! #[derive(Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let registry = Arc::new(TypeRegistry::new());
//! let int32 = PrimitiveKind::Int32.handle();
//!
//! let point = TypeDescriptorBuilder::new(&registry, "demo.geometry", "Point")
//!     .constructor(
//!         vec![
//!             ParamDescriptor::required("x", int32),
//!             ParamDescriptor::required("y", int32),
//!         ],
//!         |mut args| {
//!             let point = Point { x: args.take(0)?, y: args.take(1)? };
//!             Ok(Arc::new(point) as Instance)
//!         },
//!     )
//!     .field_property("x", int32, |p: &Point| p.x)
//!     .field_property("y", int32, |p: &Point| p.y)
//!     .register()?;
//! # Ok::<(), beanscope::Error>(())
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::metadata::descriptor::{
    AccessorFn, ArgList, BoxedValue, ConstructorDescriptor, Instance, MemberFlags,
    ParamDescriptor, PropertyDescriptor, PropertyRc, StaticMemberDescriptor, TypeDescriptor,
    TypeKind,
};
use crate::metadata::handle::TypeHandle;
use crate::metadata::registry::TypeRegistry;
use crate::Result;

/// Name of the synthesized static member holding a module object's instance.
const INSTANCE_MEMBER: &str = "INSTANCE";

/// Provides a fluent API for assembling and registering type descriptors.
pub struct TypeDescriptorBuilder {
    /// Registry the descriptor will be registered against
    registry: Arc<TypeRegistry>,
    namespace: String,
    name: String,
    kind: TypeKind,
    base: Option<TypeHandle>,
    interfaces: Vec<TypeHandle>,
    constructors: Vec<Arc<ConstructorDescriptor>>,
    properties: Vec<PropertyRc>,
    statics: Vec<StaticMemberDescriptor>,
    /// The single instance for module-object/companion kinds
    instance: Option<Instance>,
}

impl TypeDescriptorBuilder {
    /// Start building a plain type with the given namespace and name.
    #[must_use]
    pub fn new(registry: &Arc<TypeRegistry>, namespace: &str, name: &str) -> Self {
        TypeDescriptorBuilder {
            registry: Arc::clone(registry),
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind: TypeKind::Plain,
            base: None,
            interfaces: Vec::new(),
            constructors: Vec::new(),
            properties: Vec::new(),
            statics: Vec::new(),
            instance: None,
        }
    }

    /// Mark the type as an interface/capability.
    #[must_use]
    pub fn interface(mut self) -> Self {
        self.kind = TypeKind::Interface;
        self
    }

    /// Mark the type as an enumeration.
    #[must_use]
    pub fn enumeration(mut self) -> Self {
        self.kind = TypeKind::Enum;
        self
    }

    /// Mark the type as a module object carrying the given single instance.
    ///
    /// A public static `INSTANCE` member declared as the type itself is
    /// synthesized at registration, so singleton resolution finds the
    /// instance by the usual static-member scan.
    #[must_use]
    pub fn module_object<T: Any + Send + Sync>(mut self, instance: T) -> Self {
        self.kind = TypeKind::ModuleObject;
        self.instance = Some(Arc::new(instance) as Instance);
        self
    }

    /// Mark the type as a companion instance holder for another type.
    ///
    /// The owning type declares a static member whose declared type is this
    /// companion; companion resolution on the owner then yields `instance`.
    #[must_use]
    pub fn companion_object<T: Any + Send + Sync>(mut self, instance: T) -> Self {
        self.kind = TypeKind::Companion;
        self.instance = Some(Arc::new(instance) as Instance);
        self
    }

    /// Set the base type.
    #[must_use]
    pub fn extends(mut self, base: TypeHandle) -> Self {
        self.base = Some(base);
        self
    }

    /// Add an implemented interface.
    #[must_use]
    pub fn implements(mut self, interface: TypeHandle) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Add a public constructor with the given formal parameters.
    ///
    /// The closure receives the assembled arguments in declared parameter
    /// order; its own failures are wrapped by the materializer into
    /// [`crate::Error::Construction`].
    #[must_use]
    pub fn constructor<F>(self, params: Vec<ParamDescriptor>, invoke: F) -> Self
    where
        F: Fn(ArgList) -> std::result::Result<Instance, Box<dyn std::error::Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    {
        self.constructor_with_flags(MemberFlags::PUBLIC, params, invoke)
    }

    /// Add a constructor with explicit modifier flags.
    ///
    /// Non-public constructors are recorded but never selected for
    /// materialization.
    #[must_use]
    pub fn constructor_with_flags<F>(
        mut self,
        flags: MemberFlags,
        params: Vec<ParamDescriptor>,
        invoke: F,
    ) -> Self
    where
        F: Fn(ArgList) -> std::result::Result<Instance, Box<dyn std::error::Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.push(Arc::new(ConstructorDescriptor {
            flags,
            params,
            invoke: Arc::new(invoke),
        }));
        self
    }

    /// Add a fully specified property descriptor.
    #[must_use]
    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(Arc::new(property));
        self
    }

    /// Add a property backed by a field of the same name.
    ///
    /// `get` extracts the value from a concrete `&T`; the wrapper handles the
    /// downcast from the type-erased instance.
    #[must_use]
    pub fn field_property<T, V, F>(self, name: &str, declared_type: TypeHandle, get: F) -> Self
    where
        T: Any + Send + Sync,
        V: Any + Send + Sync,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        let accessor = erase_accessor(get);
        self.property(PropertyDescriptor {
            name: name.to_string(),
            declared_type,
            backing_field: Some(name.to_string()),
            getter_name: None,
            getter: accessor,
        })
    }

    /// Add a property exposed only through a `get`-style accessor method.
    ///
    /// The property resolves under the getter name with the `get` prefix
    /// stripped and the first letter lower-cased.
    #[must_use]
    pub fn getter_property<T, V, F>(
        self,
        name: &str,
        getter_name: &str,
        declared_type: TypeHandle,
        get: F,
    ) -> Self
    where
        T: Any + Send + Sync,
        V: Any + Send + Sync,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        let accessor = erase_accessor(get);
        self.property(PropertyDescriptor {
            name: name.to_string(),
            declared_type,
            backing_field: None,
            getter_name: Some(getter_name.to_string()),
            getter: accessor,
        })
    }

    /// Add a public static member with an already-resolved value.
    #[must_use]
    pub fn static_member(
        mut self,
        name: &str,
        declared_type: TypeHandle,
        value: Instance,
    ) -> Self {
        self.statics.push(StaticMemberDescriptor {
            name: name.to_string(),
            flags: MemberFlags::PUBLIC | MemberFlags::STATIC,
            declared_type,
            value,
        });
        self
    }

    /// Register the assembled descriptor and return its handle.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeInsert`] if a type with the same full name
    /// is already registered.
    pub fn register(self) -> Result<TypeHandle> {
        let TypeDescriptorBuilder {
            registry,
            namespace,
            name,
            kind,
            base,
            interfaces,
            constructors,
            properties,
            mut statics,
            instance,
        } = self;

        registry.register_with(|handle| {
            if let Some(instance) = instance {
                // Module objects and companions carry their own instance as a
                // public static declared as the type itself.
                statics.push(StaticMemberDescriptor {
                    name: INSTANCE_MEMBER.to_string(),
                    flags: MemberFlags::PUBLIC | MemberFlags::STATIC,
                    declared_type: handle,
                    value: instance,
                });
            }
            TypeDescriptor {
                handle,
                namespace,
                name,
                kind,
                base,
                interfaces,
                constructors,
                properties,
                statics,
            }
        })
    }
}

/// Wrap a typed getter into a type-erased accessor closure.
fn erase_accessor<T, V, F>(get: F) -> AccessorFn
where
    T: Any + Send + Sync,
    V: Any + Send + Sync,
    F: Fn(&T) -> V + Send + Sync + 'static,
{
    Arc::new(move |instance: &Instance| {
        instance
            .downcast_ref::<T>()
            .map(|concrete| Box::new(get(concrete)) as BoxedValue)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::primitives::PrimitiveKind;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_register_plain_type_with_constructor() {
        let registry = Arc::new(TypeRegistry::new());
        let int32 = PrimitiveKind::Int32.handle();

        let handle = TypeDescriptorBuilder::new(&registry, "demo.geometry", "Point")
            .constructor(
                vec![
                    ParamDescriptor::required("x", int32),
                    ParamDescriptor::required("y", int32),
                ],
                |mut args| {
                    let point = Point {
                        x: args.take(0)?,
                        y: args.take(1)?,
                    };
                    Ok(Arc::new(point) as Instance)
                },
            )
            .field_property("x", int32, |p: &Point| p.x)
            .register()
            .unwrap();

        let descriptor = registry.get(handle).unwrap();
        assert_eq!(descriptor.fullname(), "demo.geometry.Point");
        assert_eq!(descriptor.constructors.len(), 1);
        assert_eq!(descriptor.constructors[0].params[0].name, "x");
        assert_eq!(descriptor.properties.len(), 1);
    }

    #[test]
    fn test_module_object_synthesizes_instance_member() {
        let registry = Arc::new(TypeRegistry::new());
        let handle = TypeDescriptorBuilder::new(&registry, "demo", "Config")
            .module_object(42i32)
            .register()
            .unwrap();

        let descriptor = registry.get(handle).unwrap();
        assert!(descriptor.is_module_object());
        assert_eq!(descriptor.statics.len(), 1);
        assert_eq!(descriptor.statics[0].name, "INSTANCE");
        assert_eq!(descriptor.statics[0].declared_type, handle);
    }

    #[test]
    fn test_field_property_accessor_roundtrip() {
        let registry = Arc::new(TypeRegistry::new());
        let int32 = PrimitiveKind::Int32.handle();
        let handle = TypeDescriptorBuilder::new(&registry, "demo.geometry", "Point")
            .field_property("y", int32, |p: &Point| p.y)
            .register()
            .unwrap();

        let descriptor = registry.get(handle).unwrap();
        let instance: Instance = Arc::new(Point { x: 3, y: 4 });
        let value = (descriptor.properties[0].getter)(&instance).unwrap();
        assert_eq!(*value.downcast::<i32>().unwrap(), 4);
    }

    #[test]
    fn test_accessor_on_foreign_instance_yields_none() {
        let registry = Arc::new(TypeRegistry::new());
        let int32 = PrimitiveKind::Int32.handle();
        let handle = TypeDescriptorBuilder::new(&registry, "demo.geometry", "Point")
            .field_property("x", int32, |p: &Point| p.x)
            .register()
            .unwrap();

        let descriptor = registry.get(handle).unwrap();
        let wrong: Instance = Arc::new("not a point".to_string());
        assert!((descriptor.properties[0].getter)(&wrong).is_none());
    }
}
