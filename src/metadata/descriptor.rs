//! Type descriptors: the explicit, registration-time representation of a type's structure.
//!
//! There is no runtime reflection facility to lean on, so every fact the engine
//! needs about a type - its single public constructor and parameter names, its
//! properties and their accessors, its public static members - is captured once
//! in a [`TypeDescriptor`] when the host registers the type, and consulted from
//! the caches afterwards.
//!
//! # Key Components
//!
//! - [`TypeDescriptor`] - Complete structural facts about one registered type
//! - [`TypeKind`] - Tagged variant distinguishing plain types, module objects
//!   (singletons), companions, interfaces and enums
//! - [`ConstructorDescriptor`] / [`ParamDescriptor`] - The designated constructor
//!   and its named, typed, nullability-aware parameters
//! - [`PropertyDescriptor`] - A property with its backing-field/getter naming and
//!   a type-erased accessor closure
//! - [`StaticMemberDescriptor`] - Public static members, scanned during
//!   singleton/companion resolution
//! - [`ArgList`] - Ordered, type-erased argument list handed to constructor
//!   closures, with typed extraction helpers

use std::any::Any;
use std::sync::Arc;

use bitflags::bitflags;
use thiserror::Error;

use crate::metadata::handle::TypeHandle;

/// A single runtime instance of a registered type, shared across threads.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// A type-erased owned value, as produced by deserializers and property accessors.
pub type BoxedValue = Box<dyn Any + Send + Sync>;

/// Reference to a [`TypeDescriptor`]
pub type TypeDescriptorRc = Arc<TypeDescriptor>;
/// Reference to a [`ConstructorDescriptor`]
pub type ConstructorRc = Arc<ConstructorDescriptor>;
/// Reference to a [`PropertyDescriptor`]
pub type PropertyRc = Arc<PropertyDescriptor>;

/// Type-erased constructor invocation closure.
///
/// Receives the assembled arguments in declared parameter order and either
/// produces the new instance or fails with the constructor's own error, which
/// the materializer wraps into [`crate::Error::Construction`].
pub type ConstructorFn = Arc<
    dyn Fn(ArgList) -> std::result::Result<Instance, Box<dyn std::error::Error + Send + Sync>>
        + Send
        + Sync,
>;

/// Type-erased property accessor closure.
///
/// Returns `None` when the property's value is null (or when the supplied
/// instance is not of the descriptor's type); "property has value null" stays
/// distinguishable from "property not found", which is an [`crate::Error::PropertyNotFound`]
/// raised by the resolver before the closure ever runs.
pub type AccessorFn = Arc<dyn Fn(&Instance) -> Option<BoxedValue> + Send + Sync>;

bitflags! {
    /// Modifier flags for constructors and static members.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MemberFlags: u8 {
        /// Member is publicly accessible
        const PUBLIC = 0b0000_0001;
        /// Member is static (type-level rather than instance-level)
        const STATIC = 0b0000_0010;
    }
}

/// Classification of a registered type.
///
/// The singleton/companion nature of a type is declared here explicitly at
/// registration time rather than inferred structurally at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// An ordinary type, materialized through its constructor
    Plain,
    /// A module object: exactly one runtime instance by construction
    ModuleObject,
    /// An auxiliary companion instance attached to another type
    Companion,
    /// An interface/capability; never materialized, used as an assignability target
    Interface,
    /// An enumeration type
    Enum,
}

/// One formal parameter of a constructor.
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    /// Declared parameter name, matched against keys of the incoming map
    pub name: String,
    /// Handle of the parameter's declared type
    pub declared_type: TypeHandle,
    /// Whether the parameter accepts an absent value
    pub nullable: bool,
}

impl ParamDescriptor {
    /// A required parameter: absence from the parameter map is an error.
    #[must_use]
    pub fn required(name: &str, declared_type: TypeHandle) -> Self {
        ParamDescriptor {
            name: name.to_string(),
            declared_type,
            nullable: false,
        }
    }

    /// A nullable parameter: absence from the parameter map yields a null argument.
    #[must_use]
    pub fn nullable(name: &str, declared_type: TypeHandle) -> Self {
        ParamDescriptor {
            name: name.to_string(),
            declared_type,
            nullable: true,
        }
    }
}

/// A constructor with its formal parameters and invocation closure.
pub struct ConstructorDescriptor {
    /// Modifier flags; only `PUBLIC` constructors are eligible for materialization
    pub flags: MemberFlags,
    /// Formal parameters in declared order
    pub params: Vec<ParamDescriptor>,
    /// Invocation closure taking the assembled argument list
    pub invoke: ConstructorFn,
}

impl ConstructorDescriptor {
    /// Returns `true` if this constructor is publicly accessible.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.flags.contains(MemberFlags::PUBLIC)
    }
}

impl std::fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructorDescriptor")
            .field("flags", &self.flags)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// A property with its naming facts and accessor.
pub struct PropertyDescriptor {
    /// Canonical property name
    pub name: String,
    /// Handle of the property's declared type
    pub declared_type: TypeHandle,
    /// Name of the backing field, if the property has one
    pub backing_field: Option<String>,
    /// Name of the accessor method, conventionally `get`-prefixed (e.g. `getX`)
    pub getter_name: Option<String>,
    /// Accessor closure extracting the value from an instance
    pub getter: AccessorFn,
}

impl PropertyDescriptor {
    /// The name a lookup resolves this property under.
    ///
    /// The backing-field name wins if one exists; otherwise the getter name
    /// with a conventional `get` prefix stripped and the first letter
    /// lower-cased. Returns `None` when the property exposes neither.
    #[must_use]
    pub fn resolved_name(&self) -> Option<String> {
        if let Some(field) = &self.backing_field {
            return Some(field.clone());
        }
        self.getter_name.as_deref().map(|getter| {
            let stripped = getter.strip_prefix("get").unwrap_or(getter);
            decapitalize(stripped)
        })
    }
}

impl std::fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("backing_field", &self.backing_field)
            .field("getter_name", &self.getter_name)
            .finish_non_exhaustive()
    }
}

/// A public static member of a type, carrying an already-resolved value.
///
/// Singleton and companion resolution scan these members for one whose
/// declared type is a module-kind or companion-kind type.
pub struct StaticMemberDescriptor {
    /// Member name
    pub name: String,
    /// Modifier flags; resolution only considers `PUBLIC | STATIC` members
    pub flags: MemberFlags,
    /// Handle of the member's declared type
    pub declared_type: TypeHandle,
    /// The member's value
    pub value: Instance,
}

impl std::fmt::Debug for StaticMemberDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticMemberDescriptor")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("declared_type", &self.declared_type)
            .finish_non_exhaustive()
    }
}

/// Complete structural facts about one registered type.
///
/// Descriptors are immutable after registration; every cache in the engine
/// relies on that immutability to hand out the same answer forever.
#[derive(Debug)]
pub struct TypeDescriptor {
    /// Handle assigned by the registry at registration
    pub handle: TypeHandle,
    /// Namespace (can be empty)
    pub namespace: String,
    /// Simple type name
    pub name: String,
    /// Classification of the type
    pub kind: TypeKind,
    /// Base type, if the type extends one
    pub base: Option<TypeHandle>,
    /// Interfaces the type implements
    pub interfaces: Vec<TypeHandle>,
    /// Declared constructors
    pub constructors: Vec<ConstructorRc>,
    /// Declared properties
    pub properties: Vec<PropertyRc>,
    /// Public static members
    pub statics: Vec<StaticMemberDescriptor>,
}

impl TypeDescriptor {
    /// Returns the full name (`Namespace.Name`) of the type.
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Returns `true` if the type is a module object (exactly one instance).
    #[must_use]
    pub fn is_module_object(&self) -> bool {
        matches!(self.kind, TypeKind::ModuleObject)
    }

    /// Returns `true` if the type is a companion instance holder.
    #[must_use]
    pub fn is_companion(&self) -> bool {
        matches!(self.kind, TypeKind::Companion)
    }

    /// Returns `true` if the type is an interface.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface)
    }

    /// Returns `true` if the type is an enumeration.
    #[must_use]
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum)
    }

    /// The type's public constructors.
    pub fn public_constructors(&self) -> impl Iterator<Item = &ConstructorRc> {
        self.constructors.iter().filter(|c| c.is_public())
    }
}

/// Errors raised by typed argument extraction inside constructor closures.
#[derive(Debug, Error)]
pub enum ArgError {
    /// A non-nullable extraction found no value at the index
    #[error("argument at index {0} is absent")]
    Absent(usize),
    /// The value at the index had a different runtime type than requested
    #[error("argument at index {0} has an unexpected runtime type")]
    Mismatch(usize),
    /// The index is out of range or was already taken
    #[error("argument at index {0} is out of range or already taken")]
    Taken(usize),
}

/// Ordered, type-erased constructor arguments.
///
/// Slots are `None` for nullable parameters that were absent from the
/// parameter map. Constructor closures drain the list with [`ArgList::take`]
/// and [`ArgList::take_opt`].
pub struct ArgList(Vec<Option<BoxedValue>>);

impl ArgList {
    /// Wrap an ordered argument vector.
    #[must_use]
    pub fn new(args: Vec<Option<BoxedValue>>) -> Self {
        ArgList(args)
    }

    /// Number of argument slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the list has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take the argument at `index` as a concrete `T`.
    ///
    /// # Errors
    /// Returns [`ArgError::Absent`] if the slot holds no value,
    /// [`ArgError::Mismatch`] if it holds a different runtime type, and
    /// [`ArgError::Taken`] if the index is invalid or already drained.
    pub fn take<T: 'static>(&mut self, index: usize) -> std::result::Result<T, ArgError> {
        match self.take_opt(index)? {
            Some(value) => Ok(value),
            None => Err(ArgError::Absent(index)),
        }
    }

    /// Take the argument at `index` as an optional concrete `T`.
    ///
    /// An absent slot (nullable parameter missing from the map) yields `Ok(None)`.
    ///
    /// # Errors
    /// Returns [`ArgError::Mismatch`] if the slot holds a different runtime
    /// type, and [`ArgError::Taken`] if the index is invalid or already drained.
    pub fn take_opt<T: 'static>(
        &mut self,
        index: usize,
    ) -> std::result::Result<Option<T>, ArgError> {
        let slot = self.0.get_mut(index).ok_or(ArgError::Taken(index))?;
        match slot.take() {
            Some(boxed) => match boxed.downcast::<T>() {
                Ok(value) => Ok(Some(*value)),
                Err(original) => {
                    // Put the value back so the error is diagnosable, not destructive.
                    *slot = Some(original);
                    Err(ArgError::Mismatch(index))
                }
            },
            None => Ok(None),
        }
    }
}

/// Lower-case the first character of an identifier (`X` in `getX` -> `x`).
pub(crate) fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_accessor() -> AccessorFn {
        Arc::new(|_| None)
    }

    #[test]
    fn test_decapitalize() {
        assert_eq!(decapitalize("X"), "x");
        assert_eq!(decapitalize("Width"), "width");
        assert_eq!(decapitalize("already"), "already");
        assert_eq!(decapitalize(""), "");
    }

    #[test]
    fn test_resolved_name_prefers_backing_field() {
        let prop = PropertyDescriptor {
            name: "x".to_string(),
            declared_type: TypeHandle::new(0x03),
            backing_field: Some("x".to_string()),
            getter_name: Some("getSomethingElse".to_string()),
            getter: noop_accessor(),
        };
        assert_eq!(prop.resolved_name(), Some("x".to_string()));
    }

    #[test]
    fn test_resolved_name_falls_back_to_getter() {
        let prop = PropertyDescriptor {
            name: "width".to_string(),
            declared_type: TypeHandle::new(0x03),
            backing_field: None,
            getter_name: Some("getWidth".to_string()),
            getter: noop_accessor(),
        };
        assert_eq!(prop.resolved_name(), Some("width".to_string()));
    }

    #[test]
    fn test_resolved_name_without_get_prefix() {
        let prop = PropertyDescriptor {
            name: "width".to_string(),
            declared_type: TypeHandle::new(0x03),
            backing_field: None,
            getter_name: Some("Width".to_string()),
            getter: noop_accessor(),
        };
        // No "get" prefix to strip; the name is decapitalized as-is.
        assert_eq!(prop.resolved_name(), Some("width".to_string()));
    }

    #[test]
    fn test_resolved_name_absent() {
        let prop = PropertyDescriptor {
            name: "phantom".to_string(),
            declared_type: TypeHandle::new(0x03),
            backing_field: None,
            getter_name: None,
            getter: noop_accessor(),
        };
        assert_eq!(prop.resolved_name(), None);
    }

    #[test]
    fn test_arglist_take() {
        let mut args = ArgList::new(vec![
            Some(Box::new(3i32) as BoxedValue),
            None,
            Some(Box::new("four".to_string()) as BoxedValue),
        ]);
        assert_eq!(args.len(), 3);
        assert_eq!(args.take::<i32>(0).unwrap(), 3);
        assert_eq!(args.take_opt::<i32>(1).unwrap(), None);
        assert_eq!(args.take::<String>(2).unwrap(), "four");
    }

    #[test]
    fn test_arglist_take_mismatch_is_not_destructive() {
        let mut args = ArgList::new(vec![Some(Box::new(3i32) as BoxedValue)]);
        assert!(matches!(args.take::<String>(0), Err(ArgError::Mismatch(0))));
        // The value survives a mismatched take.
        assert_eq!(args.take::<i32>(0).unwrap(), 3);
    }

    #[test]
    fn test_arglist_take_out_of_range() {
        let mut args = ArgList::new(vec![]);
        assert!(matches!(args.take::<i32>(0), Err(ArgError::Taken(0))));
    }

    #[test]
    fn test_arglist_absent_for_required() {
        let mut args = ArgList::new(vec![None]);
        assert!(matches!(args.take::<i32>(0), Err(ArgError::Absent(0))));
    }
}
