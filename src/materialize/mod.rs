//! Bean materialization: building instances from string-keyed parameter maps.
//!
//! Given a target type and a flat `string -> string` map (as arrives from an
//! HTTP request, a config file or an RPC payload), the [`Materializer`]
//! locates the type's single designated public constructor through the
//! [`ReflectionCache`], resolves each constructor parameter from the map,
//! delegates scalar coercion to the external [`ValueDeserializer`]
//! collaborator, and invokes the constructor.
//!
//! Singleton types short-circuit: their cached instance is returned directly
//! and the parameter map is ignored, since module objects are never
//! parameter-constructed.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use beanscope::materialize::{Materializer, ValueDeserializer};
//! use beanscope::metadata::builder::TypeDescriptorBuilder;
//! use beanscope::metadata::cache::ReflectionCache;
//! use beanscope::metadata::descriptor::{BoxedValue, Instance, ParamDescriptor};
//! use beanscope::metadata::handle::TypeHandle;
//! use beanscope::metadata::primitives::PrimitiveKind;
//! use beanscope::metadata::registry::TypeRegistry;
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
//!     ) -> Result<BoxedValue, Box<dyn std::error::Error + Send + Sync>> {
//!         if target == PrimitiveKind::Int32.handle() {
//!             Ok(Box::new(raw.parse::<i32>()?))
//!         } else {
//!             Ok(Box::new(raw.to_string()))
//!         }
//!     }
//! }
//!
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
//!     .register()?;
//!
//! let materializer = Materializer::new(
//!     Arc::new(ReflectionCache::new(registry)),
//!     Arc::new(Scalars),
//! );
//!
//! let params: HashMap<String, String> =
//!     [("x", "3"), ("y", "4")].iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
//! let instance = materializer.build_instance(point, &params)?;
//! assert_eq!(*instance.downcast_ref::<Point>().unwrap(), Point { x: 3, y: 4 });
//! # Ok::<(), beanscope::Error>(())
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::metadata::cache::ReflectionCache;
use crate::metadata::descriptor::{ArgList, BoxedValue, Instance};
use crate::metadata::handle::TypeHandle;
use crate::{Error, Result};

/// External scalar deserialization collaborator.
///
/// Implementations coerce a raw string into a value of the given target type.
/// Assumed deterministic: a pure function of its inputs, failing with a
/// deserialization-specific error the materializer wraps into
/// [`Error::ArgumentDeserialization`]. Implementations are supplied by the
/// host; this crate ships none.
pub trait ValueDeserializer: Send + Sync {
    /// Coerce `raw` into a value of the type behind `target`.
    ///
    /// # Errors
    /// Any coercion failure; the error becomes the wrapped cause.
    fn deserialize(
        &self,
        raw: &str,
        target: TypeHandle,
    ) -> std::result::Result<BoxedValue, Box<dyn std::error::Error + Send + Sync>>;
}

/// Builds instances of registered types from string-keyed parameter maps.
///
/// Cheap to clone via the shared cache and deserializer; invoked concurrently
/// from many request-handling threads without external locking.
pub struct Materializer {
    cache: Arc<ReflectionCache>,
    deserializer: Arc<dyn ValueDeserializer>,
}

impl Materializer {
    /// Create a materializer over the given cache and deserializer.
    #[must_use]
    pub fn new(cache: Arc<ReflectionCache>, deserializer: Arc<dyn ValueDeserializer>) -> Self {
        Materializer {
            cache,
            deserializer,
        }
    }

    /// The reflection cache this materializer consults.
    #[must_use]
    pub fn cache(&self) -> &Arc<ReflectionCache> {
        &self.cache
    }

    /// Build an instance of the type behind `target` from `params`.
    ///
    /// Types with a singleton instance return it directly; the parameter map
    /// is ignored. Otherwise each constructor parameter is resolved from the
    /// map in declared order: present values are deserialized, absent
    /// nullable parameters become null arguments, and absent required
    /// parameters fail.
    ///
    /// # Errors
    /// - [`Error::NotMaterializable`] - zero or multiple public constructors
    /// - [`Error::MissingArgument`] - required parameter absent from `params`
    /// - [`Error::ArgumentDeserialization`] - a raw value failed to coerce
    /// - [`Error::Construction`] - the constructor itself failed
    pub fn build_instance(
        &self,
        target: TypeHandle,
        params: &HashMap<String, String>,
    ) -> Result<Instance> {
        if let Some(singleton) = self.cache.singleton(target)? {
            return Ok(singleton);
        }

        let metadata = self.cache.constructor_metadata(target)?;

        // Arguments are assembled in declared parameter order so that a
        // deserializer with ordering-sensitive side effects behaves
        // deterministically across calls.
        let mut args: Vec<Option<BoxedValue>> = Vec::with_capacity(metadata.params.len());
        for (param, &declared_type) in metadata.params.iter().zip(&metadata.param_types) {
            match params.get(&param.name) {
                Some(raw) => {
                    let value = self
                        .deserializer
                        .deserialize(raw, declared_type)
                        .map_err(|source| Error::ArgumentDeserialization {
                            parameter: param.name.clone(),
                            raw: raw.clone(),
                            source,
                        })?;
                    args.push(Some(value));
                }
                None if param.nullable => args.push(None),
                None => {
                    return Err(Error::MissingArgument {
                        parameter: param.name.clone(),
                        available: params
                            .iter()
                            .map(|(k, v)| (k.clone(), v.clone()))
                            .collect(),
                    });
                }
            }
        }

        (metadata.constructor.invoke)(ArgList::new(args)).map_err(|source| Error::Construction {
            type_name: self
                .cache
                .registry()
                .get(target)
                .map_or_else(|| target.to_string(), |d| d.fullname()),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::builder::TypeDescriptorBuilder;
    use crate::metadata::descriptor::ParamDescriptor;
    use crate::metadata::primitives::PrimitiveKind;
    use crate::metadata::registry::TypeRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    /// Deserializer for primitive scalars that also counts invocations.
    struct Scalars {
        calls: AtomicUsize,
    }

    impl Scalars {
        fn new() -> Self {
            Scalars {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ValueDeserializer for Scalars {
        fn deserialize(
            &self,
            raw: &str,
            target: TypeHandle,
        ) -> std::result::Result<BoxedValue, Box<dyn std::error::Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if target == PrimitiveKind::Int32.handle() {
                Ok(Box::new(raw.parse::<i32>()?))
            } else if target == PrimitiveKind::Bool.handle() {
                Ok(Box::new(raw.parse::<bool>()?))
            } else {
                Ok(Box::new(raw.to_string()))
            }
        }
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn point_materializer() -> (Materializer, TypeHandle) {
        let registry = Arc::new(TypeRegistry::new());
        let int32 = PrimitiveKind::Int32.handle();
        let point = TypeDescriptorBuilder::new(&registry, "demo.geometry", "Point")
            .constructor(
                vec![
                    ParamDescriptor::required("x", int32),
                    ParamDescriptor::required("y", int32),
                ],
                |mut args| {
                    Ok(Arc::new(Point {
                        x: args.take(0)?,
                        y: args.take(1)?,
                    }) as Instance)
                },
            )
            .register()
            .unwrap();

        let materializer = Materializer::new(
            Arc::new(ReflectionCache::new(registry)),
            Arc::new(Scalars::new()),
        );
        (materializer, point)
    }

    #[test]
    fn test_build_point() {
        let (materializer, point) = point_materializer();
        let instance = materializer
            .build_instance(point, &params(&[("x", "3"), ("y", "4")]))
            .unwrap();
        assert_eq!(
            *instance.downcast_ref::<Point>().unwrap(),
            Point { x: 3, y: 4 }
        );
    }

    #[test]
    fn test_missing_required_argument() {
        let (materializer, point) = point_materializer();
        let err = materializer
            .build_instance(point, &params(&[("x", "3")]))
            .unwrap_err();
        match err {
            Error::MissingArgument {
                parameter,
                available,
            } => {
                assert_eq!(parameter, "y");
                assert_eq!(available.get("x").map(String::as_str), Some("3"));
            }
            other => panic!("expected MissingArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_deserialization_failure_names_parameter_and_raw() {
        let (materializer, point) = point_materializer();
        let err = materializer
            .build_instance(point, &params(&[("x", "abc"), ("y", "4")]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ArgumentDeserialization { parameter, raw, .. }
                if parameter == "x" && raw == "abc"
        ));
    }

    #[test]
    fn test_nullable_parameter_defaults_to_null() {
        let registry = Arc::new(TypeRegistry::new());
        let int32 = PrimitiveKind::Int32.handle();
        let string = PrimitiveKind::String.handle();

        #[derive(Debug, PartialEq)]
        struct User {
            id: i32,
            nick: Option<String>,
        }

        let user = TypeDescriptorBuilder::new(&registry, "app", "User")
            .constructor(
                vec![
                    ParamDescriptor::required("id", int32),
                    ParamDescriptor::nullable("nick", string),
                ],
                |mut args| {
                    Ok(Arc::new(User {
                        id: args.take(0)?,
                        nick: args.take_opt(1)?,
                    }) as Instance)
                },
            )
            .register()
            .unwrap();

        let materializer = Materializer::new(
            Arc::new(ReflectionCache::new(registry)),
            Arc::new(Scalars::new()),
        );

        let instance = materializer
            .build_instance(user, &params(&[("id", "1")]))
            .unwrap();
        assert_eq!(
            *instance.downcast_ref::<User>().unwrap(),
            User { id: 1, nick: None }
        );
    }

    #[test]
    fn test_singleton_short_circuits_and_ignores_params() {
        let registry = Arc::new(TypeRegistry::new());
        let config = TypeDescriptorBuilder::new(&registry, "app", "Config")
            .module_object(9000u16)
            .register()
            .unwrap();

        let deserializer = Arc::new(Scalars::new());
        let materializer = Materializer::new(
            Arc::new(ReflectionCache::new(registry)),
            Arc::clone(&deserializer) as Arc<dyn ValueDeserializer>,
        );

        // Garbage params must be ignored entirely.
        let instance = materializer
            .build_instance(config, &params(&[("whatever", "zzz")]))
            .unwrap();
        assert_eq!(*instance.downcast_ref::<u16>().unwrap(), 9000);
        assert_eq!(deserializer.calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_constructor_failure_is_wrapped() {
        let registry = Arc::new(TypeRegistry::new());
        let int32 = PrimitiveKind::Int32.handle();
        let fussy = TypeDescriptorBuilder::new(&registry, "app", "Fussy")
            .constructor(vec![ParamDescriptor::required("n", int32)], |mut args| {
                let n: i32 = args.take(0)?;
                if n < 0 {
                    return Err("n must be non-negative".into());
                }
                Ok(Arc::new(n) as Instance)
            })
            .register()
            .unwrap();

        let materializer = Materializer::new(
            Arc::new(ReflectionCache::new(registry)),
            Arc::new(Scalars::new()),
        );

        let err = materializer
            .build_instance(fussy, &params(&[("n", "-1")]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Construction { type_name, .. } if type_name == "app.Fussy"
        ));
    }

    #[test]
    fn test_arguments_deserialized_in_declared_order() {
        let registry = Arc::new(TypeRegistry::new());
        let string = PrimitiveKind::String.handle();

        struct Recording {
            order: std::sync::Mutex<Vec<String>>,
        }
        impl ValueDeserializer for Recording {
            fn deserialize(
                &self,
                raw: &str,
                _target: TypeHandle,
            ) -> std::result::Result<BoxedValue, Box<dyn std::error::Error + Send + Sync>>
            {
                self.order.lock().unwrap().push(raw.to_string());
                Ok(Box::new(raw.to_string()))
            }
        }

        let triple = TypeDescriptorBuilder::new(&registry, "app", "Triple")
            .constructor(
                vec![
                    ParamDescriptor::required("a", string),
                    ParamDescriptor::required("b", string),
                    ParamDescriptor::required("c", string),
                ],
                |_| Ok(Arc::new(()) as Instance),
            )
            .register()
            .unwrap();

        let recording = Arc::new(Recording {
            order: std::sync::Mutex::new(Vec::new()),
        });
        let materializer = Materializer::new(
            Arc::new(ReflectionCache::new(registry)),
            Arc::clone(&recording) as Arc<dyn ValueDeserializer>,
        );

        materializer
            .build_instance(triple, &params(&[("c", "3"), ("a", "1"), ("b", "2")]))
            .unwrap();
        assert_eq!(*recording.order.lock().unwrap(), vec!["1", "2", "3"]);
    }
}
