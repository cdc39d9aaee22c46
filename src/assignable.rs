//! Narrowing discovered types to a target capability.

use crate::metadata::handle::TypeHandle;
use crate::metadata::registry::TypeRegistry;

/// Narrow a sequence of discovered types to those assignable to `target`.
///
/// A pure filter over the registry's "is-a" relation: no caching, no side
/// effects. Typically applied to the output of a namespace scan to pick out
/// the types implementing a capability interface or extending a base type.
#[must_use]
pub fn filter_assignable(
    registry: &TypeRegistry,
    types: &[TypeHandle],
    target: TypeHandle,
) -> Vec<TypeHandle> {
    types
        .iter()
        .copied()
        .filter(|&candidate| registry.is_assignable(candidate, target))
        .collect()
}
