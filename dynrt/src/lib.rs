//! dynrt: dynamic-semantics runtime for compiled gradually-typed code.
//!
//! Generated call sites use [`Runtime`] wherever static types are not precise
//! enough: dynamic member calls and reads, index operators, user-defined
//! binary operators and total equality. Type definitions use the composition
//! helpers ([`mixin`], [`copy_properties`], [`define_lazy_property`],
//! [`memoize_generic`], [`define_named_constructor`]) once, at load time.

pub mod config;
pub mod runtime;

pub use config::{ConfigError, MemberNames, RuntimeConfig};
pub use runtime::{
    copy_properties, define_lazy_properties, define_lazy_property, define_named_constructor,
    linked_map, memoize_generic, mixin, Arity, ClassBuilder, ClassRef, Function, GenericType,
    MapEntries, MissingCause, ObjectRef, Operation, PrimitiveKind, Property, Runtime,
    RuntimeError, RuntimeResult, TypeOracle, Value,
};
