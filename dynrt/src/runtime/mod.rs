//! dynrt Runtime
//!
//! The [`Runtime`] handle carries configuration, the type oracle and the
//! prototypes used for member lookup on primitives. The dispatch entry points
//! live in [`dispatch`]; object composition, lazy bindings and generic
//! memoization are free functions in their own modules.

pub mod arity;
pub mod class;
pub mod collections;
pub mod composition;
pub mod dispatch;
pub mod error;
pub mod generic;
pub mod lazy;
pub mod mixin;
pub mod object;
pub mod type_oracle;
pub mod values;

pub use arity::{arity_of, check_arity, DEFAULT_OPTIONAL_PREFIX};
pub use class::{define_named_constructor, ClassBuilder, ClassRef, Composition};
pub use collections::{linked_map, MapEntries};
pub use composition::copy_properties;
pub use dispatch::Operation;
pub use error::{MissingCause, MissingMember, RuntimeError, RuntimeResult};
pub use generic::{memoize_generic, GenericType};
pub use lazy::{define_lazy_properties, define_lazy_property, LazyCell};
pub use mixin::mixin;
pub use object::{ObjectRef, Property};
pub use type_oracle::{TypeOracle, UncheckedTypeOracle};
pub use values::{Arity, Function, IdentityKey, Value};

use crate::config::RuntimeConfig;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Primitive value kinds that may carry a registered prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Number,
    String,
    Function,
}

impl PrimitiveKind {
    pub fn of(value: &Value) -> Option<PrimitiveKind> {
        match value {
            Value::Boolean(_) => Some(PrimitiveKind::Boolean),
            Value::Integer(_) | Value::Float(_) => Some(PrimitiveKind::Number),
            Value::String(_) => Some(PrimitiveKind::String),
            Value::Function(_) => Some(PrimitiveKind::Function),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Runtime {
    config: RuntimeConfig,
    types: Rc<dyn TypeOracle>,
    primitive_prototypes: RefCell<HashMap<PrimitiveKind, ObjectRef>>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            config,
            types: Rc::new(UncheckedTypeOracle),
            primitive_prototypes: RefCell::new(HashMap::new()),
        }
    }

    pub fn with_type_oracle(mut self, types: Rc<dyn TypeOracle>) -> Self {
        self.types = types;
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Registers the prototype consulted for member lookups on `kind`.
    pub fn set_primitive_prototype(&self, kind: PrimitiveKind, prototype: ObjectRef) {
        self.primitive_prototypes
            .borrow_mut()
            .insert(kind, prototype);
    }

    fn prototype_for(&self, value: &Value) -> Option<ObjectRef> {
        match value {
            Value::Object(o) => Some(o.clone()),
            Value::Class(c) => Some(c.statics().clone()),
            other => PrimitiveKind::of(other)
                .and_then(|kind| self.primitive_prototypes.borrow().get(&kind).cloned()),
        }
    }

    /// Presence test (`name in value`). Nullish values have no members.
    pub fn has_member(&self, value: &Value, name: &str) -> bool {
        self.prototype_for(value)
            .map(|holder| holder.has(name))
            .unwrap_or(false)
    }

    /// Reads `value[name]`, running getters with `value` as `this`. Absent
    /// members read as `Undefined`.
    pub fn get_member(&self, value: &Value, name: &str) -> RuntimeResult<Value> {
        match self.prototype_for(value) {
            Some(holder) => holder.get_with_receiver(name, value),
            None => Ok(Value::Undefined),
        }
    }

    /// `value is ty`
    pub fn is(&self, value: &Value, ty: &Value) -> RuntimeResult<bool> {
        self.types.is_instance(value, ty)
    }

    /// `value as ty`
    pub fn cast(&self, value: Value, ty: &Value) -> RuntimeResult<Value> {
        self.types.cast(value, ty)
    }

    pub fn is_ground_type(&self, ty: &Value) -> RuntimeResult<bool> {
        self.types.is_ground_type(ty)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
