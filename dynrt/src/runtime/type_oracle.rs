//! Type Oracle
//!
//! Bridge to the type-check collaborator. The runtime never decides subtype
//! questions itself; `is`, `as` and ground-type tests are forwarded to an
//! implementation of [`TypeOracle`] supplied by the embedder.

use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::values::Value;

pub trait TypeOracle: std::fmt::Debug {
    /// Runtime subtype test (`value is ty`).
    fn is_instance(&self, value: &Value, ty: &Value) -> RuntimeResult<bool>;

    /// Checked downcast (`value as ty`). Returns the value on success.
    fn cast(&self, value: Value, ty: &Value) -> RuntimeResult<Value>;

    /// Whether `ty` is a ground type (no free type parameters).
    fn is_ground_type(&self, ty: &Value) -> RuntimeResult<bool>;
}

/// Oracle used when the embedder provides none. Casts pass their value
/// through unchecked; subtype and ground-type tests are unsupported.
#[derive(Debug, Default, Clone, Copy)]
pub struct UncheckedTypeOracle;

impl TypeOracle for UncheckedTypeOracle {
    fn is_instance(&self, _value: &Value, _ty: &Value) -> RuntimeResult<bool> {
        Err(RuntimeError::unsupported("is"))
    }

    fn cast(&self, value: Value, _ty: &Value) -> RuntimeResult<Value> {
        Ok(value)
    }

    fn is_ground_type(&self, _ty: &Value) -> RuntimeResult<bool> {
        Err(RuntimeError::unsupported("isGroundType"))
    }
}
