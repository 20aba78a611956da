// Dynamic dispatch: resolve a callable, validate its arity, invoke it
//
// Every dynamic entry point reduces to resolve-and-invoke over an
// `Operation`. Failures to resolve or to satisfy the arity contract are all
// reported as Missing-Member.

use crate::config::MemberNames;
use crate::runtime::arity::{arity_of, check_arity};
use crate::runtime::error::{MissingCause, RuntimeError, RuntimeResult};
use crate::runtime::values::{Arity, Function, Value};
use crate::runtime::Runtime;
use tracing::trace;

/// How a dynamic call site finds its callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    /// `receiver.name(args)`
    Call(&'a str),
    /// `value(args)`: the value itself is the callable and no `this` is bound.
    Apply,
    /// `receiver[index]`
    IndexGet,
    /// `receiver[index] = value`
    IndexSet,
    /// `left <op> right`, resolved on the left operand only.
    Binary(&'a str),
}

impl<'a> Operation<'a> {
    /// Name carried by failure reports.
    pub fn reported_name(&self, members: &'a MemberNames) -> &'a str {
        match self {
            Operation::Call(name) | Operation::Binary(name) => *name,
            Operation::Apply => &members.call,
            Operation::IndexGet => "[]",
            Operation::IndexSet => "[]=",
        }
    }

    fn resolve(&self, runtime: &Runtime, receiver: &Value) -> RuntimeResult<Value> {
        let members = &runtime.config().members;
        match self {
            Operation::Apply => Ok(receiver.clone()),
            Operation::Call(name) | Operation::Binary(name) => runtime.get_member(receiver, name),
            Operation::IndexGet => runtime.get_member(receiver, &members.index_get),
            Operation::IndexSet => runtime.get_member(receiver, &members.index_set),
        }
    }

    fn this_for(&self, receiver: &Value) -> Value {
        match self {
            Operation::Apply => Value::Undefined,
            _ => receiver.clone(),
        }
    }
}

impl Runtime {
    /// Resolves the callable for `operation` on `receiver` and invokes it
    /// with `args`, returning its result unchanged.
    pub fn resolve_and_invoke(
        &self,
        receiver: &Value,
        operation: Operation<'_>,
        args: &[Value],
    ) -> RuntimeResult<Value> {
        let member = operation.reported_name(&self.config().members);
        let resolved = operation.resolve(self, receiver)?;
        let (callee, this) =
            self.callable_of(resolved, operation.this_for(receiver), receiver, member, args)?;

        let prefix = &self.config().optional_param_prefix;
        if !check_arity(&callee, args.len(), prefix) {
            return Err(RuntimeError::missing_member(
                receiver.clone(),
                member,
                args.to_vec(),
                MissingCause::ArityMismatch {
                    expected: arity_of(&callee, prefix),
                    actual: args.len(),
                },
            ));
        }

        if self.config().trace_dispatch {
            trace!(
                receiver = %receiver.type_name(),
                member = %member,
                callee = %callee.name(),
                argc = args.len(),
                "dynamic dispatch"
            );
        }
        callee.call(&this, args)
    }

    // A non-function, non-null value may still be invoked through its
    // `call` member, with the value itself bound as `this`.
    fn callable_of(
        &self,
        resolved: Value,
        this: Value,
        receiver: &Value,
        member: &str,
        args: &[Value],
    ) -> RuntimeResult<(Function, Value)> {
        match resolved {
            Value::Function(f) => Ok((f, this)),
            absent if absent.is_nullish() => Err(RuntimeError::missing_member(
                receiver.clone(),
                member,
                args.to_vec(),
                MissingCause::Absent,
            )),
            adapter => match self.get_member(&adapter, &self.config().members.call)? {
                Value::Function(f) => Ok((f, adapter)),
                _ => Err(RuntimeError::missing_member(
                    receiver.clone(),
                    member,
                    args.to_vec(),
                    MissingCause::NotCallable(adapter),
                )),
            },
        }
    }

    /// Field read: the member must be present (by presence, not value).
    pub fn dynamic_get(&self, receiver: &Value, field: &str) -> RuntimeResult<Value> {
        if !self.has_member(receiver, field) {
            return Err(RuntimeError::missing_member(
                receiver.clone(),
                field,
                Vec::new(),
                MissingCause::Absent,
            ));
        }
        self.get_member(receiver, field)
    }

    pub fn dynamic_call(
        &self,
        receiver: &Value,
        method: &str,
        args: &[Value],
    ) -> RuntimeResult<Value> {
        self.resolve_and_invoke(receiver, Operation::Call(method), args)
    }

    pub fn dynamic_call_function(&self, function: &Value, args: &[Value]) -> RuntimeResult<Value> {
        self.resolve_and_invoke(function, Operation::Apply, args)
    }

    pub fn dynamic_index_get(&self, receiver: &Value, index: Value) -> RuntimeResult<Value> {
        self.resolve_and_invoke(receiver, Operation::IndexGet, &[index])
    }

    pub fn dynamic_index_set(
        &self,
        receiver: &Value,
        index: Value,
        value: Value,
    ) -> RuntimeResult<Value> {
        self.resolve_and_invoke(receiver, Operation::IndexSet, &[index, value])
    }

    pub fn dynamic_binary(&self, left: &Value, op: &str, right: Value) -> RuntimeResult<Value> {
        self.resolve_and_invoke(left, Operation::Binary(op), &[right])
    }

    /// Total equality. Never reports Missing-Member; errors raised by a
    /// user-defined `==` still propagate.
    pub fn equals(&self, left: &Value, right: &Value) -> RuntimeResult<bool> {
        if left.is_nullish() || right.is_nullish() {
            return Ok(left.identical(right));
        }
        match self.get_member(left, &self.config().members.equality)? {
            Value::Function(eq) => Ok(eq.call(left, std::slice::from_ref(right))?.is_truthy()),
            _ => Ok(left.identical(right)),
        }
    }

    pub fn not_null(&self, value: Value) -> RuntimeResult<Value> {
        if value.is_nullish() {
            return Err(RuntimeError::InvariantViolation(
                "expected not-null value".to_string(),
            ));
        }
        Ok(value)
    }

    pub fn assert(&self, condition: &Value) -> RuntimeResult<()> {
        if condition.is_truthy() {
            Ok(())
        } else {
            Err(RuntimeError::InvariantViolation("assertion failed".to_string()))
        }
    }

    /// Arity bounds of whatever a bare call of `value` would invoke.
    pub fn arity(&self, value: &Value) -> RuntimeResult<Arity> {
        let member = &self.config().members.call;
        let (callee, _) = self.callable_of(value.clone(), Value::Undefined, value, member, &[])?;
        Ok(arity_of(&callee, &self.config().optional_param_prefix))
    }
}
