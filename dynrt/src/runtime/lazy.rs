//! Lazily-initialized bindings.
//!
//! A lazy binding is a property backed by a [`LazyCell`]: a three-state cell
//! that moves one way only, `Uninitialized -> InProgress -> Initialized`.
//! The first read (or, for mutable bindings, the first write) runs the
//! initializer. Re-entering the cell while it is `InProgress` is a
//! circular initialization and fails every time. Once a value exists, the
//! property on the object that was read is replaced by a plain data slot.

use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::object::{ObjectRef, Property};
use crate::runtime::values::{Function, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

enum LazyState {
    Uninitialized(Function),
    InProgress,
    Initialized(Value),
}

pub struct LazyCell {
    name: String,
    mutable: bool,
    state: RefCell<LazyState>,
}

impl LazyCell {
    pub fn new(name: &str, initializer: Function, mutable: bool) -> LazyCell {
        LazyCell {
            name: name.to_string(),
            mutable,
            state: RefCell::new(LazyState::Uninitialized(initializer)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn is_initialized(&self) -> bool {
        matches!(*self.state.borrow(), LazyState::Initialized(_))
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(*self.state.borrow(), LazyState::InProgress)
    }

    /// Returns the value, running the initializer on first use.
    ///
    /// If the initializer fails the cell stays `InProgress`: there is no way
    /// back, so every later access reports a circular initialization.
    pub fn force(&self) -> RuntimeResult<Value> {
        let initializer = {
            let mut state = self.state.borrow_mut();
            match std::mem::replace(&mut *state, LazyState::InProgress) {
                LazyState::Uninitialized(f) => f,
                LazyState::InProgress => {
                    return Err(RuntimeError::CircularInitialization {
                        name: self.name.clone(),
                    })
                }
                LazyState::Initialized(value) => {
                    *state = LazyState::Initialized(value.clone());
                    return Ok(value);
                }
            }
        };

        debug!(field = %self.name, "running lazy initializer");
        let value = initializer.call(&Value::Undefined, &[]).map_err(|e| {
            warn!(field = %self.name, error = %e, "lazy initializer failed");
            e
        })?;
        *self.state.borrow_mut() = LazyState::Initialized(value.clone());
        Ok(value)
    }

    /// The descriptor that replaces the lazy one once a value exists.
    fn materialized(&self, value: Value) -> Property {
        Property::Data {
            value,
            writable: self.mutable,
            enumerable: true,
        }
    }
}

impl fmt::Debug for LazyCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.borrow() {
            LazyState::Uninitialized(_) => "uninitialized",
            LazyState::InProgress => "in-progress",
            LazyState::Initialized(_) => "initialized",
        };
        f.debug_struct("LazyCell")
            .field("name", &self.name)
            .field("mutable", &self.mutable)
            .field("state", &state)
            .finish()
    }
}

/// Read path for a lazy property found on `holder`.
pub(crate) fn read(holder: &ObjectRef, name: &str, cell: &LazyCell) -> RuntimeResult<Value> {
    let value = cell.force()?;
    holder.define_property(name, cell.materialized(value.clone()));
    Ok(value)
}

/// Write path for a lazy property found on `holder`. The initializer still
/// runs first; the written value then replaces its result.
pub(crate) fn write(
    holder: &ObjectRef,
    name: &str,
    cell: &LazyCell,
    value: Value,
) -> RuntimeResult<()> {
    if !cell.mutable {
        return Err(RuntimeError::ReadOnly {
            member: name.to_string(),
        });
    }
    cell.force()?;
    holder.define_property(name, cell.materialized(value));
    Ok(())
}

/// Installs a lazy binding named `name` on `target`.
pub fn define_lazy_property(target: &ObjectRef, name: &str, initializer: Function, mutable: bool) {
    target.define_property(
        name,
        Property::Lazy(Rc::new(LazyCell::new(name, initializer, mutable))),
    );
}

/// Installs one lazy binding on `to` per own property of `from`.
///
/// An accessor contributes its getter as the initializer and is mutable
/// when it also has a setter. A data slot holding a function is taken as an
/// immutable binding with that function as initializer.
pub fn define_lazy_properties(to: &ObjectRef, from: &ObjectRef) -> RuntimeResult<()> {
    for name in from.own_property_names() {
        let (initializer, mutable) = match from.get_own_property(&name) {
            Some(Property::Accessor {
                get: Some(get),
                set,
                ..
            }) => (get, set.is_some()),
            Some(Property::Data {
                value: Value::Function(f),
                ..
            }) => (f, false),
            _ => {
                return Err(RuntimeError::InvariantViolation(format!(
                    "lazy property '{}' has no initializer",
                    name
                )))
            }
        };
        define_lazy_property(to, &name, initializer, mutable);
    }
    Ok(())
}
