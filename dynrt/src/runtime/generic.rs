// Generic type memoization
//
// A generic type constructor is wrapped so that instantiating it twice with
// the same type arguments yields the very same type value. Entries are never
// evicted; the cache lives as long as the generic itself.

use crate::runtime::error::RuntimeResult;
use crate::runtime::values::{Function, IdentityKey, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

struct Instantiation {
    arguments: Vec<Value>,
    ty: Value,
}

pub struct GenericType {
    constructor: Function,
    // Entries hold their arguments, which keeps reference keys from being
    // reused by later allocations.
    cache: RefCell<HashMap<Vec<IdentityKey>, Instantiation>>,
}

impl GenericType {
    pub fn new(constructor: Function) -> Rc<GenericType> {
        Rc::new(GenericType {
            constructor,
            cache: RefCell::new(HashMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        self.constructor.name()
    }

    /// Returns the cached type for `arguments`, constructing it on first use.
    pub fn instantiate(&self, arguments: &[Value]) -> RuntimeResult<Value> {
        let key: Vec<IdentityKey> = arguments.iter().map(Value::identity_key).collect();
        if let Some(hit) = self.cache.borrow().get(&key) {
            return Ok(hit.ty.clone());
        }

        // No borrow across the call: the constructor may instantiate this
        // generic again (e.g. `class Node<T> { Node<T> next; }`).
        let ty = self.constructor.call(&Value::Undefined, arguments)?;

        let mut cache = self.cache.borrow_mut();
        let entry = cache.entry(key).or_insert_with(|| {
            debug!(
                generic = %self.constructor.name(),
                arguments = arguments.len(),
                "instantiated generic type"
            );
            Instantiation {
                arguments: arguments.to_vec(),
                ty,
            }
        });
        Ok(entry.ty.clone())
    }

    /// Type arguments that produced `ty`, if this generic produced it.
    pub fn type_arguments(&self, ty: &Value) -> Option<Vec<Value>> {
        self.cache
            .borrow()
            .values()
            .find(|inst| inst.ty.identical(ty))
            .map(|inst| inst.arguments.clone())
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }

    /// A function with the constructor's formals that instantiates through
    /// the cache, suitable for installing where the raw constructor was.
    pub fn to_function(self: &Rc<Self>) -> Function {
        let generic = Rc::clone(self);
        Function::with_params(
            self.constructor.name(),
            self.constructor.params().to_vec(),
            move |_, args| generic.instantiate(args),
        )
    }
}

/// Wraps a generic type constructor with an instantiation cache.
///
/// The cache is owned by the returned function. Callers that also need
/// [`GenericType::type_arguments`] keep the handle themselves:
/// `GenericType::new(ctor)` followed by [`GenericType::to_function`].
pub fn memoize_generic(constructor: Function) -> Function {
    GenericType::new(constructor).to_function()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::class::ClassBuilder;
    use std::cell::Cell;

    #[test]
    fn test_reentrant_instantiation_keeps_first_identity() {
        let slot: Rc<RefCell<Option<Rc<GenericType>>>> = Rc::new(RefCell::new(None));
        let inner_slot = slot.clone();
        let depth = Rc::new(Cell::new(0));
        let generic = GenericType::new(Function::new("Node", &["T"], move |_, args| {
            depth.set(depth.get() + 1);
            if depth.get() == 1 {
                // Instantiate the same arguments while the first call is running.
                let g = inner_slot.borrow().clone().expect("generic installed");
                g.instantiate(args)?;
            }
            Ok(Value::Class(ClassBuilder::new("Node").build()))
        }));
        *slot.borrow_mut() = Some(generic.clone());

        let first = generic.instantiate(&[Value::string("int")]).unwrap();
        let second = generic.instantiate(&[Value::string("int")]).unwrap();
        assert!(first.identical(&second));
        assert_eq!(generic.len(), 1);
        *slot.borrow_mut() = None;
    }

    #[test]
    fn test_type_arguments_reflection() {
        let generic = GenericType::new(Function::new("Box", &["T"], |_, args| {
            Ok(Value::Class(
                ClassBuilder::new(&format!("Box<{}>", args[0])).build(),
            ))
        }));
        let int_box = generic.instantiate(&[Value::string("int")]).unwrap();
        assert_eq!(
            generic.type_arguments(&int_box),
            Some(vec![Value::string("int")])
        );
        assert_eq!(generic.type_arguments(&Value::Null), None);
    }
}
