// Host object model: prototype-chained objects with ordered property descriptors

use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::lazy::{self, LazyCell};
use crate::runtime::values::{Function, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A property descriptor.
#[derive(Clone)]
pub enum Property {
    Data {
        value: Value,
        writable: bool,
        enumerable: bool,
    },
    Accessor {
        get: Option<Function>,
        set: Option<Function>,
        enumerable: bool,
    },
    /// A lazily-initialized binding. The cell is shared by every object the
    /// descriptor was copied onto.
    Lazy(Rc<LazyCell>),
}

impl Property {
    /// Writable, enumerable data slot.
    pub fn value(value: Value) -> Property {
        Property::Data {
            value,
            writable: true,
            enumerable: true,
        }
    }

    pub fn constant(value: Value) -> Property {
        Property::Data {
            value,
            writable: false,
            enumerable: true,
        }
    }

    /// Non-enumerable method slot, the shape instance methods take on a prototype.
    pub fn method(function: Function) -> Property {
        Property::Data {
            value: Value::Function(function),
            writable: true,
            enumerable: false,
        }
    }

    pub fn getter(get: Function) -> Property {
        Property::Accessor {
            get: Some(get),
            set: None,
            enumerable: false,
        }
    }

    pub fn accessor(get: Option<Function>, set: Option<Function>) -> Property {
        Property::Accessor {
            get,
            set,
            enumerable: false,
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Property::Lazy(_))
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Data {
                value,
                writable,
                enumerable,
            } => f
                .debug_struct("Data")
                .field("value", value)
                .field("writable", writable)
                .field("enumerable", enumerable)
                .finish(),
            Property::Accessor {
                get,
                set,
                enumerable,
            } => f
                .debug_struct("Accessor")
                .field("get", &get.as_ref().map(|g| g.name().to_string()))
                .field("set", &set.as_ref().map(|s| s.name().to_string()))
                .field("enumerable", enumerable)
                .finish(),
            Property::Lazy(cell) => write!(f, "Lazy({:?})", cell),
        }
    }
}

pub struct Object {
    proto: Option<ObjectRef>,
    /// Class name for diagnostics, set on instances created by a class.
    tag: Option<Rc<str>>,
    slots: RefCell<IndexMap<String, Property>>,
}

/// Shared handle to an [`Object`]. Equality is reference identity.
#[derive(Clone)]
pub struct ObjectRef(Rc<Object>);

impl ObjectRef {
    pub fn new() -> ObjectRef {
        Self::with_proto(None)
    }

    pub fn with_proto(proto: Option<ObjectRef>) -> ObjectRef {
        ObjectRef(Rc::new(Object {
            proto,
            tag: None,
            slots: RefCell::new(IndexMap::new()),
        }))
    }

    pub fn tagged(proto: Option<ObjectRef>, tag: &str) -> ObjectRef {
        ObjectRef(Rc::new(Object {
            proto,
            tag: Some(Rc::from(tag)),
            slots: RefCell::new(IndexMap::new()),
        }))
    }

    /// Builds a plain object from `(name, value)` pairs as writable data slots.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> ObjectRef {
        let obj = ObjectRef::new();
        for (name, value) in entries {
            obj.define_property(name, Property::value(value));
        }
        obj
    }

    pub fn proto(&self) -> Option<&ObjectRef> {
        self.0.proto.as_ref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.0.tag.as_deref()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Defines or replaces an own property. A replaced property keeps its
    /// position in the enumeration order.
    pub fn define_property(&self, name: &str, property: Property) {
        self.0.slots.borrow_mut().insert(name.to_string(), property);
    }

    pub fn get_own_property(&self, name: &str) -> Option<Property> {
        self.0.slots.borrow().get(name).cloned()
    }

    pub fn has_own_property(&self, name: &str) -> bool {
        self.0.slots.borrow().contains_key(name)
    }

    /// Own property names in definition order, enumerable or not.
    pub fn own_property_names(&self) -> Vec<String> {
        self.0.slots.borrow().keys().cloned().collect()
    }

    /// Presence test along the prototype chain.
    pub fn has(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Finds the object on the chain that owns `name`, with a snapshot of the
    /// descriptor. No borrow is held once this returns, so getters and lazy
    /// initializers are free to re-enter the object.
    pub fn lookup(&self, name: &str) -> Option<(ObjectRef, Property)> {
        let mut current = Some(self.clone());
        while let Some(obj) = current {
            if let Some(prop) = obj.get_own_property(name) {
                return Some((obj, prop));
            }
            current = obj.proto().cloned();
        }
        None
    }

    pub fn get(&self, name: &str) -> RuntimeResult<Value> {
        self.get_with_receiver(name, &Value::Object(self.clone()))
    }

    /// Reads `name`, running getters with `receiver` as `this`. Missing
    /// members read as `Undefined`.
    pub fn get_with_receiver(&self, name: &str, receiver: &Value) -> RuntimeResult<Value> {
        match self.lookup(name) {
            None => Ok(Value::Undefined),
            Some((_, Property::Data { value, .. })) => Ok(value),
            Some((_, Property::Accessor { get, .. })) => match get {
                Some(getter) => getter.call(receiver, &[]),
                None => Ok(Value::Undefined),
            },
            Some((holder, Property::Lazy(cell))) => lazy::read(&holder, name, &cell),
        }
    }

    pub fn set(&self, name: &str, value: Value) -> RuntimeResult<()> {
        let receiver = Value::Object(self.clone());
        match self.lookup(name) {
            None => {
                self.define_property(name, Property::value(value));
                Ok(())
            }
            Some((_, Property::Data { writable: false, .. })) => Err(RuntimeError::ReadOnly {
                member: name.to_string(),
            }),
            Some((holder, Property::Data { enumerable, .. })) => {
                // Inherited writable slots are shadowed on the receiver.
                let enumerable = enumerable || !holder.ptr_eq(self);
                self.define_property(
                    name,
                    Property::Data {
                        value,
                        writable: true,
                        enumerable,
                    },
                );
                Ok(())
            }
            Some((_, Property::Accessor { set, .. })) => match set {
                Some(setter) => setter.call(&receiver, &[value]).map(|_| ()),
                None => Err(RuntimeError::ReadOnly {
                    member: name.to_string(),
                }),
            },
            Some((holder, Property::Lazy(cell))) => lazy::write(&holder, name, &cell, value),
        }
    }
}

impl Default for ObjectRef {
    fn default() -> Self {
        ObjectRef::new()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    // Shallow: prototypes and slot values are not followed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("tag", &self.tag())
            .field("keys", &self.own_property_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_walks_prototype_chain() {
        let proto = ObjectRef::from_entries([("x", Value::Integer(1))]);
        let obj = ObjectRef::with_proto(Some(proto.clone()));
        assert!(obj.has("x"));
        assert!(!obj.has_own_property("x"));
        assert_eq!(obj.get("x").unwrap(), Value::Integer(1));
        assert_eq!(obj.get("missing").unwrap(), Value::Undefined);
    }

    #[test]
    fn test_set_shadows_inherited_slot() {
        let proto = ObjectRef::from_entries([("x", Value::Integer(1))]);
        let obj = ObjectRef::with_proto(Some(proto.clone()));
        obj.set("x", Value::Integer(2)).unwrap();
        assert_eq!(obj.get("x").unwrap(), Value::Integer(2));
        assert_eq!(proto.get("x").unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_getter_sees_receiver() {
        let proto = ObjectRef::new();
        proto.define_property(
            "self_x",
            Property::getter(Function::new("self_x", &[], |this, _| match this {
                Value::Object(o) => o.get("x"),
                _ => Ok(Value::Null),
            })),
        );
        let obj = ObjectRef::with_proto(Some(proto));
        obj.set("x", Value::Integer(7)).unwrap();
        assert_eq!(obj.get("self_x").unwrap(), Value::Integer(7));
    }

    #[test]
    fn test_read_only_slots_reject_writes() {
        let obj = ObjectRef::new();
        obj.define_property("k", Property::constant(Value::Integer(1)));
        obj.define_property(
            "g",
            Property::getter(Function::new("g", &[], |_, _| Ok(Value::Null))),
        );
        assert!(matches!(
            obj.set("k", Value::Integer(2)),
            Err(RuntimeError::ReadOnly { .. })
        ));
        assert!(matches!(
            obj.set("g", Value::Integer(2)),
            Err(RuntimeError::ReadOnly { .. })
        ));
    }

    #[test]
    fn test_redefinition_keeps_order() {
        let obj = ObjectRef::new();
        obj.define_property("a", Property::value(Value::Integer(1)));
        obj.define_property("b", Property::value(Value::Integer(2)));
        obj.define_property("a", Property::value(Value::Integer(3)));
        assert_eq!(obj.own_property_names(), vec!["a", "b"]);
        assert_eq!(obj.get("a").unwrap(), Value::Integer(3));
    }
}
