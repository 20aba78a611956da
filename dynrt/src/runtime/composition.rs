// Composition installer: structural copy of own property descriptors

use crate::runtime::object::ObjectRef;

/// Copies every own descriptor of `from` onto `to` and returns `to`.
///
/// Descriptors are copied as-is: accessors stay accessors and lazy bindings
/// stay lazy (sharing their cell). A name already present on `to` is
/// overwritten, so the order of successive copies decides the winner.
pub fn copy_properties(to: &ObjectRef, from: &ObjectRef) -> ObjectRef {
    for name in from.own_property_names() {
        if let Some(property) = from.get_own_property(&name) {
            to.define_property(&name, property);
        }
    }
    to.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::lazy::define_lazy_property;
    use crate::runtime::object::Property;
    use crate::runtime::values::{Function, Value};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_later_source_wins() {
        let target = ObjectRef::new();
        let a = ObjectRef::from_entries([("q", Value::Integer(1)), ("a", Value::Integer(10))]);
        let b = ObjectRef::from_entries([("q", Value::Integer(2))]);
        copy_properties(&target, &a);
        let returned = copy_properties(&target, &b);
        assert!(returned.ptr_eq(&target));
        assert_eq!(target.get("q").unwrap(), Value::Integer(2));
        assert_eq!(target.get("a").unwrap(), Value::Integer(10));
    }

    #[test]
    fn test_inherited_members_are_not_copied() {
        let proto = ObjectRef::from_entries([("inherited", Value::Integer(1))]);
        let from = ObjectRef::with_proto(Some(proto));
        from.define_property("own", Property::value(Value::Integer(2)));
        let to = copy_properties(&ObjectRef::new(), &from);
        assert_eq!(to.own_property_names(), vec!["own"]);
    }

    #[test]
    fn test_accessors_and_lazies_survive_copy() {
        let calls = Rc::new(Cell::new(0));
        let from = ObjectRef::new();
        let counter = calls.clone();
        from.define_property(
            "tick",
            Property::getter(Function::new("tick", &[], move |_, _| {
                counter.set(counter.get() + 1);
                Ok(Value::Integer(counter.get() as i64))
            })),
        );
        define_lazy_property(
            &from,
            "once",
            Function::new("once", &[], |_, _| Ok(Value::Integer(42))),
            false,
        );

        let to = copy_properties(&ObjectRef::new(), &from);
        assert_eq!(calls.get(), 0);
        assert!(to.get_own_property("once").unwrap().is_lazy());
        assert_eq!(to.get("tick").unwrap(), Value::Integer(1));
        assert_eq!(to.get("tick").unwrap(), Value::Integer(2));
        assert_eq!(to.get("once").unwrap(), Value::Integer(42));
        // The source still holds the shared, now initialized, cell.
        assert_eq!(from.get("once").unwrap(), Value::Integer(42));
    }
}
