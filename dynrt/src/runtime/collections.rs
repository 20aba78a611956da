// Insertion-ordered map exposed to compiled code as a host object

use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::object::{ObjectRef, Property};
use crate::runtime::values::{Function, IdentityKey, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

pub const LINKED_MAP_TAG: &str = "LinkedHashMap";

/// Initial contents of a [`linked_map`].
#[derive(Debug, Clone)]
pub enum MapEntries {
    Empty,
    /// Alternating keys and values. A trailing key without a value is ignored.
    Pairs(Vec<Value>),
    /// Own properties of an object, in definition order, keyed by name.
    Object(ObjectRef),
}

type Table = Rc<RefCell<IndexMap<IdentityKey, (Value, Value)>>>;

/// Builds an ordered key/value object with `get`, `set`, `containsKey` and a
/// `length` getter. Keys compare by host identity.
pub fn linked_map(entries: MapEntries) -> RuntimeResult<ObjectRef> {
    let table: Table = Rc::new(RefCell::new(IndexMap::new()));
    match entries {
        MapEntries::Empty => {}
        MapEntries::Pairs(values) => {
            let mut map = table.borrow_mut();
            for pair in values.chunks_exact(2) {
                map.insert(pair[0].identity_key(), (pair[0].clone(), pair[1].clone()));
            }
        }
        MapEntries::Object(source) => {
            for name in source.own_property_names() {
                let value = source.get(&name)?;
                let key = Value::string(&name);
                table
                    .borrow_mut()
                    .insert(key.identity_key(), (key, value));
            }
        }
    }

    let map = ObjectRef::tagged(None, LINKED_MAP_TAG);

    let t = table.clone();
    map.define_property(
        "get",
        Property::method(Function::new("get", &["key"], move |_, args| {
            let key = required_arg(args, 0, "get")?;
            Ok(t.borrow()
                .get(&key.identity_key())
                .map(|(_, v)| v.clone())
                .unwrap_or(Value::Null))
        })),
    );

    let t = table.clone();
    map.define_property(
        "set",
        Property::method(Function::new("set", &["key", "value"], move |_, args| {
            let key = required_arg(args, 0, "set")?;
            let value = required_arg(args, 1, "set")?;
            t.borrow_mut()
                .insert(key.identity_key(), (key.clone(), value.clone()));
            Ok(Value::Undefined)
        })),
    );

    let t = table.clone();
    map.define_property(
        "containsKey",
        Property::method(Function::new("containsKey", &["key"], move |_, args| {
            let key = required_arg(args, 0, "containsKey")?;
            Ok(Value::Boolean(t.borrow().contains_key(&key.identity_key())))
        })),
    );

    let t = table;
    map.define_property(
        "length",
        Property::getter(Function::new("length", &[], move |_, _| {
            Ok(Value::Integer(t.borrow().len() as i64))
        })),
    );

    Ok(map)
}

// Natives are normally reached through arity-checked dispatch; direct calls
// with short argument lists still fail cleanly.
fn required_arg(args: &[Value], index: usize, method: &str) -> RuntimeResult<Value> {
    args.get(index).cloned().ok_or_else(|| {
        RuntimeError::InvariantViolation(format!(
            "{}: missing argument {}",
            method,
            index + 1
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(map: &ObjectRef, name: &str, args: &[Value]) -> Value {
        let f = map.get(name).unwrap();
        f.as_function()
            .unwrap()
            .call(&Value::Object(map.clone()), args)
            .unwrap()
    }

    #[test]
    fn test_pairs_keep_insertion_order_and_ignore_dangling_key() {
        let map = linked_map(MapEntries::Pairs(vec![
            Value::string("a"),
            Value::Integer(1),
            Value::Integer(2),
            Value::string("two"),
            Value::string("dangling"),
        ]))
        .unwrap();
        assert_eq!(map.get("length").unwrap(), Value::Integer(2));
        assert_eq!(call(&map, "get", &[Value::Float(2.0)]), Value::string("two"));
        assert_eq!(
            call(&map, "containsKey", &[Value::string("dangling")]),
            Value::Boolean(false)
        );
        assert_eq!(call(&map, "get", &[Value::string("zzz")]), Value::Null);
    }

    #[test]
    fn test_object_source_and_overwrite() {
        let source = ObjectRef::from_entries([("x", Value::Integer(1)), ("y", Value::Integer(2))]);
        let map = linked_map(MapEntries::Object(source)).unwrap();
        call(&map, "set", &[Value::string("x"), Value::Integer(10)]);
        assert_eq!(call(&map, "get", &[Value::string("x")]), Value::Integer(10));
        assert_eq!(map.get("length").unwrap(), Value::Integer(2));
        assert_eq!(map.tag(), Some(LINKED_MAP_TAG));
    }
}
