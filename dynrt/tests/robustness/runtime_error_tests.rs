// Runtime error propagation and reporting tests

use dynrt::runtime::error::{MissingCause, RuntimeError};
use dynrt::{
    define_lazy_property, linked_map, ClassBuilder, Function, MapEntries, ObjectRef, Property,
    Runtime, Value,
};

/// Runs an operation that must fail and checks the rendered message.
fn expect_error_containing(
    result: Result<Value, RuntimeError>,
    expected: &str,
) -> Result<(), String> {
    match result {
        Ok(value) => Err(format!(
            "Expected error containing '{}', but got success: {:?}",
            expected, value
        )),
        Err(error) => {
            let message = error.to_string();
            if message.contains(expected) {
                Ok(())
            } else {
                Err(format!(
                    "Expected error containing '{}', but got: {}",
                    expected, message
                ))
            }
        }
    }
}

fn thrower(name: &str) -> Function {
    let payload = Value::string(name);
    Function::new(name, &[], move |_, _| Err(RuntimeError::Thrown(payload.clone())))
}

#[test]
fn missing_member_messages() {
    let rt = Runtime::new();
    let obj = Value::Object(ClassBuilder::new("Widget").build().allocate());
    let cases = vec![
        (
            rt.dynamic_call(&obj, "render", &[Value::Integer(1)]),
            "NoSuchMethodError: 'render' on Instance of 'Widget' with arguments (1)",
        ),
        (rt.dynamic_get(&obj, "size"), "'size'"),
        (rt.dynamic_index_get(&obj, Value::string("k")), "'[]'"),
        (rt.dynamic_binary(&obj, "<<", Value::Integer(2)), "'<<'"),
    ];
    for (result, expected) in cases {
        if let Err(msg) = expect_error_containing(result, expected) {
            panic!("{}", msg);
        }
    }
}

#[test]
fn non_callable_member_is_named_in_report() {
    let rt = Runtime::new();
    let obj = Value::Object(ObjectRef::from_entries([("label", Value::string("hi"))]));
    let result = rt.dynamic_call(&obj, "label", &[]);
    expect_error_containing(result, "found \"hi\" which is not callable").unwrap();
}

#[test]
fn arity_report_shows_expected_range() {
    let rt = Runtime::new();
    let obj = ObjectRef::new();
    obj.define_property(
        "f",
        Property::method(Function::new("f", &["a", "opt$b"], |_, _| Ok(Value::Null))),
    );
    let result = rt.dynamic_call(&Value::Object(obj), "f", &[]);
    expect_error_containing(result, "expected 1..=2 arguments, got 0").unwrap();
}

#[test]
fn thrown_values_propagate_unchanged_through_every_entry_point() {
    let rt = Runtime::new();
    let obj = ObjectRef::new();
    for name in ["m", "get", "set", "+", "=="] {
        let payload = Value::string(name);
        obj.define_property(
            name,
            Property::method(Function::new(name, &["opt$a", "opt$b"], move |_, _| {
                Err(RuntimeError::Thrown(payload.clone()))
            })),
        );
    }
    obj.define_property("g", Property::getter(thrower("g")));
    let v = Value::Object(obj);

    let thrown = |s: &str| RuntimeError::Thrown(Value::string(s));
    assert_eq!(rt.dynamic_call(&v, "m", &[]).unwrap_err(), thrown("m"));
    assert_eq!(rt.dynamic_index_get(&v, Value::Null).unwrap_err(), thrown("get"));
    assert_eq!(
        rt.dynamic_index_set(&v, Value::Null, Value::Null).unwrap_err(),
        thrown("set")
    );
    assert_eq!(rt.dynamic_binary(&v, "+", Value::Null).unwrap_err(), thrown("+"));
    assert_eq!(rt.equals(&v, &Value::Integer(1)).unwrap_err(), thrown("=="));
    assert_eq!(rt.dynamic_get(&v, "g").unwrap_err(), thrown("g"));
}

#[test]
fn circular_initialization_message_names_binding() {
    let ns = ObjectRef::new();
    let inner = ns.clone();
    define_lazy_property(
        &ns,
        "config",
        Function::new("config", &[], move |_, _| inner.get("config")),
        false,
    );
    let rt = Runtime::new();
    let result = rt.dynamic_get(&Value::Object(ns.clone()), "config");
    expect_error_containing(result, "circular initialization for field config").unwrap();
    ns.define_property("config", Property::value(Value::Null));
}

#[test]
fn unsupported_capability_is_fatal_not_missing_member() {
    let rt = Runtime::new();
    let err = rt.is(&Value::Integer(1), &Value::Null).unwrap_err();
    assert!(!err.is_missing_member());
    assert!(matches!(err, RuntimeError::Unsupported { .. }));
}

#[test]
fn missing_member_payload_carries_operation_record() {
    let rt = Runtime::new();
    let map = Value::Object(linked_map(MapEntries::Empty).unwrap());
    let err = rt
        .dynamic_call(&map, "put", &[Value::string("k"), Value::Integer(1)])
        .unwrap_err();
    let missing = err.as_missing_member().unwrap();
    assert!(missing.receiver.identical(&map));
    assert_eq!(missing.member, "put");
    assert_eq!(missing.arguments, vec![Value::string("k"), Value::Integer(1)]);
    assert_eq!(missing.cause, MissingCause::Absent);
}
