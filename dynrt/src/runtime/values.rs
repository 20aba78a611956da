// Runtime value system for dynrt
// Values seen by generated call sites: primitives, native functions, objects and classes.

use crate::runtime::class::ClassRef;
use crate::runtime::error::RuntimeResult;
use crate::runtime::object::ObjectRef;
use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Rc<str>),
    Function(Function),
    Object(ObjectRef),
    Class(ClassRef),
}

impl Value {
    pub fn string(s: &str) -> Value {
        Value::String(Rc::from(s))
    }

    /// `Null` and `Undefined` both act as the null sentinel.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Function(_) | Value::Object(_) | Value::Class(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "Null",
            Value::Boolean(_) => "bool",
            Value::Integer(_) => "int",
            Value::Float(_) => "double",
            Value::String(_) => "String",
            Value::Function(_) => "Function",
            Value::Object(_) => "Object",
            Value::Class(_) => "Type",
        }
    }

    /// Host-level identity comparison.
    ///
    /// Primitives compare by value (numbers numerically, so `5` and `5.0` are
    /// identical and `NaN` is never identical to itself). Functions, objects
    /// and classes compare by reference.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                exact_integer(*b) == Some(*a)
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Class(a), Value::Class(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Hashable key with the same equivalence as [`Value::identical`], used by
    /// identity-keyed tables (generic instantiation cache, linked maps).
    pub fn identity_key(&self) -> IdentityKey {
        match self {
            Value::Undefined => IdentityKey::Undefined,
            Value::Null => IdentityKey::Null,
            Value::Boolean(b) => IdentityKey::Boolean(*b),
            Value::Integer(i) => IdentityKey::Integer(*i),
            Value::Float(f) => match exact_integer(*f) {
                Some(i) => IdentityKey::Integer(i),
                None => IdentityKey::Float(f.to_bits()),
            },
            Value::String(s) => IdentityKey::String(s.clone()),
            Value::Function(f) => IdentityKey::Reference(f.addr()),
            Value::Object(o) => IdentityKey::Reference(o.addr()),
            Value::Class(c) => IdentityKey::Reference(c.addr()),
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            Value::Class(c) => Some(c),
            _ => None,
        }
    }
}

// The integer a float denotes exactly, if any. `i64::MAX as f64` rounds up
// to 2^63, hence the open upper bound.
fn exact_integer(f: f64) -> Option<i64> {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if f.fract() == 0.0 && f >= -TWO_POW_63 && f < TWO_POW_63 {
        Some(f as i64)
    } else {
        None
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.identical(other)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<ClassRef> for Value {
    fn from(c: ClassRef) -> Self {
        Value::Class(c)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Function(func) => write!(f, "#<function {}>", func.name()),
            Value::Object(o) => match o.tag() {
                Some(tag) => write!(f, "Instance of '{}'", tag),
                None => write!(f, "#<object>"),
            },
            Value::Class(c) => write!(f, "{}", c.name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => write!(f, "Boolean({})", b),
            Value::Integer(i) => write!(f, "Integer({})", i),
            Value::Float(fl) => write!(f, "Float({})", fl),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Function(func) => write!(f, "{:?}", func),
            Value::Object(o) => write!(f, "{:?}", o),
            Value::Class(c) => write!(f, "{:?}", c),
        }
    }
}

/// Hashable identity of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Undefined,
    Null,
    Boolean(bool),
    Integer(i64),
    Float(u64),
    String(Rc<str>),
    Reference(usize),
}

type NativeBody = dyn Fn(&Value, &[Value]) -> RuntimeResult<Value>;

/// A host-level function: a name, ordered formal parameter names, and a
/// native body receiving `this` and the positional arguments.
///
/// Optional formals are marked by the parameter naming convention (see
/// [`crate::runtime::arity`]); the body itself never sees the convention.
#[derive(Clone)]
pub struct Function {
    inner: Rc<NativeFunction>,
}

struct NativeFunction {
    name: String,
    params: Vec<String>,
    body: Box<NativeBody>,
}

impl Function {
    pub fn new<F>(name: &str, params: &[&str], body: F) -> Function
    where
        F: Fn(&Value, &[Value]) -> RuntimeResult<Value> + 'static,
    {
        Self::with_params(name, params.iter().map(|p| p.to_string()).collect(), body)
    }

    pub fn with_params<F>(name: &str, params: Vec<String>, body: F) -> Function
    where
        F: Fn(&Value, &[Value]) -> RuntimeResult<Value> + 'static,
    {
        Function {
            inner: Rc::new(NativeFunction {
                name: name.to_string(),
                params,
                body: Box::new(body),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Formal parameter names in declaration order.
    pub fn params(&self) -> &[String] {
        &self.inner.params
    }

    /// Invokes the body directly, without any arity validation.
    pub fn call(&self, this: &Value, args: &[Value]) -> RuntimeResult<Value> {
        (self.inner.body)(this, args)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.inner.name)
            .field("params", &self.inner.params)
            .finish()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    /// Inclusive bounds: required formals ..= all formals.
    Range(usize, usize),
}

impl Arity {
    pub fn min(&self) -> usize {
        match self {
            Arity::Fixed(n) => *n,
            Arity::Range(min, _) => *min,
        }
    }

    pub fn max(&self) -> usize {
        match self {
            Arity::Fixed(n) => *n,
            Arity::Range(_, max) => *max,
        }
    }

    pub fn accepts(&self, argc: usize) -> bool {
        argc >= self.min() && argc <= self.max()
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{}", n),
            Arity::Range(min, max) => write!(f, "{}..={}", min, max),
        }
    }
}
