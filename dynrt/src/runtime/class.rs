// Constructible types: prototype (instance behavior), statics (class-level
// surface) and the construction protocol.

use crate::runtime::error::{MissingCause, RuntimeError, RuntimeResult};
use crate::runtime::object::{ObjectRef, Property};
use crate::runtime::values::{Function, Value};
use std::fmt;
use std::rc::Rc;

pub struct Class {
    name: String,
    superclass: Option<ClassRef>,
    constructor: Option<Function>,
    prototype: ObjectRef,
    statics: ObjectRef,
    composition: Option<Composition>,
}

/// Metadata of a mixin application.
#[derive(Debug, Clone)]
pub struct Composition {
    pub base: ClassRef,
    pub sources: Vec<ClassRef>,
}

#[derive(Clone)]
pub struct ClassRef(Rc<Class>);

impl ClassRef {
    pub(crate) fn from_parts(
        name: String,
        superclass: Option<ClassRef>,
        constructor: Option<Function>,
        prototype: ObjectRef,
        statics: ObjectRef,
        composition: Option<Composition>,
    ) -> ClassRef {
        ClassRef(Rc::new(Class {
            name,
            superclass,
            constructor,
            prototype,
            statics,
            composition,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn superclass(&self) -> Option<&ClassRef> {
        self.0.superclass.as_ref()
    }

    pub fn prototype(&self) -> &ObjectRef {
        &self.0.prototype
    }

    pub fn statics(&self) -> &ObjectRef {
        &self.0.statics
    }

    pub fn composition(&self) -> Option<&Composition> {
        self.0.composition.as_ref()
    }

    pub fn ptr_eq(&self, other: &ClassRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Allocates an instance on this class's prototype without running any
    /// constructor.
    pub fn allocate(&self) -> ObjectRef {
        ObjectRef::tagged(Some(self.prototype().clone()), self.name())
    }

    /// Allocates an instance and runs the construction protocol on it.
    pub fn construct(&self, args: &[Value]) -> RuntimeResult<ObjectRef> {
        let instance = self.allocate();
        self.initialize(&Value::Object(instance.clone()), args)?;
        Ok(instance)
    }

    /// Runs the construction protocol against an existing `this`.
    ///
    /// A mixin type runs its base with the full argument list, then every
    /// behavior source with no arguments, in order. A class without its own
    /// constructor forwards the arguments to its superclass.
    pub fn initialize(&self, this: &Value, args: &[Value]) -> RuntimeResult<()> {
        if let Some(composition) = &self.0.composition {
            composition.base.initialize(this, args)?;
            for source in &composition.sources {
                source.initialize(this, &[])?;
            }
            return Ok(());
        }
        match (&self.0.constructor, &self.0.superclass) {
            (Some(constructor), _) => constructor.call(this, args).map(|_| ()),
            (None, Some(superclass)) => superclass.initialize(this, args),
            (None, None) => Ok(()),
        }
    }

    /// True when `self` is `other` or inherits from it.
    pub fn is_subclass_of(&self, other: &ClassRef) -> bool {
        let mut current = Some(self.clone());
        while let Some(class) = current {
            if class.ptr_eq(other) {
                return true;
            }
            current = class.superclass().cloned();
        }
        false
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.0.name)
            .field("superclass", &self.0.superclass.as_ref().map(|s| s.name().to_string()))
            .field("mixin", &self.0.composition.is_some())
            .finish()
    }
}

/// Fluent builder for [`ClassRef`].
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    name: String,
    superclass: Option<ClassRef>,
    constructor: Option<Function>,
    members: Vec<(String, Property)>,
    static_members: Vec<(String, Property)>,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            superclass: None,
            constructor: None,
            members: Vec::new(),
            static_members: Vec::new(),
        }
    }

    pub fn with_superclass(mut self, superclass: &ClassRef) -> Self {
        self.superclass = Some(superclass.clone());
        self
    }

    /// The constructor body runs with the new instance as `this`.
    pub fn with_constructor(mut self, constructor: Function) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn with_method(mut self, name: &str, method: Function) -> Self {
        self.members.push((name.to_string(), Property::method(method)));
        self
    }

    pub fn with_member(mut self, name: &str, property: Property) -> Self {
        self.members.push((name.to_string(), property));
        self
    }

    pub fn with_static(mut self, name: &str, property: Property) -> Self {
        self.static_members.push((name.to_string(), property));
        self
    }

    pub fn build(self) -> ClassRef {
        let prototype =
            ObjectRef::with_proto(self.superclass.as_ref().map(|s| s.prototype().clone()));
        for (name, property) in self.members {
            prototype.define_property(&name, property);
        }
        let statics = ObjectRef::with_proto(self.superclass.as_ref().map(|s| s.statics().clone()));
        for (name, property) in self.static_members {
            statics.define_property(&name, property);
        }
        ClassRef::from_parts(
            self.name,
            self.superclass,
            self.constructor,
            prototype,
            statics,
            None,
        )
    }
}

/// Exposes the prototype initializer `name` as a named constructor on the
/// class statics (`new C.name(...)`).
///
/// The entry point takes the initializer's formals, allocates an instance on
/// the class prototype, runs the initializer with it as `this` and returns
/// the instance.
pub fn define_named_constructor(class: &ClassRef, name: &str) -> RuntimeResult<Function> {
    let initializer = match class.prototype().get(name)? {
        Value::Function(f) => f,
        other => {
            let cause = if other.is_nullish() {
                MissingCause::Absent
            } else {
                MissingCause::NotCallable(other)
            };
            return Err(RuntimeError::missing_member(
                Value::Class(class.clone()),
                name,
                Vec::new(),
                cause,
            ));
        }
    };

    // Capture the prototype rather than the class: the constructor lives on
    // the class statics and must not keep the class alive.
    let prototype = class.prototype().clone();
    let tag = class.name().to_string();
    let constructor = Function::with_params(
        &format!("{}.{}", class.name(), name),
        initializer.params().to_vec(),
        move |_, args| {
            let instance = ObjectRef::tagged(Some(prototype.clone()), &tag);
            initializer.call(&Value::Object(instance.clone()), args)?;
            Ok(Value::Object(instance))
        },
    );
    class
        .statics()
        .define_property(name, Property::method(constructor.clone()));
    Ok(constructor)
}
