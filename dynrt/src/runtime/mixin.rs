// Mixin application: a base class plus an ordered list of behavior sources

use crate::runtime::class::{ClassRef, Composition};
use crate::runtime::composition::copy_properties;
use crate::runtime::object::ObjectRef;
use itertools::Itertools;
use tracing::debug;

/// Builds a new type whose instance behavior is `base` overlaid by the own
/// prototype members of each source, applied left to right.
///
/// The own slots of the derived prototype are the composed behavior table,
/// fixed here and read by dispatch. The derived prototype and statics
/// chain to `base`'s, so anything no source declares falls through to
/// `base`. Members a source inherits are never
/// copied. Constructing the derived type runs `base`'s constructor with the
/// caller's arguments, then each source's constructor with none.
pub fn mixin(base: &ClassRef, sources: &[ClassRef]) -> ClassRef {
    let prototype = ObjectRef::with_proto(Some(base.prototype().clone()));
    for source in sources {
        copy_properties(&prototype, source.prototype());
    }

    let name = if sources.is_empty() {
        base.name().to_string()
    } else {
        format!(
            "{} with {}",
            base.name(),
            sources.iter().map(|s| s.name()).join(", ")
        )
    };
    debug!(
        mixin = %name,
        members = prototype.own_property_names().len(),
        "composed mixin behavior table"
    );

    let statics = ObjectRef::with_proto(Some(base.statics().clone()));
    ClassRef::from_parts(
        name,
        Some(base.clone()),
        None,
        prototype,
        statics,
        Some(Composition {
            base: base.clone(),
            sources: sources.to_vec(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::class::ClassBuilder;
    use crate::runtime::values::{Function, Value};

    fn returns(name: &str, value: i64) -> Function {
        Function::new(name, &[], move |_, _| Ok(Value::Integer(value)))
    }

    #[test]
    fn test_composition_metadata_and_merged_prototype() {
        let base = ClassBuilder::new("Base").with_method("b", returns("b", 0)).build();
        let m1 = ClassBuilder::new("M1")
            .with_method("m", returns("m", 1))
            .with_method("one", returns("one", 1))
            .build();
        let m2 = ClassBuilder::new("M2").with_method("m", returns("m", 2)).build();

        let derived = mixin(&base, &[m1.clone(), m2.clone()]);
        assert_eq!(derived.name(), "Base with M1, M2");
        let composition = derived.composition().expect("mixin metadata");
        assert!(composition.base.ptr_eq(&base));
        assert_eq!(composition.sources.len(), 2);
        assert_eq!(
            derived.prototype().own_property_names(),
            vec!["m".to_string(), "one".to_string()]
        );
        assert!(derived.superclass().unwrap().ptr_eq(&base));
    }

    #[test]
    fn test_mixin_with_no_sources_is_a_plain_subtype() {
        let base = ClassBuilder::new("Base").with_method("b", returns("b", 5)).build();
        let derived = mixin(&base, &[]);
        let instance = derived.construct(&[]).unwrap();
        let b = instance.get("b").unwrap();
        assert_eq!(
            b.as_function().unwrap().call(&Value::Undefined, &[]).unwrap(),
            Value::Integer(5)
        );
    }
}
