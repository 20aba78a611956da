// Arity checking under the optional-parameter naming convention
//
// A formal whose name starts with the optional prefix may be omitted by the
// caller. Optional formals are trailing by convention.

use crate::runtime::values::{Arity, Function};

pub const DEFAULT_OPTIONAL_PREFIX: &str = "opt$";

pub fn is_optional_formal(name: &str, prefix: &str) -> bool {
    name.starts_with(prefix)
}

/// Arity bounds of `function`: required formals ..= all formals.
pub fn arity_of(function: &Function, prefix: &str) -> Arity {
    let total = function.params().len();
    let required = function
        .params()
        .iter()
        .filter(|p| !is_optional_formal(p, prefix))
        .count();
    if required == total {
        Arity::Fixed(total)
    } else {
        Arity::Range(required, total)
    }
}

/// Whether calling `function` with `argc` positional arguments is well formed.
///
/// The first `argc` formals are filled positionally; every formal left
/// unfilled must be optional.
pub fn check_arity(function: &Function, argc: usize, prefix: &str) -> bool {
    let formals = function.params();
    if argc > formals.len() {
        return false;
    }
    let required = formals
        .iter()
        .filter(|p| !is_optional_formal(p, prefix))
        .count();
    if argc < required {
        return false;
    }
    formals[argc..]
        .iter()
        .all(|p| is_optional_formal(p, prefix))
}
