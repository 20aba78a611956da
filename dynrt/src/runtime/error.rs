// Error handling for the dynrt runtime

use crate::runtime::values::{Arity, Value};
use itertools::Itertools;
use std::fmt;
use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Failures raised by the runtime. Nothing in the runtime catches these; they
/// propagate to the compiled program unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// A dynamic operation could not be satisfied: the member is absent, is
    /// not invocable, or rejects the supplied argument count.
    #[error("{0}")]
    MissingMember(Box<MissingMember>),

    /// A lazy binding was read or written while its initializer was running.
    #[error("circular initialization for field {name}")]
    CircularInitialization { name: String },

    /// A capability the runtime does not implement.
    #[error("unimplemented: {capability}")]
    Unsupported { capability: String },

    /// A not-null check or an explicit assertion failed.
    #[error("{0}")]
    InvariantViolation(String),

    /// Assignment to a read-only slot or a getter-only accessor.
    #[error("cannot assign to read-only member '{member}'")]
    ReadOnly { member: String },

    /// A program-level exception raised from inside a native body.
    #[error("uncaught exception: {0}")]
    Thrown(Value),
}

impl RuntimeError {
    pub fn missing_member(
        receiver: Value,
        member: &str,
        arguments: Vec<Value>,
        cause: MissingCause,
    ) -> RuntimeError {
        RuntimeError::MissingMember(Box::new(MissingMember {
            receiver,
            member: member.to_string(),
            arguments,
            cause,
        }))
    }

    pub fn unsupported(capability: &str) -> RuntimeError {
        RuntimeError::Unsupported {
            capability: capability.to_string(),
        }
    }

    pub fn is_missing_member(&self) -> bool {
        matches!(self, RuntimeError::MissingMember(_))
    }

    pub fn as_missing_member(&self) -> Option<&MissingMember> {
        match self {
            RuntimeError::MissingMember(m) => Some(m),
            _ => None,
        }
    }
}

/// Payload of a Missing-Member failure.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingMember {
    pub receiver: Value,
    /// Member name, or the operator symbol for binary operators.
    pub member: String,
    pub arguments: Vec<Value>,
    pub cause: MissingCause,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MissingCause {
    Absent,
    /// The member exists but is neither a function nor a callable object.
    NotCallable(Value),
    ArityMismatch { expected: Arity, actual: usize },
}

impl fmt::Display for MissingMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NoSuchMethodError: '{}' on {} with arguments ({})",
            self.member,
            self.receiver,
            self.arguments.iter().join(", ")
        )?;
        match &self.cause {
            MissingCause::Absent => Ok(()),
            MissingCause::NotCallable(found) => {
                write!(f, ": found {} which is not callable", found)
            }
            MissingCause::ArityMismatch { expected, actual } => {
                write!(f, ": expected {} arguments, got {}", expected, actual)
            }
        }
    }
}
