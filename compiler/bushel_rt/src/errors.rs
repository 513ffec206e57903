//! Runtime errors and control signals.
//!
//! `ErrorKind` is the typed taxonomy scripts can observe through
//! `try`/`handle`. `ControlAction` is what actually unwinds evaluation: a
//! boxed error, an early `return`, or cooperative termination. Only the
//! error arm is catchable.

use std::fmt;
use std::sync::Arc;

use bushel_ir::SourceLocation;

use crate::protocol::ProtocolError;
use crate::value::Value;

/// Result of evaluating one node.
pub type EvalResult = Result<Value, ControlAction>;

/// Typed error category.
///
/// Each variant carries the already-rendered names of the values and terms
/// involved, so errors stay cheap to clone and compare.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    // Dispatch
    #[error("{command} was not handled by any module")]
    CommandNotHandled { command: String },
    #[error("missing required {parameter} parameter for {command}")]
    MissingParameter { command: String, parameter: String },
    #[error("wrong type for {parameter} parameter of {command}: expected {expected}, got {actual}")]
    WrongParameterType {
        command: String,
        parameter: String,
        expected: String,
        actual: String,
    },
    #[error("{value} cannot receive commands")]
    NotAModule { value: String },
    #[error("call depth limit of {limit} exceeded")]
    RecursionLimitExceeded { limit: usize },
    #[error("module reference from an earlier run is no longer valid")]
    StaleModule,

    // Specifiers
    #[error("{container} has no {property} property")]
    NoPropertyExists { container: String, property: String },
    #[error("{container} has no numeric {property} property")]
    NoNumericPropertyExists { container: String, property: String },
    #[error("the {property} property of {container} is not writable")]
    NoWritablePropertyExists { container: String, property: String },
    #[error("cannot set {specifier}: only properties are writable")]
    NonPropertyIsNotWritable { specifier: String },
    #[error("no such element: {specifier}")]
    NoElementExists { specifier: String },
    #[error("{container} does not support {form} access to {class} elements")]
    UnsupportedIndexForm {
        container: String,
        form: &'static str,
        class: String,
    },
    #[error("{form} selector expects {expected}, got {actual}")]
    InvalidSpecifierDataShape {
        form: &'static str,
        expected: &'static str,
        actual: String,
    },
    #[error("index {index} is out of bounds for {container}")]
    IndexOutOfBounds { index: i64, container: String },
    #[error("range {from} thru {thru} is out of bounds for {container}")]
    RangeOutOfBounds {
        from: i64,
        thru: i64,
        container: String,
    },
    #[error("{location} cannot be evaluated locally")]
    InsertionSpecifierEvaluated { location: String },

    // Coercion
    #[error("can't make {value} into type {type_name}")]
    Uncoercible { value: String, type_name: String },
    #[error("{value} is not a type")]
    TypeObjectRequired { value: String },

    // Remote targets
    #[error("{remote} failed to handle {command}: {reason}")]
    RemoteCommandError {
        remote: String,
        command: String,
        reason: ProtocolError,
    },
    #[error("not permitted to send {command} to {remote}")]
    RemoteCommandsDisallowed { remote: String, command: String },
    #[error("{value} cannot be sent to a remote target")]
    Unencodable { value: String },

    // Resources
    #[error("resource {resource} could not be loaded")]
    MissingResource { resource: String },

    /// A script-level `raise` of something that is not already an error.
    #[error("{description}")]
    Raised { description: String },
}

impl ErrorKind {
    /// Missing-member failures recover by retrying against the global scope.
    pub fn is_missing_member(&self) -> bool {
        matches!(
            self,
            ErrorKind::NoPropertyExists { .. } | ErrorKind::NoElementExists { .. }
        )
    }
}

/// A located runtime error.
#[derive(Clone, Debug)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    /// Innermost source location active when the error unwound.
    pub location: Option<SourceLocation>,
    /// The object a script raised, if it was not an error already.
    pub raised: Option<Value>,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind) -> Self {
        RuntimeError {
            kind,
            location: None,
            raised: None,
        }
    }

    /// Error for `raise <value>`.
    pub fn raised(value: Value) -> Self {
        RuntimeError {
            kind: ErrorKind::Raised {
                description: value.to_string(),
            },
            location: None,
            raised: Some(value),
        }
    }

    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl PartialEq for RuntimeError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.location == other.location
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{} ({location})", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Non-local exits from evaluation.
#[derive(Clone, Debug)]
pub enum ControlAction {
    /// A runtime error, catchable by `try`.
    Error(Box<RuntimeError>),
    /// Early `return`, caught at the nearest function boundary.
    Return(Value),
    /// Cooperative termination; never caught.
    Terminated,
}

impl ControlAction {
    /// Attach `location` to an error that has none yet.
    ///
    /// An error located in another source (a library the current code
    /// called into) is re-pointed at `location`, since the caller cannot
    /// see the library's text.
    #[must_use]
    pub fn located(self, location: SourceLocation) -> Self {
        match self {
            ControlAction::Error(mut error) => {
                if !error.location.is_some_and(|at| at.same_source(&location)) {
                    error.location = Some(location);
                }
                ControlAction::Error(error)
            }
            other => other,
        }
    }

    /// Point an error at `location`, replacing any location it had.
    ///
    /// Used where evaluation crosses into code from another program, whose
    /// locations mean nothing against the caller's text.
    #[must_use]
    pub fn relocated(self, location: Option<SourceLocation>) -> Self {
        match (self, location) {
            (ControlAction::Error(mut error), Some(location)) => {
                error.location = Some(location);
                ControlAction::Error(error)
            }
            (other, _) => other,
        }
    }

    pub fn as_error(&self) -> Option<&RuntimeError> {
        match self {
            ControlAction::Error(error) => Some(error),
            _ => None,
        }
    }
}

impl From<RuntimeError> for ControlAction {
    fn from(error: RuntimeError) -> Self {
        ControlAction::Error(Box::new(error))
    }
}

impl From<ErrorKind> for ControlAction {
    fn from(kind: ErrorKind) -> Self {
        ControlAction::Error(Box::new(RuntimeError::new(kind)))
    }
}

/// How a whole run ended, when it did not produce a value.
#[derive(Clone, Debug, thiserror::Error)]
pub enum RunError {
    #[error("{0}")]
    Error(RuntimeError),
    #[error("script terminated")]
    Terminated,
}

impl RunError {
    pub fn kind(&self) -> Option<&ErrorKind> {
        match self {
            RunError::Error(error) => Some(&error.kind),
            RunError::Terminated => None,
        }
    }
}

/// Wrap an error as an error value for `handle` blocks.
pub(crate) fn error_value(error: RuntimeError) -> Value {
    Value::Error(Arc::new(error))
}
