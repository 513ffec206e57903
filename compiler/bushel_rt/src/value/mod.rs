//! Runtime values.
//!
//! `Value` is a closed set of object kinds. Scalars are stored inline;
//! everything else sits behind an `Arc` so values clone cheaply and can be
//! handed to other threads with the runtime that owns them. Values are
//! immutable: "modifying" a list or specifier builds a new one.
//!
//! Capabilities are split across sibling modules:
//! - `compare` for equality, ordering and containment
//! - `coerce` for `as` conversions and truthiness
//! - `container` for property and element access
//! - `specifier` for lazy object queries

mod coerce;
mod compare;
mod container;
mod global;
mod specifier;

pub use compare::test_comparison;
pub use container::{with_container, Container, Position};
pub use global::GlobalScope;
pub use specifier::{InsertionSpecifier, RootKind, Specifier, TestSpecifier};

use std::fmt;
use std::sync::Arc;

use bushel_ir::builtin_terms::Types;
use bushel_ir::{InsertionKind, SpecifierKind, TermId};

use crate::dispatch::Function;
use crate::errors::RuntimeError;
use crate::module::ModuleId;

/// A proxy for an application reachable through the protocol adapter.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Application {
    Named(String),
    BundleId(String),
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Application::Named(name) => write!(f, "application \"{name}\""),
            Application::BundleId(id) => write!(f, "application id \"{id}\""),
        }
    }
}

/// Key/value pairs; later duplicates replace earlier ones.
#[derive(Clone, Debug, Default)]
pub struct Record {
    entries: Vec<(Value, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Value, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k.equals(&key)) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.equals(key))
            .map(|(_, v)| v)
    }

    /// Value stored under a property key.
    pub fn property(&self, property: &TermId) -> Option<&Value> {
        self.entries.iter().find_map(|(k, v)| match k {
            Value::Property(id) if id == property => Some(v),
            _ => None,
        })
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Value, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(Arc<str>),
    List(Arc<[Value]>),
    Record(Arc<Record>),

    // Reflection
    Type(TermId),
    Constant(TermId),
    Property(TermId),

    // Queries
    Specifier(Arc<Specifier>),
    Test(Arc<TestSpecifier>),
    Insertion(Arc<InsertionSpecifier>),
    Root(RootKind),

    // Command targets
    Function(Arc<Function>),
    Module(ModuleId),
    Application(Arc<Application>),
    /// The global scope object at the bottom of the target stack.
    Global,

    Error(Arc<RuntimeError>),
}

impl Value {
    pub fn string(text: impl Into<Arc<str>>) -> Self {
        Value::String(text.into())
    }

    pub fn list(items: impl Into<Arc<[Value]>>) -> Self {
        Value::List(items.into())
    }

    pub fn record(record: Record) -> Self {
        Value::Record(Arc::new(record))
    }

    pub fn specifier(specifier: Specifier) -> Self {
        Value::Specifier(Arc::new(specifier))
    }

    pub fn application(application: Application) -> Self {
        Value::Application(Arc::new(application))
    }

    /// Dynamic type used by overload resolution.
    pub fn type_id(&self) -> TermId {
        let ty = match self {
            Value::Null => Types::Null,
            Value::Boolean(_) => Types::Boolean,
            Value::Integer(_) => Types::Integer,
            Value::Real(_) => Types::Real,
            Value::String(_) => Types::String,
            Value::List(_) => Types::List,
            Value::Record(_) => Types::Record,
            Value::Type(_) => Types::Type,
            Value::Constant(_) => Types::Constant,
            Value::Property(_) => Types::Property,
            Value::Specifier(_) => Types::Specifier,
            Value::Test(_) => Types::TestSpecifier,
            Value::Insertion(_) => Types::InsertionSpecifier,
            Value::Root(_) => Types::Root,
            Value::Function(_) => Types::Function,
            Value::Module(_) => Types::Script,
            Value::Application(_) => Types::Application,
            Value::Global => Types::Global,
            Value::Error(_) => Types::Error,
        };
        ty.id()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of integers and reals.
    #[expect(clippy::cast_precision_loss, reason = "script reals are f64")]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether commands may be sent to this value via `tell`.
    pub fn is_command_target(&self) -> bool {
        !matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items.into())
    }
}

/// Display name of a term without a dictionary at hand.
///
/// Built-ins render by name; anything else by its address.
pub fn term_display_name(id: &TermId) -> String {
    use bushel_ir::builtin_terms::{Commands, Constants, Parameters, Properties};

    let builtin = Types::from_id(id)
        .map(Types::name)
        .or_else(|| Properties::from_id(id).map(Properties::name))
        .or_else(|| Constants::from_id(id).map(Constants::name))
        .or_else(|| Commands::from_id(id).map(Commands::name))
        .or_else(|| Parameters::from_id(id).map(Parameters::name));
    match builtin {
        Some(name) => name.to_owned(),
        None => id.address.short_name(),
    }
}

fn write_selector(f: &mut fmt::Formatter<'_>, specifier: &Specifier) -> fmt::Result {
    let class = term_display_name(&specifier.term);
    match &specifier.kind {
        SpecifierKind::Property => write!(f, "{class}"),
        SpecifierKind::Simple(d) | SpecifierKind::Index(d) => write!(f, "{class} {d}"),
        SpecifierKind::Name(d) => write!(f, "{class} named {d}"),
        SpecifierKind::Id(d) => write!(f, "{class} id {d}"),
        SpecifierKind::All => write!(f, "every {class}"),
        SpecifierKind::First => write!(f, "first {class}"),
        SpecifierKind::Middle => write!(f, "middle {class}"),
        SpecifierKind::Last => write!(f, "last {class}"),
        SpecifierKind::Random => write!(f, "some {class}"),
        SpecifierKind::Previous => write!(f, "{class} before"),
        SpecifierKind::Next => write!(f, "{class} after"),
        SpecifierKind::Range { from, thru } => write!(f, "{class} {from} thru {thru}"),
        SpecifierKind::Test(test) => write!(f, "every {class} whose {test}"),
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_selector(f, self)?;
        match &self.parent {
            Value::Root(_) | Value::Global => Ok(()),
            parent => write!(f, " of {parent}"),
        }
    }
}

impl fmt::Display for TestSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op.as_symbol(), self.rhs)
    }
}

impl fmt::Display for InsertionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            InsertionKind::Beginning | InsertionKind::End => {
                write!(f, "{} of {}", self.kind.as_str(), self.parent)
            }
            InsertionKind::Before | InsertionKind::After => {
                write!(f, "{} {}", self.kind.as_str(), self.parent)
            }
        }
    }
}

/// Source-like rendering used in messages and `log`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r:?}"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::List(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            }
            Value::Record(record) => {
                write!(f, "{{")?;
                for (i, (key, value)) in record.entries().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Type(id) | Value::Constant(id) | Value::Property(id) => {
                write!(f, "{}", term_display_name(id))
            }
            Value::Specifier(specifier) => write!(f, "{specifier}"),
            Value::Test(test) => write!(f, "{test}"),
            Value::Insertion(insertion) => write!(f, "{insertion}"),
            Value::Root(kind) => write!(f, "{kind}"),
            Value::Function(function) => write!(f, "{function}"),
            Value::Module(id) => write!(f, "script {}", id.index()),
            Value::Application(app) => write!(f, "{app}"),
            Value::Global => write!(f, "global scope"),
            Value::Error(error) => write!(f, "error \"{}\"", error.kind),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
