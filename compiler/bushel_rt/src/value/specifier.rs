//! Lazy object queries.
//!
//! A specifier is a singly linked chain toward a root: each node names a
//! class or property of its parent and how to select from it. Chains are
//! immutable, so re-rooting builds a fresh copy of every node from the
//! query up to its root and shares nothing with the original.

use std::fmt;
use std::sync::Arc;

use bushel_ir::{BinaryOp, InsertionKind, SpecifierKind, TermId};

use super::Value;

/// Placeholder roots a query can be anchored to before it is evaluated.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RootKind {
    /// "Whatever application this query is ultimately about."
    Application,
    /// The container a relative query is resolved in.
    Container,
    /// The element currently tested by a `whose` clause.
    Specimen,
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RootKind::Application => "application root",
            RootKind::Container => "container root",
            RootKind::Specimen => "it",
        })
    }
}

#[derive(Clone, Debug)]
pub struct Specifier {
    /// Another specifier, a root marker, or a concrete object.
    pub parent: Value,
    /// Element class or property.
    pub term: TermId,
    pub kind: SpecifierKind<Value, Arc<TestSpecifier>>,
}

impl Specifier {
    pub fn new(
        parent: Value,
        term: TermId,
        kind: SpecifierKind<Value, Arc<TestSpecifier>>,
    ) -> Self {
        Specifier { parent, term, kind }
    }

    pub fn property(parent: Value, property: TermId) -> Self {
        Specifier::new(parent, property, SpecifierKind::Property)
    }

    pub fn parent_specifier(&self) -> Option<&Arc<Specifier>> {
        match &self.parent {
            Value::Specifier(parent) => Some(parent),
            _ => None,
        }
    }

    /// The first ancestor that is not itself a specifier.
    pub fn root_ancestor(&self) -> &Value {
        let mut current = self;
        loop {
            match &current.parent {
                Value::Specifier(parent) => current = parent,
                root => return root,
            }
        }
    }

    /// A copy of the whole chain anchored at `root` instead.
    ///
    /// The receiver and every ancestor it shares with other values are left
    /// untouched.
    #[must_use]
    pub fn with_root(&self, root: Value) -> Specifier {
        let parent = match &self.parent {
            Value::Specifier(parent) => Value::specifier(parent.with_root(root)),
            _ => root,
        };
        Specifier {
            parent,
            term: self.term.clone(),
            kind: self.kind.clone(),
        }
    }

    /// Anchor a query rooted at a placeholder at the current target.
    ///
    /// Chains already rooted at a concrete object, or at the target itself,
    /// are returned as-is.
    #[must_use]
    pub fn qualified(self: &Arc<Self>, target: &Value) -> Arc<Specifier> {
        match self.root_ancestor() {
            root @ Value::Root(_) if !root.equals(target) => Arc::new(self.with_root(target.clone())),
            _ => Arc::clone(self),
        }
    }
}

/// A `whose` clause.
///
/// Logical operators combine two nested clauses; comparison operators
/// compare two operands, which are usually queries rooted at the specimen.
#[derive(Clone, Debug)]
pub struct TestSpecifier {
    pub op: BinaryOp,
    pub lhs: Value,
    pub rhs: Value,
}

impl TestSpecifier {
    pub fn new(op: BinaryOp, lhs: Value, rhs: Value) -> Self {
        TestSpecifier { op, lhs, rhs }
    }
}

/// A location relative to a container or element, such as `end of list 1`.
#[derive(Clone, Debug)]
pub struct InsertionSpecifier {
    pub parent: Value,
    pub kind: InsertionKind,
}

impl InsertionSpecifier {
    pub fn root_ancestor(&self) -> &Value {
        match &self.parent {
            Value::Specifier(parent) => parent.root_ancestor(),
            root => root,
        }
    }
}
