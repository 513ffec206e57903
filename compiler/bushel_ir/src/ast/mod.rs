//! The expression tree.
//!
//! Programs arrive already parsed. Nodes live in an [`ExprArena`] and refer
//! to each other by [`ExprId`]; every node carries the source location it
//! was parsed from. The set of node kinds is closed.
//!
//! [`ExprArena`]: crate::ExprArena

mod operators;
mod specifier;

pub use operators::{BinaryOp, UnaryOp};
pub use specifier::{InsertionKind, SpecifierKind};

use std::fmt;

use crate::span::SourceLocation;
use crate::term_id::TermId;

/// Index into an expression arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// One node of the tree.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: SourceLocation,
}

/// A clause of a `whose` test.
///
/// Operands are ordinary expressions (typically specifiers relative to the
/// element under test); predicates combine two clauses with an operator.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TestComponent {
    Operand(ExprId),
    Predicate {
        op: BinaryOp,
        lhs: Box<TestComponent>,
        rhs: Box<TestComponent>,
    },
}

/// An element or property query in the tree.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecifierExpr {
    /// `None` means "of the current target".
    pub parent: Option<ExprId>,
    /// Element class (a type) or the property being read.
    pub term: TermId,
    pub kind: SpecifierKind<ExprId, TestComponent>,
}

/// A formal parameter of a function definition.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionParameter {
    /// Parameter identity callers name.
    pub parameter: TermId,
    /// Variable the argument is bound to inside the body.
    pub variable: TermId,
    /// Declared type; `item` when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub type_: Option<ExprId>,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExprKind {
    // Structure
    Sequence(Vec<ExprId>),
    That,
    It,
    Null,

    // Literals
    Integer(i64),
    Real(f64),
    String(String),
    List(Vec<ExprId>),
    Record(Vec<(ExprId, ExprId)>),

    // Terms
    Variable(TermId),
    Type(TermId),
    Constant(TermId),
    Resource(TermId),
    Use(TermId),

    // Queries
    Specifier(SpecifierExpr),
    Insertion {
        parent: Option<ExprId>,
        kind: InsertionKind,
    },
    /// Yield the operand without resolving it.
    Reference(ExprId),
    /// Resolve the operand now.
    Get(ExprId),

    // Commands and operators
    Command {
        command: TermId,
        arguments: Vec<(TermId, ExprId)>,
    },
    Prefix {
        op: UnaryOp,
        operand: ExprId,
    },
    Infix {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },

    // Bindings
    Let {
        variable: TermId,
        initial: Option<ExprId>,
    },
    Set {
        target: ExprId,
        value: ExprId,
    },

    // Control flow
    Return(Option<ExprId>),
    Raise(ExprId),
    Try {
        body: ExprId,
        handle: ExprId,
    },
    If {
        condition: ExprId,
        then: ExprId,
        otherwise: Option<ExprId>,
    },
    RepeatWhile {
        condition: ExprId,
        body: ExprId,
    },
    RepeatTimes {
        times: ExprId,
        body: ExprId,
    },
    RepeatFor {
        variable: TermId,
        container: ExprId,
        body: ExprId,
    },
    Tell {
        target: ExprId,
        body: ExprId,
    },

    // Definitions
    Function {
        name: TermId,
        parameters: Vec<FunctionParameter>,
        body: ExprId,
    },
    Block {
        arguments: Vec<TermId>,
        body: ExprId,
    },
}

impl ExprKind {
    /// Call `f` with every expression this node refers to directly.
    pub fn for_each_child(&self, mut f: impl FnMut(ExprId)) {
        fn test_children(component: &TestComponent, f: &mut impl FnMut(ExprId)) {
            match component {
                TestComponent::Operand(id) => f(*id),
                TestComponent::Predicate { lhs, rhs, .. } => {
                    test_children(lhs, f);
                    test_children(rhs, f);
                }
            }
        }

        match self {
            ExprKind::That
            | ExprKind::It
            | ExprKind::Null
            | ExprKind::Integer(_)
            | ExprKind::Real(_)
            | ExprKind::String(_)
            | ExprKind::Variable(_)
            | ExprKind::Type(_)
            | ExprKind::Constant(_)
            | ExprKind::Resource(_)
            | ExprKind::Use(_) => {}
            ExprKind::Sequence(items) | ExprKind::List(items) => items.iter().copied().for_each(f),
            ExprKind::Record(entries) => {
                for (key, value) in entries {
                    f(*key);
                    f(*value);
                }
            }
            ExprKind::Specifier(spec) => {
                if let Some(parent) = spec.parent {
                    f(parent);
                }
                match &spec.kind {
                    SpecifierKind::Simple(d)
                    | SpecifierKind::Index(d)
                    | SpecifierKind::Name(d)
                    | SpecifierKind::Id(d) => f(*d),
                    SpecifierKind::Range { from, thru } => {
                        f(*from);
                        f(*thru);
                    }
                    SpecifierKind::Test(component) => test_children(component, &mut f),
                    _ => {}
                }
            }
            ExprKind::Insertion { parent, .. } => {
                if let Some(parent) = parent {
                    f(*parent);
                }
            }
            ExprKind::Reference(operand)
            | ExprKind::Get(operand)
            | ExprKind::Prefix { operand, .. }
            | ExprKind::Raise(operand) => f(*operand),
            ExprKind::Command { arguments, .. } => {
                arguments.iter().for_each(|(_, value)| f(*value));
            }
            ExprKind::Infix { lhs, rhs, .. } => {
                f(*lhs);
                f(*rhs);
            }
            ExprKind::Let { initial, .. } | ExprKind::Return(initial) => {
                if let Some(initial) = initial {
                    f(*initial);
                }
            }
            ExprKind::Set { target: a, value: b }
            | ExprKind::Try { body: a, handle: b }
            | ExprKind::RepeatWhile { condition: a, body: b }
            | ExprKind::RepeatTimes { times: a, body: b }
            | ExprKind::RepeatFor {
                container: a,
                body: b,
                ..
            }
            | ExprKind::Tell { target: a, body: b } => {
                f(*a);
                f(*b);
            }
            ExprKind::If {
                condition,
                then,
                otherwise,
            } => {
                f(*condition);
                f(*then);
                if let Some(otherwise) = otherwise {
                    f(*otherwise);
                }
            }
            ExprKind::Function {
                parameters, body, ..
            } => {
                parameters.iter().filter_map(|p| p.type_).for_each(&mut f);
                f(*body);
            }
            ExprKind::Block { body, .. } => f(*body),
        }
    }
}
