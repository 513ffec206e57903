//! Bushel IR - terms, dictionaries and the expression tree
//!
//! This crate contains the load-time data structures of BushelScript:
//! - Semantic addresses and term identities
//! - Terms and term dictionaries with deterministic conflict resolution
//! - Well-known built-in terms
//! - Source locations
//! - The expression tree, stored flat in an arena
//!
//! Everything here is immutable once a program is loaded, apart from
//! dictionary merges while terminology is imported.

mod address;
mod arena;
pub mod ast;
pub mod builder;
pub mod builtin_terms;
mod dictionary;
mod program;
mod span;
mod term;
mod term_id;
mod term_name;

pub use address::{AddressParseError, Code, Pathname, SemanticAddress};
pub use arena::{ExprArena, SharedArena};
pub use ast::{
    BinaryOp, Expr, ExprId, ExprKind, FunctionParameter, InsertionKind, SpecifierExpr,
    SpecifierKind, TestComponent, UnaryOp,
};
pub use builder::ProgramBuilder;
pub use dictionary::TermDictionary;
#[cfg(feature = "serde")]
pub use program::ProgramDocument;
pub use program::{MalformedProgram, Program};
pub use span::{SourceId, SourceLocation, Span};
pub use term::{Resource, Term};
pub use term_id::{SyntacticRole, TermId};
pub use term_name::TermName;
