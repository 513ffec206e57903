//! Programmatic construction of expression trees.
//!
//! Hosts that embed the runtime without a parser, and tests, assemble
//! programs here. Every node gets the builder's current location; move it
//! with [`ProgramBuilder::at`].

use crate::arena::ExprArena;
use crate::ast::{
    BinaryOp, ExprId, ExprKind, FunctionParameter, InsertionKind, SpecifierExpr, SpecifierKind,
    TestComponent, UnaryOp,
};
use crate::builtin_terms::builtin_dictionary;
use crate::dictionary::TermDictionary;
use crate::program::{MalformedProgram, Program};
use crate::span::{SourceId, SourceLocation, Span};
use crate::term::Term;
use crate::term_id::TermId;

pub struct ProgramBuilder {
    name: String,
    source: SourceId,
    arena: ExprArena,
    terms: TermDictionary,
    location: SourceLocation,
}

impl ProgramBuilder {
    /// Start a program whose dictionary holds the built-in terms.
    pub fn new(name: impl Into<String>) -> Self {
        ProgramBuilder {
            name: name.into(),
            source: SourceId::MAIN,
            arena: ExprArena::new(),
            terms: builtin_dictionary(),
            location: SourceLocation::DUMMY,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: SourceId) -> Self {
        self.source = source;
        self.location.source = source;
        self
    }

    /// Locate subsequent nodes at `start..end`.
    pub fn at(&mut self, start: u32, end: u32) -> &mut Self {
        self.location = SourceLocation::new(self.source, Span::new(start, end));
        self
    }

    pub fn terms(&self) -> &TermDictionary {
        &self.terms
    }

    /// Add a term to the program's dictionary.
    pub fn define(&mut self, term: Term) -> TermId {
        let id = term.id.clone();
        self.terms.add(term);
        id
    }

    /// Define a variable term named `name`.
    pub fn variable_term(&mut self, name: &str) -> TermId {
        self.define(Term::named(TermId::variable(name), name))
    }

    pub fn finish(self, root: ExprId) -> Result<Program, MalformedProgram> {
        Program::new(self.name, self.source, self.arena, root, self.terms)
    }

    pub fn push(&mut self, kind: ExprKind) -> ExprId {
        self.arena.alloc(kind, self.location)
    }

    pub fn sequence(&mut self, items: Vec<ExprId>) -> ExprId {
        self.push(ExprKind::Sequence(items))
    }

    pub fn that(&mut self) -> ExprId {
        self.push(ExprKind::That)
    }

    pub fn it(&mut self) -> ExprId {
        self.push(ExprKind::It)
    }

    pub fn null(&mut self) -> ExprId {
        self.push(ExprKind::Null)
    }

    pub fn integer(&mut self, value: i64) -> ExprId {
        self.push(ExprKind::Integer(value))
    }

    pub fn real(&mut self, value: f64) -> ExprId {
        self.push(ExprKind::Real(value))
    }

    pub fn string(&mut self, value: &str) -> ExprId {
        self.push(ExprKind::String(value.to_owned()))
    }

    pub fn list(&mut self, items: Vec<ExprId>) -> ExprId {
        self.push(ExprKind::List(items))
    }

    pub fn integers(&mut self, values: &[i64]) -> ExprId {
        let items = values.iter().map(|&v| self.integer(v)).collect();
        self.list(items)
    }

    pub fn record(&mut self, entries: Vec<(ExprId, ExprId)>) -> ExprId {
        self.push(ExprKind::Record(entries))
    }

    pub fn variable(&mut self, id: &TermId) -> ExprId {
        self.push(ExprKind::Variable(id.clone()))
    }

    pub fn type_(&mut self, id: TermId) -> ExprId {
        self.push(ExprKind::Type(id))
    }

    pub fn constant(&mut self, id: TermId) -> ExprId {
        self.push(ExprKind::Constant(id))
    }

    pub fn resource(&mut self, id: TermId) -> ExprId {
        self.push(ExprKind::Resource(id))
    }

    pub fn use_(&mut self, id: TermId) -> ExprId {
        self.push(ExprKind::Use(id))
    }

    pub fn specifier(
        &mut self,
        parent: Option<ExprId>,
        term: TermId,
        kind: SpecifierKind<ExprId, TestComponent>,
    ) -> ExprId {
        self.push(ExprKind::Specifier(SpecifierExpr { parent, term, kind }))
    }

    pub fn property(&mut self, parent: Option<ExprId>, property: TermId) -> ExprId {
        self.specifier(parent, property, SpecifierKind::Property)
    }

    /// `<class> <index> of <parent>`.
    pub fn index(&mut self, parent: Option<ExprId>, class: TermId, index: i64) -> ExprId {
        let datum = self.integer(index);
        self.specifier(parent, class, SpecifierKind::Index(datum))
    }

    pub fn insertion(&mut self, parent: Option<ExprId>, kind: InsertionKind) -> ExprId {
        self.push(ExprKind::Insertion { parent, kind })
    }

    pub fn reference(&mut self, operand: ExprId) -> ExprId {
        self.push(ExprKind::Reference(operand))
    }

    pub fn get(&mut self, operand: ExprId) -> ExprId {
        self.push(ExprKind::Get(operand))
    }

    pub fn command(&mut self, command: TermId, arguments: Vec<(TermId, ExprId)>) -> ExprId {
        self.push(ExprKind::Command { command, arguments })
    }

    pub fn prefix(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.push(ExprKind::Prefix { op, operand })
    }

    pub fn infix(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.push(ExprKind::Infix { op, lhs, rhs })
    }

    pub fn let_(&mut self, variable: &TermId, initial: Option<ExprId>) -> ExprId {
        self.push(ExprKind::Let {
            variable: variable.clone(),
            initial,
        })
    }

    pub fn set(&mut self, target: ExprId, value: ExprId) -> ExprId {
        self.push(ExprKind::Set { target, value })
    }

    pub fn return_(&mut self, value: Option<ExprId>) -> ExprId {
        self.push(ExprKind::Return(value))
    }

    pub fn raise(&mut self, error: ExprId) -> ExprId {
        self.push(ExprKind::Raise(error))
    }

    pub fn try_(&mut self, body: ExprId, handle: ExprId) -> ExprId {
        self.push(ExprKind::Try { body, handle })
    }

    pub fn if_(&mut self, condition: ExprId, then: ExprId, otherwise: Option<ExprId>) -> ExprId {
        self.push(ExprKind::If {
            condition,
            then,
            otherwise,
        })
    }

    pub fn repeat_while(&mut self, condition: ExprId, body: ExprId) -> ExprId {
        self.push(ExprKind::RepeatWhile { condition, body })
    }

    pub fn repeat_times(&mut self, times: ExprId, body: ExprId) -> ExprId {
        self.push(ExprKind::RepeatTimes { times, body })
    }

    pub fn repeat_for(&mut self, variable: &TermId, container: ExprId, body: ExprId) -> ExprId {
        self.push(ExprKind::RepeatFor {
            variable: variable.clone(),
            container,
            body,
        })
    }

    pub fn tell(&mut self, target: ExprId, body: ExprId) -> ExprId {
        self.push(ExprKind::Tell { target, body })
    }

    pub fn function(
        &mut self,
        name: TermId,
        parameters: Vec<FunctionParameter>,
        body: ExprId,
    ) -> ExprId {
        self.push(ExprKind::Function {
            name,
            parameters,
            body,
        })
    }

    pub fn block(&mut self, arguments: Vec<TermId>, body: ExprId) -> ExprId {
        self.push(ExprKind::Block { arguments, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin_terms::Types;
    use pretty_assertions::assert_eq;

    #[test]
    fn nodes_carry_current_location() {
        let mut b = ProgramBuilder::new("test").with_source(SourceId::new(3));
        let first = b.integer(1);
        let second = b.at(4, 9).integer(2);
        let root = b.sequence(vec![first, second]);
        let program = b.finish(root).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(program.arena[first].location.span, Span::DUMMY);
        assert_eq!(program.arena[second].location.span, Span::new(4, 9));
        assert_eq!(program.arena[second].location.source, SourceId::new(3));
    }

    #[test]
    fn dangling_references_are_rejected() {
        let mut b = ProgramBuilder::new("broken");
        let root = b.list(vec![ExprId::new(41)]);
        let error = b.finish(root).err();
        assert_eq!(
            error,
            Some(MalformedProgram {
                referrer: Some(root),
                missing: ExprId::new(41)
            })
        );
    }

    #[test]
    fn index_shorthand_builds_index_specifier() {
        let mut b = ProgramBuilder::new("spec");
        let root = b.index(None, Types::Item.id(), 2);
        let program = b.finish(root).unwrap_or_else(|e| panic!("{e}"));
        match &program.arena[root].kind {
            ExprKind::Specifier(spec) => {
                assert!(spec.parent.is_none());
                assert!(matches!(spec.kind, SpecifierKind::Index(_)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
