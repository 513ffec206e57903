//! Loaded programs.

use std::fmt;
use std::sync::Arc;

use crate::arena::{ExprArena, SharedArena};
use crate::ast::ExprId;
use crate::dictionary::TermDictionary;
use crate::span::SourceId;

/// A parsed program: its tree, root node and the terms it defines.
#[derive(Clone, Debug)]
pub struct Program {
    pub name: String,
    pub source: SourceId,
    pub arena: SharedArena,
    pub root: ExprId,
    pub terms: TermDictionary,
}

/// A program whose tree refers to nodes that do not exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalformedProgram {
    pub referrer: Option<ExprId>,
    pub missing: ExprId,
}

impl fmt::Display for MalformedProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.referrer {
            Some(referrer) => write!(
                f,
                "expression {} refers to missing expression {}",
                referrer.raw(),
                self.missing.raw()
            ),
            None => write!(f, "root expression {} does not exist", self.missing.raw()),
        }
    }
}

impl std::error::Error for MalformedProgram {}

impl Program {
    /// Build a program, checking that every node reference resolves.
    pub fn new(
        name: impl Into<String>,
        source: SourceId,
        arena: ExprArena,
        root: ExprId,
        terms: TermDictionary,
    ) -> Result<Self, MalformedProgram> {
        if arena.get(root).is_none() {
            return Err(MalformedProgram {
                referrer: None,
                missing: root,
            });
        }
        if let Some((referrer, missing)) = arena.find_dangling() {
            return Err(MalformedProgram {
                referrer: Some(referrer),
                missing,
            });
        }
        Ok(Program {
            name: name.into(),
            source,
            arena: Arc::new(arena),
            root,
            terms,
        })
    }
}

/// Serialized form of a [`Program`].
#[cfg(feature = "serde")]
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ProgramDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: SourceId,
    #[serde(default)]
    pub terms: TermDictionary,
    pub exprs: ExprArena,
    pub root: ExprId,
}

#[cfg(feature = "serde")]
impl ProgramDocument {
    pub fn into_program(self) -> Result<Program, MalformedProgram> {
        Program::new(self.name, self.source, self.exprs, self.root, self.terms)
    }
}

#[cfg(feature = "serde")]
impl From<&Program> for ProgramDocument {
    fn from(program: &Program) -> Self {
        ProgramDocument {
            name: program.name.clone(),
            source: program.source,
            terms: program.terms.clone(),
            exprs: (*program.arena).clone(),
            root: program.root,
        }
    }
}
