//! Expression arena.

use std::ops::Index;
use std::sync::Arc;

use crate::ast::{Expr, ExprId, ExprKind};
use crate::span::SourceLocation;

/// Contiguous storage for the nodes of one program.
#[derive(Clone, Default, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

/// An arena shared between a program and the functions it defines.
///
/// Function values outlive the evaluation that created them, so they hold
/// the arena their body lives in.
pub type SharedArena = Arc<ExprArena>;

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: ExprKind, location: SourceLocation) -> ExprId {
        let index = u32::try_from(self.exprs.len()).unwrap_or(u32::MAX);
        self.exprs.push(Expr { kind, location });
        ExprId::new(index)
    }

    #[inline]
    pub fn get(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// Find the first node that refers to an id outside the arena.
    ///
    /// Returns `(referrer, dangling)`.
    pub fn find_dangling(&self) -> Option<(ExprId, ExprId)> {
        let len = self.exprs.len();
        for (index, expr) in self.exprs.iter().enumerate() {
            let mut dangling = None;
            expr.kind.for_each_child(|child| {
                if dangling.is_none() && child.index() >= len {
                    dangling = Some(child);
                }
            });
            if let Some(child) = dangling {
                let referrer = ExprId::new(u32::try_from(index).unwrap_or(u32::MAX));
                return Some((referrer, child));
            }
        }
        None
    }
}

impl Index<ExprId> for ExprArena {
    type Output = Expr;

    #[inline]
    fn index(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }
}
