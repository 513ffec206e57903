//! Execution context: the three stacks threaded through evaluation.
//!
//! Variables live in frames (only the top frame is visible), command
//! handlers are searched down the module stack, and `it` is the top of the
//! target stack. Every stack has a bottom entry that is never popped.

use bushel_ir::{SourceLocation, TermId};
use rustc_hash::FxHashMap;

use crate::value::Value;

/// A stack whose bottom entry always exists.
#[derive(Clone, Debug)]
pub struct Stack<T> {
    bottom: T,
    above: Vec<T>,
}

impl<T> Stack<T> {
    pub fn new(bottom: T) -> Self {
        Stack {
            bottom,
            above: Vec::new(),
        }
    }

    #[inline]
    pub fn push(&mut self, item: T) {
        self.above.push(item);
    }

    /// Pop the top entry. The bottom entry stays; popping it yields `None`.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.above.pop()
    }

    #[inline]
    pub fn top(&self) -> &T {
        self.above.last().unwrap_or(&self.bottom)
    }

    #[inline]
    pub fn top_mut(&mut self) -> &mut T {
        self.above.last_mut().unwrap_or(&mut self.bottom)
    }

    pub fn bottom(&self) -> &T {
        &self.bottom
    }

    /// Number of entries, counting the bottom.
    pub fn depth(&self) -> usize {
        self.above.len() + 1
    }

    /// Pop entries until `depth` remain.
    pub fn truncate(&mut self, depth: usize) {
        self.above.truncate(depth.saturating_sub(1));
    }

    /// Entries from the top down, ending with the bottom.
    pub fn iter_top_down(&self) -> impl Iterator<Item = &T> {
        self.above.iter().rev().chain(std::iter::once(&self.bottom))
    }
}

/// Variable cells of one function activation.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    variables: FxHashMap<TermId, Value>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a fresh cell, shadowing any previous binding.
    #[inline]
    pub fn bind(&mut self, variable: TermId, value: Value) {
        self.variables.insert(variable, value);
    }

    /// Assign to a variable, creating it if needed.
    #[inline]
    pub fn assign(&mut self, variable: &TermId, value: Value) {
        match self.variables.get_mut(variable) {
            Some(cell) => *cell = value,
            None => {
                self.variables.insert(variable.clone(), value);
            }
        }
    }

    #[inline]
    pub fn lookup(&self, variable: &TermId) -> Option<&Value> {
        self.variables.get(variable)
    }
}

/// Per-run evaluation state.
#[derive(Debug)]
pub struct Context {
    pub frames: Stack<Frame>,
    pub modules: Stack<Value>,
    pub targets: Stack<Value>,
    /// Source locations of the nodes being evaluated, innermost last.
    pub locations: Vec<SourceLocation>,
}

impl Context {
    /// A context whose module stack bottoms out at `core` and whose target
    /// stack bottoms out at the global scope.
    pub fn new(core: Value) -> Self {
        Context {
            frames: Stack::new(Frame::new()),
            modules: Stack::new(core),
            targets: Stack::new(Value::Global),
            locations: Vec::new(),
        }
    }

    /// Current implicit receiver (`it`).
    #[inline]
    pub fn target(&self) -> &Value {
        self.targets.top()
    }

    pub fn current_location(&self) -> Option<SourceLocation> {
        self.locations.last().copied()
    }

    pub fn lookup_variable(&self, variable: &TermId) -> Option<&Value> {
        self.frames.top().lookup(variable)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
