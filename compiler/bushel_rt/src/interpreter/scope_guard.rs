//! RAII guards for the context stacks.
//!
//! Each guard pushes onto one or more stacks when created and pops when
//! dropped, so `tell` blocks, `handle` blocks and function calls unwind
//! their pushes on every exit path: normal completion, errors, `return`
//! and termination alike.
//!
//! The guard holds `&mut Interpreter` and implements `Deref`/`DerefMut`,
//! so code inside the scope keeps calling interpreter methods directly:
//!
//! ```text
//! let mut scoped = interpreter.with_target(error);
//! scoped.eval(handler)?;
//! // target popped here
//! ```

use std::ops::{Deref, DerefMut};

use bushel_ir::SharedArena;

use super::Interpreter;
use crate::context::Frame;
use crate::value::Value;

/// What to undo when the guard drops.
enum Restore {
    /// Pop one target.
    Target,
    /// Pop the module and the target `tell` pushed.
    Tell,
    /// Pop a call frame and switch back to the caller's arena.
    Call {
        arena: SharedArena,
        last_result: Value,
    },
}

pub struct ScopedInterpreter<'guard, 'rt> {
    interpreter: &'guard mut Interpreter<'rt>,
    restore: Option<Restore>,
}

impl Drop for ScopedInterpreter<'_, '_> {
    fn drop(&mut self) {
        let context = &mut self.interpreter.context;
        match self.restore.take() {
            Some(Restore::Target) => {
                context.targets.pop();
            }
            Some(Restore::Tell) => {
                context.modules.pop();
                context.targets.pop();
            }
            Some(Restore::Call { arena, last_result }) => {
                context.frames.pop();
                self.interpreter.arena = arena;
                self.interpreter.last_result = last_result;
                self.interpreter.call_depth = self.interpreter.call_depth.saturating_sub(1);
            }
            None => {}
        }
    }
}

impl<'rt> Deref for ScopedInterpreter<'_, 'rt> {
    type Target = Interpreter<'rt>;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl<'rt> Interpreter<'rt> {
    /// Make `target` the implicit receiver (`it`) until the guard drops.
    pub fn with_target(&mut self, target: Value) -> ScopedInterpreter<'_, 'rt> {
        self.context.targets.push(target);
        ScopedInterpreter {
            interpreter: self,
            restore: Some(Restore::Target),
        }
    }

    /// Send commands to `target` first and make it `it`, until the guard
    /// drops.
    pub fn with_tell(&mut self, target: Value) -> ScopedInterpreter<'_, 'rt> {
        self.context.modules.push(target.clone());
        self.context.targets.push(target);
        ScopedInterpreter {
            interpreter: self,
            restore: Some(Restore::Tell),
        }
    }

    /// Enter a script function: a fresh frame, the callee's arena and its
    /// own `that`.
    pub(crate) fn with_call_frame(
        &mut self,
        frame: Frame,
        arena: SharedArena,
    ) -> ScopedInterpreter<'_, 'rt> {
        self.context.frames.push(frame);
        let arena = std::mem::replace(&mut self.arena, arena);
        let last_result = std::mem::replace(&mut self.last_result, Value::Null);
        self.call_depth += 1;
        ScopedInterpreter {
            interpreter: self,
            restore: Some(Restore::Call { arena, last_result }),
        }
    }
}
