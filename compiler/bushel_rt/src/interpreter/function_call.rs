//! Function invocation.

use std::sync::Arc;

use bushel_ir::builtin_terms::{Parameters, Types};
use bushel_ir::{ExprId, SharedArena};

use super::Interpreter;
use crate::context::Frame;
use crate::dispatch::{Arguments, Function, Implementation};
use crate::errors::{ControlAction, ErrorKind, EvalResult};
use crate::value::Value;

impl Interpreter<'_> {
    /// Call `function` with `arguments`.
    ///
    /// Script functions bind each declared parameter to the argument of the
    /// same identity. The first declared parameter falls back to the direct
    /// argument when the caller did not name it. Blocks bind the items of
    /// the direct argument positionally.
    #[tracing::instrument(level = "debug", skip_all, fields(function = %function))]
    pub fn call_function(&mut self, function: &Arc<Function>, arguments: &Arguments) -> EvalResult {
        match &function.implementation {
            Implementation::Native(native) => native(self, arguments),
            Implementation::Script(script) => {
                let first = function.signature.first_parameter().map(|(parameter, _)| parameter);
                let direct = Parameters::Direct.id();
                let mut frame = Frame::new();
                for (parameter, variable) in &script.bindings {
                    let value = arguments.get(parameter).or_else(|| {
                        (first == Some(parameter))
                            .then(|| arguments.get(&direct))
                            .flatten()
                    });
                    frame.bind(variable.clone(), value.cloned().unwrap_or(Value::Null));
                }
                self.enter_function(frame, Arc::clone(&script.arena), script.body)
            }
            Implementation::Block(block) => {
                let items = match arguments.get(&Parameters::Direct.id()) {
                    None => Vec::new(),
                    Some(Value::List(items)) => items.to_vec(),
                    Some(other) => match other.coerce(&Types::List.id(), &self.rt.types) {
                        Some(Value::List(items)) => items.to_vec(),
                        _ => vec![other.clone()],
                    },
                };
                let mut frame = Frame::new();
                for (index, variable) in block.variables.iter().enumerate() {
                    frame.bind(variable.clone(), items.get(index).cloned().unwrap_or(Value::Null));
                }
                self.enter_function(frame, Arc::clone(&block.arena), block.body)
            }
        }
    }

    /// Evaluate a function body in a fresh frame; `return` stops here.
    ///
    /// Errors escaping a body that belongs to another program point at the
    /// call site.
    fn enter_function(&mut self, frame: Frame, arena: SharedArena, body: ExprId) -> EvalResult {
        self.check_call_depth()?;
        let foreign = !Arc::ptr_eq(&self.arena, &arena);
        let call_site = self.context.current_location();
        let mut scoped = self.with_call_frame(frame, arena);
        match scoped.eval(body) {
            Err(ControlAction::Return(value)) => Ok(value),
            Err(action) if foreign => Err(action.relocated(call_site)),
            other => other,
        }
    }

    fn check_call_depth(&self) -> Result<(), ErrorKind> {
        match self.rt.config.max_call_depth {
            Some(limit) if self.call_depth >= limit => {
                Err(ErrorKind::RecursionLimitExceeded { limit })
            }
            _ => Ok(()),
        }
    }
}
