//! Built-in commands: `get`, `set`, `run`, `delay` and `log`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bushel_ir::builtin_terms::Parameters;

use crate::dispatch::{Arguments, Function, Implementation};
use crate::errors::{ErrorKind, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Evaluate a query or insertion location; other values come back as-is.
pub(super) fn get(interpreter: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    match arguments.direct_or_target().clone() {
        Value::Specifier(specifier) => interpreter.evaluate_specifier(&specifier),
        Value::Insertion(insertion) => interpreter.evaluate_insertion(&insertion),
        other => Ok(other),
    }
}

pub(super) fn set(interpreter: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let Value::Specifier(specifier) = arguments.param(Parameters::Direct)?.clone() else {
        return Err(ErrorKind::NonPropertyIsNotWritable {
            specifier: arguments.direct_or_target().to_string(),
        }
        .into());
    };
    let value = arguments.param(Parameters::SetTo)?.clone();
    interpreter.set_property(&specifier, value)
}

/// `run` sent to a function: its direct argument becomes the function's
/// arguments.
pub(super) fn run_target(interpreter: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let Value::Function(function) = arguments.target().clone() else {
        return Ok(Value::Null);
    };
    run(interpreter, &function, arguments.get(&Parameters::Direct.id()).cloned())
}

/// `run <function>` with no arguments.
pub(super) fn run_direct(interpreter: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let Value::Function(function) = arguments.param(Parameters::Direct)?.clone() else {
        return Ok(Value::Null);
    };
    run(interpreter, &function, None)
}

fn run(
    interpreter: &mut Interpreter<'_>,
    function: &Arc<Function>,
    input: Option<Value>,
) -> EvalResult {
    let mut call = Arguments::new(function.signature.command.clone());
    match (&function.implementation, input) {
        (_, None) => {}
        (Implementation::Block(_) | Implementation::Native(_), Some(input)) => {
            call.insert(Parameters::Direct.id(), input);
        }
        (Implementation::Script(_), Some(input)) => {
            // Script functions take their arguments from a record keyed by
            // parameter, or the direct argument otherwise.
            match &input {
                Value::Record(record) => {
                    for (key, value) in record.entries() {
                        if let Value::Property(parameter) = key {
                            call.insert(parameter.clone(), value.clone());
                        }
                    }
                }
                _ => call.insert(Parameters::Direct.id(), input),
            }
        }
    }
    interpreter.call_function(function, &call)
}

/// Sleep for the direct argument in seconds (default 1), waking every
/// slice to honour termination.
pub(super) fn delay(interpreter: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let seconds = match arguments.get(&Parameters::Direct.id()) {
        None | Some(Value::Null) => 1.0,
        Some(_) => arguments.number(&Parameters::Direct.id())?,
    };
    let total = Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX);
    let slice = interpreter.runtime().config.delay_slice;
    let deadline = Instant::now().checked_add(total);
    loop {
        interpreter.check_termination()?;
        let remaining = match deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => slice,
        };
        if remaining.is_zero() {
            return Ok(Value::Null);
        }
        std::thread::sleep(remaining.min(slice));
    }
}

pub(super) fn log(interpreter: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let message = arguments.direct_or_target().to_text();
    interpreter.runtime().output.line(&message);
    Ok(Value::Null)
}
