//! Operator overloads.
//!
//! Operators reach the core module as ordinary commands with `left` and
//! `right` (or `direct`) arguments, so a script or library can shadow any
//! of them by defining a function for the same command higher on the
//! module stack.

use bushel_ir::builtin_terms::{Commands, Parameters};
use bushel_ir::BinaryOp;

use crate::dispatch::Arguments;
use crate::errors::{ErrorKind, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{term_display_name, test_comparison, Value};

fn operands(arguments: &Arguments) -> Result<(&Value, &Value), ErrorKind> {
    Ok((arguments.param(Parameters::Lhs)?, arguments.param(Parameters::Rhs)?))
}

fn reals(arguments: &Arguments) -> Result<(f64, f64), ErrorKind> {
    Ok((
        arguments.number(&Parameters::Lhs.id())?,
        arguments.number(&Parameters::Rhs.id())?,
    ))
}

fn integers(arguments: &Arguments) -> Result<(i64, i64), ErrorKind> {
    let (lhs, rhs) = operands(arguments)?;
    match (lhs.as_integer(), rhs.as_integer()) {
        (Some(lhs), Some(rhs)) => Ok((lhs, rhs)),
        _ => Err(ErrorKind::WrongParameterType {
            command: term_display_name(&arguments.command),
            parameter: Parameters::Lhs.name().to_owned(),
            expected: "integer".to_owned(),
            actual: term_display_name(&lhs.type_id()),
        }),
    }
}

/// The operator a comparison command was dispatched for.
fn comparison_for(arguments: &Arguments) -> Option<BinaryOp> {
    Some(match Commands::from_id(&arguments.command)? {
        Commands::Equal => BinaryOp::Equal,
        Commands::NotEqual => BinaryOp::NotEqual,
        Commands::Less => BinaryOp::Less,
        Commands::LessEqual => BinaryOp::LessEqual,
        Commands::Greater => BinaryOp::Greater,
        Commands::GreaterEqual => BinaryOp::GreaterEqual,
        Commands::StartsWith => BinaryOp::StartsWith,
        Commands::EndsWith => BinaryOp::EndsWith,
        Commands::Contains => BinaryOp::Contains,
        _ => return None,
    })
}

pub(super) fn not(_: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    Ok(Value::Boolean(!arguments.param(Parameters::Direct)?.truthy()))
}

pub(super) fn negate_integer(_: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let operand = arguments.param(Parameters::Direct)?;
    Ok(match operand.as_integer().and_then(i64::checked_neg) {
        Some(negated) => Value::Integer(negated),
        None => Value::Real(-operand.as_real().unwrap_or_default()),
    })
}

pub(super) fn negate_real(_: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    Ok(Value::Real(-arguments.number(&Parameters::Direct.id())?))
}

pub(super) fn logical(_: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let (lhs, rhs) = operands(arguments)?;
    let (lhs, rhs) = (lhs.truthy(), rhs.truthy());
    Ok(Value::Boolean(match Commands::from_id(&arguments.command) {
        Some(Commands::And) => lhs && rhs,
        Some(Commands::Or) => lhs || rhs,
        _ => lhs != rhs,
    }))
}

/// `=`, `≠`, ordering and the string/list containment tests.
///
/// Operands that cannot be ordered compare false.
pub(super) fn compare(_: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let (lhs, rhs) = operands(arguments)?;
    let op = comparison_for(arguments).unwrap_or(BinaryOp::Equal);
    Ok(Value::Boolean(test_comparison(op, lhs, rhs)))
}

/// `does not contain`, `is in` and `is not in`, dispatched back through
/// `contains` so user overloads of `contains` apply to them too.
pub(super) fn derived_containment(interpreter: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let (lhs, rhs) = operands(arguments)?;
    let command = Commands::from_id(&arguments.command);
    let (container, element) = match command {
        Some(Commands::NotContains) => (lhs, rhs),
        _ => (rhs, lhs),
    };
    let contains = interpreter.run_command(
        Arguments::new(Commands::Contains.id())
            .with(Parameters::Lhs.id(), container.clone())
            .with(Parameters::Rhs.id(), element.clone()),
    )?;
    let negated = matches!(command, Some(Commands::NotContains | Commands::NotContainedBy));
    Ok(Value::Boolean(contains.truthy() != negated))
}

pub(super) fn is_a(interpreter: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let (lhs, rhs) = operands(arguments)?;
    let Value::Type(ty) = rhs else {
        return Err(ErrorKind::TypeObjectRequired {
            value: rhs.to_string(),
        }
        .into());
    };
    let is = interpreter.runtime().types.is_a(&lhs.type_id(), ty);
    Ok(Value::Boolean(is != Commands::IsNotA.is(&arguments.command)))
}

pub(super) fn coerce(interpreter: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let (lhs, rhs) = operands(arguments)?;
    let Value::Type(ty) = rhs else {
        return Err(ErrorKind::TypeObjectRequired {
            value: rhs.to_string(),
        }
        .into());
    };
    lhs.coerce(ty, &interpreter.runtime().types).ok_or_else(|| {
        ErrorKind::Uncoercible {
            value: lhs.to_string(),
            type_name: interpreter.runtime().term_name(ty),
        }
        .into()
    })
}

/// `+ - *` on two integers; overflow falls back to real arithmetic.
pub(super) fn integer_arithmetic(interpreter: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let (lhs, rhs) = integers(arguments)?;
    let exact = match Commands::from_id(&arguments.command) {
        Some(Commands::Add) => lhs.checked_add(rhs),
        Some(Commands::Subtract) => lhs.checked_sub(rhs),
        Some(Commands::Multiply) => lhs.checked_mul(rhs),
        _ => None,
    };
    match exact {
        Some(result) => Ok(Value::Integer(result)),
        None => real_arithmetic(interpreter, arguments),
    }
}

/// `+ - * /` with at least one real operand; `/` always lands here.
pub(super) fn real_arithmetic(_: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let (lhs, rhs) = reals(arguments)?;
    Ok(Value::Real(match Commands::from_id(&arguments.command) {
        Some(Commands::Add) => lhs + rhs,
        Some(Commands::Subtract) => lhs - rhs,
        Some(Commands::Multiply) => lhs * rhs,
        _ => lhs / rhs,
    }))
}

pub(super) fn concatenate_text(_: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let (lhs, rhs) = operands(arguments)?;
    Ok(Value::string(format!("{}{}", lhs.to_text(), rhs.to_text())))
}

/// List concatenation; a non-list operand joins as a single item.
pub(super) fn concatenate_list(_: &mut Interpreter<'_>, arguments: &Arguments) -> EvalResult {
    let (lhs, rhs) = operands(arguments)?;
    let items = |value: &Value| match value {
        Value::List(items) => items.to_vec(),
        other => vec![other.clone()],
    };
    let mut joined = items(lhs);
    joined.extend(items(rhs));
    Ok(Value::from(joined))
}
