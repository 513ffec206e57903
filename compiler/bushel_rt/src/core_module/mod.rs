//! The core module: built-in operators and commands.
//!
//! The core module sits at the bottom of every module stack, so anything a
//! script, library or remote target handles first shadows it. Each entry of
//! [`OVERLOADS`] becomes one native function; overloads of the same command
//! compete through ordinary overload resolution.

mod commands;
mod operators;

use std::sync::Arc;

use bushel_ir::builtin_terms::{Commands, Parameters, Types};

use crate::dispatch::{Function, FunctionSet, NativeFn, Signature};

type Overload = (Commands, &'static [(Parameters, Types)], NativeFn);

const DIRECT_ITEM: &[(Parameters, Types)] = &[(Parameters::Direct, Types::Item)];
const ITEM_ITEM: &[(Parameters, Types)] = &[(Parameters::Lhs, Types::Item), (Parameters::Rhs, Types::Item)];
const INT_INT: &[(Parameters, Types)] = &[(Parameters::Lhs, Types::Integer), (Parameters::Rhs, Types::Integer)];
const INT_REAL: &[(Parameters, Types)] = &[(Parameters::Lhs, Types::Integer), (Parameters::Rhs, Types::Real)];
const REAL_INT: &[(Parameters, Types)] = &[(Parameters::Lhs, Types::Real), (Parameters::Rhs, Types::Integer)];
const REAL_REAL: &[(Parameters, Types)] = &[(Parameters::Lhs, Types::Real), (Parameters::Rhs, Types::Real)];
const STR_STR: &[(Parameters, Types)] = &[(Parameters::Lhs, Types::String), (Parameters::Rhs, Types::String)];
const STR_ITEM: &[(Parameters, Types)] = &[(Parameters::Lhs, Types::String), (Parameters::Rhs, Types::Item)];
const ITEM_STR: &[(Parameters, Types)] = &[(Parameters::Lhs, Types::Item), (Parameters::Rhs, Types::String)];
const LIST_LIST: &[(Parameters, Types)] = &[(Parameters::Lhs, Types::List), (Parameters::Rhs, Types::List)];
const LIST_ITEM: &[(Parameters, Types)] = &[(Parameters::Lhs, Types::List), (Parameters::Rhs, Types::Item)];
const ITEM_LIST: &[(Parameters, Types)] = &[(Parameters::Lhs, Types::Item), (Parameters::Rhs, Types::List)];

/// Every built-in overload, in registration order.
///
/// Order matters only for exact ties: the later entry wins, which is why
/// the list concatenations follow the string ones.
const OVERLOADS: &[Overload] = &[
    (Commands::Not, DIRECT_ITEM, operators::not),
    (Commands::Negate, &[(Parameters::Direct, Types::Real)], operators::negate_real),
    (Commands::Negate, &[(Parameters::Direct, Types::Integer)], operators::negate_integer),
    (Commands::And, ITEM_ITEM, operators::logical),
    (Commands::Or, ITEM_ITEM, operators::logical),
    (Commands::Xor, ITEM_ITEM, operators::logical),
    (Commands::Equal, ITEM_ITEM, operators::compare),
    (Commands::NotEqual, ITEM_ITEM, operators::compare),
    (Commands::Less, ITEM_ITEM, operators::compare),
    (Commands::LessEqual, ITEM_ITEM, operators::compare),
    (Commands::Greater, ITEM_ITEM, operators::compare),
    (Commands::GreaterEqual, ITEM_ITEM, operators::compare),
    (Commands::StartsWith, STR_STR, operators::compare),
    (Commands::StartsWith, LIST_ITEM, operators::compare),
    (Commands::EndsWith, STR_STR, operators::compare),
    (Commands::EndsWith, LIST_ITEM, operators::compare),
    (Commands::Contains, STR_STR, operators::compare),
    (Commands::Contains, LIST_ITEM, operators::compare),
    (Commands::NotContains, ITEM_ITEM, operators::derived_containment),
    (Commands::ContainedBy, ITEM_ITEM, operators::derived_containment),
    (Commands::NotContainedBy, ITEM_ITEM, operators::derived_containment),
    (Commands::IsA, ITEM_ITEM, operators::is_a),
    (Commands::IsNotA, ITEM_ITEM, operators::is_a),
    (Commands::Coerce, ITEM_ITEM, operators::coerce),
    (Commands::Add, REAL_REAL, operators::real_arithmetic),
    (Commands::Add, INT_REAL, operators::real_arithmetic),
    (Commands::Add, REAL_INT, operators::real_arithmetic),
    (Commands::Add, INT_INT, operators::integer_arithmetic),
    (Commands::Subtract, REAL_REAL, operators::real_arithmetic),
    (Commands::Subtract, INT_REAL, operators::real_arithmetic),
    (Commands::Subtract, REAL_INT, operators::real_arithmetic),
    (Commands::Subtract, INT_INT, operators::integer_arithmetic),
    (Commands::Multiply, REAL_REAL, operators::real_arithmetic),
    (Commands::Multiply, INT_REAL, operators::real_arithmetic),
    (Commands::Multiply, REAL_INT, operators::real_arithmetic),
    (Commands::Multiply, INT_INT, operators::integer_arithmetic),
    (Commands::Divide, REAL_REAL, operators::real_arithmetic),
    (Commands::Divide, INT_REAL, operators::real_arithmetic),
    (Commands::Divide, REAL_INT, operators::real_arithmetic),
    (Commands::Divide, INT_INT, operators::real_arithmetic),
    (Commands::Concatenate, STR_STR, operators::concatenate_text),
    (Commands::Concatenate, STR_ITEM, operators::concatenate_text),
    (Commands::Concatenate, ITEM_STR, operators::concatenate_text),
    (Commands::Concatenate, LIST_LIST, operators::concatenate_list),
    (Commands::Concatenate, LIST_ITEM, operators::concatenate_list),
    (Commands::Concatenate, ITEM_LIST, operators::concatenate_list),
    (Commands::Get, DIRECT_ITEM, commands::get),
    (
        Commands::Set,
        &[(Parameters::Direct, Types::Item), (Parameters::SetTo, Types::Item)],
        commands::set,
    ),
    (Commands::Run, &[(Parameters::Direct, Types::Function)], commands::run_direct),
    (
        Commands::Run,
        &[(Parameters::Target, Types::Function), (Parameters::Direct, Types::Item)],
        commands::run_target,
    ),
    (Commands::Delay, &[(Parameters::Direct, Types::Number)], commands::delay),
    (Commands::Log, DIRECT_ITEM, commands::log),
];

/// Register the built-in overloads into `functions`.
pub(crate) fn install(functions: &mut FunctionSet) {
    for (command, parameters, native) in OVERLOADS {
        let signature = parameters
            .iter()
            .fold(Signature::new(command.id()), |signature, (parameter, ty)| {
                signature.with_parameter(parameter.id(), ty.id())
            });
        functions.add(Arc::new(Function::native(signature, *native)));
    }
    tracing::debug!(functions = functions.len(), "installed core module");
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
