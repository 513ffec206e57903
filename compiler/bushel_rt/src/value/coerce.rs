//! `as` conversions and truthiness.

use bushel_ir::builtin_terms::Types;
use bushel_ir::TermId;

use super::Value;
use crate::reflection::TypeTree;

fn integral(real: f64) -> Option<i64> {
    #[expect(clippy::cast_possible_truncation, reason = "checked by the round trip")]
    let truncated = real as i64;
    #[expect(clippy::cast_precision_loss, reason = "checked by the round trip")]
    let exact = truncated as f64 == real;
    (real.is_finite() && exact).then_some(truncated)
}

fn parse_number(text: &str) -> Option<Value> {
    let text = text.trim();
    text.parse::<i64>()
        .map(Value::Integer)
        .ok()
        .or_else(|| text.parse::<f64>().ok().map(Value::Real))
}

impl Value {
    /// Condition value in `if` and `repeat while`.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Real(r) => *r != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            _ => true,
        }
    }

    /// String form used by `as string` and `log`: strings unquoted.
    pub fn to_text(&self) -> String {
        match self {
            Value::String(s) => s.to_string(),
            other => other.to_string(),
        }
    }

    /// Integer datum, accepting reals without a fractional part.
    pub fn as_index(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(r) => integral(*r),
            _ => None,
        }
    }

    /// Convert to type `to`, or `None` when no conversion exists.
    pub fn coerce(&self, to: &TermId, types: &TypeTree) -> Option<Value> {
        if Types::Real.is(to) && matches!(self, Value::Integer(_)) {
            return self.as_real().map(Value::Real);
        }
        if types.is_a(&self.type_id(), to) {
            return Some(self.clone());
        }
        match Types::from_id(to)? {
            Types::Boolean => Some(Value::Boolean(self.truthy())),
            Types::String => Some(Value::string(self.to_text())),
            Types::Integer => match self {
                Value::Real(r) => integral(*r).map(Value::Integer),
                Value::String(s) => match parse_number(s)? {
                    Value::Real(r) => integral(r).map(Value::Integer),
                    integer => Some(integer),
                },
                _ => None,
            },
            Types::Real => match self {
                Value::String(s) => parse_number(s)?.as_real().map(Value::Real),
                other => other.as_real().map(Value::Real),
            },
            Types::Number => match self {
                Value::String(s) => parse_number(s),
                _ => None,
            },
            Types::List => Some(Value::list(vec![self.clone()])),
            _ => None,
        }
    }
}
