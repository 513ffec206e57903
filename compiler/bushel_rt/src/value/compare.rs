//! Equality, ordering and containment.

use std::cmp::Ordering;
use std::sync::Arc;

use bushel_ir::{BinaryOp, SpecifierKind};

use super::{Specifier, Value};

fn specifier_data(kind: &SpecifierKind<Value, Arc<super::TestSpecifier>>) -> Vec<&Value> {
    match kind {
        SpecifierKind::Simple(d)
        | SpecifierKind::Index(d)
        | SpecifierKind::Name(d)
        | SpecifierKind::Id(d) => vec![d],
        SpecifierKind::Range { from, thru } => vec![from, thru],
        SpecifierKind::Test(test) => vec![&test.lhs, &test.rhs],
        _ => Vec::new(),
    }
}

fn test_op(kind: &SpecifierKind<Value, Arc<super::TestSpecifier>>) -> Option<BinaryOp> {
    match kind {
        SpecifierKind::Test(test) => Some(test.op),
        _ => None,
    }
}

fn same_query(a: &Specifier, b: &Specifier) -> bool {
    a.term == b.term
        && a.kind.form_name() == b.kind.form_name()
        && test_op(&a.kind) == test_op(&b.kind)
        && specifier_data(&a.kind)
            .into_iter()
            .zip(specifier_data(&b.kind))
            .all(|(x, y)| x.equals(y))
        && a.parent.equals(&b.parent)
}

fn is_subsequence(haystack: &[Value], needle: &[Value]) -> bool {
    needle.is_empty()
        || haystack
            .windows(needle.len())
            .any(|window| window.iter().zip(needle).all(|(a, b)| a.equals(b)))
}

impl Value {
    /// Script-level `=`: numbers compare by value across integer and real.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Global, Value::Global) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Integer(_) | Value::Real(_), Value::Integer(_) | Value::Real(_)) => {
                self.as_real() == other.as_real()
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Record(a), Value::Record(b)) => {
                a.len() == b.len()
                    && a
                        .entries()
                        .iter()
                        .all(|(key, value)| b.get(key).is_some_and(|other| value.equals(other)))
            }
            (Value::Type(a), Value::Type(b))
            | (Value::Constant(a), Value::Constant(b))
            | (Value::Property(a), Value::Property(b)) => a == b,
            (Value::Specifier(a), Value::Specifier(b)) => Arc::ptr_eq(a, b) || same_query(a, b),
            (Value::Root(a), Value::Root(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => a == b,
            (Value::Application(a), Value::Application(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Ordering for `<`, `≤`, `>`, `≥`; `None` when incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Integer(_) | Value::Real(_), Value::Integer(_) | Value::Real(_)) => {
                self.as_real()?.partial_cmp(&other.as_real()?)
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// `contains`: substring, list membership, or contiguous sublist.
    pub fn contains(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::String(haystack), Value::String(needle)) => Some(haystack.contains(&**needle)),
            (Value::List(haystack), Value::List(needle)) => Some(is_subsequence(haystack, needle)),
            (Value::List(haystack), item) => Some(haystack.iter().any(|x| x.equals(item))),
            (Value::Record(haystack), Value::Record(needle)) => Some(
                needle
                    .entries()
                    .iter()
                    .all(|(k, v)| haystack.get(k).is_some_and(|x| x.equals(v))),
            ),
            _ => None,
        }
    }

    pub fn starts_with(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::String(s), Value::String(prefix)) => Some(s.starts_with(&**prefix)),
            (Value::List(items), Value::List(prefix)) => Some(
                items.len() >= prefix.len()
                    && items.iter().zip(prefix.iter()).all(|(a, b)| a.equals(b)),
            ),
            (Value::List(items), item) => Some(items.first().is_some_and(|x| x.equals(item))),
            _ => None,
        }
    }

    pub fn ends_with(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::String(s), Value::String(suffix)) => Some(s.ends_with(&**suffix)),
            (Value::List(items), Value::List(suffix)) => Some(
                items.len() >= suffix.len()
                    && items
                        .iter()
                        .rev()
                        .zip(suffix.iter().rev())
                        .all(|(a, b)| a.equals(b)),
            ),
            (Value::List(items), item) => Some(items.last().is_some_and(|x| x.equals(item))),
            _ => None,
        }
    }
}

/// Apply a comparison operator of a `whose` clause to resolved operands.
///
/// Incomparable operands never match.
pub fn test_comparison(op: BinaryOp, lhs: &Value, rhs: &Value) -> bool {
    let ordered = |accept: fn(Ordering) -> bool| lhs.compare(rhs).is_some_and(accept);
    match op {
        BinaryOp::Equal => lhs.equals(rhs),
        BinaryOp::NotEqual => !lhs.equals(rhs),
        BinaryOp::Less => ordered(Ordering::is_lt),
        BinaryOp::LessEqual => ordered(Ordering::is_le),
        BinaryOp::Greater => ordered(Ordering::is_gt),
        BinaryOp::GreaterEqual => ordered(Ordering::is_ge),
        BinaryOp::StartsWith => lhs.starts_with(rhs).unwrap_or(false),
        BinaryOp::EndsWith => lhs.ends_with(rhs).unwrap_or(false),
        BinaryOp::Contains => lhs.contains(rhs).unwrap_or(false),
        BinaryOp::NotContains => !lhs.contains(rhs).unwrap_or(false),
        BinaryOp::ContainedBy => rhs.contains(lhs).unwrap_or(false),
        BinaryOp::NotContainedBy => !rhs.contains(lhs).unwrap_or(false),
        _ => false,
    }
}
