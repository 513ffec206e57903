//! Property and element access.
//!
//! Objects that hold other objects implement [`Container`]. Most element
//! forms have default implementations on top of [`Container::elements`],
//! so a container only needs to enumerate its elements of a class and
//! report its properties. Indexes are 1-based; negative indexes count from
//! the end.

use bushel_ir::builtin_terms::{Properties, Types};
use bushel_ir::TermId;
use rand::Rng;

use super::{term_display_name, GlobalScope, Record, Value};
use crate::errors::ErrorKind;
use crate::reflection::TypeTree;

/// Absolute positions within a container.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Position {
    First,
    Middle,
    Last,
    Random,
}

/// Map a 1-based (or negative, from-the-end) index onto `0..len`.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let magnitude = usize::try_from(index.unsigned_abs()).ok()?;
    match index {
        i if i > 0 && magnitude <= len => Some(magnitude - 1),
        i if i < 0 && magnitude <= len => Some(len - magnitude),
        _ => None,
    }
}

fn has_property(element: &Value, property: Properties, expected: &Value) -> bool {
    match element {
        Value::Record(record) => record
            .property(&property.id())
            .is_some_and(|value| value.equals(expected)),
        _ => false,
    }
}

pub trait Container {
    /// Short description for error messages.
    fn describe(&self) -> String;

    fn property(&self, _property: &TermId) -> Option<Value> {
        None
    }

    /// Every element of `class`, in order.
    fn elements(&self, class: &TermId, _types: &TypeTree) -> Result<Vec<Value>, ErrorKind> {
        Err(self.unsupported("every", class))
    }

    fn unsupported(&self, form: &'static str, class: &TermId) -> ErrorKind {
        ErrorKind::UnsupportedIndexForm {
            container: self.describe(),
            form,
            class: term_display_name(class),
        }
    }

    fn element_at(&self, class: &TermId, index: i64, types: &TypeTree) -> Result<Value, ErrorKind> {
        let elements = self.elements(class, types)?;
        resolve_index(index, elements.len())
            .map(|i| elements[i].clone())
            .ok_or_else(|| ErrorKind::IndexOutOfBounds {
                index,
                container: self.describe(),
            })
    }

    fn element_named(&self, class: &TermId, name: &str, types: &TypeTree) -> Result<Value, ErrorKind> {
        let wanted = Value::from(name);
        self.elements(class, types)?
            .into_iter()
            .find(|element| has_property(element, Properties::Name, &wanted))
            .ok_or_else(|| ErrorKind::NoElementExists {
                specifier: format!("{} named \"{name}\" of {}", term_display_name(class), self.describe()),
            })
    }

    fn element_with_id(&self, class: &TermId, id: &Value, types: &TypeTree) -> Result<Value, ErrorKind> {
        self.elements(class, types)?
            .into_iter()
            .find(|element| has_property(element, Properties::Id, id))
            .ok_or_else(|| ErrorKind::NoElementExists {
                specifier: format!("{} id {id} of {}", term_display_name(class), self.describe()),
            })
    }

    fn element_positioned(
        &self,
        class: &TermId,
        position: Position,
        types: &TypeTree,
    ) -> Result<Value, ErrorKind> {
        let elements = self.elements(class, types)?;
        if elements.is_empty() {
            return Err(ErrorKind::NoElementExists {
                specifier: format!("{position:?} {} of {}", term_display_name(class), self.describe())
                    .to_lowercase(),
            });
        }
        let last = elements.len() - 1;
        let index = match position {
            Position::First => 0,
            Position::Middle => last / 2,
            Position::Last => last,
            Position::Random => rand::thread_rng().gen_range(0..=last),
        };
        Ok(elements[index].clone())
    }

    fn elements_in_range(
        &self,
        class: &TermId,
        from: i64,
        thru: i64,
        types: &TypeTree,
    ) -> Result<Vec<Value>, ErrorKind> {
        let elements = self.elements(class, types)?;
        let (Some(a), Some(b)) = (
            resolve_index(from, elements.len()),
            resolve_index(thru, elements.len()),
        ) else {
            return Err(ErrorKind::RangeOutOfBounds {
                from,
                thru,
                container: self.describe(),
            });
        };
        Ok(elements[a.min(b)..=a.max(b)].to_vec())
    }
}

/// Lists: elements filtered by class.
struct ListView<'a>(&'a [Value]);

impl Container for ListView<'_> {
    fn describe(&self) -> String {
        Value::list(self.0.to_vec()).to_string()
    }

    fn property(&self, property: &TermId) -> Option<Value> {
        let items = self.0;
        match Properties::from_id(property)? {
            Properties::Length => Some(Value::Integer(i64::try_from(items.len()).ok()?)),
            Properties::Reverse => Some(Value::list(items.iter().rev().cloned().collect::<Vec<_>>())),
            Properties::Rest => Some(Value::list(items.get(1..).unwrap_or_default().to_vec())),
            _ => None,
        }
    }

    fn elements(&self, class: &TermId, types: &TypeTree) -> Result<Vec<Value>, ErrorKind> {
        Ok(self
            .0
            .iter()
            .filter(|item| types.is_a(&item.type_id(), class))
            .cloned()
            .collect())
    }
}

/// Strings: elements are characters.
struct TextView<'a>(&'a str);

impl Container for TextView<'_> {
    fn describe(&self) -> String {
        format!("\"{}\"", self.0)
    }

    fn property(&self, property: &TermId) -> Option<Value> {
        if Properties::Length.is(property) {
            return Some(Value::Integer(i64::try_from(self.0.chars().count()).ok()?));
        }
        None
    }

    fn elements(&self, class: &TermId, _types: &TypeTree) -> Result<Vec<Value>, ErrorKind> {
        if !(Types::Item.is(class) || Types::String.is(class)) {
            return Err(self.unsupported("every", class));
        }
        Ok(self
            .0
            .chars()
            .map(|c| Value::string(c.to_string()))
            .collect())
    }
}

impl Container for Record {
    fn describe(&self) -> String {
        Value::record(self.clone()).to_string()
    }

    fn property(&self, property: &TermId) -> Option<Value> {
        if let Some(value) = Record::property(self, property) {
            return Some(value.clone());
        }
        if Properties::Length.is(property) {
            return Some(Value::Integer(i64::try_from(self.len()).ok()?));
        }
        None
    }
}

impl Container for GlobalScope {
    fn describe(&self) -> String {
        "global scope".to_owned()
    }

    fn property(&self, property: &TermId) -> Option<Value> {
        GlobalScope::get(self, property)
    }
}

/// Run `f` against `value`'s container view, if it has one.
pub fn with_container<R>(
    value: &Value,
    globals: &GlobalScope,
    f: impl FnOnce(&dyn Container) -> R,
) -> Option<R> {
    match value {
        Value::List(items) => Some(f(&ListView(items))),
        Value::String(text) => Some(f(&TextView(text))),
        Value::Record(record) => Some(f(&**record)),
        Value::Global => Some(f(globals)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_positive_and_negative_indexes() {
        assert_eq!(resolve_index(1, 3), Some(0));
        assert_eq!(resolve_index(3, 3), Some(2));
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(-3, 3), Some(0));
        assert_eq!(resolve_index(0, 3), None);
        assert_eq!(resolve_index(4, 3), None);
        assert_eq!(resolve_index(-4, 3), None);
    }

    #[test]
    fn extreme_indexes_are_out_of_bounds() {
        assert_eq!(resolve_index(i64::MIN, 3), None);
        assert_eq!(resolve_index(i64::MAX, 3), None);
        assert_eq!(resolve_index(i64::MIN + 1, 3), None);
    }
}
