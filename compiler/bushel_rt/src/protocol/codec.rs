//! Conversion between runtime values and the wire model.

use std::sync::Arc;

use bushel_ir::{SemanticAddress, SpecifierKind, SyntacticRole, TermId};

use super::{
    WireContainer, WireOrdinal, WireQuery, WireRelative, WireRoot, WireSelector, WireTest,
    WireValue,
};
use crate::errors::ErrorKind;
use crate::value::{
    Application, InsertionSpecifier, Record, RootKind, Specifier, TestSpecifier, Value,
};

fn unencodable(value: &Value) -> ErrorKind {
    ErrorKind::Unencodable {
        value: value.to_string(),
    }
}

/// The code address of a term, if it has one.
fn code_of(id: &TermId, owner: &Value) -> Result<SemanticAddress, ErrorKind> {
    if id.address.is_code() {
        Ok(id.address.clone())
    } else {
        Err(unencodable(owner))
    }
}

pub fn encode(value: &Value) -> Result<WireValue, ErrorKind> {
    Ok(match value {
        Value::Null => WireValue::Null,
        Value::Boolean(b) => WireValue::Boolean(*b),
        Value::Integer(i) => WireValue::Integer(*i),
        Value::Real(r) => WireValue::Real(*r),
        Value::String(s) => WireValue::Text(s.to_string()),
        Value::List(items) => WireValue::List(items.iter().map(encode).collect::<Result<_, _>>()?),
        Value::Record(record) => {
            let mut entries = Vec::with_capacity(record.len());
            for (key, item) in record.entries() {
                let Value::Property(property) = key else {
                    return Err(unencodable(value));
                };
                entries.push((code_of(property, value)?, encode(item)?));
            }
            WireValue::Record(entries)
        }
        Value::Type(id) => WireValue::Type(code_of(id, value)?),
        Value::Constant(id) => WireValue::Enum(code_of(id, value)?),
        Value::Property(id) => WireValue::Property(code_of(id, value)?),
        Value::Specifier(specifier) => WireValue::Query(Box::new(encode_query(specifier)?)),
        Value::Insertion(insertion) => WireValue::Insertion {
            container: encode_container(&insertion.parent)?,
            position: insertion.kind,
        },
        Value::Application(application) => WireValue::Application((**application).clone()),
        Value::Test(_)
        | Value::Root(_)
        | Value::Function(_)
        | Value::Module(_)
        | Value::Global
        | Value::Error(_) => return Err(unencodable(value)),
    })
}

fn encode_container(parent: &Value) -> Result<WireContainer, ErrorKind> {
    Ok(match parent {
        Value::Specifier(specifier) => WireContainer::Query(Box::new(encode_query(specifier)?)),
        Value::Root(RootKind::Application) | Value::Application(_) => {
            WireContainer::Root(WireRoot::Application)
        }
        Value::Root(RootKind::Container) => WireContainer::Root(WireRoot::Container),
        Value::Root(RootKind::Specimen) => WireContainer::Root(WireRoot::Specimen),
        other => WireContainer::Value(Box::new(encode(other)?)),
    })
}

/// Encode a whole query chain, root first.
pub fn encode_query(specifier: &Specifier) -> Result<WireQuery, ErrorKind> {
    let owner = || Value::Specifier(Arc::new(specifier.clone()));
    let key = if specifier.term.address.is_code() {
        specifier.term.address.clone()
    } else {
        return Err(unencodable(&owner()));
    };
    let selector = match &specifier.kind {
        SpecifierKind::Property => WireSelector::Property,
        SpecifierKind::Simple(datum @ Value::String(_)) | SpecifierKind::Name(datum) => {
            WireSelector::Name(encode(datum)?)
        }
        SpecifierKind::Simple(datum) | SpecifierKind::Index(datum) => {
            WireSelector::Index(encode(datum)?)
        }
        SpecifierKind::Id(datum) => WireSelector::Id(encode(datum)?),
        SpecifierKind::All => WireSelector::Ordinal(WireOrdinal::All),
        SpecifierKind::First => WireSelector::Ordinal(WireOrdinal::First),
        SpecifierKind::Middle => WireSelector::Ordinal(WireOrdinal::Middle),
        SpecifierKind::Last => WireSelector::Ordinal(WireOrdinal::Last),
        SpecifierKind::Random => WireSelector::Ordinal(WireOrdinal::Random),
        SpecifierKind::Previous => WireSelector::Relative(WireRelative::Previous),
        SpecifierKind::Next => WireSelector::Relative(WireRelative::Next),
        SpecifierKind::Range { from, thru } => WireSelector::Range {
            from: encode(from)?,
            thru: encode(thru)?,
        },
        SpecifierKind::Test(test) => WireSelector::Test(encode_test(test)?),
    };
    Ok(WireQuery {
        container: encode_container(&specifier.parent)?,
        key,
        selector,
    })
}

fn encode_test(test: &TestSpecifier) -> Result<WireTest, ErrorKind> {
    if !test.op.is_logical() {
        return Ok(WireTest::Comparison {
            op: test.op,
            lhs: encode(&test.lhs)?,
            rhs: encode(&test.rhs)?,
        });
    }
    let operand = |value: &Value| match value {
        Value::Test(inner) => encode_test(inner),
        other => Err(unencodable(other)),
    };
    Ok(WireTest::Logical {
        op: test.op,
        operands: vec![operand(&test.lhs)?, operand(&test.rhs)?],
    })
}

/// Decode a reply value; query roots become `application`.
pub fn decode(wire: &WireValue, application: &Application) -> Value {
    match wire {
        WireValue::Null => Value::Null,
        WireValue::Boolean(b) => Value::Boolean(*b),
        WireValue::Integer(i) => Value::Integer(*i),
        WireValue::Real(r) => Value::Real(*r),
        WireValue::Text(s) => Value::string(s.as_str()),
        WireValue::List(items) => Value::list(
            items
                .iter()
                .map(|item| decode(item, application))
                .collect::<Vec<_>>(),
        ),
        WireValue::Record(entries) => Value::record(
            entries
                .iter()
                .map(|(key, item)| {
                    (
                        Value::Property(TermId::new(SyntacticRole::Property, key.clone())),
                        decode(item, application),
                    )
                })
                .collect::<Record>(),
        ),
        WireValue::Type(a) => Value::Type(TermId::new(SyntacticRole::Type, a.clone())),
        WireValue::Enum(a) => Value::Constant(TermId::new(SyntacticRole::Constant, a.clone())),
        WireValue::Property(a) => Value::Property(TermId::new(SyntacticRole::Property, a.clone())),
        WireValue::Query(query) => Value::specifier(decode_query(query, application)),
        WireValue::Insertion {
            container,
            position,
        } => Value::Insertion(Arc::new(InsertionSpecifier {
            parent: decode_container(container, application),
            kind: *position,
        })),
        WireValue::Application(app) => Value::application(app.clone()),
    }
}

fn decode_container(container: &WireContainer, application: &Application) -> Value {
    match container {
        WireContainer::Root(WireRoot::Application) => Value::application(application.clone()),
        WireContainer::Root(WireRoot::Container) => Value::Root(RootKind::Container),
        WireContainer::Root(WireRoot::Specimen) => Value::Root(RootKind::Specimen),
        WireContainer::Query(query) => Value::specifier(decode_query(query, application)),
        WireContainer::Value(value) => decode(value, application),
    }
}

fn decode_query(query: &WireQuery, application: &Application) -> Specifier {
    let data = |value: &WireValue| decode(value, application);
    let (role, kind) = match &query.selector {
        WireSelector::Property => (SyntacticRole::Property, SpecifierKind::Property),
        WireSelector::Index(v) => (SyntacticRole::Type, SpecifierKind::Index(data(v))),
        WireSelector::Name(v) => (SyntacticRole::Type, SpecifierKind::Name(data(v))),
        WireSelector::Id(v) => (SyntacticRole::Type, SpecifierKind::Id(data(v))),
        WireSelector::Ordinal(ordinal) => (
            SyntacticRole::Type,
            match ordinal {
                WireOrdinal::First => SpecifierKind::First,
                WireOrdinal::Middle => SpecifierKind::Middle,
                WireOrdinal::Last => SpecifierKind::Last,
                WireOrdinal::Random => SpecifierKind::Random,
                WireOrdinal::All => SpecifierKind::All,
            },
        ),
        WireSelector::Relative(WireRelative::Previous) => {
            (SyntacticRole::Type, SpecifierKind::Previous)
        }
        WireSelector::Relative(WireRelative::Next) => (SyntacticRole::Type, SpecifierKind::Next),
        WireSelector::Range { from, thru } => (
            SyntacticRole::Type,
            SpecifierKind::Range {
                from: data(from),
                thru: data(thru),
            },
        ),
        WireSelector::Test(test) => (
            SyntacticRole::Type,
            SpecifierKind::Test(Arc::new(decode_test(test, application))),
        ),
    };
    Specifier::new(
        decode_container(&query.container, application),
        TermId::new(role, query.key.clone()),
        kind,
    )
}

fn decode_test(test: &WireTest, application: &Application) -> TestSpecifier {
    match test {
        WireTest::Comparison { op, lhs, rhs } => {
            TestSpecifier::new(*op, decode(lhs, application), decode(rhs, application))
        }
        WireTest::Logical { op, operands } => {
            let mut operands = operands.iter().map(|operand| decode_test(operand, application));
            let Some(first) = operands.next() else {
                return TestSpecifier::new(bushel_ir::BinaryOp::Equal, Value::Null, Value::Null);
            };
            operands.fold(first, |lhs, rhs| {
                TestSpecifier::new(*op, Value::Test(Arc::new(lhs)), Value::Test(Arc::new(rhs)))
            })
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use bushel_ir::builtin_terms::{Properties, Types};
    use bushel_ir::BinaryOp;
    use pretty_assertions::assert_eq;

    use super::*;

    fn finder() -> Application {
        Application::Named("Finder".to_owned())
    }

    fn window_one() -> Specifier {
        Specifier::new(
            Value::Root(RootKind::Application),
            TermId::new(SyntacticRole::Type, SemanticAddress::code(*b"cwin")),
            SpecifierKind::Index(Value::Integer(1)),
        )
    }

    #[test]
    fn encodes_a_chain_root_first() {
        let name = Specifier::property(Value::specifier(window_one()), Properties::Name.id());
        let query = encode_query(&name).unwrap();
        assert_eq!(query.key, SemanticAddress::code(*b"pnam"));
        assert_eq!(query.selector, WireSelector::Property);
        let WireContainer::Query(parent) = &query.container else {
            panic!("expected a nested query");
        };
        assert_eq!(parent.selector, WireSelector::Index(WireValue::Integer(1)));
        assert_eq!(parent.container, WireContainer::Root(WireRoot::Application));
    }

    #[test]
    fn pathname_terms_are_unencodable() {
        let local = Specifier::property(Value::Root(RootKind::Application), TermId::property("mine"));
        assert!(matches!(encode_query(&local), Err(ErrorKind::Unencodable { .. })));
        assert!(matches!(
            encode(&Value::Type(Types::Function.id())),
            Err(ErrorKind::Unencodable { .. })
        ));
        assert!(matches!(encode(&Value::Global), Err(ErrorKind::Unencodable { .. })));
    }

    #[test]
    fn simple_selectors_pick_name_or_index_by_datum() {
        let mut spec = window_one();
        spec.kind = SpecifierKind::Simple(Value::from("Desktop"));
        let query = encode_query(&spec).unwrap();
        assert_eq!(query.selector, WireSelector::Name(WireValue::Text("Desktop".to_owned())));
    }

    #[test]
    fn logical_tests_nest() {
        let specimen_name = Value::specifier(Specifier::property(
            Value::Root(RootKind::Specimen),
            Properties::Name.id(),
        ));
        let a = TestSpecifier::new(BinaryOp::Equal, specimen_name.clone(), Value::from("a"));
        let b = TestSpecifier::new(BinaryOp::Equal, specimen_name, Value::from("b"));
        let either = TestSpecifier::new(BinaryOp::Or, Value::Test(Arc::new(a)), Value::Test(Arc::new(b)));
        let WireTest::Logical { op, operands } = encode_test(&either).unwrap() else {
            panic!("expected a logical test");
        };
        assert_eq!(op, BinaryOp::Or);
        assert_eq!(operands.len(), 2);
    }

    #[test]
    fn decoded_queries_are_rooted_at_the_application() {
        let wire = WireValue::Query(Box::new(encode_query(&window_one()).unwrap()));
        let value = decode(&wire, &finder());
        let Value::Specifier(spec) = value else {
            panic!("expected a specifier");
        };
        assert!(matches!(spec.root_ancestor(), Value::Application(app) if **app == finder()));
        assert!(matches!(spec.kind, SpecifierKind::Index(Value::Integer(1))));
    }

    #[test]
    fn records_use_property_codes() {
        let record: Record = [(Value::Property(Properties::Name.id()), Value::from("x"))]
            .into_iter()
            .collect();
        let wire = encode(&Value::record(record)).unwrap();
        assert_eq!(
            wire,
            WireValue::Record(vec![(SemanticAddress::code(*b"pnam"), WireValue::Text("x".to_owned()))])
        );
        let back = decode(&wire, &finder());
        let Value::Record(record) = back else {
            panic!("expected a record");
        };
        assert!(record.property(&Properties::Name.id()).unwrap().equals(&Value::from("x")));
    }
}
