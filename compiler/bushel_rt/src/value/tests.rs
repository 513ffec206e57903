use std::sync::Arc;

use bushel_ir::builtin_terms::{Properties, Types};
use bushel_ir::{BinaryOp, SpecifierKind, TermId};
use pretty_assertions::assert_eq;

use super::*;
use crate::errors::ErrorKind;
use crate::reflection::TypeTree;

fn ints(items: &[i64]) -> Value {
    Value::list(items.iter().copied().map(Value::Integer).collect::<Vec<_>>())
}

fn index_of(parent: Value, index: i64) -> Specifier {
    Specifier::new(parent, Types::Item.id(), SpecifierKind::Index(Value::Integer(index)))
}

#[test]
fn numbers_compare_across_integer_and_real() {
    assert!(Value::Integer(2).equals(&Value::Real(2.0)));
    assert!(!Value::Integer(2).equals(&Value::string("2")));
    assert_eq!(
        Value::Integer(1).compare(&Value::Real(1.5)),
        Some(std::cmp::Ordering::Less)
    );
    assert_eq!(Value::Integer(1).compare(&Value::string("a")), None);
}

#[test]
fn lists_and_records_compare_structurally() {
    assert!(ints(&[1, 2]).equals(&ints(&[1, 2])));
    assert!(!ints(&[1, 2]).equals(&ints(&[2, 1])));

    let name = Value::Property(Properties::Name.id());
    let a: Record = [(name.clone(), Value::from("x"))].into_iter().collect();
    let b: Record = [(name, Value::from("x"))].into_iter().collect();
    assert!(Value::record(a).equals(&Value::record(b)));
}

#[test]
fn record_equality_follows_script_equality() {
    let name = Value::Property(Properties::Name.id());
    let whole: Record = [(name.clone(), Value::Integer(2))].into_iter().collect();
    let real: Record = [(name.clone(), Value::Real(2.0))].into_iter().collect();
    let other: Record = [(name, Value::Integer(3))].into_iter().collect();
    assert!(Value::record(whole.clone()).equals(&Value::record(real)));
    assert!(!Value::record(whole).equals(&Value::record(other)));
}

#[test]
fn containment_family() {
    assert_eq!(ints(&[1, 2, 3]).contains(&Value::Integer(2)), Some(true));
    assert_eq!(ints(&[1, 2, 3]).contains(&ints(&[2, 3])), Some(true));
    assert_eq!(ints(&[1, 2, 3]).contains(&ints(&[1, 3])), Some(false));
    assert_eq!(Value::from("bushel").contains(&Value::from("shel")), Some(true));
    assert_eq!(Value::Integer(1).contains(&Value::Integer(1)), None);
    assert!(test_comparison(BinaryOp::ContainedBy, &Value::Integer(3), &ints(&[3])));
    assert!(test_comparison(BinaryOp::StartsWith, &Value::from("abc"), &Value::from("ab")));
    assert!(!test_comparison(BinaryOp::Less, &Value::Null, &Value::Integer(1)));
}

#[test]
fn coercions() {
    let types = TypeTree::builtin();
    let real = Value::Integer(3).coerce(&Types::Real.id(), &types).unwrap();
    assert!(matches!(real, Value::Real(r) if r == 3.0));
    assert!(matches!(
        Value::Real(4.0).coerce(&Types::Integer.id(), &types),
        Some(Value::Integer(4))
    ));
    assert!(Value::Real(4.5).coerce(&Types::Integer.id(), &types).is_none());
    assert!(matches!(
        Value::from(" 12 ").coerce(&Types::Integer.id(), &types),
        Some(Value::Integer(12))
    ));
    assert_eq!(
        Value::Integer(7).coerce(&Types::String.id(), &types).unwrap().to_text(),
        "7"
    );
    assert!(Value::from("x").coerce(&Types::Number.id(), &types).is_none());
    let list = Value::Integer(1).coerce(&Types::List.id(), &types).unwrap();
    assert!(list.equals(&ints(&[1])));
    assert!(Value::Null.coerce(&Types::Integer.id(), &types).is_none());
}

#[test]
fn truthiness() {
    assert!(!Value::Null.truthy());
    assert!(!Value::Integer(0).truthy());
    assert!(!Value::from("").truthy());
    assert!(ints(&[0]).truthy());
    assert!(Value::Type(Types::Item.id()).truthy());
}

#[test]
fn list_elements_are_one_based_and_negative_from_end() {
    let types = TypeTree::builtin();
    let globals = GlobalScope::new();
    let list = ints(&[10, 20, 30]);
    let item = Types::Item.id();

    let second = with_container(&list, &globals, |c| c.element_at(&item, 2, &types)).unwrap();
    assert!(second.unwrap().equals(&Value::Integer(20)));
    let last = with_container(&list, &globals, |c| c.element_at(&item, -1, &types)).unwrap();
    assert!(last.unwrap().equals(&Value::Integer(30)));

    for bad in [0, 4] {
        let err = with_container(&list, &globals, |c| c.element_at(&item, bad, &types))
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, ErrorKind::IndexOutOfBounds { index, .. } if index == bad));
    }
}

#[test]
fn list_elements_filter_by_class() {
    let types = TypeTree::builtin();
    let globals = GlobalScope::new();
    let mixed = Value::list(vec![Value::Integer(1), Value::from("a"), Value::Real(2.5)]);

    let numbers = with_container(&mixed, &globals, |c| c.elements(&Types::Number.id(), &types))
        .unwrap()
        .unwrap();
    assert_eq!(numbers.len(), 2);
    let strings = with_container(&mixed, &globals, |c| c.element_at(&Types::String.id(), 1, &types))
        .unwrap()
        .unwrap();
    assert!(strings.equals(&Value::from("a")));
}

#[test]
fn ranges_swap_reversed_bounds() {
    let types = TypeTree::builtin();
    let globals = GlobalScope::new();
    let list = ints(&[1, 2, 3, 4]);
    let item = Types::Item.id();

    let forward = with_container(&list, &globals, |c| c.elements_in_range(&item, 2, 3, &types))
        .unwrap()
        .unwrap();
    let backward = with_container(&list, &globals, |c| c.elements_in_range(&item, 3, 2, &types))
        .unwrap()
        .unwrap();
    assert!(Value::list(forward).equals(&ints(&[2, 3])));
    assert!(Value::list(backward).equals(&ints(&[2, 3])));

    let err = with_container(&list, &globals, |c| c.elements_in_range(&item, 1, 9, &types))
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, ErrorKind::RangeOutOfBounds { from: 1, thru: 9, .. }));
}

#[test]
fn positions() {
    let types = TypeTree::builtin();
    let globals = GlobalScope::new();
    let list = ints(&[1, 2, 3, 4]);
    let item = Types::Item.id();
    let at = |position| {
        with_container(&list, &globals, |c| c.element_positioned(&item, position, &types))
            .unwrap()
            .unwrap()
    };
    assert!(at(Position::First).equals(&Value::Integer(1)));
    assert!(at(Position::Middle).equals(&Value::Integer(2)));
    assert!(at(Position::Last).equals(&Value::Integer(4)));
    assert!(list.contains(&at(Position::Random)).unwrap());

    let empty = ints(&[]);
    let err = with_container(&empty, &globals, |c| c.element_positioned(&item, Position::First, &types))
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, ErrorKind::NoElementExists { .. }));
}

#[test]
fn text_and_record_properties() {
    let globals = GlobalScope::new();
    let length = Properties::Length.id();
    let text = Value::from("héllo");
    let len = with_container(&text, &globals, |c| c.property(&length)).unwrap();
    assert!(len.unwrap().equals(&Value::Integer(5)));

    let record: Record = [(Value::Property(Properties::Name.id()), Value::from("doc"))]
        .into_iter()
        .collect();
    let name = with_container(&Value::record(record), &globals, |c| {
        c.property(&Properties::Name.id())
    })
    .unwrap();
    assert!(name.unwrap().equals(&Value::from("doc")));
    assert!(with_container(&Value::Integer(1), &globals, |c| c.describe()).is_none());
}

#[test]
fn records_are_found_by_name_and_id() {
    let types = TypeTree::builtin();
    let globals = GlobalScope::new();
    let entry = |name: &str, id: i64| {
        Value::record(
            [
                (Value::Property(Properties::Name.id()), Value::from(name)),
                (Value::Property(Properties::Id.id()), Value::Integer(id)),
            ]
            .into_iter()
            .collect(),
        )
    };
    let list = Value::list(vec![entry("a", 1), entry("b", 2)]);
    let item = Types::Item.id();

    let named = with_container(&list, &globals, |c| c.element_named(&item, "b", &types))
        .unwrap()
        .unwrap();
    assert!(named.equals(&entry("b", 2)));
    let by_id = with_container(&list, &globals, |c| c.element_with_id(&item, &Value::Integer(1), &types))
        .unwrap()
        .unwrap();
    assert!(by_id.equals(&entry("a", 1)));
    let missing = with_container(&list, &globals, |c| c.element_named(&item, "z", &types))
        .unwrap()
        .unwrap_err();
    assert!(missing.is_missing_member());
}

#[test]
fn global_constants_are_read_only() {
    let mut globals = GlobalScope::new();
    assert!(matches!(globals.get(&Properties::Pi.id()), Some(Value::Real(_))));
    assert!(matches!(globals.get(&Properties::TopScript.id()), Some(Value::Null)));

    let err = globals.set(Properties::Pi.id(), Value::Integer(3)).unwrap_err();
    assert!(matches!(err, ErrorKind::NoWritablePropertyExists { .. }));

    let answer = TermId::property("answer");
    globals.set(answer.clone(), Value::Integer(42)).unwrap();
    assert!(globals.get(&answer).unwrap().equals(&Value::Integer(42)));
}

#[test]
fn rerooting_a_clone_leaves_the_original_untouched() {
    let original_root = ints(&[1, 2, 3]);
    let inner = Arc::new(index_of(original_root.clone(), 1));
    let outer = Arc::new(index_of(Value::Specifier(Arc::clone(&inner)), 2));

    let rerooted = outer.with_root(Value::Global);

    assert!(matches!(rerooted.root_ancestor(), Value::Global));
    assert!(outer.root_ancestor().equals(&original_root));
    assert!(inner.parent.equals(&original_root));
    let new_inner = rerooted.parent_specifier().unwrap();
    assert!(!Arc::ptr_eq(new_inner, &inner));
}

#[test]
fn qualifying_only_replaces_placeholder_roots() {
    let relative = Arc::new(index_of(Value::Root(RootKind::Container), 1));
    let target = ints(&[5]);
    let qualified = relative.qualified(&target);
    assert!(qualified.root_ancestor().equals(&target));
    assert!(matches!(relative.root_ancestor(), Value::Root(RootKind::Container)));

    let absolute = Arc::new(index_of(ints(&[9]), 1));
    assert!(Arc::ptr_eq(&absolute.qualified(&target), &absolute));
}

#[test]
fn qualifying_moves_container_roots_onto_the_specimen() {
    let relative = Arc::new(index_of(Value::Root(RootKind::Container), 1));
    let specimen = Value::Root(RootKind::Specimen);
    let qualified = relative.qualified(&specimen);
    assert!(matches!(qualified.root_ancestor(), Value::Root(RootKind::Specimen)));
    assert!(Arc::ptr_eq(&qualified.qualified(&specimen), &qualified));
}

#[test]
fn display_reads_like_source() {
    let spec = index_of(ints(&[1, 2]), 2);
    assert_eq!(spec.to_string(), "item 2 of {1, 2}");
    assert_eq!(Value::from("a").to_string(), "\"a\"");
    assert_eq!(Value::from("a").to_text(), "a");
    assert_eq!(Value::Real(2.0).to_string(), "2.0");
}

#[test]
fn whose_queries_differ_by_operator() {
    let name = Value::Property(Properties::Name.id());
    let whose = |op| {
        let test = TestSpecifier::new(op, name.clone(), Value::from("x"));
        Value::specifier(Specifier::new(
            ints(&[1]),
            Types::Item.id(),
            SpecifierKind::Test(Arc::new(test)),
        ))
    };
    assert!(whose(BinaryOp::Equal).equals(&whose(BinaryOp::Equal)));
    assert!(!whose(BinaryOp::Equal).equals(&whose(BinaryOp::NotEqual)));
}
