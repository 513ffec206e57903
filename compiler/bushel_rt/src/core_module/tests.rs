use bushel_ir::builtin_terms::{Commands, Parameters, Types};
use bushel_ir::{BinaryOp, ExprId, ProgramBuilder, UnaryOp};
use pretty_assertions::assert_eq;

use crate::errors::{ErrorKind, RunError};
use crate::output::{buffer_output, silent_output};
use crate::runtime::Runtime;
use crate::value::Value;

fn run(build: impl FnOnce(&mut ProgramBuilder) -> ExprId) -> Result<Value, RunError> {
    let mut b = ProgramBuilder::new("core");
    let root = build(&mut b);
    let program = b.finish(root).unwrap();
    Runtime::builder().output(silent_output()).build().run(&program)
}

fn binary(op: BinaryOp, lhs: impl Fn(&mut ProgramBuilder) -> ExprId, rhs: impl Fn(&mut ProgramBuilder) -> ExprId) -> Value {
    run(|b| {
        let lhs = lhs(b);
        let rhs = rhs(b);
        b.infix(op, lhs, rhs)
    })
    .unwrap()
}

fn int(value: i64) -> impl Fn(&mut ProgramBuilder) -> ExprId {
    move |b| b.integer(value)
}

fn real(value: f64) -> impl Fn(&mut ProgramBuilder) -> ExprId {
    move |b| b.real(value)
}

fn text(value: &'static str) -> impl Fn(&mut ProgramBuilder) -> ExprId {
    move |b| b.string(value)
}

fn ints(values: &'static [i64]) -> impl Fn(&mut ProgramBuilder) -> ExprId {
    move |b| b.integers(values)
}

fn ty(ty: Types) -> impl Fn(&mut ProgramBuilder) -> ExprId {
    move |b| b.type_(ty.id())
}

#[test]
fn integer_arithmetic_stays_integral() {
    assert!(matches!(binary(BinaryOp::Add, int(2), int(3)), Value::Integer(5)));
    assert!(matches!(binary(BinaryOp::Subtract, int(2), int(3)), Value::Integer(-1)));
    assert!(matches!(binary(BinaryOp::Multiply, int(4), int(3)), Value::Integer(12)));
}

#[test]
fn mixed_operands_use_real_arithmetic() {
    assert!(matches!(binary(BinaryOp::Add, int(2), real(0.5)), Value::Real(r) if r == 2.5));
    assert!(matches!(binary(BinaryOp::Multiply, real(1.5), int(2)), Value::Real(r) if r == 3.0));
}

#[test]
fn overflow_falls_back_to_real() {
    let sum = binary(BinaryOp::Add, int(i64::MAX), int(1));
    assert!(matches!(sum, Value::Real(_)));
}

#[test]
fn division_always_yields_real() {
    assert!(matches!(binary(BinaryOp::Divide, int(7), int(2)), Value::Real(r) if r == 3.5));
    assert!(matches!(binary(BinaryOp::Divide, int(4), int(2)), Value::Real(r) if r == 2.0));
}

#[test]
fn negation_and_not() {
    let negated = run(|b| {
        let five = b.integer(5);
        b.prefix(UnaryOp::Negate, five)
    })
    .unwrap();
    assert!(matches!(negated, Value::Integer(-5)));

    let not = run(|b| {
        let empty = b.string("");
        b.prefix(UnaryOp::Not, empty)
    })
    .unwrap();
    assert!(matches!(not, Value::Boolean(true)));
}

#[test]
fn concatenation_prefers_lists_over_text() {
    assert_eq!(binary(BinaryOp::Concatenate, text("a"), int(1)).to_string(), "\"a1\"");
    assert_eq!(binary(BinaryOp::Concatenate, ints(&[1]), int(2)).to_string(), "{1, 2}");
    assert_eq!(binary(BinaryOp::Concatenate, ints(&[1]), ints(&[2, 3])).to_string(), "{1, 2, 3}");
    assert_eq!(binary(BinaryOp::Concatenate, text("a"), ints(&[1])).to_string(), "{\"a\", 1}");
}

#[test]
fn comparisons() {
    assert!(matches!(binary(BinaryOp::Less, int(1), real(1.5)), Value::Boolean(true)));
    assert!(matches!(binary(BinaryOp::Equal, int(2), real(2.0)), Value::Boolean(true)));
    assert!(matches!(binary(BinaryOp::NotEqual, text("a"), text("a")), Value::Boolean(false)));
    // Incomparable operands are never ordered.
    assert!(matches!(binary(BinaryOp::Less, text("a"), int(1)), Value::Boolean(false)));
    assert!(matches!(binary(BinaryOp::GreaterEqual, text("a"), int(1)), Value::Boolean(false)));
}

#[test]
fn containment_family_goes_through_contains() {
    assert!(matches!(binary(BinaryOp::Contains, ints(&[1, 2, 3]), int(2)), Value::Boolean(true)));
    assert!(matches!(binary(BinaryOp::StartsWith, text("bushel"), text("bush")), Value::Boolean(true)));
    assert!(matches!(binary(BinaryOp::ContainedBy, int(2), ints(&[1, 2])), Value::Boolean(true)));
    assert!(matches!(binary(BinaryOp::NotContainedBy, text("x"), text("abc")), Value::Boolean(true)));
    assert!(matches!(binary(BinaryOp::NotContains, ints(&[1]), int(1)), Value::Boolean(false)));
}

#[test]
fn contains_without_an_overload_is_not_handled() {
    let error = run(|b| {
        let lhs = b.integer(1);
        let rhs = b.integer(1);
        b.infix(BinaryOp::Contains, lhs, rhs)
    })
    .unwrap_err();
    assert!(matches!(error.kind(), Some(ErrorKind::CommandNotHandled { .. })));
}

#[test]
fn type_tests_follow_the_type_tree() {
    assert!(matches!(binary(BinaryOp::IsA, int(3), ty(Types::Real)), Value::Boolean(true)));
    assert!(matches!(binary(BinaryOp::IsA, int(3), ty(Types::String)), Value::Boolean(false)));
    assert!(matches!(binary(BinaryOp::IsNotA, text("a"), ty(Types::Number)), Value::Boolean(true)));
}

#[test]
fn coercion() {
    assert!(matches!(binary(BinaryOp::Coerce, text("12"), ty(Types::Integer)), Value::Integer(12)));
    assert_eq!(binary(BinaryOp::Coerce, int(7), ty(Types::List)).to_string(), "{7}");

    let uncoercible = run(|b| {
        let lhs = b.string("twelve");
        let rhs = b.type_(Types::Integer.id());
        b.infix(BinaryOp::Coerce, lhs, rhs)
    })
    .unwrap_err();
    assert_eq!(
        uncoercible.kind(),
        Some(&ErrorKind::Uncoercible {
            value: "\"twelve\"".to_owned(),
            type_name: "integer".to_owned(),
        })
    );

    let not_a_type = run(|b| {
        let lhs = b.integer(1);
        let rhs = b.integer(2);
        b.infix(BinaryOp::Coerce, lhs, rhs)
    })
    .unwrap_err();
    assert!(matches!(not_a_type.kind(), Some(ErrorKind::TypeObjectRequired { .. })));
}

#[test]
fn log_writes_through_the_output_handler() {
    let output = buffer_output();
    let mut b = ProgramBuilder::new("log");
    let message = b.string("hello");
    let number = b.integer(3);
    let first = b.command(Commands::Log.id(), vec![(Parameters::Direct.id(), message)]);
    let second = b.command(Commands::Log.id(), vec![(Parameters::Direct.id(), number)]);
    let root = b.sequence(vec![first, second]);
    let program = b.finish(root).unwrap();

    let mut runtime = Runtime::builder().output(output.clone()).build();
    runtime.run(&program).unwrap();
    assert_eq!(output.captured(), "hello\n3\n");
}

#[test]
fn short_delay_returns_null() {
    let value = run(|b| {
        let seconds = b.real(0.01);
        b.command(Commands::Delay.id(), vec![(Parameters::Direct.id(), seconds)])
    })
    .unwrap();
    assert!(value.is_null());
}
