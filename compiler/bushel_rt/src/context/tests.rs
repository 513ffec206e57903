use bushel_ir::TermId;

use super::*;

#[test]
fn bottom_is_never_popped() {
    let mut stack = Stack::new(0);
    stack.push(1);
    assert_eq!(*stack.top(), 1);
    assert_eq!(stack.pop(), Some(1));
    assert_eq!(stack.pop(), None);
    assert_eq!(*stack.top(), 0);
    assert_eq!(stack.depth(), 1);
}

#[test]
fn truncate_keeps_bottom() {
    let mut stack = Stack::new("core");
    stack.push("a");
    stack.push("b");
    stack.push("c");
    stack.truncate(2);
    assert_eq!(*stack.top(), "a");
    stack.truncate(0);
    assert_eq!(*stack.top(), "core");
    assert_eq!(stack.iter_top_down().count(), 1);
}

#[test]
fn iterates_top_down() {
    let mut stack = Stack::new(1);
    stack.push(2);
    stack.push(3);
    assert_eq!(stack.iter_top_down().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
}

#[test]
fn only_the_top_frame_is_visible() {
    let x = TermId::variable("x");
    let mut context = Context::new(Value::Null);
    context.frames.top_mut().bind(x.clone(), Value::Integer(1));

    context.frames.push(Frame::new());
    assert!(context.lookup_variable(&x).is_none());
    context.frames.top_mut().bind(x.clone(), Value::Integer(2));
    assert!(context.lookup_variable(&x).unwrap().equals(&Value::Integer(2)));

    context.frames.pop();
    assert!(context.lookup_variable(&x).unwrap().equals(&Value::Integer(1)));
}

#[test]
fn assign_updates_or_creates() {
    let y = TermId::variable("y");
    let mut frame = Frame::new();
    frame.assign(&y, Value::Integer(1));
    frame.assign(&y, Value::Integer(2));
    assert!(frame.lookup(&y).unwrap().equals(&Value::Integer(2)));
}

#[test]
fn target_defaults_to_global() {
    let mut context = Context::new(Value::Null);
    assert!(matches!(context.target(), Value::Global));
    context.targets.push(Value::Integer(5));
    assert!(context.target().equals(&Value::Integer(5)));
}
