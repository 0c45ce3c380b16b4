//! Integration tests for the raw callable layer.
//!
//! These tests exercise the type-erased storage through the public API only:
//! - invocation through the vtable, including output conversion
//! - equality across handlers, concrete types and shared allocations
//! - reference counting and drop behaviour of the stored values
//! - callables with interior state that outlive their creators

use std::{any::TypeId, cell::Cell, rc::Rc};

use callchain_internals::{
    RawCallable, RawCallableRef,
    handlers::{Callable, EqualityHandler},
};

struct Identity;

impl<F> EqualityHandler<F> for Identity {
    fn equals(_left: &F, _right: &F) -> bool {
        false
    }
}

struct ByValue;

impl<F: PartialEq> EqualityHandler<F> for ByValue {
    fn equals(left: &F, right: &F) -> bool {
        left == right
    }
}

/// A callable that counts its own drops.
struct DropTracker {
    drops: Rc<Cell<usize>>,
    calls: Cell<usize>,
}

impl DropTracker {
    fn new(drops: &Rc<Cell<usize>>) -> Self {
        Self {
            drops: drops.clone(),
            calls: Cell::new(0),
        }
    }
}

impl Drop for DropTracker {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

impl Callable<()> for DropTracker {
    type Output = usize;

    fn call(&self, (): ()) -> usize {
        self.calls.set(self.calls.get() + 1);
        self.calls.get()
    }
}

#[derive(PartialEq, Debug)]
struct Scale(i64);

impl Callable<(i64, i64)> for Scale {
    type Output = i64;

    fn call(&self, (a, b): (i64, i64)) -> i64 {
        (a + b) * self.0
    }
}

/// Function pointers compared by address.
#[derive(PartialEq)]
struct Pointer(fn(i64) -> i64);

impl Callable<i64> for Pointer {
    type Output = i64;

    fn call(&self, value: i64) -> i64 {
        (self.0)(value)
    }
}

fn increment(value: i64) -> i64 {
    value + 1
}

fn decrement(value: i64) -> i64 {
    value - 1
}

fn type_of(raw: RawCallableRef<'_, i64, i64>) -> TypeId {
    raw.callable_type_id()
}

#[test]
fn test_invoke_with_tuple_arguments() {
    let raw = RawCallable::<(i64, i64), i64>::new::<Scale, ByValue>(Scale(3));
    assert_eq!(raw.as_ref().invoke((1, 2)), 9);
    assert_eq!(raw.as_ref().invoke((0, 0)), 0);
}

#[test]
fn test_invoke_with_widened_output() {
    let raw = RawCallable::<(i64, i64), Option<i64>>::new::<Scale, ByValue>(Scale(2));
    assert_eq!(raw.as_ref().invoke((2, 2)), Some(8));
}

#[test]
fn test_function_pointer_equality() {
    let a = RawCallable::<i64, i64>::new::<Pointer, ByValue>(Pointer(increment));
    let b = RawCallable::<i64, i64>::new::<Pointer, ByValue>(Pointer(increment));
    let c = RawCallable::<i64, i64>::new::<Pointer, ByValue>(Pointer(decrement));

    assert!(a.as_ref().equals(b.as_ref()));
    assert!(b.as_ref().equals(a.as_ref()));
    assert!(!a.as_ref().equals(c.as_ref()));
    assert_eq!(a.as_ref().invoke(1), 2);
    assert_eq!(c.as_ref().invoke(1), 0);
    assert_eq!(type_of(a.as_ref()), TypeId::of::<Pointer>());
}

#[test]
fn test_identity_equality_only_matches_shared_allocation() {
    let drops = Rc::new(Cell::new(0));
    let a = RawCallable::<(), usize>::new::<DropTracker, Identity>(DropTracker::new(&drops));
    let b = RawCallable::<(), usize>::new::<DropTracker, Identity>(DropTracker::new(&drops));
    let a2 = a.clone();

    assert!(a.as_ref().equals(a2.as_ref()));
    assert!(!a.as_ref().equals(b.as_ref()));
    assert_eq!(a.as_ref().handler_type_id(), TypeId::of::<Identity>());
}

#[test]
fn test_clones_share_state() {
    let drops = Rc::new(Cell::new(0));
    let a = RawCallable::<(), usize>::new::<DropTracker, Identity>(DropTracker::new(&drops));
    let b = a.clone();

    assert_eq!(a.as_ref().invoke(()), 1);
    assert_eq!(b.as_ref().invoke(()), 2);
    assert_eq!(a.as_ref().invoke(()), 3);
}

#[test]
fn test_clone_and_drop_behavior() {
    let drops = Rc::new(Cell::new(0));

    let a = RawCallable::<(), usize>::new::<DropTracker, Identity>(DropTracker::new(&drops));
    let b = a.clone();
    let c = b.clone();
    assert_eq!(a.as_ref().strong_count(), 3);

    drop(a);
    assert_eq!(drops.get(), 0);
    assert_eq!(c.as_ref().strong_count(), 2);

    drop(c);
    assert_eq!(drops.get(), 0);

    drop(b);
    assert_eq!(drops.get(), 1);
}

#[test]
fn test_many_callables_dropped_exactly_once() {
    let drops = Rc::new(Cell::new(0));
    let callables: Vec<_> = (0..10)
        .map(|_| RawCallable::<(), usize>::new::<DropTracker, Identity>(DropTracker::new(&drops)))
        .collect();
    let clones: Vec<_> = callables.iter().map(Clone::clone).collect();

    drop(callables);
    assert_eq!(drops.get(), 0);
    drop(clones);
    assert_eq!(drops.get(), 10);
}

#[test]
fn test_type_names() {
    let raw = RawCallable::<(i64, i64), i64>::new::<Scale, ByValue>(Scale(1));
    assert!(raw.as_ref().callable_type_name().ends_with("Scale"));
    assert_eq!(raw.as_ref().callable_type_id(), TypeId::of::<Scale>());
}
