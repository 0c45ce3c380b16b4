use alloc::{rc::Rc, vec, vec::Vec};
use core::cell::{Cell, RefCell};

use super::*;

type Chain = CallbackDispatcher<i32, i32>;
type Log = Rc<RefCell<Vec<i32>>>;

fn forward(event: Event<i32, i32>, value: i32) -> Option<i32> {
    event.next(value)
}

/// A listener that records `tag` and forwards to the rest of the chain.
fn recording(log: &Log, tag: i32) -> Listener<i32, i32> {
    let log = log.clone();
    Chain::listener(move |event, value| {
        log.borrow_mut().push(tag);
        event.next(value)
    })
}

/// A simple function that records `tag`.
fn recording_simple(log: &Log, tag: i32) -> Function<i32, ()> {
    let log = log.clone();
    Function::new(move |_: i32| log.borrow_mut().push(tag))
}

#[test]
fn test_dispatcher_send_sync() {
    static_assertions::assert_not_impl_any!(CallbackDispatcher<i32, i32>: Send, Sync, Clone);
    static_assertions::assert_not_impl_any!(Event<i32, i32>: Send, Sync);
}

#[test]
fn test_empty_chain() {
    let chain = Chain::new();
    assert!(!chain.has_listeners());
    assert!(chain.is_empty());
    assert_eq!(chain.call(1), None);
}

#[test]
fn test_continuation_result() {
    let chain = Chain::new();
    let a = Chain::listener(|event, value| 1 + event.next(value).unwrap_or(0));
    let b = Chain::listener(|event, value: i32| value + event.next(value).unwrap_or(0));

    chain.add_back(a.clone());
    chain.add_back(b.clone());
    assert_eq!(chain.len(), 2);
    assert_eq!(chain.call(2), Some(3));

    assert!(chain.remove(&b));
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.call(2), Some(1));

    assert!(chain.remove(&a));
    assert_eq!(chain.call(2), None);
}

#[test]
fn test_continuation_is_opt_in() {
    let log = Log::default();
    let chain = Chain::new();
    chain.add_back(recording(&log, 1));
    chain.add_back({
        let log = log.clone();
        Chain::listener(move |_, value| {
            log.borrow_mut().push(2);
            value
        })
    });
    chain.add_back(recording(&log, 3));

    assert_eq!(chain.call(9), Some(9));
    assert_eq!(*log.borrow(), vec![1, 2]);
}

#[test]
fn test_back_order() {
    let log = Log::default();
    let chain = Chain::new();
    for tag in 1..=3 {
        chain.add_simple(recording_simple(&log, tag), Placement::Back);
    }

    assert_eq!(chain.call(0), None);
    assert_eq!(*log.borrow(), vec![1, 2, 3]);
}

#[test]
fn test_front_order() {
    let log = Log::default();
    let chain = Chain::new();
    for tag in 1..=3 {
        chain.add_simple(recording_simple(&log, tag), Placement::Front);
    }

    chain.call(0);
    assert_eq!(*log.borrow(), vec![3, 2, 1]);
}

#[test]
fn test_interleaved_placement() {
    let log = Log::default();
    let chain = Chain::new();
    chain.add(recording(&log, 1), Placement::Back);
    chain.add(recording(&log, 2), Placement::Front);
    chain.add(recording(&log, 3), Placement::Back);
    chain.add(recording(&log, 4), Placement::Front);

    chain.call(0);
    assert_eq!(*log.borrow(), vec![4, 2, 1, 3]);
}

#[test]
fn test_add_then_remove_restores_behavior() {
    let log = Log::default();
    let chain = Chain::new();
    chain.add_back(recording(&log, 1));
    chain.add_back(Chain::listener(|_, value: i32| value * 3));

    let extra = recording(&log, 2);
    chain.add_front(extra.clone());
    assert!(chain.remove(&extra));

    assert_eq!(chain.call(2), Some(6));
    assert_eq!(*log.borrow(), vec![1]);
}

#[test]
fn test_remove_absent_is_noop() {
    let chain = Chain::new();
    let stored = Chain::listener(|_, value: i32| value);
    let absent = Chain::listener(|_, value: i32| value);
    chain.add_back(stored);

    assert!(!chain.remove(&absent));
    assert!(!chain.remove(&Listener::<i32, i32>::empty()));
    assert_eq!(chain.len(), 1);
}

#[test]
fn test_remove_only_last_duplicate() {
    let log = Log::default();
    let chain = Chain::new();
    let duplicate = recording(&log, 1);
    chain.add_back(duplicate.clone());
    chain.add_back(recording(&log, 2));
    chain.add_back(duplicate.clone());

    assert!(chain.remove(&duplicate));
    assert_eq!(chain.len(), 2);
    chain.call(0);
    assert_eq!(*log.borrow(), vec![1, 2]);

    assert!(chain.remove(&duplicate));
    assert!(!chain.remove(&duplicate));
    assert_eq!(chain.len(), 1);
}

#[test]
fn test_empty_listener_ignored() {
    let chain = Chain::new();
    chain.add_back(Listener::<i32, i32>::empty());
    chain.add_simple(Function::empty(), Placement::Front);
    assert!(!chain.has_listeners());
}

#[test]
fn test_self_removal() {
    let calls = Rc::new(Cell::new(0));
    let chain = Chain::new();
    chain.add_back({
        let calls = calls.clone();
        Chain::listener(move |event: Event<i32, i32>, value| {
            calls.set(calls.get() + 1);
            assert!(event.dispatcher().remove(event.listener()));
            event.next(value).map(|rest| rest + 100)
        })
    });
    chain.add_back(Chain::listener(|_, value: i32| value));

    assert_eq!(chain.call(1), Some(101));
    assert_eq!(chain.len(), 1);
    assert_eq!(chain.call(1), Some(1));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_remove_next_listener_while_running() {
    let log = Log::default();
    let chain = Chain::new();
    let second = recording(&log, 2);

    chain.add_back({
        let second = second.clone();
        let log = log.clone();
        Chain::listener(move |event: Event<i32, i32>, value| {
            log.borrow_mut().push(1);
            event.dispatcher().remove(&second);
            event.next(value)
        })
    });
    chain.add_back(second);
    chain.add_back(recording(&log, 3));

    chain.call(0);
    assert_eq!(*log.borrow(), vec![1, 3]);
}

#[test]
fn test_remove_running_and_next_listener() {
    let log = Log::default();
    let chain = Chain::new();
    let second = recording(&log, 2);

    chain.add_back({
        let second = second.clone();
        let log = log.clone();
        Chain::listener(move |event: Event<i32, i32>, value| {
            log.borrow_mut().push(1);
            event.dispatcher().remove(event.listener());
            event.dispatcher().remove(&second);
            event.next(value)
        })
    });
    chain.add_back(second);
    chain.add_back(recording(&log, 3));

    chain.call(0);
    assert_eq!(*log.borrow(), vec![1, 3]);
    assert_eq!(chain.len(), 1);
}

#[test]
fn test_remove_all_inside_listener() {
    let log = Log::default();
    let chain = Chain::new();
    chain.add_back(Chain::listener(|event: Event<i32, i32>, value| {
        event.dispatcher().remove_all();
        assert_eq!(event.next(value), None);
        1_i32
    }));
    chain.add_back(recording(&log, 2));

    assert_eq!(chain.call(0), Some(1));
    assert!(log.borrow().is_empty());
    assert!(!chain.has_listeners());
    assert_eq!(chain.call(0), None);
}

#[test]
fn test_remove_all_in_middle_of_chain() {
    let log = Log::default();
    let chain = Chain::new();
    chain.add_back(recording(&log, 1));
    chain.add_back({
        let log = log.clone();
        Chain::listener(move |event: Event<i32, i32>, value| {
            log.borrow_mut().push(2);
            event.dispatcher().remove_all();
            event.next(value)
        })
    });
    chain.add_back(recording(&log, 3));

    assert_eq!(chain.call(0), None);
    assert_eq!(*log.borrow(), vec![1, 2]);
}

#[test]
fn test_add_while_running() {
    let log = Log::default();
    let chain = Chain::new();
    chain.add_back({
        let log = log.clone();
        Chain::listener(move |event: Event<i32, i32>, value| {
            log.borrow_mut().push(1);
            if value == 0 {
                event.dispatcher().add_back(recording(&log, 2));
                event.dispatcher().add_front(recording(&log, 3));
            }
            event.next(value)
        })
    });

    chain.call(0);
    assert_eq!(*log.borrow(), vec![1, 2]);
    assert_eq!(chain.len(), 3);

    log.borrow_mut().clear();
    chain.call(1);
    assert_eq!(*log.borrow(), vec![3, 1, 2]);
}

#[test]
fn test_next_twice_resumes_shared_cursor() {
    let log = Log::default();
    let chain = Chain::new();
    chain.add_back(Chain::listener(|event: Event<i32, i32>, value| {
        let first = event.next(value);
        let second = event.next(value);
        assert_eq!(second, None);
        first
    }));
    chain.add_back(recording(&log, 2));
    chain.add_back(Chain::listener(|_, value: i32| value + 1));

    assert_eq!(chain.call(4), Some(5));
    assert_eq!(*log.borrow(), vec![2]);
}

#[test]
fn test_nested_dispatch() {
    let depth = Rc::new(Cell::new(0));
    let chain = Chain::new();
    chain.add_back({
        let depth = depth.clone();
        Chain::listener(move |event: Event<i32, i32>, value| {
            depth.set(depth.get() + 1);
            if value > 0 {
                let inner = event.dispatcher().call(value - 1).unwrap_or(0);
                event.next(value).unwrap_or(0) + inner
            } else {
                event.next(value).unwrap_or(0)
            }
        })
    });
    chain.add_back(Chain::listener(|_, value: i32| value * 10));

    // 20 + (10 + (0))
    assert_eq!(chain.call(2), Some(30));
    assert_eq!(depth.get(), 3);
}

#[test]
fn test_comparable_listener_removal() {
    let chain = Chain::new();
    chain.add_back(Chain::comparable_listener(
        forward as fn(Event<i32, i32>, i32) -> Option<i32>,
    ));
    chain.add_back(Chain::listener(|_, value: i32| -value));
    assert_eq!(chain.call(5), Some(-5));

    assert!(chain.remove_comparable(forward as fn(Event<i32, i32>, i32) -> Option<i32>));
    assert_eq!(chain.len(), 1);
    assert!(!chain.remove_comparable(forward as fn(Event<i32, i32>, i32) -> Option<i32>));
}

#[test]
fn test_simple_listener_removal() {
    let log = Log::default();
    let chain = Chain::new();
    let first = recording_simple(&log, 1);
    let second = recording_simple(&log, 2);
    chain.add_simple(first.clone(), Placement::Back);
    chain.add_simple(second.clone(), Placement::Back);
    chain.add_back(Chain::listener(|_, value: i32| value));

    assert_eq!(chain.call(7), Some(7));
    assert!(chain.remove_simple(&first));
    assert!(!chain.remove_simple(&first));
    assert!(!chain.remove_simple(&recording_simple(&log, 2)));

    log.borrow_mut().clear();
    assert_eq!(chain.call(7), Some(7));
    assert_eq!(*log.borrow(), vec![2]);
}

#[test]
fn test_into_function() {
    let chain = Chain::new();
    chain.add_back(Chain::listener(|_, value: i32| value * 2));

    let f: Function<i32, Option<i32>> = chain.into_function();
    assert_eq!(f.call(10), Some(20));
    assert_eq!(f, f.clone());

    let empty: Function<i32, Option<i32>> = Chain::new().into();
    assert!(!empty.is_empty());
    assert_eq!(empty.call(10), None);
}

#[test]
fn test_dispatcher_as_listener() {
    let inner = Chain::new();
    inner.add_back(Chain::listener(|_, value: i32| value + 1));
    let inner = inner.into_function();

    let outer = Chain::new();
    outer.add_back(Chain::listener(move |_, value: i32| inner.call(value)));
    assert_eq!(outer.call(1), Some(2));
}

#[test]
fn test_listeners_dropped() {
    let token = Rc::new(());
    let chain = Chain::new();
    for _ in 0..3 {
        let token = token.clone();
        chain.add_back(Chain::listener(move |event, value| {
            let _held = &token;
            event.next(value)
        }));
    }
    assert_eq!(Rc::strong_count(&token), 4);

    chain.remove_all();
    assert_eq!(Rc::strong_count(&token), 1);
}

#[test]
fn test_self_removed_listener_dropped_after_dispatch() {
    let token = Rc::new(());
    let chain = Chain::new();
    chain.add_back({
        let token = token.clone();
        Chain::listener(move |event: Event<i32, i32>, value| {
            let _held = &token;
            event.dispatcher().remove(event.listener());
            value
        })
    });

    assert_eq!(chain.call(3), Some(3));
    assert_eq!(Rc::strong_count(&token), 1);
    assert!(!chain.has_listeners());
}

#[test]
fn test_listener_errors_pass_through() {
    #[derive(Debug, PartialEq, thiserror::Error)]
    enum ParseError {
        #[error("negative input: {0}")]
        Negative(i32),
    }

    type Checked = CallbackDispatcher<i32, Result<i32, ParseError>>;

    let chain = Checked::new();
    chain.add_back(Checked::listener(|event, value: i32| {
        if value < 0 {
            return Err(ParseError::Negative(value));
        }
        event.next(value).unwrap_or(Ok(value))
    }));

    assert_eq!(chain.call(4), Some(Ok(4)));
    let error = chain.call(-1).unwrap().unwrap_err();
    assert_eq!(error, ParseError::Negative(-1));
    assert_eq!(alloc::format!("{error}"), "negative input: -1");
}

#[test]
fn test_unit_return_type() {
    let calls = Rc::new(Cell::new(0));
    let chain = CallbackDispatcher::<()>::new();
    chain.add_back({
        let calls = calls.clone();
        CallbackDispatcher::<()>::listener(move |event, ()| {
            calls.set(calls.get() + 1);
            event.next(())
        })
    });

    assert_eq!(chain.call(()), None);
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_debug_output() {
    let chain = Chain::new();
    chain.add_back(Chain::listener(|_, value: i32| value));
    assert_eq!(
        alloc::format!("{chain:?}"),
        "CallbackDispatcher { listeners: 1 }"
    );
}
