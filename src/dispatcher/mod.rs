//! Chain-of-responsibility dispatch over an ordered list of listeners.
//!
//! A [`CallbackDispatcher`] holds an ordered chain of listeners. Calling the
//! dispatcher invokes the first listener, which decides whether the rest of
//! the chain runs by calling [`Event::next`]. The result of the first
//! listener is the result of the whole dispatch.
//!
//! The chain can be changed at any time, including from inside a listener
//! that is currently running: listeners can add listeners, remove other
//! listeners or themselves, clear the chain, or start a nested dispatch on the
//! same dispatcher. Removal takes effect immediately and a removed listener is
//! never invoked afterwards, but a listener that is already running finishes
//! normally.
//!
//! # Examples
//!
//! ```
//! use callchain::CallbackDispatcher;
//!
//! type Chain = CallbackDispatcher<i32, i32>;
//!
//! let chain = Chain::new();
//! let first = Chain::listener(|event, value| 1 + event.next(value).unwrap_or(0));
//! let second = Chain::listener(|event, value: i32| value + event.next(value).unwrap_or(0));
//!
//! chain.add_back(first);
//! chain.add_back(second.clone());
//! assert_eq!(chain.call(2), Some(3));
//!
//! chain.remove(&second);
//! assert_eq!(chain.call(2), Some(1));
//! ```

mod event;
mod slots;

use core::cell::RefCell;

use alloc::rc::Rc;

use callchain_internals::handlers::Callable;
use tracing::{debug, trace};

pub use self::event::Event;
use self::slots::Slots;
use crate::{Function, handlers};

/// A listener of a [`CallbackDispatcher<A, R>`].
///
/// Listeners receive the [`Event`] of the running dispatch and the arguments.
/// They may return `R` or `Option<R>`.
pub type Listener<A, R = ()> = Function<(Event<A, R>, A), Option<R>>;

/// Where [`CallbackDispatcher::add`] inserts a listener.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Before every listener already in the chain.
    Front,
    /// After every listener already in the chain.
    Back,
}

/// An ordered chain of listeners invoked one after another on request.
///
/// See the [module documentation](self) for an overview.
///
/// A dispatcher is not [`Clone`]: the chain has a single owner. Listeners
/// reach the running dispatcher through [`Event::dispatcher`].
pub struct CallbackDispatcher<A: 'static, R: 'static = ()> {
    slots: Rc<RefCell<Slots<A, R>>>,
}

/// Adapts a listener closure taking the event and arguments separately.
#[derive(PartialEq)]
struct EventFn<F>(F);

impl<F, A, R, O> Callable<(Event<A, R>, A)> for EventFn<F>
where
    F: Fn(Event<A, R>, A) -> O + 'static,
    A: 'static,
    R: 'static,
{
    type Output = O;

    #[inline]
    fn call(&self, (event, args): (Event<A, R>, A)) -> O {
        (self.0)(event, args)
    }
}

/// A listener that runs a plain function and then continues the chain.
struct SimpleListener<A: 'static>(Function<A, ()>);

impl<A, R> Callable<(Event<A, R>, A)> for SimpleListener<A>
where
    A: Clone + 'static,
    R: 'static,
{
    type Output = Option<R>;

    fn call(&self, (event, args): (Event<A, R>, A)) -> Option<R> {
        self.0.call(args.clone());
        event.next(args)
    }
}

impl<A: 'static> PartialEq for SimpleListener<A> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

/// A dispatcher used as a single function.
struct DispatcherCallable<A: 'static, R: 'static>(CallbackDispatcher<A, R>);

impl<A: 'static, R: 'static> Callable<A> for DispatcherCallable<A, R> {
    type Output = Option<R>;

    fn call(&self, args: A) -> Option<R> {
        self.0.call(args)
    }
}

impl<A: 'static, R: 'static> CallbackDispatcher<A, R> {
    /// Creates a dispatcher without listeners.
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots::new())),
        }
    }

    /// Another handle to the same chain, for the events of a dispatch.
    fn share(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }

    /// Creates a listener from a closure.
    ///
    /// The listener is only equal to itself and its clones, so keep a clone
    /// around to [`remove`](Self::remove) it later.
    pub fn listener<F, O>(f: F) -> Listener<A, R>
    where
        F: Fn(Event<A, R>, A) -> O + 'static,
        O: Into<Option<R>>,
    {
        Listener::<A, R>::new_custom::<handlers::Identity, _>(EventFn(f))
    }

    /// Creates a listener that compares by value, such as a function pointer.
    ///
    /// # Examples
    ///
    /// ```
    /// use callchain::{CallbackDispatcher, Event};
    ///
    /// type Chain = CallbackDispatcher<i32, i32>;
    ///
    /// fn negate(_: Event<i32, i32>, value: i32) -> i32 {
    ///     -value
    /// }
    ///
    /// let chain = Chain::new();
    /// chain.add_back(Chain::comparable_listener(negate as fn(Event<i32, i32>, i32) -> i32));
    /// assert_eq!(chain.call(3), Some(-3));
    ///
    /// assert!(chain.remove_comparable(negate as fn(Event<i32, i32>, i32) -> i32));
    /// assert!(!chain.has_listeners());
    /// ```
    pub fn comparable_listener<F, O>(f: F) -> Listener<A, R>
    where
        F: Fn(Event<A, R>, A) -> O + PartialEq + 'static,
        O: Into<Option<R>>,
    {
        Listener::<A, R>::new_custom::<handlers::ByValue, _>(EventFn(f))
    }

    /// Inserts a listener at the front or back of the chain.
    ///
    /// Empty listeners are ignored.
    pub fn add(&self, listener: Listener<A, R>, placement: Placement) {
        if listener.is_empty() {
            trace!(?placement, "ignoring empty listener");
            return;
        }

        let mut slots = self.slots.borrow_mut();
        match placement {
            Placement::Front => slots.push_front(listener),
            Placement::Back => slots.push_back(listener),
        };
        trace!(?placement, listeners = slots.len(), "listener added");
    }

    /// Inserts a listener before every listener already in the chain.
    pub fn add_front(&self, listener: Listener<A, R>) {
        self.add(listener, Placement::Front);
    }

    /// Inserts a listener after every listener already in the chain.
    pub fn add_back(&self, listener: Listener<A, R>) {
        self.add(listener, Placement::Back);
    }

    /// Inserts a function that does not deal with the continuation.
    ///
    /// The function is called with a clone of the arguments, and then the
    /// chain continues with the original arguments. The result is whatever
    /// the rest of the chain returns.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::{cell::RefCell, rc::Rc};
    ///
    /// use callchain::{CallbackDispatcher, Function, Placement};
    ///
    /// let seen = Rc::new(RefCell::new(Vec::new()));
    /// let log = {
    ///     let seen = seen.clone();
    ///     Function::new(move |value: i32| seen.borrow_mut().push(value))
    /// };
    ///
    /// let chain = CallbackDispatcher::<i32, i32>::new();
    /// chain.add_simple(log.clone(), Placement::Back);
    /// chain.add_back(CallbackDispatcher::listener(|_, value: i32| value * 2));
    ///
    /// assert_eq!(chain.call(5), Some(10));
    /// assert_eq!(*seen.borrow(), [5]);
    ///
    /// assert!(chain.remove_simple(&log));
    /// assert_eq!(chain.len(), 1);
    /// ```
    pub fn add_simple(&self, simple: Function<A, ()>, placement: Placement)
    where
        A: Clone,
    {
        if simple.is_empty() {
            trace!(?placement, "ignoring empty listener");
            return;
        }
        self.add(Self::simple_listener(simple), placement);
    }

    fn simple_listener(simple: Function<A, ()>) -> Listener<A, R>
    where
        A: Clone,
    {
        Listener::<A, R>::new_custom::<handlers::ByValue, _>(SimpleListener(simple))
    }

    /// Removes one listener equal to `listener`.
    ///
    /// The chain is searched from the back, and only the first match is
    /// removed. Returns `true` if a listener was removed. Removing a
    /// listener that is not in the chain does nothing.
    ///
    /// A listener may remove itself or any other listener while it runs. A
    /// removed listener is not invoked again, even by a dispatch that is
    /// currently in progress.
    pub fn remove(&self, listener: &Listener<A, R>) -> bool {
        // Comparing may run user code, so it happens without holding the borrow.
        let linked = self.slots.borrow().linked_from_tail();
        let Some(id) = linked
            .iter()
            .find(|(_, candidate)| candidate.equals(listener))
            .map(|&(id, _)| id)
        else {
            debug!(
                listener = listener.callable_type_name(),
                "no matching listener to remove"
            );
            return false;
        };

        let released = {
            let mut slots = self.slots.borrow_mut();
            if !slots.is_linked(id) {
                return false;
            }
            let released = slots.unlink(id);
            trace!(listeners = slots.len(), "listener removed");
            released
        };
        drop(released);
        true
    }

    /// Removes one listener created by [`add_simple`](Self::add_simple) with
    /// a function equal to `simple`.
    pub fn remove_simple(&self, simple: &Function<A, ()>) -> bool
    where
        A: Clone,
    {
        self.remove(&Self::simple_listener(simple.clone()))
    }

    /// Removes one listener equal to `comparable_listener(f)`.
    ///
    /// This saves keeping the original listener around for values that
    /// compare by value, such as function pointers.
    pub fn remove_comparable<F, O>(&self, f: F) -> bool
    where
        F: Fn(Event<A, R>, A) -> O + PartialEq + 'static,
        O: Into<Option<R>>,
    {
        self.remove(&Self::comparable_listener(f))
    }

    /// Removes every listener.
    ///
    /// A dispatch in progress finishes the listeners that are already running,
    /// and [`Event::next`] returns [`None`] from then on.
    pub fn remove_all(&self) {
        let released = self.slots.borrow_mut().clear();
        trace!(removed = released.len(), "all listeners removed");
        drop(released);
    }

    /// Returns `true` if the chain contains at least one listener.
    pub fn has_listeners(&self) -> bool {
        self.len() > 0
    }

    /// Returns `true` if the chain has no listeners.
    pub fn is_empty(&self) -> bool {
        !self.has_listeners()
    }

    /// Returns the number of listeners in the chain.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Invokes the first listener and returns its result, or [`None`] if the
    /// chain is empty.
    ///
    /// Panics raised by listeners propagate unchanged.
    pub fn call(&self, args: A) -> Option<R> {
        let (first, listener) = {
            let mut slots = self.slots.borrow_mut();
            let first = slots.head()?;
            let listener = slots.listener(first)?;
            slots.pin(first);
            (first, listener)
        };

        let event = Event::start(self.share(), first, listener.clone());
        listener.call((event, args))
    }

    /// Turns the dispatcher into a single function that runs the chain.
    ///
    /// # Examples
    ///
    /// ```
    /// use callchain::{CallbackDispatcher, Function};
    ///
    /// type Chain = CallbackDispatcher<i32, i32>;
    ///
    /// let chain = Chain::new();
    /// chain.add_back(Chain::listener(|_, value: i32| value * 2));
    ///
    /// let f: Function<i32, Option<i32>> = chain.into_function();
    /// assert_eq!(f.call(10), Some(20));
    /// ```
    pub fn into_function(self) -> Function<A, Option<R>> {
        Function::<A, Option<R>>::new_custom::<handlers::Identity, _>(DispatcherCallable(self))
    }
}

impl<A: 'static, R: 'static> Default for CallbackDispatcher<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static, R: 'static> From<CallbackDispatcher<A, R>> for Function<A, Option<R>> {
    fn from(dispatcher: CallbackDispatcher<A, R>) -> Self {
        dispatcher.into_function()
    }
}

impl<A: 'static, R: 'static> core::fmt::Debug for CallbackDispatcher<A, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CallbackDispatcher")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
