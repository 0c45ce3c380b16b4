use core::cell::Cell;

use alloc::rc::Rc;

use super::{CallbackDispatcher, Listener, slots::SlotId};

/// The continuation handed to a listener.
///
/// Every listener receives an `Event` together with the arguments of the
/// dispatch. Calling [`Event::next`] invokes the rest of the chain and returns
/// its result. A listener that never calls it ends the dispatch.
///
/// All events of one dispatch share a single cursor into the chain. Calling
/// [`next`](Self::next) a second time from the same listener continues from
/// wherever the chain stopped, which is normally the end.
///
/// # Examples
///
/// ```
/// use callchain::{CallbackDispatcher, Event};
///
/// type Chain = CallbackDispatcher<i32, i32>;
///
/// let chain = Chain::new();
/// chain.add_back(Chain::listener(|event: Event<i32, i32>, value| {
///     event.next(value).unwrap_or(0) + 1
/// }));
/// chain.add_back(Chain::listener(|_, value| value * 10));
/// assert_eq!(chain.call(4), Some(41));
/// ```
pub struct Event<A: 'static, R: 'static = ()> {
    state: Rc<EventState<A, R>>,
    current: Listener<A, R>,
}

/// State shared by all frames of one dispatch.
struct EventState<A: 'static, R: 'static> {
    dispatcher: CallbackDispatcher<A, R>,
    /// The pinned slot the dispatch is positioned on, or `None` past the end.
    cursor: Cell<Option<SlotId>>,
}

impl<A: 'static, R: 'static> Event<A, R> {
    /// Starts a dispatch positioned on the already pinned slot `first`.
    pub(super) fn start(
        dispatcher: CallbackDispatcher<A, R>,
        first: SlotId,
        listener: Listener<A, R>,
    ) -> Self {
        Self {
            state: Rc::new(EventState {
                dispatcher,
                cursor: Cell::new(Some(first)),
            }),
            current: listener,
        }
    }

    /// Invokes the next listener in the chain with `args` and returns its
    /// result.
    ///
    /// Returns [`None`] if there are no more listeners, including when the
    /// chain was cleared while this listener was running.
    pub fn next(&self, args: A) -> Option<R> {
        let (listener, released) = {
            let mut slots = self.state.dispatcher.slots.borrow_mut();
            let current = self.state.cursor.get();
            let successor = current.and_then(|id| slots.successor(id));
            let released = current.and_then(|id| slots.unpin(id));

            let listener = successor.and_then(|id| {
                let listener = slots.listener(id)?;
                slots.pin(id);
                Some(listener)
            });
            self.state.cursor.set(successor.filter(|_| listener.is_some()));
            (listener, released)
        };
        drop(released);

        let listener = listener?;
        let event = Self {
            state: self.state.clone(),
            current: listener.clone(),
        };
        listener.call((event, args))
    }

    /// Returns the listener that received this event.
    ///
    /// Passing it to [`CallbackDispatcher::remove`] removes the running
    /// listener.
    ///
    /// # Examples
    ///
    /// ```
    /// use callchain::{CallbackDispatcher, Event};
    ///
    /// type Chain = CallbackDispatcher<(), u32>;
    ///
    /// let chain = Chain::new();
    /// chain.add_back(Chain::listener(|event: Event<(), u32>, ()| {
    ///     event.dispatcher().remove(event.listener());
    ///     7_u32
    /// }));
    /// assert_eq!(chain.call(()), Some(7));
    /// assert_eq!(chain.call(()), None);
    /// ```
    pub fn listener(&self) -> &Listener<A, R> {
        &self.current
    }

    /// Returns the dispatcher running this event.
    pub fn dispatcher(&self) -> &CallbackDispatcher<A, R> {
        &self.state.dispatcher
    }
}

impl<A: 'static, R: 'static> Drop for EventState<A, R> {
    fn drop(&mut self) {
        if let Some(id) = self.cursor.take() {
            let released = self.dispatcher.slots.borrow_mut().unpin(id);
            drop(released);
        }
    }
}

impl<A: 'static, R: 'static> core::fmt::Debug for Event<A, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Event")
            .field("listener", &self.current)
            .field("finished", &self.state.cursor.get().is_none())
            .finish()
    }
}
