//! Methods bound to a shared receiver.

use alloc::rc::Rc;

use callchain_internals::handlers::Callable;

/// A method pointer paired with an optional shared receiver.
///
/// `M` is the method pointer type, either `fn(&T) -> O` for methods without
/// arguments or `fn(&T, A) -> O` for methods taking one argument (use a tuple
/// for several).
///
/// Two methods are equal when they hold the same method pointer and point to
/// the same receiver allocation, or are both unbound. Receivers are compared
/// by identity, never by value.
///
/// Convert a bound method into a [`Function`](crate::Function) with
/// [`Function::from_method`](crate::Function::from_method).
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
///
/// use callchain::Method;
///
/// struct Greeter {
///     name: &'static str,
/// }
///
/// impl Greeter {
///     fn greet(&self) -> String {
///         format!("hello from {}", self.name)
///     }
/// }
///
/// let greeter = Rc::new(Greeter { name: "a" });
/// let mut method = Method::new(Greeter::greet as fn(&Greeter) -> String);
/// assert!(!method.is_bound());
///
/// method.bind(greeter.clone());
/// assert_eq!(method, Method::bound(Greeter::greet as fn(&Greeter) -> String, greeter));
/// ```
pub struct Method<T, M> {
    receiver: Option<Rc<T>>,
    method: M,
}

impl<T, M> Method<T, M> {
    /// Creates a method that is not bound to any receiver yet.
    pub fn new(method: M) -> Self {
        Self {
            receiver: None,
            method,
        }
    }

    /// Creates a method bound to `receiver`.
    pub fn bound(method: M, receiver: Rc<T>) -> Self {
        Self {
            receiver: Some(receiver),
            method,
        }
    }

    /// Binds the method to a new receiver, replacing the previous one.
    pub fn bind(&mut self, receiver: Rc<T>) {
        self.receiver = Some(receiver);
    }

    /// Returns the receiver, if the method is bound.
    pub fn receiver(&self) -> Option<&Rc<T>> {
        self.receiver.as_ref()
    }

    /// Returns `true` if the method has a receiver.
    pub fn is_bound(&self) -> bool {
        self.receiver.is_some()
    }

    #[track_caller]
    fn bound_receiver(&self) -> &T {
        match &self.receiver {
            Some(receiver) => receiver,
            None => panic!("called a `Method` that is not bound to a receiver"),
        }
    }
}

impl<T: 'static, O> Callable<()> for Method<T, fn(&T) -> O>
where
    O: 'static,
{
    type Output = O;

    fn call(&self, (): ()) -> O {
        (self.method)(self.bound_receiver())
    }
}

impl<T: 'static, A, O> Callable<A> for Method<T, fn(&T, A) -> O>
where
    A: 'static,
    O: 'static,
{
    type Output = O;

    fn call(&self, args: A) -> O {
        (self.method)(self.bound_receiver(), args)
    }
}

impl<T, M: Clone> Clone for Method<T, M> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
            method: self.method.clone(),
        }
    }
}

impl<T, M: PartialEq> PartialEq for Method<T, M> {
    fn eq(&self, other: &Self) -> bool {
        let same_receiver = match (&self.receiver, &other.receiver) {
            (Some(left), Some(right)) => Rc::ptr_eq(left, right),
            (None, None) => true,
            _ => false,
        };
        same_receiver && self.method == other.method
    }
}

impl<T, M> core::fmt::Debug for Method<T, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Method")
            .field("receiver", &self.receiver.as_ref().map(Rc::as_ptr))
            .field("method", &core::any::type_name::<M>())
            .finish()
    }
}
