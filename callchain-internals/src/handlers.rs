//! Traits that define how stored callables are invoked and compared.
//!
//! A [`RawCallable`](crate::RawCallable) is created from two pieces of type
//! information: the stored value, which must implement [`Callable`], and a
//! handler type implementing [`EqualityHandler`] for that value. Both are baked
//! into a static vtable when the callable is created and cannot change
//! afterwards.

/// A value that can be invoked with a single argument of type `A`.
///
/// Several arguments are passed as a tuple and no arguments as `()`. The
/// output does not have to match the signature of the
/// [`RawCallable`](crate::RawCallable) exactly: it is converted with [`Into`]
/// when the callable is invoked through the vtable.
///
/// # Examples
///
/// ```
/// use callchain_internals::handlers::Callable;
///
/// struct AddOne;
///
/// impl Callable<i32> for AddOne {
///     type Output = i32;
///
///     fn call(&self, value: i32) -> i32 {
///         value + 1
///     }
/// }
///
/// assert_eq!(AddOne.call(41), 42);
/// ```
pub trait Callable<A>: 'static {
    /// The value produced by one invocation.
    type Output;

    /// Invokes the callable.
    fn call(&self, args: A) -> Self::Output;
}

/// Trait for deciding whether two stored callables of the same concrete type
/// are equal.
///
/// The handler is only consulted after the vtables have established that both
/// sides store a value of type `F` created with this same handler, and that
/// they do not share one allocation. Two handles to the same allocation are
/// always equal without asking the handler.
///
/// # Examples
///
/// A handler that compares by a key field:
///
/// ```
/// use callchain_internals::handlers::EqualityHandler;
///
/// struct Tagged {
///     tag: u32,
/// }
///
/// struct ByTag;
///
/// impl EqualityHandler<Tagged> for ByTag {
///     fn equals(left: &Tagged, right: &Tagged) -> bool {
///         left.tag == right.tag
///     }
/// }
///
/// assert!(ByTag::equals(&Tagged { tag: 1 }, &Tagged { tag: 1 }));
/// ```
pub trait EqualityHandler<F>: 'static {
    /// Returns `true` if the two values should be treated as the same
    /// callable.
    fn equals(left: &F, right: &F) -> bool;
}
