//! Handlers that decide when two [`Function`](crate::Function)s are equal.
//!
//! Every function is created with an equality handler. The handler is part of
//! the function's runtime type information: two functions are only compared by
//! their handler if they store the same concrete type and were created with
//! the same handler. Functions that share one allocation (a function and its
//! clones) are always equal, whatever the handler says.
//!
//! # Built-in Handlers
//!
//! ## [`Identity`]
//!
//! For any value. Never reports two distinct values as equal, so a function
//! is only equal to itself and its clones. This is what
//! [`Function::new`](crate::Function::new) uses, since closures have no
//! equality of their own.
//!
//! ## [`ByValue`]
//!
//! For values implementing [`PartialEq`]. Used by
//! [`Function::comparable`](crate::Function::comparable) and
//! [`Function::from_method`](crate::Function::from_method). Function pointers
//! compare by address this way.
//!
//! # Custom Handlers
//!
//! Implement [`EqualityHandler`] for a unit struct and pass it to
//! [`Function::new_custom`](crate::Function::new_custom):
//!
//! ```rust
//! use callchain::{
//!     Function,
//!     handlers::{Callable, EqualityHandler},
//! };
//!
//! struct Named {
//!     name: &'static str,
//!     calls: std::cell::Cell<u32>,
//! }
//!
//! impl Callable<()> for Named {
//!     type Output = u32;
//!
//!     fn call(&self, (): ()) -> u32 {
//!         self.calls.set(self.calls.get() + 1);
//!         self.calls.get()
//!     }
//! }
//!
//! struct ByName;
//!
//! impl EqualityHandler<Named> for ByName {
//!     fn equals(left: &Named, right: &Named) -> bool {
//!         left.name == right.name
//!     }
//! }
//!
//! let a = Function::<(), u32>::new_custom::<ByName, _>(Named {
//!     name: "tick",
//!     calls: Default::default(),
//! });
//! let b = Function::<(), u32>::new_custom::<ByName, _>(Named {
//!     name: "tick",
//!     calls: Default::default(),
//! });
//! assert_eq!(a, b);
//! ```

pub use callchain_internals::handlers::{Callable, EqualityHandler};

/// Handler comparing values by identity only.
///
/// Distinct values are never equal, so only a function and its clones compare
/// equal.
///
/// # Examples
///
/// ```rust
/// use callchain::handlers::{EqualityHandler, Identity};
///
/// assert!(!Identity::equals(&1, &1));
/// ```
#[derive(Copy, Clone)]
pub struct Identity;

impl<F> EqualityHandler<F> for Identity {
    fn equals(_left: &F, _right: &F) -> bool {
        false
    }
}

/// Handler comparing values with their [`PartialEq`] implementation.
///
/// # Examples
///
/// ```rust
/// use callchain::handlers::{ByValue, EqualityHandler};
///
/// assert!(ByValue::equals(&1, &1));
/// assert!(!ByValue::equals(&1, &2));
/// ```
#[derive(Copy, Clone)]
pub struct ByValue;

impl<F> EqualityHandler<F> for ByValue
where
    F: PartialEq,
{
    fn equals(left: &F, right: &F) -> bool {
        left == right
    }
}
