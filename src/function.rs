//! The type-erased, comparable [`Function`] handle.

use callchain_internals::{
    RawCallable,
    handlers::{Callable, EqualityHandler},
};

use crate::{handlers, method::Method};

/// A cloneable, type-erased function from `A` to `R` that can be compared
/// with other functions at runtime.
///
/// Any Rust closure, function pointer or callable value can be stored in a
/// `Function` as long as its return value converts into `R` with [`Into`].
/// Several arguments are passed as a tuple, and no arguments as `()`.
///
/// Equality is decided by the handler the function was created with:
///
/// - [`Function::new`] compares by identity. A function is only equal to
///   itself and its clones. This works for any closure.
/// - [`Function::comparable`] compares the stored values with [`PartialEq`].
///   Function pointers compare by address this way.
/// - [`Function::from_method`] compares the receiver by identity and the
///   method by address.
/// - [`Function::new_custom`] takes any [`EqualityHandler`].
///
/// Functions storing different concrete types never compare equal. Two empty
/// functions are equal to each other.
///
/// Cloning a `Function` is cheap: it increments a reference count and the
/// clone shares the stored value.
///
/// # Examples
///
/// ```
/// use callchain::Function;
///
/// fn plus_one(value: i32) -> i32 {
///     value + 1
/// }
///
/// let f = Function::<i32, i32>::comparable(plus_one as fn(i32) -> i32);
/// let g = Function::<i32, i32>::comparable(plus_one as fn(i32) -> i32);
/// assert_eq!(f.call(1), 2);
/// assert_eq!(f, g);
///
/// // Closures without value equality are only equal to their own clones.
/// let h = Function::<i32, i64>::new(|value: i32| value * 2);
/// assert_eq!(h.call(21), 42_i64);
/// assert_eq!(h, h.clone());
/// assert_ne!(h, Function::new(|value: i32| value * 2));
/// ```
pub struct Function<A: 'static, R: 'static = ()> {
    raw: Option<RawCallable<A, R>>,
}

/// Adapts an [`Fn`] closure to the [`Callable`] trait.
#[derive(PartialEq)]
struct FnCallable<F>(F);

impl<F, A, O> Callable<A> for FnCallable<F>
where
    F: Fn(A) -> O + 'static,
{
    type Output = O;

    #[inline]
    fn call(&self, args: A) -> O {
        (self.0)(args)
    }
}

impl<A: 'static, R: 'static> Function<A, R> {
    /// Creates a function that is only equal to itself and its clones.
    ///
    /// # Examples
    ///
    /// ```
    /// use callchain::Function;
    ///
    /// let greeting = String::from("hello");
    /// let f = Function::<&'static str, String>::new(move |name| format!("{greeting} {name}"));
    /// assert_eq!(f.call("world"), "hello world");
    /// ```
    pub fn new<F, O>(f: F) -> Self
    where
        F: Fn(A) -> O + 'static,
        O: Into<R>,
    {
        Self::new_custom::<handlers::Identity, _>(FnCallable(f))
    }

    /// Creates a function that compares the stored values with
    /// [`PartialEq`].
    ///
    /// Closures do not implement [`PartialEq`], so this is mostly useful for
    /// function pointers and for callable types with their own equality.
    /// Note that a function item has to be cast to a function pointer first.
    ///
    /// # Examples
    ///
    /// ```
    /// use callchain::Function;
    ///
    /// fn double(value: i32) -> i32 {
    ///     value * 2
    /// }
    ///
    /// fn triple(value: i32) -> i32 {
    ///     value * 3
    /// }
    ///
    /// let a = Function::<i32, i32>::comparable(double as fn(i32) -> i32);
    /// let b = Function::<i32, i32>::comparable(double as fn(i32) -> i32);
    /// let c = Function::<i32, i32>::comparable(triple as fn(i32) -> i32);
    /// assert_eq!(a, b);
    /// assert_ne!(a, c);
    /// ```
    pub fn comparable<F, O>(f: F) -> Self
    where
        F: Fn(A) -> O + PartialEq + 'static,
        O: Into<R>,
    {
        Self::new_custom::<handlers::ByValue, _>(FnCallable(f))
    }

    /// Creates a function from a [`Method`].
    ///
    /// Two such functions are equal when they call the same method on the
    /// same receiver. An unbound method produces an empty function.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::rc::Rc;
    ///
    /// use callchain::{Function, Method};
    ///
    /// struct Counter {
    ///     step: i32,
    /// }
    ///
    /// impl Counter {
    ///     fn advance(&self, value: i32) -> i32 {
    ///         value + self.step
    ///     }
    /// }
    ///
    /// let counter = Rc::new(Counter { step: 5 });
    /// let f = Function::<i32, i32>::from_method(Method::bound(
    ///     Counter::advance as fn(&Counter, i32) -> i32,
    ///     counter.clone(),
    /// ));
    /// assert_eq!(f.call(1), 6);
    ///
    /// let unbound = Method::<Counter, _>::new(Counter::advance as fn(&Counter, i32) -> i32);
    /// assert!(Function::<i32, i32>::from_method(unbound).is_empty());
    /// ```
    pub fn from_method<T, M>(method: Method<T, M>) -> Self
    where
        T: 'static,
        M: PartialEq + 'static,
        Method<T, M>: Callable<A>,
        <Method<T, M> as Callable<A>>::Output: Into<R>,
    {
        if method.is_bound() {
            Self::new_custom::<handlers::ByValue, _>(method)
        } else {
            Self::empty()
        }
    }

    /// Creates a comparable function from an optional value, producing an
    /// empty function for [`None`].
    ///
    /// # Examples
    ///
    /// ```
    /// use callchain::Function;
    ///
    /// let missing: Option<fn(i32) -> i32> = None;
    /// assert!(Function::<i32, i32>::from_option(missing).is_empty());
    ///
    /// let present: Option<fn(i32) -> i32> = Some(|value| value - 1);
    /// assert_eq!(Function::<i32, i32>::from_option(present).call(1), 0);
    /// ```
    pub fn from_option<F, O>(f: Option<F>) -> Self
    where
        F: Fn(A) -> O + PartialEq + 'static,
        O: Into<R>,
    {
        match f {
            Some(f) => Self::comparable(f),
            None => Self::empty(),
        }
    }

    /// Creates a function from any [`Callable`] value compared with the
    /// handler `H`.
    ///
    /// # Examples
    ///
    /// ```
    /// use callchain::{
    ///     Function,
    ///     handlers::{Callable, EqualityHandler},
    /// };
    ///
    /// struct Scale {
    ///     factor: i32,
    ///     label: &'static str,
    /// }
    ///
    /// impl Callable<i32> for Scale {
    ///     type Output = i32;
    ///
    ///     fn call(&self, value: i32) -> i32 {
    ///         value * self.factor
    ///     }
    /// }
    ///
    /// struct ByFactor;
    ///
    /// impl EqualityHandler<Scale> for ByFactor {
    ///     fn equals(left: &Scale, right: &Scale) -> bool {
    ///         left.factor == right.factor
    ///     }
    /// }
    ///
    /// let a = Function::<i32, i32>::new_custom::<ByFactor, _>(Scale { factor: 2, label: "a" });
    /// let b = Function::<i32, i32>::new_custom::<ByFactor, _>(Scale { factor: 2, label: "b" });
    /// assert_eq!(a.call(4), 8);
    /// assert_eq!(a, b);
    /// ```
    pub fn new_custom<H, C>(callable: C) -> Self
    where
        C: Callable<A>,
        C::Output: Into<R>,
        H: EqualityHandler<C>,
    {
        Self {
            raw: Some(RawCallable::new::<C, H>(callable)),
        }
    }

    /// Creates an empty function.
    ///
    /// Empty functions cannot be called, and they are ignored when added to a
    /// [`CallbackDispatcher`](crate::CallbackDispatcher).
    pub const fn empty() -> Self {
        Self { raw: None }
    }

    /// Returns `true` if this function holds no callable.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_none()
    }

    /// Calls the stored callable and converts its result into `R`.
    ///
    /// Panics raised by the callable propagate unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the function is empty. Use [`try_call`](Self::try_call) to
    /// handle that case.
    #[inline]
    #[track_caller]
    pub fn call(&self, args: A) -> R {
        match &self.raw {
            Some(raw) => raw.as_ref().invoke(args),
            None => panic!("called `Function::call` on an empty function"),
        }
    }

    /// Calls the stored callable, or returns [`EmptyFunctionError`] if the
    /// function is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use callchain::{EmptyFunctionError, Function};
    ///
    /// let f = Function::<i32, i32>::new(|value: i32| value + 1);
    /// assert_eq!(f.try_call(1), Ok(2));
    ///
    /// let empty = Function::<i32, i32>::empty();
    /// assert_eq!(empty.try_call(1), Err(EmptyFunctionError));
    /// ```
    #[inline]
    pub fn try_call(&self, args: A) -> Result<R, EmptyFunctionError> {
        let raw = self.raw.as_ref().ok_or(EmptyFunctionError)?;
        Ok(raw.as_ref().invoke(args))
    }

    /// Returns `true` if both functions are considered the same callable.
    ///
    /// This is the same as `==`.
    pub fn equals(&self, other: &Self) -> bool {
        match (&self.raw, &other.raw) {
            (Some(left), Some(right)) => left.as_ref().equals(right.as_ref()),
            (None, None) => true,
            _ => false,
        }
    }

    /// Returns the [`core::any::type_name`] of the stored callable, or
    /// [`None`] if the function is empty.
    ///
    /// Closures and function pointers are reported through an internal
    /// adapter type that names them.
    pub fn callable_type_name(&self) -> Option<&'static str> {
        Some(self.raw.as_ref()?.as_ref().callable_type_name())
    }
}

impl<A: 'static, R: 'static> Clone for Function<A, R> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
        }
    }
}

impl<A: 'static, R: 'static> Default for Function<A, R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A: 'static, R: 'static> PartialEq for Function<A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl<A: 'static, R: 'static> core::fmt::Debug for Function<A, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.callable_type_name() {
            Some(name) => f.debug_tuple("Function").field(&name).finish(),
            None => f.write_str("Function(<empty>)"),
        }
    }
}

/// Error returned by [`Function::try_call`] when the function is empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EmptyFunctionError;

impl core::fmt::Display for EmptyFunctionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "attempted to call an empty function")
    }
}

impl core::error::Error for EmptyFunctionError {}
