//! This module encapsulates the fields of the [`CallableData`]. Since this is
//! the only place they are visible, the [`CallableVtable`] stored next to a
//! callable is guaranteed to always be in sync with the type of the callable
//! itself. They are in sync when created and the API offers no way to change
//! either of them afterwards.

use crate::{
    callable::{raw::RawCallableRef, vtable::CallableVtable},
    handlers::{Callable, EqualityHandler},
};

/// Type-erased callable data structure with vtable-based dispatch.
///
/// This struct uses `#[repr(C)]` to enable safe field access in type-erased
/// contexts, allowing access to the vtable field even when the concrete
/// callable type `F` is unknown. The signature types `A` and `R` are never
/// erased.
#[repr(C)]
pub(super) struct CallableData<F: 'static, A: 'static, R: 'static> {
    /// The vtable of this callable
    vtable: &'static CallableVtable<A, R>,
    /// The stored callable value
    callable: F,
}

impl<F: 'static, A: 'static, R: 'static> CallableData<F, A, R> {
    /// Creates a new [`CallableData`] with the specified equality handler and
    /// callable.
    ///
    /// This method creates the vtable for type-erased dispatch and pairs it
    /// with the callable.
    #[inline]
    pub(super) fn new<H>(callable: F) -> Self
    where
        F: Callable<A>,
        F::Output: Into<R>,
        H: EqualityHandler<F>,
    {
        Self {
            vtable: CallableVtable::new::<F, H>(),
            callable,
        }
    }
}

impl<'a, A: 'static, R: 'static> RawCallableRef<'a, A, R> {
    /// Returns a reference to the [`CallableVtable`] of the [`CallableData`]
    /// instance.
    #[inline]
    pub(super) fn vtable(self) -> &'static CallableVtable<A, R> {
        let ptr = self.as_ptr();
        // SAFETY: We don't know the actual callable type, but we do know that the
        // pointer refers to an instance of `CallableData<F, A, R>` for some
        // specific `F`. Since `CallableData` is `#[repr(C)]` and the vtable is
        // its first field, it is sound to create a pointer to that field.
        //
        // No reference to the `CallableData` itself is created, as that would
        // require knowing the right type.
        let vtable_ptr: *const &'static CallableVtable<A, R> = unsafe { &raw const (*ptr).vtable };

        // SAFETY: Reading the `&'static CallableVtable` out of the field is valid
        // for the same reasons.
        unsafe { *vtable_ptr }
    }

    /// Accesses the stored callable as a reference to the specified type.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the type `F` matches the actual callable
    /// type stored in the [`CallableData`].
    #[inline]
    pub unsafe fn callable_downcast_unchecked<F: 'static>(self) -> &'a F {
        // SAFETY: The inner function requires that `F` matches the type stored,
        // which is guaranteed by our caller.
        let this = unsafe { self.cast_inner::<F>() };
        &this.callable
    }
}
