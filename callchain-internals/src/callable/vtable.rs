//! Vtable for type-erased callable operations.
//!
//! This module contains the [`CallableVtable`] which enables invoking and
//! comparing callables when their concrete type `F` and equality handler `H`
//! have been erased. The vtable stores function pointers that dispatch to the
//! correct typed implementations.
//!
//! This module encapsulates the fields of [`CallableVtable`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's type parameters must match the actual callable
//! type and handler stored in the [`CallableData`]**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`CallableVtable::new`], which pairs the function pointers
//! with specific types `F` and `H` at compile time.

use core::{any::TypeId, ptr::NonNull};

use crate::{
    callable::{
        data::CallableData,
        raw::{RawCallable, RawCallableRef},
    },
    handlers::{Callable, EqualityHandler},
    util::Erased,
};

/// Vtable for type-erased callable operations.
///
/// Contains function pointers for performing operations on callables without
/// knowing their concrete type at compile time. Only the signature `A -> R` is
/// part of the vtable's type.
///
/// # Safety Invariant
///
/// The fields `drop`, `clone_arc`, `strong_count`, `invoke` and `equals` are
/// guaranteed to point to the functions defined below instantiated with the
/// callable type `F` and handler type `H` that were used to create this
/// [`CallableVtable`].
pub(crate) struct CallableVtable<A: 'static, R: 'static> {
    /// Gets the [`TypeId`] of the callable type that was used to create this
    /// [`CallableVtable`].
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the callable type that was used to
    /// create this [`CallableVtable`].
    type_name: fn() -> &'static str,
    /// Gets the [`TypeId`] of the handler that was used to create this
    /// [`CallableVtable`].
    handler_type_id: fn() -> TypeId,
    /// Drops the [`triomphe::Arc<CallableData<F, A, R>>`] instance pointed to
    /// by this pointer.
    drop: unsafe fn(NonNull<CallableData<Erased, A, R>>),
    /// Clones the [`triomphe::Arc<CallableData<F, A, R>>`] pointed to by this
    /// pointer.
    clone_arc: unsafe fn(NonNull<CallableData<Erased, A, R>>) -> RawCallable<A, R>,
    /// Gets the strong count of the [`triomphe::Arc<CallableData<F, A, R>>`]
    /// pointed to by this pointer.
    strong_count: unsafe fn(NonNull<CallableData<Erased, A, R>>) -> usize,
    /// Invokes the callable and converts its output into `R`.
    invoke: unsafe fn(RawCallableRef<'_, A, R>, A) -> R,
    /// Compares two callables of the same concrete type using the handler.
    equals: unsafe fn(RawCallableRef<'_, A, R>, RawCallableRef<'_, A, R>) -> bool,
}

impl<A: 'static, R: 'static> CallableVtable<A, R> {
    /// Creates a new [`CallableVtable`] for the callable type `F` and the
    /// handler type `H`.
    pub(super) const fn new<F, H>() -> &'static Self
    where
        F: Callable<A>,
        F::Output: Into<R>,
        H: EqualityHandler<F>,
    {
        const {
            &Self {
                type_id: TypeId::of::<F>,
                type_name: core::any::type_name::<F>,
                handler_type_id: TypeId::of::<H>,
                drop: drop::<F, A, R>,
                clone_arc: clone_arc::<F, A, R>,
                strong_count: strong_count::<F, A, R>,
                invoke: invoke::<F, A, R>,
                equals: equals::<F, H, A, R>,
            }
        }
    }

    /// Gets the [`TypeId`] of the callable type that was used to create this
    /// [`CallableVtable`].
    #[inline]
    pub(super) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the [`core::any::type_name`] of the callable type that was used to
    /// create this [`CallableVtable`].
    #[inline]
    pub(super) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Gets the [`TypeId`] of the handler that was used to create this
    /// [`CallableVtable`].
    #[inline]
    pub(super) fn handler_type_id(&self) -> TypeId {
        (self.handler_type_id)()
    }

    /// Drops the `triomphe::Arc<CallableData<F, A, R>>` instance pointed to by
    /// this pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from [`triomphe::Arc<CallableData<F, A, R>>`] via
    ///    [`triomphe::Arc::into_raw`]
    /// 2. This [`CallableVtable`] must be a vtable for the callable type
    ///    stored in the [`CallableData`].
    /// 3. This method drops one strong reference, so the caller must ensure
    ///    that it owns that reference and will not use the pointer after
    ///    calling this method.
    #[inline]
    pub(super) unsafe fn drop(&self, ptr: NonNull<CallableData<Erased, A, R>>) {
        // SAFETY: We know that `self.drop` points to the function `drop::<F, A, R>`
        // below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        // 3. Guaranteed by the caller
        unsafe {
            (self.drop)(ptr);
        }
    }

    /// Clones the [`triomphe::Arc<CallableData<F, A, R>>`] pointed to by this
    /// pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from [`triomphe::Arc<CallableData<F, A, R>>`] via
    ///    [`triomphe::Arc::into_raw`]
    /// 2. This [`CallableVtable`] must be a vtable for the callable type
    ///    stored in the [`CallableData`].
    #[inline]
    pub(super) unsafe fn clone_arc(
        &self,
        ptr: NonNull<CallableData<Erased, A, R>>,
    ) -> RawCallable<A, R> {
        // SAFETY: We know that `self.clone_arc` points to the function
        // `clone_arc::<F, A, R>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.clone_arc)(ptr) }
    }

    /// Gets the strong count of the [`triomphe::Arc<CallableData<F, A, R>>`]
    /// pointed to by this pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The pointer comes from [`triomphe::Arc<CallableData<F, A, R>>`] via
    ///    [`triomphe::Arc::into_raw`]
    /// 2. This [`CallableVtable`] must be a vtable for the callable type
    ///    stored in the [`CallableData`].
    #[inline]
    pub(super) unsafe fn strong_count(&self, ptr: NonNull<CallableData<Erased, A, R>>) -> usize {
        // SAFETY: We know that `self.strong_count` points to the function
        // `strong_count::<F, A, R>` below. That function's safety requirements
        // are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.strong_count)(ptr) }
    }

    /// Invokes the callable using the [`Callable::call`] implementation of
    /// the type used when creating this [`CallableVtable`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`CallableVtable`] must be a vtable for the callable type
    ///    stored in the [`RawCallableRef`].
    #[inline]
    pub(super) unsafe fn invoke(&self, ptr: RawCallableRef<'_, A, R>, args: A) -> R {
        // SAFETY: We know that the `self.invoke` field points to the function
        // `invoke::<F, A, R>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.invoke)(ptr, args) }
    }

    /// Compares two callables using the [`H::equals`] function used when
    /// creating this [`CallableVtable`].
    ///
    /// [`H::equals`]: EqualityHandler::equals
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`CallableVtable`] must be a vtable for the callable type
    ///    stored in both `left` and `right`.
    #[inline]
    pub(super) unsafe fn equals(
        &self,
        left: RawCallableRef<'_, A, R>,
        right: RawCallableRef<'_, A, R>,
    ) -> bool {
        // SAFETY: We know that the `self.equals` field points to the function
        // `equals::<F, H, A, R>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.equals)(left, right) }
    }
}

/// Drops the [`triomphe::Arc<CallableData<F, A, R>>`] instance pointed to by
/// this pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from [`triomphe::Arc<CallableData<F, A, R>>`] via
///    [`triomphe::Arc::into_raw`]
/// 2. The callable type `F` matches the actual callable type stored in the
///    [`CallableData`]
/// 3. The pointer is not used after calling this method.
unsafe fn drop<F: 'static, A: 'static, R: 'static>(ptr: NonNull<CallableData<Erased, A, R>>) {
    let ptr: NonNull<CallableData<F, A, R>> = ptr.cast();
    let ptr = ptr.as_ptr();
    // SAFETY:
    // 1. The pointer has the correct type and came from `Arc::into_raw` (guaranteed
    //    by caller)
    // 2. After `from_raw`, the pointer is consumed and not accessed again
    let arc = unsafe { triomphe::Arc::from_raw(ptr) };
    core::mem::drop(arc);
}

/// Clones the [`triomphe::Arc<CallableData<F, A, R>>`] pointed to by this
/// pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from a [`triomphe::Arc<CallableData<F, A, R>>`]
///    turned into a pointer via [`triomphe::Arc::into_raw`]
/// 2. The callable type `F` matches the actual callable type stored in the
///    [`CallableData`]
unsafe fn clone_arc<F: 'static, A: 'static, R: 'static>(
    ptr: NonNull<CallableData<Erased, A, R>>,
) -> RawCallable<A, R> {
    let ptr: *const CallableData<F, A, R> = ptr.cast::<CallableData<F, A, R>>().as_ptr();

    // SAFETY: The pointer is valid and came from `Arc::into_raw` with the correct
    // type (guaranteed by the caller), which fulfills the requirements for
    // `ArcBorrow::from_ptr`.
    let arc_borrow = unsafe { triomphe::ArcBorrow::from_ptr(ptr) };

    RawCallable::from_arc(arc_borrow.clone_arc())
}

/// Gets the strong count of the [`triomphe::Arc<CallableData<F, A, R>>`]
/// pointed to by this pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The pointer comes from [`triomphe::Arc<CallableData<F, A, R>>`] via
///    [`triomphe::Arc::into_raw`]
/// 2. The callable type `F` matches the actual callable type stored in the
///    [`CallableData`]
unsafe fn strong_count<F: 'static, A: 'static, R: 'static>(
    ptr: NonNull<CallableData<Erased, A, R>>,
) -> usize {
    let ptr: *const CallableData<F, A, R> = ptr.cast::<CallableData<F, A, R>>().as_ptr();

    // SAFETY: The pointer is valid and came from `Arc::into_raw` with the correct
    // type (guaranteed by the caller), which fulfills the requirements for
    // `ArcBorrow::from_ptr`.
    let arc_borrow = unsafe { triomphe::ArcBorrow::from_ptr(ptr) };

    triomphe::ArcBorrow::strong_count(&arc_borrow)
}

/// Invokes a callable and converts the output into the signature's return
/// type.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `F` matches the actual callable type stored in the
///    [`CallableData`]
unsafe fn invoke<F, A: 'static, R: 'static>(ptr: RawCallableRef<'_, A, R>, args: A) -> R
where
    F: Callable<A>,
    F::Output: Into<R>,
{
    // SAFETY:
    // 1. Guaranteed by the caller
    let callable: &F = unsafe { ptr.callable_downcast_unchecked::<F>() };
    callable.call(args).into()
}

/// Compares two callables of type `F` using the handler `H`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The type `F` matches the actual callable type stored in both
///    [`CallableData`] instances
unsafe fn equals<F: 'static, H: EqualityHandler<F>, A: 'static, R: 'static>(
    left: RawCallableRef<'_, A, R>,
    right: RawCallableRef<'_, A, R>,
) -> bool {
    // SAFETY:
    // 1. Guaranteed by the caller
    let left: &F = unsafe { left.callable_downcast_unchecked::<F>() };
    // SAFETY:
    // 1. Guaranteed by the caller
    let right: &F = unsafe { right.callable_downcast_unchecked::<F>() };
    H::equals(left, right)
}
