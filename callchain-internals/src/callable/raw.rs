//! Type-erased callable pointer types.
//!
//! This module encapsulates the `ptr` field of [`RawCallable`] and
//! [`RawCallableRef`], ensuring it is only visible within this module. This
//! visibility restriction guarantees the safety invariant: **the pointer always
//! comes from `Arc<CallableData<F, A, R>>`**.
//!
//! # Safety Invariant
//!
//! Since the `ptr` field can only be set via [`RawCallable::new`] or
//! [`RawCallable::from_arc`] (which create it from `Arc::into_raw`), and cannot
//! be modified afterward, the pointer provenance remains valid throughout the
//! value's lifetime.
//!
//! The [`RawCallable::drop`] implementation and the reference counting
//! operations rely on this invariant to reconstruct the `Arc`.
//!
//! # Type Erasure
//!
//! The concrete callable type `F` is erased by casting to
//! `CallableData<Erased, A, R>`. The vtable stored within the `CallableData`
//! provides the runtime type information needed to invoke and compare the
//! callable. The signature `A -> R` stays visible in the type.
//!
//! # Allocation Strategy
//!
//! Callables use `triomphe::Arc` for storage, so cloning a [`RawCallable`]
//! shares the allocation. Two handles sharing an allocation are the same
//! callable for the purpose of [`RawCallableRef::equals`], which is what makes
//! removal by identity work for values that have no equality of their own.

use core::{any::TypeId, ptr::NonNull};

use crate::{
    callable::data::CallableData,
    handlers::{Callable, EqualityHandler},
    util::Erased,
};

/// A pointer to a [`CallableData`] that is guaranteed to point to an
/// initialized instance of a [`CallableData<F, A, R>`] for some specific `F`,
/// though we do not know which actual `F` it is.
///
/// However, the pointer is allowed to transition into a non-initialized state
/// inside the [`RawCallable::drop`] method.
///
/// The pointer is guaranteed to have been created using
/// [`triomphe::Arc::into_raw`].
#[repr(transparent)]
pub struct RawCallable<A: 'static, R: 'static> {
    /// Pointer to the inner callable data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer must have been created from a
    ///    `triomphe::Arc<CallableData<F, A, R>>` for some `F` using
    ///    `triomphe::Arc::into_raw`.
    /// 2. The pointer owns one strong reference of that `Arc`.
    /// 3. The pointer will point to the same `CallableData<F, A, R>` for the
    ///    entire lifetime of this object.
    ptr: NonNull<CallableData<Erased, A, R>>,
}

impl<A: 'static, R: 'static> RawCallable<A, R> {
    /// Creates a new [`RawCallable`] from a
    /// [`triomphe::Arc<CallableData<F, A, R>>`].
    #[inline]
    pub(super) fn from_arc<F: 'static>(data: triomphe::Arc<CallableData<F, A, R>>) -> Self {
        let ptr: *const CallableData<F, A, R> = triomphe::Arc::into_raw(data);
        let ptr: *mut CallableData<Erased, A, R> =
            ptr.cast::<CallableData<Erased, A, R>>().cast_mut();

        // SAFETY:
        // 1. Triomphe guarantees that `Arc::into_raw` returns a non-null pointer.
        let ptr: NonNull<CallableData<Erased, A, R>> = unsafe { NonNull::new_unchecked(ptr) };

        Self { ptr }
    }

    /// Creates a new [`RawCallable`] storing `callable`, compared using the
    /// handler `H`.
    ///
    /// The created callable has a strong count of 1.
    #[inline]
    pub fn new<F, H>(callable: F) -> Self
    where
        F: Callable<A>,
        F::Output: Into<R>,
        H: EqualityHandler<F>,
    {
        let data = triomphe::Arc::new(CallableData::new::<H>(callable));
        Self::from_arc(data)
    }

    /// Returns a reference to the [`CallableData`] instance.
    #[inline]
    pub fn as_ref(&self) -> RawCallableRef<'_, A, R> {
        RawCallableRef {
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }
}

impl<A: 'static, R: 'static> Clone for RawCallable<A, R> {
    #[inline]
    fn clone(&self) -> Self {
        let vtable = self.as_ref().vtable();

        // SAFETY:
        // 1. The pointer comes from `Arc::into_raw` (guaranteed by the invariants
        //    on this type)
        // 2. The vtable returned by `self.as_ref().vtable()` is guaranteed to match
        //    the data in the `CallableData`.
        unsafe { vtable.clone_arc(self.ptr) }
    }
}

impl<A: 'static, R: 'static> core::ops::Drop for RawCallable<A, R> {
    #[inline]
    fn drop(&mut self) {
        let vtable = self.as_ref().vtable();

        // SAFETY:
        // 1. The pointer comes from `Arc::into_raw` (guaranteed by the invariants
        //    on this type)
        // 2. The vtable returned by `self.as_ref().vtable()` is guaranteed to match
        //    the data in the `CallableData`.
        // 3. We own one strong reference and the pointer is not used after this
        //    call, as we are in the drop function.
        unsafe {
            vtable.drop(self.ptr);
        }
    }
}

/// A lifetime-bound pointer to a [`CallableData`] that is guaranteed to point
/// to an initialized instance of a [`CallableData<F, A, R>`] for some specific
/// `F`, though we do not know which actual `F` it is.
///
/// We cannot use a [`&'a CallableData<F, A, R>`] directly, because that would
/// require us to know the actual type of the callable, which we do not.
///
/// [`&'a CallableData<F, A, R>`]: CallableData
#[repr(transparent)]
pub struct RawCallableRef<'a, A: 'static, R: 'static> {
    /// Pointer to the inner callable data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer must have been created from a
    ///    `triomphe::Arc<CallableData<F, A, R>>` for some `F` using
    ///    `triomphe::Arc::into_raw`.
    /// 2. The pointer will point to the same `CallableData<F, A, R>` for the
    ///    entire lifetime of this object.
    ptr: NonNull<CallableData<Erased, A, R>>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a CallableData<Erased, A, R>`
    _marker: core::marker::PhantomData<&'a CallableData<Erased, A, R>>,
}

impl<A: 'static, R: 'static> Clone for RawCallableRef<'_, A, R> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: 'static, R: 'static> Copy for RawCallableRef<'_, A, R> {}

impl<'a, A: 'static, R: 'static> RawCallableRef<'a, A, R> {
    /// Casts the [`RawCallableRef`] to a [`CallableData<F, A, R>`] reference.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `F` matches the actual callable type stored in the
    ///    [`CallableData`].
    #[inline]
    pub(super) unsafe fn cast_inner<F: 'static>(self) -> &'a CallableData<F, A, R> {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.vtable().type_id(), TypeId::of::<F>());

        let this = self.ptr.cast::<CallableData<F, A, R>>();
        // SAFETY: Converting the NonNull pointer to a reference is sound because:
        // - The pointer is non-null, properly aligned, and dereferenceable (guaranteed
        //   by RawCallableRef's type invariants)
        // - The pointee is properly initialized
        // - The type `F` matches the actual callable type (guaranteed by caller)
        // - Only shared access is ever handed out
        // - The reference lifetime 'a is valid (tied to RawCallableRef<'a>'s lifetime)
        unsafe { this.as_ref() }
    }

    /// Returns a raw pointer to the [`CallableData`] instance.
    #[inline]
    pub(super) fn as_ptr(self) -> *const CallableData<Erased, A, R> {
        self.ptr.as_ptr()
    }

    /// Returns the [`TypeId`] of the stored callable.
    #[inline]
    pub fn callable_type_id(self) -> TypeId {
        self.vtable().type_id()
    }

    /// Returns the [`core::any::type_name`] of the stored callable.
    #[inline]
    pub fn callable_type_name(self) -> &'static str {
        self.vtable().type_name()
    }

    /// Returns the [`TypeId`] of the equality handler.
    #[inline]
    pub fn handler_type_id(self) -> TypeId {
        self.vtable().handler_type_id()
    }

    /// Returns `true` if both references point to the same allocation.
    #[inline]
    pub fn ptr_eq(self, other: RawCallableRef<'_, A, R>) -> bool {
        self.ptr == other.ptr
    }

    /// Invokes the stored callable using its [`Callable::call`]
    /// implementation and converts the output into `R`.
    #[inline]
    pub fn invoke(self, args: A) -> R {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The vtable returned by `self.vtable()` is guaranteed to match the data in
        //    the `CallableData`.
        unsafe { vtable.invoke(self, args) }
    }

    /// Compares two callables.
    ///
    /// Two references are equal when they point to the same allocation, or
    /// when both store the same concrete type created with the same equality
    /// handler and that handler reports them equal. Callables of different
    /// concrete types are never equal.
    #[inline]
    pub fn equals(self, other: RawCallableRef<'_, A, R>) -> bool {
        if self.ptr_eq(other) {
            return true;
        }

        let vtable = self.vtable();
        let other_vtable = other.vtable();
        if vtable.type_id() != other_vtable.type_id()
            || vtable.handler_type_id() != other_vtable.handler_type_id()
        {
            return false;
        }

        // SAFETY:
        // 1. The vtable returned by `self.vtable()` matches the data in `self`, and
        //    we just checked that `other` stores the same callable type created with
        //    the same handler.
        unsafe { vtable.equals(self, other) }
    }

    /// Gets the strong count of the inner [`triomphe::Arc`].
    #[inline]
    pub fn strong_count(self) -> usize {
        let vtable = self.vtable();
        // SAFETY:
        // 1. The pointer comes from `Arc::into_raw` (guaranteed by the invariants on
        //    this type)
        // 2. The vtable returned by `self.vtable()` is guaranteed to match the data in
        //    the `CallableData`.
        unsafe { vtable.strong_count(self.ptr) }
    }
}
