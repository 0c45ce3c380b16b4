#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`callchain`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased storage for callables that
//! powers the [`callchain`] library. A callable of any concrete type is placed
//! in a reference-counted allocation next to a `&'static` vtable, and from then
//! on it is handled through a pointer that only knows the call signature.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`callchain`] crate,
//! not this one.
//!
//! # Architecture
//!
//! - **[`callable`]**: Type-erased callable storage
//!   - [`RawCallable`]: Owned, cloneable handle with [`Arc`]-based allocation
//!   - [`RawCallableRef`]: Borrowed reference to a callable
//!   - [`CallableData`]: `#[repr(C)]` wrapper enabling field access on erased
//!     types
//!   - [`CallableVtable`]: Function pointers for type-erased dispatch
//!
//! - **[`handlers`]**: Trait definitions for invocation and comparison
//!   - [`Callable`]: How a stored value is invoked
//!   - [`EqualityHandler`]: How two stored values of the same type are
//!     compared
//!
//! # Safety Strategy
//!
//! Type erasure requires that the vtable function pointers always match the
//! concrete type stored in memory. When a `CallableData<F, A, R>` is erased to
//! `CallableData<Erased, A, R>`, the vtable it carries was instantiated with
//! that same `F`, and nothing in the API can replace either of them.
//!
//! This crate maintains safety through:
//!
//! - **Module-based encapsulation**: Safety-critical fields are
//!   module-private, so each invariant can be verified inside a single file
//! - **`#[repr(C)]` layout**: The vtable is the first field, so it can be read
//!   through an erased pointer without constructing an invalid reference
//! - **Documented vtable contracts**: Each vtable method states exactly when it
//!   can be called
//!
//! [`callchain`]: https://docs.rs/callchain/latest/callchain/
//! [`callable`]: crate::callable
//! [`CallableData`]: callable::data::CallableData
//! [`CallableVtable`]: callable::vtable::CallableVtable
//! [`Callable`]: handlers::Callable
//! [`EqualityHandler`]: handlers::EqualityHandler
//! [`Arc`]: triomphe::Arc

extern crate alloc;

mod callable;
pub mod handlers;
mod util;

pub use callable::{RawCallable, RawCallableRef};
