#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Extra checks on nightly
#![cfg_attr(nightly_extra_checks, feature(rustdoc_missing_doc_code_examples))]
#![cfg_attr(nightly_extra_checks, forbid(rustdoc::missing_doc_code_examples))]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Comparable type-erased functions and chain-of-responsibility dispatch.
//!
//! ## Overview
//!
//! This crate provides two building blocks for callback-driven code:
//!
//! - [`Function<A, R>`] stores any closure, function pointer, bound method or
//!   callable value behind one type, and can tell at runtime whether two
//!   functions are the same. That makes it possible to register a callback
//!   and later unregister it with an equal handle.
//! - [`CallbackDispatcher<A, R>`] holds an ordered chain of listeners. Each
//!   listener receives an [`Event`] and decides whether the rest of the chain
//!   runs by calling [`Event::next`]. The chain can be changed from inside a
//!   running listener.
//!
//! ## Quick Example
//!
//! ```
//! use callchain::prelude::*;
//!
//! type Chain = CallbackDispatcher<i32, i32>;
//!
//! let chain = Chain::new();
//! let logger = Chain::listener(|event, value| {
//!     println!("dispatching {value}");
//!     event.next(value)
//! });
//! chain.add_back(logger.clone());
//! chain.add_back(Chain::listener(|_, value: i32| value * 2));
//!
//! assert_eq!(chain.call(21), Some(42));
//!
//! chain.remove(&logger);
//! assert_eq!(chain.len(), 1);
//! ```
//!
//! ## Arguments and Results
//!
//! Every callable in this crate takes a single argument. Several arguments
//! are passed as a tuple and no arguments as `()`. The value a callable
//! returns only has to convert into the declared result type with [`Into`],
//! so a closure returning `i32` can be stored as a `Function<_, i64>` or as a
//! listener of a `CallbackDispatcher<_, i32>`, whose listeners produce
//! `Option<i32>`.
//!
//! ## Equality
//!
//! Equality is chosen when a function is created, through a handler from the
//! [`handlers`] module:
//!
//! - [`Function::new`] and [`CallbackDispatcher::listener`] compare by
//!   identity: a function equals itself and its clones.
//! - [`Function::comparable`] and [`CallbackDispatcher::comparable_listener`]
//!   compare by value, e.g. function pointers by address.
//! - [`Function::from_method`] compares a [`Method`] by receiver identity and
//!   method pointer.
//! - [`Function::new_custom`] accepts any
//!   [`EqualityHandler`](handlers::EqualityHandler).
//!
//! ## Dispatch and Mutation
//!
//! A dispatch walks the chain front to back. Listeners may add listeners,
//! remove any listener including themselves, clear the chain or start a
//! nested dispatch. Removal is immediate: a removed listener is never called
//! again, not even by a dispatch that is already in progress. Listeners that
//! are already running finish normally.
//!
//! ## Threads
//!
//! Functions and dispatchers are single-threaded. They are neither [`Send`]
//! nor [`Sync`].
//!
//! ## Logging
//!
//! The dispatcher emits [`tracing`] events at the `trace` and `debug` levels
//! when listeners are added or removed. No subscriber is installed by this
//! crate.
//!
//! ## Features
//!
//! - `std`: enables the `std` feature of [`tracing`]. The crate is `no_std`
//!   (with `alloc`) otherwise.
//!
//! ## Project Structure
//!
//! The type-erased storage lives in the separate `callchain-internals` crate.
//! It contains the unsafe code and is not meant to be used directly.

extern crate alloc;

pub mod dispatcher;
mod function;
pub mod handlers;
mod method;
pub mod prelude;

pub use self::{
    dispatcher::{CallbackDispatcher, Event, Listener, Placement},
    function::{EmptyFunctionError, Function},
    method::Method,
};
