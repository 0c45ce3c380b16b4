//! Commonly used items for convenient importing.
//!
//! ```rust
//! use callchain::prelude::*;
//!
//! let chain = CallbackDispatcher::<i32, i32>::new();
//! chain.add(
//!     CallbackDispatcher::listener(|_, value: i32| value + 1),
//!     Placement::Back,
//! );
//! assert_eq!(chain.call(1), Some(2));
//! ```

pub use crate::{CallbackDispatcher, Event, Function, Listener, Method, Placement, handlers};
