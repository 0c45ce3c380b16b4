//! Module containing the main callable data structure

mod data;
mod raw;
mod vtable;

pub use self::raw::{RawCallable, RawCallableRef};
