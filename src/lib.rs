//! A queue of owned strings on a singly linked list.
//!
//! [`Queue`] is the owning container. [`handle`] exposes the same operations
//! over an optional queue for callers that have to model "no queue".

pub mod boxed;
pub mod error;
pub mod handle;
pub mod queue;

pub use error::{Error, Result};
pub use queue::{IntoIter, Iter, Queue};
