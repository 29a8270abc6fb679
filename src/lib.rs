//! Thenable promises for rust.
//!
//! A [`Promise`] settles exactly once, fulfilled with a value or rejected with
//! an error, and can be chained with [`then`](Promise::then),
//! [`map`](Promise::map), [`flat_map`](Promise::flat_map),
//! [`catch`](Promise::catch) and [`always`](Promise::always). There is no
//! executor: continuations run on the thread that settles the promise, or
//! immediately if it is already settled.
//!
//! # Examples
//!
//! ```
//! use promise_then::Promise;
//! use std::sync::{Arc, Mutex};
//!
//! let cleaned_up = Arc::new(Mutex::new(false));
//! let flag = cleaned_up.clone();
//! let total = Promise::<u32, String>::resolve(20)
//!     .map(|x| x + 1)
//!     .flat_map(|x| Promise::resolve(x * 2))
//!     .always(move || *flag.lock().unwrap() = true);
//!
//! assert_eq!(total.peek(), Some(Ok(42)));
//! assert!(*cleaned_up.lock().unwrap());
//! ```
use thiserror::Error;

mod future;
mod handlers;
mod promise;
mod state;
mod then;

pub use future::Waiter;
pub use handlers::Handlers;
pub use promise::{Promise, Reject, Resolve};

/// Why waiting on a promise did not produce its value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WaitError<E> {
    #[error("promise was rejected")]
    Rejected(E),
    #[error("promise can no longer be settled: every handle and resolver was dropped")]
    Abandoned,
}
