//! # waitfor
//!
//! Wait for asynchronous things with ordinary, sequential calls.
//!
//! A [`Registry`] holds named *waiters*. Each waiter takes one shape of asynchronous source, such
//! as a [`Deferred`] value, a [`ReadableStream`], an [`EventEmitter`], a [`Generator`] or a
//! callback-taking [`Function`], and blocks until it has produced its result. Blocking never
//! freezes the scheduler: while a waiter waits, the blocking bridge keeps ticking the current
//! thread's executor, which is usually what delivers the result in the first place.
//!
//! ```
//! use std::time::Duration;
//!
//! use waitfor::{registry, runtime::time::sleep, wait_for, Deferred};
//!
//! let wait = registry();
//! let answer = Deferred::from_future(async {
//!     sleep(Duration::from_millis(10)).await;
//!     Ok(42.into())
//! });
//!
//! assert_eq!(wait_for!(wait, promise, answer).unwrap(), 42.into());
//! ```
//!
//! New waiters are added with [`Registry::register`], given a second name with
//! [`Registry::alias`] and chained with [`Registry::compose`].

pub mod bridge;
mod compose;
mod config;
mod error;
mod registry;
pub mod value;
pub mod waiters;

pub use bridge::{Completion, LocalScheduler, Scheduler};
pub use compose::Composed;
pub use config::WaitConfig;
pub use error::{Result, WaitError};
pub use registry::{
    Registration, Registry, Waiter, WaiterDescriptor, WaiterFn, registry, waiter_fn,
};
pub use value::{
    Array, Chunk, Deferred, EventEmitter, Function, Generator, GeneratorFn, GeneratorState,
    ListenerId, Object, ReadableStream, Resolver, Value,
};

/// The single-threaded executor waiters block on.
#[doc(inline)]
pub use waitfor_async as runtime;
