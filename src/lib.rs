//! # rxcore: a reactive-stream core
//!
//! Composable push-based sequences ([`Observable`]) consumed by observers
//! ([`Observer`]), transformed by operators, moved between execution
//! contexts by schedulers and cancelled through disposables.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! Observable::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe_next(|v| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Cold stream description; every `subscribe` is independent |
//! | [`Observer`] | Consumes `Next`, `Error` and `Completed` events |
//! | [`Disposable`] | Handle to cancel a subscription or scheduled work |
//! | [`Scheduler`] | Decides where and when work runs |
//! | [`PublishSubject`] and friends | Observer and observable at once, for multicasting |
//!
//! ## Guarantees
//!
//! * An observer receives `Next* (Error | Completed)?` and nothing after the
//!   terminal event, even when several threads race to deliver.
//! * Disposing is idempotent and stops delivery; the chain releases its
//!   upstream subscriptions.
//! * Synchronous sources are driven by a per-thread trampoline, so `take`
//!   and `first` stop even endless ones and long chains do not grow the
//!   stack.
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): [`ThreadPoolScheduler`] on the
//!   `futures` thread pool.
//! - **`tokio-scheduler`**: `TokioScheduler` on a tokio runtime handle.
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Disposable`]: disposable::Disposable
//! [`Scheduler`]: scheduler::Scheduler
//! [`PublishSubject`]: subject::PublishSubject
//! [`ThreadPoolScheduler`]: scheduler::ThreadPoolScheduler

pub mod disposable;
pub mod error;
pub mod event;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subject;

mod sink;
#[cfg(test)]
mod test_util;

pub use prelude::*;
pub use scheduler::defaults as schedulers;
