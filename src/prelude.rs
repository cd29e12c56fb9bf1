//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Disposables
pub use crate::disposable::{BoxedDisposable, Disposable, DisposableExt, Disposables};
// Errors and events
pub use crate::error::RxError;
pub use crate::event::Event;
// Observable core
pub use crate::observable::{ConnectableObservable, Connection, Observable, Producer};
// Observer trait and closure observers
pub use crate::observer::{on_completed, on_error, on_next, AnyObserver, Observer, ObserverFn};
// Scheduler traits
pub use crate::scheduler::{
  schedule_recursive, CurrentThreadScheduler, ImmediateScheduler, ImmediateSchedulerExt,
  MainScheduler, Scheduler, SchedulerExt, VirtualTimeScheduler,
};
// Subjects
pub use crate::subject::{BehaviorSubject, PublishSubject, ReplaySubject, Subject};
