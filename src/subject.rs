//! Subjects are observers and observables at once: whatever is pushed into
//! them is multicast to every current subscriber.
//!
//! * [`PublishSubject`] forwards only what happens after subscription.
//! * [`ReplaySubject`] replays a bounded (or unbounded) history first.
//! * [`BehaviorSubject`] always holds a current value and hands it to every
//!   new subscriber.
//!
//! Once a subject has delivered a terminal event, late subscribers receive
//! that terminal event immediately. A disposed subject answers every
//! subscription with [`RxError::Disposed`](crate::error::RxError::Disposed).

mod behavior_subject;
mod publish_subject;
mod replay_subject;
mod subject_core;
mod subject_subscription;

use std::sync::Arc;

pub use behavior_subject::BehaviorSubject;
pub use publish_subject::PublishSubject;
pub use replay_subject::ReplaySubject;

use crate::{
  disposable::Disposable,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
};

/// Common surface of the subject flavors.
pub trait Subject<T: Send + 'static>:
  Observer<T> + Producer<T> + Disposable + Clone + 'static
{
  /// `true` while at least one observer is registered.
  fn has_observers(&self) -> bool;

  /// The input side, type-erased.
  fn as_observer(&self) -> AnyObserver<T> { Arc::new(self.clone()) }

  /// The output side, as a regular observable.
  fn as_observable(&self) -> Observable<T> { Observable::new(self.clone()) }
}

macro_rules! impl_subject {
  ($name:ident) => {
    impl<T> Clone for $name<T> {
      fn clone(&self) -> Self { $name { core: self.core.clone() } }
    }

    impl<T: Clone + Send + Sync + 'static> $crate::observer::Observer<T> for $name<T> {
      #[inline]
      fn on(&self, event: $crate::event::Event<T>) { self.core.on(event) }
    }

    impl<T: Clone + Send + Sync + 'static> $crate::observable::Producer<T> for $name<T> {
      #[inline]
      fn subscribe(
        &self, observer: $crate::observer::AnyObserver<T>,
      ) -> $crate::disposable::BoxedDisposable {
        self.core.subscribe(observer)
      }
    }

    impl<T: Send + Sync> $crate::disposable::Disposable for $name<T> {
      fn dispose(&self) { self.core.dispose() }

      fn is_disposed(&self) -> bool { self.core.is_disposed() }
    }

    impl<T: Clone + Send + Sync + 'static> $crate::subject::Subject<T> for $name<T> {
      fn has_observers(&self) -> bool { self.core.has_observers() }
    }
  };
}

pub(crate) use impl_subject;
