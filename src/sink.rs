//! Per-subscription forwarding state shared by every operator.
//!
//! An operator's `subscribe` builds a sink struct that embeds a [`Sink`],
//! implements [`Observer`] for the upstream element type and [`Disposable`]
//! for the caller. The embedded `Sink` owns the downstream observer, the
//! upstream subscription and the two flags that make "nothing after the
//! terminal event" and "nothing after dispose" hold under races.

use std::sync::Arc;

use tracing::trace;

use crate::{
  disposable::{BoxedDisposable, Disposable, SingleAssignmentDisposable},
  event::Event,
  observable::Observable,
  observer::{AnyObserver, Observer, StopFlag},
};

pub(crate) struct Sink<T> {
  observer: AnyObserver<T>,
  stopped: StopFlag,
  disposed: StopFlag,
  upstream: SingleAssignmentDisposable,
}

impl<T> Sink<T> {
  pub(crate) fn new(observer: AnyObserver<T>) -> Self {
    Sink {
      observer,
      stopped: StopFlag::new(),
      disposed: StopFlag::new(),
      upstream: SingleAssignmentDisposable::new(),
    }
  }

  /// Delivers `event` downstream unless the sink was disposed or already
  /// delivered a terminal event.
  pub(crate) fn forward_on(&self, event: Event<T>) {
    if self.disposed.is_stopped() {
      return;
    }
    match event {
      Event::Next(_) if self.stopped.is_stopped() => {}
      Event::Next(_) => self.observer.on(event),
      _ if self.stopped.try_stop() => self.observer.on(event),
      Event::Error(err) => trace!(error = %err, "error after termination swallowed"),
      Event::Completed => trace!("completion after termination dropped"),
    }
  }

  /// Forwards a terminal event and releases the subscription.
  pub(crate) fn forward_terminal(&self, event: Event<T>) {
    self.forward_on(event);
    self.dispose();
  }

  /// Hands the sink its upstream subscription. Called once, right after the
  /// upstream `subscribe` returns; if the sink already disposed itself the
  /// subscription is disposed on the spot.
  pub(crate) fn set_upstream(&self, upstream: BoxedDisposable) { self.upstream.set(upstream) }
}

impl<T> Disposable for Sink<T> {
  fn dispose(&self) {
    if self.disposed.try_stop() {
      self.upstream.dispose();
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.is_stopped() }
}

/// Subscribes `sink` to `source` and wires the resulting subscription into
/// the sink's [`Sink`], reached through `base`.
pub(crate) fn run<T, U, S>(
  source: &Observable<T>, sink: S, base: fn(&S) -> &Sink<U>,
) -> BoxedDisposable
where
  T: Send + 'static,
  U: 'static,
  S: Observer<T> + Disposable + 'static,
{
  let sink = Arc::new(sink);
  let upstream = source.subscribe(sink.clone());
  base(&sink).set_upstream(upstream);
  Box::new(sink)
}
