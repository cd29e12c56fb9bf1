//! Shared helpers for unit tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{event::Event, observer::Observer};

/// Records every event it receives, without filtering anything, so tests can
/// assert on protocol violations as well as on values.
pub(crate) struct Recorder<T> {
  events: Mutex<Vec<Event<T>>>,
}

impl<T: Clone> Recorder<T> {
  pub(crate) fn new() -> Arc<Self> { Arc::new(Recorder { events: Mutex::new(vec![]) }) }

  pub(crate) fn events(&self) -> Vec<Event<T>> { self.events.lock().clone() }

  /// The `Next` values received so far.
  pub(crate) fn values(&self) -> Vec<T> {
    self.events.lock().iter().filter_map(|e| e.clone().element()).collect()
  }

  pub(crate) fn terminal_count(&self) -> usize {
    self.events.lock().iter().filter(|e| e.is_terminal()).count()
  }
}

impl<T: Send> Observer<T> for Recorder<T> {
  fn on(&self, event: Event<T>) { self.events.lock().push(event) }
}
