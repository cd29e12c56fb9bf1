//! Hot observables: one upstream subscription shared through a subject.

use std::sync::{
  atomic::{AtomicU64, Ordering},
  Arc, Weak,
};

use parking_lot::Mutex;
use tracing::debug;

use crate::{
  disposable::{BoxedDisposable, Disposable, SingleAssignmentDisposable},
  event::Event,
  observable::Observable,
  observer::{AnyObserver, Observer, StopFlag},
  subject::Subject,
};

type SubjectPair<T> = (AnyObserver<T>, Observable<T>);
type SubjectFactory<T> = Box<dyn Fn() -> SubjectPair<T> + Send + Sync>;

struct ConnectableState<T> {
  subject: Option<SubjectPair<T>>,
  connection: Option<Connection>,
}

struct Inner<T> {
  source: Observable<T>,
  make_subject: SubjectFactory<T>,
  next_id: AtomicU64,
  state: Mutex<ConnectableState<T>>,
}

/// An observable whose subscribers share one subscription to the source,
/// established by [`connect`](ConnectableObservable::connect).
///
/// Subscribing registers with the internal subject only. The subject is
/// created on first use and recreated once a connection ends, so a later
/// `connect` starts over with fresh state (unless the subject was supplied
/// directly with `multicast`, in which case the same subject is reused).
pub struct ConnectableObservable<T> {
  inner: Arc<Inner<T>>,
}

impl<T> Clone for ConnectableObservable<T> {
  fn clone(&self) -> Self { ConnectableObservable { inner: self.inner.clone() } }
}

impl<T: Send + 'static> ConnectableObservable<T> {
  pub(crate) fn new<S, F>(source: Observable<T>, make_subject: F) -> Self
  where
    S: Subject<T>,
    F: Fn() -> S + Send + Sync + 'static,
  {
    let make_subject: SubjectFactory<T> = Box::new(move || {
      let subject = make_subject();
      (subject.as_observer(), subject.as_observable())
    });
    ConnectableObservable {
      inner: Arc::new(Inner {
        source,
        make_subject,
        next_id: AtomicU64::new(0),
        state: Mutex::new(ConnectableState { subject: None, connection: None }),
      }),
    }
  }

  /// Registers `observer` with the current subject.
  pub fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    let subject = {
      let mut state = self.inner.state.lock();
      let (_, observable) = state.subject.get_or_insert_with(|| (self.inner.make_subject)());
      observable.clone()
    };
    subject.subscribe(observer)
  }

  /// Subscribes the subject to the source, unless that already happened, in
  /// which case the live connection is returned. Disposing the connection
  /// disconnects every subscriber from the source.
  pub fn connect(&self) -> Connection {
    let (connection, subject) = {
      let mut state = self.inner.state.lock();
      if let Some(connection) = &state.connection {
        return connection.clone();
      }
      let (observer, _) = state.subject.get_or_insert_with(|| (self.inner.make_subject)());
      let observer = observer.clone();
      let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
      let connection = Connection::new(id, Arc::downgrade(&self.inner));
      state.connection = Some(connection.clone());
      (connection, observer)
    };
    debug!(connection = connection.inner.id, "connectable connected");

    let observer = Arc::new(ConnectionObserver {
      connection: Arc::downgrade(&connection.inner),
      subject,
    });
    let subscription = self.inner.source.subscribe(observer);
    connection.inner.subscription.set(subscription);
    connection
  }

  /// Wraps this connectable back into a regular observable; subscribers are
  /// registered with the subject but nothing connects.
  pub fn as_observable(&self) -> Observable<T> { Observable::new(self.clone()) }
}

impl<T: Send + 'static> crate::observable::Producer<T> for ConnectableObservable<T> {
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    ConnectableObservable::subscribe(self, observer)
  }
}

// ============================================================================
// Connection
// ============================================================================

type Release = Box<dyn FnOnce(u64) + Send>;

struct ConnectionInner {
  id: u64,
  disposed: StopFlag,
  subscription: SingleAssignmentDisposable,
  release: Mutex<Option<Release>>,
}

/// Handle of a live connection. Clones refer to the same connection.
#[derive(Clone)]
pub struct Connection {
  inner: Arc<ConnectionInner>,
}

impl Connection {
  fn new<T: Send + 'static>(id: u64, parent: Weak<Inner<T>>) -> Self {
    let release: Release = Box::new(move |id| {
      let Some(parent) = parent.upgrade() else { return };
      let released = {
        let mut state = parent.state.lock();
        match &state.connection {
          Some(current) if current.inner.id == id => {
            Some((state.connection.take(), state.subject.take()))
          }
          _ => None,
        }
      };
      drop(released);
    });
    Connection {
      inner: Arc::new(ConnectionInner {
        id,
        disposed: StopFlag::new(),
        subscription: SingleAssignmentDisposable::new(),
        release: Mutex::new(Some(release)),
      }),
    }
  }
}

impl Disposable for Connection {
  fn dispose(&self) { ConnectionInner::dispose(&self.inner) }

  fn is_disposed(&self) -> bool { self.inner.disposed.is_stopped() }
}

impl ConnectionInner {
  fn dispose(&self) {
    if !self.disposed.try_stop() {
      return;
    }
    let release = self.release.lock().take();
    if let Some(release) = release {
      release(self.id);
    }
    self.subscription.dispose();
    debug!(connection = self.id, "connectable disconnected");
  }
}

/// Feeds the source into the subject for as long as its connection lives.
struct ConnectionObserver<T> {
  connection: Weak<ConnectionInner>,
  subject: AnyObserver<T>,
}

impl<T> Observer<T> for ConnectionObserver<T> {
  fn on(&self, event: Event<T>) {
    let Some(connection) = self.connection.upgrade() else { return };
    if connection.disposed.is_stopped() {
      return;
    }
    if event.is_terminal() {
      connection.dispose();
    }
    self.subject.on(event);
  }
}
