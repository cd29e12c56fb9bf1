use std::{
  collections::VecDeque,
  sync::{Arc, Weak},
};

use parking_lot::Mutex;

use crate::{
  disposable::{BoxedDisposable, Disposable, Disposables, SerialDisposable},
  event::Event,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
  scheduler::ImmediateScheduler,
  sink::Sink,
};

struct ObserveOn<T, S: ?Sized> {
  source: Observable<T>,
  scheduler: Arc<S>,
}

struct Queue<T> {
  events: VecDeque<Event<T>>,
  draining: bool,
}

struct ObserveOnSink<T, S: ?Sized> {
  me: Weak<Self>,
  sink: Sink<T>,
  queue: Mutex<Queue<T>>,
  drain: SerialDisposable,
  scheduler: Arc<S>,
}

impl<T, S> ObserveOnSink<T, S>
where
  T: Send + 'static,
  S: ImmediateScheduler + ?Sized + 'static,
{
  fn drain(&self) {
    loop {
      let event = {
        let mut queue = self.queue.lock();
        match queue.events.pop_front() {
          Some(event) => event,
          None => {
            queue.draining = false;
            return;
          }
        }
      };
      if event.is_terminal() {
        self.sink.forward_on(event);
        self.dispose();
        return;
      }
      self.sink.forward_on(event);
    }
  }
}

impl<T, S> Observer<T> for ObserveOnSink<T, S>
where
  T: Send + 'static,
  S: ImmediateScheduler + ?Sized + 'static,
{
  fn on(&self, event: Event<T>) {
    {
      let mut queue = self.queue.lock();
      if self.sink.is_disposed() {
        return;
      }
      queue.events.push_back(event);
      if queue.draining {
        return;
      }
      queue.draining = true;
    }
    let Some(me) = self.me.upgrade() else { return };
    let scheduled = self.scheduler.schedule_action(Box::new(move || {
      me.drain();
      Disposables::nop()
    }));
    self.drain.set(scheduled);
  }
}

impl<T: Send, S: Send + Sync + ?Sized> Disposable for ObserveOnSink<T, S> {
  fn dispose(&self) {
    self.sink.dispose();
    self.drain.dispose();
    let dropped = std::mem::take(&mut self.queue.lock().events);
    drop(dropped);
  }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}

impl<T, S> Producer<T> for ObserveOn<T, S>
where
  T: Send + 'static,
  S: ImmediateScheduler + ?Sized + 'static,
{
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    let sink = Arc::new_cyclic(|me| ObserveOnSink {
      me: me.clone(),
      sink: Sink::new(observer),
      queue: Mutex::new(Queue { events: VecDeque::new(), draining: false }),
      drain: SerialDisposable::new(),
      scheduler: self.scheduler.clone(),
    });
    let upstream = self.source.subscribe(sink.clone());
    sink.sink.set_upstream(upstream);
    Box::new(sink)
  }
}

impl<T: Send + 'static> Observable<T> {
  /// Delivers every event on `scheduler`, preserving order. Events are
  /// queued and drained by one scheduled action at a time.
  pub fn observe_on<S>(&self, scheduler: Arc<S>) -> Observable<T>
  where
    S: ImmediateScheduler + ?Sized + 'static,
  {
    Observable::new(ObserveOn { source: self.clone(), scheduler })
  }
}
