use std::sync::Arc;

use crate::{
  disposable::{BoxedDisposable, Disposables},
  event::Event,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
  scheduler::ImmediateScheduler,
  sink::Sink,
};

struct Just<T>(T);

impl<T: Clone + Send + Sync> Producer<T> for Just<T> {
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    observer.on_next(self.0.clone());
    observer.on_completed();
    Disposables::nop()
  }
}

struct JustScheduled<T, S: ?Sized> {
  element: T,
  scheduler: Arc<S>,
}

impl<T, S> Producer<T> for JustScheduled<T, S>
where
  T: Clone + Send + Sync + 'static,
  S: ImmediateScheduler + ?Sized + 'static,
{
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    let sink = Arc::new(Sink::new(observer));
    let (c_sink, element, scheduler) = (sink.clone(), self.element.clone(), self.scheduler.clone());
    let scheduled = self.scheduler.schedule_action(Box::new(move || {
      c_sink.forward_on(Event::Next(element));
      scheduler.schedule_action(Box::new(move || {
        c_sink.forward_terminal(Event::Completed);
        Disposables::nop()
      }))
    }));
    sink.set_upstream(scheduled);
    Box::new(sink)
  }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
  /// Emits `element` once and completes, synchronously inside `subscribe`.
  pub fn just(element: T) -> Self { Observable::new(Just(element)) }

  /// Emits `element` and then completes, each as a separate action on
  /// `scheduler`.
  pub fn just_on<S>(element: T, scheduler: Arc<S>) -> Self
  where
    S: ImmediateScheduler + ?Sized + 'static,
  {
    Observable::new(JustScheduled { element, scheduler })
  }
}
