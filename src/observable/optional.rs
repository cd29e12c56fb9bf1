use std::sync::Arc;

use crate::{
  disposable::{BoxedDisposable, Disposables},
  event::Event,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
  scheduler::ImmediateScheduler,
  sink::Sink,
};

struct FromOptional<T>(Option<T>);

impl<T: Clone + Send + Sync> Producer<T> for FromOptional<T> {
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    if let Some(element) = self.0.clone() {
      observer.on_next(element);
    }
    observer.on_completed();
    Disposables::nop()
  }
}

struct FromOptionalScheduled<T, S: ?Sized> {
  optional: Option<T>,
  scheduler: Arc<S>,
}

impl<T, S> Producer<T> for FromOptionalScheduled<T, S>
where
  T: Clone + Send + Sync + 'static,
  S: ImmediateScheduler + ?Sized + 'static,
{
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    let sink = Arc::new(Sink::new(observer));
    let (c_sink, optional, scheduler) =
      (sink.clone(), self.optional.clone(), self.scheduler.clone());
    let scheduled = self.scheduler.schedule_action(Box::new(move || match optional {
      Some(element) => {
        c_sink.forward_on(Event::Next(element));
        scheduler.schedule_action(Box::new(move || {
          c_sink.forward_terminal(Event::Completed);
          Disposables::nop()
        }))
      }
      None => {
        c_sink.forward_terminal(Event::Completed);
        Disposables::nop()
      }
    }));
    sink.set_upstream(scheduled);
    Box::new(sink)
  }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
  /// Emits the value if there is one, then completes.
  pub fn from_optional(optional: Option<T>) -> Self { Observable::new(FromOptional(optional)) }

  /// Like [`Observable::from_optional`], with the value and the completion
  /// delivered as separate actions on `scheduler`.
  pub fn from_optional_on<S>(optional: Option<T>, scheduler: Arc<S>) -> Self
  where
    S: ImmediateScheduler + ?Sized + 'static,
  {
    Observable::new(FromOptionalScheduled { optional, scheduler })
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;
  use crate::{scheduler::VirtualTimeScheduler, test_util::Recorder};

  #[rxcore_macro::test]
  fn some_and_none() {
    let some = Recorder::new();
    Observable::from_optional(Some(3)).subscribe(some.clone());
    assert_eq!(some.events(), vec![Event::Next(3), Event::Completed]);

    let none = Recorder::<i32>::new();
    Observable::from_optional(None).subscribe(none.clone());
    assert_eq!(none.events(), vec![Event::Completed]);
  }

  #[rxcore_macro::test]
  fn scheduled_delivery() {
    let scheduler = Arc::new(VirtualTimeScheduler::new());
    let (some, none) = (Recorder::new(), Recorder::<i32>::new());
    Observable::from_optional_on(Some(1), scheduler.clone()).subscribe(some.clone());
    Observable::from_optional_on(None, scheduler.clone()).subscribe(none.clone());
    assert!(some.events().is_empty() && none.events().is_empty());

    scheduler.advance_by(Duration::ZERO);
    assert_eq!(some.events(), vec![Event::Next(1), Event::Completed]);
    assert_eq!(none.events(), vec![Event::Completed]);
  }
}
