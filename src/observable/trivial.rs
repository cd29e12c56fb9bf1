use crate::{
  disposable::{BoxedDisposable, Disposables},
  error::RxError,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
};

struct Empty;

impl<T> Producer<T> for Empty {
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    observer.on_completed();
    Disposables::nop()
  }
}

struct Never;

impl<T> Producer<T> for Never {
  fn subscribe(&self, _: AnyObserver<T>) -> BoxedDisposable { Disposables::nop() }
}

struct Throw(RxError);

impl<T> Producer<T> for Throw {
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    observer.on_error(self.0.clone());
    Disposables::nop()
  }
}

impl<T: Send + 'static> Observable<T> {
  /// Completes immediately without emitting.
  pub fn empty() -> Self { Observable::new(Empty) }

  /// Never emits and never terminates.
  pub fn never() -> Self { Observable::new(Never) }

  /// Terminates every subscriber with `err`.
  pub fn throw_error(err: RxError) -> Self { Observable::new(Throw(err)) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{disposable::Disposable, event::Event, test_util::Recorder};

  #[rxcore_macro::test]
  fn empty_completes() {
    let recorder = Recorder::<i32>::new();
    Observable::empty().subscribe(recorder.clone());
    assert_eq!(recorder.events(), vec![Event::Completed]);
  }

  #[rxcore_macro::test]
  fn never_stays_silent() {
    let recorder = Recorder::<i32>::new();
    let d = Observable::never().subscribe(recorder.clone());
    d.dispose();
    assert!(recorder.events().is_empty());
  }

  #[rxcore_macro::test]
  fn throw_reaches_every_subscriber() {
    let source = Observable::<()>::throw_error(RxError::msg("nope"));
    for _ in 0..2 {
      let recorder = Recorder::new();
      source.subscribe(recorder.clone());
      assert_eq!(recorder.events(), vec![Event::Error(RxError::msg("nope"))]);
    }
  }
}
