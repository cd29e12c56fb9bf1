use std::sync::Arc;

use crate::{
  disposable::{BoxedDisposable, Disposable},
  event::Event,
  observable::{Observable, Producer},
  observer::AnyObserver,
  scheduler::{CurrentThreadScheduler, RecursiveScheduler},
  sink::Sink,
};

struct FromIter<I>(I);

impl<T, I> Producer<T> for FromIter<I>
where
  T: 'static,
  I: IntoIterator<Item = T> + Clone + Send + Sync,
  I::IntoIter: Send + 'static,
{
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    let sink = Arc::new(Sink::new(observer));
    let c_sink = sink.clone();
    // One element per trampoline step, so a downstream that disposes (take,
    // first) stops an endless iterator.
    let recursive = RecursiveScheduler::new(
      Arc::new(CurrentThreadScheduler),
      move |mut iter: I::IntoIter, recurse: &RecursiveScheduler<_, _>| {
        if c_sink.is_disposed() {
          return;
        }
        match iter.next() {
          Some(element) => {
            c_sink.forward_on(Event::Next(element));
            recurse.schedule(iter);
          }
          None => c_sink.forward_terminal(Event::Completed),
        }
      },
    );
    recursive.schedule(self.0.clone().into_iter());
    sink.set_upstream(Box::new(recursive));
    Box::new(sink)
  }
}

impl<T: Send + 'static> Observable<T> {
  /// Emits every item of `iter` in order, then completes.
  ///
  /// The iterable is cloned for each subscription. Items are pushed one per
  /// step of the current-thread trampoline, so infinite iterators are fine
  /// as long as something downstream ends the subscription.
  pub fn from_iter<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    I::IntoIter: Send + 'static,
  {
    Observable::new(FromIter(iter))
  }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
  /// Emits `element` forever.
  pub fn repeat_element(element: T) -> Self { Observable::from_iter(std::iter::repeat(element)) }
}

#[cfg(test)]
mod tests {
  use parking_lot::Mutex;

  use super::*;
  use crate::{disposable::Disposables, scheduler::ImmediateSchedulerExt, test_util::Recorder};

  #[rxcore_macro::test]
  fn emits_in_order() {
    let recorder = Recorder::new();
    Observable::from_iter(1..=3).subscribe(recorder.clone());
    assert_eq!(
      recorder.events(),
      vec![Event::Next(1), Event::Next(2), Event::Next(3), Event::Completed]
    );
  }

  #[rxcore_macro::test]
  fn empty_iterator_completes() {
    let recorder = Recorder::<u8>::new();
    Observable::from_iter(vec![]).subscribe(recorder.clone());
    assert_eq!(recorder.events(), vec![Event::Completed]);
  }

  #[rxcore_macro::test]
  fn dispose_stops_an_endless_source() {
    let seen = Arc::new(Mutex::new(vec![]));
    let holder = Arc::new(Mutex::new(None::<BoxedDisposable>));
    let (c_seen, c_holder) = (seen.clone(), holder.clone());
    // Subscribing from inside a trampoline action queues the first element,
    // so the handle is stored before anything is emitted.
    CurrentThreadScheduler.schedule((), move |_| {
      let holder = c_holder.clone();
      let d = Observable::repeat_element('x').subscribe_next(move |v| {
        let mut seen = c_seen.lock();
        seen.push(v);
        if seen.len() == 3 {
          if let Some(d) = holder.lock().as_ref() {
            d.dispose();
          }
        }
      });
      *c_holder.lock() = Some(d);
      Disposables::nop()
    });
    assert_eq!(*seen.lock(), vec!['x'; 3]);
  }
}
