use std::{
  cmp::Ordering,
  collections::BinaryHeap,
  ops::Add,
  sync::Arc,
  time::Duration,
};

use parking_lot::Mutex;
use tracing::trace;

use super::{Action, PeriodicAction, MIN_PERIOD};
use crate::disposable::{BoxedDisposable, Disposable, SingleAssignmentDisposable};

/// Cancellation token of one trampolined item. Disposing it before the item
/// runs cancels the item; the action's own disposable is assigned into it
/// once the item has run.
pub(crate) type ScheduledToken = Arc<SingleAssignmentDisposable>;

pub(crate) enum Work {
  Once(Action),
  Periodic { action: PeriodicAction, period: Duration },
}

/// The caller's handle on a queued entry. Disposing it drops the work right
/// away, so whatever the closure captured is released before the due time.
struct ScheduledItem {
  work: Mutex<Option<Work>>,
  result: SingleAssignmentDisposable,
}

impl Disposable for ScheduledItem {
  fn dispose(&self) {
    self.result.dispose();
    let work = self.work.lock().take();
    drop(work);
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.result.is_disposed() }
}

pub(crate) struct Entry<D> {
  pub(crate) due: D,
  seq: u64,
  item: Arc<ScheduledItem>,
}

impl<D: Copy + Add<Duration, Output = D>> Entry<D> {
  /// Runs the entry. A periodic entry comes back re-armed for its next due
  /// time unless it was cancelled meanwhile.
  pub(crate) fn run(self) -> Option<Entry<D>> {
    let work = self.item.work.lock().take();
    let Some(work) = work else {
      trace!("cancelled timer discarded");
      return None;
    };
    match work {
      Work::Once(action) => {
        self.item.result.set(action());
        None
      }
      Work::Periodic { mut action, period } => {
        action();
        let mut slot = self.item.work.lock();
        if self.item.is_disposed() {
          return None;
        }
        *slot = Some(Work::Periodic { action, period });
        drop(slot);
        let Entry { due, seq, item } = self;
        Some(Entry { due: due + period, seq, item })
      }
    }
  }
}

impl<D: Ord> PartialEq for Entry<D> {
  fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl<D: Ord> Eq for Entry<D> {}

impl<D: Ord> PartialOrd for Entry<D> {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

/// Reversed so that the max-heap pops the earliest `(due, seq)` first.
impl<D: Ord> Ord for Entry<D> {
  fn cmp(&self, other: &Self) -> Ordering {
    other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
  }
}

/// Pending work ordered by due time, ties broken by insertion order.
///
/// Generic over the clock: the serial queue uses `Instant`, virtual time a
/// `Duration` offset.
pub(crate) struct TimerQueue<D> {
  heap: BinaryHeap<Entry<D>>,
  next_seq: u64,
}

impl<D: Ord + Copy + Add<Duration, Output = D>> TimerQueue<D> {
  pub(crate) fn new() -> Self { TimerQueue { heap: BinaryHeap::new(), next_seq: 0 } }

  pub(crate) fn push_once(&mut self, due: D, action: Action) -> BoxedDisposable {
    self.push(due, Work::Once(action))
  }

  /// Periods shorter than [`MIN_PERIOD`] are rounded up to it, so a
  /// periodic entry always moves forward in time.
  pub(crate) fn push_periodic(
    &mut self, due: D, period: Duration, action: PeriodicAction,
  ) -> BoxedDisposable {
    self.push(due, Work::Periodic { action, period: period.max(MIN_PERIOD) })
  }

  fn push(&mut self, due: D, work: Work) -> BoxedDisposable {
    let item = Arc::new(ScheduledItem {
      work: Mutex::new(Some(work)),
      result: SingleAssignmentDisposable::new(),
    });
    let seq = self.bump();
    self.heap.push(Entry { due, seq, item: item.clone() });
    Box::new(item)
  }

  /// Puts a re-armed periodic entry back, behind everything already queued
  /// for the same instant.
  pub(crate) fn requeue(&mut self, mut entry: Entry<D>) {
    entry.seq = self.bump();
    self.heap.push(entry);
  }

  /// Pops the earliest entry due at or before `now`. Cancelled entries are
  /// returned too; [`Entry::run`] discards them.
  pub(crate) fn pop_due(&mut self, now: D) -> Option<Entry<D>> {
    match self.heap.peek() {
      Some(head) if head.due <= now => self.heap.pop(),
      _ => None,
    }
  }

  #[inline]
  pub(crate) fn next_due(&self) -> Option<D> { self.heap.peek().map(|head| head.due) }

  /// Number of entries that were not cancelled.
  pub(crate) fn live_len(&self) -> usize {
    self.heap.iter().filter(|e| !e.item.is_disposed()).count()
  }

  /// Removes every entry, handing them back so they can be dropped outside
  /// the caller's lock.
  pub(crate) fn take_all(&mut self) -> Vec<Entry<D>> { self.heap.drain().collect() }

  fn bump(&mut self) -> u64 {
    let seq = self.next_seq;
    self.next_seq += 1;
    seq
  }
}
