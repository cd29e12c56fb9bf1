//! Process-wide scheduler instances, created on first use.
//!
//! Operators never pick a scheduler on their own; these are the instances to
//! hand them when no custom one is needed.

use std::sync::Arc;

use once_cell::sync::Lazy;

use super::{CurrentThreadScheduler, MainScheduler, QueueConfiguration};
use crate::error::RxError;

static MAIN: Lazy<Result<Arc<MainScheduler>, RxError>> = Lazy::new(|| {
  let config = QueueConfiguration::default().with_name("rxcore.main");
  MainScheduler::new(config).map(Arc::new)
});

/// The shared [`MainScheduler`], running on a worker thread named
/// `rxcore.main`.
pub fn main() -> Result<Arc<MainScheduler>, RxError> { (*MAIN).clone() }

/// The trampolining scheduler of the calling thread.
pub fn current_thread() -> Arc<CurrentThreadScheduler> { Arc::new(CurrentThreadScheduler) }

#[cfg(feature = "futures-scheduler")]
static THREAD_POOL: Lazy<Result<Arc<super::ThreadPoolScheduler>, RxError>> =
  Lazy::new(|| super::ThreadPoolScheduler::new().map(Arc::new));

/// The shared [`ThreadPoolScheduler`](super::ThreadPoolScheduler).
#[cfg(feature = "futures-scheduler")]
pub fn thread_pool() -> Result<Arc<super::ThreadPoolScheduler>, RxError> {
  (*THREAD_POOL).clone()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxcore_macro::test]
  fn main_is_shared() {
    let a = main().unwrap();
    let b = main().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(!a.is_main_thread());
  }
}
