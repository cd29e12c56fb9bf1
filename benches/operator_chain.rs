use bencher::{benchmark_group, benchmark_main, Bencher};
use rxcore::prelude::*;

fn map_filter_reduce(b: &mut Bencher) {
  b.iter(|| {
    let total = std::sync::Arc::new(std::sync::atomic::AtomicU64::new(0));
    let c_total = total.clone();
    Observable::from_iter(0..1_000u64)
      .map(|v| v * 3)
      .filter(|v| v % 2 == 0)
      .reduce(0, |acc, v| acc + v)
      .subscribe_next(move |v| c_total.store(v, std::sync::atomic::Ordering::Relaxed));
    total.load(std::sync::atomic::Ordering::Relaxed)
  });
}

fn subject_fan_out(b: &mut Bencher) {
  b.iter(|| {
    let subject = PublishSubject::new();
    let subscriptions: Vec<_> =
      (0..8).map(|_| subject.as_observable().map(|v: u32| v + 1).subscribe_next(|_| {})).collect();
    for v in 0..256 {
      subject.on_next(v);
    }
    subject.on_completed();
    subscriptions.len()
  });
}

fn concat_many(b: &mut Bencher) {
  let sources = vec![Observable::just(1u32); 1_000];
  b.iter(|| {
    let d = Observable::concat(sources.clone()).take(999).subscribe_next(|_| {});
    d.dispose();
  });
}

benchmark_group!(benches, map_filter_reduce, subject_fan_out, concat_many);
benchmark_main!(benches);
