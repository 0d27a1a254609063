use super::*;

#[test]
fn test_iterator_windows() {
  let windows: Vec<_> = make_buffer_iterator(10, 4).map(|it| it.range()).collect();
  assert_eq!(windows, vec![0..4, 4..8, 8..10]);

  assert_eq!(make_buffer_iterator(0, 4).count(), 0);
  assert_eq!(make_buffer_iterator(4096, 4096).count(), 1);
  assert_eq!(make_buffer_iterator(4097, 4096).count(), 2);
}

#[test]
fn test_iterator_stops_at_chunk_boundary() {
  let iterator = BufferIterator::new(100, 5, 8);
  assert_eq!(iterator.index(), 5);
  assert_eq!(iterator.num(), 3);
  assert_eq!(iterator.total_num(), 100);
}

#[test]
fn test_zero_chunk_size_is_clamped() {
  let windows: Vec<_> = make_buffer_iterator(3, 0).map(|it| it.num()).collect();
  assert_eq!(windows, vec![1, 1, 1]);
}

#[test]
fn test_parallel_and_sync_fill_identically() {
  let fill = |iterator: &BufferIterator, view: &mut [usize]| {
    for (offset, value) in view.iter_mut().enumerate() {
      *value = (iterator.index() + offset) * 3;
    }
  };

  let mut parallel = vec![0usize; 10_000];
  let mut sync = vec![0usize; 10_000];
  foreach_buffer_chunk_parallel(&mut parallel, 1000, fill);
  foreach_buffer_chunk_sync(&mut sync, 1000, fill);

  assert_eq!(parallel, sync);
  assert!(parallel.iter().enumerate().all(|(i, v)| *v == i * 3));
}

#[test]
fn test_foreach_visits_every_window_once() {
  use std::sync::atomic::{AtomicUsize, Ordering};

  let visited = AtomicUsize::new(0);
  let mut output = vec![0u8; 9];
  foreach_buffer_chunk_parallel(&mut output, 2, |iterator, view| {
    assert_eq!(iterator.num(), view.len());
    visited.fetch_add(1, Ordering::Relaxed);
  });
  assert_eq!(visited.load(Ordering::Relaxed), 5);
}
