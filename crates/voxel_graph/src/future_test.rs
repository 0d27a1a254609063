use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;

#[test]
fn test_ready() {
  let future = VoxelFuture::ready(3);
  assert!(future.is_complete());
  assert_eq!(future.try_get(), Some(3));
  assert_eq!(future.wait(), Some(3));
}

#[test]
fn test_pending_then_complete() {
  let (promise, future) = VoxelFuture::<i32>::pending();
  assert!(!future.is_complete());
  assert_eq!(future.try_get(), None);

  let doubled = future.map(|value| value * 2);
  assert!(!doubled.is_complete());

  promise.complete(21);
  assert_eq!(future.try_get(), Some(21));
  assert_eq!(doubled.try_get(), Some(42));
}

#[test]
fn test_then_flattens() {
  let (inner_promise, inner) = VoxelFuture::<String>::pending();
  let (outer_promise, outer) = VoxelFuture::<i32>::pending();

  let chained = outer.then(move |value| inner.map(move |text| format!("{}{}", text, value)));

  outer_promise.complete(7);
  assert!(!chained.is_complete());

  inner_promise.complete("slot ".to_string());
  assert_eq!(chained.try_get().as_deref(), Some("slot 7"));
}

#[test]
fn test_continuations_run_once_each() {
  let calls = Arc::new(AtomicUsize::new(0));
  let (promise, future) = VoxelFuture::<u8>::pending();

  for _ in 0..3 {
    let calls = Arc::clone(&calls);
    let _ = future.map(move |_| calls.fetch_add(1, Ordering::Relaxed));
  }
  assert_eq!(calls.load(Ordering::Relaxed), 0);

  promise.complete(1);
  assert_eq!(calls.load(Ordering::Relaxed), 3);

  // Registered after completion: runs immediately.
  let calls_after = Arc::clone(&calls);
  let _ = future.map(move |_| calls_after.fetch_add(1, Ordering::Relaxed));
  assert_eq!(calls.load(Ordering::Relaxed), 4);
}

#[test]
fn test_join_all_keeps_order() {
  let (first_promise, first) = VoxelFuture::pending();
  let (second_promise, second) = VoxelFuture::pending();
  let third = VoxelFuture::ready(3);

  let joined = VoxelFuture::join_all(vec![first, second, third]);
  second_promise.complete(2);
  assert!(!joined.is_complete());

  first_promise.complete(1);
  assert_eq!(joined.try_get(), Some(vec![1, 2, 3]));

  let empty = VoxelFuture::<i32>::join_all(Vec::new());
  assert_eq!(empty.try_get(), Some(Vec::new()));
}

#[test]
fn test_wait_across_threads() {
  let (promise, future) = VoxelFuture::<u64>::pending();

  let handle = std::thread::spawn(move || {
    std::thread::sleep(Duration::from_millis(5));
    promise.complete(99);
  });

  assert_eq!(future.wait(), Some(99));
  handle.join().unwrap();
}

#[test]
fn test_abandoned_promise_releases_waiters() {
  let (promise, future) = VoxelFuture::<i32>::pending();
  let mapped = future.map(|value| value + 1);

  drop(promise);

  assert_eq!(future.wait(), None);
  assert_eq!(mapped.wait_timeout(Duration::from_secs(1)), None);
}

#[test]
fn test_wait_timeout_expires() {
  let (_promise, future) = VoxelFuture::<i32>::pending();
  assert_eq!(future.wait_timeout(Duration::from_millis(10)), None);
}

#[test]
fn test_panicking_continuation_does_not_skip_others() {
  let calls = Arc::new(AtomicUsize::new(0));
  let (promise, future) = VoxelFuture::<u8>::pending();

  let before = Arc::clone(&calls);
  let first = future.map(move |value| before.fetch_add(value as usize, Ordering::Relaxed));
  let failing = future.map(|_| -> u8 { panic!("continuation failed") });
  let after = Arc::clone(&calls);
  let last = future.map(move |value| after.fetch_add(value as usize, Ordering::Relaxed));

  let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| promise.complete(1)));

  assert!(result.is_err());
  assert_eq!(calls.load(Ordering::Relaxed), 2);
  assert!(first.is_complete());
  assert!(last.is_complete());
  assert_eq!(failing.wait_timeout(Duration::from_secs(1)), None);
  assert_eq!(future.try_get(), Some(1));
}
