//! Cross-platform task execution using rayon.
//!
//! Uses `rayon::spawn` as the unified threading solution:
//! - Native: rayon's thread pool (std::thread based)
//! - wasm32-unknown-unknown: wasm-bindgen-rayon (Web Workers)
//! - wasm32-unknown-emscripten: rayon via pthreads (Web Workers)
//!
//! Work is handed back through a [`VoxelFuture`] that the worker completes,
//! so callers chain on it instead of polling.
//!
//! # Usage
//!
//! ```ignore
//! let executor = TaskExecutor::new();
//!
//! // Queue work (non-blocking)
//! let future = executor.spawn(move || expensive_computation());
//!
//! // Chain on the result, or block from a non-worker thread
//! let summary = future.map(|result| summarize(&result));
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::future::VoxelFuture;

/// Cross-platform task executor using rayon.
#[derive(Clone, Default)]
pub struct TaskExecutor {
  /// Tasks queued or running.
  pending: Arc<AtomicUsize>,
}

impl TaskExecutor {
  /// Create a new executor.
  ///
  /// Rayon manages its own thread pool. Use `rayon::ThreadPoolBuilder`
  /// before creating the executor to configure the pool size.
  pub fn new() -> Self {
    Self::default()
  }

  /// Spawn a task on rayon's thread pool (non-blocking).
  ///
  /// The returned future completes on the worker thread.
  #[cfg_attr(
    feature = "instrument",
    tracing::instrument(skip_all, name = "executor::spawn")
  )]
  pub fn spawn<F, T>(&self, work: F) -> VoxelFuture<T>
  where
    F: FnOnce() -> T + Send + 'static,
    T: Clone + Send + 'static,
  {
    let (promise, future) = VoxelFuture::pending();
    self.pending.fetch_add(1, Ordering::Relaxed);
    let pending = Arc::clone(&self.pending);

    rayon::spawn(move || {
      let result = work();
      pending.fetch_sub(1, Ordering::Relaxed);
      promise.complete(result);
    });

    future
  }

  /// Get the number of worker threads in rayon's pool.
  pub fn num_threads(&self) -> usize {
    rayon::current_num_threads()
  }

  /// Get the number of tasks currently queued or running.
  pub fn pending_count(&self) -> usize {
    self.pending.load(Ordering::Relaxed)
  }
}

impl std::fmt::Debug for TaskExecutor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TaskExecutor")
      .field("pending", &self.pending_count())
      .finish()
  }
}

// =============================================================================
// Tests
// =============================================================================
