//! Single-assignment futures for node evaluation.
//!
//! A [`VoxelPromise`] completes exactly once; every [`VoxelFuture`] handle
//! sharing its state then sees the value. Continuations registered while
//! pending run on the thread that completes the promise, outside the lock.
//!
//! ```text
//!   VoxelPromise ──complete(v)──► state: Pending([k0, k1]) ──► Complete(v)
//!                                              │
//!                                              └─► k0(v), k1(v)  (caller's thread)
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel as channel;

type Continuation<T> = Box<dyn FnOnce(T) + Send>;

enum State<T> {
  Pending(Vec<Continuation<T>>),
  Complete(T),
  /// The promise was dropped without a value.
  Abandoned,
}

struct Shared<T> {
  state: Mutex<State<T>>,
}

/// Read side of a single-assignment value.
pub struct VoxelFuture<T> {
  shared: Arc<Shared<T>>,
}

/// Write side of a single-assignment value.
pub struct VoxelPromise<T> {
  shared: Arc<Shared<T>>,
}

impl<T> Clone for VoxelFuture<T> {
  fn clone(&self) -> Self {
    Self {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<T: Clone + Send + 'static> VoxelFuture<T> {
  /// Already completed future.
  pub fn ready(value: T) -> Self {
    Self {
      shared: Arc::new(Shared {
        state: Mutex::new(State::Complete(value)),
      }),
    }
  }

  /// Pending future and the promise that completes it.
  pub fn pending() -> (VoxelPromise<T>, VoxelFuture<T>) {
    let shared = Arc::new(Shared {
      state: Mutex::new(State::Pending(Vec::new())),
    });
    (
      VoxelPromise {
        shared: Arc::clone(&shared),
      },
      VoxelFuture { shared },
    )
  }

  pub fn is_complete(&self) -> bool {
    matches!(*self.shared.state.lock().unwrap(), State::Complete(_))
  }

  /// Value if complete (non-blocking).
  pub fn try_get(&self) -> Option<T> {
    match &*self.shared.state.lock().unwrap() {
      State::Complete(value) => Some(value.clone()),
      State::Pending(_) | State::Abandoned => None,
    }
  }

  /// Run `f` with the value, now if complete, else on completion.
  fn on_complete(&self, f: impl FnOnce(T) + Send + 'static) {
    let value = {
      let mut state = self.shared.state.lock().unwrap();
      match &mut *state {
        State::Complete(value) => value.clone(),
        State::Pending(continuations) => {
          continuations.push(Box::new(f));
          return;
        }
        State::Abandoned => return,
      }
    };
    f(value);
  }

  /// Chain an asynchronous step.
  pub fn then<U, F>(&self, f: F) -> VoxelFuture<U>
  where
    U: Clone + Send + 'static,
    F: FnOnce(T) -> VoxelFuture<U> + Send + 'static,
  {
    if let Some(value) = self.try_get() {
      return f(value);
    }

    let (promise, future) = VoxelFuture::pending();
    self.on_complete(move |value| {
      f(value).on_complete(move |result| promise.complete(result));
    });
    future
  }

  /// Chain a synchronous step.
  pub fn map<U, F>(&self, f: F) -> VoxelFuture<U>
  where
    U: Clone + Send + 'static,
    F: FnOnce(T) -> U + Send + 'static,
  {
    self.then(move |value| VoxelFuture::ready(f(value)))
  }

  /// Completes with every value, in input order, once all inputs complete.
  pub fn join_all(futures: Vec<VoxelFuture<T>>) -> VoxelFuture<Vec<T>> {
    if futures.is_empty() {
      return VoxelFuture::ready(Vec::new());
    }

    struct Join<T> {
      values: Vec<Option<T>>,
      remaining: usize,
      promise: Option<VoxelPromise<Vec<T>>>,
    }

    let (promise, future) = VoxelFuture::pending();
    let join = Arc::new(Mutex::new(Join {
      values: vec![None; futures.len()],
      remaining: futures.len(),
      promise: Some(promise),
    }));

    for (index, input) in futures.iter().enumerate() {
      let join = Arc::clone(&join);
      input.on_complete(move |value| {
        let mut join = join.lock().unwrap();
        join.values[index] = Some(value);
        join.remaining -= 1;
        if join.remaining > 0 {
          return;
        }
        let values = join.values.drain(..).flatten().collect();
        let promise = join.promise.take();
        drop(join);
        if let Some(promise) = promise {
          promise.complete(values);
        }
      });
    }
    future
  }

  /// Block until complete. `None` if the promise was dropped unfulfilled.
  ///
  /// Must not be called from a thread the promise's producer depends on.
  pub fn wait(&self) -> Option<T> {
    if let Some(value) = self.try_get() {
      return Some(value);
    }
    let (sender, receiver) = channel::bounded(1);
    self.on_complete(move |value| {
      let _ = sender.send(value);
    });
    receiver.recv().ok()
  }

  /// Like [`wait`](Self::wait) with an upper bound.
  pub fn wait_timeout(&self, timeout: Duration) -> Option<T> {
    if let Some(value) = self.try_get() {
      return Some(value);
    }
    let (sender, receiver) = channel::bounded(1);
    self.on_complete(move |value| {
      let _ = sender.send(value);
    });
    receiver.recv_timeout(timeout).ok()
  }
}

impl<T: Clone + Send + 'static> VoxelPromise<T> {
  /// Store the value and run every registered continuation.
  ///
  /// A panicking continuation does not stop the others. The first panic is
  /// resumed once all of them have run.
  pub fn complete(self, value: T) {
    let continuations = {
      let mut state = self.shared.state.lock().unwrap();
      match std::mem::replace(&mut *state, State::Complete(value.clone())) {
        State::Pending(continuations) => continuations,
        State::Complete(_) | State::Abandoned => Vec::new(),
      }
    };

    let mut first_panic = None;
    for continuation in continuations {
      let value = value.clone();
      if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || continuation(value))) {
        first_panic.get_or_insert(payload);
      }
    }
    if let Some(payload) = first_panic {
      panic::resume_unwind(payload);
    }
  }
}

impl<T> Drop for VoxelPromise<T> {
  fn drop(&mut self) {
    // An abandoned promise releases its continuations so waiters wake up.
    let abandoned = match self.shared.state.lock() {
      Ok(mut state) if matches!(*state, State::Pending(_)) => {
        match std::mem::replace(&mut *state, State::Abandoned) {
          State::Pending(continuations) => continuations,
          _ => Vec::new(),
        }
      }
      _ => Vec::new(),
    };
    drop(abandoned);
  }
}

#[cfg(test)]
#[path = "future_test.rs"]
mod future_test;
