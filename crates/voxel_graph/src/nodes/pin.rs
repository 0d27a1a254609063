//! Pins, queries and the value source nodes read their inputs from.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::future::VoxelFuture;
use crate::pin_type::PinType;
use crate::threading::TaskExecutor;
use crate::value::RuntimePinValue;

/// Result of evaluating a pin; `None` means "no value".
pub type FutureValue = VoxelFuture<Option<RuntimePinValue>>;

/// A typed, named node input or output.
#[derive(Clone, Debug, PartialEq)]
pub struct Pin {
  pub name: String,
  pub display_name: Option<String>,
  pub pin_type: PinType,
  pub hidden: bool,
}

impl Pin {
  pub fn new(name: impl Into<String>, pin_type: PinType) -> Self {
    Self {
      name: name.into(),
      display_name: None,
      pin_type,
      hidden: false,
    }
  }

  pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
    self.display_name = Some(display_name.into());
    self
  }

  pub fn with_hidden(mut self, hidden: bool) -> Self {
    self.hidden = hidden;
    self
  }

  /// Display name if set, else the pin name.
  pub fn label(&self) -> &str {
    self.display_name.as_deref().unwrap_or(&self.name)
  }
}

/// Unique identifier for a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QueryId(u64);

impl QueryId {
  fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    Self(COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  pub fn raw(&self) -> u64 {
    self.0
  }
}

/// Context of one evaluation request, passed through to every input read.
#[derive(Clone, Debug)]
pub struct Query {
  id: QueryId,
}

impl Query {
  pub fn new() -> Self {
    Self { id: QueryId::next() }
  }

  pub fn id(&self) -> QueryId {
    self.id
  }
}

impl Default for Query {
  fn default() -> Self {
    Self::new()
  }
}

/// Where a node reads its input pin values from.
pub trait PinValueSource: Send + Sync {
  fn get(&self, pin: &str, query: &Query) -> FutureValue;
}

/// Source answering from a fixed map of pin values.
///
/// With an executor, every answer completes later on a worker thread,
/// which exercises the asynchronous paths of the reading node.
#[derive(Clone, Debug, Default)]
pub struct PinValueMap {
  values: HashMap<String, RuntimePinValue>,
  executor: Option<TaskExecutor>,
}

impl PinValueMap {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_value(mut self, pin: impl Into<String>, value: impl Into<RuntimePinValue>) -> Self {
    self.values.insert(pin.into(), value.into());
    self
  }

  pub fn deferred(mut self, executor: TaskExecutor) -> Self {
    self.executor = Some(executor);
    self
  }

  pub fn insert(&mut self, pin: impl Into<String>, value: impl Into<RuntimePinValue>) {
    self.values.insert(pin.into(), value.into());
  }
}

impl PinValueSource for PinValueMap {
  fn get(&self, pin: &str, query: &Query) -> FutureValue {
    let value = self.values.get(pin).cloned();
    if value.is_none() {
      tracing::debug!(pin, query = query.id().raw(), "no value for pin");
    }

    match &self.executor {
      Some(executor) => executor.spawn(move || value),
      None => VoxelFuture::ready(value),
    }
  }
}
