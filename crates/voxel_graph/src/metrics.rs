//! Engine-agnostic metrics for buffer selection.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use voxel_graph::metrics::{self, COLLECT_METRICS};
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! // Read counters:
//! let snapshot = metrics::snapshot();
//! println!("{} selects, {} us", snapshot.calls, snapshot.select_time_us);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use web_time::Instant;

/// Runtime toggle for metrics collection.
/// Set to false to disable metrics gathering at runtime.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Process-wide selector counters.
pub struct SelectorMetrics {
  calls: AtomicU64,
  constant_short_circuits: AtomicU64,
  empty_results: AtomicU64,
  contract_violations: AtomicU64,
  elements_selected: AtomicU64,
  select_time_us: AtomicU64,
}

static SELECTOR_METRICS: SelectorMetrics = SelectorMetrics::new();

impl SelectorMetrics {
  const fn new() -> Self {
    Self {
      calls: AtomicU64::new(0),
      constant_short_circuits: AtomicU64::new(0),
      empty_results: AtomicU64::new(0),
      contract_violations: AtomicU64::new(0),
      elements_selected: AtomicU64::new(0),
      select_time_us: AtomicU64::new(0),
    }
  }

  /// Current counter values.
  pub fn snapshot() -> SelectorMetricsSnapshot {
    let m = &SELECTOR_METRICS;
    SelectorMetricsSnapshot {
      calls: m.calls.load(Ordering::Relaxed),
      constant_short_circuits: m.constant_short_circuits.load(Ordering::Relaxed),
      empty_results: m.empty_results.load(Ordering::Relaxed),
      contract_violations: m.contract_violations.load(Ordering::Relaxed),
      elements_selected: m.elements_selected.load(Ordering::Relaxed),
      select_time_us: m.select_time_us.load(Ordering::Relaxed),
    }
  }

  /// Reset all counters to zero.
  pub fn reset() {
    let m = &SELECTOR_METRICS;
    for counter in [
      &m.calls,
      &m.constant_short_circuits,
      &m.empty_results,
      &m.contract_violations,
      &m.elements_selected,
      &m.select_time_us,
    ] {
      counter.store(0, Ordering::Relaxed);
    }
  }
}

/// Plain copy of the counters at one point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectorMetricsSnapshot {
  /// Selector entry point invocations.
  pub calls: u64,
  /// Calls answered by sharing a candidate (constant index).
  pub constant_short_circuits: u64,
  /// Calls that produced an empty buffer.
  pub empty_results: u64,
  /// Reported contract violations.
  pub contract_violations: u64,
  /// Elements written by materializing selects.
  pub elements_selected: u64,
  /// Cumulative time spent in the selector, in microseconds.
  pub select_time_us: u64,
}

impl SelectorMetricsSnapshot {
  /// Average time per call in microseconds.
  pub fn avg_select_time_us(&self) -> f64 {
    if self.calls == 0 {
      0.0
    } else {
      self.select_time_us as f64 / self.calls as f64
    }
  }
}

/// Shorthand for [`SelectorMetrics::snapshot`].
pub fn snapshot() -> SelectorMetricsSnapshot {
  SelectorMetrics::snapshot()
}

/// Start timing a selector call; `None` when metrics are off.
#[inline]
pub(crate) fn start_timer() -> Option<Instant> {
  is_enabled().then(Instant::now)
}

pub(crate) fn record_call(start: Option<Instant>) {
  let Some(start) = start else {
    return;
  };
  SELECTOR_METRICS.calls.fetch_add(1, Ordering::Relaxed);
  SELECTOR_METRICS
    .select_time_us
    .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
}

pub(crate) fn record_constant_short_circuit() {
  if is_enabled() {
    SELECTOR_METRICS
      .constant_short_circuits
      .fetch_add(1, Ordering::Relaxed);
  }
}

pub(crate) fn record_empty_result() {
  if is_enabled() {
    SELECTOR_METRICS.empty_results.fetch_add(1, Ordering::Relaxed);
  }
}

pub(crate) fn record_contract_violation() {
  if is_enabled() {
    SELECTOR_METRICS
      .contract_violations
      .fetch_add(1, Ordering::Relaxed);
  }
}

pub(crate) fn record_elements(num: usize) {
  if is_enabled() {
    SELECTOR_METRICS
      .elements_selected
      .fetch_add(num as u64, Ordering::Relaxed);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_avg_select_time() {
    let snapshot = SelectorMetricsSnapshot {
      calls: 4,
      select_time_us: 100,
      ..Default::default()
    };
    assert_eq!(snapshot.avg_select_time_us(), 25.0);
    assert_eq!(SelectorMetricsSnapshot::default().avg_select_time_us(), 0.0);
  }

  #[cfg(not(feature = "metrics"))]
  #[test]
  fn test_disabled_without_feature() {
    assert!(!is_enabled());
    assert!(start_timer().is_none());

    let before = snapshot();
    record_contract_violation();
    record_elements(128);
    assert_eq!(snapshot(), before);
  }

  #[cfg(feature = "metrics")]
  #[test]
  fn test_counters_accumulate() {
    let before = snapshot();
    record_elements(128);
    record_constant_short_circuit();
    record_call(start_timer());

    // Other tests run concurrently, so only lower bounds hold.
    let after = snapshot();
    assert!(after.elements_selected >= before.elements_selected + 128);
    assert!(after.constant_short_circuits > before.constant_short_circuits);
    assert!(after.calls > before.calls);
  }
}
