//! Error taxonomy for buffer operations and node evaluation.
//!
//! Buffer errors are contract violations: the graph handed the selector
//! inputs it promised never to produce. They are reported, counted and
//! replaced by a default buffer; they never abort evaluation.

use thiserror::Error;

use crate::buffer::TypeSize;
use crate::metrics;
use crate::pin_type::PinType;

/// Precondition failures detected by buffer operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BufferError {
  #[error("buffer of type {from} cannot be casted to {to}")]
  IncompatibleType { from: PinType, to: PinType },

  #[error("buffer length mismatch: expected {expected}, got {actual}")]
  LengthMismatch { expected: usize, actual: usize },

  #[error("select needs at least one candidate buffer")]
  NoCandidates,

  #[error("expected {expected} candidate buffers, got {actual}")]
  WrongCandidateCount { expected: usize, actual: usize },

  #[error("{0} cannot be used as a select index")]
  UnsupportedIndexType(PinType),

  #[error("terminal buffer {channel} has a different layout than the output")]
  TerminalMismatch { channel: usize },

  #[error("storage width mismatch: expected {expected:?}, got {actual:?}")]
  StorageWidthMismatch { expected: TypeSize, actual: TypeSize },
}

pub type BufferResult<T> = Result<T, BufferError>;

/// Reasons a node could not produce a value for a query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
  #[error("index {index} is outside of the {num_options} available options")]
  IndexOutOfRange { index: i64, num_options: usize },

  #[error("{0} cannot be used as a select index")]
  UnsupportedIndexType(PinType),

  #[error("option buffer of length {actual} does not match index length {expected}")]
  BufferLengthMismatch { expected: usize, actual: usize },

  #[error("pin {0} has no value")]
  MissingPin(String),
}

/// Report a contract violation without aborting.
///
/// Logged at error level and counted in the selector metrics.
pub(crate) fn report_violation(error: &BufferError) {
  tracing::error!(%error, "buffer contract violation");
  metrics::record_contract_violation();
}

/// Report and swallow a failed check. Returns `true` if `result` was `Ok`.
pub(crate) fn ensure(result: BufferResult<()>) -> bool {
  match result {
    Ok(()) => true,
    Err(error) => {
      report_violation(&error);
      false
    }
  }
}
