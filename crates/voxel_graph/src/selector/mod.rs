//! Typed select over buffers.
//!
//! Produces `out[i] = candidates[index[i]][i]`, or
//! `out[i] = condition[i] ? on_true[i] : on_false[i]` for boolean indices.
//!
//! ```text
//! select_generic(inner_type, indices, candidates)
//!   ├─ bool index ──► select_bool ───┐
//!   ├─ byte index ──► select_indexed ┤
//!   ├─ int32 index ─► select_indexed ┘
//!   └─ other ───────► violation      │
//!                                    ▼
//!           candidate types cast?        no ─► violation
//!           indices empty?              yes ─► empty buffer
//!           candidate lengths merge?     no ─► violation
//!           indices constant?           yes ─► shared copy of one candidate
//!           otherwise                       ─► per channel, per chunk
//! ```
//!
//! Contract violations are reported through `tracing` and the metrics
//! counters. The caller then receives a default constant buffer of the
//! requested type instead of an error.

mod config;
mod select_bool;
mod select_indexed;

use std::sync::Arc;

use smallvec::SmallVec;

pub use config::SelectorConfig;

use crate::buffer::{merge_num, TerminalBuffer, TerminalElement, VoxelBuffer};
use crate::error::{ensure, report_violation, BufferError, BufferResult};
use crate::metrics;
use crate::pin_type::{PinKind, PinType};

/// Index element types usable for N-way select.
pub trait SelectIndex: TerminalElement {
  /// Candidate addressed by this index, `None` if it can address none.
  fn to_candidate(self) -> Option<usize>;
}

impl SelectIndex for u8 {
  #[inline(always)]
  fn to_candidate(self) -> Option<usize> {
    Some(self as usize)
  }
}

impl SelectIndex for i32 {
  #[inline(always)]
  fn to_candidate(self) -> Option<usize> {
    usize::try_from(self).ok()
  }
}

/// Select with the default configuration.
pub fn select_generic(
  inner_type: &PinType,
  indices: &VoxelBuffer,
  buffers: &[&VoxelBuffer],
) -> Arc<VoxelBuffer> {
  BufferSelector::default().select_generic(inner_type, indices, buffers)
}

/// The select engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct BufferSelector {
  config: SelectorConfig,
}

impl BufferSelector {
  pub fn new(config: SelectorConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &SelectorConfig {
    &self.config
  }

  /// Dispatch on the index buffer's type.
  ///
  /// Bool indices need exactly two candidates (false, true). Byte and int32
  /// indices take any non-empty candidate list.
  #[cfg_attr(
    feature = "instrument",
    tracing::instrument(skip_all, name = "selector::select_generic")
  )]
  pub fn select_generic(
    &self,
    inner_type: &PinType,
    indices: &VoxelBuffer,
    buffers: &[&VoxelBuffer],
  ) -> Arc<VoxelBuffer> {
    let start = metrics::start_timer();
    let index_type = indices.inner_type();

    let result = match index_type.kind() {
      PinKind::Bool => match buffers {
        [false_buffer, true_buffer] => {
          self.select_bool_impl(inner_type, indices, false_buffer, true_buffer)
        }
        _ => fail(
          inner_type,
          BufferError::WrongCandidateCount {
            expected: 2,
            actual: buffers.len(),
          },
        ),
      },
      PinKind::Byte => self.select_indexed_impl::<u8>(inner_type, indices, buffers),
      PinKind::Int32 => self.select_indexed_impl::<i32>(inner_type, indices, buffers),
      _ => fail(
        inner_type,
        BufferError::UnsupportedIndexType(index_type.clone()),
      ),
    };

    metrics::record_call(start);
    result
  }

  /// `condition[i] ? true_buffer[i] : false_buffer[i]`.
  #[cfg_attr(
    feature = "instrument",
    tracing::instrument(skip_all, name = "selector::select_bool")
  )]
  pub fn select_bool(
    &self,
    inner_type: &PinType,
    condition: &VoxelBuffer,
    false_buffer: &VoxelBuffer,
    true_buffer: &VoxelBuffer,
  ) -> Arc<VoxelBuffer> {
    let start = metrics::start_timer();
    let result = self.select_bool_impl(inner_type, condition, false_buffer, true_buffer);
    metrics::record_call(start);
    result
  }

  /// `buffers[indices[i]][i]` for byte (`u8`) or int32 (`i32`) indices.
  #[cfg_attr(
    feature = "instrument",
    tracing::instrument(skip_all, name = "selector::select_indexed")
  )]
  pub fn select_indexed<I: SelectIndex>(
    &self,
    inner_type: &PinType,
    indices: &VoxelBuffer,
    buffers: &[&VoxelBuffer],
  ) -> Arc<VoxelBuffer> {
    let start = metrics::start_timer();
    let result = self.select_indexed_impl::<I>(inner_type, indices, buffers);
    metrics::record_call(start);
    result
  }

  /// Candidate preconditions shared by every select.
  ///
  /// There must be at least one candidate, each candidate's inner type must
  /// cast to `inner_type` and its length must merge with the index length.
  pub fn check(
    inner_type: &PinType,
    indices: &VoxelBuffer,
    buffers: &[&VoxelBuffer],
  ) -> BufferResult<()> {
    Self::check_types(inner_type, buffers)?;
    Self::check_lengths(indices, buffers)
  }

  fn check_types(inner_type: &PinType, buffers: &[&VoxelBuffer]) -> BufferResult<()> {
    if buffers.is_empty() {
      return Err(BufferError::NoCandidates);
    }

    let inner_type = inner_type.inner_type();
    match buffers
      .iter()
      .find(|buffer| !buffer.inner_type().can_be_casted_to(&inner_type))
    {
      Some(buffer) => Err(BufferError::IncompatibleType {
        from: buffer.inner_type().clone(),
        to: inner_type,
      }),
      None => Ok(()),
    }
  }

  fn check_lengths(indices: &VoxelBuffer, buffers: &[&VoxelBuffer]) -> BufferResult<()> {
    let mut num = indices.num();
    for buffer in buffers {
      let expected = num;
      if !merge_num(&mut num, buffer) {
        return Err(BufferError::LengthMismatch {
          expected,
          actual: buffer.num(),
        });
      }
    }
    Ok(())
  }

  // ===========================================================================
  // Implementation
  // ===========================================================================

  fn select_bool_impl(
    &self,
    inner_type: &PinType,
    condition: &VoxelBuffer,
    false_buffer: &VoxelBuffer,
    true_buffer: &VoxelBuffer,
  ) -> Arc<VoxelBuffer> {
    let buffers = [false_buffer, true_buffer];
    if !ensure(Self::check_types(inner_type, &buffers)) {
      return Arc::new(VoxelBuffer::make(inner_type));
    }
    let Some(condition_view) = condition.typed::<bool>() else {
      return fail(
        inner_type,
        BufferError::UnsupportedIndexType(condition.inner_type().clone()),
      );
    };

    // Empty propagates whatever the candidates look like.
    if condition.num() == 0 {
      metrics::record_empty_result();
      return Arc::new(VoxelBuffer::make_empty(inner_type));
    }
    if !ensure(Self::check_lengths(condition, &buffers)) {
      return Arc::new(VoxelBuffer::make(inner_type));
    }
    if condition.is_constant() {
      metrics::record_constant_short_circuit();
      let selected = if condition_view.get_constant() {
        true_buffer
      } else {
        false_buffer
      };
      return selected.make_shared_copy();
    }

    let terminals = inner_type
      .terminal_kinds()
      .into_iter()
      .enumerate()
      .map(|(channel, kind)| {
        let mismatch = || BufferError::TerminalMismatch { channel };
        let false_terminal = false_buffer.terminal_buffer(channel).ok_or_else(mismatch)?;
        let true_terminal = true_buffer.terminal_buffer(channel).ok_or_else(mismatch)?;
        select_bool::select_channel(
          &self.config,
          channel,
          kind,
          condition_view,
          false_terminal,
          true_terminal,
        )
      })
      .collect();

    finish(inner_type, condition.num(), terminals)
  }

  fn select_indexed_impl<I: SelectIndex>(
    &self,
    inner_type: &PinType,
    indices: &VoxelBuffer,
    buffers: &[&VoxelBuffer],
  ) -> Arc<VoxelBuffer> {
    if !ensure(Self::check_types(inner_type, buffers)) {
      return Arc::new(VoxelBuffer::make(inner_type));
    }
    let Some(index_view) = indices.typed::<I>() else {
      return fail(
        inner_type,
        BufferError::UnsupportedIndexType(indices.inner_type().clone()),
      );
    };

    if indices.num() == 0 {
      metrics::record_empty_result();
      return Arc::new(VoxelBuffer::make_empty(inner_type));
    }
    if !ensure(Self::check_lengths(indices, buffers)) {
      return Arc::new(VoxelBuffer::make(inner_type));
    }
    if indices.is_constant() {
      metrics::record_constant_short_circuit();
      // An index that addresses no candidate is a defined fallback, not a
      // violation.
      return match index_view
        .get_constant()
        .to_candidate()
        .and_then(|candidate| buffers.get(candidate))
      {
        Some(buffer) => buffer.make_shared_copy(),
        None => Arc::new(VoxelBuffer::make(inner_type)),
      };
    }

    let terminals = inner_type
      .terminal_kinds()
      .into_iter()
      .enumerate()
      .map(|(channel, kind)| {
        let candidates = VoxelBuffer::terminal_buffers(buffers, channel)?;
        select_indexed::select_channel::<I>(&self.config, channel, kind, index_view, &candidates)
      })
      .collect();

    finish(inner_type, indices.num(), terminals)
  }
}

fn fail(inner_type: &PinType, error: BufferError) -> Arc<VoxelBuffer> {
  report_violation(&error);
  Arc::new(VoxelBuffer::make(inner_type))
}

fn finish(
  inner_type: &PinType,
  num: usize,
  terminals: BufferResult<SmallVec<[TerminalBuffer; 4]>>,
) -> Arc<VoxelBuffer> {
  match terminals {
    Ok(terminals) => {
      metrics::record_elements(num * terminals.len());
      Arc::new(VoxelBuffer::from_terminals_unchecked(inner_type, terminals))
    }
    Err(error) => fail(inner_type, error),
  }
}
