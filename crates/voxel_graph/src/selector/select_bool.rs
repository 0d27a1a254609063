//! Per-channel boolean select.
//!
//! Callers filter out empty and constant conditions first, so the condition
//! here always has at least two elements.

use super::config::SelectorConfig;
use crate::buffer::{
  BufferStorage, ComplexBufferStorage, ComplexTerminalBuffer, SimpleTerminalBuffer, StorageWord,
  TerminalBuffer, TypeSize, TypedBuffer,
};
use crate::error::{BufferError, BufferResult};
use crate::pin_type::{PinKind, StructType};

pub(super) fn select_channel(
  config: &SelectorConfig,
  channel: usize,
  kind: PinKind,
  condition: TypedBuffer<'_, bool>,
  false_buffer: &TerminalBuffer,
  true_buffer: &TerminalBuffer,
) -> BufferResult<TerminalBuffer> {
  debug_assert!(condition.num() >= 2);
  let mismatch = || BufferError::TerminalMismatch { channel };

  if let PinKind::Struct(struct_type) = kind {
    let (Some(false_buffer), Some(true_buffer)) = (false_buffer.as_complex(), true_buffer.as_complex())
    else {
      return Err(mismatch());
    };
    return Ok(
      select_complex(
        struct_type,
        condition,
        false_buffer.storage(),
        true_buffer.storage(),
      )
      .into(),
    );
  }

  let (Some(false_buffer), Some(true_buffer)) = (false_buffer.as_simple(), true_buffer.as_simple())
  else {
    return Err(mismatch());
  };
  let type_size = kind.type_size().ok_or_else(mismatch)?;

  let mut storage = BufferStorage::allocate(type_size, condition.num());
  match type_size {
    TypeSize::One => select_words::<u8>(config, condition, false_buffer, true_buffer, &mut storage)?,
    TypeSize::Four => select_words::<u32>(config, condition, false_buffer, true_buffer, &mut storage)?,
    TypeSize::Eight => select_words::<u64>(config, condition, false_buffer, true_buffer, &mut storage)?,
  }
  SimpleTerminalBuffer::new(kind, storage).map(TerminalBuffer::from)
}

/// Boxed values are copied one by one on the calling thread.
fn select_complex(
  struct_type: StructType,
  condition: TypedBuffer<'_, bool>,
  false_storage: &ComplexBufferStorage,
  true_storage: &ComplexBufferStorage,
) -> ComplexTerminalBuffer {
  let mut storage = ComplexBufferStorage::allocate(struct_type, condition.num());
  for index in 0..condition.num() {
    let source = if condition.get(index) {
      true_storage
    } else {
      false_storage
    };
    if let Some(value) = source.get(index) {
      value.copy_to(&mut storage[index]);
    }
  }
  ComplexTerminalBuffer::new(storage)
}

fn select_words<W: StorageWord>(
  config: &SelectorConfig,
  condition: TypedBuffer<'_, bool>,
  false_buffer: &SimpleTerminalBuffer,
  true_buffer: &SimpleTerminalBuffer,
  storage: &mut BufferStorage,
) -> BufferResult<()> {
  let false_view = false_buffer.view::<W>()?;
  let true_view = true_buffer.view::<W>()?;
  let condition_view = condition.storage_view();
  let any_constant = false_view.is_constant() || true_view.is_constant();

  config.foreach_chunk(storage.words_mut::<W>()?, |iterator, output| {
    let flags = condition_view.raw_view(iterator);

    if any_constant {
      // Constant sides are indexed directly, their words are masked to 0.
      for (offset, (out, &flag)) in output.iter_mut().zip(flags).enumerate() {
        let index = iterator.index() + offset;
        *out = if flag != 0 {
          true_view.get(index)
        } else {
          false_view.get(index)
        };
      }
      return;
    }

    let false_values = false_view.raw_view(iterator);
    let true_values = true_view.raw_view(iterator);
    for (((out, &flag), &on_false), &on_true) in output
      .iter_mut()
      .zip(flags)
      .zip(false_values)
      .zip(true_values)
    {
      *out = if flag != 0 { on_true } else { on_false };
    }
  });

  Ok(())
}
