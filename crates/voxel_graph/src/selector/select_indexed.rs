//! Per-channel N-way select by byte or int32 index.
//!
//! An index that addresses no candidate writes a zero word for simple
//! channels and leaves the default value in place for complex channels.

use smallvec::SmallVec;

use super::config::SelectorConfig;
use super::SelectIndex;
use crate::buffer::{
  BufferStorage, ComplexBufferStorage, ComplexTerminalBuffer, SimpleTerminalBuffer, StorageView,
  StorageWord, TerminalBuffer, TypeSize, TypedBuffer,
};
use crate::constants::INLINE_CANDIDATES;
use crate::error::{BufferError, BufferResult};
use crate::pin_type::{PinKind, StructType};

pub(super) fn select_channel<I: SelectIndex>(
  config: &SelectorConfig,
  channel: usize,
  kind: PinKind,
  indices: TypedBuffer<'_, I>,
  candidates: &[&TerminalBuffer],
) -> BufferResult<TerminalBuffer> {
  debug_assert!(indices.num() >= 2);
  let mismatch = || BufferError::TerminalMismatch { channel };

  if let PinKind::Struct(struct_type) = kind {
    let storages = candidates
      .iter()
      .map(|candidate| {
        candidate
          .as_complex()
          .map(ComplexTerminalBuffer::storage)
          .ok_or_else(mismatch)
      })
      .collect::<BufferResult<SmallVec<[&ComplexBufferStorage; INLINE_CANDIDATES]>>>()?;
    return Ok(select_complex(struct_type, indices, &storages).into());
  }

  let candidates = candidates
    .iter()
    .map(|candidate| candidate.as_simple().ok_or_else(mismatch))
    .collect::<BufferResult<SmallVec<[&SimpleTerminalBuffer; INLINE_CANDIDATES]>>>()?;
  let type_size = kind.type_size().ok_or_else(mismatch)?;

  let mut storage = BufferStorage::allocate(type_size, indices.num());
  match type_size {
    TypeSize::One => select_words::<u8, I>(config, indices, &candidates, &mut storage)?,
    TypeSize::Four => select_words::<u32, I>(config, indices, &candidates, &mut storage)?,
    TypeSize::Eight => select_words::<u64, I>(config, indices, &candidates, &mut storage)?,
  }
  SimpleTerminalBuffer::new(kind, storage).map(TerminalBuffer::from)
}

fn select_complex<I: SelectIndex>(
  struct_type: StructType,
  indices: TypedBuffer<'_, I>,
  candidates: &[&ComplexBufferStorage],
) -> ComplexTerminalBuffer {
  let mut storage = ComplexBufferStorage::allocate(struct_type, indices.num());
  for index in 0..indices.num() {
    let Some(value) = indices
      .get(index)
      .to_candidate()
      .and_then(|candidate| candidates.get(candidate))
      .and_then(|candidate| candidate.get(index))
    else {
      continue;
    };
    value.copy_to(&mut storage[index]);
  }
  ComplexTerminalBuffer::new(storage)
}

fn select_words<W: StorageWord, I: SelectIndex>(
  config: &SelectorConfig,
  indices: TypedBuffer<'_, I>,
  candidates: &[&SimpleTerminalBuffer],
  storage: &mut BufferStorage,
) -> BufferResult<()> {
  let views = candidates
    .iter()
    .map(|candidate| candidate.view::<W>())
    .collect::<BufferResult<SmallVec<[StorageView<'_, W>; INLINE_CANDIDATES]>>>()?;
  let index_view = indices.storage_view();

  config.foreach_chunk(storage.words_mut::<W>()?, |iterator, output| {
    let index_words = index_view.raw_view(iterator);
    for (offset, (out, &word)) in output.iter_mut().zip(index_words).enumerate() {
      *out = match I::from_word(word)
        .to_candidate()
        .and_then(|candidate| views.get(candidate))
      {
        Some(view) => view.get(iterator.index() + offset),
        None => W::zeroed(),
      };
    }
  });

  Ok(())
}
