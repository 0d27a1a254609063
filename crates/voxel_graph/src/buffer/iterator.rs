//! Chunked iteration over buffers.
//!
//! A buffer of `N` elements is walked in windows of at most
//! `num_per_chunk` elements. The parallel walk hands every window its own
//! disjoint `&mut` slice of the output, so no locking is needed:
//!
//! ```text
//! output:  [.......... chunk 0 ..........][.......... chunk 1 ..........][.. 2 ..]
//!           ^ worker A                     ^ worker B                    ^ worker C
//! ```

use std::ops::Range;

use rayon::prelude::*;

use crate::constants::num_chunks;

/// A window `[index, index + num)` of a buffer with `total_num` elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferIterator {
  total_num: usize,
  index: usize,
  num: usize,
}

impl BufferIterator {
  /// Window starting at `index`, ending at the next chunk boundary or at
  /// `total_num`, whichever comes first.
  pub fn new(total_num: usize, index: usize, num_per_chunk: usize) -> Self {
    let num_per_chunk = num_per_chunk.max(1);
    let until_boundary = num_per_chunk - index % num_per_chunk;
    Self {
      total_num,
      index,
      num: until_boundary.min(total_num.saturating_sub(index)),
    }
  }

  #[inline]
  pub fn total_num(&self) -> usize {
    self.total_num
  }

  /// First element of the window.
  #[inline]
  pub fn index(&self) -> usize {
    self.index
  }

  /// Elements in the window.
  #[inline]
  pub fn num(&self) -> usize {
    self.num
  }

  #[inline]
  pub fn range(&self) -> Range<usize> {
    self.index..self.index + self.num
  }
}

/// Sequential walk over `num` elements in windows of `num_per_chunk`.
pub fn make_buffer_iterator(
  num: usize,
  num_per_chunk: usize,
) -> impl Iterator<Item = BufferIterator> {
  let num_per_chunk = num_per_chunk.max(1);
  (0..num_chunks(num, num_per_chunk))
    .map(move |chunk| BufferIterator::new(num, chunk * num_per_chunk, num_per_chunk))
}

/// Run `lambda` on every window of `output` across rayon's pool.
#[cfg_attr(
  feature = "instrument",
  tracing::instrument(skip_all, name = "buffer::foreach_chunk_parallel")
)]
pub fn foreach_buffer_chunk_parallel<T, F>(output: &mut [T], num_per_chunk: usize, lambda: F)
where
  T: Send,
  F: Fn(&BufferIterator, &mut [T]) + Send + Sync,
{
  let num_per_chunk = num_per_chunk.max(1);
  let total_num = output.len();

  output
    .par_chunks_mut(num_per_chunk)
    .enumerate()
    .for_each(|(chunk, view)| {
      let iterator = BufferIterator::new(total_num, chunk * num_per_chunk, num_per_chunk);
      debug_assert_eq!(iterator.num(), view.len());
      lambda(&iterator, view);
    });
}

/// Run `lambda` on every window of `output` on the calling thread.
pub fn foreach_buffer_chunk_sync<T, F>(output: &mut [T], num_per_chunk: usize, lambda: F)
where
  F: Fn(&BufferIterator, &mut [T]),
{
  let num_per_chunk = num_per_chunk.max(1);
  let total_num = output.len();

  for (chunk, view) in output.chunks_mut(num_per_chunk).enumerate() {
    let iterator = BufferIterator::new(total_num, chunk * num_per_chunk, num_per_chunk);
    lambda(&iterator, view);
  }
}

#[cfg(test)]
#[path = "iterator_test.rs"]
mod iterator_test;
