use crate::buffer::{foreach_buffer_chunk_parallel, foreach_buffer_chunk_sync, BufferIterator};
use crate::constants::NUM_PER_CHUNK;

/// Tuning for materializing selects. Never changes results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectorConfig {
  /// Elements handed to one worker at a time. 0 is treated as 1.
  pub num_per_chunk: usize,

  /// Fan chunks out over rayon's pool instead of the calling thread.
  pub parallel: bool,
}

impl Default for SelectorConfig {
  fn default() -> Self {
    Self {
      num_per_chunk: NUM_PER_CHUNK,
      parallel: true,
    }
  }
}

impl SelectorConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_num_per_chunk(mut self, num_per_chunk: usize) -> Self {
    self.num_per_chunk = num_per_chunk;
    self
  }

  pub fn with_parallel(mut self, parallel: bool) -> Self {
    self.parallel = parallel;
    self
  }

  /// Chunk size actually used.
  pub fn effective_num_per_chunk(&self) -> usize {
    self.num_per_chunk.max(1)
  }

  /// Run `lambda` over every chunk of `output`.
  pub(crate) fn foreach_chunk<T, F>(&self, output: &mut [T], lambda: F)
  where
    T: Send,
    F: Fn(&BufferIterator, &mut [T]) + Send + Sync,
  {
    if self.parallel {
      foreach_buffer_chunk_parallel(output, self.effective_num_per_chunk(), lambda);
    } else {
      foreach_buffer_chunk_sync(output, self.effective_num_per_chunk(), lambda);
    }
  }
}
