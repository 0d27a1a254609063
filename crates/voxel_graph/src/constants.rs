//! Buffer layout constants.
//!
//! Buffers are processed in fixed-size chunks so that work can be fanned out
//! over rayon's pool with each chunk owning a disjoint slice of the output.
//!
//! ```text
//! element index:  0 ........ 4095 | 4096 ........ 8191 | 8192 ... N-1
//!                 └── chunk 0 ────┘└──── chunk 1 ──────┘└─ chunk 2 ─┘
//!
//! chunk index  = index >> NUM_PER_CHUNK_LOG2
//! chunk offset = index & (NUM_PER_CHUNK - 1)
//! ```

/// Log2 of the default number of elements per chunk.
pub const NUM_PER_CHUNK_LOG2: u32 = 12;

/// Default number of elements processed as one unit (4096).
pub const NUM_PER_CHUNK: usize = 1 << NUM_PER_CHUNK_LOG2;

/// Inline capacity for candidate lists handed to the selector.
pub const INLINE_CANDIDATES: usize = 16;

/// Number of options a freshly created integer-indexed select node exposes.
pub const DEFAULT_INTEGER_OPTIONS: usize = 2;

/// Number of chunks needed to cover `num` elements with `num_per_chunk`
/// elements each. A chunk size of 0 counts as 1.
#[inline(always)]
pub const fn num_chunks(num: usize, num_per_chunk: usize) -> usize {
  let num_per_chunk = if num_per_chunk == 0 { 1 } else { num_per_chunk };
  num.div_ceil(num_per_chunk)
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
