//! Width-tagged storage for simple terminal buffers.
//!
//! Elements are kept as raw words of 1, 4 or 8 bytes. Logical element types
//! (`bool`, `f32`, `i64`, ...) are mapped onto these words by
//! [`TerminalElement`], so selection code only ever moves words around and
//! is instantiated once per width instead of once per type.
//!
//! A storage of exactly one element is *constant*: every index reads
//! element 0.

use std::fmt;

use bytemuck::Pod;

use super::iterator::BufferIterator;
use crate::error::{BufferError, BufferResult};
use crate::pin_type::PinKind;

/// Byte width of one stored word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeSize {
  One,
  Four,
  Eight,
}

impl TypeSize {
  pub const fn bytes(self) -> usize {
    match self {
      TypeSize::One => 1,
      TypeSize::Four => 4,
      TypeSize::Eight => 8,
    }
  }
}

/// Backing words of a [`BufferStorage`], one variant per width.
#[derive(Clone, Debug, PartialEq)]
pub enum StorageData {
  One(Vec<u8>),
  Four(Vec<u32>),
  Eight(Vec<u64>),
}

// =============================================================================
// StorageWord - raw word per width
// =============================================================================

/// Raw word type backing one [`TypeSize`].
pub trait StorageWord: Pod + PartialEq + Send + Sync + fmt::Debug {
  const SIZE: TypeSize;

  fn words(data: &StorageData) -> Option<&[Self]>;
  fn words_mut(data: &mut StorageData) -> Option<&mut Vec<Self>>;
  fn wrap(words: Vec<Self>) -> StorageData;
}

macro_rules! impl_storage_word {
  ($($ty:ty => $size:ident),* $(,)?) => {
    $(
      impl StorageWord for $ty {
        const SIZE: TypeSize = TypeSize::$size;

        fn words(data: &StorageData) -> Option<&[Self]> {
          match data {
            StorageData::$size(words) => Some(words),
            _ => None,
          }
        }

        fn words_mut(data: &mut StorageData) -> Option<&mut Vec<Self>> {
          match data {
            StorageData::$size(words) => Some(words),
            _ => None,
          }
        }

        fn wrap(words: Vec<Self>) -> StorageData {
          StorageData::$size(words)
        }
      }
    )*
  };
}

impl_storage_word! {
  u8 => One,
  u32 => Four,
  u64 => Eight,
}

// =============================================================================
// TerminalElement - logical element <-> raw word
// =============================================================================

/// Logical element type of a simple terminal channel.
pub trait TerminalElement: Copy + Send + Sync + 'static {
  type Word: StorageWord;
  const KIND: PinKind;

  fn to_word(self) -> Self::Word;
  fn from_word(word: Self::Word) -> Self;
}

impl TerminalElement for bool {
  type Word = u8;
  const KIND: PinKind = PinKind::Bool;

  fn to_word(self) -> u8 {
    self as u8
  }

  fn from_word(word: u8) -> Self {
    word != 0
  }
}

impl TerminalElement for u8 {
  type Word = u8;
  const KIND: PinKind = PinKind::Byte;

  fn to_word(self) -> u8 {
    self
  }

  fn from_word(word: u8) -> Self {
    word
  }
}

impl TerminalElement for i32 {
  type Word = u32;
  const KIND: PinKind = PinKind::Int32;

  fn to_word(self) -> u32 {
    self as u32
  }

  fn from_word(word: u32) -> Self {
    word as i32
  }
}

impl TerminalElement for f32 {
  type Word = u32;
  const KIND: PinKind = PinKind::Float;

  fn to_word(self) -> u32 {
    self.to_bits()
  }

  fn from_word(word: u32) -> Self {
    f32::from_bits(word)
  }
}

impl TerminalElement for i64 {
  type Word = u64;
  const KIND: PinKind = PinKind::Int64;

  fn to_word(self) -> u64 {
    self as u64
  }

  fn from_word(word: u64) -> Self {
    word as i64
  }
}

impl TerminalElement for f64 {
  type Word = u64;
  const KIND: PinKind = PinKind::Double;

  fn to_word(self) -> u64 {
    self.to_bits()
  }

  fn from_word(word: u64) -> Self {
    f64::from_bits(word)
  }
}

// =============================================================================
// BufferStorage
// =============================================================================

/// Contiguous words of one width.
#[derive(Clone, Debug, PartialEq)]
pub struct BufferStorage {
  data: StorageData,
}

impl BufferStorage {
  /// Zero-filled storage of `num` elements.
  pub fn allocate(type_size: TypeSize, num: usize) -> Self {
    let data = match type_size {
      TypeSize::One => StorageData::One(vec![0; num]),
      TypeSize::Four => StorageData::Four(vec![0; num]),
      TypeSize::Eight => StorageData::Eight(vec![0; num]),
    };
    Self { data }
  }

  pub fn empty(type_size: TypeSize) -> Self {
    Self::allocate(type_size, 0)
  }

  pub fn constant<W: StorageWord>(word: W) -> Self {
    Self::from_words(vec![word])
  }

  pub fn from_words<W: StorageWord>(words: Vec<W>) -> Self {
    Self {
      data: W::wrap(words),
    }
  }

  pub fn from_elements<T: TerminalElement>(values: &[T]) -> Self {
    Self::from_words(values.iter().map(|value| value.to_word()).collect())
  }

  pub fn constant_element<T: TerminalElement>(value: T) -> Self {
    Self::constant(value.to_word())
  }

  pub fn type_size(&self) -> TypeSize {
    match self.data {
      StorageData::One(_) => TypeSize::One,
      StorageData::Four(_) => TypeSize::Four,
      StorageData::Eight(_) => TypeSize::Eight,
    }
  }

  pub fn num(&self) -> usize {
    match &self.data {
      StorageData::One(words) => words.len(),
      StorageData::Four(words) => words.len(),
      StorageData::Eight(words) => words.len(),
    }
  }

  #[inline]
  pub fn is_constant(&self) -> bool {
    self.num() == 1
  }

  /// Any index is valid on a constant storage.
  #[inline]
  pub fn is_valid_index(&self, index: usize) -> bool {
    self.is_constant() || index < self.num()
  }

  /// Typed read access. Fails if `W` is not this storage's width.
  pub fn view<W: StorageWord>(&self) -> BufferResult<StorageView<'_, W>> {
    W::words(&self.data)
      .map(|words| StorageView { words })
      .ok_or(BufferError::StorageWidthMismatch {
        expected: W::SIZE,
        actual: self.type_size(),
      })
  }

  /// Typed write access to every word.
  pub fn words_mut<W: StorageWord>(&mut self) -> BufferResult<&mut [W]> {
    let actual = self.type_size();
    W::words_mut(&mut self.data)
      .map(Vec::as_mut_slice)
      .ok_or(BufferError::StorageWidthMismatch {
        expected: W::SIZE,
        actual,
      })
  }

  /// Word at `index`, masked to 0 on constant storage.
  pub fn get<W: StorageWord>(&self, index: usize) -> Option<W> {
    let view = self.view::<W>().ok()?;
    self.is_valid_index(index).then(|| view.get(index))
  }

  pub fn get_element<T: TerminalElement>(&self, index: usize) -> Option<T> {
    self.get::<T::Word>(index).map(T::from_word)
  }

  /// Words covered by `iterator`. Must not be called on constant storage.
  pub fn raw_view<W: StorageWord>(&self, iterator: &BufferIterator) -> BufferResult<&[W]> {
    Ok(self.view::<W>()?.raw_view(iterator))
  }

  /// Mutable words covered by `iterator`. Must not be called on constant storage.
  pub fn raw_view_mut<W: StorageWord>(
    &mut self,
    iterator: &BufferIterator,
  ) -> BufferResult<&mut [W]> {
    debug_assert!(!self.is_constant() || iterator.total_num() == 1);
    let words = self.words_mut::<W>()?;
    Ok(&mut words[iterator.range()])
  }

  pub fn memzero(&mut self) {
    match &mut self.data {
      StorageData::One(words) => words.fill(0),
      StorageData::Four(words) => words.fill(0),
      StorageData::Eight(words) => words.fill(0),
    }
  }

  /// Collapse to a single element if all elements are equal.
  ///
  /// Returns `true` if the storage is constant afterwards.
  pub fn try_reduce_into_constant(&mut self) -> bool {
    fn reduce<W: StorageWord>(words: &mut Vec<W>) -> bool {
      let Some(&first) = words.first() else {
        return false;
      };
      if words.iter().any(|word| *word != first) {
        return false;
      }
      words.truncate(1);
      words.shrink_to_fit();
      true
    }

    match &mut self.data {
      StorageData::One(words) => reduce(words),
      StorageData::Four(words) => reduce(words),
      StorageData::Eight(words) => reduce(words),
    }
  }

  /// All elements decoded as `T`. A constant storage yields one element.
  pub fn to_elements<T: TerminalElement>(&self) -> BufferResult<Vec<T>> {
    Ok(
      self
        .view::<T::Word>()?
        .words()
        .iter()
        .map(|word| T::from_word(*word))
        .collect(),
    )
  }
}

// =============================================================================
// StorageView - resolved typed slice
// =============================================================================

/// Borrowed words of a storage with the width already resolved.
#[derive(Clone, Copy, Debug)]
pub struct StorageView<'a, W> {
  words: &'a [W],
}

impl<'a, W: StorageWord> StorageView<'a, W> {
  #[inline]
  pub fn num(&self) -> usize {
    self.words.len()
  }

  #[inline]
  pub fn is_constant(&self) -> bool {
    self.words.len() == 1
  }

  /// Word at `index`; constant views always read element 0.
  #[inline(always)]
  pub fn get(&self, index: usize) -> W {
    let index = if self.is_constant() { 0 } else { index };
    self.words[index]
  }

  /// Words covered by `iterator`. Must not be called on constant storage.
  #[inline]
  pub fn raw_view(&self, iterator: &BufferIterator) -> &'a [W] {
    debug_assert!(!self.is_constant() || iterator.total_num() == 1);
    &self.words[iterator.range()]
  }

  pub fn words(&self) -> &'a [W] {
    self.words
  }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;
