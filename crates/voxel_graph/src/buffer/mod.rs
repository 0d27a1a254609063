//! Columnar buffers.
//!
//! A [`VoxelBuffer`] is a logical inner type plus one terminal buffer per
//! channel of that type:
//!
//! ```text
//! VoxelBuffer<Vector3>
//! ├── channel 0: SimpleTerminalBuffer(Float) ─► Arc<BufferStorage> [x0 x1 x2 ...]
//! ├── channel 1: SimpleTerminalBuffer(Float) ─► Arc<BufferStorage> [y0 y1 y2 ...]
//! └── channel 2: SimpleTerminalBuffer(Float) ─► Arc<BufferStorage> [z0 z1 z2 ...]
//!
//! VoxelBuffer<Struct(T)>
//! └── channel 0: ComplexTerminalBuffer ─► Arc<ComplexBufferStorage> [Box<T> ...]
//! ```
//!
//! Length states: `num() == 0` is empty, `num() == 1` is constant and
//! broadcasts to any length, anything else is a populated buffer.
//! Buffers are immutable once built and are shared through `Arc`.

mod complex;
mod iterator;
mod storage;
mod terminal;

use std::marker::PhantomData;
use std::sync::Arc;

use glam::{IVec2, Vec2, Vec3};
use smallvec::SmallVec;

pub use complex::ComplexBufferStorage;
pub use iterator::{
  foreach_buffer_chunk_parallel, foreach_buffer_chunk_sync, make_buffer_iterator, BufferIterator,
};
pub use storage::{BufferStorage, StorageData, StorageView, StorageWord, TerminalElement, TypeSize};
pub use terminal::{ComplexTerminalBuffer, SimpleTerminalBuffer, TerminalBuffer};

use crate::constants::INLINE_CANDIDATES;
use crate::error::{BufferError, BufferResult};
use crate::pin_type::{PinKind, PinType, StructType, VoxelEnum, VoxelPinValue};
use crate::value::{ComplexValue, VoxelStruct};

/// Composite buffer: one terminal buffer per channel of `inner_type`.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelBuffer {
  inner_type: PinType,
  terminals: SmallVec<[TerminalBuffer; 4]>,
}

impl VoxelBuffer {
  // ===========================================================================
  // Construction
  // ===========================================================================

  /// Default constant buffer of `inner_type`: zero words, default structs.
  pub fn make(inner_type: &PinType) -> Self {
    Self::from_kinds(inner_type, TerminalBuffer::make)
  }

  /// Buffer of `inner_type` with no elements.
  pub fn make_empty(inner_type: &PinType) -> Self {
    Self::from_kinds(inner_type, TerminalBuffer::make_empty)
  }

  fn from_kinds(inner_type: &PinType, make: impl Fn(PinKind) -> Option<TerminalBuffer>) -> Self {
    Self {
      inner_type: inner_type.inner_type(),
      terminals: inner_type
        .terminal_kinds()
        .into_iter()
        .filter_map(make)
        .collect(),
    }
  }

  /// Assemble a buffer from already built channels.
  ///
  /// Channel kinds must match the decomposition of `inner_type` and channel
  /// lengths must be compatible (equal, or constant).
  pub fn from_terminals(
    inner_type: &PinType,
    terminals: impl IntoIterator<Item = TerminalBuffer>,
  ) -> BufferResult<Self> {
    let terminals: SmallVec<[TerminalBuffer; 4]> = terminals.into_iter().collect();
    let kinds = inner_type.terminal_kinds();

    if kinds.len() != terminals.len() {
      return Err(BufferError::TerminalMismatch {
        channel: kinds.len().min(terminals.len()),
      });
    }
    if let Some(channel) = kinds
      .iter()
      .zip(&terminals)
      .position(|(kind, terminal)| *kind != terminal.kind())
    {
      return Err(BufferError::TerminalMismatch { channel });
    }

    let buffer = Self::from_terminals_unchecked(inner_type, terminals);
    let num = buffer.num();
    if let Some(terminal) = buffer
      .terminals
      .iter()
      .find(|terminal| terminal.num() != num && !terminal.is_constant())
    {
      return Err(BufferError::LengthMismatch {
        expected: num,
        actual: terminal.num(),
      });
    }
    Ok(buffer)
  }

  pub(crate) fn from_terminals_unchecked(
    inner_type: &PinType,
    terminals: SmallVec<[TerminalBuffer; 4]>,
  ) -> Self {
    Self {
      inner_type: inner_type.inner_type(),
      terminals,
    }
  }

  pub fn from_elements<T: TerminalElement + VoxelPinValue>(values: &[T]) -> Self {
    Self::from_simple(PinType::of::<T>(), SimpleTerminalBuffer::from_elements(values))
  }

  pub fn constant<T: TerminalElement + VoxelPinValue>(value: T) -> Self {
    Self::from_simple(PinType::of::<T>(), SimpleTerminalBuffer::constant(value))
  }

  /// Byte buffer tagged with an enum descriptor.
  pub fn from_enum_values(voxel_enum: Arc<VoxelEnum>, values: &[u8]) -> Self {
    Self::from_simple(
      PinType::make_enum(voxel_enum),
      SimpleTerminalBuffer::from_elements(values),
    )
  }

  fn from_simple(inner_type: PinType, terminal: SimpleTerminalBuffer) -> Self {
    let mut terminals = SmallVec::new();
    terminals.push(TerminalBuffer::Simple(terminal));
    Self {
      inner_type,
      terminals,
    }
  }

  pub fn from_vec2s(values: &[Vec2]) -> Self {
    Self::from_channels(
      PinType::of::<Vec2>(),
      [
        values.iter().map(|v| v.x).collect::<Vec<_>>(),
        values.iter().map(|v| v.y).collect(),
      ],
    )
  }

  pub fn from_vec3s(values: &[Vec3]) -> Self {
    Self::from_channels(
      PinType::of::<Vec3>(),
      [
        values.iter().map(|v| v.x).collect::<Vec<_>>(),
        values.iter().map(|v| v.y).collect(),
        values.iter().map(|v| v.z).collect(),
      ],
    )
  }

  pub fn from_int_points(values: &[IVec2]) -> Self {
    Self::from_channels(
      PinType::of::<IVec2>(),
      [
        values.iter().map(|v| v.x).collect::<Vec<_>>(),
        values.iter().map(|v| v.y).collect(),
      ],
    )
  }

  fn from_channels<T: TerminalElement, const N: usize>(
    inner_type: PinType,
    channels: [Vec<T>; N],
  ) -> Self {
    Self {
      inner_type,
      terminals: channels
        .iter()
        .map(|channel| TerminalBuffer::Simple(SimpleTerminalBuffer::from_elements(channel)))
        .collect(),
    }
  }

  pub fn from_structs<T: VoxelStruct + Default>(values: Vec<T>) -> Self {
    let struct_type = StructType::of::<T>();
    Self::from_complex(
      struct_type,
      ComplexBufferStorage::from_values(
        struct_type,
        values.into_iter().map(ComplexValue::new).collect(),
      ),
    )
  }

  pub fn constant_struct<T: VoxelStruct + Default>(value: T) -> Self {
    let struct_type = StructType::of::<T>();
    Self::from_complex(
      struct_type,
      ComplexBufferStorage::constant(struct_type, ComplexValue::new(value)),
    )
  }

  fn from_complex(struct_type: StructType, storage: ComplexBufferStorage) -> Self {
    let mut terminals = SmallVec::new();
    terminals.push(TerminalBuffer::Complex(ComplexTerminalBuffer::new(storage)));
    Self {
      inner_type: PinType::new(PinKind::Struct(struct_type), false),
      terminals,
    }
  }

  // ===========================================================================
  // Shape
  // ===========================================================================

  pub fn inner_type(&self) -> &PinType {
    &self.inner_type
  }

  pub fn buffer_type(&self) -> PinType {
    self.inner_type.buffer_type()
  }

  /// Logical length: the longest channel, 0 without channels.
  pub fn num(&self) -> usize {
    self
      .terminals
      .iter()
      .map(TerminalBuffer::num)
      .max()
      .unwrap_or(0)
  }

  pub fn is_constant(&self) -> bool {
    self.num() == 1
  }

  pub fn num_terminal_buffers(&self) -> usize {
    self.terminals.len()
  }

  pub fn terminal_buffer(&self, channel: usize) -> Option<&TerminalBuffer> {
    self.terminals.get(channel)
  }

  /// Channel `channel` of every buffer, in order.
  pub fn terminal_buffers<'a>(
    buffers: &[&'a VoxelBuffer],
    channel: usize,
  ) -> BufferResult<SmallVec<[&'a TerminalBuffer; INLINE_CANDIDATES]>> {
    buffers
      .iter()
      .map(|buffer| {
        buffer
          .terminal_buffer(channel)
          .ok_or(BufferError::TerminalMismatch { channel })
      })
      .collect()
  }

  // ===========================================================================
  // Access
  // ===========================================================================

  /// Typed view of a single-channel buffer whose channel is `T`.
  pub fn typed<T: TerminalElement>(&self) -> Option<TypedBuffer<'_, T>> {
    let [TerminalBuffer::Simple(terminal)] = self.terminals.as_slice() else {
      return None;
    };
    if terminal.kind() != T::KIND {
      return None;
    }
    let view = terminal.view::<T::Word>().ok()?;
    Some(TypedBuffer {
      view,
      _element: PhantomData,
    })
  }

  /// Element `index` of a single-channel buffer. Constant buffers answer
  /// every index.
  pub fn get<T: TerminalElement>(&self, index: usize) -> Option<T> {
    let typed = self.typed::<T>()?;
    (typed.is_constant() || index < typed.num()).then(|| typed.get(index))
  }

  /// All elements of a single-channel buffer.
  pub fn to_vec<T: TerminalElement>(&self) -> Option<Vec<T>> {
    let typed = self.typed::<T>()?;
    Some(typed.words().iter().map(|word| T::from_word(*word)).collect())
  }

  fn channel_element<T: TerminalElement>(&self, channel: usize, index: usize) -> Option<T> {
    let terminal = self.terminal_buffer(channel)?.as_simple()?;
    if terminal.kind() != T::KIND {
      return None;
    }
    terminal.storage().get_element::<T>(index)
  }

  pub fn get_vec2(&self, index: usize) -> Option<Vec2> {
    if !self.inner_type.is::<Vec2>() {
      return None;
    }
    Some(Vec2::new(
      self.channel_element(0, index)?,
      self.channel_element(1, index)?,
    ))
  }

  pub fn get_vec3(&self, index: usize) -> Option<Vec3> {
    if !self.inner_type.is::<Vec3>() {
      return None;
    }
    Some(Vec3::new(
      self.channel_element(0, index)?,
      self.channel_element(1, index)?,
      self.channel_element(2, index)?,
    ))
  }

  pub fn get_int_point(&self, index: usize) -> Option<IVec2> {
    if !self.inner_type.is::<IVec2>() {
      return None;
    }
    Some(IVec2::new(
      self.channel_element(0, index)?,
      self.channel_element(1, index)?,
    ))
  }

  pub fn get_struct<T: VoxelStruct>(&self, index: usize) -> Option<&T> {
    let [TerminalBuffer::Complex(terminal)] = self.terminals.as_slice() else {
      return None;
    };
    terminal.storage().get(index)?.get::<T>()
  }

  // ===========================================================================
  // Sharing
  // ===========================================================================

  /// New buffer handle that shares every channel's storage with `self`.
  pub fn make_shared_copy(&self) -> Arc<VoxelBuffer> {
    Arc::new(self.clone())
  }

  /// Whether every channel of both buffers points at the same storage.
  pub fn shares_storage_with(&self, other: &VoxelBuffer) -> bool {
    self.terminals.len() == other.terminals.len()
      && self
        .terminals
        .iter()
        .zip(&other.terminals)
        .all(|(a, b)| a.shares_storage_with(b))
  }
}

/// Reconcile a running length with `buffer`'s length.
///
/// Constant buffers fit any length. A constant running length adopts the
/// buffer's length. Otherwise the lengths must be equal.
pub fn merge_num(num: &mut usize, buffer: &VoxelBuffer) -> bool {
  let buffer_num = buffer.num();
  if buffer_num == 1 {
    return true;
  }
  if *num == 1 {
    *num = buffer_num;
    return true;
  }
  *num == buffer_num
}

/// Read-only typed view of a single-channel buffer.
#[derive(Clone, Copy, Debug)]
pub struct TypedBuffer<'a, T: TerminalElement> {
  view: StorageView<'a, T::Word>,
  _element: PhantomData<T>,
}

impl<'a, T: TerminalElement> TypedBuffer<'a, T> {
  pub fn num(&self) -> usize {
    self.view.num()
  }

  pub fn is_constant(&self) -> bool {
    self.view.is_constant()
  }

  /// The single element of a constant buffer.
  pub fn get_constant(&self) -> T {
    debug_assert!(self.is_constant());
    T::from_word(self.view.get(0))
  }

  #[inline(always)]
  pub fn get(&self, index: usize) -> T {
    T::from_word(self.view.get(index))
  }

  /// Raw words, in storage order.
  pub fn words(&self) -> &'a [T::Word] {
    self.view.words()
  }

  pub fn storage_view(&self) -> StorageView<'a, T::Word> {
    self.view
  }
}
