//! Single-channel buffers.
//!
//! Storages are reference counted: copying a terminal buffer shares its
//! storage, which is never mutated once wrapped.

use std::sync::Arc;

use super::complex::ComplexBufferStorage;
use super::storage::{BufferStorage, StorageView, StorageWord, TerminalElement};
use crate::error::{BufferError, BufferResult};
use crate::pin_type::{PinKind, StructType};

/// Channel backed by width-tagged words.
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleTerminalBuffer {
  kind: PinKind,
  storage: Arc<BufferStorage>,
}

impl SimpleTerminalBuffer {
  /// Fails if `kind` has no simple layout or a different width than `storage`.
  pub fn new(kind: PinKind, storage: BufferStorage) -> BufferResult<Self> {
    Self::from_shared(kind, Arc::new(storage))
  }

  pub fn from_shared(kind: PinKind, storage: Arc<BufferStorage>) -> BufferResult<Self> {
    let actual = storage.type_size();
    match kind.type_size() {
      Some(expected) if expected == actual => Ok(Self { kind, storage }),
      Some(expected) => Err(BufferError::StorageWidthMismatch { expected, actual }),
      None => Err(BufferError::TerminalMismatch { channel: 0 }),
    }
  }

  pub fn from_elements<T: TerminalElement>(values: &[T]) -> Self {
    Self {
      kind: T::KIND,
      storage: Arc::new(BufferStorage::from_elements(values)),
    }
  }

  pub fn constant<T: TerminalElement>(value: T) -> Self {
    Self {
      kind: T::KIND,
      storage: Arc::new(BufferStorage::constant_element(value)),
    }
  }

  pub fn kind(&self) -> PinKind {
    self.kind
  }

  pub fn storage(&self) -> &BufferStorage {
    &self.storage
  }

  pub fn view<W: StorageWord>(&self) -> BufferResult<StorageView<'_, W>> {
    self.storage.view::<W>()
  }
}

/// Channel backed by boxed struct values.
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexTerminalBuffer {
  storage: Arc<ComplexBufferStorage>,
}

impl ComplexTerminalBuffer {
  pub fn new(storage: ComplexBufferStorage) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  pub fn struct_type(&self) -> StructType {
    self.storage.struct_type()
  }

  pub fn storage(&self) -> &ComplexBufferStorage {
    &self.storage
  }
}

/// One channel of a composite buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum TerminalBuffer {
  Simple(SimpleTerminalBuffer),
  Complex(ComplexTerminalBuffer),
}

impl TerminalBuffer {
  /// Default constant channel of `kind`: one zero word, or one default struct.
  pub fn make(kind: PinKind) -> Option<Self> {
    Self::with_num(kind, 1)
  }

  /// Channel of `kind` with no elements.
  pub fn make_empty(kind: PinKind) -> Option<Self> {
    Self::with_num(kind, 0)
  }

  fn with_num(kind: PinKind, num: usize) -> Option<Self> {
    match kind {
      PinKind::Struct(struct_type) => Some(TerminalBuffer::Complex(ComplexTerminalBuffer::new(
        ComplexBufferStorage::allocate(struct_type, num),
      ))),
      kind => kind.type_size().map(|type_size| {
        TerminalBuffer::Simple(SimpleTerminalBuffer {
          kind,
          storage: Arc::new(BufferStorage::allocate(type_size, num)),
        })
      }),
    }
  }

  pub fn kind(&self) -> PinKind {
    match self {
      TerminalBuffer::Simple(buffer) => buffer.kind(),
      TerminalBuffer::Complex(buffer) => PinKind::Struct(buffer.struct_type()),
    }
  }

  pub fn num(&self) -> usize {
    match self {
      TerminalBuffer::Simple(buffer) => buffer.storage.num(),
      TerminalBuffer::Complex(buffer) => buffer.storage.num(),
    }
  }

  pub fn is_constant(&self) -> bool {
    self.num() == 1
  }

  pub fn as_simple(&self) -> Option<&SimpleTerminalBuffer> {
    match self {
      TerminalBuffer::Simple(buffer) => Some(buffer),
      TerminalBuffer::Complex(_) => None,
    }
  }

  pub fn as_complex(&self) -> Option<&ComplexTerminalBuffer> {
    match self {
      TerminalBuffer::Complex(buffer) => Some(buffer),
      TerminalBuffer::Simple(_) => None,
    }
  }

  /// Whether both channels point at the very same storage allocation.
  pub fn shares_storage_with(&self, other: &TerminalBuffer) -> bool {
    match (self, other) {
      (TerminalBuffer::Simple(a), TerminalBuffer::Simple(b)) => Arc::ptr_eq(&a.storage, &b.storage),
      (TerminalBuffer::Complex(a), TerminalBuffer::Complex(b)) => {
        Arc::ptr_eq(&a.storage, &b.storage)
      }
      _ => false,
    }
  }
}

impl From<SimpleTerminalBuffer> for TerminalBuffer {
  fn from(buffer: SimpleTerminalBuffer) -> Self {
    TerminalBuffer::Simple(buffer)
  }
}

impl From<ComplexTerminalBuffer> for TerminalBuffer {
  fn from(buffer: ComplexTerminalBuffer) -> Self {
    TerminalBuffer::Complex(buffer)
  }
}
