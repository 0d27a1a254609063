//! Logical pin types.
//!
//! A [`PinType`] is a value-type tag plus a buffer flag. The tag decides how a
//! buffer of that type is decomposed into terminal channels:
//!
//! ```text
//! kind        channels                 storage
//! ─────────   ──────────────────────   ──────────────
//! Bool        [Bool]                   1 byte words
//! Byte        [Byte]                   1 byte words
//! Int32       [Int32]                  4 byte words
//! Float       [Float]                  4 byte words
//! Int64       [Int64]                  8 byte words
//! Double      [Double]                 8 byte words
//! Vector2     [Float, Float]           2 × 4 byte words
//! Vector3     [Float, Float, Float]    3 × 4 byte words
//! IntPoint    [Int32, Int32]           2 × 4 byte words
//! Struct(T)   [Struct(T)]              boxed values
//! ```

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use glam::{IVec2, Vec2, Vec3};
use smallvec::{smallvec, SmallVec};

use crate::buffer::TypeSize;
use crate::value::{ComplexValue, VoxelStruct};

// =============================================================================
// StructType - descriptor for boxed value types
// =============================================================================

/// Descriptor of a complex (boxed) value type.
///
/// Carries the constructor used to default-initialize complex storage, so
/// "default" always means whatever the concrete type's `Default` produces.
#[derive(Clone, Copy)]
pub struct StructType {
  name: &'static str,
  type_id: TypeId,
  make_default: fn() -> ComplexValue,
}

fn make_default_value<T: VoxelStruct + Default>() -> ComplexValue {
  ComplexValue::new(T::default())
}

impl StructType {
  pub fn of<T: VoxelStruct + Default>() -> Self {
    Self {
      name: std::any::type_name::<T>(),
      type_id: TypeId::of::<T>(),
      make_default: make_default_value::<T>,
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn type_id(&self) -> TypeId {
    self.type_id
  }

  /// Default-constructed value of this type.
  pub fn make_default(&self) -> ComplexValue {
    (self.make_default)()
  }
}

impl PartialEq for StructType {
  fn eq(&self, other: &Self) -> bool {
    self.type_id == other.type_id
  }
}

impl Eq for StructType {}

impl Hash for StructType {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.type_id.hash(state);
  }
}

impl fmt::Debug for StructType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "StructType({})", self.name)
  }
}

// =============================================================================
// VoxelEnum - byte enum descriptor
// =============================================================================

/// One entry of a [`VoxelEnum`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumEntry {
  pub name: String,
  pub value: u8,
  pub display_name: String,
  /// Hidden entries keep their option pin but do not show it.
  pub hidden: bool,
  /// Spacer entries only exist for layout; their pin is hidden too.
  pub spacer: bool,
}

impl EnumEntry {
  pub fn new(name: impl Into<String>, value: u8) -> Self {
    let name = name.into();
    Self {
      display_name: name.clone(),
      name,
      value,
      hidden: false,
      spacer: false,
    }
  }

  pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
    self.display_name = display_name.into();
    self
  }

  pub fn hidden(mut self) -> Self {
    self.hidden = true;
    self
  }

  pub fn spacer(mut self) -> Self {
    self.spacer = true;
    self
  }
}

/// Byte enum descriptor used to name select options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelEnum {
  name: String,
  entries: Vec<EnumEntry>,
}

impl VoxelEnum {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      entries: Vec::new(),
    }
  }

  pub fn with_entry(mut self, entry: EnumEntry) -> Self {
    self.entries.push(entry);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn entries(&self) -> &[EnumEntry] {
    &self.entries
  }

  /// One past the highest declared value (0 for an empty enum).
  pub fn max_enum_value(&self) -> usize {
    self
      .entries
      .iter()
      .map(|entry| entry.value as usize + 1)
      .max()
      .unwrap_or(0)
  }

  pub fn is_valid_enum_value(&self, value: usize) -> bool {
    self.entry_by_value(value).is_some()
  }

  pub fn entry_by_value(&self, value: usize) -> Option<&EnumEntry> {
    self
      .entries
      .iter()
      .find(|entry| entry.value as usize == value)
  }
}

/// Read-only catalogue of the enums a graph may use.
///
/// Passed explicitly wherever the set of known types matters, there is no
/// process-wide registry.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
  enums: Vec<Arc<VoxelEnum>>,
}

impl TypeRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_enum(mut self, voxel_enum: Arc<VoxelEnum>) -> Self {
    self.enums.push(voxel_enum);
    self
  }

  pub fn enums(&self) -> &[Arc<VoxelEnum>] {
    &self.enums
  }

  /// All registered enums as scalar byte pin types.
  pub fn enum_types(&self) -> impl Iterator<Item = PinType> + '_ {
    self.enums.iter().cloned().map(PinType::make_enum)
  }
}

// =============================================================================
// PinKind / PinType
// =============================================================================

/// Value-type tag, independent of buffer-ness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PinKind {
  Wildcard,
  Bool,
  Byte,
  Int32,
  Int64,
  Float,
  Double,
  Vector2,
  Vector3,
  IntPoint,
  Struct(StructType),
}

impl PinKind {
  /// Storage width for kinds backed by a single simple channel.
  pub fn type_size(&self) -> Option<TypeSize> {
    match self {
      PinKind::Bool | PinKind::Byte => Some(TypeSize::One),
      PinKind::Int32 | PinKind::Float => Some(TypeSize::Four),
      PinKind::Int64 | PinKind::Double => Some(TypeSize::Eight),
      _ => None,
    }
  }

  /// Kinds of the terminal channels a buffer of this kind is made of.
  pub fn terminal_kinds(&self) -> SmallVec<[PinKind; 4]> {
    match self {
      PinKind::Wildcard => SmallVec::new(),
      PinKind::Vector2 => smallvec![PinKind::Float; 2],
      PinKind::Vector3 => smallvec![PinKind::Float; 3],
      PinKind::IntPoint => smallvec![PinKind::Int32; 2],
      kind => smallvec![*kind],
    }
  }

  fn label(&self) -> &'static str {
    match self {
      PinKind::Wildcard => "wildcard",
      PinKind::Bool => "bool",
      PinKind::Byte => "byte",
      PinKind::Int32 => "int32",
      PinKind::Int64 => "int64",
      PinKind::Float => "float",
      PinKind::Double => "double",
      PinKind::Vector2 => "vector2",
      PinKind::Vector3 => "vector3",
      PinKind::IntPoint => "int point",
      PinKind::Struct(struct_type) => struct_type.name(),
    }
  }
}

/// Logical type of a pin or value.
#[derive(Clone, Debug)]
pub struct PinType {
  kind: PinKind,
  is_buffer: bool,
  /// Only ever set on `Byte` kinds.
  enum_type: Option<Arc<VoxelEnum>>,
}

impl PinType {
  pub fn new(kind: PinKind, is_buffer: bool) -> Self {
    Self {
      kind,
      is_buffer,
      enum_type: None,
    }
  }

  pub fn wildcard() -> Self {
    Self::new(PinKind::Wildcard, false)
  }

  /// Scalar type of `T`.
  pub fn of<T: VoxelPinValue>() -> Self {
    Self::new(T::kind(), false)
  }

  /// Buffer type of `T`.
  pub fn buffer_of<T: VoxelPinValue>() -> Self {
    Self::new(T::kind(), true)
  }

  /// Scalar type of a boxed struct value.
  pub fn make_struct<T: VoxelStruct + Default>() -> Self {
    Self::new(PinKind::Struct(StructType::of::<T>()), false)
  }

  /// Scalar byte type tagged with an enum descriptor.
  pub fn make_enum(voxel_enum: Arc<VoxelEnum>) -> Self {
    Self {
      kind: PinKind::Byte,
      is_buffer: false,
      enum_type: Some(voxel_enum),
    }
  }

  pub fn kind(&self) -> PinKind {
    self.kind
  }

  /// Exact scalar test. Enum bytes count as `u8`.
  pub fn is<T: VoxelPinValue>(&self) -> bool {
    !self.is_buffer && self.kind == T::kind()
  }

  /// Exact buffer test. Enum byte buffers count as `u8` buffers.
  pub fn is_buffer_of<T: VoxelPinValue>(&self) -> bool {
    self.is_buffer && self.kind == T::kind()
  }

  pub fn is_buffer(&self) -> bool {
    self.is_buffer
  }

  pub fn is_wildcard(&self) -> bool {
    self.kind == PinKind::Wildcard
  }

  pub fn is_struct(&self) -> bool {
    matches!(self.kind, PinKind::Struct(_))
  }

  pub fn get_enum(&self) -> Option<&Arc<VoxelEnum>> {
    self.enum_type.as_ref()
  }

  /// Same type with buffer-ness stripped.
  pub fn inner_type(&self) -> PinType {
    Self {
      is_buffer: false,
      ..self.clone()
    }
  }

  /// Same type with buffer-ness added.
  pub fn buffer_type(&self) -> PinType {
    Self {
      is_buffer: true,
      ..self.clone()
    }
  }

  /// Whether a value of this type can be used where `other` is expected.
  ///
  /// Kinds must match exactly; enum tags are ignored so enum bytes and plain
  /// bytes interchange. Wildcards are never castable either way.
  pub fn can_be_casted_to(&self, other: &PinType) -> bool {
    if self.is_wildcard() || other.is_wildcard() {
      return false;
    }
    self.kind == other.kind && self.is_buffer == other.is_buffer
  }

  pub fn terminal_kinds(&self) -> SmallVec<[PinKind; 4]> {
    self.kind.terminal_kinds()
  }
}

impl PartialEq for PinType {
  fn eq(&self, other: &Self) -> bool {
    self.kind == other.kind
      && self.is_buffer == other.is_buffer
      && self.enum_type.as_deref().map(VoxelEnum::name)
        == other.enum_type.as_deref().map(VoxelEnum::name)
  }
}

impl Eq for PinType {}

impl fmt::Display for PinType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.enum_type {
      Some(voxel_enum) => write!(f, "{}", voxel_enum.name())?,
      None => write!(f, "{}", self.kind.label())?,
    }
    if self.is_buffer {
      write!(f, " buffer")?;
    }
    Ok(())
  }
}

impl Default for PinType {
  fn default() -> Self {
    Self::wildcard()
  }
}

// =============================================================================
// VoxelPinValue - Rust types with a fixed pin kind
// =============================================================================

/// Rust value types that map onto a fixed [`PinKind`].
pub trait VoxelPinValue: Send + Sync + 'static {
  fn kind() -> PinKind;
}

macro_rules! impl_pin_value {
  ($($ty:ty => $kind:ident),* $(,)?) => {
    $(
      impl VoxelPinValue for $ty {
        fn kind() -> PinKind {
          PinKind::$kind
        }
      }
    )*
  };
}

impl_pin_value! {
  bool => Bool,
  u8 => Byte,
  i32 => Int32,
  i64 => Int64,
  f32 => Float,
  f64 => Double,
  Vec2 => Vector2,
  Vec3 => Vector3,
  IVec2 => IntPoint,
}

#[cfg(test)]
#[path = "pin_type_test.rs"]
mod pin_type_test;
