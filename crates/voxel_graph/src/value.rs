//! Runtime values: boxed complex values and the tagged pin value.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use glam::{IVec2, Vec2, Vec3};

use crate::buffer::VoxelBuffer;
use crate::pin_type::{PinKind, PinType, StructType};

/// A value type that can live in complex (boxed) buffer storage.
///
/// Implemented for every `Clone + PartialEq + Debug` type that is
/// thread-safe, so plain structs need no extra code.
pub trait VoxelStruct: Any + Send + Sync + fmt::Debug {
  fn clone_struct(&self) -> Box<dyn VoxelStruct>;
  fn eq_struct(&self, other: &dyn VoxelStruct) -> bool;
  fn as_any(&self) -> &dyn Any;
  fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> VoxelStruct for T
where
  T: Any + Clone + PartialEq + Send + Sync + fmt::Debug,
{
  fn clone_struct(&self) -> Box<dyn VoxelStruct> {
    Box::new(self.clone())
  }

  fn eq_struct(&self, other: &dyn VoxelStruct) -> bool {
    other
      .as_any()
      .downcast_ref::<T>()
      .is_some_and(|other| other == self)
  }

  fn as_any(&self) -> &dyn Any {
    self
  }

  fn as_any_mut(&mut self) -> &mut dyn Any {
    self
  }
}

/// An owned, boxed complex value. Cloning deep-copies the inner value.
pub struct ComplexValue(Box<dyn VoxelStruct>);

impl ComplexValue {
  pub fn new<T: VoxelStruct>(value: T) -> Self {
    Self(Box::new(value))
  }

  pub fn get<T: VoxelStruct>(&self) -> Option<&T> {
    self.0.as_any().downcast_ref::<T>()
  }

  pub fn get_mut<T: VoxelStruct>(&mut self) -> Option<&mut T> {
    self.0.as_any_mut().downcast_mut::<T>()
  }

  /// Deep-copy this value into `other`, replacing whatever it held.
  pub fn copy_to(&self, other: &mut ComplexValue) {
    other.0 = self.0.clone_struct();
  }

  pub fn is<T: VoxelStruct>(&self) -> bool {
    self.0.as_any().is::<T>()
  }

  /// `TypeId` of the boxed value, not of the box.
  pub fn value_type_id(&self) -> TypeId {
    self.0.as_any().type_id()
  }
}

impl Clone for ComplexValue {
  fn clone(&self) -> Self {
    Self(self.0.clone_struct())
  }
}

impl PartialEq for ComplexValue {
  fn eq(&self, other: &Self) -> bool {
    self.0.eq_struct(other.0.as_ref())
  }
}

impl fmt::Debug for ComplexValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(&self.0, f)
  }
}

/// A resolved pin value: a scalar of some kind, or a shared buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum RuntimePinValue {
  Bool(bool),
  Byte(u8),
  Int32(i32),
  Int64(i64),
  Float(f32),
  Double(f64),
  Vector2(Vec2),
  Vector3(Vec3),
  IntPoint(IVec2),
  Struct(StructType, ComplexValue),
  Buffer(Arc<VoxelBuffer>),
}

impl RuntimePinValue {
  pub fn make_struct<T: VoxelStruct + Default>(value: T) -> Self {
    RuntimePinValue::Struct(StructType::of::<T>(), ComplexValue::new(value))
  }

  pub fn pin_type(&self) -> PinType {
    match self {
      RuntimePinValue::Bool(_) => PinType::new(PinKind::Bool, false),
      RuntimePinValue::Byte(_) => PinType::new(PinKind::Byte, false),
      RuntimePinValue::Int32(_) => PinType::new(PinKind::Int32, false),
      RuntimePinValue::Int64(_) => PinType::new(PinKind::Int64, false),
      RuntimePinValue::Float(_) => PinType::new(PinKind::Float, false),
      RuntimePinValue::Double(_) => PinType::new(PinKind::Double, false),
      RuntimePinValue::Vector2(_) => PinType::new(PinKind::Vector2, false),
      RuntimePinValue::Vector3(_) => PinType::new(PinKind::Vector3, false),
      RuntimePinValue::IntPoint(_) => PinType::new(PinKind::IntPoint, false),
      RuntimePinValue::Struct(struct_type, _) => PinType::new(PinKind::Struct(*struct_type), false),
      RuntimePinValue::Buffer(buffer) => buffer.buffer_type(),
    }
  }

  /// Scalar index interpretation: bool as 0/1, bytes and ints as-is.
  pub fn as_index(&self) -> Option<i64> {
    match self {
      RuntimePinValue::Bool(value) => Some(*value as i64),
      RuntimePinValue::Byte(value) => Some(*value as i64),
      RuntimePinValue::Int32(value) => Some(*value as i64),
      _ => None,
    }
  }

  pub fn as_buffer(&self) -> Option<&Arc<VoxelBuffer>> {
    match self {
      RuntimePinValue::Buffer(buffer) => Some(buffer),
      _ => None,
    }
  }
}

macro_rules! impl_from_scalar {
  ($($ty:ty => $variant:ident),* $(,)?) => {
    $(
      impl From<$ty> for RuntimePinValue {
        fn from(value: $ty) -> Self {
          RuntimePinValue::$variant(value)
        }
      }
    )*
  };
}

impl_from_scalar! {
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

impl From<Arc<VoxelBuffer>> for RuntimePinValue {
  fn from(buffer: Arc<VoxelBuffer>) -> Self {
    RuntimePinValue::Buffer(buffer)
  }
}

impl From<VoxelBuffer> for RuntimePinValue {
  fn from(buffer: VoxelBuffer) -> Self {
    RuntimePinValue::Buffer(Arc::new(buffer))
  }
}
