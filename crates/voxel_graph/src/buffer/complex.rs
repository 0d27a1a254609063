//! Storage for boxed struct values.

use std::ops::{Index, IndexMut};

use crate::pin_type::StructType;
use crate::value::ComplexValue;

/// Boxed values of a single [`StructType`].
///
/// Like simple storage, one element means constant.
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexBufferStorage {
  struct_type: StructType,
  values: Vec<ComplexValue>,
}

impl ComplexBufferStorage {
  pub fn new(struct_type: StructType) -> Self {
    Self {
      struct_type,
      values: Vec::new(),
    }
  }

  /// `num` elements, each the struct type's own default.
  pub fn allocate(struct_type: StructType, num: usize) -> Self {
    Self {
      struct_type,
      values: (0..num).map(|_| struct_type.make_default()).collect(),
    }
  }

  pub fn constant(struct_type: StructType, value: ComplexValue) -> Self {
    Self::from_values(struct_type, vec![value])
  }

  pub fn from_values(struct_type: StructType, values: Vec<ComplexValue>) -> Self {
    debug_assert!(values
      .iter()
      .all(|value| value.value_type_id() == struct_type.type_id()));
    Self {
      struct_type,
      values,
    }
  }

  pub fn struct_type(&self) -> StructType {
    self.struct_type
  }

  pub fn num(&self) -> usize {
    self.values.len()
  }

  pub fn is_constant(&self) -> bool {
    self.values.len() == 1
  }

  /// Value at `index`, masked to 0 on constant storage.
  pub fn get(&self, index: usize) -> Option<&ComplexValue> {
    let index = if self.is_constant() { 0 } else { index };
    self.values.get(index)
  }

  pub fn values(&self) -> &[ComplexValue] {
    &self.values
  }
}

impl Index<usize> for ComplexBufferStorage {
  type Output = ComplexValue;

  #[inline]
  fn index(&self, index: usize) -> &ComplexValue {
    let index = if self.is_constant() { 0 } else { index };
    &self.values[index]
  }
}

impl IndexMut<usize> for ComplexBufferStorage {
  #[inline]
  fn index_mut(&mut self, index: usize) -> &mut ComplexValue {
    &mut self.values[index]
  }
}
