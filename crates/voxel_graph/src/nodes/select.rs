//! Select node: routes one of several option inputs to its result.
//!
//! ```text
//!            ┌────────────── Select ──────────────┐
//!  Index ───►│ bool / byte / int32 / enum,        │
//!            │ scalar or buffer                   ├───► Result
//!  False ───►│ (one option pin per index value)   │
//!  True  ───►│                                    │
//!            └────────────────────────────────────┘
//! ```
//!
//! Scalar indices pick one option pin and forward its value. Buffer indices
//! read every option buffer and run the buffer selector element-wise.

use std::sync::Arc;

use smallvec::SmallVec;

use super::pin::{FutureValue, Pin, PinValueSource, Query};
use crate::buffer::{merge_num, VoxelBuffer};
use crate::constants::{DEFAULT_INTEGER_OPTIONS, INLINE_CANDIDATES};
use crate::error::EvaluationError;
use crate::future::VoxelFuture;
use crate::pin_type::{PinKind, PinType, TypeRegistry, VoxelEnum};
use crate::selector::{BufferSelector, SelectorConfig};
use crate::value::RuntimePinValue;

pub const INDEX_PIN: &str = "Index";
pub const RESULT_PIN: &str = "Result";

/// Types a pin may be promoted to.
#[derive(Clone, Debug, PartialEq)]
pub enum PromotionTypes {
  /// Any type.
  All,
  Types(Vec<PinType>),
}

impl PromotionTypes {
  pub fn contains(&self, pin_type: &PinType) -> bool {
    match self {
      PromotionTypes::All => true,
      PromotionTypes::Types(types) => types.contains(pin_type),
    }
  }
}

#[derive(Clone, Debug)]
pub struct SelectNode {
  index_pin: Pin,
  result_pin: Pin,
  value_pins: Vec<Pin>,
  num_integer_options: usize,
  config: SelectorConfig,
}

impl Default for SelectNode {
  fn default() -> Self {
    Self::new()
  }
}

impl SelectNode {
  /// Bool buffer index, wildcard result, `False`/`True` options.
  pub fn new() -> Self {
    let mut node = Self {
      index_pin: Pin::new(INDEX_PIN, PinType::buffer_of::<bool>()),
      result_pin: Pin::new(RESULT_PIN, PinType::wildcard()),
      value_pins: Vec::new(),
      num_integer_options: DEFAULT_INTEGER_OPTIONS,
      config: SelectorConfig::default(),
    };
    node.fixup_value_pins();
    node
  }

  pub fn with_config(mut self, config: SelectorConfig) -> Self {
    self.config = config;
    self
  }

  pub fn index_pin(&self) -> &Pin {
    &self.index_pin
  }

  pub fn result_pin(&self) -> &Pin {
    &self.result_pin
  }

  pub fn value_pins(&self) -> &[Pin] {
    &self.value_pins
  }

  pub fn num_integer_options(&self) -> usize {
    self.num_integer_options
  }

  pub fn pin(&self, name: &str) -> Option<&Pin> {
    [&self.index_pin, &self.result_pin]
      .into_iter()
      .chain(&self.value_pins)
      .find(|pin| pin.name == name)
  }

  // ===========================================================================
  // Pin layout
  // ===========================================================================

  /// Rebuild the option pins from the index type, typed like the result.
  pub fn fixup_value_pins(&mut self) {
    self.value_pins.clear();

    let index_type = &self.index_pin.pin_type;
    if index_type.is_wildcard() {
      return;
    }

    let index_inner_type = index_type.inner_type();
    let mut pins = match index_inner_type.kind() {
      PinKind::Bool => vec![
        Pin::new("False", PinType::wildcard()),
        Pin::new("True", PinType::wildcard()),
      ],
      PinKind::Int32 => numbered_pins(self.num_integer_options),
      PinKind::Byte => match index_inner_type.get_enum() {
        Some(voxel_enum) => enum_pins(voxel_enum),
        None => numbered_pins(self.num_integer_options),
      },
      _ => {
        tracing::error!(index_type = %index_type, "select index has an unsupported type");
        Vec::new()
      }
    };

    for pin in &mut pins {
      pin.pin_type = self.result_pin.pin_type.clone();
    }
    self.value_pins = pins;
  }

  /// Index pins take bool, int32, byte and enum types; other pins anything.
  pub fn promotion_types(&self, pin_name: &str, registry: &TypeRegistry) -> PromotionTypes {
    if pin_name != INDEX_PIN {
      return PromotionTypes::All;
    }

    let mut types = vec![
      PinType::of::<bool>(),
      PinType::buffer_of::<bool>(),
      PinType::of::<i32>(),
      PinType::buffer_of::<i32>(),
      PinType::of::<u8>(),
      PinType::buffer_of::<u8>(),
    ];
    for enum_type in registry.enum_types() {
      types.push(enum_type.buffer_type());
      types.push(enum_type);
    }
    PromotionTypes::Types(types)
  }

  /// Change a pin's type, keeping index and result equally buffer-shaped.
  pub fn promote_pin(&mut self, pin_name: &str, new_type: PinType) {
    if pin_name == INDEX_PIN {
      self.index_pin.pin_type = new_type;

      let is_buffer = self.index_pin.pin_type.is_buffer();
      if is_buffer != self.result_pin.pin_type.is_buffer() {
        self.result_pin.pin_type = reshape(&self.result_pin.pin_type, is_buffer);
      }
    } else {
      self.result_pin.pin_type = new_type;

      let is_buffer = self.result_pin.pin_type.is_buffer();
      if is_buffer != self.index_pin.pin_type.is_buffer() {
        self.index_pin.pin_type = reshape(&self.index_pin.pin_type, is_buffer);
      }
    }

    self.fixup_value_pins();
  }

  /// Options can be added for int32 and plain byte indices.
  pub fn can_add_input_pin(&self) -> bool {
    let index_inner_type = self.index_pin.pin_type.inner_type();
    index_inner_type.is::<i32>()
      || (index_inner_type.is::<u8>() && index_inner_type.get_enum().is_none())
  }

  pub fn add_input_pin(&mut self) -> bool {
    if !self.can_add_input_pin() {
      return false;
    }
    self.num_integer_options += 1;
    self.fixup_value_pins();
    true
  }

  /// Like [`can_add_input_pin`](Self::can_add_input_pin), and never below two options.
  pub fn can_remove_input_pin(&self) -> bool {
    self.num_integer_options > DEFAULT_INTEGER_OPTIONS && self.can_add_input_pin()
  }

  pub fn remove_input_pin(&mut self) -> bool {
    if !self.can_remove_input_pin() {
      return false;
    }
    self.num_integer_options -= 1;
    self.fixup_value_pins();
    true
  }

  // ===========================================================================
  // Evaluation
  // ===========================================================================

  /// Evaluate the result pin for `query`.
  pub fn compute(&self, source: Arc<dyn PinValueSource>, query: &Query) -> FutureValue {
    #[cfg(feature = "instrument")]
    let _span = tracing::info_span!("select_node::compute", query = query.id().raw()).entered();

    let index_type = &self.index_pin.pin_type;
    let options: Arc<[String]> = self.value_pins.iter().map(|pin| pin.name.clone()).collect();
    let query = query.clone();

    if is_index_kind(index_type) && !index_type.is_buffer() {
      return source.get(INDEX_PIN, &query).then(move |value| {
        let Some(index) = value.as_ref().and_then(RuntimePinValue::as_index) else {
          let error = EvaluationError::MissingPin(INDEX_PIN.to_string());
          tracing::debug!(%error, "select skipped");
          return VoxelFuture::ready(None);
        };
        read_option(source.as_ref(), &options, index, &query)
      });
    }

    if is_index_kind(index_type) {
      let result_type = self.result_pin.pin_type.inner_type();
      let selector = BufferSelector::new(self.config);

      return source.get(INDEX_PIN, &query).then(move |value| {
        let Some(indices) = value.as_ref().and_then(RuntimePinValue::as_buffer).cloned() else {
          let error = EvaluationError::MissingPin(INDEX_PIN.to_string());
          tracing::debug!(%error, "select skipped");
          return VoxelFuture::ready(None);
        };

        if indices.num() == 0 {
          return VoxelFuture::ready(None);
        }
        if indices.is_constant() {
          return match constant_index(&indices) {
            Some(index) => read_option(source.as_ref(), &options, index, &query),
            None => VoxelFuture::ready(None),
          };
        }

        let buffers = options
          .iter()
          .map(|pin| source.get(pin, &query))
          .collect();
        VoxelFuture::join_all(buffers).map(move |values| {
          select_buffers(&selector, &result_type, &indices, &options, values)
        })
      });
    }

    let error = EvaluationError::UnsupportedIndexType(index_type.clone());
    tracing::error!(%error, "select node cannot evaluate");
    VoxelFuture::ready(None)
  }
}

fn numbered_pins(num: usize) -> Vec<Pin> {
  (0..num)
    .map(|index| {
      Pin::new(format!("Option_{}", index), PinType::wildcard())
        .with_display_name(format!("Option {}", index))
    })
    .collect()
}

/// One pin per value below the enum's maximum. Gaps get hidden placeholders.
fn enum_pins(voxel_enum: &VoxelEnum) -> Vec<Pin> {
  (0..voxel_enum.max_enum_value())
    .map(|value| match voxel_enum.entry_by_value(value) {
      Some(entry) => Pin::new(entry.name.clone(), PinType::wildcard())
        .with_display_name(entry.display_name.clone())
        .with_hidden(entry.hidden || entry.spacer),
      None => Pin::new(
        format!("{}_{}", voxel_enum.name(), value),
        PinType::wildcard(),
      )
      .with_hidden(true),
    })
    .collect()
}

fn reshape(pin_type: &PinType, is_buffer: bool) -> PinType {
  if is_buffer {
    pin_type.buffer_type()
  } else {
    pin_type.inner_type()
  }
}

fn is_index_kind(pin_type: &PinType) -> bool {
  matches!(pin_type.kind(), PinKind::Bool | PinKind::Byte | PinKind::Int32)
}

fn constant_index(indices: &VoxelBuffer) -> Option<i64> {
  match indices.inner_type().kind() {
    PinKind::Bool => indices.typed::<bool>().map(|typed| typed.get_constant() as i64),
    PinKind::Byte => indices.typed::<u8>().map(|typed| typed.get_constant() as i64),
    PinKind::Int32 => indices.typed::<i32>().map(|typed| typed.get_constant() as i64),
    _ => None,
  }
}

fn read_option(source: &dyn PinValueSource, options: &[String], index: i64, query: &Query) -> FutureValue {
  match usize::try_from(index).ok().and_then(|index| options.get(index)) {
    Some(pin) => source.get(pin, query),
    None => {
      let error = EvaluationError::IndexOutOfRange {
        index,
        num_options: options.len(),
      };
      tracing::debug!(%error, "select produced no value");
      VoxelFuture::ready(None)
    }
  }
}

fn select_buffers(
  selector: &BufferSelector,
  result_type: &PinType,
  indices: &VoxelBuffer,
  options: &[String],
  values: Vec<Option<RuntimePinValue>>,
) -> Option<RuntimePinValue> {
  let mut buffers: SmallVec<[Arc<VoxelBuffer>; INLINE_CANDIDATES]> = SmallVec::new();
  let mut num = indices.num();

  for (pin, value) in options.iter().zip(&values) {
    let Some(buffer) = value.as_ref().and_then(RuntimePinValue::as_buffer) else {
      let error = EvaluationError::MissingPin(pin.clone());
      tracing::warn!(%error, "select option is not a buffer");
      return None;
    };

    let expected = num;
    if !merge_num(&mut num, buffer) {
      let error = EvaluationError::BufferLengthMismatch {
        expected,
        actual: buffer.num(),
      };
      tracing::warn!(%error, pin = %pin, "buffer error");
      return None;
    }
    buffers.push(Arc::clone(buffer));
  }

  let candidates: SmallVec<[&VoxelBuffer; INLINE_CANDIDATES]> =
    buffers.iter().map(Arc::as_ref).collect();
  Some(RuntimePinValue::Buffer(selector.select_generic(
    result_type,
    indices,
    &candidates,
  )))
}

#[cfg(test)]
#[path = "select_test.rs"]
mod select_test;
