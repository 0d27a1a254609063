use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::nodes::pin::PinValueMap;
use crate::pin_type::EnumEntry;
use crate::threading::TaskExecutor;

fn biome_enum() -> Arc<VoxelEnum> {
  Arc::new(
    VoxelEnum::new("Biome")
      .with_entry(EnumEntry::new("Plains", 0))
      .with_entry(EnumEntry::new("Desert", 1).with_display_name("Hot Desert"))
      .with_entry(EnumEntry::new("Tundra", 3).hidden())
      .with_entry(EnumEntry::new("Divider", 4).spacer()),
  )
}

fn pin_names(node: &SelectNode) -> Vec<&str> {
  node.value_pins().iter().map(|pin| pin.name.as_str()).collect()
}

/// Node with an index of `index_type` and an int32 buffer result.
fn int_buffer_node(index_type: PinType) -> SelectNode {
  let mut node = SelectNode::new();
  node.promote_pin(INDEX_PIN, index_type);
  node.promote_pin(RESULT_PIN, PinType::buffer_of::<i32>());
  node
}

fn eval(node: &SelectNode, source: PinValueMap) -> Option<RuntimePinValue> {
  node
    .compute(Arc::new(source), &Query::new())
    .wait_timeout(Duration::from_secs(5))
    .flatten()
}

fn result_ints(value: Option<RuntimePinValue>) -> Option<Vec<i32>> {
  value.as_ref()?.as_buffer()?.to_vec::<i32>()
}

// =============================================================================
// Pin layout
// =============================================================================

#[test]
fn test_new_node_layout() {
  let node = SelectNode::new();

  assert_eq!(node.index_pin().pin_type, PinType::buffer_of::<bool>());
  assert!(node.result_pin().pin_type.is_wildcard());
  assert_eq!(pin_names(&node), vec!["False", "True"]);
  assert_eq!(node.num_integer_options(), 2);
  assert!(!node.can_add_input_pin());
  assert!(node.pin(INDEX_PIN).is_some());
  assert!(node.pin("True").is_some());
  assert!(node.pin("Option_0").is_none());
}

#[test]
fn test_integer_index_numbered_pins() {
  let node = int_buffer_node(PinType::buffer_of::<i32>());

  assert_eq!(pin_names(&node), vec!["Option_0", "Option_1"]);
  assert_eq!(node.value_pins()[1].label(), "Option 1");
  for pin in node.value_pins() {
    assert_eq!(pin.pin_type, PinType::buffer_of::<i32>());
    assert!(!pin.hidden);
  }
}

#[test]
fn test_enum_index_pins() {
  let node = int_buffer_node(PinType::make_enum(biome_enum()).buffer_type());

  assert_eq!(
    pin_names(&node),
    vec!["Plains", "Desert", "Biome_2", "Tundra", "Divider"]
  );
  let hidden: Vec<bool> = node.value_pins().iter().map(|pin| pin.hidden).collect();
  assert_eq!(hidden, vec![false, false, true, true, true]);
  assert_eq!(node.value_pins()[1].label(), "Hot Desert");
  assert!(!node.can_add_input_pin());
}

#[test]
fn test_add_and_remove_options() {
  let mut node = int_buffer_node(PinType::buffer_of::<i32>());

  assert!(node.can_add_input_pin());
  assert!(!node.can_remove_input_pin());
  assert!(!node.remove_input_pin());

  assert!(node.add_input_pin());
  assert!(node.add_input_pin());
  assert_eq!(pin_names(&node), vec!["Option_0", "Option_1", "Option_2", "Option_3"]);
  assert!(node.can_remove_input_pin());

  assert!(node.remove_input_pin());
  assert_eq!(node.value_pins().len(), 3);

  // The option count survives a switch to bool and back.
  node.promote_pin(INDEX_PIN, PinType::buffer_of::<bool>());
  assert_eq!(pin_names(&node), vec!["False", "True"]);
  assert!(!node.add_input_pin());

  node.promote_pin(INDEX_PIN, PinType::buffer_of::<u8>());
  assert_eq!(node.value_pins().len(), 3);
  assert!(node.can_add_input_pin());
}

// =============================================================================
// Promotion
// =============================================================================

#[test]
fn test_promote_result_reshapes_index() {
  let mut node = SelectNode::new();
  node.promote_pin(INDEX_PIN, PinType::of::<bool>());
  assert!(!node.result_pin().pin_type.is_buffer());

  node.promote_pin(RESULT_PIN, PinType::buffer_of::<f32>());
  assert_eq!(node.index_pin().pin_type, PinType::buffer_of::<bool>());
  for pin in node.value_pins() {
    assert_eq!(pin.pin_type, PinType::buffer_of::<f32>());
  }
}

#[test]
fn test_promote_index_reshapes_result() {
  let mut node = int_buffer_node(PinType::buffer_of::<i32>());

  node.promote_pin(INDEX_PIN, PinType::of::<i32>());
  assert_eq!(node.result_pin().pin_type, PinType::of::<i32>());
  assert_eq!(node.value_pins()[0].pin_type, PinType::of::<i32>());
}

#[test]
fn test_promotion_types() {
  let registry = TypeRegistry::new().with_enum(biome_enum());
  let node = SelectNode::new();

  let index_types = node.promotion_types(INDEX_PIN, &registry);
  assert!(index_types.contains(&PinType::of::<bool>()));
  assert!(index_types.contains(&PinType::buffer_of::<u8>()));
  assert!(index_types.contains(&PinType::make_enum(biome_enum())));
  assert!(index_types.contains(&PinType::make_enum(biome_enum()).buffer_type()));
  assert!(!index_types.contains(&PinType::of::<f32>()));
  assert!(!index_types.contains(&PinType::buffer_of::<i64>()));

  assert_eq!(node.promotion_types(RESULT_PIN, &registry), PromotionTypes::All);
  assert_eq!(node.promotion_types("False", &registry), PromotionTypes::All);
}

// =============================================================================
// Evaluation
// =============================================================================

#[test]
fn test_compute_scalar_index() {
  let mut node = SelectNode::new();
  node.promote_pin(INDEX_PIN, PinType::of::<i32>());
  node.promote_pin(RESULT_PIN, PinType::of::<f32>());
  node.add_input_pin();

  let source = PinValueMap::new()
    .with_value(INDEX_PIN, 2i32)
    .with_value("Option_0", 0.5f32)
    .with_value("Option_1", 1.5f32)
    .with_value("Option_2", 2.5f32);

  assert_eq!(eval(&node, source), Some(RuntimePinValue::Float(2.5)));
}

#[test]
fn test_compute_scalar_out_of_range() {
  let mut node = SelectNode::new();
  node.promote_pin(INDEX_PIN, PinType::of::<i32>());
  node.promote_pin(RESULT_PIN, PinType::of::<f32>());

  for index in [2i32, -1] {
    let source = PinValueMap::new()
      .with_value(INDEX_PIN, index)
      .with_value("Option_0", 0.5f32)
      .with_value("Option_1", 1.5f32);
    assert_eq!(eval(&node, source), None);
  }
}

#[test]
fn test_compute_bool_buffer() {
  let node = int_buffer_node(PinType::buffer_of::<bool>());

  let source = PinValueMap::new()
    .with_value(INDEX_PIN, VoxelBuffer::from_elements(&[true, false, true]))
    .with_value("False", VoxelBuffer::from_elements(&[1i32, 2, 3]))
    .with_value("True", VoxelBuffer::constant(9i32));

  assert_eq!(result_ints(eval(&node, source)), Some(vec![9, 2, 9]));
}

#[test]
fn test_compute_constant_index_forwards_option() {
  let node = int_buffer_node(PinType::buffer_of::<u8>());
  let option = Arc::new(VoxelBuffer::from_elements(&[4i32, 5, 6]));

  let source = PinValueMap::new()
    .with_value(INDEX_PIN, VoxelBuffer::constant(1u8))
    .with_value("Option_0", VoxelBuffer::from_elements(&[0i32, 0]))
    .with_value("Option_1", Arc::clone(&option));

  let result = eval(&node, source);
  let buffer = result.as_ref().and_then(RuntimePinValue::as_buffer);
  assert!(buffer.is_some_and(|buffer| Arc::ptr_eq(buffer, &option)));
}

#[test]
fn test_compute_empty_index_has_no_value() {
  let node = int_buffer_node(PinType::buffer_of::<i32>());

  let source = PinValueMap::new()
    .with_value(INDEX_PIN, VoxelBuffer::from_elements::<i32>(&[]))
    .with_value("Option_0", VoxelBuffer::from_elements(&[1i32]))
    .with_value("Option_1", VoxelBuffer::from_elements(&[2i32]));

  assert_eq!(eval(&node, source), None);
}

#[test]
fn test_compute_length_mismatch_has_no_value() {
  let node = int_buffer_node(PinType::buffer_of::<i32>());

  let source = PinValueMap::new()
    .with_value(INDEX_PIN, VoxelBuffer::from_elements(&[0i32, 1, 0]))
    .with_value("Option_0", VoxelBuffer::from_elements(&[1i32, 2, 3]))
    .with_value("Option_1", VoxelBuffer::from_elements(&[4i32, 5]));

  assert_eq!(eval(&node, source), None);
}

#[test]
fn test_compute_missing_option_has_no_value() {
  let node = int_buffer_node(PinType::buffer_of::<i32>());

  let source = PinValueMap::new()
    .with_value(INDEX_PIN, VoxelBuffer::from_elements(&[0i32, 1]))
    .with_value("Option_0", VoxelBuffer::from_elements(&[1i32, 2]));

  assert_eq!(eval(&node, source), None);
}

#[test]
fn test_compute_enum_buffer() {
  let biome = biome_enum();
  let node = int_buffer_node(PinType::make_enum(Arc::clone(&biome)).buffer_type());

  let source = PinValueMap::new()
    .with_value(INDEX_PIN, VoxelBuffer::from_enum_values(biome, &[3, 0, 1, 7]))
    .with_value("Plains", VoxelBuffer::constant(10i32))
    .with_value("Desert", VoxelBuffer::constant(11i32))
    .with_value("Biome_2", VoxelBuffer::constant(12i32))
    .with_value("Tundra", VoxelBuffer::constant(13i32))
    .with_value("Divider", VoxelBuffer::constant(14i32));

  // Out-of-range indices select zero.
  assert_eq!(result_ints(eval(&node, source)), Some(vec![13, 10, 11, 0]));
}

#[test]
fn test_compute_deferred_matches_immediate() {
  let node = int_buffer_node(PinType::buffer_of::<i32>())
    .with_config(SelectorConfig::new().with_num_per_chunk(2));

  let indices: Vec<i32> = (0..9).map(|i| i % 2).collect();
  let source = PinValueMap::new()
    .with_value(INDEX_PIN, VoxelBuffer::from_elements(&indices))
    .with_value("Option_0", VoxelBuffer::from_elements(&[-1i32; 9]))
    .with_value("Option_1", VoxelBuffer::constant(1i32));

  let immediate = result_ints(eval(&node, source.clone()));
  let deferred = result_ints(eval(&node, source.deferred(TaskExecutor::new())));

  assert_eq!(immediate, Some(vec![-1, 1, -1, 1, -1, 1, -1, 1, -1]));
  assert_eq!(deferred, immediate);
}

#[test]
fn test_compute_unsupported_index_has_no_value() {
  let mut node = int_buffer_node(PinType::buffer_of::<i32>());
  node.promote_pin(INDEX_PIN, PinType::buffer_of::<f32>());
  assert!(node.value_pins().is_empty());

  let source = PinValueMap::new().with_value(INDEX_PIN, VoxelBuffer::from_elements(&[0.0f32]));
  assert_eq!(eval(&node, source), None);
}
