use super::*;

#[test]
fn test_num_per_chunk_is_power_of_two() {
  assert!(NUM_PER_CHUNK.is_power_of_two());
  assert_eq!(NUM_PER_CHUNK, 4096);
}

#[test]
fn test_num_chunks() {
  assert_eq!(num_chunks(0, NUM_PER_CHUNK), 0);
  assert_eq!(num_chunks(1, NUM_PER_CHUNK), 1);
  assert_eq!(num_chunks(NUM_PER_CHUNK, NUM_PER_CHUNK), 1);
  assert_eq!(num_chunks(NUM_PER_CHUNK + 1, NUM_PER_CHUNK), 2);
  assert_eq!(num_chunks(10, 3), 4);
}

#[test]
fn test_num_chunks_zero_chunk_size() {
  assert_eq!(num_chunks(0, 0), 0);
  assert_eq!(num_chunks(5, 0), 5);
}
