//! Select engine benchmarks.
//!
//! Compares the selector paths on buffers of increasing length:
//! - **bool**: two populated candidates
//! - **indexed**: four int32-indexed candidates, one of them constant
//! - **constant index**: short-circuit to a shared candidate
//! - **vector3**: three channels per candidate
//!
//! Each path runs with the parallel and the sequential chunk walk.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use voxel_graph::{BufferSelector, PinType, SelectorConfig, VoxelBuffer};

const SIZES: [usize; 3] = [4_096, 65_536, 1_048_576];

/// Cheap deterministic pattern, no RNG needed.
fn pattern(num: usize, seed: u32) -> Vec<i32> {
  (0..num)
    .map(|i| ((i as u32).wrapping_mul(2_654_435_761).wrapping_add(seed) >> 7) as i32)
    .collect()
}

fn selectors() -> [(&'static str, BufferSelector); 2] {
  [
    ("parallel", BufferSelector::new(SelectorConfig::new())),
    (
      "sequential",
      BufferSelector::new(SelectorConfig::new().with_parallel(false)),
    ),
  ]
}

fn bench_bool_select(c: &mut Criterion) {
  let mut group = c.benchmark_group("select_bool");

  for num in SIZES {
    let condition: Vec<bool> = pattern(num, 1).iter().map(|value| value & 1 == 0).collect();
    let condition = VoxelBuffer::from_elements(&condition);
    let on_false = VoxelBuffer::from_elements(&pattern(num, 2));
    let on_true = VoxelBuffer::from_elements(&pattern(num, 3));
    let int_type = PinType::of::<i32>();

    for (name, selector) in selectors() {
      group.bench_with_input(BenchmarkId::new(name, num), &num, |b, _| {
        b.iter(|| {
          selector.select_generic(
            black_box(&int_type),
            black_box(&condition),
            &[&on_false, &on_true],
          )
        })
      });
    }
  }

  group.finish();
}

fn bench_indexed_select(c: &mut Criterion) {
  let mut group = c.benchmark_group("select_indexed");

  for num in SIZES {
    let indices: Vec<i32> = pattern(num, 4).iter().map(|value| value & 3).collect();
    let indices = VoxelBuffer::from_elements(&indices);
    let candidates = [
      VoxelBuffer::from_elements(&pattern(num, 5)),
      VoxelBuffer::from_elements(&pattern(num, 6)),
      VoxelBuffer::constant(7i32),
      VoxelBuffer::from_elements(&pattern(num, 8)),
    ];
    let candidates: Vec<&VoxelBuffer> = candidates.iter().collect();
    let int_type = PinType::of::<i32>();

    for (name, selector) in selectors() {
      group.bench_with_input(BenchmarkId::new(name, num), &num, |b, _| {
        b.iter(|| selector.select_generic(black_box(&int_type), black_box(&indices), &candidates))
      });
    }
  }

  group.finish();
}

fn bench_constant_index(c: &mut Criterion) {
  let num = SIZES[2];
  let indices = VoxelBuffer::constant(1u8);
  let first = VoxelBuffer::from_elements(&pattern(num, 9));
  let second = VoxelBuffer::from_elements(&pattern(num, 10));
  let int_type = PinType::of::<i32>();
  let selector = BufferSelector::default();

  c.bench_function("select_constant_index (1M)", |b| {
    b.iter(|| selector.select_generic(black_box(&int_type), black_box(&indices), &[&first, &second]))
  });
}

fn bench_vector_select(c: &mut Criterion) {
  let mut group = c.benchmark_group("select_vector3");

  for num in SIZES {
    let condition: Vec<bool> = pattern(num, 11).iter().map(|value| value & 2 == 0).collect();
    let condition = VoxelBuffer::from_elements(&condition);
    let positions: Vec<Vec3> = (0..num).map(|i| Vec3::splat(i as f32)).collect();
    let on_false = VoxelBuffer::from_vec3s(&positions);
    let on_true = VoxelBuffer::from_vec3s(&[Vec3::ZERO]);
    let vector_type = PinType::of::<Vec3>();

    for (name, selector) in selectors() {
      group.bench_with_input(BenchmarkId::new(name, num), &num, |b, _| {
        b.iter(|| {
          selector.select_generic(
            black_box(&vector_type),
            black_box(&condition),
            &[&on_false, &on_true],
          )
        })
      });
    }
  }

  group.finish();
}

criterion_group!(
  benches,
  bench_bool_select,
  bench_indexed_select,
  bench_constant_index,
  bench_vector_select
);
criterion_main!(benches);
