//! voxel_graph - Columnar buffers and the select engine for voxel graphs
//!
//! This crate provides the typed, chunked buffers that voxel graph nodes
//! exchange, the select engine that routes candidate buffers element by
//! element, and the Select node that drives it from graph pins.
//!
//! # Features
//!
//! - **Typed buffers**: one terminal buffer per channel, constant buffers
//!   broadcast to any length
//! - **Select engine**: boolean and N-way (byte / int32 / enum) select,
//!   chunked and fanned out over rayon
//! - **Select node**: option pins derived from the index type, scalar and
//!   buffer evaluation through single-assignment futures
//! - **Metrics**: optional counters behind the `metrics` feature
//!
//! # Example
//!
//! ```ignore
//! use voxel_graph::{select_generic, PinType, VoxelBuffer};
//!
//! let condition = VoxelBuffer::from_elements(&[true, false, true]);
//! let on_false = VoxelBuffer::from_elements(&[1i32, 2, 3]);
//! let on_true = VoxelBuffer::constant(9i32);
//!
//! let output = select_generic(&PinType::of::<i32>(), &condition, &[&on_false, &on_true]);
//! assert_eq!(output.to_vec::<i32>(), Some(vec![9, 2, 9]));
//! ```

pub mod constants;
pub mod error;
pub mod metrics;

// Logical types and runtime values
pub mod pin_type;
pub mod value;
pub use pin_type::{EnumEntry, PinKind, PinType, StructType, TypeRegistry, VoxelEnum, VoxelPinValue};
pub use value::{ComplexValue, RuntimePinValue, VoxelStruct};

// Columnar buffers
pub mod buffer;
pub use buffer::{merge_num, TerminalBuffer, TypeSize, TypedBuffer, VoxelBuffer};

// Select engine
pub mod selector;
pub use selector::{select_generic, BufferSelector, SelectIndex, SelectorConfig};

pub use error::{BufferError, BufferResult, EvaluationError};

// Futures and cross-platform threading
pub mod future;
pub use future::{VoxelFuture, VoxelPromise};

pub mod threading;
pub use threading::TaskExecutor;

// Graph nodes
pub mod nodes;
pub use nodes::{PinValueMap, PinValueSource, Query, SelectNode};
