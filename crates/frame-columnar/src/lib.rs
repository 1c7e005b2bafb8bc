//! Typed, nullable, immutable columns for the frame engine.
//!
//! This crate focuses on:
//! - A closed set of physical column types backed by shared value buffers plus an optional
//!   validity bitmap.
//! - Builders for every column kind and equal-length tables over them.
//! - Null-aware row traversal shared by the expression interpreter and the statistics reducers.
//! - The error type used across the workspace.

#![forbid(unsafe_code)]

mod bitmap;
mod builder;
mod column;
mod error;
mod iterate;
mod table;
mod types;

#[cfg(feature = "arrow")]
pub mod arrow;

pub use crate::bitmap::BitVec;
pub use crate::builder::{BooleanBuilder, PrimitiveBuilder, StringBuilder};
pub use crate::column::{Buffer, Chunk, ChunkValues, Column, Utf8Values};
pub use crate::error::{try_filled_vec, try_vec_with_capacity, ErrorKind, FrameError, FrameResult};
pub use crate::iterate::{
    iterate, iterate_booleans, iterate_pairs_f64, iterate_strings, iterate_validity,
    numeric_as_f64,
};
pub use crate::table::{ColumnSchema, Table};
pub use crate::types::{DataType, NativeType, Value};
