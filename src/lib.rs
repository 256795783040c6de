#![doc = include_str!("../README.md")]

mod error;
pub mod input;
pub mod kdtree;
mod r#type;

pub use error::{PackedTreeError, Result};
pub use r#type::{Axis, BoundingBox, Point};
