//! An implementation of a static, pointer-free packed k-d tree for radius correlation counts.

#![warn(missing_docs)]

mod builder;
pub mod constants;
mod index;
mod node;
mod split;
mod r#trait;
mod traversal;

pub use builder::PackedTreeBuilder;
pub use index::{PackedTree, PackedTreeRef, TreeMetadata};
pub use node::{InnerNode, LeafNode, Node};
pub use r#trait::PackedTreeIndex;
pub use split::{AlternatingAxis, SplitParams, SplitPolicy, WidestSpread};
pub use traversal::{Leaves, NodeRef, Nodes};
