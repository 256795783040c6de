use tinyvec::TinyVec;

use crate::error::{PackedTreeError, Result};
use crate::kdtree::builder::build;
use crate::kdtree::constants::{
    max_depth, num_items_for_byte_length, INNER_NODE_SIZE, LEAF_NODE_SIZE,
};
use crate::kdtree::node::{write_leaf_corr, Node};
use crate::kdtree::r#trait::{correlate_at, PackedTreeIndex};
use crate::kdtree::split::AlternatingAxis;
use crate::r#type::Point;

/// Common metadata to describe a packed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeMetadata {
    pub(crate) num_items: usize,
    pub(crate) depth: usize,
}

impl TreeMetadata {
    /// Validate the structure of a packed buffer and collect its metadata.
    ///
    /// This checks that the length matches a whole number of points, that every node has a
    /// valid tag and split axis, and that every right child offset lands exactly after the left
    /// subtree and inside the parent's byte range, and that no leaf is deeper than a median split
    /// over that many points allows. It does not check coordinate values, so a
    /// buffer with wrong bounding boxes can be queried but may return wrong counts.
    pub fn try_new(data: &[u8]) -> Result<Self> {
        let num_items = num_items_for_byte_length(data.len()).ok_or_else(|| {
            PackedTreeError::MalformedTree(format!(
                "Incorrect buffer length {}: not the length of any packed tree.",
                data.len()
            ))
        })?;
        let depth_limit = max_depth(num_items);

        // (start, end, depth) of each subtree still to check
        let mut stack: TinyVec<[(usize, usize, usize); 33]> = TinyVec::new();
        stack.push((0, data.len(), 0));

        let mut leaves = 0;
        let mut depth = 0;
        while let Some((start, end, node_depth)) = stack.pop() {
            if node_depth > depth_limit {
                return Err(PackedTreeError::MalformedTree(format!(
                    "Node at {} is at depth {}, deeper than {} for {} points.",
                    start, node_depth, depth_limit, num_items
                )));
            }
            match Node::decode(data, start)? {
                Node::Leaf(_) => {
                    if start + LEAF_NODE_SIZE != end {
                        return Err(PackedTreeError::MalformedTree(format!(
                            "Leaf at {} does not end its subtree at {}.",
                            start, end
                        )));
                    }
                    leaves += 1;
                    depth = depth.max(node_depth);
                }
                Node::Inner(inner) => {
                    let right_start = start + inner.right_child_offset();
                    if right_start + LEAF_NODE_SIZE > end {
                        return Err(PackedTreeError::MalformedTree(format!(
                            "Inner node at {} points past its subtree end {}.",
                            start, end
                        )));
                    }
                    stack.push((right_start, end, node_depth + 1));
                    stack.push((start + INNER_NODE_SIZE, right_start, node_depth + 1));
                }
            }
        }

        if leaves != num_items {
            return Err(PackedTreeError::MalformedTree(format!(
                "Found {} leaves when expected {}.",
                leaves, num_items
            )));
        }

        tracing::debug!(num_items, depth, "Validated packed kd-tree buffer");
        Ok(Self { num_items, depth })
    }

    /// The number of points in the tree.
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// The depth of the deepest leaf. A tree with a single point has depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// An owned packed tree buffer.
///
/// Usually this will be created from scratch via
/// [`PackedTreeBuilder`][crate::kdtree::PackedTreeBuilder] or [`PackedTree::from_points`].
#[derive(Debug, Clone, PartialEq)]
pub struct PackedTree {
    pub(crate) buffer: Vec<u8>,
    pub(crate) metadata: TreeMetadata,
}

impl PackedTree {
    /// Build a tree over `points` using the [`AlternatingAxis`] split policy.
    pub fn from_points(points: &[Point]) -> Result<Self> {
        let mut points = points.to_vec();
        build::<AlternatingAxis>(&mut points)
    }

    /// Take ownership of an existing packed buffer, validating it first.
    pub fn try_new(buffer: Vec<u8>) -> Result<Self> {
        let metadata = TreeMetadata::try_new(&buffer)?;
        Ok(Self { buffer, metadata })
    }

    /// Consume the tree, returning the packed buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Borrow this tree as a [`PackedTreeRef`].
    pub fn as_tree_ref(&self) -> PackedTreeRef<'_> {
        PackedTreeRef {
            buffer: &self.buffer,
            metadata: self.metadata,
        }
    }

    /// Count, for every indexed point, the indexed points within `radius` of it.
    ///
    /// Each count is stored in the `corr` slot of that point's leaf, which includes the point
    /// itself. Returns the sum of all counts, i.e. the number of ordered pairs within `radius`.
    /// Counting queries never read `corr`, so this does not change what
    /// [`correlate`][PackedTreeIndex::correlate] returns.
    pub fn correlate_all(&mut self, radius: f32) -> u64 {
        let leaf_offsets: Vec<(usize, Point)> = self
            .nodes()
            .filter_map(|node| match node.node() {
                Node::Leaf(leaf) => Some((node.offset(), leaf.point())),
                Node::Inner(_) => None,
            })
            .collect();

        let mut total = 0;
        for (offset, point) in leaf_offsets {
            let count = if radius >= 0.0 {
                correlate_at(&self.buffer, 0, point.x, point.y, radius * radius)
            } else {
                0
            };
            write_leaf_corr(&mut self.buffer, offset, i32::try_from(count).unwrap_or(i32::MAX));
            total += count as u64;
        }

        tracing::trace!(radius, total, "Correlated every indexed point");
        total
    }

    /// Zero the `corr` slot of every leaf.
    pub fn reset_correlations(&mut self) {
        let leaf_offsets: Vec<usize> = self
            .nodes()
            .filter(|node| node.node().is_leaf())
            .map(|node| node.offset())
            .collect();
        for offset in leaf_offsets {
            write_leaf_corr(&mut self.buffer, offset, 0);
        }
    }
}

impl AsRef<[u8]> for PackedTree {
    fn as_ref(&self) -> &[u8] {
        &self.buffer
    }
}

/// A reference on an external packed tree buffer.
///
/// Usually this will be created from a [`PackedTree`] via its
/// [`as_tree_ref`][PackedTree::as_tree_ref] method, but it can also be created from any existing
/// data buffer, for example one copied out of another process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackedTreeRef<'a> {
    pub(crate) buffer: &'a [u8],
    pub(crate) metadata: TreeMetadata,
}

impl<'a> PackedTreeRef<'a> {
    /// Validate `data` as a packed tree and borrow it.
    pub fn try_new<T: AsRef<[u8]> + ?Sized>(data: &'a T) -> Result<Self> {
        let buffer = data.as_ref();
        let metadata = TreeMetadata::try_new(buffer)?;
        Ok(Self { buffer, metadata })
    }
}
