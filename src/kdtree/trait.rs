use std::fmt::Write;

use geo_traits::CoordTrait;
use tinyvec::TinyVec;

use crate::kdtree::constants::INNER_NODE_SIZE;
use crate::kdtree::index::{PackedTree, PackedTreeRef, TreeMetadata};
use crate::kdtree::node::Node;
use crate::kdtree::traversal::{Leaves, NodeRef, Nodes};
use crate::r#type::{sq_dist, BoundingBox, Point};

/// A trait for searching and accessing data out of a packed tree.
pub trait PackedTreeIndex: Sized {
    /// The underlying packed buffer of this tree
    fn buffer(&self) -> &[u8];

    /// Access the metadata describing this tree
    fn metadata(&self) -> &TreeMetadata;

    /// The number of points in this tree
    fn num_items(&self) -> usize {
        self.metadata().num_items()
    }

    /// The depth of the deepest leaf of this tree
    fn depth(&self) -> usize {
        self.metadata().depth()
    }

    /// Count the indexed points within a given radius.
    ///
    /// - qx: x value of query point
    /// - qy: y value of query point
    /// - radius: maximum Euclidean distance, inclusive
    ///
    /// A negative or NaN radius matches nothing.
    fn correlate(&self, qx: f32, qy: f32, radius: f32) -> u32 {
        if radius.is_nan() || radius < 0.0 {
            return 0;
        }
        correlate_at(self.buffer(), 0, qx, qy, radius * radius)
    }

    /// Count the indexed points within a given radius of `point`.
    fn correlate_point(&self, point: &Point, radius: f32) -> u32 {
        self.correlate(point.x, point.y, radius)
    }

    /// Count the indexed points within a given radius of `coord`.
    fn correlate_coord(&self, coord: &impl CoordTrait<T = f32>, radius: f32) -> u32 {
        self.correlate(coord.x(), coord.y(), radius)
    }

    /// The exact bounding box of every indexed point.
    fn bounding_box(&self) -> BoundingBox {
        self.root().bounding_box()
    }

    /// Access the root node of the tree for manual traversal.
    fn root(&self) -> NodeRef<'_> {
        NodeRef::from_root(self.buffer())
    }

    /// Depth-first, left-to-right iterator over every node in buffer order.
    fn nodes(&self) -> Nodes<'_> {
        Nodes::new(self.buffer())
    }

    /// Iterator over every leaf in buffer order.
    fn leaves(&self) -> Leaves<'_> {
        Leaves::new(self.buffer())
    }

    /// Render the tree as text, one node per line, indented by depth.
    fn dump(&self) -> String {
        let mut out = String::new();
        for node in self.nodes() {
            let indent = node.depth() * 2;
            // Writing to a String cannot fail
            let _ = match node.node() {
                Node::Leaf(leaf) => writeln!(
                    out,
                    "{:indent$}leaf @{} ({}, {}) corr={}",
                    "",
                    node.offset(),
                    leaf.x,
                    leaf.y,
                    leaf.corr
                ),
                Node::Inner(inner) => {
                    let bbox = inner.bounding_box();
                    writeln!(
                        out,
                        "{:indent$}inner @{} axis={:?} split={} x=[{}, {}] y=[{}, {}] right=+{}",
                        "",
                        node.offset(),
                        inner.split_axis(),
                        inner.split_loc(),
                        bbox.min_x,
                        bbox.max_x,
                        bbox.min_y,
                        bbox.max_y,
                        inner.right_child_offset()
                    )
                }
            };
        }
        out
    }
}

impl PackedTreeIndex for PackedTree {
    fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    fn metadata(&self) -> &TreeMetadata {
        &self.metadata
    }
}

impl PackedTreeIndex for PackedTreeRef<'_> {
    fn buffer(&self) -> &[u8] {
        self.buffer
    }

    fn metadata(&self) -> &TreeMetadata {
        &self.metadata
    }
}

/// Count the points within `sqrt(r2)` of `(qx, qy)` in the subtree at `root`.
pub(crate) fn correlate_at(buffer: &[u8], root: usize, qx: f32, qy: f32, r2: f32) -> u32 {
    // Use TinyVec to avoid heap allocations
    let mut stack: TinyVec<[usize; 33]> = TinyVec::new();
    stack.push(root);

    let mut count = 0;
    while let Some(offset) = stack.pop() {
        match Node::decode_trusted(buffer, offset) {
            Node::Leaf(leaf) => {
                if sq_dist(leaf.x, leaf.y, qx, qy) <= r2 {
                    count += 1;
                }
            }
            Node::Inner(inner) => {
                // nothing under this node can be closer than its bounding box
                if inner.min_sq_dist(qx, qy) > r2 {
                    continue;
                }
                stack.push(offset + inner.right_child_offset());
                stack.push(offset + INNER_NODE_SIZE);
            }
        }
    }
    count
}
