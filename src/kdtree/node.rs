//! The packed node layout shared by the builder (writer) and queries (reader).
//!
//! A packed tree is a sequence of nodes with no padding between them. Every node is a single
//! tag byte followed by a fixed-size payload:
//!
//! ```notest
//! leaf:  [LEAF_TAG ][LeafNode ]
//! inner: [INNER_TAG][InnerNode][left subtree ...][right subtree ...]
//! ```
//!
//! The left child of an inner node starts immediately after the inner payload. The right child
//! starts at `node_offset + right_child_offset`, so the buffer holds no absolute positions and
//! can be copied or moved freely.
//!
//! Payloads start one byte after their tag and are therefore unaligned; they are always read
//! and written by value through [`bytemuck`] in native byte order.

use bytemuck::{bytes_of, pod_read_unaligned, Pod, Zeroable};

use crate::error::{PackedTreeError, Result};
use crate::kdtree::constants::{INNER_NODE_SIZE, INNER_TAG, LEAF_NODE_SIZE, LEAF_TAG};
use crate::r#type::{Axis, BoundingBox, Point};

/// The payload of a leaf: one indexed point plus a correlation output slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LeafNode {
    /// x coordinate of the point
    pub x: f32,
    /// y coordinate of the point
    pub y: f32,
    /// Scratch output slot. Zero after building, written by
    /// [`PackedTree::correlate_all`][crate::kdtree::PackedTree::correlate_all].
    pub corr: i32,
}

impl LeafNode {
    pub(crate) fn new(point: &Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            corr: 0,
        }
    }

    /// The indexed point.
    #[inline]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The payload of an inner node.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InnerNode {
    split_axis: u32,
    split_loc: f32,
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
    right_child: u32,
}

impl InnerNode {
    pub(crate) fn new(
        split_axis: Axis,
        split_loc: f32,
        bbox: &BoundingBox,
        right_child_offset: u32,
    ) -> Self {
        Self {
            split_axis: split_axis.to_raw(),
            split_loc,
            min_x: bbox.min_x,
            max_x: bbox.max_x,
            min_y: bbox.min_y,
            max_y: bbox.max_y,
            right_child: right_child_offset,
        }
    }

    /// The axis the two children are split over.
    #[inline]
    pub fn split_axis(&self) -> Axis {
        // Decoding rejects any other raw value.
        if self.split_axis == 0 {
            Axis::X
        } else {
            Axis::Y
        }
    }

    /// Every point of the left subtree is `<=` this value on [`split_axis`][Self::split_axis],
    /// every point of the right subtree is `>=` it.
    #[inline]
    pub fn split_loc(&self) -> f32 {
        self.split_loc
    }

    /// The exact bounding box of every point below this node.
    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x,
            max_x: self.max_x,
            min_y: self.min_y,
            max_y: self.max_y,
        }
    }

    /// Byte distance from the start of this node (its tag byte) to the start of its right
    /// child.
    #[inline]
    pub fn right_child_offset(&self) -> usize {
        self.right_child as usize
    }

    #[inline]
    pub(crate) fn min_sq_dist(&self, qx: f32, qy: f32) -> f32 {
        self.bounding_box().min_sq_dist(qx, qy)
    }
}

/// A decoded node of a packed tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// A single point
    Leaf(LeafNode),
    /// A split with two children
    Inner(InnerNode),
}

impl Node {
    /// Decode the node starting at `offset`, checking the tag, the payload bounds and, for
    /// inner nodes, the split axis and right child offset.
    pub fn decode(buf: &[u8], offset: usize) -> Result<Self> {
        let tag = *buf.get(offset).ok_or_else(|| {
            PackedTreeError::MalformedTree(format!(
                "Node offset {} is past the end of a {} byte buffer.",
                offset,
                buf.len()
            ))
        })?;

        match tag {
            LEAF_TAG => {
                let payload = payload(buf, offset, LEAF_NODE_SIZE)?;
                Ok(Node::Leaf(pod_read_unaligned(payload)))
            }
            INNER_TAG => {
                let payload = payload(buf, offset, INNER_NODE_SIZE)?;
                let inner: InnerNode = pod_read_unaligned(payload);
                if Axis::from_raw(inner.split_axis).is_none() {
                    return Err(PackedTreeError::MalformedTree(format!(
                        "Inner node at {} has split axis {}.",
                        offset, inner.split_axis
                    )));
                }
                // The right child can never start inside the left child's first node.
                let right = inner.right_child_offset();
                if right < INNER_NODE_SIZE + LEAF_NODE_SIZE
                    || offset.saturating_add(right) >= buf.len()
                {
                    return Err(PackedTreeError::MalformedTree(format!(
                        "Inner node at {} has right child offset {} in a {} byte buffer.",
                        offset,
                        right,
                        buf.len()
                    )));
                }
                Ok(Node::Inner(inner))
            }
            t => Err(PackedTreeError::MalformedTree(format!(
                "Unexpected tag {:#04x} at offset {}.",
                t, offset
            ))),
        }
    }

    /// Decode a node of a tree that is known to be well formed.
    ///
    /// Panics if `offset` is out of bounds.
    #[inline]
    pub(crate) fn decode_trusted(buf: &[u8], offset: usize) -> Self {
        if buf[offset] == LEAF_TAG {
            Node::Leaf(pod_read_unaligned(&buf[offset + 1..offset + LEAF_NODE_SIZE]))
        } else {
            debug_assert_eq!(buf[offset], INNER_TAG);
            Node::Inner(pod_read_unaligned(
                &buf[offset + 1..offset + INNER_NODE_SIZE],
            ))
        }
    }

    /// The encoded size of this node, not counting its children.
    #[inline]
    pub fn encoded_size(&self) -> usize {
        match self {
            Node::Leaf(_) => LEAF_NODE_SIZE,
            Node::Inner(_) => INNER_NODE_SIZE,
        }
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }
}

fn payload(buf: &[u8], offset: usize, node_size: usize) -> Result<&[u8]> {
    buf.get(offset + 1..offset + node_size).ok_or_else(|| {
        PackedTreeError::MalformedTree(format!(
            "Node at {} needs {} bytes but the buffer ends at {}.",
            offset,
            node_size,
            buf.len()
        ))
    })
}

/// Encode a leaf at `offset`, returning the offset just past it.
#[inline]
pub(crate) fn write_leaf(buf: &mut [u8], offset: usize, leaf: &LeafNode) -> usize {
    let end = offset + LEAF_NODE_SIZE;
    buf[offset] = LEAF_TAG;
    buf[offset + 1..end].copy_from_slice(bytes_of(leaf));
    end
}

/// Encode an inner node at `offset`, returning the offset of its left child.
#[inline]
pub(crate) fn write_inner(buf: &mut [u8], offset: usize, inner: &InnerNode) -> usize {
    let end = offset + INNER_NODE_SIZE;
    buf[offset] = INNER_TAG;
    buf[offset + 1..end].copy_from_slice(bytes_of(inner));
    end
}

/// Overwrite the `corr` slot of the leaf at `offset` in place.
#[inline]
pub(crate) fn write_leaf_corr(buf: &mut [u8], offset: usize, corr: i32) {
    debug_assert_eq!(buf[offset], LEAF_TAG);
    // `corr` follows the two coordinates
    let start = offset + 1 + 2 * std::mem::size_of::<f32>();
    buf[start..start + std::mem::size_of::<i32>()].copy_from_slice(bytes_of(&corr));
}
