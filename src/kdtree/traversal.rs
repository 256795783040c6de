//! Utilities to traverse the packed tree structure.

use tinyvec::TinyVec;

use crate::kdtree::constants::INNER_NODE_SIZE;
use crate::kdtree::node::{LeafNode, Node};
use crate::r#type::BoundingBox;

/// A node in a packed tree, together with its position.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    /// The buffer that this node is a reference onto
    buffer: &'a [u8],

    /// Byte offset of this node's tag
    offset: usize,

    /// Distance from the root, which has depth 0
    depth: usize,

    node: Node,
}

impl<'a> NodeRef<'a> {
    fn new(buffer: &'a [u8], offset: usize, depth: usize) -> Self {
        Self {
            buffer,
            offset,
            depth,
            node: Node::decode_trusted(buffer, offset),
        }
    }

    pub(crate) fn from_root(buffer: &'a [u8]) -> Self {
        Self::new(buffer, 0, 0)
    }

    /// The decoded node.
    pub fn node(&self) -> Node {
        self.node
    }

    /// Byte offset of this node inside the packed buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Distance from the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The bounding box of all points below this node. For a leaf this is the degenerate box of
    /// its own point.
    pub fn bounding_box(&self) -> BoundingBox {
        match &self.node {
            Node::Leaf(leaf) => BoundingBox {
                min_x: leaf.x,
                max_x: leaf.x,
                min_y: leaf.y,
                max_y: leaf.y,
            },
            Node::Inner(inner) => inner.bounding_box(),
        }
    }

    /// The child holding points `<=` the split location, or `None` for a leaf.
    pub fn left_child(&self) -> Option<NodeRef<'a>> {
        match self.node {
            Node::Leaf(_) => None,
            Node::Inner(_) => Some(Self::new(
                self.buffer,
                self.offset + INNER_NODE_SIZE,
                self.depth + 1,
            )),
        }
    }

    /// The child holding points `>=` the split location, or `None` for a leaf.
    pub fn right_child(&self) -> Option<NodeRef<'a>> {
        match self.node {
            Node::Leaf(_) => None,
            Node::Inner(inner) => Some(Self::new(
                self.buffer,
                self.offset + inner.right_child_offset(),
                self.depth + 1,
            )),
        }
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        self.node.is_parent()
    }
}

/// Depth-first iterator over the nodes of a packed tree.
///
/// Nodes come out in pre-order with left children first, which is exactly buffer order.
#[derive(Debug, Clone)]
pub struct Nodes<'a> {
    buffer: &'a [u8],
    // (offset, depth) of nodes still to visit
    stack: TinyVec<[(usize, usize); 33]>,
}

impl<'a> Nodes<'a> {
    pub(crate) fn new(buffer: &'a [u8]) -> Self {
        let mut stack = TinyVec::new();
        stack.push((0, 0));
        Self { buffer, stack }
    }
}

impl<'a> Iterator for Nodes<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (offset, depth) = self.stack.pop()?;
        let node = NodeRef::new(self.buffer, offset, depth);
        if let Node::Inner(inner) = node.node {
            // pushed in backwards order to what gets popped
            self.stack
                .push((offset + inner.right_child_offset(), depth + 1));
            self.stack.push((offset + INNER_NODE_SIZE, depth + 1));
        }
        Some(node)
    }
}

/// Iterator over the leaves of a packed tree, in buffer order.
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    nodes: Nodes<'a>,
}

impl<'a> Leaves<'a> {
    pub(crate) fn new(buffer: &'a [u8]) -> Self {
        Self {
            nodes: Nodes::new(buffer),
        }
    }
}

impl Iterator for Leaves<'_> {
    type Item = LeafNode;

    fn next(&mut self) -> Option<Self::Item> {
        self.nodes.find_map(|node| match node.node {
            Node::Leaf(leaf) => Some(leaf),
            Node::Inner(_) => None,
        })
    }
}
