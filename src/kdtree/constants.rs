//! Tags and sizes of the packed node layout.

use std::mem::size_of;

use crate::kdtree::node::{InnerNode, LeafNode};

/// Tag byte preceding every leaf payload.
pub const LEAF_TAG: u8 = b'l';

/// Tag byte preceding every inner payload.
pub const INNER_TAG: u8 = b'i';

/// Encoded size of a leaf: tag byte plus payload.
pub const LEAF_NODE_SIZE: usize = 1 + size_of::<LeafNode>();

/// Encoded size of an inner node: tag byte plus payload.
pub const INNER_NODE_SIZE: usize = 1 + size_of::<InnerNode>();

/// The exact encoded length of a tree over `num_items` points.
///
/// Every point becomes one leaf and a binary tree with `n` leaves has `n - 1` inner nodes, so
/// the length only depends on the number of points and not on their layout.
pub fn packed_byte_length(num_items: usize) -> Option<usize> {
    if num_items == 0 {
        return None;
    }
    let leaves = num_items.checked_mul(LEAF_NODE_SIZE)?;
    let inners = (num_items - 1).checked_mul(INNER_NODE_SIZE)?;
    leaves.checked_add(inners)
}

/// The deepest leaf a median split can produce over `num_items` points, `ceil(log2(n))`.
///
/// Each split leaves at most `ceil(n / 2)` points on either side.
pub(crate) fn max_depth(num_items: usize) -> usize {
    if num_items <= 1 {
        return 0;
    }
    (usize::BITS - (num_items - 1).leading_zeros()) as usize
}

/// The inverse of [`packed_byte_length`]: the number of points encoded in a buffer of
/// `byte_length` bytes, if that length is possible at all.
pub(crate) fn num_items_for_byte_length(byte_length: usize) -> Option<usize> {
    let stride = LEAF_NODE_SIZE + INNER_NODE_SIZE;
    let padded = byte_length.checked_add(INNER_NODE_SIZE)?;
    if byte_length == 0 || padded % stride != 0 {
        return None;
    }
    Some(padded / stride)
}
