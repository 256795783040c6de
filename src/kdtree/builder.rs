use geo_traits::CoordTrait;

use crate::error::{PackedTreeError, Result};
use crate::kdtree::constants::{packed_byte_length, INNER_NODE_SIZE};
use crate::kdtree::index::TreeMetadata;
use crate::kdtree::node::{write_inner, write_leaf, InnerNode, LeafNode};
use crate::kdtree::split::{partition, SplitParams, SplitPolicy};
use crate::kdtree::PackedTree;
use crate::r#type::{BoundingBox, Point};

/// A builder to create a [`PackedTree`].
///
/// ```
/// use packed_kdtree::kdtree::{AlternatingAxis, PackedTreeBuilder, PackedTreeIndex};
///
/// let mut builder = PackedTreeBuilder::new(3);
/// builder.add(0., 0.);
/// builder.add(1., 0.);
/// builder.add(4., 4.);
/// let tree = builder.finish::<AlternatingAxis>().unwrap();
/// assert_eq!(tree.correlate(0., 0., 1.), 2);
/// ```
#[derive(Debug, Clone)]
pub struct PackedTreeBuilder {
    points: Vec<Point>,
    num_items: u32,
}

impl PackedTreeBuilder {
    /// Create a new builder expecting exactly `num_items` points.
    pub fn new(num_items: u32) -> Self {
        Self {
            points: Vec::with_capacity(num_items as usize),
            num_items,
        }
    }

    /// The number of points this builder expects.
    pub fn num_items(&self) -> u32 {
        self.num_items
    }

    /// Add a point to the index.
    ///
    /// This returns the insertion index of the point.
    #[inline]
    pub fn add(&mut self, x: f32, y: f32) -> u32 {
        debug_assert!(
            self.points.len() < u32::MAX as usize,
            "Cannot add more than u32::MAX points."
        );
        let index = self.points.len() as u32;
        self.points.push(Point { x, y });
        index
    }

    /// Add a point to the index.
    ///
    /// This returns the insertion index of the point.
    #[inline]
    pub fn add_coord(&mut self, coord: &impl CoordTrait<T = f32>) -> u32 {
        self.add(coord.x(), coord.y())
    }

    /// Add every point of `points` to the index, in order.
    pub fn add_points(&mut self, points: impl IntoIterator<Item = Point>) {
        self.points.extend(points);
    }

    /// Consume this builder, partitioning the points and packing the tree.
    ///
    /// [`AlternatingAxis`] and [`WidestSpread`] both implement [`SplitPolicy`], allowing you to
    /// choose how split axes are picked.
    ///
    /// Fails with [`PackedTreeError::InvalidInput`] if no points were added, if the number of
    /// added points differs from the number declared in [`new`][Self::new], or if any coordinate
    /// is not finite. Fails with [`PackedTreeError::AllocationFailure`] if the packed buffer
    /// cannot be allocated.
    ///
    /// [`AlternatingAxis`]: crate::kdtree::AlternatingAxis
    /// [`WidestSpread`]: crate::kdtree::WidestSpread
    pub fn finish<P: SplitPolicy>(mut self) -> Result<PackedTree> {
        let num_items = self.points.len();
        if num_items != self.num_items as usize {
            return Err(PackedTreeError::InvalidInput(format!(
                "Added {} items when expected {}.",
                num_items, self.num_items
            )));
        }
        build::<P>(&mut self.points)
    }
}

/// Build a packed tree over `points`, reordering them in place.
pub(crate) fn build<P: SplitPolicy>(points: &mut [Point]) -> Result<PackedTree> {
    let num_items = points.len();
    if num_items == 0 {
        return Err(PackedTreeError::InvalidInput(
            "Cannot build a tree over zero points.".to_string(),
        ));
    }
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(PackedTreeError::InvalidInput(format!(
            "Point {} has non-finite coordinates ({}, {}).",
            i, points[i].x, points[i].y
        )));
    }

    let byte_length = checked_byte_length(num_items)?;
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(byte_length)?;
    buffer.resize(byte_length, 0);

    let mut depth = 0;
    let end = build_node::<P>(&mut buffer, points, 0, 0, &mut depth);
    debug_assert_eq!(end, byte_length);

    tracing::debug!(
        num_items,
        byte_length,
        depth,
        policy = std::any::type_name::<P>(),
        "Built packed kd-tree"
    );

    Ok(PackedTree {
        buffer,
        metadata: TreeMetadata { num_items, depth },
    })
}

/// The encoded length of a tree over `num_items` points, if it can be addressed with the `u32`
/// right child offsets.
pub(crate) fn checked_byte_length(num_items: usize) -> Result<usize> {
    packed_byte_length(num_items)
        .filter(|len| *len <= u32::MAX as usize)
        .ok_or_else(|| {
            PackedTreeError::AllocationFailure(format!(
                "A packed tree over {} points does not fit in a u32 addressed buffer.",
                num_items
            ))
        })
}

/// Recursively encode the subtree over `points` starting at `offset`, returning the offset
/// just past its last byte.
fn build_node<P: SplitPolicy>(
    buffer: &mut [u8],
    points: &mut [Point],
    offset: usize,
    depth: usize,
    max_depth: &mut usize,
) -> usize {
    if points.len() == 1 {
        *max_depth = (*max_depth).max(depth);
        return write_leaf(buffer, offset, &LeafNode::new(&points[0]));
    }

    let bbox = BoundingBox::from_points(points);
    let axis = P::split_axis(&SplitParams { depth, bbox });

    // sort points around the middle index so that the halves lie either left/right or
    // top/bottom of the split location
    let (mid, split_loc) = partition(points, axis);
    let (left, right) = points.split_at_mut(mid);

    // The inner payload stays zeroed until the left subtree is written and the right child's
    // position is known.
    let right_start = build_node::<P>(buffer, left, offset + INNER_NODE_SIZE, depth + 1, max_depth);
    let inner = InnerNode::new(axis, split_loc, &bbox, (right_start - offset) as u32);
    write_inner(buffer, offset, &inner);

    build_node::<P>(buffer, right, right_start, depth + 1, max_depth)
}
