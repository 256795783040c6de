//! Axis selection and median partitioning for building packed trees.

use std::cmp;

use crate::r#type::{Axis, BoundingBox, Point};

/// Everything a [`SplitPolicy`] may look at when choosing the axis for one inner node.
#[derive(Debug, Clone, Copy)]
pub struct SplitParams {
    /// Depth of the node being built. The root is at depth 0.
    pub depth: usize,
    /// Exact bounding box of the points under the node.
    pub bbox: BoundingBox,
}

/// Strategy for choosing the axis an inner node is split over.
///
/// The chosen axis is recorded in the node, so any policy yields a correct tree; the policy
/// only affects how well queries prune.
pub trait SplitPolicy {
    /// The axis to split a node with the given parameters over.
    fn split_axis(params: &SplitParams) -> Axis;
}

/// Split over `x` at even depths and over `y` at odd depths.
#[derive(Debug, Clone, Copy)]
pub struct AlternatingAxis;

impl SplitPolicy for AlternatingAxis {
    #[inline]
    fn split_axis(params: &SplitParams) -> Axis {
        if params.depth % 2 == 0 {
            Axis::X
        } else {
            Axis::Y
        }
    }
}

/// Split over whichever axis the node's points spread furthest along. Ties go to `x`.
#[derive(Debug, Clone, Copy)]
pub struct WidestSpread;

impl SplitPolicy for WidestSpread {
    #[inline]
    fn split_axis(params: &SplitParams) -> Axis {
        if params.bbox.extent(Axis::Y) > params.bbox.extent(Axis::X) {
            Axis::Y
        } else {
            Axis::X
        }
    }
}

/// Reorder `points` around their median on `axis`.
///
/// Returns `(mid, split_loc)` such that every point in `points[..mid]` is `<= split_loc` and
/// every point in `points[mid..]` is `>= split_loc` on `axis`. Both halves are non-empty and
/// differ in size by at most one. Points equal to `split_loc` may end up on either side, which
/// also covers the case where all points share the same coordinate.
///
/// `points` must hold at least two points.
pub(crate) fn partition(points: &mut [Point], axis: Axis) -> (usize, f32) {
    debug_assert!(points.len() >= 2);
    let mid = points.len() / 2;
    select(points, mid, 0, points.len() - 1, axis);
    (mid, points[mid].coord(axis))
}

/// Custom Floyd-Rivest selection algorithm: sort points so that [left..k-1] items are smaller
/// than or equal to the k-th item, and [k+1..right] items are larger or equal (on either x or y
/// axis).
fn select(points: &mut [Point], k: usize, mut left: usize, mut right: usize, axis: Axis) {
    while right > left {
        if right - left > 600 {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = f64::ln(n);
            let s = 0.5 * f64::exp((2.0 * z) / 3.0);
            let sd = 0.5
                * f64::sqrt((z * s * (n - s)) / n)
                * (if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 });
            let new_left = cmp::max(left, f64::floor(k as f64 - (m * s) / n + sd) as usize);
            let new_right = cmp::min(
                right,
                f64::floor(k as f64 + ((n - m) * s) / n + sd) as usize,
            );
            select(points, k, new_left, new_right, axis);
        }

        let t = points[k].coord(axis);
        let mut i = left;
        let mut j = right;

        points.swap(left, k);
        if points[right].coord(axis) > t {
            points.swap(left, right);
        }

        while i < j {
            points.swap(i, j);
            i += 1;
            j -= 1;
            while points[i].coord(axis) < t {
                i += 1;
            }
            while points[j].coord(axis) > t {
                j -= 1;
            }
        }

        if points[left].coord(axis) == t {
            points.swap(left, j);
        } else {
            j += 1;
            points.swap(j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            right = j - 1;
        }
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn check_partition(points: &mut [Point], axis: Axis) {
        let n = points.len();
        let (mid, split_loc) = partition(points, axis);
        assert_eq!(mid, n / 2);
        assert!(mid > 0 && mid < n, "both halves are non-empty");
        assert!(points[..mid].iter().all(|p| p.coord(axis) <= split_loc));
        assert!(points[mid..].iter().all(|p| p.coord(axis) >= split_loc));
    }

    #[test]
    fn partitions_two_points() {
        let mut points = vec![Point::new(5., 0.), Point::new(1., 0.)];
        check_partition(&mut points, Axis::X);
        assert_eq!(points[0], Point::new(1., 0.));
    }

    #[test]
    fn partitions_all_equal_coordinates() {
        let mut points: Vec<Point> = (0..9).map(|i| Point::new(3., i as f32)).collect();
        check_partition(&mut points, Axis::X);
    }

    #[test]
    fn partitions_random_points_on_both_axes() {
        let mut rng = StdRng::seed_from_u64(17);
        for n in [2, 3, 10, 101, 1000, 2500] {
            let mut points: Vec<Point> = (0..n)
                .map(|_| Point::new(rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)))
                .collect();
            check_partition(&mut points, Axis::X);
            check_partition(&mut points, Axis::Y);
        }
    }

    #[test]
    fn partitions_many_duplicates() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut points: Vec<Point> = (0..1500)
            .map(|_| Point::new(rng.gen_range(0..4) as f32, rng.gen_range(0..4) as f32))
            .collect();
        check_partition(&mut points, Axis::Y);
    }

    #[test]
    fn widest_spread_picks_longer_side() {
        let params = |min_x, max_x, min_y, max_y| SplitParams {
            depth: 0,
            bbox: BoundingBox {
                min_x,
                max_x,
                min_y,
                max_y,
            },
        };
        assert_eq!(WidestSpread::split_axis(&params(0., 1., 0., 5.)), Axis::Y);
        assert_eq!(WidestSpread::split_axis(&params(0., 5., 0., 1.)), Axis::X);
        assert_eq!(WidestSpread::split_axis(&params(0., 1., 0., 1.)), Axis::X);
    }

    #[test]
    fn alternating_follows_depth() {
        let params = |depth| SplitParams {
            depth,
            bbox: BoundingBox::EMPTY,
        };
        assert_eq!(AlternatingAxis::split_axis(&params(0)), Axis::X);
        assert_eq!(AlternatingAxis::split_axis(&params(1)), Axis::Y);
        assert_eq!(AlternatingAxis::split_axis(&params(4)), Axis::X);
    }
}
