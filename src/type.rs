use geo_traits::{CoordTrait, Dimensions};

/// A single indexed point.
///
/// This is `#[repr(C)]` and [`bytemuck::Pod`] so that slices of points can be reinterpreted
/// from interleaved `[x0, y0, x1, y1, ...]` coordinate buffers without copying.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The coordinate of this point along `axis`.
    #[inline]
    pub fn coord(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    #[inline]
    pub(crate) fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl CoordTrait for Point {
    type T = f32;

    fn dim(&self) -> Dimensions {
        Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.x
    }

    fn y(&self) -> Self::T {
        self.y
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.x,
            1 => self.y,
            _ => panic!("Invalid index of coord"),
        }
    }
}

/// The coordinate axis an inner node is split over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The axis used at the next level down when alternating.
    #[inline]
    pub fn next(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// The value stored in the packed `split_axis` field.
    #[inline]
    pub(crate) fn to_raw(self) -> u32 {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    #[inline]
    pub(crate) fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Axis::X),
            1 => Some(Axis::Y),
            _ => None,
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BoundingBox {
    /// A box containing nothing. Extending it by any point yields that point's box.
    pub const EMPTY: BoundingBox = BoundingBox {
        min_x: f32::INFINITY,
        max_x: f32::NEG_INFINITY,
        min_y: f32::INFINITY,
        max_y: f32::NEG_INFINITY,
    };

    /// The exact bounding box of `points`. Returns [`BoundingBox::EMPTY`] for an empty slice.
    pub fn from_points(points: &[Point]) -> Self {
        let mut bbox = Self::EMPTY;
        for point in points {
            bbox.extend(point);
        }
        bbox
    }

    #[inline]
    pub fn extend(&mut self, point: &Point) {
        if point.x < self.min_x {
            self.min_x = point.x
        };
        if point.x > self.max_x {
            self.max_x = point.x
        };
        if point.y < self.min_y {
            self.min_y = point.y
        };
        if point.y > self.max_y {
            self.max_y = point.y
        };
    }

    /// Width of the box along `axis`.
    #[inline]
    pub fn extent(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.max_x - self.min_x,
            Axis::Y => self.max_y - self.min_y,
        }
    }

    #[inline]
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// The smallest squared distance from `(qx, qy)` to any point inside this box.
    ///
    /// This is zero when the query lies inside the box.
    #[inline]
    pub fn min_sq_dist(&self, qx: f32, qy: f32) -> f32 {
        let dx = axis_dist(qx, self.min_x, self.max_x);
        let dy = axis_dist(qy, self.min_y, self.max_y);
        dx * dx + dy * dy
    }
}

/// 1D distance from a value to a range.
#[inline]
fn axis_dist(k: f32, min: f32, max: f32) -> f32 {
    if k < min {
        min - k
    } else if k <= max {
        0.0
    } else {
        k - max
    }
}

#[inline]
pub(crate) fn sq_dist(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bbox_from_points_is_tight() {
        let points = [
            Point::new(3., -1.),
            Point::new(-2., 4.),
            Point::new(0., 0.),
        ];
        let bbox = BoundingBox::from_points(&points);
        assert_eq!(
            bbox,
            BoundingBox {
                min_x: -2.,
                max_x: 3.,
                min_y: -1.,
                max_y: 4.,
            }
        );
        assert_eq!(bbox.extent(Axis::X), 5.);
        assert_eq!(bbox.extent(Axis::Y), 5.);
        assert!(points.iter().all(|p| bbox.contains(p)));
    }

    #[test]
    fn min_sq_dist_to_box() {
        let bbox = BoundingBox {
            min_x: 0.,
            max_x: 2.,
            min_y: 0.,
            max_y: 2.,
        };
        // inside
        assert_eq!(bbox.min_sq_dist(1., 1.), 0.);
        // on an edge
        assert_eq!(bbox.min_sq_dist(2., 1.), 0.);
        // beside an edge
        assert_eq!(bbox.min_sq_dist(5., 1.), 9.);
        // diagonal from a corner
        assert_eq!(bbox.min_sq_dist(-3., -4.), 25.);
    }

    #[test]
    fn axis_raw_values() {
        assert_eq!(Axis::from_raw(Axis::X.to_raw()), Some(Axis::X));
        assert_eq!(Axis::from_raw(Axis::Y.to_raw()), Some(Axis::Y));
        assert_eq!(Axis::from_raw(2), None);
        assert_eq!(Axis::X.next(), Axis::Y);
    }

    #[test]
    fn point_as_coord() {
        let p = Point::from((1.5, -2.5));
        assert_eq!(p.x(), 1.5);
        assert_eq!(p.nth_or_panic(1), -2.5);
        assert_eq!(p.coord(Axis::Y), -2.5);
    }
}
