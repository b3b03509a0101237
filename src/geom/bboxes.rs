use crate::geom::point::Point;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    /// Creates a box from two opposite corners (in any order).
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Box centered at `center` with full extents `size_x`, `size_y`, `size_z`.
    pub fn from_center(center: Point, size_x: f64, size_y: f64, size_z: f64) -> Self {
        let h = Point::new(size_x / 2.0, size_y / 2.0, size_z / 2.0);
        Self::new(
            Point::new(center.x - h.x, center.y - h.y, center.z - h.z),
            Point::new(center.x + h.x, center.y + h.y, center.z + h.z),
        )
    }

    /// Smallest box holding all `pts`, or `None` when `pts` is empty.
    pub fn from_points(pts: &[Point]) -> Option<Self> {
        let (first, rest) = pts.split_first()?;
        let mut bbox = Self::new(*first, *first);
        for p in rest {
            bbox.min = Point::new(bbox.min.x.min(p.x), bbox.min.y.min(p.y), bbox.min.z.min(p.z));
            bbox.max = Point::new(bbox.max.x.max(p.x), bbox.max.y.max(p.y), bbox.max.z.max(p.z));
        }
        Some(bbox)
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Returns true if `min <= max` on every axis.
    pub fn is_valid(&self) -> bool {
        self.is_finite()
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.z <= self.max.z
    }

    pub fn center(&self) -> Point {
        Point::midpoint(self.min, self.max)
    }

    /// Grows the box by `dz` below and above.
    pub fn with_vertical_tolerance(&self, dz: f64) -> Self {
        Self {
            min: Point::new(self.min.x, self.min.y, self.min.z - dz),
            max: Point::new(self.max.x, self.max.y, self.max.z + dz),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Returns true if the boxes overlap (including touching).
    pub fn overlaps(&self, other: &Self) -> bool {
        are_bboxes_overlapping(self.min, self.max, other.min, other.max)
    }
}

/// Checks whether two bounding boxes overlap.
///
/// Takes min and max corners of each bbox.
/// Returns true if boxes overlap (including touching).
pub fn are_bboxes_overlapping(min1: Point, max1: Point, min2: Point, max2: Point) -> bool {
    // Boxes don't overlap if separated along any axis
    if max1.x < min2.x || min1.x > max2.x {
        return false;
    }
    if max1.y < min2.y || min1.y > max2.y {
        return false;
    }
    if max1.z < min2.z || min1.z > max2.z {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let pts = [
            Point::new(1., 5., 0.),
            Point::new(-1., 2., 3.),
            Point::new(0., 0., -2.),
        ];
        let bbox = BoundingBox::from_points(&pts).unwrap();
        assert!(bbox.min.is_close(&Point::new(-1., 0., -2.)));
        assert!(bbox.max.is_close(&Point::new(1., 5., 3.)));
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_overlap() {
        let a = BoundingBox::from_center(Point::origin(), 2., 2., 2.);
        let b = BoundingBox::from_center(Point::new(1.5, 0., 0.), 1., 1., 1.);
        let c = BoundingBox::from_center(Point::new(5., 0., 0.), 1., 1., 1.);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        // Touching counts as overlap
        let d = BoundingBox::from_center(Point::new(2., 0., 0.), 2., 2., 2.);
        assert!(a.overlaps(&d));
    }

    #[test]
    fn test_validity_and_tolerance() {
        let inverted = BoundingBox {
            min: Point::new(1., 0., 0.),
            max: Point::new(0., 1., 1.),
        };
        assert!(!inverted.is_valid());
        let flat = BoundingBox::new(Point::origin(), Point::new(1., 1., 0.));
        assert!(flat.is_valid());
        let grown = flat.with_vertical_tolerance(0.02);
        assert!(grown.contains(Point::new(0.5, 0.5, 0.015)));
        assert!(!flat.contains(Point::new(0.5, 0.5, 0.015)));
    }
}
