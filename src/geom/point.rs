use crate::Vector;
use crate::geom::EPS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Point in world space, meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::new(0., 0., 0.)
    }

    /// Returns true if both points are very close to each other.
    pub fn is_close(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < EPS
            && (self.y - other.y).abs() < EPS
            && (self.z - other.z).abs() < EPS
    }

    /// Returns true if every coordinate differs by less than `tol`.
    pub fn is_within(&self, other: &Self, tol: f64) -> bool {
        (self.x - other.x).abs() < tol
            && (self.y - other.y).abs() < tol
            && (self.z - other.z).abs() < tol
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Multiplies all coordinates by a scalar and returns a copy.
    pub fn scale(&self, scale: f64) -> Self {
        Self {
            x: self.x * scale,
            y: self.y * scale,
            z: self.z * scale,
        }
    }

    /// Creates a new point along the edge pt1->pt2 with some relative distance from pt1.
    pub fn new_between_2_points(pt1: Self, pt2: Self, rel_d: f64) -> Self {
        pt1 + (pt2 - pt1) * rel_d
    }

    pub fn midpoint(pt1: Self, pt2: Self) -> Self {
        Self::new_between_2_points(pt1, pt2, 0.5)
    }

    /// Euclidean distance.
    pub fn distance(&self, other: &Self) -> f64 {
        (*other - *self).length()
    }

    /// Distance measured in the XY plane only.
    pub fn horizontal_distance(&self, other: &Self) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2); // Default 2 decimals
        write!(
            f,
            "Point({:.prec$}, {:.prec$}, {:.prec$})",
            self.x,
            self.y,
            self.z,
            prec = prec
        )
    }
}

// Point + Vector
impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, other: Vector) -> Self {
        Self {
            x: self.x + other.dx,
            y: self.y + other.dy,
            z: self.z + other.dz,
        }
    }
}

// Point - Vector
impl Sub<Vector> for Point {
    type Output = Point;
    fn sub(self, other: Vector) -> Self {
        Self {
            x: self.x - other.dx,
            y: self.y - other.dy,
            z: self.z - other.dz,
        }
    }
}

// Point - Point
impl Sub for Point {
    type Output = Vector;
    fn sub(self, other: Self) -> Vector {
        Vector::from_points(other, self)
    }
}
