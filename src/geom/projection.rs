use crate::Point;
use crate::Vector;

/// Orthonormal frame of a planar surface.
///
/// `u` runs along the width (eave) direction, `v` along the height (up-slope)
/// direction and `normal` points away from the surface with `normal.dz >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneBasis {
    pub origin: Point,
    pub u: Vector,
    pub v: Vector,
    pub normal: Vector,
}

impl PlaneBasis {
    /// Creates a `PlaneBasis` from two edge vectors sharing `origin`.
    ///
    /// `u` is the normalized width edge, `v` is the part of the height edge
    /// orthogonal to `u`. Returns `None` if the edges are degenerate or parallel.
    pub fn from_edges(origin: Point, width_edge: Vector, height_edge: Vector) -> Option<Self> {
        let u = width_edge.normalize().ok()?;
        let v = (height_edge - u * height_edge.dot(&u)).normalize().ok()?;
        let mut normal = u.cross(&v).normalize().ok()?;
        if normal.dz < 0.0 {
            normal = -normal;
        }

        Some(Self {
            origin,
            u,
            v,
            normal,
        })
    }

    /// Creates a `PlaneBasis` from an origin point and a normal vector.
    ///
    /// The in-plane axes are chosen so that `u` is horizontal whenever the
    /// plane is not itself horizontal.
    pub fn from_normal(origin: Point, normal: Vector) -> Option<Self> {
        let n = normal.normalize().ok()?;
        // Horizontal planes have no horizontal direction to follow; use +X
        let u = match Vector::up().cross(&n).normalize() {
            Ok(u) => u,
            Err(_) => Vector::new(0.0, 1.0, 0.0).cross(&n).normalize().ok()?,
        };
        let v = n.cross(&u).normalize().ok()?;

        Some(Self {
            origin,
            u,
            v,
            normal: n,
        })
    }

    /// Projects a 3D point onto the 2D plane, returning (u, v) coordinates.
    pub fn project(&self, p: Point) -> (f64, f64) {
        let r = p - self.origin;
        (r.dot(&self.u), r.dot(&self.v))
    }

    /// Signed distance of a point from the plane along the normal.
    pub fn elevation(&self, p: Point) -> f64 {
        (p - self.origin).dot(&self.normal)
    }

    /// Unprojects 2D (u, v) coordinates back to a 3D point on the plane.
    pub fn unproject(&self, x: f64, y: f64) -> Point {
        self.origin + self.u * x + self.v * y
    }

    /// Slope of the plane from horizontal, in degrees.
    pub fn slope_degrees(&self) -> f64 {
        self.normal.dz.clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Compass azimuth (clockwise from north, +Y) the plane faces.
    ///
    /// Horizontal planes have no facing direction and return `None`.
    pub fn facing_azimuth(&self) -> Option<f64> {
        let h = self.normal.horizontal();
        if h.length() < 1e-9 {
            return None;
        }
        Some(h.dx.atan2(h.dy).to_degrees().rem_euclid(360.0))
    }
}
