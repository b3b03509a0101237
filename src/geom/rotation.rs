use crate::Point;
use crate::Vector;
use crate::geom::IsClose;
use anyhow::{Result, ensure};
use ndarray as nd;

/// Calculate rotation matrix for a unit vector `u` and angle `phi` (radians).
///
/// Uses the Rodrigues form `R = I + sin(phi) W + 2 sin^2(phi/2) W^2`, where `W`
/// is the cross-product matrix of `u`.
/// https://en.wikipedia.org/wiki/Rodrigues%27_rotation_formula
pub fn rotation_matrix(u: &Vector, phi: f64) -> Result<nd::Array2<f64>> {
    ensure!(
        (u.length() - 1.0).abs() < 1e-9,
        "rotation_matrix() requires a unit axis, got {u}"
    );

    let w: nd::Array2<f64> = nd::arr2(&[[0., -u.dz, u.dy], [u.dz, 0., -u.dx], [-u.dy, u.dx, 0.]]);

    Ok(nd::Array::eye(3) + phi.sin() * &w + (2. * (phi / 2.).sin().powi(2)) * w.dot(&w))
}

/// Rotate points (as row vectors) using the transposed rotation matrix `rot_t`.
pub fn rotate_points(pts: &[Point], rot_t: &nd::ArrayView2<f64>) -> Vec<Point> {
    let rows = nd::Array2::from_shape_fn((pts.len(), 3), |(i, j)| match j {
        0 => pts[i].x,
        1 => pts[i].y,
        _ => pts[i].z,
    });

    rows.dot(rot_t)
        .rows()
        .into_iter()
        .map(|r| Point::new(r[0], r[1], r[2]))
        .collect()
}

/// Rotate points around the axis `u` passing through the origin by `phi` radians.
pub fn rotate_points_around_vector(pts: &[Point], u: &Vector, phi: f64) -> Result<Vec<Point>> {
    if u.length().is_close(0.) || phi.abs().is_close(0.) {
        // No need to rotate
        return Ok(pts.to_vec());
    }
    let axis = u.normalize()?;
    let rot = rotation_matrix(&axis, phi)?;

    Ok(rotate_points(pts, &rot.t()))
}

/// Rotates a single direction vector around the axis `u` by `phi` radians.
pub fn rotate_vector(v: &Vector, u: &Vector, phi: f64) -> Result<Vector> {
    let rotated = rotate_points_around_vector(&[Point::origin() + *v], u, phi)?;
    Ok(Vector::from_a_point(rotated[0]))
}
