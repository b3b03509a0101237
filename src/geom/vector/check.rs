use super::*;

/// Checks if three vectors are unit length and mutually orthogonal within `tol`.
pub fn is_orthonormal_frame(a: &Vector, b: &Vector, c: &Vector, tol: f64) -> bool {
    let unit = |v: &Vector| (v.length() - 1.0).abs() < tol;
    unit(a)
        && unit(b)
        && unit(c)
        && a.dot(b).abs() < tol
        && a.dot(c).abs() < tol
        && b.dot(c).abs() < tol
}
