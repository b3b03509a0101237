pub mod bboxes;
pub mod point;
pub mod projection;
pub mod rotation;
pub mod segment;
pub mod vector;

/// Geometric precision
pub const EPS: f64 = 1e-10;

/// Approximate equality for scalars.
pub trait IsClose {
    fn is_close(&self, other: f64) -> bool;
}

impl IsClose for f64 {
    fn is_close(&self, other: f64) -> bool {
        (self - other).abs() < EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_close_f64() {
        assert!(1.0_f64.is_close(1.0 + 1e-12));
        assert!(!1.0_f64.is_close(1.001));
    }
}
