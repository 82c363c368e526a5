/// Tolerance used when comparing values for equality (colors, points, vectors).
pub const EPSILON: f64 = 1e-5;

/// Anything smaller than this in absolute value is treated as exactly zero
/// by the geometry code.
const ZERO_THRESHOLD: f64 = 1e-10;

pub fn equal(a: f64, b: f64) -> bool {
    let c = a - b;
    c.abs() < EPSILON
}

pub fn is_zero(value: f64) -> bool {
    value.abs() < ZERO_THRESHOLD
}

/// Snaps values that are numerically indistinguishable from zero to 0.0,
/// so that sign tests on them are stable.
pub fn align_zero(value: f64) -> f64 {
    if is_zero(value) {
        0.
    } else {
        value
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn two_floats_equal() {
        let a = 1.0;
        let b = 1.00000001;
        assert!(equal(a, b));
    }

    #[test]
    fn tiny_values_are_zero() {
        assert!(is_zero(1e-12));
        assert!(is_zero(-1e-12));
        assert!(!is_zero(1e-6));
    }

    #[test]
    fn align_zero_snaps_only_tiny_values() {
        assert_eq!(align_zero(-1e-13), 0.);
        assert_eq!(align_zero(0.25), 0.25);
        assert_eq!(align_zero(-3.), -3.);
    }
}
