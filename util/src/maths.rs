//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Limit `value` to the range `[min, max]`.
///
/// NaN values are passed through unchanged.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5f64, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-0.5f64, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.3f64, 0.0, 1.0), 0.3);
        assert_eq!(clamp(-2f32, -1.0, 1.0), -1.0);
        assert!(clamp(f64::NAN, 0.0, 1.0).is_nan());
    }
}
