//! Saturating vector summation.
//!
//! Pure arithmetic, no I/O. Sums clamp at the signed 32-bit boundary
//! instead of wrapping, and stop accumulating once saturated.

/// Sum a vector of signed 32-bit integers with saturating semantics.
///
/// The accumulator is 64-bit; as soon as it leaves the `i32` range the
/// result is clamped to the nearest bound and the remaining elements are
/// ignored. An empty slice sums to 0.
pub fn saturating_sum(values: &[i32]) -> i32 {
    let mut acc: i64 = 0;

    for &value in values {
        acc += i64::from(value);

        if acc > i64::from(i32::MAX) {
            return i32::MAX;
        }
        if acc < i64::from(i32::MIN) {
            return i32::MIN;
        }
    }

    acc as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_vector() {
        assert_eq!(saturating_sum(&[]), 0);
    }

    #[test]
    fn test_simple_sum() {
        assert_eq!(saturating_sum(&[1, 2, 3]), 6);
        assert_eq!(saturating_sum(&[8000, 10000, 12000, 12000]), 42000);
        assert_eq!(saturating_sum(&[-5, 5]), 0);
    }

    #[test]
    fn test_saturates_high() {
        assert_eq!(saturating_sum(&[i32::MAX, 1]), i32::MAX);
        assert_eq!(saturating_sum(&[1, i32::MAX]), i32::MAX);
        assert_eq!(saturating_sum(&[i32::MAX, i32::MAX, i32::MAX]), i32::MAX);
    }

    #[test]
    fn test_saturates_low() {
        assert_eq!(saturating_sum(&[i32::MIN, -1]), i32::MIN);
        assert_eq!(saturating_sum(&[-1, i32::MIN]), i32::MIN);
    }

    #[test]
    fn test_stops_after_saturation() {
        // Once saturated, later elements must not pull the sum back in range.
        assert_eq!(saturating_sum(&[i32::MAX, 1, i32::MIN]), i32::MAX);
        assert_eq!(saturating_sum(&[i32::MIN, -1, i32::MAX]), i32::MIN);
    }

    #[test]
    fn test_exact_bounds_are_representable() {
        assert_eq!(saturating_sum(&[i32::MAX]), i32::MAX);
        assert_eq!(saturating_sum(&[i32::MIN]), i32::MIN);
        assert_eq!(saturating_sum(&[i32::MAX, -1, 1]), i32::MAX);
    }

}
