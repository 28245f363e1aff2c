//! Numeric conversion helpers centralizing lossy casts.

use num_traits::cast::cast;

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Clamp a f64 to the f32 range and downcast, returning 0.0 for non-finite values.
#[must_use]
pub fn clamp_f64_to_f32(value: f64) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let min = cast::<f32, f64>(f32::MIN).unwrap_or(f64::MIN);
    let max = cast::<f32, f64>(f32::MAX).unwrap_or(f64::MAX);
    cast::<f64, f32>(value.clamp(min, max)).unwrap_or(0.0)
}

/// `numerator / denominator` as f32, or 0.0 when the denominator is zero.
#[must_use]
pub fn ratio_f32(numerator: u64, denominator: u64) -> f32 {
    if denominator == 0 {
        return 0.0;
    }
    clamp_f64_to_f32(u64_to_f64(numerator) / u64_to_f64(denominator))
}

/// Round a f64 and clamp it to the u32 range, returning 0 for NaN and negatives.
#[must_use]
pub fn round_f64_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    cast::<f64, u32>(value.clamp(0.0, max).round()).unwrap_or(0)
}

/// Truncate a f64 to u64, returning 0 for NaN and negatives and saturating at `u64::MAX`.
#[must_use]
pub fn f64_to_u64(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    cast::<f64, u64>(value.trunc()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_handles_zero_denominator() {
        assert!((ratio_f32(1, 0) - 0.0).abs() < f32::EPSILON);
        assert!((ratio_f32(1, 4) - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn rounders_clamp_ranges() {
        assert_eq!(round_f64_to_u32(1.6), 2);
        assert_eq!(round_f64_to_u32(-3.0), 0);
        assert_eq!(round_f64_to_u32(f64::NAN), 0);
        assert_eq!(round_f64_to_u32(f64::from(u32::MAX) * 2.0), u32::MAX);
    }

    #[test]
    fn f64_to_u64_truncates_and_saturates() {
        assert_eq!(f64_to_u64(1_700_000_000_123.9), 1_700_000_000_123);
        assert_eq!(f64_to_u64(-5.0), 0);
        assert_eq!(f64_to_u64(f64::NAN), 0);
        assert_eq!(f64_to_u64(f64::NEG_INFINITY), 0);
        assert_eq!(f64_to_u64(f64::INFINITY), u64::MAX);
        assert_eq!(f64_to_u64(1e30), u64::MAX);
    }

    #[test]
    fn clamp_handles_non_finite() {
        assert!((clamp_f64_to_f32(f64::INFINITY) - 0.0).abs() < f32::EPSILON);
        assert!((clamp_f64_to_f32(f64::from(f32::MAX) * 2.0) - f32::MAX).abs() < f32::EPSILON);
    }
}
