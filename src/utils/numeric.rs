//! Shared numeric reductions for the encode and decode paths
//!
//! Both pipeline halves reduce a whole buffer before transforming it: the
//! encoder scans for the maximum byte, the decoder scans for the min/max
//! float pair. Keeping the reductions here keeps them pure and testable.

/// Maximum byte value of a buffer, or 0 for an empty buffer.
#[must_use]
pub fn max_byte(buffer: &[u8]) -> u8 {
    buffer.iter().copied().max().unwrap_or(0)
}

/// Minimum and maximum of a float slice, ignoring NaN values.
///
/// Returns `None` for an empty slice or a slice of only NaNs.
#[must_use]
pub fn min_max(values: &[f32]) -> Option<(f32, f32)> {
    let mut result: Option<(f32, f32)> = None;
    for &v in values {
        if v.is_nan() {
            continue;
        }
        result = Some(match result {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        });
    }
    result
}

/// Map a unit-interval value to a byte, clamping first so floating-point
/// overshoot can never leave the 0-255 domain.
#[must_use]
pub fn unit_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
