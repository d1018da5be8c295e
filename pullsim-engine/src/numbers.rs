//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Ceil a f64 and clamp it to the u64 range, returning 0 for NaN or negative values.
#[must_use]
pub fn ceil_f64_to_u64(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u64, f64>(u64::MAX).unwrap_or(f64::MAX);
    let clamped = value.min(max).ceil();
    cast::<f64, u64>(clamped).unwrap_or(u64::MAX)
}

/// Ceil a f64 and clamp it to the u32 range, returning 0 for NaN or negative values.
#[must_use]
pub fn ceil_f64_to_u32(value: f64) -> u32 {
    u32::try_from(ceil_f64_to_u64(value)).unwrap_or(u32::MAX)
}

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(f64::MAX)
}

/// Convert a draw count to a histogram slot index.
#[must_use]
pub fn u64_to_index(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Convert a histogram slot index back to a draw count.
#[must_use]
pub fn index_to_u64(index: usize) -> u64 {
    u64::try_from(index).unwrap_or(u64::MAX)
}
