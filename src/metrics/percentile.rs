//! Order statistics and rounding helpers shared by the planner and the startup model.

/// Slack for comparisons of derived floating point quantities, e.g. `ceil(3.0000000000000004)`.
pub const FLOAT_TOLERANCE: f64 = 1e-9;

/// Returns the `p`-th percentile (0..=100) of `values` using linear interpolation between the
/// closest ranks, or None for empty input.
///
/// Values are ordered with a stable sort, so equal values keep their original (timestamp) order
/// and the result is reproducible for identical input.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(percentile_of_sorted(&sorted, p))
}

/// Same as `percentile` for already sorted non-empty input.
pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    let rank = p.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Ceiling which ignores floating point noise right above an integer.
pub fn ceil_tolerant(value: f64) -> f64 {
    (value - FLOAT_TOLERANCE).ceil()
}

/// Rounds up to `digits` decimal places, e.g. millicores for `digits = 3`.
pub fn round_up(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    ceil_tolerant(value * scale) / scale
}

/// True if `usage` exceeds `capacity` by more than floating point noise.
pub fn exceeds(usage: f64, capacity: f64) -> bool {
    usage - capacity > FLOAT_TOLERANCE * capacity.abs().max(1.0)
}

#[cfg(test)]
mod tests {
    use crate::metrics::percentile::{ceil_tolerant, exceeds, percentile, round_up};

    #[test]
    fn test_percentile_interpolates_between_ranks() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(Some(1.0), percentile(&values, 0.0));
        assert_eq!(Some(2.5), percentile(&values, 50.0));
        assert_eq!(Some(4.0), percentile(&values, 100.0));
        assert_eq!(Some(1.3), percentile(&values, 10.0).map(|v| (v * 10.0).round() / 10.0));
    }

    #[test]
    fn test_percentile_of_empty_and_single_value() {
        assert_eq!(None, percentile(&[], 95.0));
        assert_eq!(Some(7.0), percentile(&[7.0], 95.0));
    }

    #[test]
    fn test_percentile_is_monotonic() {
        let values = [0.5, 0.7, 4.0, 0.1, 2.2, 0.5, 0.9];
        let mut previous = f64::MIN;
        for p in 0..=100 {
            let current = percentile(&values, p as f64).unwrap();
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_rounding_ignores_noise() {
        assert_eq!(3.0, ceil_tolerant(0.1 * 30.0));
        assert_eq!(4.0, ceil_tolerant(3.01));
        assert_eq!(0.3, round_up(0.1 * 3.0, 3));
        assert_eq!(0.334, round_up(1.0 / 3.0, 3));
        assert_eq!(11.0, ceil_tolerant(10.0 * 1.1));
    }

    #[test]
    fn test_exceeds() {
        assert!(exceeds(4.0, 1.0));
        assert!(!exceeds(1.0, 1.0));
        assert!(!exceeds(0.1 + 0.2, 0.3));
    }
}
