//! Time-domain descriptors over a grain's mono samples.
//!
//! All functions are total: degenerate input returns `0.0`.

/// Root mean square: `sqrt(mean(s²))`. `0.0` for an empty slice.
///
/// # Example
/// ```
/// use gs_audio::features::root_mean_square;
/// let rms = root_mean_square(&[-2.0, 5.0, -8.0, 9.0, -4.0]);
/// assert!((rms - 6.16).abs() < 0.01);
/// ```
#[must_use]
pub fn root_mean_square(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Largest signed sample value. `0.0` for an empty slice.
///
/// Not the absolute peak: an all-negative grain has a negative peak.
///
/// # Example
/// ```
/// use gs_audio::features::peak_energy;
/// assert_eq!(peak_energy(&[-2.0, 5.0, -8.0, 9.0, -4.0]), 9.0);
/// ```
#[must_use]
pub fn peak_energy(samples: &[f32]) -> f64 {
    samples
        .iter()
        .copied()
        .reduce(f32::max)
        .map_or(0.0, f64::from)
}

/// Count of adjacent pairs with one strictly negative and one strictly
/// positive sample. Pairs touching zero do not count. `0.0` below two samples.
///
/// # Example
/// ```
/// use gs_audio::features::zero_crossing_rate;
/// assert_eq!(zero_crossing_rate(&[-2.0, 5.0, -8.0, 9.0, -4.0]), 4.0);
/// ```
#[must_use]
pub fn zero_crossing_rate(samples: &[f32]) -> f64 {
    samples
        .windows(2)
        .filter(|pair| (pair[0] < 0.0 && pair[1] > 0.0) || (pair[0] > 0.0 && pair[1] < 0.0))
        .count() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: [f32; 5] = [-2.0, 5.0, -8.0, 9.0, -4.0];

    #[test]
    fn rms_edge_cases() {
        assert_eq!(root_mean_square(&[]), 0.0);
        assert_eq!(root_mean_square(&[1.0]), 1.0);
        assert!((root_mean_square(&RANGE) - 38.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(root_mean_square(&[0.0; 64]), 0.0);
    }

    #[test]
    fn peak_edge_cases() {
        assert_eq!(peak_energy(&[]), 0.0);
        assert_eq!(peak_energy(&[1.0]), 1.0);
        assert_eq!(peak_energy(&RANGE), 9.0);
    }

    #[test]
    fn peak_is_signed() {
        assert_eq!(peak_energy(&[-3.0, -1.5, -7.0]), -1.5);
    }

    #[test]
    fn zcr_edge_cases() {
        assert_eq!(zero_crossing_rate(&[]), 0.0);
        assert_eq!(zero_crossing_rate(&[1.0]), 0.0);
        assert_eq!(zero_crossing_rate(&RANGE), 4.0);
    }

    #[test]
    fn zcr_ignores_zero_touching_pairs() {
        assert_eq!(zero_crossing_rate(&[-1.0, 0.0, 1.0, 0.0, -1.0]), 0.0);
        assert_eq!(zero_crossing_rate(&[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(zero_crossing_rate(&[-1.0, 1.0]), 1.0);
    }
}
