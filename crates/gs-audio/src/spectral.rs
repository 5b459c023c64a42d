use crate::fft::FftPipeline;

/// Sum of magnitudes below which a spectrum is treated as silent.
const SILENCE: f64 = 1e-12;

/// Offset keeping `ln` finite for empty bins in the flatness measure.
const LOG_FLOOR: f64 = 1e-10;

/// Magnitude spectrum of one grain.
///
/// Built from a single Hann-windowed frame covering the whole grain (see
/// [`FftPipeline`]). Grains with fewer than two samples have an empty
/// spectrum, for which every descriptor is `0.0`.
///
/// # Example
/// ```
/// use gs_audio::spectral::Spectrum;
/// let spectrum = Spectrum::from_magnitudes(vec![0.0, 1.0, 0.0, 1.0]);
/// assert!((spectrum.centroid() - 2.0).abs() < 1e-12);
/// assert!((spectrum.rolloff(1.10) - 3.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spectrum {
    magnitudes: Vec<f64>,
}

impl Spectrum {
    /// Wrap precomputed magnitudes.
    #[must_use]
    pub fn from_magnitudes(magnitudes: Vec<f64>) -> Self {
        Self { magnitudes }
    }

    /// Spectrum of `samples`, planning a transform of `samples.len()` points.
    #[must_use]
    pub fn of(samples: &[f32]) -> Self {
        if samples.len() < 2 {
            return Self::default();
        }
        Self::with_pipeline(samples, &mut FftPipeline::new(samples.len()))
    }

    /// Spectrum of `samples` through an existing pipeline.
    ///
    /// The pipeline's size should equal `samples.len()`.
    #[must_use]
    pub fn with_pipeline(samples: &[f32], fft: &mut FftPipeline) -> Self {
        if samples.len() < 2 {
            return Self::default();
        }
        Self {
            magnitudes: fft.process(samples),
        }
    }

    /// Magnitude per bin.
    #[must_use]
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    fn total(&self) -> f64 {
        self.magnitudes.iter().sum()
    }

    fn is_silent(&self) -> bool {
        self.total() <= SILENCE
    }

    /// Magnitude-weighted mean bin index.
    #[must_use]
    pub fn centroid(&self) -> f64 {
        if self.is_silent() {
            return 0.0;
        }
        let weighted: f64 = self
            .magnitudes
            .iter()
            .enumerate()
            .map(|(k, &m)| k as f64 * m)
            .sum();
        weighted / self.total()
    }

    /// Geometric mean over arithmetic mean of the magnitudes, in `[0, 1]`.
    #[must_use]
    pub fn flatness(&self) -> f64 {
        if self.is_silent() {
            return 0.0;
        }
        let n = self.magnitudes.len() as f64;
        let log_sum: f64 = self.magnitudes.iter().map(|&m| (m + LOG_FLOOR).ln()).sum();
        let geo_mean = (log_sum / n).exp();
        let arith_mean = self.total() / n;
        (geo_mean / arith_mean).clamp(0.0, 1.0)
    }

    /// Largest magnitude over the RMS of the magnitudes.
    #[must_use]
    pub fn crest(&self) -> f64 {
        if self.is_silent() {
            return 0.0;
        }
        let n = self.magnitudes.len() as f64;
        let rms = (self.magnitudes.iter().map(|m| m * m).sum::<f64>() / n).sqrt();
        let max = self.magnitudes.iter().copied().fold(0.0, f64::max);
        max / rms
    }

    /// Lowest bin index at which the cumulative energy (`|X|²`) reaches
    /// `percentile` of the total.
    ///
    /// - `percentile <= 0` (or NaN): first bin with nonzero energy, 0 if none.
    /// - `percentile >= 1`: the top bin.
    ///
    /// Non-decreasing in `percentile`.
    #[must_use]
    pub fn rolloff(&self, percentile: f32) -> f64 {
        let Some(top) = self.magnitudes.len().checked_sub(1) else {
            return 0.0;
        };
        let percentile = f64::from(percentile);

        if percentile >= 1.0 {
            return top as f64;
        }

        if percentile.is_nan() || percentile <= 0.0 {
            return self
                .magnitudes
                .iter()
                .position(|&m| m * m > 0.0)
                .unwrap_or(0) as f64;
        }

        let total: f64 = self.magnitudes.iter().map(|m| m * m).sum();
        if total <= 0.0 {
            return 0.0;
        }

        let threshold = total * percentile;
        let mut cumulative = 0.0;
        for (k, &m) in self.magnitudes.iter().enumerate() {
            cumulative += m * m;
            if cumulative >= threshold {
                return k as f64;
            }
        }
        // Rounding kept the running sum just under the threshold.
        top as f64
    }

    /// Fourth standardized moment (`m4 / m2²`) of the magnitude values.
    ///
    /// Not excess kurtosis: a two-valued spectrum scores 1.
    #[must_use]
    pub fn kurtosis(&self) -> f64 {
        if self.is_silent() {
            return 0.0;
        }
        let n = self.magnitudes.len() as f64;
        let mean = self.total() / n;
        let (m2, m4) = self.magnitudes.iter().fold((0.0, 0.0), |(m2, m4), &m| {
            let d2 = (m - mean) * (m - mean);
            (m2 + d2, m4 + d2 * d2)
        });
        let (m2, m4) = (m2 / n, m4 / n);
        if m2 <= 0.0 {
            return 0.0;
        }
        m4 / (m2 * m2)
    }
}

/// Spectral centroid of `samples`, as a bin index. `0.0` below two samples.
///
/// # Example
/// ```
/// use gs_audio::spectral::spectral_centroid;
/// assert_eq!(spectral_centroid(&[]), 0.0);
/// assert_eq!(spectral_centroid(&[0.7]), 0.0);
/// ```
#[must_use]
pub fn spectral_centroid(samples: &[f32]) -> f64 {
    Spectrum::of(samples).centroid()
}

/// Spectral flatness of `samples`: near 1 for noise, near 0 for tones.
#[must_use]
pub fn spectral_flatness(samples: &[f32]) -> f64 {
    Spectrum::of(samples).flatness()
}

/// Spectral crest of `samples`: high for peaky spectra, low for flat ones.
#[must_use]
pub fn spectral_crest(samples: &[f32]) -> f64 {
    Spectrum::of(samples).crest()
}

/// Spectral rolloff bin of `samples` at `percentile` of total energy.
///
/// Out-of-range percentiles clamp to the boundary bins.
///
/// # Example
/// ```
/// use gs_audio::spectral::spectral_rolloff;
/// let samples: Vec<f32> = (0..64).map(|i| (i as f32 * 0.7).sin()).collect();
/// assert_eq!(spectral_rolloff(&samples, 1.10), spectral_rolloff(&samples, 1.0));
/// assert!(spectral_rolloff(&samples, 0.5) <= spectral_rolloff(&samples, 0.85));
/// ```
#[must_use]
pub fn spectral_rolloff(samples: &[f32], percentile: f32) -> f64 {
    Spectrum::of(samples).rolloff(percentile)
}

/// Spectral kurtosis of `samples`.
#[must_use]
pub fn spectral_kurtosis(samples: &[f32]) -> f64 {
    Spectrum::of(samples).kurtosis()
}
