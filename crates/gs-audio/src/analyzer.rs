use std::collections::HashMap;

use gs_core::feature::Feature;
use gs_core::grain::Grain;
use rayon::prelude::*;

use crate::features::{peak_energy, root_mean_square, zero_crossing_rate};
use crate::fft::FftPipeline;
use crate::spectral::Spectrum;

/// Compute one feature over `samples`.
///
/// `rolloff_percentile` is only read for [`Feature::SpectralRolloff`].
///
/// # Example
/// ```
/// use gs_audio::analyzer::extract;
/// use gs_core::feature::Feature;
/// assert_eq!(extract(Feature::ZeroCrossingRate, &[-2.0, 5.0, -8.0, 9.0, -4.0], 0.85), 4.0);
/// ```
#[must_use]
pub fn extract(feature: Feature, samples: &[f32], rolloff_percentile: f32) -> f64 {
    match feature {
        Feature::Rms => root_mean_square(samples),
        Feature::PeakEnergy => peak_energy(samples),
        Feature::ZeroCrossingRate => zero_crossing_rate(samples),
        spectral => spectral_value(spectral, &Spectrum::of(samples), rolloff_percentile),
    }
}

fn spectral_value(feature: Feature, spectrum: &Spectrum, rolloff_percentile: f32) -> f64 {
    match feature {
        Feature::SpectralCentroid => spectrum.centroid(),
        Feature::SpectralFlatness => spectrum.flatness(),
        Feature::SpectralCrest => spectrum.crest(),
        Feature::SpectralRolloff => spectrum.rolloff(rolloff_percentile),
        Feature::SpectralKurtosis => spectrum.kurtosis(),
        Feature::Rms | Feature::PeakEnergy | Feature::ZeroCrossingRate => 0.0,
    }
}

/// Annotates grains with feature values.
///
/// Keeps one [`FftPipeline`] per grain length seen, so a sequence of
/// equal-length grains plans its transform once. A grain's spectrum is
/// computed at most once per [`annotate`](Self::annotate) call, whatever the
/// number of spectral features requested.
///
/// # Example
/// ```
/// use gs_audio::analyzer::GrainAnalyzer;
/// use gs_core::feature::Feature;
/// use gs_core::grain::Grain;
///
/// let mut grain = Grain::new(0, 0, vec![0.5, -0.5, 0.5, -0.5], 4);
/// let mut analyzer = GrainAnalyzer::new(0.85);
/// analyzer.annotate(&mut grain, &[Feature::Rms, Feature::ZeroCrossingRate]);
/// assert_eq!(grain.feature(Feature::Rms), Some(0.5));
/// assert_eq!(grain.feature(Feature::ZeroCrossingRate), Some(3.0));
/// assert_eq!(grain.feature(Feature::SpectralCrest), None);
/// ```
pub struct GrainAnalyzer {
    rolloff_percentile: f32,
    pipelines: HashMap<usize, FftPipeline>,
}

impl GrainAnalyzer {
    /// Create an analyzer using `rolloff_percentile` for spectral rolloff.
    #[must_use]
    pub fn new(rolloff_percentile: f32) -> Self {
        Self {
            rolloff_percentile,
            pipelines: HashMap::new(),
        }
    }

    /// Rolloff percentile in use.
    #[must_use]
    pub fn rolloff_percentile(&self) -> f32 {
        self.rolloff_percentile
    }

    /// Spectrum of `samples`, reusing a cached pipeline of matching size.
    pub fn spectrum(&mut self, samples: &[f32]) -> Spectrum {
        if samples.len() < 2 {
            return Spectrum::default();
        }
        let fft = self
            .pipelines
            .entry(samples.len())
            .or_insert_with(|| FftPipeline::new(samples.len()));
        Spectrum::with_pipeline(samples, fft)
    }

    /// Compute `features` over `grain`'s samples and store them in its map.
    pub fn annotate(&mut self, grain: &mut Grain, features: &[Feature]) {
        let spectrum = if features.iter().any(|f| f.is_spectral()) {
            Some(self.spectrum(grain.samples()))
        } else {
            None
        };

        for &feature in features {
            let value = match (&spectrum, feature.is_spectral()) {
                (Some(spectrum), true) => spectral_value(feature, spectrum, self.rolloff_percentile),
                _ => extract(feature, grain.samples(), self.rolloff_percentile),
            };
            grain.set_feature(feature, value);
        }
    }

    /// Annotate every grain in parallel.
    ///
    /// Grains share nothing: each rayon worker gets its own analyzer (and
    /// FFT cache), and each grain is written by exactly one worker.
    pub fn analyze_all(grains: &mut [Grain], features: &[Feature], rolloff_percentile: f32) {
        grains.par_iter_mut().for_each_init(
            || GrainAnalyzer::new(rolloff_percentile),
            |analyzer, grain| analyzer.annotate(grain, features),
        );

        log::info!(
            "Analyzed {} grains × {} features (rolloff {})",
            grains.len(),
            features.len(),
            rolloff_percentile
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_grain(index: usize, len: usize) -> Grain {
        let samples = (0..len)
            .map(|i| ((i * (index + 3)) % 17) as f32 / 8.5 - 1.0)
            .collect();
        Grain::new(index, index * len, samples, len)
    }

    #[test]
    fn annotate_matches_free_functions_bit_for_bit() {
        let mut grain = test_grain(2, 441);
        let mut analyzer = GrainAnalyzer::new(0.85);
        analyzer.annotate(&mut grain, &Feature::ALL);
        for feature in Feature::ALL {
            let direct = extract(feature, grain.samples(), 0.85);
            assert_eq!(
                grain.feature(feature).map(f64::to_bits),
                Some(direct.to_bits()),
                "{feature}"
            );
        }
    }

    #[test]
    fn annotate_is_idempotent() {
        let mut grain = test_grain(1, 300);
        let mut analyzer = GrainAnalyzer::new(0.5);
        analyzer.annotate(&mut grain, &Feature::ALL);
        let first = grain.features().clone();
        analyzer.annotate(&mut grain, &Feature::ALL);
        assert_eq!(grain.features(), &first);
    }

    #[test]
    fn only_requested_features_are_set() {
        let mut grain = test_grain(0, 64);
        GrainAnalyzer::new(0.85).annotate(&mut grain, &[Feature::SpectralRolloff]);
        assert_eq!(grain.features().len(), 1);
        assert!(grain.feature(Feature::SpectralRolloff).is_some());
        assert_eq!(grain.feature(Feature::Rms), None);
    }

    #[test]
    fn rolloff_uses_configured_percentile() {
        let grain = test_grain(4, 256);
        let mut low = grain.clone();
        let mut high = grain;
        GrainAnalyzer::new(0.1).annotate(&mut low, &[Feature::SpectralRolloff]);
        GrainAnalyzer::new(1.1).annotate(&mut high, &[Feature::SpectralRolloff]);
        assert_eq!(high.feature(Feature::SpectralRolloff), Some(128.0));
        assert!(low.feature(Feature::SpectralRolloff) <= high.feature(Feature::SpectralRolloff));
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut parallel: Vec<Grain> = (0..32).map(|i| test_grain(i, 200)).collect();
        let mut sequential = parallel.clone();

        GrainAnalyzer::analyze_all(&mut parallel, &Feature::ALL, 0.85);
        let mut analyzer = GrainAnalyzer::new(0.85);
        for grain in &mut sequential {
            analyzer.annotate(grain, &Feature::ALL);
        }

        for (p, s) in parallel.iter().zip(&sequential) {
            assert_eq!(p.features(), s.features());
        }
    }

    #[test]
    fn pipeline_cache_handles_mixed_lengths() {
        let mut analyzer = GrainAnalyzer::new(0.85);
        let mut short = test_grain(0, 50);
        let mut long = test_grain(1, 400);
        analyzer.annotate(&mut long, &[Feature::SpectralCentroid]);
        analyzer.annotate(&mut short, &[Feature::SpectralCentroid]);
        assert_eq!(
            short.feature(Feature::SpectralCentroid),
            Some(extract(Feature::SpectralCentroid, short.samples(), 0.85))
        );
        assert_eq!(analyzer.pipelines.len(), 2);
    }
}
