use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

/// FFT pipeline: Hann-windowed real FFT using realfft.
///
/// Pre-allocates the FFT plan and scratch buffers so that repeated grains of
/// the same length reuse them. One frame covers the whole input; there is no
/// hop or overlap.
///
/// # Example
/// ```
/// use gs_audio::fft::FftPipeline;
/// let fft = FftPipeline::new(4410);
/// assert_eq!(fft.bin_count(), 2206);
/// ```
pub struct FftPipeline {
    fft_size: usize,
    input_buf: Vec<f64>,
    spectrum_buf: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
    plan: Arc<dyn RealToComplex<f64>>,
    /// Hann window coefficients.
    window: Vec<f64>,
}

impl FftPipeline {
    /// Create a new FFT pipeline with the given window size.
    ///
    /// # Panics
    /// Panics if `size` is 0.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "FFT size must be > 0");

        let mut planner = RealFftPlanner::<f64>::new();
        let plan = planner.plan_fft_forward(size);

        let input_buf = plan.make_input_vec();
        let spectrum_buf = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();

        Self {
            fft_size: size,
            input_buf,
            spectrum_buf,
            scratch,
            plan,
            window: hann(size),
        }
    }

    /// Process `samples` through the windowed FFT.
    ///
    /// Returns the magnitude spectrum (N/2+1 bins), each bin scaled by 1/N.
    /// Inputs shorter than the FFT size are zero-padded; longer ones are
    /// truncated.
    ///
    /// # Example
    /// ```
    /// use gs_audio::fft::FftPipeline;
    /// let mut fft = FftPipeline::new(256);
    /// let samples = vec![0.0f32; 256];
    /// let spectrum = fft.process(&samples);
    /// assert_eq!(spectrum.len(), 129); // N/2 + 1
    /// ```
    pub fn process(&mut self, samples: &[f32]) -> Vec<f64> {
        let n = self.fft_size.min(samples.len());

        // Copy and window
        for (i, slot) in self.input_buf.iter_mut().enumerate() {
            *slot = if i < n {
                f64::from(samples[i]) * self.window[i]
            } else {
                0.0
            };
        }

        if self
            .plan
            .process_with_scratch(&mut self.input_buf, &mut self.spectrum_buf, &mut self.scratch)
            .is_err()
        {
            log::warn!("FFT de taille {} a échoué, spectre nul", self.fft_size);
            return vec![0.0; self.spectrum_buf.len()];
        }

        let scale = self.fft_size as f64;
        self.spectrum_buf.iter().map(|c| c.norm() / scale).collect()
    }

    /// FFT window size.
    #[must_use]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of magnitude bins produced by [`process`](Self::process).
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2 + 1
    }
}

/// Symmetric Hann window. A 1-point window is `[1.0]`.
fn hann(size: usize) -> Vec<f64> {
    if size == 1 {
        return vec![1.0];
    }
    let denom = (size - 1) as f64;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / denom).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_is_symmetric_and_zero_at_edges() {
        let w = hann(9);
        assert!(w[0].abs() < 1e-12);
        assert!(w[8].abs() < 1e-12);
        assert!((w[4] - 1.0).abs() < 1e-12);
        for (a, b) in w.iter().zip(w.iter().rev()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn sine_peaks_at_its_bin() {
        let size = 512;
        let bin = 32;
        let samples: Vec<f32> = (0..size)
            .map(|i| (2.0 * std::f64::consts::PI * bin as f64 * i as f64 / size as f64).sin() as f32)
            .collect();
        let mut fft = FftPipeline::new(size);
        let spectrum = fft.process(&samples);
        let peak = spectrum
            .iter()
            .enumerate()
            .fold((0, 0.0), |acc, (i, &m)| if m > acc.1 { (i, m) } else { acc });
        assert_eq!(peak.0, bin);
    }

    #[test]
    fn short_input_is_zero_padded() {
        let mut fft = FftPipeline::new(64);
        let spectrum = fft.process(&[]);
        assert_eq!(spectrum.len(), 33);
        assert!(spectrum.iter().all(|m| m.abs() < f64::EPSILON));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let samples: Vec<f32> = (0..100).map(|i| ((i * 7) % 13) as f32 / 13.0 - 0.5).collect();
        let mut fft = FftPipeline::new(100);
        let a = fft.process(&samples);
        let b = fft.process(&samples);
        assert_eq!(a, b);
    }
}
