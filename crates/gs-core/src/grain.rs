use crate::feature::{Feature, FeatureMap};

/// One down-mixed, fixed-length slice of a source signal.
///
/// A grain owns its samples; they are never modified after construction.
/// Only the attached [`FeatureMap`] changes, as features get computed.
///
/// # Example
/// ```
/// use gs_core::grain::Grain;
/// let grain = Grain::new(3, 300, vec![0.5, -0.5, 0.0, 0.0], 2);
/// assert_eq!(grain.valid_samples(), &[0.5, -0.5]);
/// assert_eq!(grain.padding(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct Grain {
    index: usize,
    source_offset: usize,
    valid_len: usize,
    samples: Vec<f32>,
    features: FeatureMap,
}

impl Grain {
    /// Create a grain from an owned mono block.
    ///
    /// `valid_len` counts the leading samples that come from the source;
    /// the rest is zero padding. It is capped at `samples.len()`.
    #[must_use]
    pub fn new(index: usize, source_offset: usize, samples: Vec<f32>, valid_len: usize) -> Self {
        Self {
            index,
            source_offset,
            valid_len: valid_len.min(samples.len()),
            samples,
            features: FeatureMap::default(),
        }
    }

    /// Position of this grain in its sequence.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// First source sample covered by this grain.
    #[must_use]
    pub fn source_offset(&self) -> usize {
        self.source_offset
    }

    /// Mono samples, padding included.
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Samples taken from the source, padding excluded.
    #[must_use]
    pub fn valid_samples(&self) -> &[f32] {
        &self.samples[..self.valid_len]
    }

    /// Number of samples taken from the source.
    #[must_use]
    pub fn valid_len(&self) -> usize {
        self.valid_len
    }

    /// Total length, padding included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` if the grain holds no samples at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of zero samples appended after the source data.
    #[must_use]
    pub fn padding(&self) -> usize {
        self.samples.len() - self.valid_len
    }

    /// Computed features.
    #[must_use]
    pub fn features(&self) -> &FeatureMap {
        &self.features
    }

    /// Value of `feature`, `None` if not computed yet.
    #[must_use]
    pub fn feature(&self, feature: Feature) -> Option<f64> {
        self.features.get(feature)
    }

    /// Attach a computed value.
    pub fn set_feature(&mut self, feature: Feature, value: f64) {
        self.features.insert(feature, value);
    }
}
