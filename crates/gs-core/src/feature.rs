use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Scalar descriptors computable over a grain's mono samples.
///
/// # Example
/// ```
/// use gs_core::feature::Feature;
/// let f: Feature = "centroid".parse().unwrap();
/// assert_eq!(f, Feature::SpectralCentroid);
/// assert_eq!(f.name(), "spectral_centroid");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Root mean square of the samples.
    Rms,
    /// Maximum signed sample value.
    PeakEnergy,
    /// Number of strict sign changes between adjacent samples.
    ZeroCrossingRate,
    /// Magnitude-weighted mean bin index ("brightness").
    SpectralCentroid,
    /// Geometric over arithmetic mean of the magnitude spectrum.
    SpectralFlatness,
    /// Spectral peak over spectral RMS.
    SpectralCrest,
    /// Lowest bin holding a given fraction of spectral energy.
    SpectralRolloff,
    /// Fourth standardized moment of the magnitude values.
    SpectralKurtosis,
}

impl Feature {
    /// Every feature, in declaration order.
    pub const ALL: [Feature; 8] = [
        Feature::Rms,
        Feature::PeakEnergy,
        Feature::ZeroCrossingRate,
        Feature::SpectralCentroid,
        Feature::SpectralFlatness,
        Feature::SpectralCrest,
        Feature::SpectralRolloff,
        Feature::SpectralKurtosis,
    ];

    /// Canonical snake_case name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Feature::Rms => "rms",
            Feature::PeakEnergy => "peak_energy",
            Feature::ZeroCrossingRate => "zero_crossing_rate",
            Feature::SpectralCentroid => "spectral_centroid",
            Feature::SpectralFlatness => "spectral_flatness",
            Feature::SpectralCrest => "spectral_crest",
            Feature::SpectralRolloff => "spectral_rolloff",
            Feature::SpectralKurtosis => "spectral_kurtosis",
        }
    }

    /// Short column label for tabular output.
    #[must_use]
    pub fn short_name(self) -> &'static str {
        match self {
            Feature::Rms => "rms",
            Feature::PeakEnergy => "peak",
            Feature::ZeroCrossingRate => "zcr",
            Feature::SpectralCentroid => "centroid",
            Feature::SpectralFlatness => "flatness",
            Feature::SpectralCrest => "crest",
            Feature::SpectralRolloff => "rolloff",
            Feature::SpectralKurtosis => "kurtosis",
        }
    }

    /// `true` if the feature is computed from the magnitude spectrum.
    #[must_use]
    pub fn is_spectral(self) -> bool {
        matches!(
            self,
            Feature::SpectralCentroid
                | Feature::SpectralFlatness
                | Feature::SpectralCrest
                | Feature::SpectralRolloff
                | Feature::SpectralKurtosis
        )
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Feature::ALL
            .into_iter()
            .find(|f| f.name() == key || f.short_name() == key)
            .ok_or_else(|| CoreError::UnknownFeature { name: s.to_string() })
    }
}

/// Per-grain storage of computed feature values.
///
/// Absence of a key means "not computed yet", which is distinct from a
/// computed value of `0.0`.
///
/// # Example
/// ```
/// use gs_core::feature::{Feature, FeatureMap};
/// let mut map = FeatureMap::default();
/// assert_eq!(map.get(Feature::Rms), None);
/// map.insert(Feature::Rms, 0.0);
/// assert_eq!(map.get(Feature::Rms), Some(0.0));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct FeatureMap {
    values: BTreeMap<Feature, f64>,
}

impl FeatureMap {
    /// Value of `feature`, or `None` if it has not been computed.
    #[must_use]
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.values.get(&feature).copied()
    }

    /// Store a computed value, returning the previous one if any.
    pub fn insert(&mut self, feature: Feature, value: f64) -> Option<f64> {
        self.values.insert(feature, value)
    }

    /// `true` if `feature` has been computed.
    #[must_use]
    pub fn contains(&self, feature: Feature) -> bool {
        self.values.contains_key(&feature)
    }

    /// Number of computed features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` if nothing has been computed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Computed `(feature, value)` pairs in feature order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.values.iter().map(|(&f, &v)| (f, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_names_and_aliases() {
        for feature in Feature::ALL {
            assert_eq!(feature.name().parse::<Feature>().ok(), Some(feature));
            assert_eq!(feature.short_name().parse::<Feature>().ok(), Some(feature));
        }
        assert_eq!(
            "Spectral-Rolloff".parse::<Feature>().ok(),
            Some(Feature::SpectralRolloff)
        );
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(
            "mfcc".parse::<Feature>().err(),
            Some(CoreError::UnknownFeature {
                name: "mfcc".into()
            })
        );
    }

    #[test]
    fn spectral_partition() {
        let spectral = Feature::ALL.iter().filter(|f| f.is_spectral()).count();
        assert_eq!(spectral, 5);
        assert!(!Feature::ZeroCrossingRate.is_spectral());
    }

    #[test]
    fn unset_differs_from_zero() {
        let mut map = FeatureMap::default();
        assert!(!map.contains(Feature::PeakEnergy));
        assert_eq!(map.insert(Feature::PeakEnergy, 0.0), None);
        assert!(map.contains(Feature::PeakEnergy));
        assert_eq!(map.insert(Feature::PeakEnergy, 9.0), Some(0.0));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn serializes_with_snake_case_keys() {
        let mut map = FeatureMap::default();
        map.insert(Feature::SpectralCrest, 2.5);
        map.insert(Feature::Rms, 0.5);
        let json = serde_json::to_string(&map).unwrap_or_default();
        assert_eq!(json, r#"{"rms":0.5,"spectral_crest":2.5}"#);
    }
}
