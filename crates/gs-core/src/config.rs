use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::feature::Feature;
use crate::layout::ScatterLayout;

/// Analysis and display settings.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use gs_core::config::AnalysisConfig;
/// let config = AnalysisConfig::default();
/// assert!((config.grain_length_ms - 100.0).abs() < f64::EPSILON);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AnalysisConfig {
    // === Segmentation ===
    /// Grain duration in milliseconds. `<= 0` yields no grains.
    pub grain_length_ms: f64,
    /// Override for the decoded sample rate. `None` = use the file's rate.
    pub sample_rate: Option<f64>,

    // === Features ===
    /// Features computed for every grain.
    pub features: Vec<Feature>,
    /// Energy fraction for spectral rolloff. Any value is accepted.
    pub rolloff_percentile: f32,

    // === Display ===
    /// Feature on the horizontal axis.
    pub x_axis: Feature,
    /// Feature on the vertical axis.
    pub y_axis: Feature,
    /// Plot width in pixels.
    pub plot_width: u32,
    /// Plot height in pixels.
    pub plot_height: u32,
    /// Min-max normalize axes across grains.
    pub normalize_axes: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            grain_length_ms: 100.0,
            sample_rate: None,
            features: Feature::ALL.to_vec(),
            rolloff_percentile: 0.85,
            x_axis: Feature::Rms,
            y_axis: Feature::SpectralCentroid,
            plot_width: 800,
            plot_height: 600,
            normalize_axes: true,
        }
    }
}

impl AnalysisConfig {
    /// Reject values the analysis core cannot be given.
    ///
    /// The rolloff percentile is deliberately unconstrained and a
    /// non-positive grain length is legal.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] for a non-finite grain length or zero
    /// plot dimensions, and [`CoreError::InvalidSampleRate`] for a sample
    /// rate override that is not finite and strictly positive.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.grain_length_ms.is_finite() {
            return Err(CoreError::Config(format!(
                "grain_length_ms doit être fini (reçu {})",
                self.grain_length_ms
            )));
        }
        if let Some(rate) = self.sample_rate
            && (!rate.is_finite() || rate <= 0.0)
        {
            return Err(CoreError::InvalidSampleRate { rate });
        }
        if self.plot_width == 0 || self.plot_height == 0 {
            return Err(CoreError::Config(format!(
                "dimensions du plot invalides : {}×{}",
                self.plot_width, self.plot_height
            )));
        }
        Ok(())
    }

    /// Features to compute, with both plot axes included and duplicates removed.
    #[must_use]
    pub fn requested_features(&self) -> Vec<Feature> {
        let mut features = self.features.clone();
        features.push(self.x_axis);
        features.push(self.y_axis);
        features.sort_unstable();
        features.dedup();
        features
    }

    /// Scatter projection described by the display settings.
    #[must_use]
    pub fn layout(&self) -> ScatterLayout {
        ScatterLayout::new(self.x_axis, self.y_axis, self.plot_width, self.plot_height)
            .with_normalize(self.normalize_axes)
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    analysis: Option<AnalysisSection>,
    display: Option<DisplaySection>,
}

/// Analysis section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct AnalysisSection {
    grain_length_ms: Option<f64>,
    sample_rate: Option<f64>,
    features: Option<Vec<Feature>>,
    rolloff_percentile: Option<f32>,
}

/// Display section of the TOML config, all fields optional.
#[derive(Deserialize)]
struct DisplaySection {
    x_axis: Option<Feature>,
    y_axis: Option<Feature>,
    width: Option<u32>,
    height: Option<u32>,
    normalize: Option<bool>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use gs_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns an error if the text is not valid TOML for this schema.
///
/// # Example
/// ```
/// use gs_core::config::parse_config;
/// let config = parse_config("[analysis]\ngrain_length_ms = 50.0\n").unwrap();
/// assert!((config.grain_length_ms - 50.0).abs() < f64::EPSILON);
/// ```
pub fn parse_config(content: &str) -> Result<AnalysisConfig> {
    let file: ConfigFile = toml::from_str(content)?;
    let mut config = AnalysisConfig::default();

    if let Some(a) = file.analysis {
        if let Some(v) = a.grain_length_ms {
            config.grain_length_ms = v;
        }
        if a.sample_rate.is_some() {
            config.sample_rate = a.sample_rate;
        }
        if let Some(v) = a.features {
            config.features = v;
        }
        if let Some(v) = a.rolloff_percentile {
            config.rolloff_percentile = v;
        }
    }

    if let Some(d) = file.display {
        if let Some(v) = d.x_axis {
            config.x_axis = v;
        }
        if let Some(v) = d.y_axis {
            config.y_axis = v;
        }
        if let Some(v) = d.width {
            config.plot_width = v;
        }
        if let Some(v) = d.height {
            config.plot_height = v;
        }
        if let Some(v) = d.normalize {
            config.normalize_axes = v;
        }
    }

    log::debug!(
        "Config: grain {} ms, {} features, rolloff {}",
        config.grain_length_ms,
        config.features.len(),
        config.rolloff_percentile
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_sections_keep_defaults() {
        let config = parse_config(
            r#"
            [analysis]
            rolloff_percentile = 1.1
            features = ["rms", "spectral_rolloff"]

            [display]
            y_axis = "spectral_flatness"
            "#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        assert!((config.rolloff_percentile - 1.1).abs() < f32::EPSILON);
        assert_eq!(config.features, vec![Feature::Rms, Feature::SpectralRolloff]);
        assert_eq!(config.x_axis, Feature::Rms);
        assert_eq!(config.y_axis, Feature::SpectralFlatness);
        assert_eq!(config.plot_width, 800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn shipped_default_config_parses() {
        let config = parse_config(include_str!("../../../config/default.toml"))
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(config.features, Feature::ALL.to_vec());
        assert_eq!(config.y_axis, Feature::SpectralCentroid);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_file_is_default() {
        let config = parse_config("").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(config.features.len(), 8);
        assert_eq!(config.sample_rate, None);
    }

    #[test]
    fn unknown_feature_is_a_parse_error() {
        assert!(parse_config("[analysis]\nfeatures = [\"mfcc\"]\n").is_err());
    }

    #[test]
    fn negative_sample_rate_rejected() {
        let config = AnalysisConfig {
            sample_rate: Some(-48000.0),
            ..AnalysisConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(CoreError::InvalidSampleRate { rate: -48000.0 })
        );
    }

    #[test]
    fn non_positive_grain_length_is_legal() {
        let config = AnalysisConfig {
            grain_length_ms: -5.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = AnalysisConfig {
            grain_length_ms: f64::NAN,
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn requested_features_include_axes() {
        let config = AnalysisConfig {
            features: vec![Feature::ZeroCrossingRate, Feature::Rms],
            x_axis: Feature::Rms,
            y_axis: Feature::SpectralKurtosis,
            ..AnalysisConfig::default()
        };
        assert_eq!(
            config.requested_features(),
            vec![
                Feature::Rms,
                Feature::ZeroCrossingRate,
                Feature::SpectralKurtosis
            ]
        );
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("{e}"));
        writeln!(file, "[analysis]\ngrain_length_ms = 20.0\nsample_rate = 48000.0")
            .unwrap_or_else(|e| panic!("{e}"));
        let config = load_config(file.path()).unwrap_or_else(|e| panic!("{e}"));
        assert!((config.grain_length_ms - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.sample_rate, Some(48000.0));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/grainscape.toml"))
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("/nonexistent/grainscape.toml"));
    }
}
