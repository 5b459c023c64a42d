use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use gs_core::config::AnalysisConfig;
use gs_core::feature::Feature;

/// grainscape — slice audio into grains and describe each one.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Fichier audio à analyser (WAV, FLAC, MP3, OGG, AAC).
    pub input: PathBuf,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Durée d'un grain en millisecondes.
    #[arg(long)]
    pub grain_ms: Option<f64>,

    /// Override the decoded sample rate (Hz).
    #[arg(long)]
    pub sample_rate: Option<f64>,

    /// Spectral rolloff energy fraction (values outside [0, 1] clamp to the edge bins).
    #[arg(long, allow_negative_numbers = true)]
    pub percentile: Option<f32>,

    /// Comma-separated features, e.g. `rms,zcr,centroid`.
    #[arg(long, value_delimiter = ',')]
    pub features: Option<Vec<Feature>>,

    /// Feature on the horizontal plot axis.
    #[arg(long)]
    pub x_axis: Option<Feature>,

    /// Feature on the vertical plot axis.
    #[arg(long)]
    pub y_axis: Option<Feature>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// How the analysis is printed to stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One aligned row per grain.
    Table,
    /// Grains and their features as JSON.
    Json,
    /// Scatter coordinates, one `index x y` line per grain.
    Points,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut AnalysisConfig) {
        if let Some(ms) = self.grain_ms {
            config.grain_length_ms = ms;
        }
        if self.sample_rate.is_some() {
            config.sample_rate = self.sample_rate;
        }
        if let Some(p) = self.percentile {
            config.rolloff_percentile = p;
        }
        if let Some(ref features) = self.features {
            config.features.clone_from(features);
        }
        if let Some(x) = self.x_axis {
            config.x_axis = x;
        }
        if let Some(y) = self.y_axis {
            config.y_axis = y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_feature_list_and_overrides() {
        let cli = Cli::try_parse_from([
            "grainscape",
            "snare.wav",
            "--grain-ms",
            "20",
            "--percentile",
            "1.1",
            "--features",
            "rms,zcr,centroid",
            "--format",
            "json",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(cli.format, OutputFormat::Json);
        let mut config = AnalysisConfig::default();
        cli.apply_overrides(&mut config);
        assert!((config.grain_length_ms - 20.0).abs() < f64::EPSILON);
        assert!((config.rolloff_percentile - 1.1).abs() < f32::EPSILON);
        assert_eq!(
            config.features,
            vec![
                Feature::Rms,
                Feature::ZeroCrossingRate,
                Feature::SpectralCentroid
            ]
        );
    }

    #[test]
    fn negative_percentile_is_accepted() {
        let cli = Cli::try_parse_from(["grainscape", "a.wav", "--percentile", "-0.5"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cli.percentile, Some(-0.5));
    }

    #[test]
    fn unknown_feature_is_rejected() {
        assert!(Cli::try_parse_from(["grainscape", "a.wav", "--features", "rms,mfcc"]).is_err());
    }

    #[test]
    fn overrides_leave_unset_fields_alone() {
        let cli = Cli::try_parse_from(["grainscape", "a.wav"]).unwrap_or_else(|e| panic!("{e}"));
        let mut config = AnalysisConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.features.len(), Feature::ALL.len());
        assert_eq!(config.sample_rate, None);
    }
}
