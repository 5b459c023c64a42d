use thiserror::Error;

/// Errors originating from the core module.
///
/// These are raised at the boundary only (signal construction, configuration).
/// Segmentation and feature extraction are total and never return them.
#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Sample rate is not a finite, strictly positive number.
    #[error("Sample rate invalide : {rate}")]
    InvalidSampleRate {
        /// The rejected sample rate.
        rate: f64,
    },

    /// Channels of a signal do not all hold the same number of samples.
    #[error("Canaux de longueurs différentes : canal {channel} a {found} échantillons, {expected} attendus")]
    RaggedChannels {
        /// Index of the first offending channel.
        channel: usize,
        /// Sample count of channel 0.
        expected: usize,
        /// Sample count of the offending channel.
        found: usize,
    },

    /// Unknown feature name.
    #[error("Feature inconnue : {name}")]
    UnknownFeature {
        /// The name that failed to parse.
        name: String,
    },
}
