//! Shared types and configuration for grainscape.
//!
//! This crate holds the signal/grain data model, the closed feature
//! enumeration, configuration loading, and the scatter projection consumed
//! by display front-ends. All DSP lives in `gs-audio`.

pub mod config;
pub mod error;
pub mod feature;
pub mod grain;
pub mod layout;
pub mod signal;

pub use config::AnalysisConfig;
pub use error::CoreError;
pub use feature::{Feature, FeatureMap};
pub use grain::Grain;
pub use layout::{GrainPoint, ScatterLayout};
pub use signal::Signal;
