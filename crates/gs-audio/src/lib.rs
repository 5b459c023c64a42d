// Grain segmentation, feature extraction, and audio decoding for grainscape.

pub mod analyzer;
pub mod decode;
pub mod features;
pub mod fft;
pub mod segment;
pub mod spectral;
