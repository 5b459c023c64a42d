use serde::Serialize;

use crate::feature::Feature;
use crate::grain::Grain;

/// Position of one grain in the scatter plot, in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GrainPoint {
    /// Index of the grain in its sequence.
    pub grain_index: usize,
    /// Horizontal pixel, `0..width`.
    pub x: u32,
    /// Vertical pixel, `0..height`.
    pub y: u32,
}

/// Projects grains onto a 2-D drawing area using two features as axes.
///
/// Feature values are expected in `[0, 1]`; with `normalize` set, each axis
/// is first min-max rescaled across the placed grains.
///
/// # Example
/// ```
/// use gs_core::feature::Feature;
/// use gs_core::grain::Grain;
/// use gs_core::layout::ScatterLayout;
///
/// let mut grain = Grain::new(0, 0, vec![0.0; 4], 4);
/// grain.set_feature(Feature::Rms, 0.5);
/// grain.set_feature(Feature::SpectralCentroid, 0.25);
///
/// let layout = ScatterLayout::new(Feature::Rms, Feature::SpectralCentroid, 800, 600);
/// let points = layout.project(&[grain]);
/// assert_eq!((points[0].x, points[0].y), (400, 150));
/// ```
#[derive(Clone, Debug)]
pub struct ScatterLayout {
    /// Feature mapped to the horizontal axis.
    pub x_axis: Feature,
    /// Feature mapped to the vertical axis.
    pub y_axis: Feature,
    /// Drawing area width in pixels.
    pub width: u32,
    /// Drawing area height in pixels.
    pub height: u32,
    /// Min-max normalize each axis before scaling.
    pub normalize: bool,
}

impl ScatterLayout {
    /// Layout without normalization.
    #[must_use]
    pub fn new(x_axis: Feature, y_axis: Feature, width: u32, height: u32) -> Self {
        Self {
            x_axis,
            y_axis,
            width,
            height,
            normalize: false,
        }
    }

    /// Enable or disable per-axis normalization.
    #[must_use]
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Place every grain that has both axis features computed.
    ///
    /// Grains missing either feature are skipped. Coordinates are clamped to
    /// the drawing area; an empty area yields no points.
    #[must_use]
    pub fn project(&self, grains: &[Grain]) -> Vec<GrainPoint> {
        if self.width == 0 || self.height == 0 {
            return Vec::new();
        }

        let placed: Vec<(usize, f64, f64)> = grains
            .iter()
            .filter_map(|g| {
                let x = g.feature(self.x_axis)?;
                let y = g.feature(self.y_axis)?;
                Some((g.index(), x, y))
            })
            .collect();

        let (x_range, y_range) = if self.normalize {
            (
                Some(min_max(placed.iter().map(|p| p.1))),
                Some(min_max(placed.iter().map(|p| p.2))),
            )
        } else {
            (None, None)
        };

        placed
            .into_iter()
            .map(|(grain_index, x, y)| {
                let x = x_range.map_or(x, |(lo, hi)| norm(x, lo, hi));
                let y = y_range.map_or(y, |(lo, hi)| norm(y, lo, hi));
                GrainPoint {
                    grain_index,
                    x: to_pixel(x, self.width),
                    y: to_pixel(y, self.height),
                }
            })
            .collect()
    }
}

/// Convert a spectral bin index to its centre frequency in Hz.
///
/// # Example
/// ```
/// use gs_core::layout::bin_to_hz;
/// assert!((bin_to_hz(10.0, 4410, 44100.0) - 100.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn bin_to_hz(bin: f64, fft_size: usize, sample_rate: f64) -> f64 {
    if fft_size == 0 {
        return 0.0;
    }
    bin * sample_rate / fft_size as f64
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Normalize a value to [0, 1] given min/max range. Returns 0.5 for degenerate ranges.
#[inline]
fn norm(val: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range < 1e-12 {
        0.5
    } else {
        ((val - min) / range).clamp(0.0, 1.0)
    }
}

#[inline]
fn to_pixel(value: f64, extent: u32) -> u32 {
    // NaN falls through `max` to 0.0.
    let scaled = (value * f64::from(extent)).max(0.0);
    (scaled as u32).min(extent - 1)
}
