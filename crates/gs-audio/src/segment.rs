use gs_core::grain::Grain;
use gs_core::signal::Signal;

/// Number of samples in one grain: `floor(sample_rate * grain_length_ms / 1000)`.
///
/// Returns 0 for non-positive or non-finite products.
///
/// # Example
/// ```
/// use gs_audio::segment::samples_per_grain;
/// assert_eq!(samples_per_grain(100.0, 44100.0), 4410);
/// assert_eq!(samples_per_grain(0.0, 44100.0), 0);
/// ```
#[must_use]
pub fn samples_per_grain(grain_length_ms: f64, sample_rate: f64) -> usize {
    let samples = (sample_rate * grain_length_ms / 1000.0).floor();
    if samples.is_finite() && samples > 0.0 {
        samples as usize
    } else {
        0
    }
}

/// Source span of one grain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrainWindow {
    /// First source sample.
    pub start: usize,
    /// Source samples covered.
    pub len: usize,
    /// Length of the grain once padded.
    pub padded_len: usize,
}

/// Non-overlapping windows over `sample_count` samples.
///
/// Every window but the last spans `samples_per_grain` samples. A leftover
/// tail becomes one window padded up to `samples_per_grain`. A signal shorter
/// than one grain yields a single unpadded window covering all of it.
///
/// # Example
/// ```
/// use gs_audio::segment::GrainWindows;
/// let windows: Vec<_> = GrainWindows::new(10, 4).collect();
/// assert_eq!(windows.len(), 3);
/// assert_eq!((windows[2].start, windows[2].len, windows[2].padded_len), (8, 2, 4));
/// ```
#[derive(Clone, Debug)]
pub struct GrainWindows {
    sample_count: usize,
    samples_per_grain: usize,
    next_start: usize,
    done: bool,
}

impl GrainWindows {
    /// Windows of `samples_per_grain` over `sample_count` samples.
    /// `samples_per_grain == 0` yields nothing.
    #[must_use]
    pub fn new(sample_count: usize, samples_per_grain: usize) -> Self {
        Self {
            sample_count,
            samples_per_grain,
            next_start: 0,
            done: samples_per_grain == 0,
        }
    }
}

impl Iterator for GrainWindows {
    type Item = GrainWindow;

    fn next(&mut self) -> Option<GrainWindow> {
        if self.done {
            return None;
        }

        // Whole signal fits in one grain: one window, not padded.
        if self.sample_count < self.samples_per_grain {
            self.done = true;
            return Some(GrainWindow {
                start: 0,
                len: self.sample_count,
                padded_len: self.sample_count,
            });
        }

        let start = self.next_start;
        let remaining = self.sample_count - start;
        if remaining == 0 {
            self.done = true;
            return None;
        }

        let len = remaining.min(self.samples_per_grain);
        self.next_start += len;
        if self.next_start >= self.sample_count {
            self.done = true;
        }

        Some(GrainWindow {
            start,
            len,
            padded_len: self.samples_per_grain,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = if self.done {
            0
        } else if self.sample_count < self.samples_per_grain {
            1
        } else {
            (self.sample_count - self.next_start).div_ceil(self.samples_per_grain)
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for GrainWindows {}

/// Mean across channels of `signal[window.start..window.start + window.len]`,
/// zero-filled up to `window.padded_len`.
///
/// A signal with no channels yields silence.
///
/// # Example
/// ```
/// use gs_audio::segment::{downmix, GrainWindow};
/// use gs_core::signal::Signal;
///
/// let signal = Signal::new(vec![vec![1.0, 0.0], vec![0.0, -1.0]], 8000.0).unwrap();
/// let mono = downmix(&signal, GrainWindow { start: 0, len: 2, padded_len: 3 });
/// assert_eq!(mono, vec![0.5, -0.5, 0.0]);
/// ```
#[must_use]
pub fn downmix(signal: &Signal, window: GrainWindow) -> Vec<f32> {
    let mut mono = vec![0.0f32; window.padded_len];
    let channels = signal.channels();
    if channels.is_empty() {
        return mono;
    }

    // Fenêtres construites à la main : borner au signal et au buffer.
    let start = window.start.min(signal.sample_count());
    let end = start.saturating_add(window.len).min(signal.sample_count());
    let span = end.saturating_sub(start).min(window.padded_len);
    for channel in channels {
        for (out, &s) in mono.iter_mut().zip(&channel[start..start + span]) {
            *out += s;
        }
    }

    let count = channels.len() as f32;
    for out in &mut mono[..span] {
        *out /= count;
    }
    mono
}

/// Split `signal` into down-mixed grains of `grain_length_ms`.
///
/// - `grain_length_ms <= 0` (or a length rounding to zero samples) yields no grains.
/// - A signal shorter than one grain yields exactly one unpadded grain.
/// - Otherwise every grain holds `samples_per_grain` samples and the last
///   one is zero-padded when the signal does not divide evenly.
///
/// Never fails; `sample_rate` is trusted to have been validated upstream.
///
/// # Example
/// ```
/// use gs_audio::segment::segment;
/// use gs_core::signal::Signal;
///
/// let signal = Signal::new(vec![vec![0.1; 10_000]], 44100.0).unwrap();
/// let grains = segment(&signal, 100.0, 44100.0);
/// assert_eq!(grains.len(), 3); // ceil(10000 / 4410)
/// assert_eq!(grains[2].valid_len(), 10_000 - 2 * 4410);
/// assert_eq!(grains[2].len(), 4410);
/// ```
#[must_use]
pub fn segment(signal: &Signal, grain_length_ms: f64, sample_rate: f64) -> Vec<Grain> {
    if grain_length_ms.is_nan() || grain_length_ms <= 0.0 {
        return Vec::new();
    }

    let spg = samples_per_grain(grain_length_ms, sample_rate);
    let grains: Vec<Grain> = GrainWindows::new(signal.sample_count(), spg)
        .enumerate()
        .map(|(index, window)| Grain::new(index, window.start, downmix(signal, window), window.len))
        .collect();

    log::debug!(
        "Segmented {} samples × {} ch into {} grains of {} samples ({} ms @ {} Hz)",
        signal.sample_count(),
        signal.channel_count(),
        grains.len(),
        spg,
        grain_length_ms,
        sample_rate
    );

    grains
}
