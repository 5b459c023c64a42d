use crate::error::CoreError;

/// Immutable multichannel sample buffer, as supplied by a loader.
///
/// Channels are stored planar (one `Vec` per channel) and always hold the
/// same number of samples. A signal with zero channels has zero samples.
///
/// # Example
/// ```
/// use gs_core::signal::Signal;
/// let signal = Signal::new(vec![vec![0.0; 4410], vec![0.0; 4410]], 44100.0).unwrap();
/// assert_eq!(signal.channel_count(), 2);
/// assert_eq!(signal.sample_count(), 4410);
/// ```
#[derive(Clone, Debug)]
pub struct Signal {
    channels: Vec<Vec<f32>>,
    sample_rate: f64,
}

impl Signal {
    /// Build a signal from planar channel data.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidSampleRate`] if `sample_rate` is not finite
    /// and strictly positive, or [`CoreError::RaggedChannels`] if the channels
    /// differ in length.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: f64) -> Result<Self, CoreError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(CoreError::InvalidSampleRate { rate: sample_rate });
        }

        if let Some(first) = channels.first() {
            let expected = first.len();
            if let Some((channel, found)) = channels
                .iter()
                .map(Vec::len)
                .enumerate()
                .find(|&(_, len)| len != expected)
            {
                return Err(CoreError::RaggedChannels {
                    channel,
                    expected,
                    found,
                });
            }
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Build a signal from interleaved frames (`L R L R ...`).
    ///
    /// A trailing partial frame is dropped. `channel_count == 0` yields an
    /// empty signal.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidSampleRate`] for a bad sample rate.
    ///
    /// # Example
    /// ```
    /// use gs_core::signal::Signal;
    /// let signal = Signal::from_interleaved(&[1.0, -1.0, 0.5, -0.5], 2, 48000.0).unwrap();
    /// assert_eq!(signal.channel(0), Some(&[1.0, 0.5][..]));
    /// assert_eq!(signal.channel(1), Some(&[-1.0, -0.5][..]));
    /// ```
    pub fn from_interleaved(
        data: &[f32],
        channel_count: usize,
        sample_rate: f64,
    ) -> Result<Self, CoreError> {
        if channel_count == 0 {
            return Self::new(Vec::new(), sample_rate);
        }

        let frames = data.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in data.chunks_exact(channel_count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Self::new(channels, sample_rate)
    }

    /// Number of channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Sample rate in Hz.
    #[must_use]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Samples of channel `index`, if it exists.
    #[must_use]
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels, planar.
    #[must_use]
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Duration in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.sample_count() as f64 / self.sample_rate
    }
}
