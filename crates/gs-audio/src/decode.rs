use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use gs_core::signal::Signal;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Fallback when the container does not declare a sample rate.
const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Decode an audio file into a multichannel [`Signal`].
///
/// Supports WAV, MP3, FLAC, OGG, AAC via symphonia. Channels are kept
/// separate; down-mixing happens during segmentation.
///
/// # Errors
/// Returns an error if the file cannot be opened, probed, or has no
/// decodable audio track.
///
/// # Example
/// ```no_run
/// use gs_audio::decode::decode_file;
/// let signal = decode_file("snare.wav").unwrap();
/// println!("{} ch @ {} Hz", signal.channel_count(), signal.sample_rate());
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<Signal> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Cannot open audio file: {}", path.display()))?;
    let mss = MediaSourceStream::new(
        Box::new(file),
        symphonia::core::io::MediaSourceStreamOptions::default(),
    );

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Failed to probe audio format")?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .context("No default audio track found")?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or_else(|| {
        log::warn!(
            "{} ne déclare pas de sample rate, {DEFAULT_SAMPLE_RATE} Hz supposé",
            path.display()
        );
        DEFAULT_SAMPLE_RATE
    });
    let declared_channels = track
        .codec_params
        .channels
        .map(symphonia::core::audio::Channels::count);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create audio decoder")?;

    let track_id = track.id;
    let mut interleaved_all: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut max_sample_frames: usize = 0;
    let mut decoded_channels: Option<usize> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("Audio decode packet error: {e}");
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Audio decode frame error: {e}");
                continue;
            }
        };

        let spec = *decoded.spec();
        decoded_channels.get_or_insert(spec.channels.count());
        let num_frames = decoded.capacity();
        // Reuse SampleBuffer: only reallocate if this packet is bigger than current capacity
        if sample_buf.is_none() || num_frames > max_sample_frames {
            sample_buf = Some(SampleBuffer::<f32>::new(num_frames as u64, spec));
            max_sample_frames = num_frames;
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);
        interleaved_all.extend_from_slice(buf.samples());
    }

    let channels = resolve_channels(declared_channels, decoded_channels);
    let signal = Signal::from_interleaved(&interleaved_all, channels, f64::from(sample_rate))?;

    log::info!(
        "Decoded {} samples × {} ch @ {}Hz from {}",
        signal.sample_count(),
        signal.channel_count(),
        sample_rate,
        path.display()
    );

    Ok(signal)
}

/// Channel count used to de-interleave: the first decoded buffer wins over
/// the container header, mono when neither reports one.
fn resolve_channels(declared: Option<usize>, decoded: Option<usize>) -> usize {
    if let (Some(d), Some(h)) = (decoded, declared)
        && d != h
    {
        log::warn!("Le conteneur annonce {h} canaux, le décodeur en produit {d}");
    }
    decoded.or(declared).filter(|&n| n > 0).unwrap_or(1)
}
