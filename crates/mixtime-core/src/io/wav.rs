//! WAV loading and writing
//!
//! Files are read at their native sample rate. Integer PCM is scaled to
//! `[-1, 1)` by `1 / 2^(bits - 1)` and multi-channel audio is downmixed to
//! mono by averaging the channels of each frame.

use crate::error::LoadError;
use crate::signal::Signal;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Load a WAV file as a mono signal
///
/// # Errors
/// [`LoadError`] if the file cannot be opened or decoded, uses an unsupported
/// sample format, or contains no frames.
pub fn load_wav(path: impl AsRef<Path>) -> Result<Signal, LoadError> {
    let path = path.as_ref();
    let wav_err = |source| LoadError::Wav {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = WavReader::open(path).map_err(wav_err)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(wav_err)?,
        (SampleFormat::Int, bits @ 8..=32) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v as f64 * scale) as f32))
                .collect::<Result<_, _>>()
                .map_err(wav_err)?
        }
        (format, bits) => {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                bits,
                format: match format {
                    SampleFormat::Float => "float",
                    SampleFormat::Int => "int",
                },
            })
        }
    };

    let channels = spec.channels.max(1) as usize;
    let samples = downmix(&interleaved, channels);
    if samples.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    tracing::debug!(
        path = %path.display(),
        sample_rate = spec.sample_rate,
        channels,
        frames = samples.len(),
        "Loaded WAV"
    );

    Ok(Signal::new(samples, spec.sample_rate as f64))
}

/// Write a mono signal as a 32-bit float WAV
pub fn write_wav(path: impl AsRef<Path>, signal: &Signal) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: signal.sample_rate.round() as u32,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path.as_ref(), spec)?;
    for &sample in &signal.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}

/// Average interleaved frames to mono; a trailing partial frame is dropped
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| (frame.iter().map(|&x| x as f64).sum::<f64>() / channels as f64) as f32)
        .collect()
}
