//! WAV decoding for uploaded audio.
//!
//! Supports arbitrary sample rates and channels, resampling to 16kHz mono.

use crate::defaults::SAMPLE_RATE;
use crate::error::{Result, WhisprError};
use std::io::Cursor;

/// Decodes WAV bytes into 16kHz mono PCM samples.
pub fn decode(bytes: &[u8]) -> Result<Vec<i16>> {
    let mut reader =
        hound::WavReader::new(Cursor::new(bytes)).map_err(|e| WhisprError::AudioDecode {
            message: format!("Failed to parse WAV file: {}", e),
        })?;

    let spec = reader.spec();
    let source_rate = spec.sample_rate;
    let source_channels = spec.channels;

    let raw_samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| WhisprError::AudioDecode {
            message: format!("Failed to read WAV samples: {}", e),
        })?;

    // Convert to mono if stereo
    let mono_samples = if source_channels == 2 {
        raw_samples
            .chunks_exact(2)
            .map(|pair| {
                let left = pair[0] as i32;
                let right = pair[1] as i32;
                ((left + right) / 2) as i16
            })
            .collect()
    } else {
        raw_samples
    };

    // Resample to 16kHz if needed
    if source_rate != SAMPLE_RATE {
        Ok(resample(&mono_samples, source_rate, SAMPLE_RATE))
    } else {
        Ok(mono_samples)
    }
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = source_pos.floor() as usize;
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx.min(samples.len() - 1)]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
