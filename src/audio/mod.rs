//! Audio buffer types and WAV ingestion.

pub mod wav;

use crate::defaults::SAMPLE_RATE;
use crate::pipeline::planner::ChunkDescriptor;

/// Immutable audio buffer: 16-bit PCM at a fixed sample rate, mono.
///
/// Owned by the pipeline for the duration of one job.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Creates a buffer from raw samples at the given sample rate.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Creates a buffer from 16kHz mono samples.
    pub fn from_samples(samples: Vec<i16>) -> Self {
        Self::new(samples, SAMPLE_RATE)
    }

    /// Decodes WAV bytes, downmixing and resampling to 16kHz mono.
    pub fn from_wav_bytes(bytes: &[u8]) -> crate::error::Result<Self> {
        let samples = wav::decode(bytes)?;
        Ok(Self::from_samples(samples))
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// All samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Derived duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Extracts the samples covered by a chunk descriptor.
    ///
    /// The range is clamped to the buffer, so a descriptor planned against
    /// this buffer always yields exactly its `length_samples`.
    pub fn chunk(&self, descriptor: &ChunkDescriptor) -> Vec<i16> {
        let start = descriptor.start_sample.min(self.samples.len());
        let end = (descriptor.start_sample + descriptor.length_samples).min(self.samples.len());
        self.samples[start..end].to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_derives_from_sample_count() {
        let buffer = AudioBuffer::from_samples(vec![0i16; 16000 * 3]);
        assert_eq!(buffer.duration_secs(), 3.0);
        assert_eq!(buffer.sample_rate(), 16000);
    }

    #[test]
    fn chunk_extracts_descriptor_range() {
        let samples: Vec<i16> = (0..100).collect();
        let buffer = AudioBuffer::from_samples(samples);

        let descriptor = ChunkDescriptor {
            index: 0,
            start_sample: 10,
            length_samples: 20,
        };
        let chunk = buffer.chunk(&descriptor);
        assert_eq!(chunk.len(), 20);
        assert_eq!(chunk[0], 10);
        assert_eq!(chunk[19], 29);
    }

    #[test]
    fn chunk_clamps_to_buffer_end() {
        let buffer = AudioBuffer::from_samples(vec![7i16; 50]);
        let descriptor = ChunkDescriptor {
            index: 1,
            start_sample: 40,
            length_samples: 100,
        };
        assert_eq!(buffer.chunk(&descriptor).len(), 10);
    }

    #[test]
    fn empty_buffer_reports_empty() {
        let buffer = AudioBuffer::from_samples(Vec::new());
        assert!(buffer.is_empty());
        assert_eq!(buffer.duration_secs(), 0.0);
    }
}
