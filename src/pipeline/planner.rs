//! Chunk planner: splits a recording into overlapping segments.
//!
//! Each chunk becomes one remote recognition call, so chunk duration is
//! bounded by the model's per-call input limit. Consecutive chunks share a
//! fixed overlap to reduce word cutoff at boundaries.

use crate::config::ChunkingConfig;
use crate::defaults;
use crate::error::{Result, WhisprError};

/// Planner parameters, all expressed in seconds against one sample rate.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Sample rate of the incoming buffer.
    pub sample_rate: u32,
    /// Nominal chunk duration in seconds.
    pub chunk_secs: u64,
    /// Overlap between consecutive chunks in seconds.
    pub overlap_secs: u64,
    /// Minimum chunk duration floor in seconds.
    pub min_chunk_secs: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            chunk_secs: defaults::CHUNK_SECS,
            overlap_secs: defaults::OVERLAP_SECS,
            min_chunk_secs: defaults::MIN_CHUNK_SECS,
        }
    }
}

impl PlannerConfig {
    /// Builds planner parameters from the chunking config section.
    pub fn from_config(config: &ChunkingConfig, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            chunk_secs: config.chunk_secs,
            overlap_secs: config.overlap_secs,
            min_chunk_secs: config.min_chunk_secs,
        }
    }

    fn chunk_samples(&self) -> usize {
        (self.chunk_secs * self.sample_rate as u64) as usize
    }

    fn overlap_samples(&self) -> usize {
        (self.overlap_secs * self.sample_rate as u64) as usize
    }

    fn min_chunk_samples(&self) -> usize {
        (self.min_chunk_secs * self.sample_rate as u64) as usize
    }
}

/// One planned segment of the input buffer.
///
/// Indices are contiguous from zero; descriptors are created once by the
/// planner and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDescriptor {
    /// Position in the final transcript ordering.
    pub index: usize,
    /// First sample covered by this chunk.
    pub start_sample: usize,
    /// Number of samples in this chunk.
    pub length_samples: usize,
}

impl ChunkDescriptor {
    /// Exclusive end sample of this chunk.
    pub fn end_sample(&self) -> usize {
        self.start_sample + self.length_samples
    }
}

/// Plans overlapping chunks covering `total_samples`.
///
/// Chunks start at offsets `0, step, 2*step, ...` where
/// `step = chunk - overlap`; each spans the nominal chunk length, with the
/// last truncated to the remaining samples. A trailing offset that falls
/// entirely inside the previous chunk's overlap is not planned.
///
/// When the configured chunk size would imply more chunks than the minimum
/// chunk duration floor allows, the per-chunk size is recomputed so the plan
/// stays consistent with the floor.
///
/// Pure and deterministic; an empty buffer is an error.
pub fn plan(total_samples: usize, config: &PlannerConfig) -> Result<Vec<ChunkDescriptor>> {
    if total_samples == 0 {
        return Err(WhisprError::EmptyAudio);
    }

    let mut chunk = config.chunk_samples();
    let overlap = config.overlap_samples();
    if chunk == 0 {
        return Err(WhisprError::ConfigInvalidValue {
            key: "chunking.chunk_secs".to_string(),
            message: "must be positive".to_string(),
        });
    }
    if overlap >= chunk {
        return Err(WhisprError::ConfigInvalidValue {
            key: "chunking.overlap_secs".to_string(),
            message: "must be shorter than the chunk duration".to_string(),
        });
    }

    let mut step = chunk - overlap;

    // Adaptive floor: never plan more chunks than the audio can fill at the
    // minimum chunk duration.
    let min_chunk = config.min_chunk_samples().max(1);
    let max_chunks = total_samples.div_ceil(min_chunk).max(1);
    let implied_chunks = if total_samples <= chunk {
        1
    } else {
        (total_samples - overlap).div_ceil(step)
    };
    if implied_chunks > max_chunks {
        step = total_samples.div_ceil(max_chunks).max(1);
        chunk = step + overlap;
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < total_samples {
        // A tail already covered by the previous chunk's overlap adds nothing.
        if start > 0 && start + overlap >= total_samples {
            break;
        }
        let length = chunk.min(total_samples - start);
        chunks.push(ChunkDescriptor {
            index: chunks.len(),
            start_sample: start,
            length_samples: length,
        });
        start += step;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: usize = 16000;

    fn secs(s: usize) -> usize {
        s * RATE
    }

    #[test]
    fn plan_100s_audio_produces_documented_boundaries() {
        // 30s chunks with 1s overlap: [0,30) [29,59) [58,88) [87,100)
        let chunks = plan(secs(100), &PlannerConfig::default()).unwrap();

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].start_sample, 0);
        assert_eq!(chunks[0].end_sample(), secs(30));
        assert_eq!(chunks[1].start_sample, secs(29));
        assert_eq!(chunks[1].end_sample(), secs(59));
        assert_eq!(chunks[2].start_sample, secs(58));
        assert_eq!(chunks[2].end_sample(), secs(88));
        assert_eq!(chunks[3].start_sample, secs(87));
        assert_eq!(chunks[3].end_sample(), secs(100));
    }

    #[test]
    fn plan_indices_are_contiguous_from_zero() {
        let chunks = plan(secs(200), &PlannerConfig::default()).unwrap();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn plan_short_audio_is_single_chunk() {
        let chunks = plan(secs(10), &PlannerConfig::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].start_sample, 0);
        assert_eq!(chunks[0].length_samples, secs(10));
    }

    #[test]
    fn plan_exact_chunk_duration_is_single_chunk() {
        // A second chunk would start inside the overlap and cover nothing new.
        let chunks = plan(secs(30), &PlannerConfig::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].length_samples, secs(30));
    }

    #[test]
    fn plan_empty_audio_is_an_error() {
        let result = plan(0, &PlannerConfig::default());
        assert!(matches!(result, Err(WhisprError::EmptyAudio)));
    }

    #[test]
    fn plan_rejects_overlap_wider_than_chunk() {
        let config = PlannerConfig {
            chunk_secs: 2,
            overlap_secs: 2,
            ..PlannerConfig::default()
        };
        let result = plan(secs(60), &config);
        assert!(matches!(result, Err(WhisprError::ConfigInvalidValue { .. })));
    }

    #[test]
    fn plan_floor_limits_chunk_count_for_small_configured_chunks() {
        // 2s chunks over 20s of audio would imply ~19 chunks; the 5s floor
        // caps the plan at 4 and widens the chunks instead.
        let config = PlannerConfig {
            chunk_secs: 2,
            overlap_secs: 1,
            ..PlannerConfig::default()
        };
        let chunks = plan(secs(20), &config).unwrap();
        assert!(chunks.len() <= 4, "got {} chunks", chunks.len());
        assert_eq!(chunks.last().unwrap().end_sample(), secs(20));
    }

    #[test]
    fn plan_covers_every_sample() {
        for total in [secs(7), secs(31), secs(100), secs(100) + 123] {
            let chunks = plan(total, &PlannerConfig::default()).unwrap();
            assert_eq!(chunks[0].start_sample, 0);
            assert_eq!(chunks.last().unwrap().end_sample(), total);
            for pair in chunks.windows(2) {
                // No gap between consecutive chunks
                assert!(pair[1].start_sample < pair[0].end_sample());
            }
        }
    }

    #[test]
    fn plan_is_deterministic() {
        let a = plan(secs(95), &PlannerConfig::default()).unwrap();
        let b = plan(secs(95), &PlannerConfig::default()).unwrap();
        assert_eq!(a, b);
    }
}
