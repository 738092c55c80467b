//! Sample rate conversion using rubato

use rubato::{FftFixedInOut, Resampler};

use crate::error::PipelineError;

/// Frames per resampler chunk
const CHUNK_SIZE: usize = 1024;

/// Resample mono audio to a target rate
///
/// Uses rubato's synchronous FFT resampler. The resampler's output delay is
/// trimmed so output sample `k` lines up with input time `k / to`, and the
/// result is cut to `round(len * to / from)` samples.
///
/// # Arguments
///
/// * `samples` - Mono samples at `from` Hz
/// * `from` - Source sample rate
/// * `to` - Target sample rate
pub fn resample(samples: &[f32], from: u32, to: u32) -> Result<Vec<f32>, PipelineError> {
    if from == 0 || to == 0 {
        return Err(PipelineError::InvalidInput(format!(
            "Invalid sample rates: {} -> {}",
            from, to
        )));
    }
    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = FftFixedInOut::<f32>::new(from as usize, to as usize, CHUNK_SIZE, 1)
        .map_err(|e| PipelineError::ProcessingError(format!("Resampler construction failed: {}", e)))?;

    let delay = resampler.output_delay();
    let expected = ((samples.len() as f64) * to as f64 / from as f64).round() as usize;

    let mut out: Vec<f32> = Vec::with_capacity(expected + delay + CHUNK_SIZE);
    let mut pos = 0usize;
    while out.len() < expected + delay {
        let needed = resampler.input_frames_next();
        let mut chunk = vec![0.0f32; needed];
        if pos < samples.len() {
            let end = (pos + needed).min(samples.len());
            chunk[..end - pos].copy_from_slice(&samples[pos..end]);
        }
        pos += needed;

        let processed = resampler
            .process(std::slice::from_ref(&chunk), None)
            .map_err(|e| PipelineError::ProcessingError(format!("Resampling failed: {}", e)))?;
        if let Some(channel) = processed.first() {
            out.extend_from_slice(channel);
        }
    }

    out.drain(..delay);
    out.truncate(expected);

    log::debug!(
        "Resampled {} samples {} Hz -> {} samples {} Hz",
        samples.len(),
        from,
        out.len(),
        to
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone(freq: f32, sample_rate: u32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    fn rms(x: &[f32]) -> f32 {
        (x.iter().map(|v| v * v).sum::<f32>() / x.len() as f32).sqrt()
    }

    #[test]
    fn test_same_rate_passthrough() {
        let samples = tone(440.0, 16000, 1000);
        assert_eq!(resample(&samples, 16000, 16000).unwrap(), samples);
    }

    #[test]
    fn test_downsample_length_and_level() {
        let samples = tone(300.0, 44100, 44100);
        let out = resample(&samples, 44100, 16000).unwrap();
        assert_eq!(out.len(), 16000);
        let level = rms(&out[1000..15000]);
        assert!((level - 0.5 / 2f32.sqrt()).abs() < 0.02, "rms {}", level);
    }

    #[test]
    fn test_upsample_preserves_frequency() {
        let samples = tone(200.0, 8000, 8000);
        let out = resample(&samples, 8000, 16000).unwrap();
        assert_eq!(out.len(), 16000);
        // 0.75 s of a 200 Hz tone has 150 rising zero crossings
        let rising = out[2000..14000]
            .windows(2)
            .filter(|w| w[0] < 0.0 && w[1] >= 0.0)
            .count();
        assert!((148..=152).contains(&rising), "{} rising crossings", rising);
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(resample(&[0.0; 10], 0, 16000).is_err());
    }
}
