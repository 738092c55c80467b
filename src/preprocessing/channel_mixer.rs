//! Channel mixing utilities (multi-channel to mono conversion)

use crate::error::PipelineError;

/// Channel mixing mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelMixMode {
    /// Mean over channels
    #[default]
    Average,
    /// Per sample, keep the channel with the largest magnitude
    Dominant,
}

/// Mix interleaved samples down to mono
///
/// # Arguments
///
/// * `interleaved` - Samples laid out as `[c0, c1, ..., c0, c1, ...]`
/// * `channels` - Channel count
/// * `mode` - Mixing mode
///
/// # Returns
///
/// One sample per frame; mono input is returned as-is
pub fn downmix(interleaved: &[f32], channels: usize, mode: ChannelMixMode) -> Result<Vec<f32>, PipelineError> {
    if channels == 0 {
        return Err(PipelineError::InvalidInput("Channel count must be positive".to_string()));
    }
    if interleaved.len() % channels != 0 {
        return Err(PipelineError::InvalidInput(format!(
            "{} samples do not divide into {} channels",
            interleaved.len(),
            channels
        )));
    }
    if channels == 1 {
        return Ok(interleaved.to_vec());
    }

    log::debug!("Mixing {} channels to mono using {:?}", channels, mode);

    let mono = interleaved
        .chunks_exact(channels)
        .map(|frame| match mode {
            ChannelMixMode::Average => frame.iter().sum::<f32>() / channels as f32,
            ChannelMixMode::Dominant => frame
                .iter()
                .copied()
                .fold(0.0f32, |best, x| if x.abs() > best.abs() { x } else { best }),
        })
        .collect();

    Ok(mono)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average() {
        let stereo = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let mono = downmix(&stereo, 2, ChannelMixMode::Average).unwrap();
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_dominant_keeps_sign() {
        let stereo = [0.2, -0.9, 0.3, 0.1];
        let mono = downmix(&stereo, 2, ChannelMixMode::Dominant).unwrap();
        assert_eq!(mono, vec![-0.9, 0.3]);
    }

    #[test]
    fn test_mono_passthrough() {
        let samples = [0.1, 0.2, 0.3];
        assert_eq!(downmix(&samples, 1, ChannelMixMode::Average).unwrap(), samples.to_vec());
    }

    #[test]
    fn test_ragged_input_rejected() {
        assert!(downmix(&[0.0; 5], 2, ChannelMixMode::Average).is_err());
        assert!(downmix(&[0.0; 4], 0, ChannelMixMode::Average).is_err());
    }
}
