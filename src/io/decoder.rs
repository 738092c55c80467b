//! Audio decoding using Symphonia

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::PipelineError;
use crate::preprocessing::channel_mixer::{downmix, ChannelMixMode};

/// Decoded mono PCM
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples in [-1, 1]
    pub samples: Vec<f32>,

    /// Native sample rate of the file
    pub sample_rate: u32,

    /// Channel count before downmixing
    pub channels: usize,
}

impl DecodedAudio {
    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode an audio file to mono PCM
///
/// The container is probed from the file contents (the extension is only a
/// hint). Multi-channel audio is averaged down to mono.
///
/// # Arguments
///
/// * `path` - Path to audio file
///
/// # Errors
///
/// `Io` if the file cannot be opened, `DecodingError` if no decodable track
/// is found or decoding fails
pub fn decode_audio(path: &Path) -> Result<DecodedAudio, PipelineError> {
    decode_audio_with_mode(path, ChannelMixMode::Average)
}

/// Decode an audio file, downmixing with the given mode
pub fn decode_audio_with_mode(path: &Path, mode: ChannelMixMode) -> Result<DecodedAudio, PipelineError> {
    log::debug!("Decoding audio file: {}", path.display());

    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| PipelineError::DecodingError(format!("{}: {}", path.display(), e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PipelineError::DecodingError(format!("{}: no supported audio track", path.display())))?;
    let track_id = track.id;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| PipelineError::DecodingError(format!("{}: unknown sample rate", path.display())))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| PipelineError::DecodingError(format!("{}: {}", path.display(), e)))?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(0);
    let mut buffer: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(PipelineError::DecodingError(format!("{}: {}", path.display(), e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                channels = spec.channels.count();
                let buf = buffer.get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, spec));
                if buf.capacity() < decoded.capacity() * channels {
                    *buf = SampleBuffer::new(decoded.capacity() as u64, spec);
                }
                buf.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(buf.samples());
            }
            Err(SymphoniaError::DecodeError(e)) => {
                // Corrupted packet: skip it and keep going
                log::warn!("{}: skipping undecodable packet: {}", path.display(), e);
            }
            Err(e) => return Err(PipelineError::DecodingError(format!("{}: {}", path.display(), e))),
        }
    }

    if channels == 0 {
        return Err(PipelineError::DecodingError(format!(
            "{}: no audio frames decoded",
            path.display()
        )));
    }

    let samples = downmix(&interleaved, channels, mode)?;

    log::debug!(
        "Decoded {}: {} samples at {} Hz, {} channel(s)",
        path.display(),
        samples.len(),
        sample_rate,
        channels
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: &[Vec<f32>]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for frame in frames {
            for &s in frame {
                writer.write_sample((s * 32767.0) as i16).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decode_mono_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let frames: Vec<Vec<f32>> = (0..8000)
            .map(|i| vec![0.5 * (2.0 * PI * 220.0 * i as f32 / 8000.0).sin()])
            .collect();
        write_wav(&path, 1, 8000, &frames);

        let audio = decode_audio(&path).unwrap();
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.samples.len(), 8000);
        assert!((audio.duration() - 1.0).abs() < 1e-9);
        assert!((audio.samples[100] - frames[100][0]).abs() < 1e-3);
    }

    #[test]
    fn test_decode_stereo_is_averaged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let frames: Vec<Vec<f32>> = (0..1600).map(|_| vec![0.5, -0.25]).collect();
        write_wav(&path, 2, 16000, &frames);

        let audio = decode_audio(&path).unwrap();
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.samples.len(), 1600);
        assert!(audio.samples.iter().all(|&s| (s - 0.125).abs() < 1e-3));
    }

    #[test]
    fn test_missing_file() {
        let err = decode_audio(Path::new("/nonexistent/recording.wav")).unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.wav");
        std::fs::write(&path, b"definitely not audio").unwrap();
        assert!(matches!(decode_audio(&path), Err(PipelineError::DecodingError(_))));
    }
}
