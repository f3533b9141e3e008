use std::io::Cursor;

use hound::{SampleFormat, WavReader};

use crate::error::DecodeError;

/// One decoded sample, held in memory for the lifetime of the voices that
/// play it.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    /// Interleaved frames as decoded.
    samples: Vec<f32>,
    /// Channel average, one value per frame. This is what voices read.
    mono: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Wrap already-decoded interleaved PCM.
    pub fn from_interleaved(
        samples: Vec<f32>,
        channels: u16,
        sample_rate: u32,
    ) -> Result<Self, DecodeError> {
        if channels == 0 || sample_rate == 0 {
            return Err(DecodeError::Corrupt(format!(
                "{} channels at {} Hz",
                channels, sample_rate
            )));
        }
        let frames = samples.len() / channels as usize;
        if frames == 0 {
            return Err(DecodeError::Empty);
        }

        let mono = samples
            .chunks_exact(channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        Ok(Self {
            samples,
            mono,
            channels,
            sample_rate,
        })
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.mono.len()
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn interleaved(&self) -> &[f32] {
        &self.samples
    }

    pub fn mono(&self) -> &[f32] {
        &self.mono
    }

    /// Linearly interpolated mono value at a fractional frame position.
    /// Outside the buffer reads as silence.
    #[inline]
    pub fn read_interpolated(&self, position: f64) -> f32 {
        if position < 0.0 {
            return 0.0;
        }
        let idx = position as usize;
        let Some(&a) = self.mono.get(idx) else {
            return 0.0;
        };
        let b = self.mono.get(idx + 1).copied().unwrap_or(0.0);
        let frac = (position - idx as f64) as f32;
        a + (b - a) * frac
    }
}

/// Decode WAV bytes (8/16/24/32-bit integer or 32-bit float PCM).
pub fn decode_sample(bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let reader = WavReader::new(Cursor::new(bytes)).map_err(map_hound_error)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            if !(8..=32).contains(&spec.bits_per_sample) {
                return Err(DecodeError::Unsupported(format!(
                    "{}-bit integer PCM",
                    spec.bits_per_sample
                )));
            }
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<_, _>>()
                .map_err(map_hound_error)?
        }
        SampleFormat::Float => {
            if spec.bits_per_sample != 32 {
                return Err(DecodeError::Unsupported(format!(
                    "{}-bit float PCM",
                    spec.bits_per_sample
                )));
            }
            reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(map_hound_error)?
        }
    };

    SampleBuffer::from_interleaved(samples, spec.channels, spec.sample_rate)
}

fn map_hound_error(err: hound::Error) -> DecodeError {
    match err {
        hound::Error::Unsupported | hound::Error::InvalidSampleFormat => {
            DecodeError::Unsupported(err.to_string())
        }
        other => DecodeError::Corrupt(other.to_string()),
    }
}
