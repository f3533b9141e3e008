//! Audio device session (feature `device`).

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use log::{info, warn};

use crate::{
    engine::{Engine, EngineConfig},
    error::Error,
};

/// An open output stream driving a [`crate::Renderer`].
///
/// The stream stops when the session is dropped or closed.
pub struct AudioSession {
    stream: cpal::Stream,
    sample_rate: f32,
    channels: usize,
}

impl AudioSession {
    /// Open the default output device and build an engine at its rate.
    pub fn open(config: &EngineConfig) -> Result<(AudioSession, Engine), Error> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Device("no default output device available".into()))?;
        let supported = device
            .default_output_config()
            .map_err(|e| Error::Device(format!("failed to fetch default output config: {e}")))?;

        if supported.sample_format() != SampleFormat::F32 {
            return Err(Error::Device(format!(
                "unsupported sample format {:?}",
                supported.sample_format()
            )));
        }

        let sample_rate = supported.sample_rate().0 as f32;
        let channels = supported.channels() as usize;
        let (engine, mut renderer) = Engine::new(config, sample_rate);

        let stream = device
            .build_output_stream(
                &supported.into(),
                move |data: &mut [f32], _| renderer.render_interleaved(data, channels),
                |err| warn!(target: "arpgen::engine", "audio stream error: {err}"),
                None,
            )
            .map_err(|e| Error::Device(format!("failed to build output stream: {e}")))?;

        stream
            .play()
            .map_err(|e| Error::Device(format!("failed to start output stream: {e}")))?;

        info!(
            target: "arpgen::engine",
            "audio device open: {sample_rate} Hz, {channels} ch"
        );

        Ok((
            AudioSession {
                stream,
                sample_rate,
                channels,
            },
            engine,
        ))
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Stop the stream and release the device.
    pub fn close(self) {
        if let Err(e) = self.stream.pause() {
            warn!(target: "arpgen::engine", "failed to pause stream: {e}");
        }
    }
}
