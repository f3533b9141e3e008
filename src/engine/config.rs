use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Engine-wide knobs that are fixed for the lifetime of an [`crate::Engine`].
///
/// ```toml
/// lookahead_secs = 0.1
/// cadence_ms = 25
/// max_voices = 64
/// seed = 7
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Output rate for offline rendering. A device session uses the
    /// device's own rate instead.
    pub sample_rate: u32,
    /// How far ahead of the audio clock notes are scheduled.
    pub lookahead_secs: f64,
    /// Scheduler wake-up interval.
    pub cadence_ms: u64,
    /// Time constant for parameter smoothing.
    pub smoothing_secs: f32,
    pub max_voices: usize,
    /// Capacity of the scheduler → renderer trigger queue.
    pub trigger_queue: usize,
    pub fft_size: usize,
    /// Seed for `Random` arp mode. Unset means seeded from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            lookahead_secs: 0.1,
            cadence_ms: 25,
            smoothing_secs: 0.05,
            max_voices: 64,
            trigger_queue: 256,
            fft_size: 256,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = EngineConfig::from_toml_str("max_voices = 8\nseed = 3").unwrap();
        assert_eq!(config.max_voices, 8);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.cadence_ms, 25);
        assert_eq!(config.lookahead_secs, 0.1);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn bad_types_are_reported() {
        let err = EngineConfig::from_toml_str("max_voices = \"lots\"");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = EngineConfig::load("/definitely/not/here.toml");
        assert!(matches!(err, Err(ConfigError::Read(_, _))));
    }
}
