//! User-facing sound settings.
//!
//! Every struct here is plain data shared between the control side and the
//! audio thread. Setters on [`crate::Engine`] pass values through `clamped()`
//! before publishing, so the renderer can trust whatever it loads.

use serde::{Deserialize, Serialize};

use crate::dsp::envelope::Adsr;
use crate::sequencing::arpeggiator::ArpMode;

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Low-pass cutoff in Hz.
    pub lp_freq: f32,
    /// High-pass cutoff in Hz.
    pub hp_freq: f32,
    /// Resonance of the low-pass stage.
    pub q: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            lp_freq: 15_000.0,
            hp_freq: 20.0,
            q: 1.0,
        }
    }
}

impl FilterSettings {
    pub const MIN_FREQ: f32 = 20.0;
    pub const MAX_FREQ: f32 = 20_000.0;
    pub const MIN_Q: f32 = 0.1;
    pub const MAX_Q: f32 = 15.0;

    pub fn clamped(self) -> Self {
        Self {
            lp_freq: clamp_or(self.lp_freq, Self::MIN_FREQ, Self::MAX_FREQ, 15_000.0),
            hp_freq: clamp_or(self.hp_freq, Self::MIN_FREQ, Self::MAX_FREQ, 20.0),
            q: clamp_or(self.q, Self::MIN_Q, Self::MAX_Q, 1.0),
        }
    }
}

/// Three-band EQ gains in dB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqSettings {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl EqSettings {
    pub const MAX_GAIN_DB: f32 = 15.0;

    pub fn clamped(self) -> Self {
        let g = |v: f32| clamp_or(v, -Self::MAX_GAIN_DB, Self::MAX_GAIN_DB, 0.0);
        Self {
            low: g(self.low),
            mid: g(self.mid),
            high: g(self.high),
        }
    }
}

/// Chorus and flanger controls. Depths are in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModSettings {
    pub chorus_mix: f32,
    pub chorus_rate: f32,
    pub chorus_depth: f32,
    pub flanger_mix: f32,
    pub flanger_rate: f32,
    pub flanger_depth: f32,
}

impl Default for ModSettings {
    fn default() -> Self {
        Self {
            chorus_mix: 0.0,
            chorus_rate: 1.5,
            chorus_depth: 2.0,
            flanger_mix: 0.0,
            flanger_rate: 0.5,
            flanger_depth: 1.0,
        }
    }
}

impl ModSettings {
    pub fn clamped(self) -> Self {
        Self {
            chorus_mix: clamp_or(self.chorus_mix, 0.0, 1.0, 0.0),
            chorus_rate: clamp_or(self.chorus_rate, 0.1, 10.0, 1.5),
            chorus_depth: clamp_or(self.chorus_depth, 0.0, 10.0, 2.0),
            flanger_mix: clamp_or(self.flanger_mix, 0.0, 1.0, 0.0),
            flanger_rate: clamp_or(self.flanger_rate, 0.1, 5.0, 0.5),
            flanger_depth: clamp_or(self.flanger_depth, 0.0, 5.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArpSettings {
    pub mode: ArpMode,
    /// Accepted and stored, but step selection ignores it.
    pub octave_range: u8,
    /// Fraction of a sixteenth the note is held.
    pub gate: f32,
}

impl Default for ArpSettings {
    fn default() -> Self {
        Self {
            mode: ArpMode::Manual,
            octave_range: 1,
            gate: 0.8,
        }
    }
}

impl ArpSettings {
    pub fn clamped(self) -> Self {
        Self {
            mode: self.mode,
            octave_range: self.octave_range.clamp(1, 4),
            gate: clamp_or(self.gate, 0.1, 1.0, 0.8),
        }
    }
}

/// Complete sound state. One immutable snapshot of this is what the
/// scheduler and the renderer read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bpm: f32,
    pub volume: f32,
    pub adsr: Adsr,
    pub filter: FilterSettings,
    pub eq: EqSettings,
    pub modulation: ModSettings,
    pub arp: ArpSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bpm: 128.0,
            volume: 0.8,
            adsr: Adsr::default(),
            filter: FilterSettings::default(),
            eq: EqSettings::default(),
            modulation: ModSettings::default(),
            arp: ArpSettings::default(),
        }
    }
}

impl Settings {
    pub const MIN_BPM: f32 = 30.0;
    pub const MAX_BPM: f32 = 300.0;
    pub const MAX_VOLUME: f32 = 2.0;

    pub fn clamped(self) -> Self {
        Self {
            bpm: clamp_or(self.bpm, Self::MIN_BPM, Self::MAX_BPM, 128.0),
            volume: clamp_or(self.volume, 0.0, Self::MAX_VOLUME, 0.8),
            adsr: self.adsr.clamped(),
            filter: self.filter.clamped(),
            eq: self.eq.clamped(),
            modulation: self.modulation.clamped(),
            arp: self.arp.clamped(),
        }
    }

    /// Length of one sixteenth note in seconds.
    pub fn step_duration(&self) -> f64 {
        60.0 / self.bpm as f64 / 4.0
    }

    /// How long each triggered note is held.
    pub fn gate_duration(&self) -> f64 {
        self.step_duration() * self.arp.gate as f64
    }
}
