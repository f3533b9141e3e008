//! Sine low frequency oscillator for delay-time modulation.

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at sub-audio rates (0.1 - 10 Hz here). It
never reaches the output; it only moves a parameter. Both modulation
effects in the chain use one to sweep a short delay time:

    delay(t) = base + sin(2π · rate · t) · depth

The phase is kept in cycles (0.0 - 1.0) rather than radians so the wrap
is a single subtraction. The rate is passed per sample instead of stored,
because the rate itself is a smoothed parameter and may be gliding.
*/

use std::f32::consts::TAU;

#[derive(Debug, Clone, Default)]
pub struct SineLfo {
    phase: f32,
}

impl SineLfo {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Current bipolar output (-1.0 to +1.0), then advance one sample.
    #[inline]
    pub fn next(&mut self, rate_hz: f32, sample_rate: f32) -> f32 {
        let value = (self.phase * TAU).sin();
        self.phase += rate_hz / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        value
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
