//! One-pole parameter smoothing.

/*
Parameter Smoothing
===================

Jumping a gain or a filter cutoff from one value to another between two
samples produces a step in the waveform, which is heard as a click. Every
continuously variable parameter in the effects chain therefore chases its
target exponentially instead:

    value[n+1] = target + (value[n] - target) · c,    c = e^(-1 / (τ · fs))

τ is the time constant: after τ seconds the value has covered ~63% of the
distance, after 5τ more than 99%. With τ = 50 ms a knob twist settles in a
quarter of a second without any audible zipper.

Skipping ahead n samples has a closed form (c^n), which lets block-rate
consumers such as filter coefficients advance once per control block
instead of once per sample.
*/

#[derive(Debug, Clone, Copy)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    coeff: f32,
}

impl SmoothedParam {
    /// Start settled at `value`.
    pub fn new(value: f32, time_constant: f32, sample_rate: f32) -> Self {
        Self {
            current: value,
            target: value,
            coeff: Self::coeff_for(time_constant, sample_rate),
        }
    }

    fn coeff_for(time_constant: f32, sample_rate: f32) -> f32 {
        if time_constant <= 0.0 || sample_rate <= 0.0 {
            return 0.0;
        }
        (-1.0 / (time_constant * sample_rate)).exp()
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        self.current = self.target + (self.current - self.target) * self.coeff;
        self.current
    }

    /// Advance `samples` steps at once and return the new value.
    pub fn advance(&mut self, samples: usize) -> f32 {
        let decay = self.coeff.powi(samples as i32);
        self.current = self.target + (self.current - self.target) * decay;
        self.current
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}
