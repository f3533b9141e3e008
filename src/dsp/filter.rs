use std::f32::consts::PI;

use crate::graph::node::RenderCtx;

/*
| type        | passes                  | shapes                              |
| ----------- | ----------------------- | ----------------------------------- |
| low-pass    | below cutoff            | rejects above                       |
| high-pass   | above cutoff            | rejects below                       |
| low shelf   | everything              | boosts/cuts below corner by gain dB |
| peak (bell) | everything              | boosts/cuts around centre by gain   |
| high shelf  | everything              | boosts/cuts above corner by gain dB |

All five responses come out of the same two-integrator TPT core. Each
response is a linear mix of the input (v0), the band output (v1) and the
low output (v2):

    out = m0·v0 + m1·v1 + m2·v2

so switching response only changes three coefficients, never the state.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    LowPass,
    HighPass,
    LowShelf,
    Peak,
    HighShelf,
}

/// Per-block coefficients, recomputed whenever cutoff, Q or gain move.
#[derive(Debug, Clone, Copy)]
pub struct SvfCoeffs {
    g: f32,
    k: f32,
    m0: f32,
    m1: f32,
    m2: f32,
}

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub q: f32,
    pub gain_db: f32, // shelves and peak only
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: 1000.0,
            q: 0.707,
            gain_db: 0.0,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            cutoff_hz,
            ..Self::new(FilterType::LowPass)
        }
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self {
            cutoff_hz,
            ..Self::new(FilterType::HighPass)
        }
    }

    pub fn low_shelf(cutoff_hz: f32, gain_db: f32) -> Self {
        Self {
            cutoff_hz,
            gain_db,
            ..Self::new(FilterType::LowShelf)
        }
    }

    pub fn peak(cutoff_hz: f32, q: f32, gain_db: f32) -> Self {
        Self {
            cutoff_hz,
            q,
            gain_db,
            ..Self::new(FilterType::Peak)
        }
    }

    pub fn high_shelf(cutoff_hz: f32, gain_db: f32) -> Self {
        Self {
            cutoff_hz,
            gain_db,
            ..Self::new(FilterType::HighShelf)
        }
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn coefficients(&self, ctx: &RenderCtx) -> SvfCoeffs {
        // Keep the warped cutoff strictly below Nyquist so tan() stays finite.
        let cutoff = self.cutoff_hz.clamp(1.0, ctx.sample_rate * 0.49);
        let warped = (PI * cutoff / ctx.sample_rate).tan();
        let q = self.q.max(0.01);
        let a = 10.0_f32.powf(self.gain_db / 40.0);

        let (g, k, m0, m1, m2) = match self.filter_type {
            FilterType::LowPass => (warped, 1.0 / q, 0.0, 0.0, 1.0),
            FilterType::HighPass => (warped, 1.0 / q, 1.0, -1.0 / q, -1.0),
            FilterType::Peak => {
                let k = 1.0 / (q * a);
                (warped, k, 1.0, k * (a * a - 1.0), 0.0)
            }
            FilterType::LowShelf => {
                let k = 1.0 / q;
                (warped / a.sqrt(), k, 1.0, k * (a - 1.0), a * a - 1.0)
            }
            FilterType::HighShelf => {
                let k = 1.0 / q;
                (warped * a.sqrt(), k, a * a, k * (1.0 - a) * a, 1.0 - a * a)
            }
        };

        SvfCoeffs { g, k, m0, m1, m2 }
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, c: &SvfCoeffs) -> f32 {
        let h = 1.0 / (1.0 + c.g * (c.g + c.k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + c.g * v3);
        let v2 = self.ic2eq + c.g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        c.m0 * sample + c.m1 * v1 + c.m2 * v2
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let coeffs = self.coefficients(ctx);
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, &coeffs);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q;
    }

    pub fn set_gain_db(&mut self, gain_db: f32) {
        self.gain_db = gain_db;
    }
}
