use serde::{Deserialize, Serialize};

use crate::MIN_TIME;

/*
ADSR Envelope as Breakpoints
============================

The envelope for a sequenced note is fully known the moment the note is
scheduled: trigger time, velocity and gate length are all decided by the
transport ahead of time. Instead of running a gate-driven state machine on
the audio thread, the generator returns a short list of breakpoints and the
voice evaluates that curve against the audio clock.

Vocabulary
----------

  t0          Trigger time on the audio clock (seconds).

  gate        How long the note is held: seconds-per-sixteenth × gate length.
              Release begins at t0 + gate.

  breakpoint  (time, value, curve). The curve describes how the level travels
              from the previous breakpoint to this one.

  floor       Exponential curves cannot reach zero. The release ramps toward
              RELEASE_FLOOR (−60 dB) and the voice is stopped shortly after.


The Shape
---------

  Level
    vel ┐     ╱╲
        │    ╱  ╲___________
  vel·S │   ╱               │╲
        │  ╱                │ ╲_
    0.0 └─╱─────────────────┴───‾‾──→ Time
         t0  A    D    hold  t0+gate  R

    1. Step      0            at t0
    2. Linear    velocity     at t0 + A
    3. Linear    velocity·S   at t0 + A + D
    4. Step      velocity·S   at t0 + gate      (hold anchor)
    5. Exponential  floor     at t0 + gate + R


Short Gates
-----------

When the gate closes before attack + decay has finished, the curve is cut
at t0 + gate and the release starts from the level reached at that instant,
never from the sustain level. Jumping to the sustain level first would put
a step in the waveform.


Degenerate Times
----------------

Attack, decay and release are clamped to MIN_TIME (one sample at 48 kHz)
so no segment has zero length and no ramp divides by zero.
*/

/// Level the release ramp aims for (≈ −60 dB).
pub const RELEASE_FLOOR: f32 = 0.001;

/// Most breakpoints a single note can need.
pub const MAX_BREAKPOINTS: usize = 5;

/// Attack/decay/release in seconds, sustain as a fraction of velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for Adsr {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.8,
            release: 0.2,
        }
    }
}

impl Adsr {
    /// Upper bound for any single stage.
    pub const MAX_TIME: f32 = 10.0;

    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Pull every field into its valid range; NaN falls to the lower bound.
    pub fn clamped(self) -> Self {
        let time = |t: f32| {
            if t.is_nan() {
                MIN_TIME
            } else {
                t.clamp(MIN_TIME, Self::MAX_TIME)
            }
        };
        Self {
            attack: time(self.attack),
            decay: time(self.decay),
            sustain: if self.sustain.is_nan() {
                0.0
            } else {
                self.sustain.clamp(0.0, 1.0)
            },
            release: time(self.release),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    /// Jump to the value at the breakpoint's time.
    Step,
    /// Straight line from the previous breakpoint.
    Linear,
    /// Constant-ratio glide from the previous breakpoint.
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub time: f64,
    pub value: f32,
    pub curve: Curve,
}

impl Breakpoint {
    const fn new(time: f64, value: f32, curve: Curve) -> Self {
        Self { time, value, curve }
    }
}

/// Declarative amplitude curve for one note. `Copy` and fixed-size so it can
/// travel through the trigger queue without allocating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeCurve {
    points: [Breakpoint; MAX_BREAKPOINTS],
    len: usize,
    release_start: f64,
}

impl EnvelopeCurve {
    /// Build the curve for a note triggered at `t0`, peaking at `velocity`,
    /// held for `gate` seconds.
    pub fn generate(adsr: &Adsr, t0: f64, velocity: f32, gate: f64) -> Self {
        let attack = adsr.attack.max(MIN_TIME) as f64;
        let decay = adsr.decay.max(MIN_TIME) as f64;
        let release = adsr.release.max(MIN_TIME) as f64;
        let sustain_level = velocity * adsr.sustain.clamp(0.0, 1.0);
        let gate = gate.max(0.0);

        let peak_time = t0 + attack;
        let decay_end = peak_time + decay;
        let release_start = t0 + gate;

        let mut curve = Self {
            points: [Breakpoint::new(t0, 0.0, Curve::Step); MAX_BREAKPOINTS],
            len: 1,
            release_start,
        };

        let release_level = if release_start >= decay_end {
            curve.push(peak_time, velocity, Curve::Linear);
            curve.push(decay_end, sustain_level, Curve::Linear);
            curve.push(release_start, sustain_level, Curve::Step);
            sustain_level
        } else if release_start >= peak_time {
            let progress = ((release_start - peak_time) / decay) as f32;
            let level = velocity + (sustain_level - velocity) * progress;
            curve.push(peak_time, velocity, Curve::Linear);
            curve.push(release_start, level, Curve::Linear);
            level
        } else {
            let level = velocity * ((release_start - t0) / attack) as f32;
            curve.push(release_start, level, Curve::Linear);
            level
        };

        let release_end = release_start + release;
        if release_level > RELEASE_FLOOR {
            curve.push(release_end, RELEASE_FLOOR, Curve::Exponential);
        } else {
            curve.push(release_end, 0.0, Curve::Linear);
        }

        curve
    }

    fn push(&mut self, time: f64, value: f32, curve: Curve) {
        debug_assert!(self.len < MAX_BREAKPOINTS);
        self.points[self.len] = Breakpoint::new(time, value, curve);
        self.len += 1;
    }

    pub fn points(&self) -> &[Breakpoint] {
        &self.points[..self.len]
    }

    pub fn start(&self) -> f64 {
        self.points[0].time
    }

    /// Time the gate closes and release begins.
    pub fn release_start(&self) -> f64 {
        self.release_start
    }

    /// Time the release ramp reaches its floor.
    pub fn end(&self) -> f64 {
        self.points[self.len - 1].time
    }

    /// Amplitude at absolute time `t`.
    pub fn value_at(&self, t: f64) -> f32 {
        let points = self.points();
        if t < points[0].time {
            return 0.0;
        }

        for pair in points.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if t >= to.time {
                continue;
            }

            let span = to.time - from.time;
            if span <= 0.0 {
                return to.value;
            }
            let progress = ((t - from.time) / span) as f32;

            return match to.curve {
                Curve::Step => from.value,
                Curve::Linear => from.value + (to.value - from.value) * progress,
                Curve::Exponential => {
                    if from.value <= 0.0 || to.value <= 0.0 {
                        from.value + (to.value - from.value) * progress
                    } else {
                        from.value * (to.value / from.value).powf(progress)
                    }
                }
            };
        }

        points[points.len() - 1].value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adsr() -> Adsr {
        Adsr::new(0.01, 0.05, 0.5, 0.2)
    }

    #[test]
    fn starts_silent_and_peaks_at_velocity() {
        let env = EnvelopeCurve::generate(&adsr(), 1.0, 0.8, 0.5);

        assert_eq!(env.value_at(0.5), 0.0, "silent before trigger");
        assert_eq!(env.value_at(1.0), 0.0, "zero at t0");
        assert!((env.value_at(1.01) - 0.8).abs() < 1e-4, "peak after attack");
        assert!((env.value_at(1.005) - 0.4).abs() < 1e-3, "linear attack midpoint");
    }

    #[test]
    fn decays_to_and_holds_sustain() {
        let env = EnvelopeCurve::generate(&adsr(), 0.0, 1.0, 0.5);

        assert!((env.value_at(0.06) - 0.5).abs() < 1e-4);
        assert!((env.value_at(0.3) - 0.5).abs() < 1e-4);
        assert!((env.value_at(0.4999) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn release_is_exponential_toward_floor() {
        let env = EnvelopeCurve::generate(&adsr(), 0.0, 1.0, 0.5);

        let mid = env.value_at(0.6);
        let expected = 0.5 * (RELEASE_FLOOR / 0.5).powf(0.5);
        assert!((mid - expected).abs() < 1e-4, "got {} expected {}", mid, expected);

        let end = env.value_at(0.7);
        assert!((end - RELEASE_FLOOR).abs() < 1e-6);
        assert!(env.value_at(5.0) > 0.0, "never exactly zero");
        assert_eq!(env.end(), 0.7);
    }

    #[test]
    fn breakpoints_follow_the_four_segments() {
        let env = EnvelopeCurve::generate(&adsr(), 2.0, 1.0, 0.5);
        let curves: Vec<Curve> = env.points().iter().map(|p| p.curve).collect();

        assert_eq!(
            curves,
            vec![
                Curve::Step,
                Curve::Linear,
                Curve::Linear,
                Curve::Step,
                Curve::Exponential
            ]
        );
        assert_eq!(env.start(), 2.0);
        assert_eq!(env.release_start(), 2.5);
    }

    #[test]
    fn short_gate_releases_from_current_level() {
        // Gate closes halfway through the attack.
        let env = EnvelopeCurve::generate(&adsr(), 0.0, 1.0, 0.005);

        assert_eq!(env.points().len(), 3);
        let at_release = env.value_at(0.005);
        assert!((at_release - 0.5).abs() < 1e-3, "got {}", at_release);
        assert!(env.value_at(0.1) < at_release);
    }

    #[test]
    fn gate_inside_decay_interpolates_level() {
        let env = EnvelopeCurve::generate(&adsr(), 0.0, 1.0, 0.035);
        // Halfway through decay: 1.0 → 0.5
        assert!((env.value_at(0.035) - 0.75).abs() < 1e-3);
    }

    #[test]
    fn zero_sustain_releases_linearly_to_zero() {
        let env = EnvelopeCurve::generate(&Adsr::new(0.01, 0.01, 0.0, 0.1), 0.0, 1.0, 0.5);
        let last = env.points()[env.points().len() - 1];
        assert_eq!(last.curve, Curve::Linear);
        assert_eq!(env.value_at(1.0), 0.0);
    }

    #[test]
    fn degenerate_times_are_clamped() {
        let env = EnvelopeCurve::generate(&Adsr::new(0.0, -1.0, 0.5, 0.0), 0.0, 1.0, 0.1);

        for pair in env.points().windows(2) {
            assert!(pair[1].time >= pair[0].time);
        }
        for i in 0..200 {
            let v = env.value_at(i as f64 * 0.001);
            assert!(v.is_finite() && (0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn generation_is_pure() {
        let a = EnvelopeCurve::generate(&adsr(), 3.25, 0.7, 0.09);
        let b = EnvelopeCurve::generate(&adsr(), 3.25, 0.7, 0.09);
        assert_eq!(a, b);
    }

    #[test]
    fn clamped_adsr_stays_in_range() {
        let adsr = Adsr::new(-1.0, 50.0, 1.5, f32::NAN).clamped();
        assert_eq!(adsr.attack, MIN_TIME);
        assert_eq!(adsr.decay, Adsr::MAX_TIME);
        assert_eq!(adsr.sustain, 1.0);
        assert_eq!(adsr.release, MIN_TIME);
    }
}
