/*
Step Pattern
============

A pattern is sixteen steps on a sixteenth-note grid: one bar of 4/4.
Position in the array is position in the bar.

    index:   0  1  2  3  4  5  6  7  8  9 10 11 12 13 14 15
    active:  x  .  .  x  .  .  x  .  x  .  .  x  .  .  x  .
    pitch:   0        7        3     12       -5        0

Each step carries its own velocity (0.0 - 1.0) and a pitch offset in
semitones (-12 to +12) applied as a playback-rate change on the sample.

The store hands out whole-pattern snapshots. An edit builds a new pattern
and swaps it in atomically, so a reader sees either the old bar or the new
one, never half of each.
*/

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

/// Steps in one pattern.
pub const STEPS: usize = 16;

pub const MIN_PITCH: i8 = -12;
pub const MAX_PITCH: i8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub active: bool,
    pub velocity: f32,
    /// Semitone offset from the sample's natural pitch.
    pub pitch: i8,
}

impl Default for Step {
    fn default() -> Self {
        Self {
            active: false,
            velocity: 0.8,
            pitch: 0,
        }
    }
}

impl Step {
    pub fn on(velocity: f32, pitch: i8) -> Self {
        Self {
            active: true,
            velocity,
            pitch,
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            active: self.active,
            velocity: if self.velocity.is_nan() {
                0.0
            } else {
                self.velocity.clamp(0.0, 1.0)
            },
            pitch: self.pitch.clamp(MIN_PITCH, MAX_PITCH),
        }
    }

    /// Playback-rate multiplier for this step's pitch.
    pub fn rate(&self) -> f64 {
        2f64.powf(self.pitch as f64 / 12.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern {
    steps: [Step; STEPS],
}

impl Pattern {
    pub fn new(steps: [Step; STEPS]) -> Self {
        Self {
            steps: steps.map(Step::clamped),
        }
    }

    /// Sixteen inactive steps at velocity 0.8, pitch 0.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[Step; STEPS] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn set(&mut self, index: usize, step: Step) -> bool {
        match self.steps.get_mut(index) {
            Some(slot) => {
                *slot = step.clamped();
                true
            }
            None => false,
        }
    }

    /// Grid indices of the active steps, in grid order.
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .map(|(i, _)| i)
    }

    pub fn has_active_steps(&self) -> bool {
        self.steps.iter().any(|s| s.active)
    }
}

/// Shared, atomically replaceable pattern.
pub struct PatternStore {
    current: ArcSwap<Pattern>,
}

impl PatternStore {
    pub fn new(pattern: Pattern) -> Self {
        Self {
            current: ArcSwap::from_pointee(pattern),
        }
    }

    /// Consistent view of the whole pattern.
    pub fn snapshot(&self) -> Arc<Pattern> {
        self.current.load_full()
    }

    pub fn get(&self, index: usize) -> Option<Step> {
        self.current.load().get(index).copied()
    }

    pub fn replace(&self, pattern: Pattern) {
        self.current.store(Arc::new(Pattern::new(pattern.steps)));
    }

    /// Edit a single step. Returns false if `index` is off the grid.
    pub fn set(&self, index: usize, step: Step) -> bool {
        if index >= STEPS {
            return false;
        }
        self.current.rcu(|current| {
            let mut next = **current;
            next.set(index, step);
            next
        });
        true
    }
}

impl Default for PatternStore {
    fn default() -> Self {
        Self::new(Pattern::empty())
    }
}
