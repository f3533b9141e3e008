/*
Arpeggiator
===========

The arpeggiator decides which grid step sounds on each tick. The tick is a
global sixteenth-note counter that only the transport resets.

Modes
-----

  Manual   Play the grid as written: step = tick mod 16. Inactive steps are
           still selected; they just make no sound.

  Up       Walk the active steps from lowest pitch to highest.
  Down     Same list, highest to lowest.
  UpDown   Up then down without repeating either end:
               A B C B A B C B ...     (period 2N - 2)
  Random   Any active step, uniformly.

For the pitch-ordered modes, active steps are sorted by pitch and ties are
broken by grid index, so two steps at the same pitch always play in grid
order.

  grid:    idx 2 (pitch +3)   idx 7 (pitch -5)   idx 9 (pitch 0)
  sorted:  7, 9, 2
  Up:      7 9 2 7 9 2 ...
  Down:    2 9 7 2 9 7 ...

With no active steps every mode except Manual selects nothing.

Selection never allocates: the active list is at most sixteen entries and
lives on the stack.
*/

use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::sequencing::pattern::{Pattern, STEPS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArpMode {
    #[default]
    Manual,
    Up,
    Down,
    UpDown,
    Random,
}

impl ArpMode {
    pub const ALL: [ArpMode; 5] = [
        ArpMode::Manual,
        ArpMode::Up,
        ArpMode::Down,
        ArpMode::UpDown,
        ArpMode::Random,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArpMode::Manual => "Manual",
            ArpMode::Up => "Up",
            ArpMode::Down => "Down",
            ArpMode::UpDown => "UpDown",
            ArpMode::Random => "Random",
        }
    }
}

impl fmt::Display for ArpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArpMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArpMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown arp mode '{s}'"))
    }
}

pub struct Arpeggiator<R: Rng = SmallRng> {
    rng: R,
}

impl Arpeggiator<SmallRng> {
    /// Seeded from the OS.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_os_rng())
    }

    /// Reproducible `Random` sequences.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl Default for Arpeggiator<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Arpeggiator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Grid index to play on `tick`, or `None` when nothing is eligible.
    pub fn select(&mut self, pattern: &Pattern, mode: ArpMode, tick: u64) -> Option<usize> {
        let mut active = [0usize; STEPS];
        let mut n = 0;
        if mode != ArpMode::Manual {
            for index in pattern.active_indices() {
                active[n] = index;
                n += 1;
            }
            if n == 0 {
                return None;
            }
        }

        match mode {
            ArpMode::Manual => Some((tick % STEPS as u64) as usize),
            ArpMode::Random => Some(active[self.rng.random_range(0..n)]),
            ArpMode::Up | ArpMode::Down | ArpMode::UpDown => {
                let sorted = &mut active[..n];
                sorted.sort_unstable_by_key(|&i| (pattern.steps()[i].pitch, i));
                Some(sorted[traversal_position(mode, tick, n as u64) as usize])
            }
        }
    }
}

/// Position in the pitch-sorted list of `n` active steps.
fn traversal_position(mode: ArpMode, tick: u64, n: u64) -> u64 {
    match mode {
        ArpMode::Down => n - 1 - (tick % n),
        ArpMode::UpDown => {
            let period = (2 * n).saturating_sub(2).max(1);
            let idx = tick % period;
            if idx < n {
                idx
            } else {
                period - idx
            }
        }
        _ => tick % n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencing::pattern::Step;

    fn pattern_with(steps: &[(usize, i8)]) -> Pattern {
        let mut pattern = Pattern::empty();
        for &(index, pitch) in steps {
            pattern.set(index, Step::on(1.0, pitch));
        }
        pattern
    }

    fn run(arp: &mut Arpeggiator, pattern: &Pattern, mode: ArpMode, ticks: u64) -> Vec<usize> {
        (0..ticks)
            .filter_map(|t| arp.select(pattern, mode, t))
            .collect()
    }

    #[test]
    fn manual_walks_the_grid_regardless_of_activity() {
        let mut arp = Arpeggiator::seeded(1);
        let empty = Pattern::empty();
        for t in 0..40 {
            assert_eq!(arp.select(&empty, ArpMode::Manual, t), Some((t % 16) as usize));
        }
    }

    #[test]
    fn up_and_down_follow_pitch_order() {
        let mut arp = Arpeggiator::seeded(1);
        let pattern = pattern_with(&[(2, 3), (7, -5), (9, 0)]);

        assert_eq!(run(&mut arp, &pattern, ArpMode::Up, 4), vec![7, 9, 2, 7]);
        assert_eq!(run(&mut arp, &pattern, ArpMode::Down, 4), vec![2, 9, 7, 2]);
    }

    #[test]
    fn up_down_bounces_without_repeating_ends() {
        let mut arp = Arpeggiator::seeded(1);
        let pattern = pattern_with(&[(2, 3), (7, -5), (9, 0)]);

        assert_eq!(
            run(&mut arp, &pattern, ArpMode::UpDown, 8),
            vec![7, 9, 2, 9, 7, 9, 2, 9]
        );
    }

    #[test]
    fn single_note_up_down_repeats() {
        let mut arp = Arpeggiator::seeded(1);
        let pattern = pattern_with(&[(4, 0)]);
        assert_eq!(run(&mut arp, &pattern, ArpMode::UpDown, 3), vec![4, 4, 4]);
    }

    #[test]
    fn equal_pitches_keep_grid_order() {
        let mut arp = Arpeggiator::seeded(1);
        let pattern = pattern_with(&[(12, 0), (3, 0), (8, 0)]);
        assert_eq!(run(&mut arp, &pattern, ArpMode::Up, 3), vec![3, 8, 12]);
    }

    #[test]
    fn no_active_steps_selects_nothing() {
        let mut arp = Arpeggiator::seeded(1);
        let empty = Pattern::empty();
        for mode in [ArpMode::Up, ArpMode::Down, ArpMode::UpDown, ArpMode::Random] {
            for t in 0..32 {
                assert_eq!(arp.select(&empty, mode, t), None, "{mode} tick {t}");
            }
        }
    }

    #[test]
    fn random_is_reproducible_and_stays_on_active_steps() {
        let pattern = pattern_with(&[(1, 0), (5, 2), (11, -3)]);
        let a = run(&mut Arpeggiator::seeded(42), &pattern, ArpMode::Random, 64);
        let b = run(&mut Arpeggiator::seeded(42), &pattern, ArpMode::Random, 64);

        assert_eq!(a, b);
        assert!(a.iter().all(|i| [1, 5, 11].contains(i)));

        let long = run(&mut Arpeggiator::seeded(42), &pattern, ArpMode::Random, 256);
        for index in [1, 5, 11] {
            assert!(long.contains(&index), "step {index} never drawn in 256 ticks");
        }
    }

    #[test]
    fn modes_parse_case_insensitively() {
        assert_eq!("updown".parse::<ArpMode>(), Ok(ArpMode::UpDown));
        assert_eq!("Random".parse::<ArpMode>(), Ok(ArpMode::Random));
        assert!("sideways".parse::<ArpMode>().is_err());
    }
}
