/*
Look-Ahead Transport
====================

The host clock that wakes the scheduler is coarse and jittery (tens of
milliseconds). The audio clock is exact. The transport bridges the two by
scheduling every note a little before it is due:

  audio clock ─────┬──────────────┬──────────────┬──────────────→
                  now      now + lookahead
                   │◄── window ──►│
  events:   ●   ●   ●   ●   ●
                   └─ everything whose time falls inside the window is
                      emitted now, stamped with its exact start time

Each poll keeps emitting while the next event time is inside the window,
then advances it by one sixteenth at the current tempo. A tempo change
therefore only affects intervals computed after it. Events already
emitted keep their timestamps.

State is just Stopped / Running. Start resets the tick to 0 and anchors
the first event at "now". Stop resets the tick and the displayed step.
Voices already handed to the renderer are left to finish.
*/

use rand::rngs::SmallRng;
use rand::Rng;

use crate::{
    dsp::envelope::EnvelopeCurve,
    params::Settings,
    sequencing::{arpeggiator::Arpeggiator, pattern::Pattern},
    synth::message::VoiceTrigger,
};

/// Upper bound on events emitted by a single poll.
pub const MAX_EVENTS_PER_POLL: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Running,
}

pub struct Transport<R: Rng = SmallRng> {
    arp: Arpeggiator<R>,
    state: TransportState,
    tick: u64,
    current_step: usize,
    next_event_time: f64,
}

impl<R: Rng> Transport<R> {
    pub fn new(arp: Arpeggiator<R>) -> Self {
        Self {
            arp,
            state: TransportState::Stopped,
            tick: 0,
            current_step: 0,
            next_event_time: 0.0,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TransportState::Running
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Last step the arpeggiator selected.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    pub fn start(&mut self, now: f64) {
        self.tick = 0;
        self.current_step = 0;
        self.next_event_time = now;
        self.state = TransportState::Running;
    }

    pub fn stop(&mut self) {
        self.tick = 0;
        self.current_step = 0;
        self.state = TransportState::Stopped;
    }

    /// Emit every event due before `now + lookahead`. Returns how many
    /// voices were emitted.
    pub fn poll<F>(
        &mut self,
        now: f64,
        lookahead: f64,
        pattern: &Pattern,
        settings: &Settings,
        mut emit: F,
    ) -> usize
    where
        F: FnMut(VoiceTrigger),
    {
        if self.state != TransportState::Running {
            return 0;
        }

        let step_duration = settings.step_duration();
        let gate = settings.gate_duration();
        let horizon = now + lookahead;
        let mut emitted = 0;
        let mut visited = 0;

        while self.next_event_time < horizon && visited < MAX_EVENTS_PER_POLL {
            let time = self.next_event_time;

            if let Some(index) = self.arp.select(pattern, settings.arp.mode, self.tick) {
                self.current_step = index;
                if let Some(step) = pattern.get(index).filter(|s| s.active) {
                    let envelope =
                        EnvelopeCurve::generate(&settings.adsr, time, step.velocity, gate);
                    emit(VoiceTrigger {
                        time,
                        step: index,
                        velocity: step.velocity,
                        pitch: step.pitch,
                        envelope,
                    });
                    emitted += 1;
                }
            }

            self.next_event_time += step_duration;
            self.tick += 1;
            visited += 1;
        }

        emitted
    }

    /// True when the last poll stopped at the event cap with work left.
    pub fn is_behind(&self, now: f64, lookahead: f64) -> bool {
        self.is_running() && self.next_event_time < now + lookahead
    }
}
