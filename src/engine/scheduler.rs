/*
Scheduler Thread
================

A dedicated thread wakes on a fixed cadence and asks the transport for
every note due within the look-ahead window. Notes travel to the audio
thread through a lock-free queue, already stamped with their start time.

  control thread           scheduler thread              audio thread
  ──────────────           ────────────────              ────────────
  start() ──spawn──►  poll ─ tick(25ms) ─ poll ─ ...
                        │                     │
                        └── VoiceTrigger ─────┴──► rtrb ──► VoicePool
  stop()  ──drop cancel──► exits loop, hands the sequencer back

The thread owns the transport and the queue producer while it runs.
Stopping drops the cancel sender, which wakes the select immediately;
join returns the sequencer so the next start reuses the same queue.

Every poll reads one settings snapshot and one pattern snapshot, so a
poll never sees half an update.
*/

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use arc_swap::ArcSwap;
use crossbeam_channel::{select, Receiver, Sender};
use log::{debug, error, info, warn};
use rtrb::Producer;

use crate::{
    engine::clock::AudioClock,
    error::Error,
    params::Settings,
    sequencing::{pattern::PatternStore, transport::Transport},
    synth::message::VoiceTrigger,
};

const TARGET: &str = "arpgen::scheduler";

/// Values published for display.
#[derive(Debug)]
pub struct Telemetry {
    current_step: AtomicI32,
    running: AtomicBool,
}

impl Telemetry {
    pub fn new() -> Self {
        Self {
            current_step: AtomicI32::new(0),
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Last selected step, or -1 while stopped.
    pub fn current_step_index(&self) -> i32 {
        if self.is_running() {
            self.current_step.load(Ordering::Acquire)
        } else {
            -1
        }
    }

    fn publish_step(&self, step: usize) {
        self.current_step.store(step as i32, Ordering::Release);
    }

    fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Release);
        if !running {
            self.current_step.store(0, Ordering::Release);
        }
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared between the engine handle and the scheduler thread.
#[derive(Clone)]
pub struct SchedulerShared {
    pub settings: Arc<ArcSwap<Settings>>,
    pub pattern: Arc<PatternStore>,
    pub clock: Arc<dyn AudioClock>,
    pub telemetry: Arc<Telemetry>,
}

/// The transport plus the producer end of the trigger queue.
pub struct Sequencer {
    transport: Transport,
    tx: Producer<VoiceTrigger>,
}

impl Sequencer {
    pub fn new(transport: Transport, tx: Producer<VoiceTrigger>) -> Self {
        Self { transport, tx }
    }

    fn poll(&mut self, shared: &SchedulerShared, lookahead: f64) {
        let settings = shared.settings.load();
        let pattern = shared.pattern.snapshot();
        let now = shared.clock.now();

        let Sequencer { transport, tx } = self;
        let mut dropped = 0usize;
        let emitted = transport.poll(now, lookahead, &pattern, &settings, |trigger| {
            if tx.push(trigger).is_err() {
                dropped += 1;
            }
        });

        if dropped > 0 {
            warn!(target: TARGET, "trigger queue full, dropped {dropped} of {emitted} notes");
        }
        if transport.is_behind(now, lookahead) {
            warn!(target: TARGET, "scheduler is behind the audio clock at {now:.3}s");
        }
        shared.telemetry.publish_step(transport.current_step());
    }
}

pub struct Scheduler {
    shared: SchedulerShared,
    lookahead: f64,
    cadence: Duration,
    idle: Option<Sequencer>,
    running: Option<(Sender<()>, JoinHandle<Sequencer>)>,
}

impl Scheduler {
    pub fn new(
        sequencer: Sequencer,
        shared: SchedulerShared,
        lookahead: f64,
        cadence: Duration,
    ) -> Self {
        Self {
            shared,
            lookahead,
            cadence,
            idle: Some(sequencer),
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Reset the transport to tick 0 at the current audio time and begin
    /// polling. Restarts if already running.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.is_running() {
            self.stop();
        }
        let mut sequencer = self
            .idle
            .take()
            .ok_or_else(|| Error::Scheduler("sequencer state was lost".into()))?;

        let now = self.shared.clock.now();
        sequencer.transport.start(now);
        self.shared.telemetry.publish_step(0);
        self.shared.telemetry.set_running(true);

        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(0);
        let shared = self.shared.clone();
        let lookahead = self.lookahead;
        let cadence = self.cadence;

        let spawned = thread::Builder::new()
            .name("arpgen-scheduler".into())
            .spawn(move || run(sequencer, shared, cancel_rx, lookahead, cadence));

        match spawned {
            Ok(handle) => {
                info!(target: TARGET, "transport started at {now:.3}s");
                self.running = Some((cancel_tx, handle));
                Ok(())
            }
            Err(e) => {
                self.shared.telemetry.set_running(false);
                Err(Error::Scheduler(format!("failed to spawn scheduler thread: {e}")))
            }
        }
    }

    /// Halt polling between cadence ticks. Voices already queued play out.
    pub fn stop(&mut self) {
        let Some((cancel, handle)) = self.running.take() else {
            return;
        };
        drop(cancel);

        match handle.join() {
            Ok(mut sequencer) => {
                sequencer.transport.stop();
                self.idle = Some(sequencer);
            }
            Err(_) => error!(target: TARGET, "scheduler thread panicked"),
        }
        self.shared.telemetry.set_running(false);
        info!(target: TARGET, "transport stopped");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    mut sequencer: Sequencer,
    shared: SchedulerShared,
    cancel: Receiver<()>,
    lookahead: f64,
    cadence: Duration,
) -> Sequencer {
    let ticker = crossbeam_channel::tick(cadence);
    debug!(target: TARGET, "polling every {cadence:?}, lookahead {lookahead}s");

    sequencer.poll(&shared, lookahead);
    loop {
        select! {
            recv(cancel) -> _ => break,
            recv(ticker) -> _ => sequencer.poll(&shared, lookahead),
        }
    }
    sequencer
}
