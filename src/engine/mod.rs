//! The engine aggregate and its real-time half.
//!
//! [`Engine::new`] builds everything once and splits it in two:
//!
//! - [`Engine`] stays on the control side. It owns the settings, the
//!   pattern, the loaded sample, the scheduler thread and the spectrum
//!   analyzer. Every setter clamps and publishes an immutable snapshot.
//! - [`Renderer`] goes to the audio callback. It owns the voice pool and
//!   the effects chain and never allocates, locks or logs.

pub mod clock;
pub mod config;
pub mod scheduler;
#[cfg(feature = "device")]
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use arc_swap::{ArcSwap, ArcSwapOption};
use log::{debug, info, warn};
use rtrb::RingBuffer;

use crate::{
    dsp::envelope::Adsr,
    error::{DecodeError, Error},
    graph::{
        analyser::{analysis_pair, SpectrumAnalyzer},
        chain::EffectsChain,
    },
    io::decode::{decode_sample, SampleBuffer},
    params::{ArpSettings, EqSettings, FilterSettings, ModSettings, Settings},
    sequencing::{
        arpeggiator::{ArpMode, Arpeggiator},
        generative::{generate_pattern, try_generate_pattern, PatternService},
        pattern::{Pattern, PatternStore, Step},
        transport::Transport,
    },
    synth::poly::{SampleSlot, VoicePool},
    MAX_BLOCK_SIZE,
};

pub use self::clock::{AudioClock, FrameClock, ManualClock};
pub use self::config::EngineConfig;
use self::scheduler::{Scheduler, SchedulerShared, Sequencer, Telemetry};

const TARGET: &str = "arpgen::engine";

pub struct Engine {
    settings: Arc<ArcSwap<Settings>>,
    pattern: Arc<PatternStore>,
    sample: SampleSlot,
    telemetry: Arc<Telemetry>,
    scheduler: Scheduler,
    analyzer: SpectrumAnalyzer,
    sample_rate: f32,
}

impl Engine {
    /// Build an engine whose scheduler follows the renderer's frame count.
    pub fn new(config: &EngineConfig, sample_rate: f32) -> (Engine, Renderer) {
        let frames = FrameClock::new(sample_rate);
        let clock: Arc<dyn AudioClock> = Arc::new(frames.clone());
        Self::build(config, sample_rate, clock, frames)
    }

    /// Build an engine for rendering without a device, at
    /// `config.sample_rate`.
    pub fn offline(config: &EngineConfig) -> (Engine, Renderer) {
        Self::new(config, config.sample_rate.max(1) as f32)
    }

    /// Build an engine whose scheduler reads `clock` instead. The renderer
    /// still counts its own frames for voice placement.
    pub fn with_clock(
        config: &EngineConfig,
        sample_rate: f32,
        clock: Arc<dyn AudioClock>,
    ) -> (Engine, Renderer) {
        Self::build(config, sample_rate, clock, FrameClock::new(sample_rate))
    }

    fn build(
        config: &EngineConfig,
        sample_rate: f32,
        clock: Arc<dyn AudioClock>,
        frames: FrameClock,
    ) -> (Engine, Renderer) {
        let initial = Settings::default();
        let settings = Arc::new(ArcSwap::from_pointee(initial));
        let pattern = Arc::new(PatternStore::default());
        let sample: SampleSlot = Arc::new(ArcSwapOption::empty());
        let telemetry = Arc::new(Telemetry::new());

        let (tx, rx) = RingBuffer::new(config.trigger_queue.max(1));
        let arp = match config.seed {
            Some(seed) => Arpeggiator::seeded(seed),
            None => Arpeggiator::new(),
        };
        let sequencer = Sequencer::new(Transport::new(arp), tx);
        let shared = SchedulerShared {
            settings: Arc::clone(&settings),
            pattern: Arc::clone(&pattern),
            clock,
            telemetry: Arc::clone(&telemetry),
        };
        let scheduler = Scheduler::new(
            sequencer,
            shared,
            config.lookahead_secs,
            Duration::from_millis(config.cadence_ms.max(1)),
        );

        let (tap, analyzer) = analysis_pair(config.fft_size, sample_rate);
        let chain = EffectsChain::new(&initial, config.smoothing_secs, sample_rate, tap);
        let pool = VoicePool::new(config.max_voices, rx, Arc::clone(&sample), sample_rate);

        debug!(
            target: TARGET,
            "engine built: {sample_rate} Hz, {} voices, lookahead {}s",
            config.max_voices,
            config.lookahead_secs
        );

        let engine = Engine {
            settings: Arc::clone(&settings),
            pattern,
            sample,
            telemetry,
            scheduler,
            analyzer,
            sample_rate,
        };
        let renderer = Renderer {
            pool,
            chain,
            settings,
            frames,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        };
        (engine, renderer)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    // ---- settings ----

    /// Current settings snapshot.
    pub fn settings(&self) -> Settings {
        **self.settings.load()
    }

    /// Replace every setting at once (clamped).
    pub fn set_settings(&self, settings: Settings) {
        self.update("settings", |s| *s = settings);
    }

    fn update<F>(&self, what: &str, edit: F)
    where
        F: Fn(&mut Settings),
    {
        let mut requested = Settings::default();
        self.settings.rcu(|current| {
            let mut next = **current;
            edit(&mut next);
            requested = next;
            next.clamped()
        });
        if requested.clamped() != requested {
            debug!(target: TARGET, "{what} clamped into range");
        }
    }

    pub fn set_bpm(&self, bpm: f32) {
        self.update("bpm", |s| s.bpm = bpm);
    }

    pub fn set_volume(&self, volume: f32) {
        self.update("volume", |s| s.volume = volume);
    }

    pub fn set_adsr(&self, adsr: Adsr) {
        self.update("adsr", |s| s.adsr = adsr);
    }

    pub fn set_filter(&self, filter: FilterSettings) {
        self.update("filter", |s| s.filter = filter);
    }

    pub fn set_eq(&self, eq: EqSettings) {
        self.update("eq", |s| s.eq = eq);
    }

    pub fn set_modulation(&self, modulation: ModSettings) {
        self.update("modulation", |s| s.modulation = modulation);
    }

    pub fn set_arp(&self, arp: ArpSettings) {
        self.update("arp", |s| s.arp = arp);
    }

    pub fn set_arp_mode(&self, mode: ArpMode) {
        self.update("arp mode", |s| s.arp.mode = mode);
    }

    pub fn set_gate(&self, gate: f32) {
        self.update("gate", |s| s.arp.gate = gate);
    }

    // ---- pattern ----

    pub fn pattern(&self) -> Arc<Pattern> {
        self.pattern.snapshot()
    }

    pub fn set_pattern(&self, pattern: Pattern) {
        self.pattern.replace(pattern);
    }

    /// Edit one step. Returns false if `index` is off the grid.
    pub fn set_step(&self, index: usize, step: Step) -> bool {
        self.pattern.set(index, step)
    }

    /// Ask `service` for a pattern and install whatever comes back
    /// (the empty pattern on failure).
    pub fn request_pattern<S>(&self, service: &S, description: &str) -> Pattern
    where
        S: PatternService + ?Sized,
    {
        let mode = self.settings().arp.mode;
        let pattern = generate_pattern(service, description, mode);
        self.set_pattern(pattern);
        pattern
    }

    /// Like [`Engine::request_pattern`], but a failed request is returned
    /// and the current pattern is left alone.
    pub fn try_request_pattern<S>(&self, service: &S, description: &str) -> Result<Pattern, Error>
    where
        S: PatternService + ?Sized,
    {
        let mode = self.settings().arp.mode;
        let pattern = try_generate_pattern(service, description, mode)?;
        self.set_pattern(pattern);
        Ok(pattern)
    }

    // ---- sample ----

    /// Decode and install a sample. On failure the previous sample stays.
    pub fn load_sample(&self, bytes: &[u8]) -> Result<(), DecodeError> {
        match decode_sample(bytes) {
            Ok(buffer) => {
                info!(
                    target: "arpgen::io",
                    "loaded sample: {} frames, {} ch, {} Hz",
                    buffer.frames(),
                    buffer.channels(),
                    buffer.sample_rate()
                );
                self.sample.store(Some(Arc::new(buffer)));
                Ok(())
            }
            Err(e) => {
                warn!(target: "arpgen::io", "sample rejected: {e}");
                Err(e)
            }
        }
    }

    pub fn clear_sample(&self) {
        self.sample.store(None);
    }

    pub fn sample(&self) -> Option<Arc<SampleBuffer>> {
        self.sample.load_full()
    }

    // ---- transport ----

    pub fn start(&mut self) -> Result<(), Error> {
        info!(target: TARGET, "start at {} BPM", self.settings().bpm);
        self.scheduler.start()
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    pub fn is_running(&self) -> bool {
        self.telemetry.is_running()
    }

    /// Step last selected by the arpeggiator, -1 while stopped.
    pub fn current_step_index(&self) -> i32 {
        self.telemetry.current_step_index()
    }

    /// Magnitudes (dB) of the latest output, `fft_size / 2` bins.
    pub fn frequency_snapshot(&mut self) -> Vec<f32> {
        self.analyzer.snapshot()
    }

    /// Centre frequency of a snapshot bin.
    pub fn bin_frequency(&self, index: usize) -> f32 {
        self.analyzer.bin_frequency(index)
    }
}

/// Audio-thread half of the engine.
pub struct Renderer {
    pool: VoicePool,
    chain: EffectsChain,
    settings: Arc<ArcSwap<Settings>>,
    frames: FrameClock,
    scratch: Vec<f32>,
}

impl Renderer {
    /// Fill `out` with mono audio.
    pub fn render(&mut self, out: &mut [f32]) {
        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            {
                let settings = self.settings.load();
                self.chain.apply(&settings);
            }
            self.pool.render_block(block, self.frames.frames());
            self.chain.process(block);
            self.frames.advance(block.len());
        }
    }

    /// Fill an interleaved buffer, copying the mono signal to every channel.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let total_frames = data.len() / channels;
        let mut frames_written = 0;

        while frames_written < total_frames {
            let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
            let mut block = std::mem::take(&mut self.scratch);
            self.render(&mut block[..frames_to_render]);

            let out_off = frames_written * channels;
            for (i, &s) in block[..frames_to_render].iter().enumerate() {
                let frame = out_off + i * channels;
                data[frame..frame + channels].fill(s);
            }
            self.scratch = block;
            frames_written += frames_to_render;
        }
    }

    /// Frames rendered so far.
    pub fn clock(&self) -> &FrameClock {
        &self.frames
    }

    pub fn chain(&self) -> &EffectsChain {
        &self.chain
    }

    pub fn active_voices(&self) -> usize {
        self.pool.active_voices()
    }
}
