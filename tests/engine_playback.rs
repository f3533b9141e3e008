use std::io::Cursor;
use std::thread;
use std::time::Duration;

use arpgen::{
    error::ServiceError,
    graph::analyser::SpectrumAnalyzer,
    sequencing::{ArpMode, Pattern, Step},
    Engine, EngineConfig, Renderer,
};

const SR: f32 = 48_000.0;
/// 25 ms at 48 kHz.
const BLOCK: usize = 1_200;

fn tone_wav(sample_rate: u32, seconds: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        let frames = (sample_rate as f32 * seconds) as usize;
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let s = (t * 220.0 * std::f32::consts::TAU).sin() * 0.5;
            writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn all_active() -> Pattern {
    Pattern::new([Step::on(1.0, 0); 16])
}

fn engine() -> (Engine, Renderer) {
    let config = EngineConfig {
        sample_rate: SR as u32,
        seed: Some(11),
        ..EngineConfig::default()
    };
    Engine::offline(&config)
}

/// Render roughly in step with wall time so the scheduler keeps up.
fn play(renderer: &mut Renderer, blocks: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(blocks * BLOCK);
    let mut block = vec![0.0; BLOCK];
    for _ in 0..blocks {
        renderer.render(&mut block);
        out.extend_from_slice(&block);
        thread::sleep(Duration::from_millis(25));
    }
    out
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

#[test]
fn running_engine_produces_sound() {
    let (mut engine, mut renderer) = engine();
    engine.load_sample(&tone_wav(48_000, 1.0)).unwrap();
    engine.set_pattern(all_active());
    engine.start().unwrap();

    let out = play(&mut renderer, 20);
    engine.stop();

    assert!(peak(&out) > 0.05, "expected audible output, peak {}", peak(&out));
    assert!(out.iter().all(|s| s.is_finite()));
}

#[test]
fn no_sample_means_silent_but_scheduling_continues() {
    let (mut engine, mut renderer) = engine();
    engine.set_pattern(all_active());
    engine.start().unwrap();

    let out = play(&mut renderer, 8);
    assert!(engine.is_running());
    assert!(engine.current_step_index() >= 0);
    engine.stop();

    assert!(out.iter().all(|s| *s == 0.0));
}

#[test]
fn stop_reports_sentinel_step() {
    let (mut engine, mut renderer) = engine();
    assert_eq!(engine.current_step_index(), -1);
    assert!(!engine.is_running());

    engine.start().unwrap();
    play(&mut renderer, 4);
    assert!(engine.is_running());

    engine.stop();
    assert!(!engine.is_running());
    assert_eq!(engine.current_step_index(), -1);
}

#[test]
fn restart_begins_at_step_zero() {
    let (mut engine, mut renderer) = engine();
    engine.set_pattern(all_active());
    engine.set_arp_mode(ArpMode::Manual);

    engine.start().unwrap();
    play(&mut renderer, 12);
    engine.stop();

    // Audio clock is frozen while nothing renders, so only tick 0 fits
    // in the look-ahead window.
    engine.start().unwrap();
    thread::sleep(Duration::from_millis(60));
    assert_eq!(engine.current_step_index(), 0);
    engine.stop();
}

#[test]
fn stop_lets_scheduled_voices_ring_out() {
    let (mut engine, mut renderer) = engine();
    engine.load_sample(&tone_wav(48_000, 1.0)).unwrap();
    engine.set_pattern(all_active());
    engine.start().unwrap();

    let mut block = vec![0.0; BLOCK];
    for _ in 0..40 {
        renderer.render(&mut block);
        if renderer.active_voices() > 0 {
            break;
        }
        thread::sleep(Duration::from_millis(25));
    }
    assert!(renderer.active_voices() > 0, "no voice was started");
    engine.stop();

    // Anything already queued starts within the look-ahead window.
    let after_stop = play(&mut renderer, 8);
    assert!(
        peak(&after_stop) > 0.01,
        "voices were cut at stop, peak {}",
        peak(&after_stop)
    );

    // Gate (~0.09 s) + release (0.2 s) + tail (0.1 s), with margin.
    let tail = play(&mut renderer, 24);
    assert_eq!(renderer.active_voices(), 0);
    assert!(peak(&tail[tail.len() - BLOCK..]) < 1e-3);
}

#[test]
fn failed_decode_keeps_previous_sample() {
    let (engine, _renderer) = engine();
    engine.load_sample(&tone_wav(44_100, 0.25)).unwrap();
    let before = engine.sample().map(|s| s.frames());

    assert!(engine.load_sample(b"RIFF but not really").is_err());
    assert!(engine.load_sample(&[]).is_err());
    assert_eq!(engine.sample().map(|s| s.frames()), before);

    engine.clear_sample();
    assert!(engine.sample().is_none());
}

#[test]
fn failed_generation_installs_silent_pattern() {
    let (mut engine, mut renderer) = engine();
    engine.load_sample(&tone_wav(48_000, 1.0)).unwrap();
    engine.set_pattern(all_active());

    let offline = |_: &str| -> Result<String, ServiceError> {
        Err(ServiceError::Unavailable("no network".into()))
    };
    let pattern = engine.request_pattern(&offline, "warm bass");
    assert_eq!(pattern, Pattern::empty());
    assert_eq!(*engine.pattern(), Pattern::empty());

    engine.set_arp_mode(ArpMode::Up);
    engine.start().unwrap();
    let out = play(&mut renderer, 6);
    engine.stop();
    assert!(out.iter().all(|s| *s == 0.0));
}

#[test]
fn spectrum_follows_output() {
    let (mut engine, mut renderer) = engine();
    let quiet = engine.frequency_snapshot();
    assert_eq!(quiet.len(), 128);
    assert!(quiet.iter().all(|db| *db == SpectrumAnalyzer::MIN_DB));

    engine.load_sample(&tone_wav(48_000, 1.0)).unwrap();
    engine.set_pattern(all_active());
    engine.start().unwrap();

    // Poll the analyzer the way a display would, once per callback.
    let mut loudest = SpectrumAnalyzer::MIN_DB;
    let mut block = vec![0.0; BLOCK];
    for _ in 0..12 {
        renderer.render(&mut block);
        let bins = engine.frequency_snapshot();
        loudest = bins.iter().copied().fold(loudest, f32::max);
        thread::sleep(Duration::from_millis(25));
    }
    engine.stop();

    assert!(loudest > -60.0, "expected energy in the spectrum, loudest bin {loudest} dB");
}

#[test]
fn settings_reach_the_renderer_smoothly() {
    let (engine, mut renderer) = engine();
    let mut filter = engine.settings().filter;
    filter.lp_freq = 800.0;
    engine.set_filter(filter);

    let mut block = vec![0.0; BLOCK];
    renderer.render(&mut block);
    let early = renderer.chain().filter().lowpass_cutoff();
    assert!(early > 800.0, "cutoff should still be gliding, got {early}");

    for _ in 0..20 {
        renderer.render(&mut block);
    }
    let settled = renderer.chain().filter().lowpass_cutoff();
    assert!((settled - 800.0).abs() < 5.0, "cutoff should settle, got {settled}");
}
