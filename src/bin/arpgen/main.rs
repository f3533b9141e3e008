//! arpgen - play a WAV sample through the step sequencer
//!
//! Run with: cargo run --features device -- sample.wav --mode updown --bpm 140

use std::io::Write;
use std::time::Duration;

use arpgen::{
    engine::session::AudioSession,
    sequencing::{ArpMode, Pattern, Step},
    EngineConfig,
};
use color_eyre::eyre::{bail, eyre, WrapErr};

const USAGE: &str = "usage: arpgen <sample.wav> [--config file.toml] [--mode manual|up|down|updown|random] [--bpm N] [--seconds N]";

struct Args {
    sample: String,
    config: Option<String>,
    mode: ArpMode,
    bpm: Option<f32>,
    seconds: f64,
}

fn parse_args() -> color_eyre::Result<Args> {
    let mut sample = None;
    let mut config = None;
    let mut mode = ArpMode::Manual;
    let mut bpm = None;
    let mut seconds = 8.0;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().ok_or_else(|| eyre!("{name} needs a value\n{USAGE}"));
        match arg.as_str() {
            "--config" => config = Some(value("--config")?),
            "--mode" => mode = value("--mode")?.parse().map_err(|e| eyre!("{e}"))?,
            "--bpm" => bpm = Some(value("--bpm")?.parse().wrap_err("--bpm expects a number")?),
            "--seconds" => {
                seconds = value("--seconds")?
                    .parse()
                    .wrap_err("--seconds expects a number")?
            }
            "-h" | "--help" => bail!("{USAGE}"),
            other if other.starts_with("--") => bail!("unknown flag {other}\n{USAGE}"),
            other => sample = Some(other.to_string()),
        }
    }

    Ok(Args {
        sample: sample.ok_or_else(|| eyre!("{USAGE}"))?,
        config,
        mode,
        bpm,
        seconds,
    })
}

/// A syncopated bar that makes every arp mode sound different.
fn demo_pattern() -> Pattern {
    let mut steps = [Step::default(); 16];
    for (index, pitch, velocity) in [
        (0, 0, 1.0),
        (3, 7, 0.7),
        (6, 3, 0.8),
        (8, 12, 0.9),
        (10, -5, 0.6),
        (11, 5, 0.7),
        (14, 10, 0.8),
    ] {
        steps[index] = Step::on(velocity, pitch);
    }
    Pattern::new(steps)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => EngineConfig::load(path).wrap_err("failed to load config")?,
        None => EngineConfig::default(),
    };

    let bytes = std::fs::read(&args.sample).wrap_err_with(|| format!("cannot read {}", args.sample))?;

    let (session, mut engine) = AudioSession::open(&config)?;
    engine.load_sample(&bytes)?;
    engine.set_pattern(demo_pattern());
    engine.set_arp_mode(args.mode);
    if let Some(bpm) = args.bpm {
        engine.set_bpm(bpm);
    }

    println!("=== arpgen ===");
    println!("Sample: {}", args.sample);
    println!("Mode: {}  BPM: {}", args.mode, engine.settings().bpm);
    println!("Device: {} Hz, {} ch", session.sample_rate(), session.channels());
    println!("Playing for {:.1}s...", args.seconds);

    engine.start()?;
    let ticks = (args.seconds * 10.0).max(1.0) as usize;
    for _ in 0..ticks {
        std::thread::sleep(Duration::from_millis(100));
        let step = engine.current_step_index();
        print!("\rstep {:>2}  {}", step, if step >= 0 { "●" } else { " " });
        std::io::stdout().flush().ok();
    }
    println!();

    engine.stop();
    // Let the last releases ring out.
    std::thread::sleep(Duration::from_millis(500));
    session.close();
    Ok(())
}
