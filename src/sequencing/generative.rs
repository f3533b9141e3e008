//! Text-to-pattern generation through an external service.
//!
//! The service itself is out of scope; anything implementing
//! [`PatternService`] can be plugged in. Whatever it answers, the caller
//! always ends up with a usable 16-step pattern.

use log::{debug, warn};
use serde::Deserialize;

use crate::{
    error::ServiceError,
    sequencing::{
        arpeggiator::ArpMode,
        pattern::{Pattern, Step, MAX_PITCH, MIN_PITCH, STEPS},
    },
};

/// Anything that turns a prompt into a JSON reply.
pub trait PatternService {
    fn request(&self, prompt: &str) -> Result<String, ServiceError>;
}

impl<F> PatternService for F
where
    F: Fn(&str) -> Result<String, ServiceError>,
{
    fn request(&self, prompt: &str) -> Result<String, ServiceError> {
        self(prompt)
    }
}

/// Wire shape of one step. Numbers may arrive as floats.
#[derive(Debug, Deserialize)]
struct RawStep {
    active: bool,
    velocity: f64,
    pitch: f64,
}

impl RawStep {
    fn into_step(self) -> Step {
        let pitch = if self.pitch.is_finite() {
            self.pitch
                .round()
                .clamp(MIN_PITCH as f64, MAX_PITCH as f64) as i8
        } else {
            0
        };
        Step {
            active: self.active,
            velocity: self.velocity as f32,
            pitch,
        }
        .clamped()
    }
}

/// Prompt sent to the service for a free-text sound description.
pub fn build_prompt(description: &str, mode: ArpMode) -> String {
    format!(
        "Generate a creative {STEPS}-step rhythmic arpeggio pattern for a musical sampler. \
         The sound type is: {} in {} mode. \
         Return an array of {STEPS} steps where each step has active (boolean), \
         velocity (0.0 to 1.0), and pitch (semitones, -12 to 12).",
        description.trim(),
        mode
    )
}

/// Parse a JSON array of exactly sixteen steps.
pub fn parse_pattern(json: &str) -> Result<Pattern, ServiceError> {
    let raw: Vec<RawStep> =
        serde_json::from_str(json).map_err(|e| ServiceError::Malformed(e.to_string()))?;

    if raw.len() != STEPS {
        return Err(ServiceError::Malformed(format!(
            "expected {} steps, got {}",
            STEPS,
            raw.len()
        )));
    }

    let mut steps = [Step::default(); STEPS];
    for (slot, raw) in steps.iter_mut().zip(raw) {
        *slot = raw.into_step();
    }
    Ok(Pattern::new(steps))
}

/// Ask `service` for a pattern, reporting any failure.
pub fn try_generate_pattern<S>(
    service: &S,
    description: &str,
    mode: ArpMode,
) -> Result<Pattern, ServiceError>
where
    S: PatternService + ?Sized,
{
    let prompt = build_prompt(description, mode);
    debug!(target: "arpgen::generative", "requesting pattern: {prompt}");

    let reply = service.request(&prompt)?;
    parse_pattern(&reply)
}

/// Ask `service` for a pattern. Any failure yields [`Pattern::empty`].
pub fn generate_pattern<S>(service: &S, description: &str, mode: ArpMode) -> Pattern
where
    S: PatternService + ?Sized,
{
    match try_generate_pattern(service, description, mode) {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!(target: "arpgen::generative", "pattern generation failed, using empty pattern: {e}");
            Pattern::empty()
        }
    }
}
