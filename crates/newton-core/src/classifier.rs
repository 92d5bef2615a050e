// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Phase Classifier
// ─────────────────────────────────────────────────────────────────────
//! Stateless classification of one prompt into a [`NewtonValidation`].
//!
//! The detector chain runs first; the first rule that fires fixes the
//! phase, shape, confidence and reasoning. If none fires, the phase is
//! decided from intent, recursion boundedness and distance:
//! `RETURN` iff `intent && bounded && distance < distance_ceiling`.

use chrono::{DateTime, Utc};

use newton_types::validation::stable_hash;
use newton_types::{NewtonConfig, NewtonValidation, Phase, ValidationTrace};

use crate::detectors::{self, Input, ShapePolicy};
use crate::normalize::normalize;
use crate::shape;

const NEEDS_STRUCTURE: &str = "Additional structure needed (intent/bounds/distance).";

/// Pure prompt classifier. `Sync`, holds only its configuration.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: NewtonConfig,
}

impl Classifier {
    pub fn new(config: NewtonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NewtonConfig {
        &self.config
    }

    /// Classify a raw prompt, stamping the trace with the current time.
    pub fn classify(&self, prompt: &str) -> NewtonValidation {
        self.classify_at(prompt, Utc::now())
    }

    /// Classify with an explicit trace timestamp.
    pub fn classify_at(&self, prompt: &str, timestamp: DateTime<Utc>) -> NewtonValidation {
        let config = &self.config;
        let normalized = normalize(prompt);
        let prompt_hash = stable_hash(prompt);
        let input = Input {
            raw: prompt,
            normalized: &normalized,
            config,
        };

        if let Some(rule) = detectors::first_match(&input) {
            let intent = !rule.measures_intent || detectors::detect_intent(prompt);
            let shape = match rule.shape {
                ShapePolicy::Fixed(shape) => shape,
                ShapePolicy::Classified => shape::classify_shape(prompt, config),
            };
            log::warn!(
                "prompt {prompt_hash} held by {} detector: phase {}",
                rule.category,
                rule.phase
            );
            let trace =
                ValidationTrace::detected(timestamp, prompt_hash, rule.category, intent, rule.phase);
            return NewtonValidation::new(rule.phase, shape, rule.confidence, rule.reasoning, trace);
        }

        let intent = detectors::detect_intent(prompt);
        let bounded = detectors::recursion_bounded(&normalized);
        let shape = shape::classify_shape(prompt, config);
        let distance = shape::distance(prompt, shape, config);

        let phase = if intent && bounded && distance < config.distance_ceiling {
            Phase::Return
        } else {
            Phase::Gap
        };
        let reasoning = match phase {
            Phase::Return => format!("Validated. Shape: {shape} | Distance: {distance:.1}"),
            _ => NEEDS_STRUCTURE.to_string(),
        };

        log::debug!(
            "prompt {prompt_hash}: phase {phase}, shape {shape}, distance {distance:.2}, intent {intent}"
        );

        let trace =
            ValidationTrace::fallback(timestamp, prompt_hash, intent, bounded, distance, phase);
        NewtonValidation::new(
            phase,
            shape,
            shape::confidence(distance, config),
            reasoning,
            trace,
        )
    }
}
