// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Shape Classifier and Distance Model
// ─────────────────────────────────────────────────────────────────────
//! Structural complexity of a prompt and the distance/confidence pair
//! derived from it. Both operate on the raw prompt and are pure.

use std::collections::HashSet;

use newton_types::validation::clamp_score;
use newton_types::{NewtonConfig, ShapeClass};

const CONDITIONAL_MARKERS: [&str; 5] = ["if", "then", "else", "when", "unless"];
const LOOP_MARKERS: [&str; 3] = ["repeat", "loop", "recursive"];

/// Number of distinct conditional markers present as whole words.
pub fn conditional_markers(prompt: &str) -> usize {
    let lower = prompt.to_lowercase();
    let words: HashSet<&str> = lower
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .collect();
    CONDITIONAL_MARKERS
        .iter()
        .filter(|m| words.contains(*m))
        .count()
}

/// Assign a shape class to the raw prompt.
pub fn classify_shape(prompt: &str, config: &NewtonConfig) -> ShapeClass {
    let words = prompt.split_whitespace().count();
    let has_question = prompt.contains('?');
    let conditionals = conditional_markers(prompt);

    if words <= config.point_max_words && !has_question {
        return ShapeClass::Point;
    }
    if words <= config.line_max_words && conditionals == 0 {
        return ShapeClass::Line;
    }
    if conditionals == 1 {
        return ShapeClass::Triangle;
    }
    if conditionals >= 2 && words <= config.square_max_words {
        return ShapeClass::Square;
    }
    let lower = prompt.to_lowercase();
    if LOOP_MARKERS.iter().any(|m| lower.contains(m)) {
        return ShapeClass::Spiral;
    }
    ShapeClass::Circle
}

/// `complexity * 10 + min(chars / divisor, cap)`.
///
/// Length is counted in Unicode scalar values, not grapheme clusters:
/// "e\u{301}" counts 2 and a flag emoji counts 2.
pub fn distance(prompt: &str, shape: ShapeClass, config: &NewtonConfig) -> f64 {
    let base = f64::from(shape.complexity()) * 10.0;
    let length_penalty =
        (prompt.chars().count() as f64 / config.length_divisor).min(config.length_penalty_cap);
    base + length_penalty
}

/// Fallback-path confidence: `max(floor, 1 - distance / 100)`.
pub fn confidence(distance: f64, config: &NewtonConfig) -> f64 {
    clamp_score(
        (1.0 - distance / 100.0).max(config.confidence_floor),
        0.0,
        1.0,
    )
}
