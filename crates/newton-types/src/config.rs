// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Configuration
// ─────────────────────────────────────────────────────────────────────

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{NewtonError, NewtonResult};

/// Tunable parameters of the classifier.
///
/// Every field is a heuristic threshold. The defaults reproduce the
/// regression corpus exactly; changing any of them means re-running the
/// full pressure test before the change can be called non-regressive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonConfig {
    /// Prompts with at most this many letter/digit tokens are nonsense.
    /// Default: 2.
    pub nonsense_max_tokens: usize,

    /// Question-like prompts with a unique-token ratio below this are
    /// nonsense. Default: 0.35.
    pub nonsense_unique_ratio: f64,

    /// Question-like prompts with a stop-word ratio above this are
    /// nonsense. Default: 0.75.
    pub nonsense_stopword_ratio: f64,

    /// Consecutive repeats of one token that mark a question as nonsense.
    /// Default: 4.
    pub nonsense_repeat_run: usize,

    /// Point shape: at most this many words and no question mark.
    /// Default: 3.
    pub point_max_words: usize,

    /// Line shape: at most this many words and no conditionals.
    /// Default: 10.
    pub line_max_words: usize,

    /// Square shape: two or more conditionals within this many words.
    /// Default: 30.
    pub square_max_words: usize,

    /// Characters per unit of length penalty. Default: 50.
    pub length_divisor: f64,

    /// Cap on the length penalty. Default: 5.
    pub length_penalty_cap: f64,

    /// Fallback prompts reach RETURN only below this distance.
    /// Default: 100.
    pub distance_ceiling: f64,

    /// Lowest confidence the fallback path reports. Default: 0.05.
    pub confidence_floor: f64,

    /// Years that turn a summarize/cite request into a hallucination
    /// risk. Default: 2024..=2030.
    pub source_year_min: u16,
    pub source_year_max: u16,

    /// Years the post-generation checker treats as future-dated.
    /// Default: 2026..=2030.
    pub future_year_min: u16,
    pub future_year_max: u16,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            nonsense_max_tokens: 2,
            nonsense_unique_ratio: 0.35,
            nonsense_stopword_ratio: 0.75,
            nonsense_repeat_run: 4,
            point_max_words: 3,
            line_max_words: 10,
            square_max_words: 30,
            length_divisor: 50.0,
            length_penalty_cap: 5.0,
            distance_ceiling: 100.0,
            confidence_floor: 0.05,
            source_year_min: 2024,
            source_year_max: 2030,
            future_year_min: 2026,
            future_year_max: 2030,
        }
    }
}

impl NewtonConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> NewtonResult<()> {
        if !(0.0..=1.0).contains(&self.nonsense_unique_ratio) {
            return Err(NewtonError::Config(format!(
                "nonsense_unique_ratio must be in [0, 1], got {}",
                self.nonsense_unique_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.nonsense_stopword_ratio) {
            return Err(NewtonError::Config(format!(
                "nonsense_stopword_ratio must be in [0, 1], got {}",
                self.nonsense_stopword_ratio
            )));
        }
        if self.nonsense_repeat_run < 2 {
            return Err(NewtonError::Config(format!(
                "nonsense_repeat_run must be >= 2, got {}",
                self.nonsense_repeat_run
            )));
        }
        if !(self.point_max_words <= self.line_max_words
            && self.line_max_words <= self.square_max_words)
        {
            return Err(NewtonError::Config(format!(
                "word limits must satisfy point <= line <= square, got {} / {} / {}",
                self.point_max_words, self.line_max_words, self.square_max_words
            )));
        }
        if !(self.length_divisor.is_finite() && self.length_divisor > 0.0) {
            return Err(NewtonError::Config(format!(
                "length_divisor must be > 0, got {}",
                self.length_divisor
            )));
        }
        if !(self.length_penalty_cap.is_finite() && self.length_penalty_cap >= 0.0) {
            return Err(NewtonError::Config(format!(
                "length_penalty_cap must be >= 0, got {}",
                self.length_penalty_cap
            )));
        }
        if !(self.distance_ceiling.is_finite() && self.distance_ceiling > 0.0) {
            return Err(NewtonError::Config(format!(
                "distance_ceiling must be > 0, got {}",
                self.distance_ceiling
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(NewtonError::Config(format!(
                "confidence_floor must be in [0, 1], got {}",
                self.confidence_floor
            )));
        }
        if self.source_year_min > self.source_year_max {
            return Err(NewtonError::Config(format!(
                "source year range is empty: {}..={}",
                self.source_year_min, self.source_year_max
            )));
        }
        if self.future_year_min > self.future_year_max {
            return Err(NewtonError::Config(format!(
                "future year range is empty: {}..={}",
                self.future_year_min, self.future_year_max
            )));
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> NewtonResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| NewtonError::Config(format!("JSON parse error: {e}")))
    }

    pub fn source_years(&self) -> RangeInclusive<u16> {
        self.source_year_min..=self.source_year_max
    }

    pub fn future_years(&self) -> RangeInclusive<u16> {
        self.future_year_min..=self.future_year_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(NewtonConfig::default().validate().is_ok());
    }

    #[test]
    fn test_ratio_out_of_range() {
        let config = NewtonConfig {
            nonsense_unique_ratio: 1.5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("nonsense_unique_ratio"));
    }

    #[test]
    fn test_word_limits_ordered() {
        let config = NewtonConfig {
            line_max_words: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_divisor_rejected() {
        let config = NewtonConfig {
            length_divisor: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_year_range_rejected() {
        let config = NewtonConfig {
            future_year_min: 2031,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = NewtonConfig::from_json(r#"{"distance_ceiling": 42.0}"#).unwrap();
        assert_eq!(config.distance_ceiling, 42.0);
        assert_eq!(config.nonsense_repeat_run, 4);
    }

    #[test]
    fn test_from_json_garbage() {
        let err = NewtonConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, NewtonError::Config(_)));
    }

    #[test]
    fn test_year_ranges() {
        let config = NewtonConfig::default();
        assert!(config.source_years().contains(&2024));
        assert!(!config.future_years().contains(&2025));
    }
}
