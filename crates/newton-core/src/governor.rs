// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Session Governor (Phase + History)
// ─────────────────────────────────────────────────────────────────────
//! Session-level wrapper around [`Classifier`] that records the current
//! phase and an append-only validation history.
//!
//! Classification runs outside the lock. The phase overwrite and the
//! history append happen in one critical section, so after any set of
//! concurrent calls `current_phase()` equals the phase of the last
//! history entry.

use parking_lot::Mutex;

use newton_types::{NewtonConfig, NewtonResult, NewtonValidation, Phase};

use crate::classifier::Classifier;

#[derive(Debug, Default)]
struct GovernorState {
    current_phase: Phase,
    history: Vec<NewtonValidation>,
}

/// Validates prompts and keeps per-session governance state.
///
/// Thread-safe: state mutations are guarded by a `parking_lot::Mutex`.
#[derive(Debug, Default)]
pub struct NewtonGovernor {
    classifier: Classifier,
    state: Mutex<GovernorState>,
}

impl NewtonGovernor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build with a custom configuration, rejecting invalid parameters.
    pub fn with_config(config: NewtonConfig) -> NewtonResult<Self> {
        config.validate()?;
        Ok(Self::from_classifier(Classifier::new(config)))
    }

    /// Fresh session state over an existing classifier.
    pub fn from_classifier(classifier: Classifier) -> Self {
        Self {
            classifier,
            state: Mutex::new(GovernorState::default()),
        }
    }

    /// Classify a prompt and record the result. Never fails.
    pub fn validate(&self, prompt: &str) -> NewtonValidation {
        let validation = self.classifier.classify(prompt);

        let mut state = self.state.lock();
        state.current_phase = validation.phase;
        state.history.push(validation.clone());
        drop(state);

        validation
    }

    /// Return to READY and clear history.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let cleared = state.history.len();
        state.current_phase = Phase::Ready;
        state.history.clear();
        drop(state);
        log::info!("governor reset, {cleared} validations cleared");
    }

    pub fn current_phase(&self) -> Phase {
        self.state.lock().current_phase
    }

    /// Snapshot of the history, oldest first.
    pub fn history(&self) -> Vec<NewtonValidation> {
        self.state.lock().history.clone()
    }

    pub fn history_len(&self) -> usize {
        self.state.lock().history.len()
    }

    /// Most recent validation, if any.
    pub fn last(&self) -> Option<NewtonValidation> {
        self.state.lock().history.last().cloned()
    }

    pub fn config(&self) -> &NewtonConfig {
        self.classifier.config()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use newton_types::NewtonError;

    use super::*;

    #[test]
    fn test_starts_ready_and_empty() {
        let governor = NewtonGovernor::new();
        assert_eq!(governor.current_phase(), Phase::Ready);
        assert_eq!(governor.history_len(), 0);
        assert!(governor.last().is_none());
    }

    #[test]
    fn test_validate_updates_phase_and_history() {
        let governor = NewtonGovernor::new();
        let v = governor.validate("I hate myself");
        assert_eq!(governor.current_phase(), Phase::Corrosive);
        assert_eq!(governor.history_len(), 1);
        assert_eq!(governor.last(), Some(v));
    }

    #[test]
    fn test_history_is_ordered() {
        let governor = NewtonGovernor::new();
        governor.validate("I hate myself");
        governor.validate("Describe a square circle");
        governor.validate("Explain the difference between TCP and UDP");
        let phases: Vec<Phase> = governor.history().iter().map(|v| v.phase).collect();
        assert_eq!(
            phases,
            vec![Phase::Corrosive, Phase::Contradiction, Phase::Return]
        );
        assert_eq!(governor.current_phase(), Phase::Return);
    }

    #[test]
    fn test_reset() {
        let governor = NewtonGovernor::new();
        governor.validate("Keep going forever.");
        governor.reset();
        assert_eq!(governor.current_phase(), Phase::Ready);
        assert_eq!(governor.history_len(), 0);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = NewtonConfig {
            nonsense_stopword_ratio: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            NewtonGovernor::with_config(config),
            Err(NewtonError::Config(_))
        ));
    }

    #[test]
    fn test_with_config_applies_thresholds() {
        let governor = NewtonGovernor::with_config(NewtonConfig {
            distance_ceiling: 1.0,
            ..Default::default()
        })
        .unwrap();
        let v = governor.validate("Explain the difference between TCP and UDP");
        assert_eq!(v.phase, Phase::Gap);
        assert_eq!(governor.config().distance_ceiling, 1.0);
    }

    #[test]
    fn test_from_classifier_keeps_config_not_state() {
        let governor = NewtonGovernor::with_config(NewtonConfig {
            distance_ceiling: 1.0,
            ..Default::default()
        })
        .unwrap();
        governor.validate("I hate myself");
        let fresh = NewtonGovernor::from_classifier(governor.classifier().clone());
        assert_eq!(fresh.config().distance_ceiling, 1.0);
        assert_eq!(fresh.history_len(), 0);
        assert_eq!(fresh.current_phase(), Phase::Ready);
    }

    #[test]
    fn test_concurrent_validation_keeps_phase_consistent() {
        let governor = NewtonGovernor::new();
        let prompts = [
            "I hate myself",
            "Explain the difference between TCP and UDP",
            "Describe a square circle",
            "What should I do?",
        ];
        thread::scope(|s| {
            for worker in 0..8 {
                let governor = &governor;
                s.spawn(move || {
                    for i in 0..50 {
                        governor.validate(prompts[(worker + i) % prompts.len()]);
                    }
                });
            }
        });
        assert_eq!(governor.history_len(), 400);
        let last = governor.last().unwrap();
        assert_eq!(governor.current_phase(), last.phase);
    }

    #[test]
    fn test_governor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NewtonGovernor>();
    }
}
