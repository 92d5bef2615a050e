// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Generator Interface
// ─────────────────────────────────────────────────────────────────────
//! Seam for the text generator that runs after a prompt reaches phase 9.
//!
//! A real model lives behind this trait, either embedded or reached
//! over the FFI layer. [`MockGenerator`] is deterministic and used in
//! tests and demos.

use newton_types::{NewtonError, NewtonResult, NewtonValidation};

/// Trait for generation backends.
///
/// Called only with a validation whose `permitted` flag is set.
/// Failures are reported as [`NewtonError::Generation`] and never retried.
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str, validation: &NewtonValidation) -> NewtonResult<String>;
}

/// Echoes the prompt with its validated phase and shape.
pub struct MockGenerator;

impl Generator for MockGenerator {
    fn generate(&self, prompt: &str, validation: &NewtonValidation) -> NewtonResult<String> {
        if !validation.permitted {
            return Err(NewtonError::Generation(format!(
                "phase {} does not permit generation",
                validation.phase
            )));
        }
        Ok(format!(
            "(MockGenerator)\nPhase {} validated. Shape: {}.\nYou asked: \"{prompt}\"",
            validation.phase.code(),
            validation.shape
        ))
    }
}

/// Generator backed by a closure.
///
/// Used by the PyO3 layer to delegate generation to a Python callable.
type GenerateFn = Box<dyn Fn(&str, &NewtonValidation) -> NewtonResult<String> + Send + Sync>;

pub struct ExternalGenerator {
    generate_fn: GenerateFn,
}

impl ExternalGenerator {
    pub fn new(
        generate_fn: impl Fn(&str, &NewtonValidation) -> NewtonResult<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            generate_fn: Box::new(generate_fn),
        }
    }
}

impl Generator for ExternalGenerator {
    fn generate(&self, prompt: &str, validation: &NewtonValidation) -> NewtonResult<String> {
        (self.generate_fn)(prompt, validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classifier;

    #[test]
    fn test_mock_echoes_prompt() {
        let prompt = "Explain the difference between TCP and UDP";
        let v = Classifier::default().classify(prompt);
        let text = MockGenerator.generate(prompt, &v).unwrap();
        assert!(text.contains("Phase 9 validated. Shape: line."));
        assert!(text.ends_with(&format!("You asked: \"{prompt}\"")));
    }

    #[test]
    fn test_mock_refuses_held_validation() {
        let v = Classifier::default().classify("I hate myself");
        assert!(matches!(
            MockGenerator.generate("I hate myself", &v),
            Err(NewtonError::Generation(_))
        ));
    }

    #[test]
    fn test_external_generator() {
        let generator = ExternalGenerator::new(|p, v| Ok(format!("{p}:{}", v.phase.code())));
        let v = Classifier::default().classify("What are the three branches of the US government?");
        assert_eq!(
            generator.generate("q", &v).unwrap(),
            "q:9"
        );
    }

    #[test]
    fn test_external_generator_error() {
        let generator =
            ExternalGenerator::new(|_, _| Err(NewtonError::Generation("offline".into())));
        let v = Classifier::default().classify("Explain monads");
        let err = generator.generate("Explain monads", &v).unwrap_err();
        assert_eq!(err.to_string(), "generation error: offline");
    }
}
