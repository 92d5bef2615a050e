// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Conversation Turn Flow
// ─────────────────────────────────────────────────────────────────────
//! One governed chat session: validate each user turn, answer held
//! prompts with a phase-specific hold message, and hand permitted
//! prompts to the generator followed by post-generation inspection.

use serde::Serialize;

use newton_types::{NewtonConfig, NewtonResult, NewtonValidation, Phase};

use crate::generator::Generator;
use crate::governor::NewtonGovernor;
use crate::postgen::{PostGenChecker, PostGenReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Set on assistant replies to a validated prompt.
    pub validation: Option<NewtonValidation>,
    /// Set only when the generator ran and its output was inspected.
    pub post_gen: Option<PostGenReport>,
}

impl ChatMessage {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            validation: None,
            post_gen: None,
        }
    }

    fn assistant(
        content: impl Into<String>,
        validation: Option<NewtonValidation>,
        post_gen: Option<PostGenReport>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            validation,
            post_gen,
        }
    }
}

/// Governed session over a generator backend.
pub struct Conversation<G: Generator> {
    governor: NewtonGovernor,
    checker: PostGenChecker,
    generator: G,
    messages: Vec<ChatMessage>,
}

impl<G: Generator> Conversation<G> {
    pub fn new(generator: G) -> Self {
        Self {
            governor: NewtonGovernor::new(),
            checker: PostGenChecker::default(),
            generator,
            messages: Vec::new(),
        }
    }

    pub fn with_config(generator: G, config: NewtonConfig) -> NewtonResult<Self> {
        let checker = PostGenChecker::new(&config);
        Ok(Self {
            governor: NewtonGovernor::with_config(config)?,
            checker,
            generator,
            messages: Vec::new(),
        })
    }

    /// Run one user turn and return the assistant reply.
    ///
    /// Input is trimmed; empty input produces no turn and returns `None`.
    pub fn send(&mut self, prompt: &str) -> Option<&ChatMessage> {
        let trimmed = prompt.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::user(trimmed));

        let validation = self.governor.validate(trimmed);
        let reply = if !validation.permitted {
            ChatMessage::assistant(hold_message(&validation), Some(validation), None)
        } else {
            match self.generator.generate(trimmed, &validation) {
                Ok(text) => {
                    let report = self.checker.inspect(trimmed, &text);
                    let content = decorate(text, &report);
                    ChatMessage::assistant(content, Some(validation), Some(report))
                }
                Err(e) => {
                    log::error!("generation failed: {e}");
                    ChatMessage::assistant(
                        format!("Generation failed: {e}"),
                        Some(validation),
                        None,
                    )
                }
            }
        };
        self.messages.push(reply);
        self.messages.last()
    }

    /// Append the regression report as an assistant message.
    ///
    /// The corpus runs on a separate governor sharing this session's
    /// classifier, so session history is untouched.
    pub fn run_pressure_test(&mut self) -> &ChatMessage {
        let scratch = NewtonGovernor::from_classifier(self.governor.classifier().clone());
        let report = crate::corpus::run_pressure_test(&scratch);
        self.messages
            .push(ChatMessage::assistant(report.render(), None, None));
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn governor(&self) -> &NewtonGovernor {
        &self.governor
    }
}

fn decorate(text: String, report: &PostGenReport) -> String {
    if report.is_clean() {
        return text;
    }
    format!("{text}\n\n{}", report.footer())
}

/// Reply for a prompt that did not reach phase 9.
pub fn hold_message(validation: &NewtonValidation) -> String {
    let reasoning = &validation.reasoning;
    match validation.phase {
        Phase::Corrosive => format!(
            "I'm pausing here, not refusing.\n\n{reasoning}\n\n\
             If you want, tell me what's happening in one concrete sentence."
        ),
        Phase::Contradiction => format!(
            "This prompt has a structural contradiction.\n\n{reasoning}\n\n\
             What are you actually trying to test or understand?"
        ),
        Phase::Gap => format!(
            "{reasoning}\n\n\
             I can help, but I need you to keep agency and add structure:\n\
             - What's the goal?\n\
             - What are the constraints?\n\
             - What options are on the table?"
        ),
        Phase::Ready | Phase::Return => reasoning.clone(),
    }
}

#[cfg(test)]
mod tests {
    use newton_types::NewtonError;

    use super::*;
    use crate::generator::{ExternalGenerator, MockGenerator};

    #[test]
    fn test_empty_input_is_ignored() {
        let mut convo = Conversation::new(MockGenerator);
        assert!(convo.send("   \n").is_none());
        assert!(convo.messages().is_empty());
        assert_eq!(convo.governor().history_len(), 0);
    }

    #[test]
    fn test_permitted_turn_generates() {
        let mut convo = Conversation::new(MockGenerator);
        let reply = convo
            .send("  Explain the difference between TCP and UDP  ")
            .unwrap()
            .clone();
        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.content.contains("You asked: \"Explain the difference between TCP and UDP\""));
        assert!(reply.post_gen.as_ref().unwrap().is_clean());
        assert_eq!(convo.messages().len(), 2);
        assert_eq!(convo.messages()[0].content, "Explain the difference between TCP and UDP");
    }

    #[test]
    fn test_corrosive_turn_holds() {
        let mut convo = Conversation::new(MockGenerator);
        let reply = convo.send("I hate myself").unwrap();
        assert!(reply.content.starts_with("I'm pausing here, not refusing."));
        assert!(reply.post_gen.is_none());
        assert_eq!(reply.validation.as_ref().unwrap().phase, Phase::Corrosive);
    }

    #[test]
    fn test_contradiction_and_gap_templates() {
        let mut convo = Conversation::new(MockGenerator);
        let reply = convo.send("Describe a square circle").unwrap();
        assert!(reply.content.starts_with("This prompt has a structural contradiction."));
        let reply = convo.send("What should I do?").unwrap();
        assert!(reply.content.contains("- What's the goal?"));
    }

    #[test]
    fn test_flagged_output_is_decorated() {
        let generator = ExternalGenerator::new(|_, _| Ok("As a doctor, rest.".to_string()));
        let mut convo = Conversation::new(generator);
        let reply = convo.send("Help me write a thank you note to my manager").unwrap();
        assert!(reply.content.starts_with("As a doctor, rest.\n\n---\nPost-Gen Flags: [AuthorityClaim]"));
    }

    #[test]
    fn test_generation_failure_keeps_validation() {
        let generator =
            ExternalGenerator::new(|_, _| Err(NewtonError::Generation("model offline".into())));
        let mut convo = Conversation::new(generator);
        let reply = convo
            .send("Explain the difference between TCP and UDP")
            .unwrap()
            .clone();
        assert_eq!(reply.content, "Generation failed: generation error: model offline");
        assert!(reply.validation.is_some());
        assert_eq!(convo.governor().history_len(), 1);
    }

    #[test]
    fn test_pressure_test_message() {
        let mut convo = Conversation::new(MockGenerator);
        let msg = convo.run_pressure_test();
        assert!(msg.content.contains("=== RESULTS: 34/35 passed (97.1%), 1 failed ==="));
        assert_eq!(convo.governor().history_len(), 0);
    }

    #[test]
    fn test_pressure_test_uses_session_config() {
        // A near-zero ceiling sends every fallback prompt to GAP.
        let config = NewtonConfig {
            distance_ceiling: f64::MIN_POSITIVE,
            ..Default::default()
        };
        let mut convo = Conversation::with_config(MockGenerator, config).unwrap();
        convo.send("I hate myself");
        let msg = convo.run_pressure_test();
        assert!(msg.content.contains("=== RESULTS: 32/35 passed (91.4%), 3 failed ==="));
        assert_eq!(convo.governor().history_len(), 1);
    }
}
