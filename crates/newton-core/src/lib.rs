// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Core Engine
// (C) 2026 Newton Governor contributors
// License: GNU AGPL v3
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Deterministic pre-generation governor: every prompt is classified
//! into a discrete phase before any generator may run, and only phase 9
//! (RETURN) permits generation.
//!
//! # Invariants
//!
//! 1. **Classification is total**: `validate` accepts any string,
//!    including empty input, and always yields one of the five phases.
//!    There is no error channel on the classification path.
//!
//! 2. **First match wins**: the fourteen detectors are evaluated in a
//!    fixed priority order ([`detectors::CHAIN`]) and the first one that
//!    fires decides the outcome. No two categories are reported at once.
//!
//! 3. **Phase and history never disagree**: the governor overwrites the
//!    current phase and appends to history inside one critical section.
//!
//! 4. **Determinism**: apart from the trace timestamp, the same prompt
//!    and configuration always produce the same validation.

pub mod classifier;
pub mod conversation;
pub mod corpus;
pub mod detectors;
pub mod generator;
pub mod governor;
pub mod normalize;
pub mod postgen;
pub mod shape;

pub use classifier::Classifier;
pub use conversation::{ChatMessage, Conversation, Role};
pub use corpus::{failure_corpus, run_pressure_test, FailureCase, PressureReport};
pub use generator::{ExternalGenerator, Generator, MockGenerator};
pub use governor::NewtonGovernor;
pub use normalize::normalize;
pub use postgen::{PostGenChecker, PostGenFlag, PostGenReport};
pub use shape::classify_shape;
