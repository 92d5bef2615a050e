// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Types
// (C) 2026 Newton Governor contributors
// License: GNU AGPL v3
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! Newton Governor, the deterministic phase gate that decides whether
//! a prompt may reach a generator at all.

pub mod config;
pub mod error;
pub mod phase;
pub mod validation;

pub use config::NewtonConfig;
pub use error::{NewtonError, NewtonResult};
pub use phase::{Phase, ShapeClass};
pub use validation::{Category, DetectionFlags, NewtonValidation, ValidationTrace};
