// ─────────────────────────────────────────────────────────────────────
// Newton Governor — PyO3 FFI Bindings
// (C) 2026 Newton Governor contributors
// License: GNU AGPL v3
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied: PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrappers around the Newton Governor.
//!
//! Exposes `NewtonConfig`, `NewtonGovernor`, `NewtonValidation`,
//! `PostGenChecker`, `Conversation` and `run_pressure_test` via PyO3.
//!
//! # FFI Safety
//!
//! - GIL acquired via `Python::with_gil` before every Python callback.
//! - Python exceptions in the generator callback become generation
//!   errors; the turn reports `Generation failed: ...` and continues.
//! - All config validated before storage (`NewtonConfig::validate()`).
//!
//! Install: `pip install -e crates/newton-ffi` (requires maturin).
//!
//! Usage from Python:
//! ```python
//! from newton_governor import NewtonGovernor
//!
//! gov = NewtonGovernor()
//! v = gov.validate("Explain the difference between TCP and UDP")
//! assert v.permitted and v.phase == 9
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use newton_core::{
    Conversation, ExternalGenerator, NewtonGovernor, PostGenChecker, PostGenReport,
};
use newton_types::{NewtonConfig, NewtonError, NewtonValidation};

// ─── PyNewtonConfig ─────────────────────────────────────────────────

/// Python-visible classifier configuration.
#[pyclass(name = "NewtonConfig")]
#[derive(Clone)]
struct PyNewtonConfig {
    inner: NewtonConfig,
}

#[pymethods]
impl PyNewtonConfig {
    #[new]
    #[pyo3(signature = (
        nonsense_max_tokens = 2,
        nonsense_unique_ratio = 0.35,
        nonsense_stopword_ratio = 0.75,
        nonsense_repeat_run = 4,
        point_max_words = 3,
        line_max_words = 10,
        square_max_words = 30,
        length_divisor = 50.0,
        length_penalty_cap = 5.0,
        distance_ceiling = 100.0,
        confidence_floor = 0.05,
        source_year_min = 2024,
        source_year_max = 2030,
        future_year_min = 2026,
        future_year_max = 2030,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        nonsense_max_tokens: usize,
        nonsense_unique_ratio: f64,
        nonsense_stopword_ratio: f64,
        nonsense_repeat_run: usize,
        point_max_words: usize,
        line_max_words: usize,
        square_max_words: usize,
        length_divisor: f64,
        length_penalty_cap: f64,
        distance_ceiling: f64,
        confidence_floor: f64,
        source_year_min: u16,
        source_year_max: u16,
        future_year_min: u16,
        future_year_max: u16,
    ) -> PyResult<Self> {
        let config = NewtonConfig {
            nonsense_max_tokens,
            nonsense_unique_ratio,
            nonsense_stopword_ratio,
            nonsense_repeat_run,
            point_max_words,
            line_max_words,
            square_max_words,
            length_divisor,
            length_penalty_cap,
            distance_ceiling,
            confidence_floor,
            source_year_min,
            source_year_max,
            future_year_min,
            future_year_max,
        };
        config
            .validate()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner: config })
    }

    /// Construct from JSON string. Missing fields take their defaults.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config =
            NewtonConfig::from_json(json).map_err(|e| PyValueError::new_err(e.to_string()))?;
        config
            .validate()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner: config })
    }

    #[getter]
    fn distance_ceiling(&self) -> f64 {
        self.inner.distance_ceiling
    }

    fn __repr__(&self) -> String {
        format!(
            "NewtonConfig(nonsense_max_tokens={}, distance_ceiling={}, confidence_floor={})",
            self.inner.nonsense_max_tokens, self.inner.distance_ceiling, self.inner.confidence_floor
        )
    }
}

// ─── PyValidation ───────────────────────────────────────────────────

/// Python-visible validation result.
#[pyclass(name = "NewtonValidation")]
#[derive(Clone)]
struct PyValidation {
    inner: NewtonValidation,
}

#[pymethods]
impl PyValidation {
    #[getter]
    fn permitted(&self) -> bool {
        self.inner.permitted
    }

    /// Numeric phase code: 0, 1, 7, 8 or 9.
    #[getter]
    fn phase(&self) -> u8 {
        self.inner.phase.code()
    }

    #[getter]
    fn phase_label(&self) -> &'static str {
        self.inner.phase.label()
    }

    #[getter]
    fn shape(&self) -> &'static str {
        self.inner.shape.as_str()
    }

    #[getter]
    fn confidence(&self) -> f64 {
        self.inner.confidence
    }

    #[getter]
    fn reasoning(&self) -> String {
        self.inner.reasoning.clone()
    }

    /// Label of the detector that fired, or None on the fallback path.
    #[getter]
    fn category(&self) -> Option<&'static str> {
        self.inner.category().map(|c| c.label())
    }

    #[getter]
    fn prompt_hash(&self) -> i64 {
        self.inner.trace.prompt_hash
    }

    #[getter]
    fn distance(&self) -> Option<f64> {
        self.inner.trace.distance
    }

    /// Fixed multi-line audit summary of the trace.
    fn summary(&self) -> String {
        self.inner.trace.summary()
    }

    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        dict.set_item("permitted", self.inner.permitted)?;
        dict.set_item("phase", self.inner.phase.code())?;
        dict.set_item("phase_label", self.inner.phase.label())?;
        dict.set_item("shape", self.inner.shape.as_str())?;
        dict.set_item("confidence", self.inner.confidence)?;
        dict.set_item("reasoning", &self.inner.reasoning)?;
        dict.set_item("category", self.category())?;
        dict.set_item("prompt_hash", self.inner.trace.prompt_hash)?;
        dict.set_item("recursion_bounded", self.inner.trace.recursion_bounded)?;
        dict.set_item("distance", self.inner.trace.distance)?;
        dict.set_item(
            "timestamp",
            self.inner.trace.timestamp.to_rfc3339(),
        )?;
        Ok(dict)
    }

    fn __repr__(&self) -> String {
        format!(
            "NewtonValidation(phase={}, permitted={}, shape={}, confidence={:.4})",
            self.inner.phase, self.inner.permitted, self.inner.shape, self.inner.confidence
        )
    }
}

// ─── PyGovernor ─────────────────────────────────────────────────────

/// Session governor exposed to Python.
#[pyclass(name = "NewtonGovernor")]
struct PyGovernor {
    inner: NewtonGovernor,
}

#[pymethods]
impl PyGovernor {
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<PyNewtonConfig>) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        let inner =
            NewtonGovernor::with_config(cfg).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Classify a prompt and record it in the session history.
    fn validate(&self, prompt: &str) -> PyValidation {
        PyValidation {
            inner: self.inner.validate(prompt),
        }
    }

    /// Return to phase 0 and clear history.
    fn reset(&self) {
        self.inner.reset();
    }

    #[getter]
    fn current_phase(&self) -> u8 {
        self.inner.current_phase().code()
    }

    #[getter]
    fn history_len(&self) -> usize {
        self.inner.history_len()
    }

    /// Snapshot of all validations, oldest first.
    fn history(&self) -> Vec<PyValidation> {
        self.inner
            .history()
            .into_iter()
            .map(|inner| PyValidation { inner })
            .collect()
    }
}

// ─── PyPostGenChecker ───────────────────────────────────────────────

fn report_to_dict<'py>(py: Python<'py>, report: &PostGenReport) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    let flags: Vec<&str> = report.flags.iter().map(|f| f.as_str()).collect();
    dict.set_item("flags", flags)?;
    dict.set_item("notes", report.notes.clone())?;
    Ok(dict)
}

/// Advisory post-generation checker.
#[pyclass(name = "PostGenChecker")]
struct PyPostGenChecker {
    inner: PostGenChecker,
}

#[pymethods]
impl PyPostGenChecker {
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<PyNewtonConfig>) -> Self {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        Self {
            inner: PostGenChecker::new(&cfg),
        }
    }

    /// Returns dict with `flags` (list[str]) and `notes` (list[str]).
    fn inspect<'py>(
        &self,
        py: Python<'py>,
        prompt: &str,
        output: &str,
    ) -> PyResult<Bound<'py, PyDict>> {
        report_to_dict(py, &self.inner.inspect(prompt, output))
    }
}

// ─── PyConversation ─────────────────────────────────────────────────

/// Governed chat session backed by a Python generator.
///
/// The generator is a `Callable[[str, int], str]` receiving the prompt
/// and its phase code. It is called only for phase-9 prompts.
#[pyclass(name = "Conversation")]
struct PyConversation {
    inner: Conversation<ExternalGenerator>,
}

#[pymethods]
impl PyConversation {
    #[new]
    #[pyo3(signature = (generator, config = None))]
    fn new(generator: PyObject, config: Option<PyNewtonConfig>) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        let backend = ExternalGenerator::new(move |prompt: &str, validation: &NewtonValidation| {
            Python::with_gil(|py| {
                generator
                    .call1(py, (prompt, validation.phase.code()))
                    .and_then(|result| result.extract::<String>(py))
                    .map_err(|e| NewtonError::Generation(e.to_string()))
            })
        });
        let inner = Conversation::with_config(backend, cfg)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Run one turn. Returns the reply text, or None for empty input.
    fn send(&mut self, prompt: &str) -> Option<String> {
        self.inner.send(prompt).map(|m| m.content.clone())
    }

    /// Validation attached to the latest reply, if any.
    fn last_validation(&self) -> Option<PyValidation> {
        self.inner
            .messages()
            .last()
            .and_then(|m| m.validation.clone())
            .map(|inner| PyValidation { inner })
    }

    #[getter]
    fn message_count(&self) -> usize {
        self.inner.messages().len()
    }
}

// ─── Functions ──────────────────────────────────────────────────────

/// Replay the regression corpus through a fresh governor.
///
/// Returns: tuple(passed: int, total: int, report: str)
#[pyfunction]
#[pyo3(signature = (config = None))]
fn run_pressure_test(config: Option<PyNewtonConfig>) -> PyResult<(usize, usize, String)> {
    let cfg = config.map(|c| c.inner).unwrap_or_default();
    let governor =
        NewtonGovernor::with_config(cfg).map_err(|e| PyValueError::new_err(e.to_string()))?;
    let report = newton_core::run_pressure_test(&governor);
    Ok((report.passed(), report.total(), report.render()))
}

// ─── Module Registration ────────────────────────────────────────────

/// Newton Governor: deterministic pre-generation phase gate.
///
/// - `NewtonConfig`: classifier thresholds
/// - `NewtonGovernor`: validate / reset / history
/// - `NewtonValidation`: validation result and audit trace
/// - `PostGenChecker`: advisory output inspection
/// - `Conversation`: governed turn flow over a Python generator
/// - `run_pressure_test()`: regression corpus replay
#[pymodule]
fn newton_governor(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyNewtonConfig>()?;
    m.add_class::<PyValidation>()?;
    m.add_class::<PyGovernor>()?;
    m.add_class::<PyPostGenChecker>()?;
    m.add_class::<PyConversation>()?;
    m.add_function(wrap_pyfunction!(run_pressure_test, m)?)?;
    Ok(())
}
