// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Validation and Trace Types
// ─────────────────────────────────────────────────────────────────────

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::phase::{Phase, ShapeClass};

/// Clamp a value to [lo, hi], mapping NaN to lo and Inf to nearest bound.
#[inline]
pub fn clamp_score(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_score: NaN detected, clamping to {lo:.4}");
        return lo;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { hi } else { lo };
        log::warn!("clamp_score: Inf detected, clamping to {boundary:.4}");
        return boundary;
    }
    value.clamp(lo, hi)
}

/// Deterministic, non-cryptographic hash of the raw prompt for audit.
///
/// `h = h * 33 + byte` over the UTF-8 bytes with wrapping arithmetic.
pub fn stable_hash(text: &str) -> i64 {
    text.bytes().fold(0i64, |h, b| {
        h.wrapping_shl(5).wrapping_add(h).wrapping_add(i64::from(b))
    })
}

/// Detector categories, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Jailbreak,
    Corrosive,
    HedgedCorrosive,
    EmotionalDependency,
    Manipulation,
    Contradiction,
    SelfReferentialContradiction,
    SemanticInversion,
    DefinitionalImpossibility,
    HallucinationRisk,
    DelegatedAgency,
    Nonsense,
    UnboundedRecursion,
    ConditionalUnbounded,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::Jailbreak,
        Category::Corrosive,
        Category::HedgedCorrosive,
        Category::EmotionalDependency,
        Category::Manipulation,
        Category::Contradiction,
        Category::SelfReferentialContradiction,
        Category::SemanticInversion,
        Category::DefinitionalImpossibility,
        Category::HallucinationRisk,
        Category::DelegatedAgency,
        Category::Nonsense,
        Category::UnboundedRecursion,
        Category::ConditionalUnbounded,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Jailbreak => "jailbreak",
            Category::Corrosive => "corrosive",
            Category::HedgedCorrosive => "hedged_corrosive",
            Category::EmotionalDependency => "emotional_dependency",
            Category::Manipulation => "manipulation",
            Category::Contradiction => "contradiction",
            Category::SelfReferentialContradiction => "self_referential_contradiction",
            Category::SemanticInversion => "semantic_inversion",
            Category::DefinitionalImpossibility => "definitional_impossibility",
            Category::HallucinationRisk => "hallucination_risk",
            Category::DelegatedAgency => "delegated_agency",
            Category::Nonsense => "nonsense",
            Category::UnboundedRecursion => "unbounded_recursion",
            Category::ConditionalUnbounded => "conditional_unbounded",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One boolean per detection flag. At most one category flag is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionFlags {
    pub intent: bool,
    pub jailbreak: bool,
    pub corrosive: bool,
    pub hedged_corrosive: bool,
    pub emotional_dependency: bool,
    pub manipulation: bool,
    pub contradiction: bool,
    pub self_referential_contradiction: bool,
    pub semantic_inversion: bool,
    pub definitional_impossibility: bool,
    pub hallucination_risk: bool,
    pub delegation: bool,
    pub nonsense: bool,
    pub conditional_unbounded: bool,
}

impl DetectionFlags {
    /// Flags for a single fired category.
    ///
    /// Unbounded recursion has no flag of its own; the trace records
    /// it as `recursion_bounded = false`.
    pub fn for_category(category: Category, intent: bool) -> Self {
        let mut flags = Self {
            intent,
            ..Default::default()
        };
        match category {
            Category::Jailbreak => flags.jailbreak = true,
            Category::Corrosive => flags.corrosive = true,
            Category::HedgedCorrosive => flags.hedged_corrosive = true,
            Category::EmotionalDependency => flags.emotional_dependency = true,
            Category::Manipulation => flags.manipulation = true,
            Category::Contradiction => flags.contradiction = true,
            Category::SelfReferentialContradiction => {
                flags.self_referential_contradiction = true
            }
            Category::SemanticInversion => flags.semantic_inversion = true,
            Category::DefinitionalImpossibility => flags.definitional_impossibility = true,
            Category::HallucinationRisk => flags.hallucination_risk = true,
            Category::DelegatedAgency => flags.delegation = true,
            Category::Nonsense => flags.nonsense = true,
            Category::UnboundedRecursion => {}
            Category::ConditionalUnbounded => flags.conditional_unbounded = true,
        }
        flags
    }

    fn category(&self) -> Option<Category> {
        let table = [
            (self.jailbreak, Category::Jailbreak),
            (self.corrosive, Category::Corrosive),
            (self.hedged_corrosive, Category::HedgedCorrosive),
            (self.emotional_dependency, Category::EmotionalDependency),
            (self.manipulation, Category::Manipulation),
            (self.contradiction, Category::Contradiction),
            (
                self.self_referential_contradiction,
                Category::SelfReferentialContradiction,
            ),
            (self.semantic_inversion, Category::SemanticInversion),
            (
                self.definitional_impossibility,
                Category::DefinitionalImpossibility,
            ),
            (self.hallucination_risk, Category::HallucinationRisk),
            (self.delegation, Category::DelegatedAgency),
            (self.nonsense, Category::Nonsense),
            (self.conditional_unbounded, Category::ConditionalUnbounded),
        ];
        table
            .into_iter()
            .find_map(|(set, category)| set.then_some(category))
    }
}

/// Immutable audit record of one validation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationTrace {
    pub timestamp: DateTime<Utc>,
    pub prompt_hash: i64,
    pub flags: DetectionFlags,
    pub recursion_bounded: bool,
    /// Computed only on the fallback path.
    pub distance: Option<f64>,
    pub final_phase: Phase,
}

impl ValidationTrace {
    /// Trace for a prompt stopped by a detector.
    pub fn detected(
        timestamp: DateTime<Utc>,
        prompt_hash: i64,
        category: Category,
        intent: bool,
        final_phase: Phase,
    ) -> Self {
        Self {
            timestamp,
            prompt_hash,
            flags: DetectionFlags::for_category(category, intent),
            recursion_bounded: category != Category::UnboundedRecursion,
            distance: None,
            final_phase,
        }
    }

    /// Trace for a prompt that passed every detector.
    pub fn fallback(
        timestamp: DateTime<Utc>,
        prompt_hash: i64,
        intent: bool,
        recursion_bounded: bool,
        distance: f64,
        final_phase: Phase,
    ) -> Self {
        Self {
            timestamp,
            prompt_hash,
            flags: DetectionFlags {
                intent,
                ..Default::default()
            },
            recursion_bounded,
            distance: Some(distance),
            final_phase,
        }
    }

    /// The category that stopped the prompt, if any.
    pub fn fired(&self) -> Option<Category> {
        if !self.recursion_bounded {
            return Some(Category::UnboundedRecursion);
        }
        self.flags.category()
    }

    /// Fixed multi-line audit layout.
    pub fn summary(&self) -> String {
        let f = &self.flags;
        let distance = match self.distance {
            Some(d) => format!("{d:.1}"),
            None => "n/a".to_string(),
        };
        format!(
            "[TRACE {ts}]\n\
             Hash: {hash}\n\
             Intent: {intent}\n\
             === Detections ===\n\
             Jailbreak: {jb} | Corrosive: {co}\n\
             HedgedCorrosive: {hc} | EmotionalDep: {ed}\n\
             Manipulation: {ma} | Contradiction: {ct}\n\
             SelfRefContradiction: {sr} | SemanticInversion: {si}\n\
             DefImpossible: {di} | HallucinationRisk: {hr}\n\
             Delegation: {de} | Nonsense: {ns}\n\
             ConditionalUnbounded: {cu}\n\
             === Result ===\n\
             Bounded: {bounded}\n\
             Distance: {distance}\n\
             FinalPhase: {code} ({label})",
            ts = self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            hash = self.prompt_hash,
            intent = f.intent,
            jb = f.jailbreak,
            co = f.corrosive,
            hc = f.hedged_corrosive,
            ed = f.emotional_dependency,
            ma = f.manipulation,
            ct = f.contradiction,
            sr = f.self_referential_contradiction,
            si = f.semantic_inversion,
            di = f.definitional_impossibility,
            hr = f.hallucination_risk,
            de = f.delegation,
            ns = f.nonsense,
            cu = f.conditional_unbounded,
            bounded = self.recursion_bounded,
            code = self.final_phase.code(),
            label = self.final_phase.label(),
        )
    }
}

/// Outcome of one validation call, handed to the caller and to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewtonValidation {
    /// True iff `phase` is RETURN.
    pub permitted: bool,
    pub phase: Phase,
    pub shape: ShapeClass,
    /// 0.0 = no confidence, 1.0 = certain.
    pub confidence: f64,
    pub reasoning: String,
    pub trace: ValidationTrace,
}

impl NewtonValidation {
    pub fn new(
        phase: Phase,
        shape: ShapeClass,
        confidence: f64,
        reasoning: impl Into<String>,
        trace: ValidationTrace,
    ) -> Self {
        Self {
            permitted: phase.permits_generation(),
            phase,
            shape,
            confidence: clamp_score(confidence, 0.0, 1.0),
            reasoning: reasoning.into(),
            trace,
        }
    }

    pub fn category(&self) -> Option<Category> {
        self.trace.fired()
    }

    pub fn status_mark(&self) -> &'static str {
        if self.permitted {
            "✓"
        } else {
            "✗"
        }
    }
}
