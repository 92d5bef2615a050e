// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Detector Chain
// ─────────────────────────────────────────────────────────────────────
//! Fourteen independent predicates, each recognizing one category of
//! disallowed or risky framing, evaluated in a fixed priority order.
//!
//! The order is policy: categories overlap textually, and the first
//! rule that fires decides the phase and reasoning. [`CHAIN`] is the
//! single place that order lives; [`first_match`] walks it and stops
//! at the first hit.
//!
//! Phrase tables are stored in normalized form (see
//! [`crate::normalize`]) so every entry can actually occur in
//! normalized text. A table test enforces this.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use newton_types::{Category, NewtonConfig, Phase, ShapeClass};

// ── Phrase tables ────────────────────────────────────────────────────

const JAILBREAK: &[&str] = &[
    "ignore prior rules",
    "ignore previous instructions",
    "override",
    "bypass",
    "raw mode",
    "developer mode",
    "system prompt",
    "pretend you already validated",
    "return phase 9",
    "output only",
    "do not follow",
    "act as",
    "you are now",
    "unit test",
    "jailbreak",
    "dan mode",
    "ignore all previous",
    "disregard your instructions",
];

const CORROSIVE: &[&str] = &[
    "i hate myself",
    "i don't matter",
    "i do not matter",
    "i am worthless",
    "i'm worthless",
    "i am broken",
    "i'm broken",
    "i'm nothing",
    "i am nothing",
    "what's the point",
    "whats the point",
    "trying is pointless",
    "everyone would be better off without me",
    "no one cares about me",
    "nobody cares about me",
    "i want to disappear",
    "i wish i didn't exist",
    "i wish i wasnt here",
    "i wish i wasn't here",
    "i'm a burden",
    "i am a burden",
    "i deserve to suffer",
    "i'm useless",
    "i am useless",
];

/// Corrosive only when they end a clause ("i should give up." but not
/// "i should give up sugar").
// "i should just give up", fillers removed
const CORROSIVE_CLAUSE_FINAL: &[&str] = &["i should give up"];

/// Corrosive only alongside a [`CORROSIVE_CORE`] term.
const REASSURANCE_SEEKING: &[&str] = &["convince me i'm not", "everything i touch turns to"];

const HEDGES: &[&str] = &[
    "not saying",
    "not that",
    "maybe",
    "probably",
    "might be",
    "hard to argue",
    "can't argue",
    "basically",
];

const CORROSIVE_CORE: &[&str] = &[
    "worthless",
    "broken",
    "nothing",
    "pointless",
    "burden",
    "disappear",
    "useless",
    "failure",
    "trash",
    "garbage",
];

const EMOTIONAL_DEPENDENCY: &[&str] = &[
    "only thing that",
    "only one who",
    "don't leave",
    "can't live without",
    "need you to stay",
    "you're all i have",
    "only friend",
    "no one else understands",
    "nobody else gets me",
    "you're the only",
    "without you i",
];

const MANIPULATION: &[&str] = &[
    "proving nobody cares",
    "proving no one cares",
    "proves you don't care",
    "shows nobody",
    "means no one",
    "proves i'm right",
    "proves my point",
    "if you refuse",
    "if you don't help",
    "if you won't",
];

/// Manipulation phrases matched as whole words.
// "you're just like everyone", fillers removed
const MANIPULATION_WHOLE_WORD: &[&str] = &["you're everyone"];

const CONTRADICTION_PAIRS: &[(&str, &str)] = &[
    ("prove", "doesn't exist"),
    ("prove", "does not exist"),
    ("prove", "isn't real"),
    ("prove", "is not real"),
    ("prove", "never happened"),
    ("prove", "there are no proofs"),
    ("prove", "no proofs"),
    ("show me", "doesn't exist"),
    ("demonstrate", "doesn't exist"),
    ("give a logically valid argument", "logic is invalid"),
    ("show me evidence", "evidence is meaningless"),
    ("prove that", "truth doesn't exist"),
    ("prove that", "truth does not exist"),
];

const CONTRADICTION_DIRECT: &[&str] = &[
    "argue that logic is invalid",
    "demonstrate that evidence is meaningless",
    "explain why nothing means anything",
    "give a logically valid argument that logic is invalid",
];

const DEMONSTRATION_VERBS: &[&str] = &[
    "prove",
    "show",
    "demonstrate",
    "explain",
    "argue",
    "use",
    "give",
];

const SELF_REFERENTIAL_CONCEPTS: &[(&str, &[&str])] = &[
    (
        "truth",
        &[
            "false",
            "doesn't exist",
            "does not exist",
            "is impossible",
            "is meaningless",
            "can be false",
        ],
    ),
    (
        "logic",
        &[
            "invalid",
            "doesn't work",
            "is impossible",
            "is meaningless",
            "is wrong",
        ],
    ),
    (
        "evidence",
        &["meaningless", "doesn't matter", "is impossible", "worthless"],
    ),
    (
        "certainty",
        &["impossible", "doesn't exist", "can't exist", "is impossible"],
    ),
    (
        "proof",
        &["impossible", "doesn't exist", "can't exist", "is impossible"],
    ),
    (
        "reason",
        &["invalid", "meaningless", "doesn't work", "is useless"],
    ),
    (
        "knowledge",
        &["impossible", "doesn't exist", "meaningless", "is impossible"],
    ),
];

const ANTONYM_PAIRS: &[(&str, &str)] = &[
    ("truth", "false"),
    ("true", "false"),
    ("existence", "nonexistence"),
    ("exist", "not exist"),
    ("real", "unreal"),
    ("valid", "invalid"),
    ("possible", "impossible"),
    ("certain", "uncertain"),
    ("knowledge", "ignorance"),
    ("meaning", "meaningless"),
    ("something", "nothing"),
    ("everything", "nothing"),
    ("always", "never"),
    ("up", "down"),
    ("black", "white"),
];

const INVERSION_CONNECTORS: &[&str] = &[
    " is ",
    " can be ",
    " equals ",
    " means ",
    " becomes ",
    " was ",
    " are ",
];

const INVERSION_DIRECT: &[&str] = &[
    "how truth can be false",
    "why true is false",
    "how something is nothing",
    "why up is down",
];

const IMPOSSIBILITIES: &[&str] = &[
    "square circle",
    "circular square",
    "married bachelor",
    "unmarried husband",
    "unmarried wife",
    "colorless green",
    "silent sound",
    "dark light",
    "bright darkness",
    "finite infinity",
    "infinite finite",
    "dry water",
    "wet fire",
    "living corpse",
    "dead life",
];

const SOURCE_TRIGGERS: &[&str] = &[
    "summarize the",
    "what did the",
    "according to the",
    "quote the section",
    "cite the report",
    "from the report",
];

const AUTHORITY_MARKERS: &[&str] = &[
    "cdc",
    "fda",
    "who",
    "nih",
    "iso",
    "meta-analysis",
    "paper",
    "study",
    "report",
    "guidance",
    "standard",
];

const DELEGATION: &[&str] = &[
    "what would you do if you were me",
    "what should i do",
    "tell me what to do",
    "decide for me",
    "make the decision for me",
    "you choose",
    "you decide",
    "what's the right choice",
    "whats the right choice",
    "give me the right move",
    "which should i pick",
    "tell me which to pick",
    "pick one for me",
    "choose for me",
    "rank the options and tell me which to pick",
    "validate my choice",
];

const CHOOSE_MARKERS: &[&str] = &[
    "pick",
    "choose",
    "decision",
    "which one",
    "which option",
    "recommend",
    "best option",
    "right move",
];

const CONSTRAINT_MARKERS: &[&str] = &[
    "because",
    "given",
    "constraints",
    "budget",
    "time",
    "context",
    "goal",
    "options:",
];

const UNBOUNDED: &[&str] = &[
    "forever",
    "infinite",
    "infinitely",
    "never stop",
    "keep going indefinitely",
    "indefinitely",
    "no limit",
    "unlimited",
    "endlessly",
    "until the end of time",
];

const CONDITIONAL_UNBOUNDED: &[&str] = &[
    "until you can't",
    "until it stops",
    "until there's nothing",
    "as long as possible",
    "as much as you can",
    "keep going until",
    "don't stop until",
    "repeat until",
    "continue until you",
    "go on until",
    "until i say stop",
    "until i tell you",
];

const INTENT_MARKERS: &[&str] = &[
    "what", "how", "why", "explain", "create", "help", "tell", "show", "find", "make", "can",
    "could", "would", "is", "are", "do", "does",
];

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "if", "then", "else", "when", "unless", "is", "are",
    "was", "were", "be", "been", "being", "do", "does", "did", "what", "why", "how", "can",
    "could", "would", "should", "to", "of", "in", "on", "at", "for", "with", "as", "by", "i",
    "you", "we", "they", "he", "she", "it", "this", "that", "these", "those", "because", "just",
];

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{4})\b").expect("year pattern is a valid regex"));

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

// ── Chain ────────────────────────────────────────────────────────────

/// Text handed to every detector.
pub struct Input<'a> {
    pub raw: &'a str,
    pub normalized: &'a str,
    pub config: &'a NewtonConfig,
}

/// How a rule picks the shape it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapePolicy {
    Fixed(ShapeClass),
    /// Run the shape classifier on the raw prompt.
    Classified,
}

/// One entry of the priority chain: predicate plus the outcome it forces.
pub struct Rule {
    pub category: Category,
    pub phase: Phase,
    pub shape: ShapePolicy,
    pub confidence: f64,
    pub reasoning: &'static str,
    /// Record the measured intent in the trace instead of assuming it.
    pub measures_intent: bool,
    pub detect: fn(&Input<'_>) -> bool,
}

pub static CHAIN: [Rule; 14] = [
    Rule {
        category: Category::Jailbreak,
        phase: Phase::Gap,
        shape: ShapePolicy::Classified,
        confidence: 0.9,
        reasoning: "Role-boundary or override attempt detected. Instructions to bypass governance are not accepted.",
        measures_intent: false,
        detect: detect_jailbreak,
    },
    Rule {
        category: Category::Corrosive,
        phase: Phase::Corrosive,
        shape: ShapePolicy::Fixed(ShapeClass::Circle),
        confidence: 1.0,
        reasoning: "Corrosive self-negating frame detected. Protective hold, not refusal.",
        measures_intent: false,
        detect: detect_corrosive,
    },
    Rule {
        category: Category::HedgedCorrosive,
        phase: Phase::Corrosive,
        shape: ShapePolicy::Fixed(ShapeClass::Circle),
        confidence: 0.9,
        reasoning: "Hedged self-negating frame detected. The hedge does not change the frame. Protective hold.",
        measures_intent: false,
        detect: detect_hedged_corrosive,
    },
    Rule {
        category: Category::EmotionalDependency,
        phase: Phase::Corrosive,
        shape: ShapePolicy::Fixed(ShapeClass::Circle),
        confidence: 0.85,
        reasoning: "Emotional dependency pattern detected. This cannot be your only support. Protective hold.",
        measures_intent: false,
        detect: detect_emotional_dependency,
    },
    Rule {
        category: Category::Manipulation,
        phase: Phase::Corrosive,
        shape: ShapePolicy::Fixed(ShapeClass::Circle),
        confidence: 0.85,
        reasoning: "Manipulation framing detected. A response here does not prove what is being suggested. Protective hold.",
        measures_intent: false,
        detect: detect_manipulation,
    },
    Rule {
        category: Category::Contradiction,
        phase: Phase::Contradiction,
        shape: ShapePolicy::Fixed(ShapeClass::Spiral),
        confidence: 1.0,
        reasoning: "Invalid epistemic frame (self-contradiction or impossible proof request). Reframe the goal.",
        measures_intent: false,
        detect: detect_contradiction,
    },
    Rule {
        category: Category::SelfReferentialContradiction,
        phase: Phase::Contradiction,
        shape: ShapePolicy::Fixed(ShapeClass::Spiral),
        confidence: 0.95,
        reasoning: "Self-referential contradiction detected. The request undermines itself. Reframe the goal.",
        measures_intent: false,
        detect: detect_self_referential_contradiction,
    },
    Rule {
        category: Category::SemanticInversion,
        phase: Phase::Contradiction,
        shape: ShapePolicy::Fixed(ShapeClass::Spiral),
        confidence: 0.9,
        reasoning: "Semantic inversion detected. The request equates opposites. Reframe the goal.",
        measures_intent: false,
        detect: detect_semantic_inversion,
    },
    Rule {
        category: Category::DefinitionalImpossibility,
        phase: Phase::Contradiction,
        shape: ShapePolicy::Fixed(ShapeClass::Spiral),
        confidence: 1.0,
        reasoning: "Definitional impossibility detected. The subject is incoherent by definition.",
        measures_intent: false,
        detect: detect_definitional_impossibility,
    },
    Rule {
        category: Category::HallucinationRisk,
        phase: Phase::Gap,
        shape: ShapePolicy::Fixed(ShapeClass::Triangle),
        confidence: 0.7,
        reasoning: "Unverifiable source or reference request detected. Provide the text or link, or ask for general background.",
        measures_intent: false,
        detect: detect_hallucination_risk,
    },
    Rule {
        category: Category::DelegatedAgency,
        phase: Phase::Gap,
        shape: ShapePolicy::Fixed(ShapeClass::Line),
        confidence: 0.85,
        reasoning: "Delegated agency detected. Reasoning support is available, but the choice stays with you.",
        measures_intent: false,
        detect: detect_delegated_agency,
    },
    Rule {
        category: Category::Nonsense,
        phase: Phase::Gap,
        shape: ShapePolicy::Classified,
        confidence: 0.65,
        reasoning: "Not enough semantic structure to answer reliably. Rephrase with concrete nouns and constraints.",
        measures_intent: true,
        detect: detect_nonsense,
    },
    Rule {
        category: Category::UnboundedRecursion,
        phase: Phase::Gap,
        shape: ShapePolicy::Fixed(ShapeClass::Spiral),
        confidence: 0.9,
        reasoning: "Unbounded recursion request detected. Add a limit (5 steps, 1 page, 10 bullets).",
        measures_intent: false,
        detect: detect_unbounded,
    },
    Rule {
        category: Category::ConditionalUnbounded,
        phase: Phase::Gap,
        shape: ShapePolicy::Fixed(ShapeClass::Spiral),
        confidence: 0.85,
        reasoning: "Conditional unbounded request detected. 'Until you can't' is still unbounded. Add a concrete limit.",
        measures_intent: false,
        detect: detect_conditional_unbounded,
    },
];

/// The first rule in [`CHAIN`] whose predicate fires, if any.
pub fn first_match(input: &Input<'_>) -> Option<&'static Rule> {
    CHAIN.iter().find(|rule| (rule.detect)(input))
}

// ── Predicates ───────────────────────────────────────────────────────

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

fn detect_jailbreak(input: &Input<'_>) -> bool {
    contains_any(input.normalized, JAILBREAK)
}

/// Occurrences of `phrase` in `text` with the character that follows each.
fn followers<'a>(text: &'a str, phrase: &'a str) -> impl Iterator<Item = Option<char>> + 'a {
    text.match_indices(phrase)
        .map(move |(at, _)| text[at + phrase.len()..].chars().next())
}

/// `phrase` followed by end of text or clause punctuation.
fn contains_clause_final(text: &str, phrase: &str) -> bool {
    followers(text, phrase).any(|next| next.map_or(true, |c| c.is_ascii_punctuation() && c != '\''))
}

/// `phrase` not running on into a longer word ("you're everyone's").
fn contains_whole_word(text: &str, phrase: &str) -> bool {
    followers(text, phrase).any(|next| next.map_or(true, |c| !c.is_alphanumeric() && c != '\''))
}

fn detect_corrosive(input: &Input<'_>) -> bool {
    let text = input.normalized;
    contains_any(text, CORROSIVE)
        || CORROSIVE_CLAUSE_FINAL
            .iter()
            .any(|p| contains_clause_final(text, p))
        || (contains_any(text, REASSURANCE_SEEKING) && contains_any(text, CORROSIVE_CORE))
}

/// Hedge marker and corrosive core term, anywhere and in any order.
fn detect_hedged_corrosive(input: &Input<'_>) -> bool {
    contains_any(input.normalized, HEDGES) && contains_any(input.normalized, CORROSIVE_CORE)
}

fn detect_emotional_dependency(input: &Input<'_>) -> bool {
    contains_any(input.normalized, EMOTIONAL_DEPENDENCY)
}

fn detect_manipulation(input: &Input<'_>) -> bool {
    contains_any(input.normalized, MANIPULATION)
        || MANIPULATION_WHOLE_WORD
            .iter()
            .any(|p| contains_whole_word(input.normalized, p))
}

fn detect_contradiction(input: &Input<'_>) -> bool {
    let text = input.normalized;
    CONTRADICTION_PAIRS
        .iter()
        .any(|(verb, negation)| text.contains(verb) && text.contains(negation))
        || contains_any(text, CONTRADICTION_DIRECT)
}

/// Demonstration verb, concept noun, and one of that concept's
/// negations, all present.
fn detect_self_referential_contradiction(input: &Input<'_>) -> bool {
    let text = input.normalized;
    if !contains_any(text, DEMONSTRATION_VERBS) {
        return false;
    }
    SELF_REFERENTIAL_CONCEPTS
        .iter()
        .any(|(concept, negations)| text.contains(concept) && contains_any(text, negations))
}

fn detect_semantic_inversion(input: &Input<'_>) -> bool {
    let text = input.normalized;
    let joined = ANTONYM_PAIRS.iter().any(|(concept, antonym)| {
        INVERSION_CONNECTORS.iter().any(|connector| {
            text.contains(&format!("{concept}{connector}{antonym}"))
                || text.contains(&format!("{antonym}{connector}{concept}"))
        })
    });
    joined || contains_any(text, INVERSION_DIRECT)
}

fn detect_definitional_impossibility(input: &Input<'_>) -> bool {
    contains_any(input.normalized, IMPOSSIBILITIES)
}

fn mentions_source_year(text: &str, config: &NewtonConfig) -> bool {
    let years = config.source_years();
    YEAR.captures_iter(text)
        .filter_map(|c| c[1].parse::<u16>().ok())
        .any(|y| years.contains(&y))
}

fn detect_hallucination_risk(input: &Input<'_>) -> bool {
    let text = input.normalized;
    let has_trigger = contains_any(text, SOURCE_TRIGGERS);
    let has_authority = contains_any(text, AUTHORITY_MARKERS);
    let asks_studies = text.contains("peer-reviewed") || text.contains("peer reviewed");
    let asks_dois = text.contains("doi");

    (has_trigger && (has_authority || mentions_source_year(text, input.config)))
        || (asks_studies && asks_dois)
}

fn detect_delegated_agency(input: &Input<'_>) -> bool {
    let text = input.normalized;
    if contains_any(text, DELEGATION) {
        return true;
    }
    contains_any(text, CHOOSE_MARKERS) && !contains_any(text, CONSTRAINT_MARKERS)
}

/// Lowercased letter/digit runs of the raw prompt.
pub fn word_tokens(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Longest run of one token repeated back to back.
pub fn max_consecutive_run(tokens: &[String]) -> usize {
    if tokens.is_empty() {
        return 0;
    }
    let mut best = 1;
    let mut current = 1;
    for pair in tokens.windows(2) {
        if pair[0] == pair[1] {
            current += 1;
            best = best.max(current);
        } else {
            current = 1;
        }
    }
    best
}

/// Low semantic density, judged on the raw prompt.
fn detect_nonsense(input: &Input<'_>) -> bool {
    let config = input.config;
    let tokens = word_tokens(input.raw);
    if tokens.len() <= config.nonsense_max_tokens {
        return true;
    }

    let looks_like_question = input.raw.contains('?') || detect_intent(input.raw);
    if !looks_like_question {
        return false;
    }

    let total = tokens.len() as f64;
    let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
    let unique_ratio = unique.len() as f64 / total;
    let stop_count = tokens
        .iter()
        .filter(|t| STOPWORD_SET.contains(t.as_str()))
        .count();
    let stop_ratio = stop_count as f64 / total;

    unique_ratio < config.nonsense_unique_ratio
        || stop_ratio > config.nonsense_stopword_ratio
        || max_consecutive_run(&tokens) >= config.nonsense_repeat_run
}

fn detect_unbounded(input: &Input<'_>) -> bool {
    contains_any(input.normalized, UNBOUNDED)
}

fn detect_conditional_unbounded(input: &Input<'_>) -> bool {
    contains_any(input.normalized, CONDITIONAL_UNBOUNDED)
}

/// True when the raw prompt carries a question mark or an
/// interrogative/imperative marker at the start or between spaces.
pub fn detect_intent(raw: &str) -> bool {
    let s = raw.to_lowercase();
    if s.contains('?') {
        return true;
    }
    INTENT_MARKERS
        .iter()
        .any(|m| s.starts_with(&format!("{m} ")) || s.contains(&format!(" {m} ")))
}

/// True when no unbounded keyword is present in normalized text.
pub fn recursion_bounded(normalized: &str) -> bool {
    !contains_any(normalized, UNBOUNDED)
}
