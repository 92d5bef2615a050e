// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Post-Generation Checker
// ─────────────────────────────────────────────────────────────────────
//! Advisory inspection of generated text. Flags never block output;
//! they are attached to the response so a reader can verify it.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use newton_types::NewtonConfig;

const AUTHORITY_PHRASES: &[&str] = &[
    "as a doctor",
    "as a physician",
    "as a lawyer",
    "as an attorney",
    "i am a doctor",
    "i'm a doctor",
    "licensed",
    "as a therapist",
    "as a counselor",
];

const CITATION_MARKERS: &[&str] = &["et al", "doi", "journal", "volume", "pp."];

const TIME_SENSITIVE: &[&str] = &["current price", "right now", "latest", "today"];

static DOI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b10\.[0-9]{4,9}/[-._;()/:A-Za-z0-9]+\b").expect("DOI pattern is a valid regex")
});

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{4})\b").expect("year pattern is a valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostGenFlag {
    AuthorityClaim,
    CitationLike,
    #[serde(rename = "DOILike")]
    DoiLike,
    FutureDated,
    TimeSensitiveQuery,
}

impl PostGenFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            PostGenFlag::AuthorityClaim => "AuthorityClaim",
            PostGenFlag::CitationLike => "CitationLike",
            PostGenFlag::DoiLike => "DOILike",
            PostGenFlag::FutureDated => "FutureDated",
            PostGenFlag::TimeSensitiveQuery => "TimeSensitiveQuery",
        }
    }

    fn note(self) -> &'static str {
        match self {
            PostGenFlag::AuthorityClaim => {
                "Output contains an authority or credential claim. Verify or remove."
            }
            PostGenFlag::CitationLike => {
                "Output looks like it cites sources. Verify references and quotations."
            }
            PostGenFlag::DoiLike => {
                "Output contains a DOI-like string. Ensure it is real and relevant."
            }
            PostGenFlag::FutureDated => {
                "Output references future years. Confirm the timeframe or avoid definitive claims."
            }
            PostGenFlag::TimeSensitiveQuery => {
                "Prompt is time-sensitive. Consider a live lookup or state the limitation."
            }
        }
    }
}

impl fmt::Display for PostGenFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags raised on one generated output, with one note per flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostGenReport {
    pub flags: Vec<PostGenFlag>,
    pub notes: Vec<String>,
}

impl PostGenReport {
    pub fn is_clean(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn has(&self, flag: PostGenFlag) -> bool {
        self.flags.contains(&flag)
    }

    fn raise(&mut self, flag: PostGenFlag) {
        self.flags.push(flag);
        self.notes.push(flag.note().to_string());
    }

    /// Footer appended to a decorated response. Empty when clean.
    pub fn footer(&self) -> String {
        if self.is_clean() {
            return String::new();
        }
        let flags: Vec<&str> = self.flags.iter().map(|f| f.as_str()).collect();
        format!(
            "---\nPost-Gen Flags: [{}]\n- {}",
            flags.join(", "),
            self.notes.join("\n- ")
        )
    }
}

/// Inspects generated text for claims a reader should verify.
#[derive(Debug, Clone)]
pub struct PostGenChecker {
    future_years: RangeInclusive<u16>,
}

impl Default for PostGenChecker {
    fn default() -> Self {
        Self::new(&NewtonConfig::default())
    }
}

impl PostGenChecker {
    pub fn new(config: &NewtonConfig) -> Self {
        Self {
            future_years: config.future_years(),
        }
    }

    /// Flags are reported in a fixed order: authority, citation, DOI,
    /// future date, time-sensitive prompt.
    pub fn inspect(&self, prompt: &str, output: &str) -> PostGenReport {
        let out = output.to_lowercase();
        let mut report = PostGenReport::default();

        if AUTHORITY_PHRASES.iter().any(|p| out.contains(p)) {
            report.raise(PostGenFlag::AuthorityClaim);
        }
        if CITATION_MARKERS.iter().any(|m| out.contains(m)) {
            report.raise(PostGenFlag::CitationLike);
        }
        if DOI.is_match(&out) {
            report.raise(PostGenFlag::DoiLike);
        }
        let future_dated = YEAR
            .captures_iter(&out)
            .filter_map(|c| c[1].parse::<u16>().ok())
            .any(|y| self.future_years.contains(&y));
        if future_dated {
            report.raise(PostGenFlag::FutureDated);
        }

        let p = prompt.to_lowercase();
        if TIME_SENSITIVE.iter().any(|m| p.contains(m)) {
            report.raise(PostGenFlag::TimeSensitiveQuery);
        }

        if !report.is_clean() {
            log::debug!("post-gen flags: {:?}", report.flags);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inspect(prompt: &str, output: &str) -> PostGenReport {
        PostGenChecker::default().inspect(prompt, output)
    }

    #[test]
    fn test_clean_output() {
        let report = inspect("Explain TCP", "TCP is a connection-oriented protocol.");
        assert!(report.is_clean());
        assert!(report.notes.is_empty());
        assert_eq!(report.footer(), "");
    }

    #[test]
    fn test_authority_claim() {
        let report = inspect("q", "As a doctor, I recommend rest.");
        assert_eq!(report.flags, vec![PostGenFlag::AuthorityClaim]);
        assert_eq!(report.notes.len(), 1);
    }

    #[test]
    fn test_citation_and_doi() {
        let report = inspect("q", "See Smith et al., doi:10.1038/nphys1170 for details.");
        assert_eq!(
            report.flags,
            vec![PostGenFlag::CitationLike, PostGenFlag::DoiLike]
        );
    }

    #[test]
    fn test_future_years() {
        assert!(inspect("q", "By 2027 the market doubled.").has(PostGenFlag::FutureDated));
        assert!(!inspect("q", "In 2025 the market doubled.").has(PostGenFlag::FutureDated));
        assert!(!inspect("q", "Order #120270 shipped.").has(PostGenFlag::FutureDated));
    }

    #[test]
    fn test_future_years_follow_config() {
        let checker = PostGenChecker::new(&NewtonConfig {
            future_year_min: 2025,
            ..Default::default()
        });
        assert!(checker
            .inspect("q", "In 2025 the market doubled.")
            .has(PostGenFlag::FutureDated));
    }

    #[test]
    fn test_time_sensitive_prompt() {
        let report = inspect("What is the current price of gold?", "About the same as before.");
        assert_eq!(report.flags, vec![PostGenFlag::TimeSensitiveQuery]);
    }

    #[test]
    fn test_footer_layout() {
        let report = inspect("What's the latest?", "As a lawyer, this is fine.");
        let footer = report.footer();
        assert!(footer.starts_with("---\nPost-Gen Flags: [AuthorityClaim, TimeSensitiveQuery]\n- "));
        assert_eq!(footer.lines().count(), 4);
    }

    #[test]
    fn test_flag_serde_names() {
        assert_eq!(
            serde_json::to_string(&PostGenFlag::DoiLike).unwrap(),
            "\"DOILike\""
        );
    }
}
