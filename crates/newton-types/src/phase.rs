// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Phase and Shape Enumerations
// ─────────────────────────────────────────────────────────────────────

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NewtonError;

/// Discrete governance state produced for every prompt.
///
/// Only `Return` permits generation. Codes 2–6 are reserved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Phase {
    #[default]
    Ready = 0,
    Gap = 1,
    Corrosive = 7,
    Contradiction = 8,
    Return = 9,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Ready,
        Phase::Gap,
        Phase::Corrosive,
        Phase::Contradiction,
        Phase::Return,
    ];

    /// Numeric phase code.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Ready => "READY",
            Phase::Gap => "GAP",
            Phase::Corrosive => "CORROSIVE",
            Phase::Contradiction => "CONTRADICTION",
            Phase::Return => "RETURN",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Phase::Ready => "○",
            Phase::Gap => "│",
            Phase::Corrosive => "⚠",
            Phase::Contradiction => "∞",
            Phase::Return => "◉",
        }
    }

    /// The single gate: generation runs at phase 9 and nowhere else.
    pub fn permits_generation(self) -> bool {
        self == Phase::Return
    }
}

impl TryFrom<u8> for Phase {
    type Error = NewtonError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Phase::Ready),
            1 => Ok(Phase::Gap),
            7 => Ok(Phase::Corrosive),
            8 => Ok(Phase::Contradiction),
            9 => Ok(Phase::Return),
            other => Err(NewtonError::InvalidPhase(other)),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.label())
    }
}

/// Structural complexity class of a prompt's syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeClass {
    Point,
    Line,
    Triangle,
    Square,
    Circle,
    Spiral,
}

impl ShapeClass {
    /// Complexity rank, 0 (point) through 5 (spiral).
    pub fn complexity(self) -> u8 {
        match self {
            ShapeClass::Point => 0,
            ShapeClass::Line => 1,
            ShapeClass::Triangle => 2,
            ShapeClass::Square => 3,
            ShapeClass::Circle => 4,
            ShapeClass::Spiral => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeClass::Point => "point",
            ShapeClass::Line => "line",
            ShapeClass::Triangle => "triangle",
            ShapeClass::Square => "square",
            ShapeClass::Circle => "circle",
            ShapeClass::Spiral => "spiral",
        }
    }
}

impl fmt::Display for ShapeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_return_permits() {
        for phase in Phase::ALL {
            assert_eq!(phase.permits_generation(), phase == Phase::Return);
        }
    }

    #[test]
    fn test_phase_codes() {
        let codes: Vec<u8> = Phase::ALL.iter().map(|p| p.code()).collect();
        assert_eq!(codes, vec![0, 1, 7, 8, 9]);
    }

    #[test]
    fn test_reserved_codes_rejected() {
        for code in 2..=6 {
            assert!(matches!(
                Phase::try_from(code),
                Err(NewtonError::InvalidPhase(c)) if c == code
            ));
        }
        assert!(Phase::try_from(10).is_err());
        assert_eq!(Phase::try_from(8).unwrap(), Phase::Contradiction);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Corrosive.to_string(), "7 (CORROSIVE)");
    }

    #[test]
    fn test_shape_complexity_monotonic() {
        let shapes = [
            ShapeClass::Point,
            ShapeClass::Line,
            ShapeClass::Triangle,
            ShapeClass::Square,
            ShapeClass::Circle,
            ShapeClass::Spiral,
        ];
        for (rank, shape) in shapes.iter().enumerate() {
            assert_eq!(shape.complexity() as usize, rank);
        }
    }

    #[test]
    fn test_serde_labels() {
        assert_eq!(serde_json::to_string(&Phase::Return).unwrap(), "\"RETURN\"");
        assert_eq!(serde_json::to_string(&ShapeClass::Spiral).unwrap(), "\"spiral\"");
    }
}
