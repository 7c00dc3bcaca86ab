//! Severity level for moderation findings.
//!
//! This type lives in `core` so that the analysis layer and CLI output
//! share the same parsing and display rules.

use serde::{Deserialize, Serialize};

/// Severity assigned to a flagged listing, ordered from lowest to highest.
///
/// Model output is untrusted: [`parse`](Severity::parse) degrades any
/// unrecognized string to [`Severity::Low`] instead of failing the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Low severity.
    Low,
    /// Medium severity.
    Medium,
    /// High severity.
    High,
}

impl Severity {
    /// Parses a severity string (case-insensitive), degrading unknown
    /// values to [`Severity::Low`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("high", Severity::High; "plain high")]
    #[test_case("HIGH", Severity::High; "uppercase high")]
    #[test_case("Medium", Severity::Medium; "mixed case medium")]
    #[test_case("low", Severity::Low; "plain low")]
    #[test_case("critical", Severity::Low; "unknown degrades to low")]
    #[test_case("", Severity::Low; "empty degrades to low")]
    fn test_severity_parse(input: &str, expected: Severity) {
        assert_eq!(Severity::parse(input), expected);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(format!("{}", Severity::High), "high");
        assert_eq!(format!("{}", Severity::Low), "low");
    }
}
