use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

/// Release maturity label, e.g. "Release", "Beta", "Alpha".
///
/// The site treats this as an open set, so unrecognized labels are carried
/// through verbatim rather than rejected. Informational only; nothing in
/// the reconcile or match logic branches on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Maturity {
    Release,
    Beta,
    Alpha,
    Other(String),
}

impl Maturity {
    pub fn as_str(&self) -> &str {
        match self {
            Maturity::Release => "Release",
            Maturity::Beta => "Beta",
            Maturity::Alpha => "Alpha",
            Maturity::Other(label) => label,
        }
    }
}

impl From<&str> for Maturity {
    fn from(s: &str) -> Self {
        match s.trim() {
            "Release" | "release" => Self::Release,
            "Beta" | "beta" => Self::Beta,
            "Alpha" | "alpha" => Self::Alpha,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for Maturity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels() {
        assert_eq!(Maturity::from("Release"), Maturity::Release);
        assert_eq!(Maturity::from("beta"), Maturity::Beta);
    }

    #[test]
    fn test_unknown_labels_pass_through() {
        let maturity = Maturity::from("Release Candidate");
        assert_eq!(maturity, Maturity::Other("Release Candidate".to_string()));
        assert_eq!(maturity.as_str(), "Release Candidate");
    }
}
