use serde::{Deserialize, Serialize};

/// Outcome of comparing a label against expected values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyStatus {
    #[serde(rename = "MATCH")]
    Match,
    #[serde(rename = "MISMATCH")]
    Mismatch,
    /// The caller supplied nothing to compare — distinct from both
    /// match and mismatch.
    #[serde(rename = "NOT_VERIFIED")]
    NotVerified,
}

impl std::fmt::Display for VerifyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyStatus::Match => write!(f, "MATCH"),
            VerifyStatus::Mismatch => write!(f, "MISMATCH"),
            VerifyStatus::NotVerified => write!(f, "NOT_VERIFIED"),
        }
    }
}

impl std::str::FromStr for VerifyStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MATCH" => Ok(VerifyStatus::Match),
            "MISMATCH" => Ok(VerifyStatus::Mismatch),
            "NOT_VERIFIED" => Ok(VerifyStatus::NotVerified),
            other => Err(format!("Unknown verify status: '{other}'")),
        }
    }
}

/// Verdict plus itemized discrepancies, in a fixed field-check order
/// (product code, SKU, color, weight, dimensions) so the issue list is
/// deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub status: VerifyStatus,
    pub issues: Vec<String>,
}

impl VerificationReport {
    pub fn not_verified() -> Self {
        Self {
            status: VerifyStatus::NotVerified,
            issues: vec!["No expected values provided".to_string()],
        }
    }
}
