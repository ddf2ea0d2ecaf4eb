use serde::{Deserialize, Serialize};

/// Caller-supplied expected label values, exactly as typed into the
/// requesting form — prefixes and units intact ("PID-1804", "2.5kg").
/// Every field is independently optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpectedFields {
    pub pid: Option<String>,
    pub sku: Option<String>,
    pub weight: Option<String>,
    pub color: Option<String>,
    pub dimensions: Option<String>,
}

impl ExpectedFields {
    /// True when no field carries a non-blank value — the caller sent
    /// nothing to verify against.
    pub fn is_empty(&self) -> bool {
        [&self.pid, &self.sku, &self.weight, &self.color, &self.dimensions]
            .iter()
            .all(|f| f.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}
