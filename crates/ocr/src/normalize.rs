//! Canonical forms for label values.
//!
//! Both the extracted and the expected side of a comparison pass
//! through these functions; the canonical form is used only for
//! equality and tolerance checks and is never shown to the caller.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Identifier prefixes recognized on both sides of a comparison.
/// Ordered longest-first so `PID` wins over `P` and `SKU` over `S`.
/// Extending the recognized set means editing this table, not the
/// stripping logic.
const ID_PREFIXES: &[&str] = &["PID", "SKU", "CODE", "P", "S"];

const ID_SEPARATORS: &[char] = &['-', ':', ' ', '\t'];

/// Canonicalize an identifier (PID, SKU): uppercase, then strip
/// leading prefixes from [`ID_PREFIXES`] together with any following
/// separators, repeating until none applies. Running to a fixpoint
/// makes the function idempotent for every input, including
/// degenerate stacked prefixes like `SKU-S123`.
pub fn normalize_id(raw: &str) -> String {
    let mut s = raw.trim().to_uppercase();
    loop {
        let stripped = ID_PREFIXES
            .iter()
            .find_map(|p| s.strip_prefix(p))
            .map(|rest| rest.trim_start_matches(ID_SEPARATORS).to_string());
        match stripped {
            Some(rest) if rest != s => s = rest,
            _ => break,
        }
    }
    s.trim().to_string()
}

/// Ambient unit assumed for a weight string that carries no unit
/// token. The calling client's form submits grams by convention, so
/// grams is the default; the policy is explicit configuration, not a
/// hidden fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BareWeightUnit {
    #[default]
    Grams,
    Kilograms,
    Pounds,
    Ounces,
}

impl BareWeightUnit {
    fn to_kg(self, value: f64) -> f64 {
        match self {
            BareWeightUnit::Grams => value / 1000.0,
            BareWeightUnit::Kilograms => value,
            BareWeightUnit::Pounds => value * 0.453592,
            BareWeightUnit::Ounces => value * 0.0283495,
        }
    }
}

fn re_weight_value() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(kg|g|lbs?|oz)?").expect("invalid regex")
    })
}

/// Parse the first numeric token of a weight string and convert it to
/// kilograms using the adjacent unit token, or `bare` when the number
/// carries no unit. Returns 0.0 when no numeric token exists at all —
/// the verifier treats that as "absent", never as a zero weight.
pub fn weight_to_kg(raw: &str, bare: BareWeightUnit) -> f64 {
    let Some(caps) = re_weight_value().captures(raw) else {
        return 0.0;
    };
    let value: f64 = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0);
    match caps.get(2).map(|m| m.as_str().to_lowercase()) {
        Some(unit) => match unit.as_str() {
            "kg" => value,
            "g" => value / 1000.0,
            "lb" | "lbs" => value * 0.453592,
            "oz" => value * 0.0283495,
            _ => value,
        },
        None => bare.to_kg(value),
    }
}

/// Canonicalize a dimension string: keep only digits and the
/// separator letter `X`, uppercased. `"20 x 15 x 10cm"` → `"20X15X10"`.
pub fn normalize_dims(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == 'x' || *c == 'X')
        .collect::<String>()
        .to_uppercase()
}

/// Canonicalize a color value: uppercase and trim. Comparison is
/// containment of expected within extracted, tolerating trailing
/// recognition noise.
pub fn normalize_color(raw: &str) -> String {
    raw.trim().to_uppercase()
}
