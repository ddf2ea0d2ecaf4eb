//! Comparison of extracted label fields against caller expectations.

use labelcheck_core::{ExpectedFields, VerificationReport, VerifyStatus};
use tracing::debug;

use crate::normalize::{normalize_color, normalize_dims, normalize_id, weight_to_kg, BareWeightUnit};
use crate::types::LabelFields;

/// Field comparison engine. Policy knobs are explicit fields so tests
/// and configuration can set them directly.
#[derive(Debug, Clone)]
pub struct Verifier {
    /// Unit assumed for weight strings with no unit token.
    pub bare_unit: BareWeightUnit,
    /// Weights differing by no more than this many kilograms match.
    pub weight_tolerance_kg: f64,
}

impl Default for Verifier {
    fn default() -> Self {
        Self { bare_unit: BareWeightUnit::default(), weight_tolerance_kg: 0.02 }
    }
}

impl Verifier {
    pub fn new(bare_unit: BareWeightUnit) -> Self {
        Self { bare_unit, ..Self::default() }
    }

    /// Compare every supplied expected field against its extracted
    /// counterpart. Fields are checked independently in a fixed order
    /// (product code, SKU, color, weight, dimensions) so the issue
    /// list is deterministic; unsupplied fields are skipped entirely.
    pub fn verify(&self, extracted: &LabelFields, expected: &ExpectedFields) -> VerificationReport {
        if expected.is_empty() {
            return VerificationReport::not_verified();
        }

        let mut issues = Vec::new();

        if let Some(exp) = supplied(&expected.pid) {
            self.check_identifier("Product Code", extracted.pid.as_deref(), exp, &mut issues);
        }
        if let Some(exp) = supplied(&expected.sku) {
            self.check_identifier("SKU", extracted.sku.as_deref(), exp, &mut issues);
        }
        if let Some(exp) = supplied(&expected.color) {
            self.check_color(extracted.color.as_deref(), exp, &mut issues);
        }
        if let Some(exp) = supplied(&expected.weight) {
            self.check_weight(extracted.weight.as_deref(), exp, &mut issues);
        }
        if let Some(exp) = supplied(&expected.dimensions) {
            self.check_dimensions(extracted.dimensions.as_deref(), exp, &mut issues);
        }

        let status = if issues.is_empty() { VerifyStatus::Match } else { VerifyStatus::Mismatch };
        debug!(%status, issue_count = issues.len(), "verification complete");
        VerificationReport { status, issues }
    }

    fn check_identifier(
        &self,
        label: &str,
        extracted: Option<&str>,
        expected: &str,
        issues: &mut Vec<String>,
    ) {
        let found = extracted.map(normalize_id).filter(|s| !s.is_empty());
        let Some(found) = found else {
            issues.push(format!("{label} not found on label"));
            return;
        };
        let wanted = normalize_id(expected);
        // Containment tolerates noise the recognizer appended to the
        // real code.
        if found != wanted && !found.contains(&wanted) {
            issues.push(format!(
                "{label} Mismatch: Found '{}', Expected '{expected}'",
                extracted.unwrap_or_default()
            ));
        }
    }

    fn check_color(&self, extracted: Option<&str>, expected: &str, issues: &mut Vec<String>) {
        let found = extracted.map(normalize_color).filter(|s| !s.is_empty());
        let Some(found) = found else {
            issues.push("Color not found on label".to_string());
            return;
        };
        if !found.contains(&normalize_color(expected)) {
            issues.push(format!(
                "Color Mismatch: Found '{}', Expected '{expected}'",
                extracted.unwrap_or_default()
            ));
        }
    }

    fn check_weight(&self, extracted: Option<&str>, expected: &str, issues: &mut Vec<String>) {
        let found_kg = extracted.map(|w| weight_to_kg(w, self.bare_unit)).unwrap_or(0.0);
        // 0.0 means no numeric token was found, not a zero weight.
        if found_kg == 0.0 {
            issues.push("Weight not found on label".to_string());
            return;
        }
        let expected_kg = weight_to_kg(expected, self.bare_unit);
        // 0.0 on the expected side means the caller's weight string
        // had no numeric token; there is nothing to compare against,
        // so the check is skipped like an unsupplied field.
        if expected_kg == 0.0 {
            return;
        }
        if (found_kg - expected_kg).abs() > self.weight_tolerance_kg {
            issues.push(format!(
                "Weight Mismatch: Found '{}' ({found_kg:.2} kg), Expected '{expected}' ({expected_kg:.2} kg)",
                extracted.unwrap_or_default()
            ));
        }
    }

    fn check_dimensions(&self, extracted: Option<&str>, expected: &str, issues: &mut Vec<String>) {
        let found = extracted.map(normalize_dims).filter(|s| !s.is_empty());
        let Some(found) = found else {
            issues.push("Dimensions not found on label".to_string());
            return;
        };
        let wanted = normalize_dims(expected);
        if found != wanted && !found.contains(&wanted) {
            issues.push(format!(
                "Dimensions Mismatch: Found '{}', Expected '{expected}'",
                extracted.unwrap_or_default()
            ));
        }
    }
}

fn supplied(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
