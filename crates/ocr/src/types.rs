use serde::{Deserialize, Serialize};

/// One line of recognized text with the backend's confidence in it
/// (0.0 = guessed, 1.0 = certain). Line order mirrors label layout —
/// a key like "PID:" is usually followed by its value within the next
/// few lines — and is the only structural relationship available.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognizedLine {
    pub text: String,
    pub confidence: f32,
}

impl RecognizedLine {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self { text: text.into(), confidence: confidence.clamp(0.0, 1.0) }
    }
}

/// The structured fields pulled from one label scan.
///
/// Field values hold the original recognized text (or a raw substring
/// of it), never a normalized form — canonical forms exist only inside
/// the verifier. Each field is set at most once per scan: the first
/// heuristic match wins and later candidates are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelFields {
    pub sku: Option<String>,
    /// Product identifier code; serialized as `product_code` so the
    /// response is a drop-in replacement for the service it replaces.
    #[serde(rename = "product_code")]
    pub pid: Option<String>,
    pub weight: Option<String>,
    pub color: Option<String>,
    pub dimensions: Option<String>,
    pub location: Option<String>,
    pub brand: Option<String>,
    /// Aggregate confidence across the lines that carried key field
    /// indicators, rounded to 2 decimals for the wire.
    pub confidence_score: f32,
    /// Every recognized line, untouched, for auditability.
    pub raw_lines: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognized_line_clamps_confidence() {
        assert_eq!(RecognizedLine::new("x", 1.5).confidence, 1.0);
        assert_eq!(RecognizedLine::new("x", -0.2).confidence, 0.0);
        assert_eq!(RecognizedLine::new("x", 0.42).confidence, 0.42);
    }

    #[test]
    fn label_fields_serialize_with_wire_names() {
        let fields = LabelFields {
            sku: Some("ELEC-552".into()),
            pid: Some("PID-1804".into()),
            confidence_score: 0.97,
            raw_lines: vec!["SKU: ELEC-552".into()],
            ..Default::default()
        };
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["sku"], "ELEC-552");
        assert!((json["confidence_score"].as_f64().unwrap() - 0.97).abs() < 1e-6);
        assert_eq!(json["raw_lines"][0], "SKU: ELEC-552");
        // The identifier goes over the wire under the original
        // service's name.
        assert_eq!(json["product_code"], "PID-1804");
        assert!(json.get("pid").is_none());
    }
}
