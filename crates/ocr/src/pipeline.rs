use labelcheck_core::{ExpectedFields, VerificationReport};
use thiserror::Error;
use tracing::info;

use crate::extract::LabelExtractor;
use crate::preprocess;
use crate::recognizer::{LineRecognizer, OcrError};
use crate::types::LabelFields;
use crate::verify::Verifier;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The uploaded bytes could not be decoded as an image.
    #[error("Invalid image file: {0}")]
    InvalidImage(#[from] preprocess::PreprocessError),
    /// Recognition ran but produced no lines — verification could not
    /// be attempted, which is different from a mismatch verdict.
    #[error("No text detected")]
    NoTextDetected,
    /// The recognition backend itself failed; the upstream message is
    /// preserved.
    #[error("OCR recognition failed: {0}")]
    Recognition(#[from] OcrError),
}

/// The verdict plus the structured fields it was computed from.
#[derive(Debug)]
pub struct Verification {
    pub report: VerificationReport,
    pub fields: LabelFields,
}

/// Per-process handle orchestrating one label check: decode →
/// recognize → extract → verify. Constructed once at startup with its
/// recognizer and shared by reference into request handling; it holds
/// no per-request state, so concurrent calls need no locking.
pub struct LabelPipeline<R: LineRecognizer> {
    recognizer: R,
    verifier: Verifier,
}

impl<R: LineRecognizer> LabelPipeline<R> {
    pub fn new(recognizer: R, verifier: Verifier) -> Self {
        Self { recognizer, verifier }
    }

    /// Check one uploaded label image against the expected values.
    /// Every failure path surfaces as a [`PipelineError`]; a field
    /// that is simply absent from the label is not a failure — it
    /// folds into the verdict as a mismatch issue.
    pub fn verify_label(
        &self,
        image: &[u8],
        expected: &ExpectedFields,
    ) -> Result<Verification, PipelineError> {
        let png = preprocess::prepare_for_ocr_from_bytes(image)?;
        let lines = self.recognizer.recognize_lines(&png)?;
        if lines.is_empty() {
            return Err(PipelineError::NoTextDetected);
        }

        let fields = LabelExtractor::extract(&lines);
        let report = self.verifier.verify(&fields, expected);
        info!(
            lines = lines.len(),
            confidence = fields.confidence_score,
            status = %report.status,
            "label verified"
        );
        Ok(Verification { report, fields })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
