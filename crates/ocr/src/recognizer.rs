use thiserror::Error;

use crate::types::RecognizedLine;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR backend not available — build with `tesseract` feature")]
    NotAvailable,
}

/// Abstraction over a text recognition backend.
///
/// Implementations accept preprocessed PNG bytes and return the
/// recognized lines in reading order, each with a confidence score.
/// The whole list is produced before extraction starts — look-ahead
/// needs it complete, so streaming partial results is not supported.
pub trait LineRecognizer: Send + Sync {
    fn recognize_lines(&self, image_bytes: &[u8]) -> Result<Vec<RecognizedLine>, OcrError>;
}

impl<T: LineRecognizer + ?Sized> LineRecognizer for Box<T> {
    fn recognize_lines(&self, image_bytes: &[u8]) -> Result<Vec<RecognizedLine>, OcrError> {
        (**self).recognize_lines(image_bytes)
    }
}

// ── Mock backend (always available, used for tests) ──────────────────────────

/// Returns a pre-set line list regardless of input — lets the
/// extraction and verification path be exercised without any OCR
/// engine installed.
pub struct MockRecognizer {
    pub lines: Vec<RecognizedLine>,
}

impl MockRecognizer {
    pub fn new(lines: Vec<RecognizedLine>) -> Self {
        Self { lines }
    }

    /// Convenience constructor from `(text, confidence)` pairs.
    pub fn from_pairs(pairs: &[(&str, f32)]) -> Self {
        Self::new(pairs.iter().map(|(t, c)| RecognizedLine::new(*t, *c)).collect())
    }
}

impl LineRecognizer for MockRecognizer {
    fn recognize_lines(&self, _image_bytes: &[u8]) -> Result<Vec<RecognizedLine>, OcrError> {
        Ok(self.lines.clone())
    }
}

/// Stand-in used when the build carries no real backend: every call
/// fails with [`OcrError::NotAvailable`] so the request boundary can
/// report a clean error instead of fabricating results.
pub struct UnavailableRecognizer;

impl LineRecognizer for UnavailableRecognizer {
    fn recognize_lines(&self, _image_bytes: &[u8]) -> Result<Vec<RecognizedLine>, OcrError> {
        Err(OcrError::NotAvailable)
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ───────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{LineRecognizer, OcrError};
    use crate::types::RecognizedLine;
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl LineRecognizer for TesseractRecognizer {
        fn recognize_lines(&self, image_bytes: &[u8]) -> Result<Vec<RecognizedLine>, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = lt.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))?;
            // Leptess exposes one confidence per page; spread it over
            // the lines it produced.
            let confidence = lt.mean_text_conf() as f32 / 100.0;
            Ok(text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(|l| RecognizedLine::new(l, confidence))
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_preset_lines() {
        let r = MockRecognizer::from_pairs(&[("SKU: ELEC-552", 0.97), ("250g", 0.9)]);
        let lines = r.recognize_lines(b"fake image data").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "SKU: ELEC-552");
        assert_eq!(lines[1].confidence, 0.9);
    }

    #[test]
    fn mock_ignores_image_content() {
        let r = MockRecognizer::from_pairs(&[("hello", 1.0)]);
        assert_eq!(r.recognize_lines(b"anything").unwrap().len(), 1);
        assert_eq!(r.recognize_lines(b"").unwrap().len(), 1);
    }

    #[test]
    fn unavailable_backend_reports_cleanly() {
        let err = UnavailableRecognizer.recognize_lines(b"img").unwrap_err();
        assert!(matches!(err, OcrError::NotAvailable));
    }
}
