pub mod extract;
pub mod lines;
pub mod normalize;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod types;
pub mod verify;

pub use extract::LabelExtractor;
pub use lines::normalize_for_matching;
pub use normalize::{normalize_color, normalize_dims, normalize_id, weight_to_kg, BareWeightUnit};
pub use pipeline::{LabelPipeline, PipelineError, Verification};
pub use preprocess::{prepare_for_ocr_from_bytes, PreprocessError};
pub use recognizer::{LineRecognizer, MockRecognizer, OcrError, UnavailableRecognizer};
pub use types::{LabelFields, RecognizedLine};
pub use verify::Verifier;
