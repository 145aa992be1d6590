//! Request-scoped result types.
//!
//! Everything here is a value object owned by a single recognition
//! request; nothing is shared or mutated across requests.

use crate::domain::classes::LicenseFieldClass;
use crate::domain::side::LicenseSide;
use crate::processors::geometry::BBox;
use serde::Serialize;

/// A single deduplicated field detection in source-image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedField {
    pub field_class: LicenseFieldClass,
    pub bbox: BBox,
    pub score: f32,
}

/// Output of the detection stage for one document.
///
/// Owns the orientation-corrected image for the rest of the request;
/// boxes are in the corrected image's coordinate system.
#[derive(Debug)]
pub struct DetectionOutcome {
    /// The document image rotated upright.
    pub image: image::RgbImage,
    /// At most one detection per field class.
    pub fields: Vec<DetectedField>,
    /// Applied correction angle in degrees, one of 0/90/180/270.
    pub rotation_angle: u32,
    /// Whether one side's required fields were all confidently detected.
    pub is_correct: bool,
    /// Which side was captured, when `is_correct`.
    pub side: LicenseSide,
}

/// Decoded text for one field crop, before acceptance gating.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    /// Mean per-timestep confidence of each emitted character.
    pub symbol_scores: Vec<f32>,
    /// Weakest character confidence; 0.0 for an empty decode.
    pub word_score: f32,
    /// Set by the caller after threshold and format validation.
    pub is_accepted: bool,
}

impl RecognizedText {
    /// An empty decode. Never accepted.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            symbol_scores: Vec::new(),
            word_score: 0.0,
            is_accepted: false,
        }
    }
}

/// Field-level result exposed in the API response.
///
/// Default-constructed for every configured field before recognition
/// starts; patched in place as detections and accepted texts arrive.
#[derive(Debug, Clone, Serialize)]
pub struct FieldRecognitionRecord {
    pub field_name: LicenseFieldClass,
    pub is_detected: bool,
    /// `[x_min, y_min, x_max, y_max]`, empty until detected.
    pub bbox: Vec<f32>,
    pub detect_score: f32,
    pub is_recognized: bool,
    pub text: String,
    pub text_score: f32,
    pub symbol_scores: Vec<f32>,
}

impl FieldRecognitionRecord {
    /// The placeholder record for a field not (yet) detected.
    pub fn not_detected(field_name: LicenseFieldClass) -> Self {
        Self {
            field_name,
            is_detected: false,
            bbox: Vec::new(),
            detect_score: 0.0,
            is_recognized: false,
            text: String::new(),
            text_score: 0.0,
            symbol_scores: Vec::new(),
        }
    }

    /// Marks the field as detected.
    pub fn mark_detected(&mut self, bbox: BBox, detect_score: f32) {
        self.is_detected = true;
        self.bbox = vec![bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max];
        self.detect_score = detect_score;
    }

    /// Records an accepted recognition. Rejected recognitions leave the
    /// record untouched so the field stays unrecognized.
    pub fn mark_recognized(&mut self, recognized: RecognizedText) {
        debug_assert!(recognized.is_accepted);
        self.is_recognized = true;
        self.text = recognized.text;
        self.text_score = recognized.word_score;
        self.symbol_scores = recognized.symbol_scores;
    }
}

/// Terminal artifact of one recognition request.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecognitionResult {
    pub is_document_found: bool,
    pub side: LicenseSide,
    pub fields: Vec<FieldRecognitionRecord>,
}

impl DocumentRecognitionResult {
    /// The result for a rejected document: nothing found, no fields.
    pub fn not_found() -> Self {
        Self {
            is_document_found: false,
            side: LicenseSide::None,
            fields: Vec::new(),
        }
    }
}
