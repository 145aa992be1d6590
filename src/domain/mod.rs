//! Domain model: field classes, licence sides and result types.

pub mod classes;
pub mod result;
pub mod side;

pub use classes::{FieldKind, LicenseFieldClass};
pub use result::{
    DetectedField, DetectionOutcome, DocumentRecognitionResult, FieldRecognitionRecord,
    RecognizedText,
};
pub use side::LicenseSide;
