//! Driver's licence field recognition pipeline.
//!
//! Orchestrates a detection model and a set of text recognition models
//! over ONNX Runtime: the detector finds field boxes on a licence
//! photo, the document is rotated upright from the layout of anchor
//! fields, the capture is validated against per-side required fields,
//! and front-side field crops are decoded into text with CTC greedy
//! decoding plus per-field format validation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use license_ocr::core::{OrtModelRunner, PipelineConfig};
//! use license_ocr::pipeline::LicenseRecognizer;
//!
//! # fn main() -> Result<(), license_ocr::core::OcrError> {
//! let config = PipelineConfig::load("configs/license.toml")?;
//! let runner = OrtModelRunner::from_model_dir("models", config.model_names())?;
//! let recognizer = LicenseRecognizer::new(config, Arc::new(runner));
//!
//! let image = image::open("license.jpg")?.to_rgb8();
//! let result = recognizer.recognize(image)?;
//! println!("found: {}", result.is_document_found);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod utils;

pub use crate::core::{ModelRunner, OcrError, OrtModelRunner, PipelineConfig};
pub use crate::domain::{DocumentRecognitionResult, LicenseFieldClass, LicenseSide};
pub use crate::pipeline::LicenseRecognizer;
