//! Configuration, errors and the model execution boundary.

pub mod config;
pub mod errors;
pub mod inference;

pub use config::PipelineConfig;
pub use errors::OcrError;
pub use inference::{ModelRunner, OrtModelRunner};
