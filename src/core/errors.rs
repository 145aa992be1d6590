//! Core error types for the recognition pipeline.
//!
//! All failures that abort a request are expressed through [`OcrError`].
//! A field failing confidence or format validation is deliberately *not*
//! an error: it is recorded on the field record as unrecognized and the
//! request continues.

use thiserror::Error;

/// Errors that can occur while processing a recognition request.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The source image could not be fetched or decoded.
    #[error("image load failed: {message}")]
    ImageLoad {
        /// Description of what went wrong (unreachable, undecodable, absent).
        message: String,
    },

    /// A model invocation failed.
    #[error("inference failed in model '{model_name}': {context}")]
    Inference {
        /// The model that failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred during image or tensor processing.
    #[error("processing failed: {context}")]
    Processing {
        /// Additional context about the error.
        context: String,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from basic tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for OcrError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad {
            message: error.to_string(),
        }
    }
}

impl OcrError {
    /// Creates an image-load error with context.
    pub fn image_load(message: impl Into<String>) -> Self {
        Self::ImageLoad {
            message: message.into(),
        }
    }

    /// Wraps an error raised while invoking a model.
    pub fn inference(
        model_name: impl Into<String>,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.into(),
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates a processing error with context.
    pub fn processing(context: impl Into<String>) -> Self {
        Self::Processing {
            context: context.into(),
        }
    }

    /// Creates a configuration error for missing required fields.
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: format!(
                "missing required field '{}' in {}",
                field.into(),
                context.into()
            ),
        }
    }

    /// Creates a configuration error for invalid field values.
    pub fn invalid_field(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: format!(
                "invalid value for field '{}': expected {}, got {}",
                field.into(),
                expected.into(),
                actual.into()
            ),
        }
    }
}
