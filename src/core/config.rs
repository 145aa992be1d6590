//! Pipeline configuration.
//!
//! The pipeline is fully data-driven: which fields are recognized, by
//! which model, with which alphabet and thresholds, all comes from a
//! TOML document. [`PipelineConfig::validate`] runs once at startup so
//! the request path can assume a consistent configuration.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::errors::OcrError;
use crate::domain::classes::LicenseFieldClass;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
    pub recognition: RecognitionConfig,
}

/// Detection stage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    /// Name the detection model is registered under.
    pub model_name: String,
    /// Square input side length the detector was exported with.
    #[serde(default = "default_input_size")]
    pub input_size: u32,
    /// Minimum score for a detection to count towards side validation.
    pub threshold: f32,
    /// Fields that must all be present for the front side to be accepted.
    pub front_fields: Vec<LicenseFieldClass>,
    /// Fields that must all be present for the back side to be accepted.
    pub back_fields: Vec<LicenseFieldClass>,
}

fn default_input_size() -> u32 {
    1280
}

/// Recognition stage configuration.
///
/// `fields` is ordered: the response lists field records in exactly
/// this order. Several fields may share one model entry (the three date
/// fields typically do).
#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionConfig {
    pub fields: Vec<FieldBinding>,
    pub models: HashMap<String, RecognizerModelConfig>,
}

/// Binds one recognized field to a recognition model entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldBinding {
    pub name: LicenseFieldClass,
    pub model: String,
}

/// One text recognition model.
#[derive(Debug, Clone, Deserialize)]
pub struct RecognizerModelConfig {
    /// Name the model is registered under.
    pub model_name: String,
    /// Input height the model was exported with.
    pub image_height: u32,
    /// Input width the model was exported with.
    pub image_width: u32,
    /// Alphabet in model output order; the blank symbol is implicit at
    /// index `vocabulary.len()`.
    pub vocabulary: String,
    /// Minimum word score for the decoded text to be accepted.
    pub threshold: f32,
}

impl PipelineConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, OcrError> {
        let config: Self = toml::from_str(text).map_err(|e| OcrError::Config {
            message: format!("failed to parse configuration: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OcrError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Checks cross-references and value ranges.
    pub fn validate(&self) -> Result<(), OcrError> {
        if self.detector.model_name.is_empty() {
            return Err(OcrError::missing_field("model_name", "detector"));
        }
        if self.detector.input_size == 0 {
            return Err(OcrError::invalid_field(
                "detector.input_size",
                "a positive side length",
                "0",
            ));
        }
        if !(0.0..=1.0).contains(&self.detector.threshold) {
            return Err(OcrError::invalid_field(
                "detector.threshold",
                "a score in [0, 1]",
                self.detector.threshold.to_string(),
            ));
        }
        if self.detector.front_fields.is_empty() || self.detector.back_fields.is_empty() {
            return Err(OcrError::Config {
                message: "detector.front_fields and detector.back_fields must be non-empty"
                    .to_string(),
            });
        }

        for binding in &self.recognition.fields {
            if !self.recognition.models.contains_key(&binding.model) {
                return Err(OcrError::Config {
                    message: format!(
                        "field '{}' references unknown recognition model '{}'",
                        binding.name.name(),
                        binding.model
                    ),
                });
            }
        }
        for (key, model) in &self.recognition.models {
            if model.model_name.is_empty() {
                return Err(OcrError::missing_field(
                    "model_name",
                    format!("recognition model '{key}'"),
                ));
            }
            if model.vocabulary.is_empty() {
                return Err(OcrError::missing_field(
                    "vocabulary",
                    format!("recognition model '{key}'"),
                ));
            }
            if model.image_height == 0 || model.image_width == 0 {
                return Err(OcrError::invalid_field(
                    format!("recognition model '{key}' input size"),
                    "positive dimensions",
                    format!("{}x{}", model.image_width, model.image_height),
                ));
            }
            if !(0.0..=1.0).contains(&model.threshold) {
                return Err(OcrError::invalid_field(
                    format!("recognition model '{key}' threshold"),
                    "a score in [0, 1]",
                    model.threshold.to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Model entry bound to a field. Validated configurations always
    /// resolve; the error covers hand-built configurations.
    pub fn model_for(&self, binding: &FieldBinding) -> Result<&RecognizerModelConfig, OcrError> {
        self.recognition
            .models
            .get(&binding.model)
            .ok_or_else(|| OcrError::Config {
                message: format!("unknown recognition model '{}'", binding.model),
            })
    }

    /// Names of every model the pipeline invokes, detector included.
    pub fn model_names(&self) -> Vec<String> {
        let mut names = vec![self.detector.model_name.clone()];
        for model in self.recognition.models.values() {
            if !names.contains(&model.model_name) {
                names.push(model.model_name.clone());
            }
        }
        names
    }
}
