//! Recognition engine shared between CLI and server modes.

use std::sync::Arc;
use std::time::Duration;

use image::RgbImage;
use license_ocr::core::{OcrError, OrtModelRunner};
use license_ocr::domain::{DetectionOutcome, DocumentRecognitionResult};
use license_ocr::pipeline::{self, LicenseRecognizer};
use tracing::info;

use crate::config::{ImageDownloadConfig, ServiceConfig};

/// The pipeline plus the image store client.
pub struct RecognizerEngine {
    recognizer: LicenseRecognizer,
    http: reqwest::Client,
    download: ImageDownloadConfig,
}

/// Thread-safe engine handle shared across request handlers.
pub type SharedEngine = Arc<RecognizerEngine>;

impl RecognizerEngine {
    /// Loads every configured model and builds the pipeline.
    pub fn new(config: &ServiceConfig) -> Result<Self, OcrError> {
        let runner =
            OrtModelRunner::from_model_dir(&config.models_dir, config.pipeline.model_names())?;
        let recognizer = LicenseRecognizer::new(config.pipeline.clone(), Arc::new(runner));
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.image_download.timeout_sec))
            .build()
            .map_err(|e| OcrError::Config {
                message: format!("failed to build http client: {e}"),
            })?;
        info!("recognition engine initialized");
        Ok(Self {
            recognizer,
            http,
            download: config.image_download.clone(),
        })
    }

    /// Fetches and decodes the document image behind a storage guid.
    pub async fn fetch_image(&self, guid: &str) -> Result<RgbImage, OcrError> {
        let url = self.download.url_for(guid);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| OcrError::image_load(format!("fetch failed for guid {guid}: {e}")))?;
        if !response.status().is_success() {
            return Err(OcrError::image_load(format!(
                "image store returned {} for guid {guid}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| OcrError::image_load(format!("body read failed for guid {guid}: {e}")))?;
        decode_image(&bytes)
    }

    /// Runs the detection stage.
    pub fn detect(&self, image: RgbImage) -> Result<DetectionOutcome, OcrError> {
        self.recognizer.detect(image)
    }

    /// Completes a request from a detection outcome.
    pub fn recognize_document(
        &self,
        outcome: DetectionOutcome,
    ) -> Result<DocumentRecognitionResult, OcrError> {
        self.recognizer.recognize_document(outcome)
    }

    /// Full pipeline on an already loaded image, for CLI use.
    pub fn recognize(&self, image: RgbImage) -> Result<DocumentRecognitionResult, OcrError> {
        self.recognizer.recognize(image)
    }

    /// Weakest detection score of an outcome, if any field was detected.
    pub fn min_detection_score(outcome: &DetectionOutcome) -> Option<f32> {
        pipeline::min_detection_score(outcome)
    }
}

/// Decodes image bytes into RGB.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, OcrError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| OcrError::image_load(format!("failed to decode image: {e}")))?;
    Ok(image.to_rgb8())
}
