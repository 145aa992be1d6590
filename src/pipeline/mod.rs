//! End-to-end document recognition pipeline.
//!
//! One [`LicenseRecognizer`] is built at startup and shared across
//! requests. A request flows detect → orient → validate → per-field
//! recognize; model failures abort the request, per-field rejections
//! only leave that field unrecognized.

use std::collections::HashMap;
use std::sync::Arc;

use image::RgbImage;
use ndarray::{ArrayD, ArrayView2};
use tracing::{debug, info, warn};

use crate::core::config::{FieldBinding, PipelineConfig};
use crate::core::errors::OcrError;
use crate::core::inference::ModelRunner;
use crate::domain::classes::LicenseFieldClass;
use crate::domain::result::{
    DetectedField, DetectionOutcome, DocumentRecognitionResult, FieldRecognitionRecord,
    RecognizedText,
};
use crate::domain::side::LicenseSide;
use crate::processors::decode::CtcLabelDecode;
use crate::processors::detection::{self, RawDetection};
use crate::processors::orientation;
use crate::processors::preprocess;
use crate::processors::side_check;
use crate::processors::validation;
use crate::utils;

/// Output tensors requested from the detection model, in extraction order.
const DETECTION_OUTPUTS: [&str; 3] = ["detection_boxes", "detection_classes", "detection_scores"];
/// The single output tensor of every recognition model.
const RECOGNITION_OUTPUT: &str = "output";

/// The document recognition pipeline.
pub struct LicenseRecognizer {
    config: PipelineConfig,
    runner: Arc<dyn ModelRunner>,
    /// One decoder per recognition model entry, keyed like the config.
    decoders: HashMap<String, CtcLabelDecode>,
}

impl LicenseRecognizer {
    pub fn new(config: PipelineConfig, runner: Arc<dyn ModelRunner>) -> Self {
        let decoders = config
            .recognition
            .models
            .iter()
            .map(|(key, model)| (key.clone(), CtcLabelDecode::new(&model.vocabulary)))
            .collect();
        Self {
            config,
            runner,
            decoders,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Full pipeline: detection, orientation correction, validation and
    /// front-side field recognition.
    pub fn recognize(&self, image: RgbImage) -> Result<DocumentRecognitionResult, OcrError> {
        let outcome = self.detect(image)?;
        self.recognize_document(outcome)
    }

    /// Runs the detector and normalizes its output: one box per class
    /// in upright source-image pixels, plus the side verdict.
    pub fn detect(&self, image: RgbImage) -> Result<DetectionOutcome, OcrError> {
        let detector = &self.config.detector;
        let (tensor, scale, pad) = preprocess::detector_tensor(&image, detector.input_size);
        let outputs =
            self.runner
                .infer(&detector.model_name, tensor.into_dyn(), &DETECTION_OUTPUTS)?;
        let [boxes, classes, scores] = <[ArrayD<f32>; 3]>::try_from(outputs).map_err(|_| {
            OcrError::processing("detection model returned an unexpected number of outputs")
        })?;

        let candidates = collect_candidates(&boxes, &classes, &scores, &detector.model_name)?;
        let (img_width, img_height) = image.dimensions();
        let mut fields = Vec::new();
        for raw in detection::select_best_per_class(&candidates) {
            let field_class = LicenseFieldClass::from_id(raw.class_id).ok_or_else(|| {
                OcrError::processing(format!("unknown detection class id {}", raw.class_id))
            })?;
            let bbox = detection::rescale_box(
                raw.bbox,
                detector.input_size,
                scale,
                pad,
                img_width,
                img_height,
            );
            fields.push(DetectedField {
                field_class,
                bbox,
                score: raw.score,
            });
        }
        debug!(detections = fields.len(), "detection postprocess done");

        let rotation_angle = orientation::infer_document_angle(&fields);
        let image = orientation::correct_orientation(image, &mut fields, rotation_angle);

        let (is_correct, side) = side_check::check_detection(
            &fields,
            &detector.front_fields,
            &detector.back_fields,
            detector.threshold,
        );
        info!(?side, is_correct, rotation_angle, "detection verdict");

        Ok(DetectionOutcome {
            image,
            fields,
            rotation_angle,
            is_correct,
            side,
        })
    }

    /// Turns a detection outcome into the final document result.
    ///
    /// Rejected captures produce an empty not-found result. The back
    /// side is reported found with no field records; only the front
    /// side goes through text recognition.
    pub fn recognize_document(
        &self,
        outcome: DetectionOutcome,
    ) -> Result<DocumentRecognitionResult, OcrError> {
        if !outcome.is_correct {
            return Ok(DocumentRecognitionResult::not_found());
        }
        let fields = match outcome.side {
            LicenseSide::Front => self.recognize_fields(&outcome)?,
            _ => Vec::new(),
        };
        Ok(DocumentRecognitionResult {
            is_document_found: true,
            side: outcome.side,
            fields,
        })
    }

    /// Recognizes every configured field present among the detections.
    ///
    /// Records come back in configuration order; fields that were not
    /// detected keep their default record.
    fn recognize_fields(
        &self,
        outcome: &DetectionOutcome,
    ) -> Result<Vec<FieldRecognitionRecord>, OcrError> {
        let mut records: Vec<FieldRecognitionRecord> = self
            .config
            .recognition
            .fields
            .iter()
            .map(|binding| FieldRecognitionRecord::not_detected(binding.name))
            .collect();

        for (binding, record) in self.config.recognition.fields.iter().zip(&mut records) {
            let Some(detected) = outcome
                .fields
                .iter()
                .find(|f| f.field_class == binding.name)
            else {
                continue;
            };
            record.mark_detected(detected.bbox, detected.score);

            let recognized = self.recognize_field(outcome, detected, binding)?;
            if recognized.is_accepted {
                record.mark_recognized(recognized);
            } else {
                warn!(
                    field = binding.name.name(),
                    word_score = recognized.word_score,
                    "field recognition rejected"
                );
            }
        }
        Ok(records)
    }

    /// Crops one field, runs its recognition model and gates the decode.
    fn recognize_field(
        &self,
        outcome: &DetectionOutcome,
        detected: &DetectedField,
        binding: &FieldBinding,
    ) -> Result<RecognizedText, OcrError> {
        let model = self.config.model_for(binding)?;
        let crop = utils::crop_field(&outcome.image, &detected.bbox)?;
        let tensor = preprocess::recognition_tensor(&crop, model.image_height, model.image_width);
        let outputs =
            self.runner
                .infer(&model.model_name, tensor.into_dyn(), &[RECOGNITION_OUTPUT])?;
        let probs = outputs
            .first()
            .ok_or_else(|| OcrError::processing("recognition model returned no outputs"))?;
        let probs = strip_batch(probs, &model.model_name)?;

        let decoder = self
            .decoders
            .get(&binding.model)
            .ok_or_else(|| OcrError::Config {
                message: format!("no decoder for recognition model '{}'", binding.model),
            })?;
        let mut recognized = decoder.decode(probs);
        recognized.is_accepted = validation::is_accepted(
            binding.name.kind(),
            &recognized.text,
            recognized.word_score,
            model.threshold,
        );
        debug!(
            field = binding.name.name(),
            text = %recognized.text,
            word_score = recognized.word_score,
            accepted = recognized.is_accepted,
            "field decoded"
        );
        Ok(recognized)
    }
}

/// Flattens the detector's `[1, N, 4]` / `[1, N]` outputs into candidates.
fn collect_candidates(
    boxes: &ArrayD<f32>,
    classes: &ArrayD<f32>,
    scores: &ArrayD<f32>,
    model_name: &str,
) -> Result<Vec<RawDetection>, OcrError> {
    let shape = boxes.shape();
    if shape.len() != 3 || shape[2] != 4 {
        return Err(OcrError::processing(format!(
            "model '{model_name}': expected boxes of shape [1, N, 4], got {shape:?}"
        )));
    }
    let count = shape[1];
    if classes.len() != count || scores.len() != count {
        return Err(OcrError::processing(format!(
            "model '{model_name}': boxes/classes/scores lengths disagree"
        )));
    }
    let classes = classes.view().into_shape_with_order(count)?;
    let scores = scores.view().into_shape_with_order(count)?;

    let mut candidates = Vec::with_capacity(count);
    for i in 0..count {
        candidates.push(RawDetection {
            class_id: classes[i] as u32,
            score: scores[i],
            bbox: [
                boxes[[0, i, 0]],
                boxes[[0, i, 1]],
                boxes[[0, i, 2]],
                boxes[[0, i, 3]],
            ],
        });
    }
    Ok(candidates)
}

/// Checks a `[1, T, V]` recognition output and drops the batch axis.
fn strip_batch<'a>(
    probs: &'a ArrayD<f32>,
    model_name: &str,
) -> Result<ArrayView2<'a, f32>, OcrError> {
    let shape = probs.shape();
    if shape.len() != 3 || shape[0] != 1 {
        return Err(OcrError::processing(format!(
            "model '{model_name}': expected output of shape [1, T, V], got {shape:?}"
        )));
    }
    let view = probs
        .view()
        .into_shape_with_order((shape[1], shape[2]))?;
    Ok(view)
}

/// Weakest detection score of an outcome, for the detection gauge.
pub fn min_detection_score(outcome: &DetectionOutcome) -> Option<f32> {
    outcome.fields.iter().map(|f| f.score).reduce(f32::min)
}
