//! End-to-end pipeline tests against scripted model outputs.

use std::collections::HashMap;
use std::sync::Arc;

use image::{Rgb, RgbImage};
use ndarray::{Array1, Array3, ArrayD};

use license_ocr::core::{ModelRunner, OcrError, PipelineConfig};
use license_ocr::domain::{LicenseFieldClass, LicenseSide};
use license_ocr::pipeline::LicenseRecognizer;

/// Returns fixed tensors per model, regardless of input.
struct ScriptedRunner {
    outputs: HashMap<String, HashMap<String, ArrayD<f32>>>,
}

impl ScriptedRunner {
    fn new() -> Self {
        Self {
            outputs: HashMap::new(),
        }
    }

    fn with_output(mut self, model: &str, name: &str, tensor: ArrayD<f32>) -> Self {
        self.outputs
            .entry(model.to_string())
            .or_default()
            .insert(name.to_string(), tensor);
        self
    }
}

impl ModelRunner for ScriptedRunner {
    fn infer(
        &self,
        model_name: &str,
        _input: ArrayD<f32>,
        output_names: &[&str],
    ) -> Result<Vec<ArrayD<f32>>, OcrError> {
        let model = self
            .outputs
            .get(model_name)
            .ok_or_else(|| OcrError::processing(format!("no script for model '{model_name}'")))?;
        output_names
            .iter()
            .map(|name| {
                model
                    .get(*name)
                    .cloned()
                    .ok_or_else(|| OcrError::processing(format!("no script for output '{name}'")))
            })
            .collect()
    }
}

/// Always fails, to exercise the abort path.
struct FailingRunner;

impl ModelRunner for FailingRunner {
    fn infer(
        &self,
        model_name: &str,
        _input: ArrayD<f32>,
        _output_names: &[&str],
    ) -> Result<Vec<ArrayD<f32>>, OcrError> {
        Err(OcrError::processing(format!("model '{model_name}' down")))
    }
}

const CONFIG: &str = r#"
    [detector]
    model_name = "det"
    input_size = 64
    threshold = 0.8
    front_fields = ["front_side", "surname", "front_serial"]
    back_fields = ["back_side", "mrc", "back_serial"]

    [[recognition.fields]]
    name = "surname"
    model = "latin"

    [[recognition.fields]]
    name = "name"
    model = "latin"

    [recognition.models.latin]
    model_name = "rec_latin"
    image_height = 8
    image_width = 16
    vocabulary = "EOPRTV"
    threshold = 0.5
"#;

fn config() -> PipelineConfig {
    PipelineConfig::from_toml_str(CONFIG).unwrap()
}

/// Detection output tensors from `(class, score, normalized box)` rows.
fn detection_outputs(rows: &[(u32, f32, [f32; 4])]) -> [ArrayD<f32>; 3] {
    let n = rows.len();
    let mut boxes = Array3::zeros((1, n, 4));
    let mut classes = Array1::zeros(n);
    let mut scores = Array1::zeros(n);
    for (i, &(class, score, bbox)) in rows.iter().enumerate() {
        classes[i] = class as f32;
        scores[i] = score;
        for (j, &coord) in bbox.iter().enumerate() {
            boxes[[0, i, j]] = coord;
        }
    }
    [
        boxes.into_dyn(),
        classes.insert_axis(ndarray::Axis(0)).into_dyn(),
        scores.insert_axis(ndarray::Axis(0)).into_dyn(),
    ]
}

/// A `[1, T, 7]` matrix whose argmax path spells the given symbol
/// indices over the "EOPRTV" alphabet (blank = 6).
fn recognition_output(path: &[usize], prob: f32) -> ArrayD<f32> {
    let mut m = Array3::zeros((1, path.len(), 7));
    for (t, &symbol) in path.iter().enumerate() {
        let rest = (1.0 - prob) / 6.0;
        for v in 0..7 {
            m[[0, t, v]] = if v == symbol { prob } else { rest };
        }
    }
    m.into_dyn()
}

fn scripted(rows: &[(u32, f32, [f32; 4])], rec: Option<ArrayD<f32>>) -> Arc<ScriptedRunner> {
    let [boxes, classes, scores] = detection_outputs(rows);
    let mut runner = ScriptedRunner::new()
        .with_output("det", "detection_boxes", boxes)
        .with_output("det", "detection_classes", classes)
        .with_output("det", "detection_scores", scores);
    if let Some(rec) = rec {
        runner = runner.with_output("rec_latin", "output", rec);
    }
    Arc::new(runner)
}

fn document_image() -> RgbImage {
    RgbImage::from_pixel(64, 64, Rgb([200, 200, 200]))
}

// "PETROV": P E T R O V over "EOPRTV".
const PETROV_PATH: &[usize] = &[2, 0, 4, 3, 1, 5];

#[test]
fn front_side_recognized_end_to_end() {
    let runner = scripted(
        &[
            (3, 0.95, [0.0, 0.0, 1.0, 1.0]),                // front_side
            (9, 0.5, [0.2, 0.2, 0.6, 0.3]),                 // duplicate surname, weaker
            (9, 0.9, [0.125, 0.125, 0.5, 0.25]),            // surname
            (12, 0.85, [0.125, 0.625, 0.75, 0.75]),         // front_serial
            (0, 0.0, [0.0, 0.0, 0.0, 0.0]),                 // padding row
        ],
        Some(recognition_output(PETROV_PATH, 0.95)),
    );
    let recognizer = LicenseRecognizer::new(config(), runner);

    let result = recognizer.recognize(document_image()).unwrap();
    assert!(result.is_document_found);
    assert_eq!(result.side, LicenseSide::Front);
    assert_eq!(result.fields.len(), 2);

    let surname = &result.fields[0];
    assert_eq!(surname.field_name, LicenseFieldClass::Surname);
    assert!(surname.is_detected);
    // The higher-scoring duplicate wins and maps back to pixels.
    assert_eq!(surname.detect_score, 0.9);
    assert_eq!(surname.bbox, vec![8.0, 8.0, 32.0, 16.0]);
    assert!(surname.is_recognized);
    assert_eq!(surname.text, "PETROV");
    assert!((surname.text_score - 0.95).abs() < 1e-5);
    assert_eq!(surname.symbol_scores.len(), 6);

    // Configured but never detected: default record.
    let name = &result.fields[1];
    assert_eq!(name.field_name, LicenseFieldClass::Name);
    assert!(!name.is_detected);
    assert!(!name.is_recognized);
    assert!(name.text.is_empty());
}

#[test]
fn low_confidence_decode_stays_unrecognized() {
    let runner = scripted(
        &[
            (3, 0.95, [0.0, 0.0, 1.0, 1.0]),
            (9, 0.9, [0.125, 0.125, 0.5, 0.25]),
            (12, 0.85, [0.125, 0.625, 0.75, 0.75]),
        ],
        // Word score 0.4 is below the 0.5 model threshold.
        Some(recognition_output(PETROV_PATH, 0.4)),
    );
    let recognizer = LicenseRecognizer::new(config(), runner);

    let result = recognizer.recognize(document_image()).unwrap();
    assert!(result.is_document_found);
    let surname = &result.fields[0];
    assert!(surname.is_detected);
    assert!(!surname.is_recognized);
    assert!(surname.text.is_empty());
    assert_eq!(surname.text_score, 0.0);
}

#[test]
fn missing_required_field_rejects_document() {
    let runner = scripted(
        &[
            (3, 0.95, [0.0, 0.0, 1.0, 1.0]),
            (9, 0.7, [0.125, 0.125, 0.5, 0.25]), // below detector threshold
            (12, 0.85, [0.125, 0.625, 0.75, 0.75]),
        ],
        None,
    );
    let recognizer = LicenseRecognizer::new(config(), runner);

    let result = recognizer.recognize(document_image()).unwrap();
    assert!(!result.is_document_found);
    assert_eq!(result.side, LicenseSide::None);
    assert!(result.fields.is_empty());
}

#[test]
fn back_side_found_without_field_records() {
    let runner = scripted(
        &[
            (0, 0.92, [0.0, 0.0, 1.0, 1.0]),      // back_side
            (1, 0.9, [0.0625, 0.375, 0.4375, 0.625]), // mrc
            (2, 0.88, [0.5625, 0.375, 0.9375, 0.625]), // back_serial
        ],
        None,
    );
    let recognizer = LicenseRecognizer::new(config(), runner);

    let result = recognizer.recognize(document_image()).unwrap();
    assert!(result.is_document_found);
    assert_eq!(result.side, LicenseSide::Back);
    assert!(result.fields.is_empty());
}

#[test]
fn anchor_pair_drives_rotation() {
    // Photo entirely above birthday: the capture is a quarter turn off.
    let runner = scripted(
        &[
            (4, 0.9, [0.125, 0.0625, 0.375, 0.25]), // photo at (8,4)-(24,16)
            (7, 0.9, [0.125, 0.625, 0.375, 0.8125]), // birthday at (8,40)-(24,52)
        ],
        None,
    );
    let recognizer = LicenseRecognizer::new(config(), runner);

    let outcome = recognizer.detect(document_image()).unwrap();
    assert_eq!(outcome.rotation_angle, 90);
    assert_eq!(outcome.image.dimensions(), (64, 64));

    let photo = outcome
        .fields
        .iter()
        .find(|f| f.field_class == LicenseFieldClass::Photo)
        .unwrap();
    // (x, y) -> (y, 64 - x) for a square quarter turn.
    assert!((photo.bbox.x_min - 4.0).abs() <= 0.51);
    assert!((photo.bbox.y_min - 40.0).abs() <= 0.51);
    assert!((photo.bbox.x_max - 16.0).abs() <= 0.51);
    assert!((photo.bbox.y_max - 56.0).abs() <= 0.51);
}

#[test]
fn inference_error_aborts_request() {
    let recognizer = LicenseRecognizer::new(config(), Arc::new(FailingRunner));
    let err = recognizer.recognize(document_image()).unwrap_err();
    assert!(err.to_string().contains("det"));
}
