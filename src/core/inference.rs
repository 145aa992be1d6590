//! Model execution boundary.
//!
//! The pipeline only ever talks to models through [`ModelRunner`], so
//! the orchestration logic is independent of where the models actually
//! run. [`OrtModelRunner`] is the production implementation on ONNX
//! Runtime; tests substitute scripted runners.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use ndarray::ArrayD;
use ort::session::Session;
use ort::value::TensorRef;

use crate::core::errors::OcrError;

/// Executes a named model on one input tensor and returns the requested
/// output tensors, in the order they were requested.
pub trait ModelRunner: Send + Sync {
    fn infer(
        &self,
        model_name: &str,
        input: ArrayD<f32>,
        output_names: &[&str],
    ) -> Result<Vec<ArrayD<f32>>, OcrError>;
}

/// [`ModelRunner`] backed by in-process ONNX Runtime sessions.
///
/// One session per model, each behind a mutex; `run` needs exclusive
/// access and the sessions are shared across request handlers.
pub struct OrtModelRunner {
    sessions: HashMap<String, Mutex<Session>>,
}

impl OrtModelRunner {
    /// Loads `<dir>/<name>.onnx` for every given model name.
    pub fn from_model_dir<I, S>(dir: impl AsRef<Path>, model_names: I) -> Result<Self, OcrError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dir = dir.as_ref();
        let mut sessions = HashMap::new();
        for name in model_names {
            let name = name.as_ref();
            if sessions.contains_key(name) {
                continue;
            }
            let path = dir.join(format!("{name}.onnx"));
            let session = Session::builder()
                .and_then(|builder| builder.commit_from_file(&path))
                .map_err(|e| OcrError::Config {
                    message: format!("failed to load model '{}' from {}: {e}", name, path.display()),
                })?;
            tracing::info!(model = name, path = %path.display(), "loaded onnx session");
            sessions.insert(name.to_string(), Mutex::new(session));
        }
        Ok(Self { sessions })
    }
}

impl ModelRunner for OrtModelRunner {
    fn infer(
        &self,
        model_name: &str,
        input: ArrayD<f32>,
        output_names: &[&str],
    ) -> Result<Vec<ArrayD<f32>>, OcrError> {
        let session = self.sessions.get(model_name).ok_or_else(|| OcrError::Config {
            message: format!("model '{model_name}' is not loaded"),
        })?;
        let mut guard = session.lock().map_err(|_| {
            OcrError::processing(format!("session lock poisoned for model '{model_name}'"))
        })?;

        let input_name = guard
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| {
                OcrError::processing(format!("model '{model_name}' declares no inputs"))
            })?;
        let tensor = TensorRef::from_array_view(input.view())?;
        let outputs = guard.run(ort::inputs![input_name.as_str() => tensor])?;

        let mut extracted = Vec::with_capacity(output_names.len());
        for name in output_names {
            let (shape, data) = outputs
                .get(*name)
                .ok_or_else(|| {
                    OcrError::processing(format!(
                        "model '{model_name}' produced no output named '{name}'"
                    ))
                })?
                .try_extract_tensor::<f32>()?;
            let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
            extracted.push(ArrayD::from_shape_vec(dims, data.to_vec())?);
        }
        Ok(extracted)
    }
}
