//! One-shot CLI processing.

use std::path::Path;

use license_ocr::core::OcrError;
use license_ocr::domain::DocumentRecognitionResult;

use crate::config::ServiceConfig;
use crate::engine::RecognizerEngine;

/// Recognizes a local image file and prints the result.
pub fn process_file(
    path: &Path,
    config: &ServiceConfig,
    output: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let engine = RecognizerEngine::new(config)?;
    let image = image::open(path)
        .map_err(|e| OcrError::image_load(format!("failed to open {}: {e}", path.display())))?
        .to_rgb8();
    let result = engine.recognize(image)?;
    print_result(&result, output)?;
    Ok(())
}

/// Fetches an image by storage guid and prints the result.
pub async fn process_guid(
    guid: &str,
    config: &ServiceConfig,
    output: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let engine = RecognizerEngine::new(config)?;
    let image = engine.fetch_image(guid).await?;
    let result = engine.recognize(image)?;
    print_result(&result, output)?;
    Ok(())
}

fn print_result(
    result: &DocumentRecognitionResult,
    output: &str,
) -> Result<(), serde_json::Error> {
    match output {
        "json" => println!("{}", serde_json::to_string(result)?),
        _ => println!("{}", serde_json::to_string_pretty(result)?),
    }
    Ok(())
}
