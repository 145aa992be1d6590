//! Service configuration for the recognition server and CLI.

use std::path::{Path, PathBuf};

use license_ocr::core::{OcrError, PipelineConfig};
use serde::Deserialize;

/// Full service configuration: pipeline plus server-only concerns.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Directory holding `<model_name>.onnx` files.
    pub models_dir: PathBuf,
    #[serde(default)]
    pub server: ServerSection,
    pub image_download: ImageDownloadConfig,
    #[serde(flatten)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Where to fetch document images from.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageDownloadConfig {
    /// URL template with `{guid}` and `{token}` placeholders.
    pub url_template: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

fn default_timeout_sec() -> u64 {
    10
}

impl ImageDownloadConfig {
    pub fn url_for(&self, guid: &str) -> String {
        self.url_template
            .replace("{guid}", guid)
            .replace("{token}", &self.token)
    }
}

impl ServiceConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OcrError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&text).map_err(|e| OcrError::Config {
            message: format!("failed to parse service configuration: {e}"),
        })?;
        config.pipeline.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_template() {
        let download = ImageDownloadConfig {
            url_template: "https://store.local/images/{guid}?token={token}".to_string(),
            token: "secret".to_string(),
            timeout_sec: 5,
        };
        assert_eq!(
            download.url_for("abc-123"),
            "https://store.local/images/abc-123?token=secret"
        );
    }
}
