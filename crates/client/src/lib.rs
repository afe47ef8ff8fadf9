//! Deblur Client
//!
//! Uploads a local image to the deblur service, saves the reconstruction next
//! to the original and optionally renders a before/after comparison.

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::RgbImage;
use image_pipeline::{decode, encode_png, side_by_side, ImageError};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{error, info, warn};

pub mod settings;

pub use settings::ClientConfig;

/// Suffix inserted before the extension of the saved result
pub const RESULT_SUFFIX: &str = "_deblurred";
/// Suffix inserted before the extension of the comparison image
pub const COMPARISON_SUFFIX: &str = "_comparison";

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP client for one deblur endpoint
pub struct DeblurClient {
    http: reqwest::Client,
    api_url: String,
}

impl DeblurClient {
    /// Create a client with the configured timeout and TLS verification
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        if !config.verify_tls {
            warn!("TLS certificate verification disabled for {}", config.api_url);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
        })
    }

    /// Endpoint every upload is posted to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Upload the image at `path` and decode the returned image.
    ///
    /// Fails only when the local file cannot be read. Transport errors,
    /// timeouts, non-200 responses and undecodable bodies are logged and
    /// yield `None`.
    pub async fn deblur(&self, path: &Path) -> Result<Option<RgbImage>, ClientError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let form = Form::new().part("image", Part::bytes(bytes).file_name(file_name));

        info!("Sending request to {}...", self.api_url);
        let response = match self.http.post(&self.api_url).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Request to {} failed: {}", self.api_url, e);
                return Ok(None);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!("Error: {}", status);
            error!("{}", body);
            return Ok(None);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to read response body: {}", e);
                return Ok(None);
            }
        };

        match decode(&body) {
            Ok(image) => {
                info!("Request successful!");
                Ok(Some(image.to_rgb8()))
            }
            Err(e) => {
                error!("Response is not a valid image: {}", e);
                Ok(None)
            }
        }
    }
}

/// `<dir>/<stem><suffix>.png` next to `original`
fn sibling_png(original: &Path, suffix: &str) -> PathBuf {
    let stem = original
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    original.with_file_name(format!("{}{}.png", stem, suffix))
}

/// Path the deblurred result is saved to
pub fn output_path(original: &Path) -> PathBuf {
    sibling_png(original, RESULT_SUFFIX)
}

/// Path the before/after comparison is saved to
pub fn comparison_path(original: &Path) -> PathBuf {
    sibling_png(original, COMPARISON_SUFFIX)
}

/// Save `result` next to `original` and optionally render a comparison.
///
/// A failed comparison is logged and does not affect the saved result.
pub fn save_and_compare(
    original: &Path,
    result: &RgbImage,
    compare: bool,
) -> Result<PathBuf, ClientError> {
    let path = output_path(original);
    write_png(&path, result)?;
    info!("Deblurred image saved to {}", path.display());

    if compare {
        match render_comparison(original, result) {
            Ok(comparison) => info!("Comparison saved to {}", comparison.display()),
            Err(e) => warn!("Could not display comparison: {}", e),
        }
    }

    Ok(path)
}

/// Write the original and the result side by side as one PNG
pub fn render_comparison(original: &Path, result: &RgbImage) -> Result<PathBuf, ClientError> {
    let bytes = std::fs::read(original).map_err(|source| ClientError::Read {
        path: original.to_path_buf(),
        source,
    })?;
    let before = decode(&bytes)?.to_rgb8();

    let path = comparison_path(original);
    write_png(&path, &side_by_side(&before, result))?;
    Ok(path)
}

fn write_png(path: &Path, image: &RgbImage) -> Result<(), ClientError> {
    let png = encode_png(image)?;
    std::fs::write(path, png).map_err(|source| ClientError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Initialize logging; RUST_LOG takes precedence over `level`
pub fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
    {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_output_path_replaces_extension() {
        assert_eq!(
            output_path(Path::new("photos/blurry.jpg")),
            PathBuf::from("photos/blurry_deblurred.png")
        );
        assert_eq!(
            output_path(Path::new("scan.v2.png")),
            PathBuf::from("scan.v2_deblurred.png")
        );
    }

    #[test]
    fn test_output_path_without_extension() {
        assert_eq!(
            output_path(Path::new("archive.d/blurry")),
            PathBuf::from("archive.d/blurry_deblurred.png")
        );
    }

    #[test]
    fn test_save_writes_png_next_to_original() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("cat.jpg");
        let source = RgbImage::from_pixel(64, 64, Rgb([1, 2, 3]));
        std::fs::write(&original, encode_png(&source).unwrap()).unwrap();

        let result = RgbImage::from_pixel(256, 256, Rgb([9, 8, 7]));
        let saved = save_and_compare(&original, &result, true).unwrap();

        assert_eq!(saved, dir.path().join("cat_deblurred.png"));
        let reloaded = image::open(&saved).unwrap().to_rgb8();
        assert_eq!(reloaded, result);

        let comparison = image::open(comparison_path(&original)).unwrap();
        assert_eq!(comparison.height(), 256);
        assert_eq!(comparison.width(), 512);
    }

    #[test]
    fn test_comparison_failure_keeps_result() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("broken.jpg");
        std::fs::write(&original, b"not an image").unwrap();

        let result = RgbImage::new(256, 256);
        let saved = save_and_compare(&original, &result, true).unwrap();

        assert!(saved.exists());
        assert!(!comparison_path(&original).exists());
    }

    #[tokio::test]
    async fn test_deblur_missing_file_is_an_error() {
        let client = DeblurClient::new(&ClientConfig::default()).unwrap();
        let result = client.deblur(Path::new("no/such/image.jpg")).await;
        assert!(matches!(result, Err(ClientError::Read { .. })));
    }

    #[tokio::test]
    async fn test_deblur_unreachable_server_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.png");
        std::fs::write(&path, encode_png(&RgbImage::new(8, 8)).unwrap()).unwrap();

        let config = ClientConfig {
            api_url: "http://127.0.0.1:9/deblur".to_string(),
            timeout_secs: 5,
            ..Default::default()
        };
        let client = DeblurClient::new(&config).unwrap();

        assert!(client.deblur(&path).await.unwrap().is_none());
    }
}
