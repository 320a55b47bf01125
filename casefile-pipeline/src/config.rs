//! Pipeline configuration

use std::time::Duration;

/// Default per-call generation timeout in seconds.
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;

/// Default per-call upload timeout in seconds.
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;

/// Default cap on concurrently running location-image generations.
pub const DEFAULT_MAX_CONCURRENT_IMAGES: usize = 4;

/// Default folder uploaded images land in.
pub const DEFAULT_IMAGE_FOLDER: &str = "cases";

/// Configuration for the case-generation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Timeout applied to each generation call; expiry surfaces as a normal
    /// step failure under the step's fatal/non-fatal policy
    pub generation_timeout: Duration,

    /// Timeout applied to each upload call
    pub upload_timeout: Duration,

    /// Maximum location-image generations in flight at once
    pub max_concurrent_images: usize,

    /// Upload folder for generated images
    pub image_folder: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            generation_timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            max_concurrent_images: DEFAULT_MAX_CONCURRENT_IMAGES,
            image_folder: DEFAULT_IMAGE_FOLDER.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create PipelineConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `CASEFILE_GENERATION_TIMEOUT_SECS`: Per-call generation timeout (default: 120)
    /// - `CASEFILE_UPLOAD_TIMEOUT_SECS`: Per-call upload timeout (default: 30)
    /// - `CASEFILE_MAX_CONCURRENT_IMAGES`: Concurrent image generations (default: 4)
    /// - `CASEFILE_IMAGE_FOLDER`: Upload folder for images (default: "cases")
    pub fn from_env() -> Self {
        let generation_timeout = Duration::from_secs(
            std::env::var("CASEFILE_GENERATION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS),
        );

        let upload_timeout = Duration::from_secs(
            std::env::var("CASEFILE_UPLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS),
        );

        let max_concurrent_images = std::env::var("CASEFILE_MAX_CONCURRENT_IMAGES")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_IMAGES);

        let image_folder = std::env::var("CASEFILE_IMAGE_FOLDER")
            .unwrap_or_else(|_| DEFAULT_IMAGE_FOLDER.to_string());

        Self {
            generation_timeout,
            upload_timeout,
            max_concurrent_images,
            image_folder,
        }
    }

    /// Create a configuration for development/testing with short timeouts.
    pub fn development() -> Self {
        Self {
            generation_timeout: Duration::from_secs(5),
            upload_timeout: Duration::from_secs(2),
            max_concurrent_images: 2,
            image_folder: "dev-cases".to_string(),
        }
    }
}
