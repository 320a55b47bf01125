//! CASEFILE Gen - Generation Abstraction Layer
//!
//! Provider-agnostic traits for narrative/image generation and binary upload.
//! The pipeline depends only on these traits; concrete HTTP providers live in
//! [`providers`], and tests substitute scripted mocks.

use casefile_core::{CasefileError, CasefileResult, GenerationError, ImageRef};
use std::sync::Arc;

pub mod parse;
pub mod prompts;
pub mod providers;

// ============================================================================
// GENERATOR PROVIDER TRAIT
// ============================================================================

/// Trait for generative model providers.
/// Implementations must be thread-safe (Send + Sync).
///
/// Calls may be slow and may fail or time out; the pipeline maps failures
/// onto its fatal/non-fatal step policy, so implementations only need to
/// report errors faithfully.
#[async_trait::async_trait]
pub trait GeneratorProvider: Send + Sync {
    /// Generate text from a prompt.
    ///
    /// # Returns
    /// * `Ok(String)` - The raw model output
    /// * `Err(CasefileError::Generation)` - If the call fails
    async fn generate(&self, prompt: &str) -> CasefileResult<String>;

    /// Generate an image from a prompt.
    ///
    /// # Returns
    /// * `Ok(Vec<u8>)` - Encoded image bytes
    /// * `Err(CasefileError::Generation)` - If the call fails
    async fn generate_image(&self, prompt: &str) -> CasefileResult<Vec<u8>>;

    /// Get the model identifier for this provider.
    fn model_id(&self) -> &str;
}

// ============================================================================
// UPLOAD PROVIDER TRAIT
// ============================================================================

/// A durably stored binary asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Public URL of the asset
    pub url: String,
    /// Provider-assigned identifier, usable for deletion
    pub asset_id: String,
}

impl From<UploadedAsset> for ImageRef {
    fn from(asset: UploadedAsset) -> Self {
        ImageRef {
            url: asset.url,
            asset_id: asset.asset_id,
        }
    }
}

/// Trait for binary upload providers.
/// Implementations must be thread-safe (Send + Sync).
///
/// Upload may fail independently of generation; image-bearing pipeline steps
/// treat that as a degradation, not an abort.
#[async_trait::async_trait]
pub trait UploadProvider: Send + Sync {
    /// Upload binary content under `folder/name`, returning a durable asset.
    async fn upload(&self, content: &[u8], name: &str, folder: &str)
        -> CasefileResult<UploadedAsset>;

    /// Delete a previously uploaded asset. Used to reclaim orphans when a
    /// pipeline run fails after uploading.
    async fn delete(&self, asset_id: &str) -> CasefileResult<()>;
}

// ============================================================================
// PROVIDER REGISTRY
// ============================================================================

/// Registry for generation and upload providers.
/// Providers must be explicitly registered - no auto-discovery.
///
/// # Example
/// ```ignore
/// let mut registry = ProviderRegistry::new();
/// registry.register_generator(Box::new(my_generator));
/// registry.register_uploader(Box::new(my_uploader));
///
/// let story = registry.generator()?.generate("...").await?;
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    generator: Option<Arc<dyn GeneratorProvider>>,
    uploader: Option<Arc<dyn UploadProvider>>,
}

impl ProviderRegistry {
    /// Create a new empty provider registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator provider.
    /// Replaces any previously registered generator.
    pub fn register_generator(&mut self, provider: Box<dyn GeneratorProvider>) {
        self.generator = Some(Arc::from(provider));
    }

    /// Register an upload provider.
    /// Replaces any previously registered uploader.
    pub fn register_uploader(&mut self, provider: Box<dyn UploadProvider>) {
        self.uploader = Some(Arc::from(provider));
    }

    /// Get the registered generator provider.
    ///
    /// # Errors
    /// `GenerationError::ProviderNotConfigured` if none is registered.
    pub fn generator(&self) -> CasefileResult<Arc<dyn GeneratorProvider>> {
        self.generator
            .clone()
            .ok_or(CasefileError::Generation(GenerationError::ProviderNotConfigured))
    }

    /// Get the registered upload provider.
    ///
    /// # Errors
    /// `GenerationError::ProviderNotConfigured` if none is registered.
    pub fn uploader(&self) -> CasefileResult<Arc<dyn UploadProvider>> {
        self.uploader
            .clone()
            .ok_or(CasefileError::Generation(GenerationError::ProviderNotConfigured))
    }

    /// Check if a generator provider is registered.
    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Check if an upload provider is registered.
    pub fn has_uploader(&self) -> bool {
        self.uploader.is_some()
    }
}

// ============================================================================
// TESTS
// ============================================================================
