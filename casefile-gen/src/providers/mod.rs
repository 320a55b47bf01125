//! Generation and upload provider implementations
//!
//! This module contains concrete implementations of the GeneratorProvider
//! and UploadProvider traits for external services.

pub mod blobstore;
pub mod gemini;

pub use blobstore::BlobStoreUploadProvider;
pub use gemini::{GeminiClient, GeminiGeneratorProvider};
