//! Gemini provider implementation
//!
//! Text generation via `generateContent`, image generation via the same
//! endpoint with an image response modality.

pub mod client;
pub mod types;

pub use client::GeminiClient;

use crate::GeneratorProvider;
use base64::Engine;
use casefile_core::{CasefileError, CasefileResult, GenerationError};
use types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};

const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.0-flash-exp-image-generation";

/// GeneratorProvider backed by the Gemini API.
#[derive(Debug)]
pub struct GeminiGeneratorProvider {
    client: GeminiClient,
    text_model: String,
    image_model: String,
}

impl GeminiGeneratorProvider {
    /// Create a provider with the default models.
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    /// Override the text model.
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Override the image model.
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    fn user_request(prompt: &str, config: Option<GenerationConfig>) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                    inline_data: None,
                }],
            }],
            generation_config: config,
        }
    }

    fn invalid_response(reason: impl Into<String>) -> CasefileError {
        CasefileError::Generation(GenerationError::InvalidResponse {
            provider: "gemini".to_string(),
            reason: reason.into(),
        })
    }
}

#[async_trait::async_trait]
impl GeneratorProvider for GeminiGeneratorProvider {
    async fn generate(&self, prompt: &str) -> CasefileResult<String> {
        let endpoint = format!("models/{}:generateContent", self.text_model);
        let request = Self::user_request(
            prompt,
            Some(GenerationConfig {
                temperature: Some(0.9),
                max_output_tokens: Some(8192),
                response_modalities: None,
            }),
        );

        let response: GenerateContentResponse = self.client.request(&endpoint, request).await?;

        let text: String = response
            .candidates
            .first()
            .ok_or_else(|| Self::invalid_response("no candidates returned"))?
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.is_empty() {
            return Err(Self::invalid_response("candidate contained no text"));
        }
        Ok(text)
    }

    async fn generate_image(&self, prompt: &str) -> CasefileResult<Vec<u8>> {
        let endpoint = format!("models/{}:generateContent", self.image_model);
        let request = Self::user_request(
            prompt,
            Some(GenerationConfig {
                temperature: None,
                max_output_tokens: None,
                response_modalities: Some(vec!["IMAGE".to_string()]),
            }),
        );

        let response: GenerateContentResponse = self.client.request(&endpoint, request).await?;

        let inline = response
            .candidates
            .first()
            .ok_or_else(|| Self::invalid_response("no candidates returned"))?
            .content
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
            .ok_or_else(|| Self::invalid_response("candidate contained no image data"))?;

        base64::engine::general_purpose::STANDARD
            .decode(&inline.data)
            .map_err(|e| Self::invalid_response(format!("invalid base64 image data: {}", e)))
    }

    fn model_id(&self) -> &str {
        &self.text_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_model_overrides() {
        let provider = GeminiGeneratorProvider::new(GeminiClient::new("k", 50))
            .with_text_model("gemini-2.5-pro")
            .with_image_model("imagen-3.0");
        assert_eq!(provider.model_id(), "gemini-2.5-pro");
        assert_eq!(provider.image_model, "imagen-3.0");
    }

    #[test]
    fn test_user_request_shape() {
        let request = GeminiGeneratorProvider::user_request("tell me a story", None);
        assert_eq!(request.contents.len(), 1);
        assert_eq!(
            request.contents[0].parts[0].text.as_deref(),
            Some("tell me a story")
        );
    }
}
