//! Gemini HTTP client with rate limiting

use super::types::ApiErrorBody;
use casefile_core::{CasefileError, CasefileResult, GenerationError};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Gemini API client with rate limiting.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: Arc<Semaphore>,
    created: Instant,
    last_request: Arc<AtomicU64>,
    min_request_interval_ms: u64,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Arguments
    /// * `api_key` - Google AI API key
    /// * `requests_per_minute` - Maximum requests per minute
    pub fn new(api_key: impl Into<String>, requests_per_minute: u32) -> Self {
        let permits = (requests_per_minute as usize).max(1);
        let min_interval_ms = (60_000 / u64::from(requests_per_minute.max(1))).max(10);

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            rate_limiter: Arc::new(Semaphore::new(permits)),
            created: Instant::now(),
            last_request: Arc::new(AtomicU64::new(0)),
            min_request_interval_ms: min_interval_ms,
        }
    }

    /// Override the base URL (local proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn provider_error(message: impl Into<String>) -> CasefileError {
        CasefileError::Generation(GenerationError::RequestFailed {
            provider: "gemini".to_string(),
            status: 0,
            message: message.into(),
        })
    }

    /// Make an API request with automatic rate limiting.
    pub async fn request<Req: Serialize, Res: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Req,
    ) -> CasefileResult<Res> {
        // Rate limiting: acquire permit
        let _permit = self
            .rate_limiter
            .acquire()
            .await
            .map_err(|e| Self::provider_error(format!("Rate limiter error: {}", e)))?;

        // Enforce minimum interval between requests
        let now_ms = self.created.elapsed().as_millis() as u64;
        let last_ms = self.last_request.load(Ordering::Relaxed);
        let elapsed = now_ms.saturating_sub(last_ms);

        if elapsed < self.min_request_interval_ms {
            let wait_ms = self.min_request_interval_ms - elapsed;
            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
        }

        self.last_request
            .store(self.created.elapsed().as_millis() as u64, Ordering::Relaxed);

        // Make HTTP request
        let url = format!("{}/{}?key={}", self.base_url, endpoint, self.api_key);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::provider_error(format!("HTTP request failed: {}", e)))?;

        // Handle response
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                CasefileError::Generation(GenerationError::InvalidResponse {
                    provider: "gemini".to_string(),
                    reason: format!("Failed to parse response: {}", e),
                })
            })
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let error_msg = if let Ok(api_error) = serde_json::from_str::<ApiErrorBody>(&error_text)
            {
                api_error.error.message
            } else {
                error_text
            };

            Err(match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    CasefileError::Generation(GenerationError::RateLimited {
                        provider: "gemini".to_string(),
                        retry_after_ms: 1_000,
                    })
                }
                _ => CasefileError::Generation(GenerationError::RequestFailed {
                    provider: "gemini".to_string(),
                    status: status.as_u16() as i32,
                    message: error_msg,
                }),
            })
        }
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
