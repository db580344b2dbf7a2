//! Jupiter Quote Client
//!
//! HTTP client for the Jupiter swap quote endpoint. Implements `QuotePort`
//! by quoting the held token back into the configured quote mint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;

use crate::config::JupiterSection;
use crate::domain::Instrument;
use crate::ports::{QuoteError, QuotePort};
use super::quote::{slippage_pct_to_bps, QuoteRequest, QuoteResponse};

/// Jupiter API client configuration
#[derive(Debug, Clone)]
pub struct JupiterConfig {
    /// Base URL for Jupiter API
    pub api_base_url: String,
    /// Optional API key for higher rate limits
    pub api_key: Option<String>,
    /// Mint the held token is quoted into
    pub quote_mint: String,
    /// Request timeout
    pub timeout: Duration,
    /// Number of attempts per quote
    pub max_retries: u32,
}

impl Default for JupiterConfig {
    fn default() -> Self {
        JupiterConfig::from(&JupiterSection::default())
    }
}

impl From<&JupiterSection> for JupiterConfig {
    fn from(section: &JupiterSection) -> Self {
        Self {
            api_base_url: section.api_url.trim_end_matches('/').to_string(),
            api_key: section.get_api_key(),
            quote_mint: section.quote_mint.clone(),
            timeout: Duration::from_secs(section.timeout_secs),
            max_retries: section.max_retries.max(1),
        }
    }
}

/// Jupiter quote client
#[derive(Debug, Clone)]
pub struct JupiterQuoteClient {
    config: JupiterConfig,
    http: Client,
}

impl JupiterQuoteClient {
    /// Create a new Jupiter client with default configuration
    pub fn new() -> Result<Self, QuoteError> {
        Self::with_config(JupiterConfig::default())
    }

    /// Create a new Jupiter client with custom configuration
    pub fn with_config(config: JupiterConfig) -> Result<Self, QuoteError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| QuoteError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Get a quote for a token swap
    pub async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, QuoteError> {
        let url = format!("{}/quote", self.config.api_base_url);

        let mut req = self.http.get(&url).query(&request.query_pairs());
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("x-api-key", api_key);
        }

        let response = self
            .execute_with_retry(|| async {
                req.try_clone()
                    .ok_or_else(|| QuoteError::ApiError("Failed to clone request".into()))?
                    .send()
                    .await
                    .map_err(|e| QuoteError::ApiError(e.to_string()))
            })
            .await?;

        self.handle_response(response, &request.input_mint).await
    }

    /// Execute request with retry logic and rate limit handling
    async fn execute_with_retry<F, Fut>(&self, request_fn: F) -> Result<reqwest::Response, QuoteError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, QuoteError>>,
    {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    // Rate limited: back off 1s, 2s, 4s
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let backoff = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "Jupiter rate limited (429), backing off for {:?} (attempt {}/{})",
                            backoff,
                            attempt + 1,
                            self.config.max_retries
                        );
                        last_error = Some(QuoteError::ApiError("Rate limit exceeded".into()));
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    if status.is_server_error() {
                        last_error = Some(QuoteError::ApiError(format!("Server error: {}", status)));
                        tokio::time::sleep(Duration::from_millis(250 * (attempt as u64 + 1))).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    last_error = Some(e);
                    tokio::time::sleep(Duration::from_millis(250 * (attempt as u64 + 1))).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| QuoteError::ApiError("Max retries exceeded".into())))
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
        input_mint: &str,
    ) -> Result<QuoteResponse, QuoteError> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if is_no_route_error(&error_text) {
                return Err(QuoteError::NoRoute(input_mint.to_string()));
            }
            return Err(QuoteError::ApiError(format!("API error {}: {}", status, error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| QuoteError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    /// Get the configured API base URL
    pub fn api_base_url(&self) -> &str {
        &self.config.api_base_url
    }

    pub fn quote_mint(&self) -> &str {
        &self.config.quote_mint
    }
}

fn is_no_route_error(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("no route")
        || lower.contains("could not find any route")
        || lower.contains("token_not_tradable")
}

#[async_trait]
impl QuotePort for JupiterQuoteClient {
    async fn quote(
        &self,
        instrument: &Instrument,
        input_amount: u64,
        slippage_pct: Decimal,
    ) -> Result<u64, QuoteError> {
        if input_amount == 0 {
            return Err(QuoteError::InvalidParameters("Cannot quote zero amount".into()));
        }

        let request = QuoteRequest::new(
            instrument.to_string(),
            self.config.quote_mint.clone(),
            input_amount,
            slippage_pct_to_bps(slippage_pct),
        );

        let quote = self.get_quote(&request).await?;
        quote.output_amount()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_jupiter_config_default() {
        let config = JupiterConfig::default();
        assert_eq!(config.api_base_url, "https://api.jup.ag/swap/v1");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_config_from_section() {
        let section = JupiterSection {
            api_url: "https://public.jupiterapi.com/".to_string(),
            api_key: None,
            quote_mint: "So11111111111111111111111111111111111111112".to_string(),
            timeout_secs: 3,
            max_retries: 0,
        };

        let config = JupiterConfig::from(&section);
        assert_eq!(config.api_base_url, "https://public.jupiterapi.com");
        assert_eq!(config.quote_mint, "So11111111111111111111111111111111111111112");
        assert_eq!(config.timeout, Duration::from_secs(3));
        // At least one attempt
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn test_client_creation() {
        let client = JupiterQuoteClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_no_route_detection() {
        assert!(is_no_route_error(r#"{"error":"No routes found"}"#));
        assert!(is_no_route_error("Could not find any route"));
        assert!(is_no_route_error(r#"{"errorCode":"TOKEN_NOT_TRADABLE"}"#));
        assert!(!is_no_route_error("Internal server error"));
    }

    #[tokio::test]
    async fn test_zero_amount_rejected_without_request() {
        let client = JupiterQuoteClient::new().unwrap();
        let result = client.quote(&Instrument::from("MINT"), 0, dec!(5)).await;
        assert!(matches!(result, Err(QuoteError::InvalidParameters(_))));
    }
}
