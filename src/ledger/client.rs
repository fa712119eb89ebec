use std::time::Duration;

use reqwest::Client;

use super::LedgerControl;
use super::error::LedgerApiError;
use super::types::{CreateLedgerRequest, LedgerDescription};

pub struct LedgerClient {
    api_token: String,
    client: Client,
    base_url: String,
}

impl LedgerClient {
    pub fn new(api_token: String, endpoint: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");
        Self {
            api_token,
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
        }
    }

    async fn parse_response(
        response: reqwest::Response,
    ) -> Result<LedgerDescription, LedgerApiError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return Err(LedgerApiError::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(LedgerApiError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<LedgerDescription>().await?;
        Ok(body)
    }
}

impl LedgerControl for LedgerClient {
    async fn describe(&self, name: &str) -> Result<LedgerDescription, LedgerApiError> {
        let response = self
            .client
            .get(format!("{}/ledgers/{name}", self.base_url))
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn create(
        &self,
        req: &CreateLedgerRequest,
    ) -> Result<LedgerDescription, LedgerApiError> {
        let response = self
            .client
            .post(format!("{}/ledgers", self.base_url))
            .bearer_auth(&self.api_token)
            .header("content-type", "application/json")
            .json(req)
            .send()
            .await?;
        Self::parse_response(response).await
    }
}
