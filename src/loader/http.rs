//! reqwest-backed HTTP transport

use crate::config::WidgetConfig;
use crate::error::{AppError, Result};
use crate::loader::HttpClient;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Production transport for the quote endpoint
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new(config: &WidgetConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AppError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
