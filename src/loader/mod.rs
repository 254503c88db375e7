//! Quote loader
//!
//! Fetches the instrument snapshot for a `cirrus_token`. Failures never
//! reach the form: they are logged and replaced by the empty quote.

pub mod http;

use crate::config::WidgetConfig;
use crate::error::Result;
use crate::types::{InstrumentQuote, QuoteEnvelope};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

pub use http::ReqwestClient;

/// Transport used by the loader
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET and return the response body of a successful response
    async fn get(&self, url: &str) -> Result<String>;
}

/// Loads quotes through an injected transport
#[derive(Clone)]
pub struct QuoteLoader {
    http: Arc<dyn HttpClient>,
    config: WidgetConfig,
}

impl QuoteLoader {
    pub fn new(http: Arc<dyn HttpClient>, config: WidgetConfig) -> Self {
        Self { http, config }
    }

    /// Loader over the reqwest transport
    pub fn from_config(config: WidgetConfig) -> Result<Self> {
        let http = Arc::new(ReqwestClient::new(&config)?);
        Ok(Self::new(http, config))
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Fetch and decode a quote, reporting any failure
    pub async fn try_fetch(&self, token: &str) -> Result<InstrumentQuote> {
        let url = self.config.quote_url(token)?;
        let body = self.http.get(url.as_str()).await?;
        debug!("Quote response for {}: {}", token, body);

        let envelope: QuoteEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.into_quote())
    }

    /// Fetch a quote, substituting the empty quote on failure
    pub async fn fetch(&self, token: &str) -> InstrumentQuote {
        match self.try_fetch(token).await {
            Ok(quote) => {
                info!(
                    "Loaded quote {}:{} (ltp {}, {} depth levels)",
                    quote.exchange,
                    quote.tradingsymbol,
                    quote.ltp,
                    quote.depth.len()
                );
                quote
            }
            Err(e) => {
                error!("Error fetching Cirrus token data: {}", e);
                InstrumentQuote::default()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::AppError;
    use parking_lot::Mutex;

    /// In-memory transport returning a canned response
    pub struct FakeHttp {
        response: Mutex<Result<String>>,
        pub requests: Mutex<Vec<String>>,
    }

    impl FakeHttp {
        pub fn ok(body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Ok(body.to_string())),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Err(AppError::Status {
                    status,
                    body: "unavailable".to_string(),
                })),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    #[async_trait]
    impl HttpClient for FakeHttp {
        async fn get(&self, url: &str) -> Result<String> {
            self.requests.lock().push(url.to_string());
            match &*self.response.lock() {
                Ok(body) => Ok(body.clone()),
                Err(AppError::Status { status, body }) => Err(AppError::Status {
                    status: *status,
                    body: body.clone(),
                }),
                Err(e) => Err(AppError::Internal(e.to_string())),
            }
        }
    }

    pub const NIFTY_QUOTE: &str = r#"{
        "data": {
            "tradingsymbol": "NIFTY24JUNFUT",
            "exchange": "NFO",
            "instrument": "FUT",
            "lot_size": 50,
            "ltp": 22510.5,
            "prev_close": 22400.0,
            "depth": [
                {"bid_price": 22510.0, "bid_qty": 75, "ask_price": 22511.25, "ask_qty": 150},
                {"bid_price": 22509.5, "bid_qty": 300, "ask_price": 22512.0, "ask_qty": 50}
            ]
        }
    }"#;
}
