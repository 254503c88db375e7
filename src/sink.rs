//! Submission delivery

use crate::types::OrderPayload;
use tracing::info;

/// Receives the payload when the user submits
pub trait OrderSink: Send + Sync {
    fn deliver(&self, payload: &OrderPayload);
}

/// Default sink, logs the payload
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl OrderSink for LogSink {
    fn deliver(&self, payload: &OrderPayload) {
        match serde_json::to_string(payload) {
            Ok(json) => info!("SUBMIT: {}", json),
            Err(_) => info!("SUBMIT: {:?}", payload),
        }
    }
}
