use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::BridgeConfig;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed engine response: {0}")]
    Malformed(String),
}

impl TransportError {
    /// Metrics label for the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Status { .. } => "http_status",
            Self::Malformed(_) => "malformed",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The engine's index and document REST surface.
///
/// Implementations only move JSON; building bodies and interpreting
/// responses is the backend's job.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn index_exists(&self, index: &str) -> Result<bool, TransportError>;
    async fn create_index(&self, index: &str) -> Result<(), TransportError>;
    async fn delete_index(&self, index: &str) -> Result<(), TransportError>;

    /// PUT `{"properties": {...}}` as the index mapping.
    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), TransportError>;

    /// Live mapping, `{<index>: {"mappings": {"properties": {...}}}}`.
    async fn get_mapping(&self, index: &str) -> Result<Value, TransportError>;

    async fn put_settings(&self, index: &str, settings: &Value) -> Result<(), TransportError>;
    async fn close_index(&self, index: &str) -> Result<(), TransportError>;
    async fn open_index(&self, index: &str) -> Result<(), TransportError>;

    /// Send bulk action lines; returns the engine's per-item report.
    async fn bulk(&self, lines: &[Value]) -> Result<Value, TransportError>;

    /// Run a search, always tracking the exact total hit count.
    async fn search(&self, index: &str, body: &Value) -> Result<Value, TransportError>;

    /// Whether the engine answers at all.
    async fn ping(&self) -> Result<bool, TransportError>;
}

/// Creates transports on first use.
pub trait TransportFactory: Send + Sync {
    fn connect(&self, config: &BridgeConfig) -> Result<Arc<dyn SearchTransport>, TransportError>;
}

/// Factory handing out one pre-built transport.
pub struct SharedTransport(pub Arc<dyn SearchTransport>);

impl TransportFactory for SharedTransport {
    fn connect(&self, _config: &BridgeConfig) -> Result<Arc<dyn SearchTransport>, TransportError> {
        Ok(Arc::clone(&self.0))
    }
}
