//! HTTP transport over the engine's REST API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::BridgeConfig;

use super::traits::{SearchTransport, TransportError, TransportFactory};

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &BridgeConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "Engine request");
        self.client.request(method, format!("{}/{}", self.base_url, path))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value, TransportError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| TransportError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn index_exists(&self, index: &str) -> Result<bool, TransportError> {
        let response = self.request(Method::HEAD, index).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(TransportError::Status {
                status: status.as_u16(),
                body: String::new(),
            }),
        }
    }

    async fn create_index(&self, index: &str) -> Result<(), TransportError> {
        self.send(self.request(Method::PUT, index)).await.map(drop)
    }

    async fn delete_index(&self, index: &str) -> Result<(), TransportError> {
        self.send(self.request(Method::DELETE, index)).await.map(drop)
    }

    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), TransportError> {
        let builder = self.request(Method::PUT, &format!("{index}/_mapping")).json(mapping);
        self.send(builder).await.map(drop)
    }

    async fn get_mapping(&self, index: &str) -> Result<Value, TransportError> {
        self.send(self.request(Method::GET, &format!("{index}/_mapping"))).await
    }

    async fn put_settings(&self, index: &str, settings: &Value) -> Result<(), TransportError> {
        let builder = self.request(Method::PUT, &format!("{index}/_settings")).json(settings);
        self.send(builder).await.map(drop)
    }

    async fn close_index(&self, index: &str) -> Result<(), TransportError> {
        self.send(self.request(Method::POST, &format!("{index}/_close"))).await.map(drop)
    }

    async fn open_index(&self, index: &str) -> Result<(), TransportError> {
        self.send(self.request(Method::POST, &format!("{index}/_open"))).await.map(drop)
    }

    async fn bulk(&self, lines: &[Value]) -> Result<Value, TransportError> {
        let mut body = String::new();
        for line in lines {
            body.push_str(&line.to_string());
            body.push('\n');
        }
        let builder = self
            .request(Method::POST, "_bulk")
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body);
        self.send(builder).await
    }

    async fn search(&self, index: &str, body: &Value) -> Result<Value, TransportError> {
        let builder = self
            .request(Method::POST, &format!("{index}/_search"))
            .query(&[("track_total_hits", "true")])
            .json(body);
        self.send(builder).await
    }

    async fn ping(&self) -> Result<bool, TransportError> {
        let response = self.request(Method::GET, "").send().await?;
        Ok(response.status().is_success())
    }
}

/// Builds an [`HttpTransport`] from the bridge configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpTransportFactory;

impl TransportFactory for HttpTransportFactory {
    fn connect(&self, config: &BridgeConfig) -> Result<Arc<dyn SearchTransport>, TransportError> {
        Ok(Arc::new(HttpTransport::new(config)?))
    }
}
