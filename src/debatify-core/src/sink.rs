//! Transcript persistence sink.
//!
//! The core only ever writes to the sink; it never reads back. Writes are
//! best effort: the gateway logs a failed append and moves on, so debate
//! state stays correct even when persistence is down.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// One persisted generation record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkRecord {
    pub participant_identity: String,
    pub topic: String,
    pub response_text: String,
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink rejected the write (status {0})")]
    Rejected(u16),

    #[error("sink unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
}

/// Append-only persistence for debate responses.
#[async_trait]
pub trait TranscriptSink: Send + Sync {
    async fn append(&self, record: SinkRecord) -> Result<(), SinkError>;
}

/// Sink that POSTs each record to a REST endpoint.
pub struct HttpSink {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TranscriptSink for HttpSink {
    async fn append(&self, record: SinkRecord) -> Result<(), SinkError> {
        let response = self.http.post(&self.endpoint).json(&record).send().await?;
        if !response.status().is_success() {
            return Err(SinkError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Sink that drops every record; used when persistence is not configured.
pub struct NullSink;

#[async_trait]
impl TranscriptSink for NullSink {
    async fn append(&self, _record: SinkRecord) -> Result<(), SinkError> {
        Ok(())
    }
}
