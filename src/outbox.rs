//! Reply and notification delivery.
//!
//! The control loop never waits on delivery: messages are queued on an
//! [`Outbox`] and a dedicated task hands them to a [`ReplySink`] in order.
//! Failed deliveries are logged and dropped.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Where replies end up.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Prints every message to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

#[async_trait]
impl ReplySink for ConsoleSink {
    async fn send(&self, text: &str) -> Result<()> {
        println!("{}\n", text);
        Ok(())
    }
}

/// Posts `{"content": text}` to a chat webhook.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ReplySink for WebhookSink {
    async fn send(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "content": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "webhook returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Fire-and-forget handle for queuing messages.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<String>,
}

impl Outbox {
    /// Create an outbox and the receiving end of its queue.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, text: impl Into<String>) {
        if self.tx.send(text.into()).is_err() {
            debug!("Outbox closed, dropping message");
        }
    }
}

/// Deliver queued messages to `sink` until every [`Outbox`] is dropped.
pub fn spawn_delivery(
    mut rx: mpsc::UnboundedReceiver<String>,
    sink: Arc<dyn ReplySink>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if let Err(e) = sink.send(&text).await {
                warn!("Failed to deliver message: {}", e);
            }
        }
    })
}

/// Send `greeting` once after `delay`, then `reminder` every `every`.
///
/// A zero `every` disables the reminder.
pub fn spawn_announcements(
    outbox: Outbox,
    greeting: &'static str,
    reminder: &'static str,
    delay: Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        outbox.send(greeting);

        if every.is_zero() {
            return;
        }
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        loop {
            ticker.tick().await;
            outbox.send(reminder);
        }
    })
}
