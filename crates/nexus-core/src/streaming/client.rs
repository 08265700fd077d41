use std::time::Duration;

use futures::StreamExt;
use reqwest::header::ACCEPT;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::sse::SseDecoder;
use super::types::StreamEnvelope;
use crate::api::FeedApiClient;
use crate::config::FeedConfig;

/// Everything the stream client reports to its owner
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    /// A connection attempt is about to be made (1-based)
    Connecting { attempt: u64 },
    Connected,
    Envelope(StreamEnvelope),
    /// The current connection ended; a reconnect follows after the fixed delay
    Disconnected { reason: String },
}

/// How a single connection ended
enum StreamEnd {
    Closed,
    Failed(String),
    ReceiverDropped,
}

/// Client for the backend's server-push channel.
/// Reconnects after a fixed delay whenever the connection drops, forever.
pub struct EventStreamClient {
    url: String,
    client: reqwest::Client,
    reconnect_delay: Duration,
}

impl EventStreamClient {
    pub fn new(url: impl Into<String>, reconnect_delay: Duration) -> Self {
        Self::with_client(url, reconnect_delay, reqwest::Client::new())
    }

    pub fn with_client(url: impl Into<String>, reconnect_delay: Duration, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
            reconnect_delay,
        }
    }

    /// Client for the stream of the backend `api` talks to, sharing its
    /// connection pool and using the configured reconnect delay
    pub fn for_api(api: &FeedApiClient, config: &FeedConfig) -> Self {
        Self::with_client(api.stream_url(), config.reconnect_delay, api.http().clone())
    }

    /// Start the client on the current runtime. Updates flow into `update_tx`
    /// until the returned handle is closed or dropped, or the receiver goes away.
    pub fn spawn(self, update_tx: mpsc::Sender<StreamUpdate>) -> StreamHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(update_tx, cancel_rx));
        StreamHandle {
            cancel_tx,
            task: Some(task),
        }
    }

    async fn run(self, update_tx: mpsc::Sender<StreamUpdate>, mut cancel_rx: watch::Receiver<bool>) {
        let mut attempt: u64 = 0;

        loop {
            if *cancel_rx.borrow() {
                break;
            }

            attempt += 1;
            if update_tx.send(StreamUpdate::Connecting { attempt }).await.is_err() {
                break;
            }

            let end = tokio::select! {
                _ = cancelled(&mut cancel_rx) => break,
                end = self.read_stream(&update_tx) => end,
            };

            let reason = match end {
                StreamEnd::ReceiverDropped => {
                    debug!("Stream update receiver dropped, stopping");
                    break;
                }
                StreamEnd::Closed => "server closed the stream".to_string(),
                StreamEnd::Failed(reason) => reason,
            };

            warn!(%reason, attempt, "Event stream disconnected, reconnecting in {:?}", self.reconnect_delay);
            if update_tx
                .send(StreamUpdate::Disconnected { reason })
                .await
                .is_err()
            {
                break;
            }

            tokio::select! {
                _ = cancelled(&mut cancel_rx) => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        debug!("Event stream client stopped");
    }

    async fn read_stream(&self, update_tx: &mpsc::Sender<StreamUpdate>) -> StreamEnd {
        let response = match self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return StreamEnd::Failed(format!("connect failed: {}", e)),
        };

        if !response.status().is_success() {
            return StreamEnd::Failed(format!("unexpected status {}", response.status()));
        }

        info!(url = %self.url, "Connected to event stream");
        if update_tx.send(StreamUpdate::Connected).await.is_err() {
            return StreamEnd::ReceiverDropped;
        }

        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => return StreamEnd::Failed(format!("read failed: {}", e)),
            };

            for payload in decoder.feed(&chunk) {
                match StreamEnvelope::parse(&payload) {
                    Some(envelope) => {
                        if update_tx.send(StreamUpdate::Envelope(envelope)).await.is_err() {
                            return StreamEnd::ReceiverDropped;
                        }
                    }
                    None => {
                        debug!(%payload, "Discarding unparseable stream payload");
                    }
                }
            }
        }

        StreamEnd::Closed
    }
}

/// Resolves once cancellation is requested or the handle is gone
async fn cancelled(cancel_rx: &mut watch::Receiver<bool>) {
    loop {
        if *cancel_rx.borrow() {
            return;
        }
        if cancel_rx.changed().await.is_err() {
            return;
        }
    }
}

/// Owned handle to a running stream client. Closing or dropping it stops the
/// connection and any pending reconnect.
pub struct StreamHandle {
    cancel_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl StreamHandle {
    /// Stop the client and wait for its task to wind down
    pub async fn close(mut self) {
        let _ = self.cancel_tx.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        let _ = self.cancel_tx.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
