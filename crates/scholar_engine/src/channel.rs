use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use scholar_core::{AttemptId, DiscoveredItem, ProgressEvent};
use scholar_logging::{scholar_debug, scholar_info, scholar_trace, scholar_warn};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::sse::SseDecoder;
use crate::{ChannelError, ClientSettings, EngineEvent, EventSink, RequestError};

#[derive(Debug, Deserialize)]
struct WireProgress {
    progress: f64,
    #[serde(default)]
    papers: Option<Vec<WirePaper>>,
}

#[derive(Debug, Deserialize)]
struct WirePaper {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

/// Decodes one push message: `{"progress": n, "papers": [{"title", "source"}]}`.
pub fn decode_progress(data: &str) -> Result<ProgressEvent, ChannelError> {
    let wire: WireProgress =
        serde_json::from_str(data).map_err(|err| ChannelError::Decode(err.to_string()))?;
    let items = wire
        .papers
        .unwrap_or_default()
        .into_iter()
        .map(|paper| DiscoveredItem::from_wire(paper.title, paper.source))
        .collect();
    let (event, clamped) = ProgressEvent::from_raw(wire.progress, items);
    if clamped {
        scholar_warn!(
            "Progress value {} outside 0..=100, clamped to {}",
            wire.progress,
            event.progress
        );
    }
    Ok(event)
}

struct ActiveSubscription {
    attempt: AttemptId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns at most one live progress subscription.
pub struct ProgressChannel {
    client: reqwest::Client,
    url: Url,
    active: Option<ActiveSubscription>,
}

impl ProgressChannel {
    pub fn new(settings: &ClientSettings) -> Result<Self, RequestError> {
        Ok(Self {
            client: settings.build_stream_client()?,
            url: settings.progress_url()?,
            active: None,
        })
    }

    /// Opens a subscription for `attempt`, closing any previous one first.
    ///
    /// Must be called within a tokio runtime context.
    pub fn open(&mut self, attempt: AttemptId, sink: Arc<dyn EventSink>) {
        if let Some(previous) = self.active.take() {
            scholar_debug!(
                "Closing progress channel of attempt {} before opening {}",
                previous.attempt,
                attempt
            );
            previous.cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_subscription(
            self.client.clone(),
            self.url.clone(),
            attempt,
            cancel.clone(),
            sink,
        ));
        scholar_info!("Opened progress channel for attempt {}", attempt);
        self.active = Some(ActiveSubscription {
            attempt,
            cancel,
            task,
        });
    }

    /// Closes the subscription if it belongs to `attempt`. Returns whether one was closed.
    pub fn close(&mut self, attempt: AttemptId) -> bool {
        match self.active.take() {
            Some(active) if active.attempt == attempt => {
                active.cancel.cancel();
                scholar_info!("Closed progress channel for attempt {}", attempt);
                true
            }
            other => {
                self.active = other;
                false
            }
        }
    }

    /// Attempt whose subscription is still running, if any.
    pub fn active_attempt(&self) -> Option<AttemptId> {
        self.active
            .as_ref()
            .filter(|active| !active.cancel.is_cancelled() && !active.task.is_finished())
            .map(|active| active.attempt)
    }
}

impl Drop for ProgressChannel {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
        }
    }
}

async fn run_subscription(
    client: reqwest::Client,
    url: Url,
    attempt: AttemptId,
    cancel: CancellationToken,
    sink: Arc<dyn EventSink>,
) {
    tokio::select! {
        _ = cancel.cancelled() => {
            scholar_debug!("Progress subscription of attempt {} cancelled", attempt);
        }
        result = stream_progress(&client, url, attempt, sink.as_ref()) => {
            if let Err(err) = &result {
                scholar_warn!("Progress channel of attempt {} failed: {}", attempt, err);
            }
            sink.emit(EngineEvent::ChannelClosed {
                attempt,
                error: result.err(),
            });
        }
    }
}

async fn stream_progress(
    client: &reqwest::Client,
    url: Url,
    attempt: AttemptId,
    sink: &dyn EventSink,
) -> Result<(), ChannelError> {
    let response = client
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(|err| ChannelError::Transport(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ChannelError::HttpStatus(status.as_u16()));
    }

    let mut decoder = SseDecoder::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| ChannelError::Transport(err.to_string()))?;
        let messages = decoder
            .feed(&chunk)
            .map_err(|err| ChannelError::Decode(err.to_string()))?;
        for message in messages {
            if !message.is_message() {
                scholar_trace!("Skipping {:?} event on attempt {}", message.event, attempt);
                continue;
            }
            let event = decode_progress(&message.data)?;
            sink.emit(EngineEvent::Progress { attempt, event });
        }
    }

    Ok(())
}
