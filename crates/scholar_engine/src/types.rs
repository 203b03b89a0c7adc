use std::fmt;
use std::path::PathBuf;

use scholar_core::{AttemptId, ProgressEvent, SubmissionOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A push message decoded on the progress channel of `attempt`.
    Progress {
        attempt: AttemptId,
        event: ProgressEvent,
    },
    /// The progress channel of `attempt` stopped. `error` is `None` when the
    /// server ended the stream cleanly. Channels closed on request report nothing.
    ChannelClosed {
        attempt: AttemptId,
        error: Option<ChannelError>,
    },
    SubmissionCompleted {
        attempt: AttemptId,
        result: Result<SubmissionOutcome, RequestError>,
    },
    DownloadCompleted {
        attempt: AttemptId,
        result: Result<PathBuf, RequestError>,
    },
}

/// Terminal failure of a progress subscription.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("progress stream returned http status {0}")]
    HttpStatus(u16),
    #[error("progress stream transport error: {0}")]
    Transport(String),
    #[error("undecodable progress message: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RequestError {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode,
    Persist,
    Cancelled,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Persist => write!(f, "could not save file"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return RequestError::new(FailureKind::InvalidUrl, err.to_string());
    }
    RequestError::new(FailureKind::Network, err.to_string())
}

/// Receiver of engine events; implementations must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}
