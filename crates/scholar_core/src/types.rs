use std::fmt;
use std::time::Duration;

/// Identifier of one submission attempt. Attempts are numbered from 1 and
/// only the most recent one is allowed to touch the view.
pub type AttemptId = u64;

/// File name the result spreadsheet is saved under.
pub const DEFAULT_RESULT_FILENAME: &str = "scholar_results.xlsx";

/// Title shown for discovered items the server sent without one.
pub const UNTITLED_ITEM: &str = "Untitled Paper";

/// How long a notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

pub const PROGRESS_MAX: u8 = 100;

/// A validated search job, ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub query: String,
    pub page_count: u32,
}

impl JobRequest {
    /// Form-encoded fields as the job endpoint expects them.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("query", self.query.clone()),
            ("num_pages", self.page_count.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredItem {
    pub title: String,
    pub source: Option<String>,
}

impl DiscoveredItem {
    /// Builds an item from loosely-typed wire fields. Missing or empty titles
    /// become [`UNTITLED_ITEM`]; empty sources are dropped.
    pub fn from_wire(title: Option<String>, source: Option<String>) -> Self {
        Self {
            title: title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED_ITEM.to_string()),
            source: source.filter(|s| !s.is_empty()),
        }
    }
}

/// One decoded push message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub progress: u8,
    pub items: Vec<DiscoveredItem>,
}

impl ProgressEvent {
    /// Builds an event from a raw progress number, clamping it into `0..=100`.
    ///
    /// Returns the event together with a flag telling whether clamping kicked in.
    pub fn from_raw(raw_progress: f64, items: Vec<DiscoveredItem>) -> (Self, bool) {
        let (progress, clamped) = clamp_progress(raw_progress);
        (Self { progress, items }, clamped)
    }
}

fn clamp_progress(raw: f64) -> (u8, bool) {
    if raw.is_nan() {
        return (0, true);
    }
    let truncated = raw.trunc();
    if truncated < 0.0 {
        (0, true)
    } else if truncated > f64::from(PROGRESS_MAX) {
        (PROGRESS_MAX, true)
    } else {
        (truncated as u8, false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Validation,
    Connection,
    Submission,
}

/// An inline error message that dismisses itself after [`NOTIFICATION_TTL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Idle,
    Open(AttemptId),
    Receiving(AttemptId),
    Closed(AttemptId),
}

impl ChannelState {
    /// Attempt owning a channel that is still live.
    pub fn live_attempt(self) -> Option<AttemptId> {
        match self {
            ChannelState::Open(id) | ChannelState::Receiving(id) => Some(id),
            ChannelState::Idle | ChannelState::Closed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight(AttemptId),
    Succeeded(AttemptId),
    Failed(AttemptId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DownloadState {
    #[default]
    Unavailable,
    Available,
    InFlight,
    Saved(std::path::PathBuf),
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelState::Idle => write!(f, "idle"),
            ChannelState::Open(id) => write!(f, "open (attempt {id})"),
            ChannelState::Receiving(id) => write!(f, "receiving (attempt {id})"),
            ChannelState::Closed(id) => write!(f, "closed (attempt {id})"),
        }
    }
}
