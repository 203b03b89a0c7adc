use std::path::PathBuf;
use std::time::Duration;

use scholar_logging::{scholar_debug, scholar_warn};

use crate::view_model::{AppViewModel, ResultsView};
use crate::{
    AttemptId, ChannelState, DiscoveredItem, DownloadState, JobRequest, JobStatistics,
    Notification, NotificationKind, ProgressEvent, SubmissionState, SummaryBlock,
    DEFAULT_RESULT_FILENAME, NOTIFICATION_TTL, PROGRESS_MAX,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormInput {
    pub query: String,
    pub pages: String,
}

/// All state owned by one form session.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    form: FormInput,
    now: Duration,
    last_attempt: AttemptId,
    current_attempt: Option<AttemptId>,
    channel: ChannelState,
    submission: SubmissionState,
    progress_visible: bool,
    progress: u8,
    discoveries: Vec<DiscoveredItem>,
    discovery_scroll: usize,
    results: Option<(Vec<SummaryBlock>, Option<JobStatistics>)>,
    result_filename: String,
    download: DownloadState,
    last_download_error: Option<String>,
    notifications: Vec<Notification>,
    next_notification_id: u64,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            form: FormInput::default(),
            now: Duration::ZERO,
            last_attempt: 0,
            current_attempt: None,
            channel: ChannelState::Idle,
            submission: SubmissionState::Idle,
            progress_visible: false,
            progress: 0,
            discoveries: Vec::new(),
            discovery_scroll: 0,
            results: None,
            result_filename: DEFAULT_RESULT_FILENAME.to_string(),
            download: DownloadState::Unavailable,
            last_download_error: None,
            notifications: Vec::new(),
            next_notification_id: 1,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name shown for the saved result file.
    pub fn with_result_filename(mut self, filename: impl Into<String>) -> Self {
        self.result_filename = filename.into();
        self
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            attempt: self.current_attempt,
            channel: self.channel,
            submission: self.submission,
            progress_visible: self.progress_visible,
            progress: self.progress,
            discoveries: self.discoveries.clone(),
            discovery_scroll: self.discovery_scroll,
            results: self
                .results
                .as_ref()
                .map(|(blocks, statistics)| ResultsView {
                    blocks: blocks.clone(),
                    statistics: statistics.clone(),
                    result_filename: self.result_filename.clone(),
                }),
            download: self.download.clone(),
            last_download_error: self.last_download_error.clone(),
            notifications: self.notifications.clone(),
            busy: self.is_busy(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn form(&self) -> &FormInput {
        &self.form
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn current_attempt(&self) -> Option<AttemptId> {
        self.current_attempt
    }

    pub fn channel(&self) -> ChannelState {
        self.channel
    }

    pub fn submission(&self) -> SubmissionState {
        self.submission
    }

    pub fn download(&self) -> &DownloadState {
        &self.download
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.submission, SubmissionState::InFlight(_))
            || self.channel.live_attempt().is_some()
            || self.download == DownloadState::InFlight
    }

    pub(crate) fn set_query(&mut self, query: String) {
        self.form.query = query;
    }

    pub(crate) fn set_pages(&mut self, pages: String) {
        self.form.pages = pages;
    }

    pub(crate) fn is_current(&self, attempt: AttemptId) -> bool {
        if self.current_attempt == Some(attempt) {
            return true;
        }
        scholar_debug!(
            "Discarding report for stale attempt {} (current {:?})",
            attempt,
            self.current_attempt
        );
        false
    }

    pub(crate) fn in_flight_submission(&self) -> Option<AttemptId> {
        match self.submission {
            SubmissionState::InFlight(id) => Some(id),
            _ => None,
        }
    }

    /// Clears the previous run's view and starts a new attempt for `request`.
    pub(crate) fn begin_attempt(&mut self, request: &JobRequest) -> AttemptId {
        self.last_attempt += 1;
        let attempt = self.last_attempt;
        scholar_debug!(
            "Starting attempt {} query={:?} pages={}",
            attempt,
            request.query,
            request.page_count
        );

        self.current_attempt = Some(attempt);
        self.results = None;
        self.discoveries.clear();
        self.discovery_scroll = 0;
        self.progress = 0;
        self.download = DownloadState::Unavailable;
        self.last_download_error = None;

        self.progress_visible = true;
        self.channel = ChannelState::Open(attempt);
        self.submission = SubmissionState::InFlight(attempt);
        self.dirty = true;
        attempt
    }

    pub(crate) fn apply_progress(&mut self, attempt: AttemptId, event: ProgressEvent) {
        if let ChannelState::Closed(closed) = self.channel {
            if closed == attempt {
                scholar_warn!("Progress for attempt {} after its channel closed", attempt);
                return;
            }
        }

        self.channel = ChannelState::Receiving(attempt);
        self.progress = event.progress;
        for item in event.items {
            self.discoveries.push(item);
            self.discovery_scroll = self.discoveries.len();
        }
        if self.progress == PROGRESS_MAX {
            self.mark_download_available();
        }
        self.dirty = true;
    }

    /// Closes the channel of `attempt`. Returns false when it was already closed.
    pub(crate) fn close_channel(&mut self, attempt: AttemptId) -> bool {
        if self.channel.live_attempt() != Some(attempt) {
            return false;
        }
        self.channel = ChannelState::Closed(attempt);
        self.dirty = true;
        true
    }

    pub(crate) fn progress_complete(&self) -> bool {
        self.progress == PROGRESS_MAX
    }

    pub(crate) fn apply_submission_success(
        &mut self,
        attempt: AttemptId,
        blocks: Option<Vec<SummaryBlock>>,
        statistics: Option<JobStatistics>,
    ) {
        self.submission = SubmissionState::Succeeded(attempt);
        if let Some(blocks) = blocks {
            self.results = Some((blocks, statistics));
        }
        self.mark_download_available();
        self.dirty = true;
    }

    pub(crate) fn apply_submission_failure(&mut self, attempt: AttemptId) {
        self.submission = SubmissionState::Failed(attempt);
        self.dirty = true;
    }

    fn mark_download_available(&mut self) {
        if self.download == DownloadState::Unavailable {
            self.download = DownloadState::Available;
        }
    }

    /// Moves the download into flight and returns the attempt whose result
    /// is fetched, or `None` when no download can start.
    pub(crate) fn start_download(&mut self) -> Option<AttemptId> {
        let attempt = self.current_attempt?;
        match self.download {
            DownloadState::Available | DownloadState::Saved(_) => {
                self.download = DownloadState::InFlight;
                self.last_download_error = None;
                self.dirty = true;
                Some(attempt)
            }
            DownloadState::Unavailable | DownloadState::InFlight => None,
        }
    }

    pub(crate) fn finish_download(&mut self, path: PathBuf) {
        self.download = DownloadState::Saved(path);
        self.dirty = true;
    }

    pub(crate) fn fail_download(&mut self, reason: String) {
        if self.download == DownloadState::InFlight {
            self.download = DownloadState::Available;
        }
        self.last_download_error = Some(reason);
        self.dirty = true;
    }

    pub(crate) fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        self.notifications.push(Notification {
            id,
            kind,
            message: message.into(),
            expires_at: self.now + NOTIFICATION_TTL,
        });
        self.dirty = true;
    }

    pub(crate) fn advance_clock(&mut self, now: Duration) {
        self.now = self.now.max(now);
        let before = self.notifications.len();
        let current = self.now;
        self.notifications.retain(|n| n.expires_at > current);
        if self.notifications.len() != before {
            self.dirty = true;
        }
    }
}
