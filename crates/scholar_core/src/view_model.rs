use crate::{
    AttemptId, ChannelState, DiscoveredItem, DownloadState, JobStatistics, Notification,
    SubmissionState, SummaryBlock,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub attempt: Option<AttemptId>,
    pub channel: ChannelState,
    pub submission: SubmissionState,
    pub progress_visible: bool,
    pub progress: u8,
    pub discoveries: Vec<DiscoveredItem>,
    /// Index one past the last visible entry; equals `discoveries.len()` when
    /// the list is scrolled to the bottom.
    pub discovery_scroll: usize,
    pub results: Option<ResultsView>,
    pub download: DownloadState,
    pub last_download_error: Option<String>,
    pub notifications: Vec<Notification>,
    /// True while the submission or the progress channel is still live.
    pub busy: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub blocks: Vec<SummaryBlock>,
    pub statistics: Option<JobStatistics>,
    pub result_filename: String,
}

impl AppViewModel {
    pub fn download_available(&self) -> bool {
        matches!(
            self.download,
            DownloadState::Available | DownloadState::Saved(_)
        )
    }
}
