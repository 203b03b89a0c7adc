use std::path::PathBuf;
use std::time::Duration;

use crate::{AttemptId, JobStatistics, ProgressEvent};

/// What the submission endpoint handed back on success.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmissionOutcome {
    /// Plain-text job summary, if the response carried one.
    pub summary: Option<String>,
    /// Structured statistics, if the response carried them.
    pub statistics: Option<JobStatistics>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the search query field.
    QueryChanged(String),
    /// User edited the page count field.
    PagesChanged(String),
    /// User submitted the form.
    FormSubmitted,
    /// A push message was decoded on the progress channel.
    ProgressReceived {
        attempt: AttemptId,
        event: ProgressEvent,
    },
    /// The progress channel failed (transport error or undecodable message).
    ChannelFailed { attempt: AttemptId, reason: String },
    /// The server ended the progress stream without an error.
    ChannelEnded { attempt: AttemptId },
    /// The job request completed with a successful status.
    SubmissionSucceeded {
        attempt: AttemptId,
        outcome: SubmissionOutcome,
    },
    /// The job request failed (network error or non-success status).
    SubmissionFailed { attempt: AttemptId, reason: String },
    /// User asked for the result file.
    DownloadClicked,
    /// Result file of `attempt` was saved locally.
    DownloadFinished { attempt: AttemptId, path: PathBuf },
    /// Result file of `attempt` could not be fetched or saved.
    DownloadFailed { attempt: AttemptId, reason: String },
    /// Clock tick carrying monotonic time since the session started.
    Tick { now: Duration },
}
