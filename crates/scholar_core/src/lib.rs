//! Scholar core: pure form-session state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod statistics;
mod summary;
mod types;
mod update;
mod validate;
mod view_model;

pub use effect::Effect;
pub use msg::{Msg, SubmissionOutcome};
pub use state::{AppState, FormInput};
pub use statistics::{JobStatistics, OtherSource, SourceStats};
pub use summary::{format_statistics, SummaryBlock, GRID_COLUMNS, HEADING_PREFIXES};
pub use types::{
    AttemptId, ChannelState, DiscoveredItem, DownloadState, JobRequest, Notification,
    NotificationKind, ProgressEvent, SubmissionState, DEFAULT_RESULT_FILENAME, NOTIFICATION_TTL,
    PROGRESS_MAX, UNTITLED_ITEM,
};
pub use update::{update, CONNECTION_LOST_MESSAGE, SUBMISSION_FAILED_MESSAGE};
pub use validate::{validate_form, ValidationError};
pub use view_model::{AppViewModel, ResultsView};
