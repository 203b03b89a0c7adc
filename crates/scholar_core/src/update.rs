use scholar_logging::{scholar_error, scholar_info, scholar_warn};

use crate::msg::SubmissionOutcome;
use crate::{
    format_statistics, validate_form, AppState, Effect, JobStatistics, Msg, NotificationKind,
};

/// Shown when the progress channel drops.
pub const CONNECTION_LOST_MESSAGE: &str =
    "Lost connection to server. Please submit the search again.";
/// Shown when the job request fails for any reason.
pub const SUBMISSION_FAILED_MESSAGE: &str = "An error occurred while processing your request";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::QueryChanged(query) => {
            state.set_query(query);
            Vec::new()
        }
        Msg::PagesChanged(pages) => {
            state.set_pages(pages);
            Vec::new()
        }
        Msg::FormSubmitted => {
            let form = state.form().clone();
            let request = match validate_form(&form.query, &form.pages) {
                Ok(request) => request,
                Err(err) => {
                    scholar_info!("Form rejected: {}", err);
                    state.notify(NotificationKind::Validation, err.to_string());
                    return (state, Vec::new());
                }
            };

            let mut effects = Vec::with_capacity(4);
            if let Some(previous) = state.in_flight_submission() {
                effects.push(Effect::CancelSubmission { attempt: previous });
            }
            if let Some(previous) = state.channel().live_attempt() {
                effects.push(Effect::CloseChannel { attempt: previous });
            }
            // Subscribe before posting so early progress is not missed.
            let attempt = state.begin_attempt(&request);
            effects.push(Effect::OpenChannel { attempt });
            effects.push(Effect::SubmitJob { attempt, request });
            effects
        }
        Msg::ProgressReceived { attempt, event } => {
            if state.is_current(attempt) {
                state.apply_progress(attempt, event);
            }
            Vec::new()
        }
        Msg::ChannelFailed { attempt, reason } => {
            if state.is_current(attempt) && state.close_channel(attempt) {
                scholar_warn!("Progress channel for attempt {} failed: {}", attempt, reason);
                state.notify(NotificationKind::Connection, CONNECTION_LOST_MESSAGE);
            }
            Vec::new()
        }
        Msg::ChannelEnded { attempt } => {
            if state.is_current(attempt) && state.close_channel(attempt) {
                if state.progress_complete() {
                    scholar_info!("Progress channel for attempt {} completed", attempt);
                } else {
                    scholar_warn!(
                        "Progress channel for attempt {} ended before completion",
                        attempt
                    );
                    state.notify(NotificationKind::Connection, CONNECTION_LOST_MESSAGE);
                }
            }
            Vec::new()
        }
        Msg::SubmissionSucceeded { attempt, outcome } => {
            if state.is_current(attempt) {
                let (blocks, statistics) = summarize(outcome);
                state.apply_submission_success(attempt, blocks, statistics);
            }
            Vec::new()
        }
        Msg::SubmissionFailed { attempt, reason } => {
            if state.is_current(attempt) {
                scholar_error!("Submission for attempt {} failed: {}", attempt, reason);
                state.apply_submission_failure(attempt);
                state.notify(NotificationKind::Submission, SUBMISSION_FAILED_MESSAGE);
            }
            Vec::new()
        }
        Msg::DownloadClicked => match state.start_download() {
            Some(attempt) => vec![Effect::Download { attempt }],
            None => Vec::new(),
        },
        Msg::DownloadFinished { attempt, path } => {
            if state.is_current(attempt) {
                scholar_info!("Result file saved to {:?}", path);
                state.finish_download(path);
            }
            Vec::new()
        }
        Msg::DownloadFailed { attempt, reason } => {
            if state.is_current(attempt) {
                // Logged only; download failures do not raise a notification.
                scholar_error!("Error downloading results: {}", reason);
                state.fail_download(reason);
            }
            Vec::new()
        }
        Msg::Tick { now } => {
            state.advance_clock(now);
            Vec::new()
        }
    };

    (state, effects)
}

/// Picks display blocks and statistics from a submission outcome. Summary
/// text wins; structured statistics alone are rendered through their text form.
fn summarize(
    outcome: SubmissionOutcome,
) -> (Option<Vec<crate::SummaryBlock>>, Option<JobStatistics>) {
    match (outcome.summary, outcome.statistics) {
        (Some(text), statistics) => {
            let statistics = statistics.or_else(|| {
                let parsed = JobStatistics::parse(&text);
                (!parsed.is_empty()).then_some(parsed)
            });
            (Some(format_statistics(&text)), statistics)
        }
        (None, Some(statistics)) => {
            let blocks = format_statistics(&statistics.to_summary_text());
            (Some(blocks), Some(statistics))
        }
        (None, None) => (None, None),
    }
}
