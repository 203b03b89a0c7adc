use std::path::PathBuf;
use std::sync::Once;

use pretty_assertions::assert_eq;
use scholar_core::{
    update, AppState, ChannelState, DiscoveredItem, DownloadState, Effect, JobStatistics, Msg,
    NotificationKind, ProgressEvent, SubmissionOutcome, SummaryBlock, CONNECTION_LOST_MESSAGE,
    SUBMISSION_FAILED_MESSAGE,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scholar_logging::initialize_for_tests);
}

fn started() -> AppState {
    let (state, _) = update(AppState::new(), Msg::QueryChanged("rust".into()));
    let (state, _) = update(state, Msg::PagesChanged("2".into()));
    let (state, effects) = update(state, Msg::FormSubmitted);
    assert_eq!(effects.len(), 2);
    state
}

fn item(title: &str, source: Option<&str>) -> DiscoveredItem {
    DiscoveredItem {
        title: title.to_string(),
        source: source.map(str::to_string),
    }
}

fn progress(attempt: u64, value: u8, items: Vec<DiscoveredItem>) -> Msg {
    Msg::ProgressReceived {
        attempt,
        event: ProgressEvent {
            progress: value,
            items,
        },
    }
}

#[test]
fn progress_is_last_write_wins_in_arrival_order() {
    init_logging();
    let mut state = started();
    for value in [5, 40, 20, 60] {
        let (next, effects) = update(state, progress(1, value, Vec::new()));
        assert!(effects.is_empty());
        assert_eq!(next.view().progress, value);
        state = next;
    }
    assert_eq!(state.view().channel, ChannelState::Receiving(1));
}

#[test]
fn items_are_appended_in_order_and_list_stays_scrolled_to_bottom() {
    init_logging();
    let state = started();
    let (state, _) = update(
        state,
        progress(1, 10, vec![item("A", Some("arXiv")), item("B", None)]),
    );
    let view = state.view();
    assert_eq!(view.discoveries, vec![item("A", Some("arXiv")), item("B", None)]);
    assert_eq!(view.discovery_scroll, 2);

    let (state, _) = update(state, progress(1, 20, Vec::new()));
    assert_eq!(state.view().discoveries.len(), 2);

    let (state, _) = update(state, progress(1, 30, vec![item("C", None)]));
    let view = state.view();
    assert_eq!(
        view.discoveries.iter().map(|d| d.title.as_str()).collect::<Vec<_>>(),
        vec!["A", "B", "C"]
    );
    assert_eq!(view.discovery_scroll, view.discoveries.len());
}

#[test]
fn full_progress_makes_download_available() {
    init_logging();
    let state = started();
    let (state, _) = update(state, progress(1, 99, Vec::new()));
    assert_eq!(state.view().download, DownloadState::Unavailable);
    let (state, _) = update(state, progress(1, 100, Vec::new()));
    assert_eq!(state.view().download, DownloadState::Available);
}

#[test]
fn channel_failure_closes_and_notifies_once() {
    init_logging();
    let state = started();
    let (state, _) = update(state, progress(1, 30, vec![item("A", None)]));
    let (state, effects) = update(
        state,
        Msg::ChannelFailed {
            attempt: 1,
            reason: "connection reset".into(),
        },
    );
    assert!(effects.is_empty());
    // The transport may report the same failure twice.
    let (state, _) = update(
        state,
        Msg::ChannelFailed {
            attempt: 1,
            reason: "connection reset".into(),
        },
    );

    let view = state.view();
    assert_eq!(view.channel, ChannelState::Closed(1));
    assert_eq!(view.notifications.len(), 1);
    assert_eq!(view.notifications[0].kind, NotificationKind::Connection);
    assert_eq!(view.notifications[0].message, CONNECTION_LOST_MESSAGE);
    // Partial state survives.
    assert_eq!(view.progress, 30);
    assert_eq!(view.discoveries.len(), 1);
}

#[test]
fn progress_after_close_is_ignored() {
    init_logging();
    let state = started();
    let (state, _) = update(
        state,
        Msg::ChannelFailed {
            attempt: 1,
            reason: "gone".into(),
        },
    );
    let (state, _) = update(state, progress(1, 80, vec![item("late", None)]));
    let view = state.view();
    assert_eq!(view.progress, 0);
    assert!(view.discoveries.is_empty());
    assert_eq!(view.channel, ChannelState::Closed(1));
}

#[test]
fn clean_end_after_completion_is_silent() {
    init_logging();
    let state = started();
    let (state, _) = update(state, progress(1, 100, Vec::new()));
    let (state, _) = update(state, Msg::ChannelEnded { attempt: 1 });
    let view = state.view();
    assert_eq!(view.channel, ChannelState::Closed(1));
    assert!(view.notifications.is_empty());
}

#[test]
fn early_end_of_stream_counts_as_lost_connection() {
    init_logging();
    let state = started();
    let (state, _) = update(state, progress(1, 50, Vec::new()));
    let (state, _) = update(state, Msg::ChannelEnded { attempt: 1 });
    assert_eq!(state.view().notifications.len(), 1);
}

#[test]
fn reports_for_superseded_attempts_are_discarded() {
    init_logging();
    let state = started();
    let (state, _) = update(state, progress(1, 40, vec![item("old", None)]));
    let (state, effects) = update(state, Msg::FormSubmitted);
    assert!(effects.contains(&Effect::CloseChannel { attempt: 1 }));

    let view = state.view();
    assert_eq!(view.progress, 0);
    assert!(view.discoveries.is_empty());

    let (state, _) = update(state, progress(1, 90, vec![item("stale", None)]));
    let (state, _) = update(
        state,
        Msg::SubmissionSucceeded {
            attempt: 1,
            outcome: SubmissionOutcome {
                summary: Some("Overall Summary:".into()),
                statistics: None,
            },
        },
    );
    let (state, _) = update(
        state,
        Msg::ChannelFailed {
            attempt: 1,
            reason: "closed".into(),
        },
    );

    let view = state.view();
    assert_eq!(view.attempt, Some(2));
    assert_eq!(view.progress, 0);
    assert!(view.discoveries.is_empty());
    assert!(view.results.is_none());
    assert!(view.notifications.is_empty());
    assert_eq!(view.channel, ChannelState::Open(2));
}

#[test]
fn successful_submission_renders_summary_and_statistics() {
    init_logging();
    let state = started();
    let summary = "Overall Summary:\nTotal papers found: 4\n- Other (IEEE): 1 papers\nA | B | C | D";
    let (state, _) = update(
        state,
        Msg::SubmissionSucceeded {
            attempt: 1,
            outcome: SubmissionOutcome {
                summary: Some(summary.to_string()),
                statistics: None,
            },
        },
    );

    let view = state.view();
    let results = view.results.expect("results visible");
    assert_eq!(
        results.blocks,
        vec![
            SummaryBlock::Heading("Overall Summary:".into()),
            SummaryBlock::Text("Total papers found: 4".into()),
            SummaryBlock::Indented("- Other (IEEE): 1 papers".into()),
            SummaryBlock::Row(vec!["A".into(), "B".into(), "C".into(), "D".into()]),
        ]
    );
    assert_eq!(results.statistics.and_then(|s| s.total_papers), Some(4));
    assert_eq!(results.result_filename, "scholar_results.xlsx");
    assert_eq!(view.download, DownloadState::Available);
    // The channel is left to close on its own.
    assert_eq!(view.channel, ChannelState::Open(1));
}

#[test]
fn structured_statistics_without_text_still_render() {
    init_logging();
    let statistics = JobStatistics {
        total_papers: Some(2),
        ..JobStatistics::default()
    };
    let (state, _) = update(
        started(),
        Msg::SubmissionSucceeded {
            attempt: 1,
            outcome: SubmissionOutcome {
                summary: None,
                statistics: Some(statistics.clone()),
            },
        },
    );
    let results = state.view().results.expect("results visible");
    assert!(results
        .blocks
        .contains(&SummaryBlock::Text("Total papers found: 2".into())));
    assert_eq!(results.statistics, Some(statistics));
}

#[test]
fn success_without_summary_keeps_results_hidden() {
    init_logging();
    let (state, _) = update(
        started(),
        Msg::SubmissionSucceeded {
            attempt: 1,
            outcome: SubmissionOutcome::default(),
        },
    );
    assert!(state.view().results.is_none());
}

#[test]
fn failed_submission_notifies_generically_and_leaves_channel_open() {
    init_logging();
    let (state, effects) = update(
        started(),
        Msg::SubmissionFailed {
            attempt: 1,
            reason: "http status 500".into(),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.notifications.len(), 1);
    assert_eq!(view.notifications[0].message, SUBMISSION_FAILED_MESSAGE);
    assert_eq!(view.channel, ChannelState::Open(1));
    assert!(view.results.is_none());
}

#[test]
fn download_waits_for_completion_and_failures_stay_silent() {
    init_logging();
    let state = started();
    let (state, effects) = update(state, Msg::DownloadClicked);
    assert!(effects.is_empty());

    let (state, _) = update(state, progress(1, 100, Vec::new()));
    let (state, effects) = update(state, Msg::DownloadClicked);
    assert_eq!(effects, vec![Effect::Download { attempt: 1 }]);
    assert_eq!(state.view().download, DownloadState::InFlight);

    // A second click while in flight does nothing.
    let (state, effects) = update(state, Msg::DownloadClicked);
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::DownloadFailed {
            attempt: 1,
            reason: "http status 404".into(),
        },
    );
    let view = state.view();
    assert!(view.notifications.is_empty());
    assert_eq!(view.last_download_error.as_deref(), Some("http status 404"));
    assert_eq!(view.download, DownloadState::Available);

    let (state, effects) = update(state, Msg::DownloadClicked);
    assert_eq!(effects, vec![Effect::Download { attempt: 1 }]);
    let (state, _) = update(
        state,
        Msg::DownloadFinished {
            attempt: 1,
            path: PathBuf::from("out/scholar_results.xlsx"),
        },
    );
    let view = state.view();
    assert_eq!(
        view.download,
        DownloadState::Saved(PathBuf::from("out/scholar_results.xlsx"))
    );
    assert!(view.last_download_error.is_none());
    assert!(view.download_available());
}

#[test]
fn download_of_a_superseded_attempt_does_not_unlock_the_new_one() {
    init_logging();
    let (state, _) = update(started(), progress(1, 100, Vec::new()));
    let (state, effects) = update(state, Msg::DownloadClicked);
    assert_eq!(effects, vec![Effect::Download { attempt: 1 }]);

    let (state, _) = update(state, Msg::FormSubmitted);
    assert_eq!(state.current_attempt(), Some(2));
    assert_eq!(state.view().download, DownloadState::Unavailable);

    let (state, effects) = update(
        state,
        Msg::DownloadFinished {
            attempt: 1,
            path: PathBuf::from("scholar_results.xlsx"),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.download, DownloadState::Unavailable);
    assert_eq!(view.progress, 0);
    assert!(!view.download_available());

    let (state, _) = update(
        state,
        Msg::DownloadFailed {
            attempt: 1,
            reason: "connection reset".into(),
        },
    );
    assert!(state.view().last_download_error.is_none());

    // Clicking still does nothing until the new attempt completes.
    let (_, effects) = update(state, Msg::DownloadClicked);
    assert!(effects.is_empty());
}
