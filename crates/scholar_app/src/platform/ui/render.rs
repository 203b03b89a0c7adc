use scholar_core::{
    AppViewModel, AttemptId, DownloadState, ResultsView, SummaryBlock, GRID_COLUMNS,
};

use super::TerminalCommand;

const CELL_WIDTH: usize = 22;

/// What has already been drawn, so each render only emits the difference.
#[derive(Debug, Default)]
pub struct RenderCursor {
    attempt: Option<AttemptId>,
    progress_visible: bool,
    progress: Option<u8>,
    discoveries: usize,
    last_notification: u64,
    status: String,
    results_shown: bool,
    download: DownloadState,
}

pub fn render(view: &AppViewModel, cursor: &mut RenderCursor) -> Vec<TerminalCommand> {
    let mut cmds = Vec::new();

    if view.attempt != cursor.attempt {
        if cursor.progress_visible {
            cmds.push(TerminalCommand::FinishProgress);
        }
        let last_notification = cursor.last_notification;
        *cursor = RenderCursor {
            attempt: view.attempt,
            last_notification,
            ..RenderCursor::default()
        };
        if let Some(attempt) = view.attempt {
            cmds.push(TerminalCommand::Println(format!("Search #{attempt} started")));
        }
    }

    if view.progress_visible && !cursor.progress_visible {
        cmds.push(TerminalCommand::ShowProgress);
        cursor.progress_visible = true;
    }
    if cursor.progress_visible && cursor.progress != Some(view.progress) {
        cmds.push(TerminalCommand::SetProgress(view.progress));
        cursor.progress = Some(view.progress);
    }

    for (index, item) in view
        .discoveries
        .iter()
        .enumerate()
        .skip(cursor.discoveries)
    {
        cmds.push(TerminalCommand::Println(format!(
            "{:>4}. {}",
            index + 1,
            item.title
        )));
        if let Some(source) = &item.source {
            cmds.push(TerminalCommand::Println(format!("      Source: {source}")));
        }
    }
    cursor.discoveries = view.discoveries.len();

    for notification in view.notifications.iter() {
        if notification.id <= cursor.last_notification {
            continue;
        }
        cmds.push(TerminalCommand::Notify(notification.message.clone()));
        cursor.last_notification = notification.id;
    }

    let status = view
        .notifications
        .last()
        .map(|n| n.message.clone())
        .unwrap_or_default();
    if status != cursor.status {
        cmds.push(TerminalCommand::SetStatus(status.clone()));
        cursor.status = status;
    }

    if let Some(results) = &view.results {
        if !cursor.results_shown {
            cmds.extend(render_results(results).into_iter().map(TerminalCommand::Println));
            cursor.results_shown = true;
        }
    }

    if view.download != cursor.download {
        match &view.download {
            DownloadState::Available if cursor.download == DownloadState::Unavailable => {
                cmds.push(TerminalCommand::Println(
                    "Result file is ready for download".to_string(),
                ));
            }
            DownloadState::InFlight => {
                cmds.push(TerminalCommand::Println("Downloading result file...".to_string()));
            }
            DownloadState::Saved(path) => {
                cmds.push(TerminalCommand::Println(format!(
                    "Saved result file to {}",
                    path.display()
                )));
            }
            DownloadState::Unavailable | DownloadState::Available => {}
        }
        cursor.download = view.download.clone();
    }

    cmds
}

fn render_results(results: &ResultsView) -> Vec<String> {
    let mut lines = vec![String::new(), "Scraping Summary".to_string()];
    lines.extend(results.blocks.iter().flat_map(render_block));
    let papers = results
        .statistics
        .as_ref()
        .and_then(|s| s.total_papers)
        .map(|total| format!(" ({total} papers)"))
        .unwrap_or_default();
    lines.push(format!(
        "Results saved to {}{}",
        results.result_filename, papers
    ));
    lines
}

fn render_block(block: &SummaryBlock) -> Vec<String> {
    match block {
        SummaryBlock::Heading(text) => vec![format!("== {text}")],
        SummaryBlock::Indented(text) => vec![format!("    {text}")],
        SummaryBlock::Gap => vec![String::new()],
        SummaryBlock::Row(cells) => grid_lines(cells),
        SummaryBlock::Text(text) => vec![text.clone()],
    }
}

/// Lays cells onto the fixed grid: short rows are padded, long rows wrap.
fn grid_lines(cells: &[String]) -> Vec<String> {
    if cells.is_empty() {
        return vec![String::new()];
    }
    cells
        .chunks(GRID_COLUMNS)
        .map(|chunk| {
            let mut line = String::new();
            for column in 0..GRID_COLUMNS {
                let cell = chunk.get(column).map(String::as_str).unwrap_or("");
                line.push_str(&format!("{cell:<CELL_WIDTH$}"));
            }
            line.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scholar_core::{
        DiscoveredItem, JobStatistics, Notification, NotificationKind, NOTIFICATION_TTL,
    };
    use std::path::PathBuf;

    fn running_view() -> AppViewModel {
        AppViewModel {
            attempt: Some(1),
            progress_visible: true,
            ..AppViewModel::default()
        }
    }

    #[test]
    fn new_attempt_shows_progress_once() {
        let mut cursor = RenderCursor::default();
        let cmds = render(&running_view(), &mut cursor);
        assert_eq!(
            cmds,
            vec![
                TerminalCommand::Println("Search #1 started".into()),
                TerminalCommand::ShowProgress,
                TerminalCommand::SetProgress(0),
            ]
        );
        assert!(render(&running_view(), &mut cursor).is_empty());
    }

    #[test]
    fn only_new_discoveries_are_printed() {
        let mut cursor = RenderCursor::default();
        let mut view = running_view();
        view.progress = 10;
        view.discoveries = vec![DiscoveredItem {
            title: "Attention".into(),
            source: Some("arXiv".into()),
        }];
        render(&view, &mut cursor);

        view.progress = 20;
        view.discoveries.push(DiscoveredItem {
            title: "BERT".into(),
            source: None,
        });
        assert_eq!(
            render(&view, &mut cursor),
            vec![
                TerminalCommand::SetProgress(20),
                TerminalCommand::Println("   2. BERT".into()),
            ]
        );
    }

    #[test]
    fn notifications_print_once_and_clear_status_on_expiry() {
        let mut cursor = RenderCursor::default();
        let mut view = AppViewModel::default();
        view.notifications = vec![Notification {
            id: 1,
            kind: NotificationKind::Validation,
            message: "Please enter a search query".into(),
            expires_at: NOTIFICATION_TTL,
        }];
        assert_eq!(
            render(&view, &mut cursor),
            vec![
                TerminalCommand::Notify("Please enter a search query".into()),
                TerminalCommand::SetStatus("Please enter a search query".into()),
            ]
        );

        view.notifications.clear();
        assert_eq!(
            render(&view, &mut cursor),
            vec![TerminalCommand::SetStatus(String::new())]
        );
    }

    #[test]
    fn results_render_headings_and_grid() {
        let mut cursor = RenderCursor::default();
        let mut view = running_view();
        render(&view, &mut cursor);

        view.results = Some(ResultsView {
            blocks: vec![
                SummaryBlock::Heading("Overall Summary:".into()),
                SummaryBlock::Indented("- 5 results".into()),
                SummaryBlock::Row(vec!["a".into(), "b".into()]),
            ],
            statistics: Some(JobStatistics {
                total_papers: Some(5),
                ..JobStatistics::default()
            }),
            result_filename: "scholar_results.xlsx".into(),
        });
        let lines: Vec<TerminalCommand> = render(&view, &mut cursor);
        let expected_row = format!("{:<22}b", "a");
        assert_eq!(
            lines,
            vec![
                TerminalCommand::Println(String::new()),
                TerminalCommand::Println("Scraping Summary".into()),
                TerminalCommand::Println("== Overall Summary:".into()),
                TerminalCommand::Println("    - 5 results".into()),
                TerminalCommand::Println(expected_row),
                TerminalCommand::Println("Results saved to scholar_results.xlsx (5 papers)".into()),
            ]
        );
    }

    #[test]
    fn wide_rows_wrap_onto_the_grid() {
        let cells: Vec<String> = ["1", "2", "3", "4", "5"].iter().map(|s| s.to_string()).collect();
        let lines = grid_lines(&cells);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "5");
    }

    #[test]
    fn download_transitions_are_announced() {
        let mut cursor = RenderCursor::default();
        let mut view = running_view();
        render(&view, &mut cursor);

        view.download = DownloadState::Available;
        assert_eq!(
            render(&view, &mut cursor),
            vec![TerminalCommand::Println(
                "Result file is ready for download".into()
            )]
        );

        view.download = DownloadState::Saved(PathBuf::from("scholar_results.xlsx"));
        assert_eq!(
            render(&view, &mut cursor),
            vec![TerminalCommand::Println(
                "Saved result file to scholar_results.xlsx".into()
            )]
        );
    }

    #[test]
    fn next_attempt_finishes_previous_bar() {
        let mut cursor = RenderCursor::default();
        render(&running_view(), &mut cursor);
        let mut view = running_view();
        view.attempt = Some(2);
        let cmds = render(&view, &mut cursor);
        assert_eq!(cmds[0], TerminalCommand::FinishProgress);
        assert_eq!(cmds[1], TerminalCommand::Println("Search #2 started".into()));
    }
}
