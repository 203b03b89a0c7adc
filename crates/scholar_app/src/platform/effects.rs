use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use scholar_core::{Effect, Msg};
use scholar_engine::{ClientSettings, EngineError, EngineEvent, EngineHandle};
use scholar_logging::{scholar_debug, scholar_info};

use super::app::AppEvent;

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: ClientSettings, tx: mpsc::Sender<AppEvent>) -> Result<Self, EngineError> {
        let engine = EngineHandle::new(settings)?;
        let runner = Self { engine };
        runner.spawn_event_loop(tx);
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenChannel { attempt } => {
                    scholar_debug!("OpenChannel attempt={}", attempt);
                    self.engine.open_channel(attempt);
                }
                Effect::CloseChannel { attempt } => {
                    scholar_debug!("CloseChannel attempt={}", attempt);
                    self.engine.close_channel(attempt);
                }
                Effect::SubmitJob { attempt, request } => {
                    scholar_info!(
                        "SubmitJob attempt={} query_len={} pages={}",
                        attempt,
                        request.query.len(),
                        request.page_count
                    );
                    self.engine.submit(attempt, request);
                }
                Effect::CancelSubmission { attempt } => {
                    scholar_debug!("CancelSubmission attempt={}", attempt);
                    self.engine.cancel_submission(attempt);
                }
                Effect::Download { attempt } => {
                    scholar_info!("Download requested for attempt {}", attempt);
                    self.engine.download(attempt);
                }
            }
        }
    }

    fn spawn_event_loop(&self, tx: mpsc::Sender<AppEvent>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if tx.send(AppEvent::Msg(map_event(event))).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress { attempt, event } => Msg::ProgressReceived { attempt, event },
        EngineEvent::ChannelClosed {
            attempt,
            error: None,
        } => Msg::ChannelEnded { attempt },
        EngineEvent::ChannelClosed {
            attempt,
            error: Some(err),
        } => Msg::ChannelFailed {
            attempt,
            reason: err.to_string(),
        },
        EngineEvent::SubmissionCompleted { attempt, result } => match result {
            Ok(outcome) => Msg::SubmissionSucceeded { attempt, outcome },
            Err(err) => Msg::SubmissionFailed {
                attempt,
                reason: err.to_string(),
            },
        },
        EngineEvent::DownloadCompleted { attempt, result } => match result {
            Ok(path) => Msg::DownloadFinished { attempt, path },
            Err(err) => Msg::DownloadFailed {
                attempt,
                reason: err.to_string(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_core::ProgressEvent;
    use scholar_engine::{ChannelError, FailureKind, RequestError};
    use std::path::PathBuf;

    #[test]
    fn channel_close_maps_to_end_or_failure() {
        assert_eq!(
            map_event(EngineEvent::ChannelClosed {
                attempt: 2,
                error: None
            }),
            Msg::ChannelEnded { attempt: 2 }
        );
        assert_eq!(
            map_event(EngineEvent::ChannelClosed {
                attempt: 2,
                error: Some(ChannelError::HttpStatus(502)),
            }),
            Msg::ChannelFailed {
                attempt: 2,
                reason: "progress stream returned http status 502".into(),
            }
        );
    }

    #[test]
    fn download_reports_keep_their_attempt() {
        assert_eq!(
            map_event(EngineEvent::DownloadCompleted {
                attempt: 4,
                result: Ok(PathBuf::from("scholar_results.xlsx")),
            }),
            Msg::DownloadFinished {
                attempt: 4,
                path: PathBuf::from("scholar_results.xlsx"),
            }
        );
        assert!(matches!(
            map_event(EngineEvent::DownloadCompleted {
                attempt: 4,
                result: Err(RequestError::new(FailureKind::HttpStatus(404), "404 Not Found")),
            }),
            Msg::DownloadFailed { attempt: 4, .. }
        ));
    }

    #[test]
    fn progress_passes_through() {
        let event = ProgressEvent {
            progress: 12,
            items: Vec::new(),
        };
        assert_eq!(
            map_event(EngineEvent::Progress {
                attempt: 1,
                event: event.clone()
            }),
            Msg::ProgressReceived { attempt: 1, event }
        );
    }
}
