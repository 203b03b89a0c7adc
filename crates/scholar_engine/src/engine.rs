use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use scholar_core::{AttemptId, JobRequest};
use scholar_logging::{scholar_debug, scholar_info};
use tokio_util::sync::CancellationToken;

use crate::{
    ClientSettings, EngineEvent, EventSink, ProgressChannel, ReqwestApi, RequestError,
    ScholarApi,
};

enum EngineCommand {
    OpenChannel { attempt: AttemptId },
    CloseChannel { attempt: AttemptId },
    Submit {
        attempt: AttemptId,
        request: JobRequest,
    },
    CancelSubmission { attempt: AttemptId },
    Download { attempt: AttemptId },
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to set up http client: {0}")]
    Client(#[from] RequestError),
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Handle to the IO engine running on its own thread.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let api = Arc::new(ReqwestApi::new(&settings)?);
        let channel = ProgressChannel::new(&settings)?;
        let runtime = tokio::runtime::Runtime::new()?;

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));

        thread::spawn(move || {
            let mut worker = Worker {
                api,
                channel,
                sink,
                submission: None,
            };
            let _guard = runtime.enter();
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(&runtime, command);
            }
            scholar_debug!("Engine command channel closed; shutting down");
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn open_channel(&self, attempt: AttemptId) {
        self.send(EngineCommand::OpenChannel { attempt });
    }

    pub fn close_channel(&self, attempt: AttemptId) {
        self.send(EngineCommand::CloseChannel { attempt });
    }

    pub fn submit(&self, attempt: AttemptId, request: JobRequest) {
        self.send(EngineCommand::Submit { attempt, request });
    }

    pub fn cancel_submission(&self, attempt: AttemptId) {
        self.send(EngineCommand::CancelSubmission { attempt });
    }

    pub fn download(&self, attempt: AttemptId) {
        self.send(EngineCommand::Download { attempt });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

struct Worker {
    api: Arc<ReqwestApi>,
    channel: ProgressChannel,
    sink: Arc<dyn EventSink>,
    submission: Option<(AttemptId, CancellationToken)>,
}

impl Worker {
    fn handle(&mut self, runtime: &tokio::runtime::Runtime, command: EngineCommand) {
        match command {
            EngineCommand::OpenChannel { attempt } => {
                self.channel.open(attempt, self.sink.clone());
            }
            EngineCommand::CloseChannel { attempt } => {
                self.channel.close(attempt);
            }
            EngineCommand::Submit { attempt, request } => {
                let cancel = CancellationToken::new();
                if let Some((previous, token)) = self.submission.replace((attempt, cancel.clone()))
                {
                    // Normally cancelled already; a finished request makes this a no-op.
                    scholar_debug!("Replacing submission of attempt {}", previous);
                    token.cancel();
                }
                let api = self.api.clone();
                let sink = self.sink.clone();
                runtime.spawn(async move {
                    scholar_info!("Submitting attempt {}", attempt);
                    let result = api.submit(&request, cancel).await;
                    sink.emit(EngineEvent::SubmissionCompleted { attempt, result });
                });
            }
            EngineCommand::CancelSubmission { attempt } => {
                if let Some((current, token)) = &self.submission {
                    if *current == attempt {
                        scholar_info!("Cancelling submission of attempt {}", attempt);
                        token.cancel();
                        self.submission = None;
                    }
                }
            }
            EngineCommand::Download { attempt } => {
                let api = self.api.clone();
                let sink = self.sink.clone();
                runtime.spawn(async move {
                    scholar_info!("Downloading result of attempt {}", attempt);
                    let result = api.download().await;
                    sink.emit(EngineEvent::DownloadCompleted { attempt, result });
                });
            }
        }
    }
}
