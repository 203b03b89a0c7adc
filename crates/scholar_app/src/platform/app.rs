use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::Parser;
use scholar_core::{update, AppState, DownloadState, Msg, SubmissionState};
use scholar_logging::{scholar_debug, scholar_info};

use super::cli::Cli;
use super::config::{load_config, resolve_settings};
use super::effects::EffectRunner;
use super::ui::render::{render, RenderCursor};
use super::ui::terminal::Terminal;

const LOG_FILENAME: &str = "scholar.log";
const TICK_INTERVAL: Duration = Duration::from_millis(75);
const DOWNLOAD_COMMAND: &str = "download";

/// Everything that feeds the dispatch loop.
pub enum AppEvent {
    Msg(Msg),
    /// Stdin reached end of file.
    InputClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    scholar_logging::initialize(cli.log.into(), cli.log_level, Path::new(LOG_FILENAME));

    let file_config = load_config(cli.config.as_deref())?;
    let settings = resolve_settings(&cli, file_config)?;
    scholar_info!("Using server {}", settings.base_url);

    let (tx, rx) = mpsc::channel::<AppEvent>();
    let state = AppState::new().with_result_filename(settings.download_filename.clone());
    let runner = EffectRunner::new(settings, tx.clone()).context("starting network engine")?;
    let mut session = Session::new(state, runner)?;

    spawn_ticker(tx.clone());

    if cli.is_one_shot() {
        session.run_one_shot(&cli, &rx)
    } else {
        spawn_stdin_reader(tx);
        session.run_interactive(&rx);
        Ok(())
    }
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    terminal: Terminal,
    cursor: RenderCursor,
}

impl Session {
    fn new(state: AppState, runner: EffectRunner) -> anyhow::Result<Self> {
        Ok(Self {
            state,
            runner,
            terminal: Terminal::new()?,
            cursor: RenderCursor::default(),
        })
    }

    fn dispatch_msg(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.enqueue(effects);
        if state.consume_dirty() {
            let view = state.view();
            self.terminal.apply(render(&view, &mut self.cursor));
        }
        self.state = state;
    }

    fn run_one_shot(&mut self, cli: &Cli, rx: &mpsc::Receiver<AppEvent>) -> anyhow::Result<()> {
        self.dispatch_msg(Msg::QueryChanged(cli.query.clone().unwrap_or_default()));
        self.dispatch_msg(Msg::PagesChanged(cli.pages.clone().unwrap_or_default()));
        self.dispatch_msg(Msg::FormSubmitted);

        if self.state.current_attempt().is_none() {
            self.terminal.finish();
            bail!("search was not submitted");
        }

        let mut download_requested = false;
        while !self.one_shot_finished(cli.download, download_requested) {
            if cli.download && !download_requested && self.submission_succeeded() {
                self.dispatch_msg(Msg::DownloadClicked);
                download_requested = true;
                continue;
            }
            match rx.recv() {
                Ok(AppEvent::Msg(msg)) => self.dispatch_msg(msg),
                Ok(AppEvent::InputClosed) => {}
                Err(_) => break,
            }
        }
        self.terminal.finish();

        if matches!(self.state.submission(), SubmissionState::Failed(_)) {
            bail!("search failed");
        }
        if let DownloadState::Available = self.state.download() {
            if download_requested {
                bail!("result file could not be downloaded");
            }
        }
        Ok(())
    }

    fn run_interactive(&mut self, rx: &mpsc::Receiver<AppEvent>) {
        let mut input_closed = false;
        while !(input_closed && !self.work_in_flight()) {
            match rx.recv() {
                Ok(AppEvent::Msg(msg)) => self.dispatch_msg(msg),
                Ok(AppEvent::InputClosed) => {
                    scholar_debug!("Input closed");
                    input_closed = true;
                }
                Err(_) => break,
            }
        }
        self.terminal.finish();
    }

    /// A progress channel left open by the server does not keep the session alive.
    fn work_in_flight(&self) -> bool {
        matches!(self.state.submission(), SubmissionState::InFlight(_))
            || *self.state.download() == DownloadState::InFlight
    }

    fn submission_succeeded(&self) -> bool {
        matches!(self.state.submission(), SubmissionState::Succeeded(_))
    }

    /// The job is settled once its request resolved; a requested download
    /// must also have resolved.
    fn one_shot_finished(&self, want_download: bool, download_requested: bool) -> bool {
        match self.state.submission() {
            SubmissionState::Failed(_) => true,
            SubmissionState::Succeeded(_) => {
                !want_download
                    || (download_requested && *self.state.download() != DownloadState::InFlight)
            }
            SubmissionState::Idle | SubmissionState::InFlight(_) => false,
        }
    }
}

fn spawn_ticker(tx: mpsc::Sender<AppEvent>) {
    let start = Instant::now();
    thread::spawn(move || loop {
        thread::sleep(TICK_INTERVAL);
        let now = start.elapsed();
        if tx.send(AppEvent::Msg(Msg::Tick { now })).is_err() {
            break;
        }
    });
}

/// Reads the form from stdin: a query line, then a page-count line.
fn spawn_stdin_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let mut lines = io::stdin().lock().lines();
        loop {
            let Some(Ok(query)) = lines.next() else { break };
            let msgs = if query.trim() == DOWNLOAD_COMMAND {
                vec![Msg::DownloadClicked]
            } else {
                let Some(Ok(pages)) = lines.next() else { break };
                vec![
                    Msg::QueryChanged(query),
                    Msg::PagesChanged(pages),
                    Msg::FormSubmitted,
                ]
            };
            for msg in msgs {
                if tx.send(AppEvent::Msg(msg)).is_err() {
                    return;
                }
            }
        }
        let _ = tx.send(AppEvent::InputClosed);
    });
}
