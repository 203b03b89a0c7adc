use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use scholar_core::PROGRESS_MAX;

use super::TerminalCommand;

/// Applies [`TerminalCommand`]s to stdout, keeping the progress bar below printed lines.
pub struct Terminal {
    style: ProgressStyle,
    bar: Option<ProgressBar>,
}

impl Terminal {
    pub fn new() -> anyhow::Result<Self> {
        let style =
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {wide_msg}")?
                .progress_chars("=> ");
        Ok(Self { style, bar: None })
    }

    pub fn apply(&mut self, commands: Vec<TerminalCommand>) {
        for command in commands {
            match command {
                TerminalCommand::ShowProgress => {
                    self.finish();
                    let bar = ProgressBar::new(u64::from(PROGRESS_MAX));
                    bar.set_style(self.style.clone());
                    self.bar = Some(bar);
                }
                TerminalCommand::SetProgress(position) => {
                    if let Some(bar) = &self.bar {
                        bar.set_position(u64::from(position));
                    }
                }
                TerminalCommand::FinishProgress => self.finish(),
                TerminalCommand::SetStatus(status) => {
                    if let Some(bar) = &self.bar {
                        bar.set_message(status);
                    }
                }
                TerminalCommand::Println(line) => self.println(line),
                TerminalCommand::Notify(message) => {
                    let stamp = Local::now().format("%H:%M:%S");
                    self.println(format!("[{stamp}] error: {message}"));
                }
            }
        }
    }

    /// Leaves the current bar drawn at its last position.
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }

    fn println(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }
}
