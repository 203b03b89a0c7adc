pub mod render;
pub mod terminal;

/// Drawing instructions produced by [`render::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCommand {
    ShowProgress,
    SetProgress(u8),
    FinishProgress,
    /// Status text next to the progress bar; empty clears it.
    SetStatus(String),
    Println(String),
    /// A user-visible error line.
    Notify(String),
}
