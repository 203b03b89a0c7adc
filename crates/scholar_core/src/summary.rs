//! Turns the plain-text job summary into display blocks.

/// Line prefixes that start a section of the summary.
pub const HEADING_PREFIXES: [&str; 3] = [
    "Overall Summary:",
    "Breakdown by Source:",
    "Unique Sources in",
];

/// Number of columns table rows are laid out in.
pub const GRID_COLUMNS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryBlock {
    Heading(String),
    Indented(String),
    Gap,
    /// Cells of a `|`-separated line, trimmed. The cell count is not
    /// normalised here; layout onto [`GRID_COLUMNS`] happens at render time.
    Row(Vec<String>),
    Text(String),
}

/// Formats summary text line by line. The first matching rule wins:
/// heading prefix, leading `-`, blank line, `|` separator, plain text.
pub fn format_statistics(text: &str) -> Vec<SummaryBlock> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(format_line)
        .collect()
}

fn format_line(line: &str) -> SummaryBlock {
    if HEADING_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
    {
        SummaryBlock::Heading(line.to_string())
    } else if line.starts_with('-') {
        SummaryBlock::Indented(line.to_string())
    } else if line.trim().is_empty() {
        SummaryBlock::Gap
    } else if line.contains('|') {
        SummaryBlock::Row(line.split('|').map(|cell| cell.trim().to_string()).collect())
    } else {
        SummaryBlock::Text(line.to_string())
    }
}
