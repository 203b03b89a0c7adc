//! Structured view of the job summary text produced by the scraping server.

use scholar_logging::scholar_debug;
use serde::{Deserialize, Serialize};

const OVERALL_HEADING: &str = "Overall Summary:";
const BREAKDOWN_HEADING: &str = "Breakdown by Source:";
const OTHER_HEADING: &str = "Unique Sources in 'Other' Category:";
const TABLE_HEADER: &str = "Source  Papers with Abstract  Total Papers  Success Rate (%)";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobStatistics {
    pub total_papers: Option<u64>,
    pub papers_with_abstracts: Option<u64>,
    pub abstract_success_rate: Option<f64>,
    pub source_stats: Vec<SourceStats>,
    pub other_sources: Vec<OtherSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStats {
    pub source: String,
    pub papers_with_abstract: u64,
    pub total_papers: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherSource {
    pub name: String,
    pub count: u64,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Overall,
    Breakdown,
    Other,
}

impl JobStatistics {
    /// Parses the summary text. Lines that do not fit the expected shape are skipped.
    pub fn parse(text: &str) -> Self {
        let mut stats = Self::default();
        let mut section = Section::Overall;

        for line in text.lines() {
            if line.contains(BREAKDOWN_HEADING) {
                section = Section::Breakdown;
                continue;
            }
            if line.contains(OTHER_HEADING) {
                section = Section::Other;
                continue;
            }

            if let Some(value) = value_after(line, "Total papers found:") {
                stats.total_papers = value.parse().ok();
            } else if let Some(value) = value_after(line, "Total papers with abstracts:") {
                stats.papers_with_abstracts = value.parse().ok();
            } else if let Some(value) = value_after(line, "Overall abstract success rate:") {
                stats.abstract_success_rate = value.trim_end_matches('%').parse().ok();
            }

            match section {
                Section::Overall => {}
                Section::Breakdown => {
                    if !line.trim().is_empty() && !line.trim_start().starts_with("Source") {
                        match parse_source_row(line) {
                            Some(row) => stats.source_stats.push(row),
                            None => scholar_debug!("Skipping source row {:?}", line),
                        }
                    }
                }
                Section::Other => {
                    if let Some(rest) = line.strip_prefix("- ") {
                        if let Some(other) = parse_other_source(rest) {
                            stats.other_sources.push(other);
                        }
                    }
                }
            }
        }

        stats
    }

    /// True when nothing could be extracted.
    pub fn is_empty(&self) -> bool {
        self.total_papers.is_none()
            && self.papers_with_abstracts.is_none()
            && self.abstract_success_rate.is_none()
            && self.source_stats.is_empty()
            && self.other_sources.is_empty()
    }

    /// Renders the statistics in the server's plain-text summary layout.
    pub fn to_summary_text(&self) -> String {
        let mut out = vec![String::new(), OVERALL_HEADING.to_string()];
        if let Some(total) = self.total_papers {
            out.push(format!("Total papers found: {total}"));
        }
        if let Some(with_abstracts) = self.papers_with_abstracts {
            out.push(format!("Total papers with abstracts: {with_abstracts}"));
        }
        if let Some(rate) = self.abstract_success_rate {
            out.push(format!("Overall abstract success rate: {rate:.1}%"));
        }

        out.push(String::new());
        out.push(BREAKDOWN_HEADING.to_string());
        out.push(TABLE_HEADER.to_string());
        for row in &self.source_stats {
            out.push(format!(
                "{}  {}  {}  {:.1}",
                row.source, row.papers_with_abstract, row.total_papers, row.success_rate
            ));
        }

        out.push(String::new());
        out.push(OTHER_HEADING.to_string());
        for other in &self.other_sources {
            out.push(format!("- {}: {} papers", other.name, other.count));
        }

        out.join("\n")
    }
}

fn value_after<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let idx = line.find(label)?;
    Some(line[idx + label.len()..].trim())
}

fn parse_source_row(line: &str) -> Option<SourceStats> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return None;
    }
    let n = parts.len();
    Some(SourceStats {
        source: parts[..n - 3].join(" "),
        papers_with_abstract: parts[n - 3].parse().ok()?,
        total_papers: parts[n - 2].parse().ok()?,
        success_rate: parts[n - 1].parse().ok()?,
    })
}

fn parse_other_source(rest: &str) -> Option<OtherSource> {
    let (name, tail) = rest.rsplit_once(": ")?;
    let count = tail.split_whitespace().next()?.parse().ok()?;
    Some(OtherSource {
        name: name.to_string(),
        count,
    })
}
