//! Per-entry outcomes of one sync run.

use serde::Serialize;

use crate::error::SyncError;

#[derive(Debug)]
pub enum EntryOutcome {
    /// A local file already existed; its content was not compared.
    Skipped,
    Downloaded { bytes: u64 },
    Failed(SyncError),
}

#[derive(Debug)]
pub struct EntryReport {
    pub entry: String,
    pub outcome: EntryOutcome,
}

/// Result of a sync: one record per manifest entry, in manifest order.
#[derive(Debug, Default)]
pub struct SyncReport {
    entries: Vec<EntryReport>,
}

impl SyncReport {
    pub(crate) fn record(&mut self, entry: &str, outcome: EntryOutcome) {
        self.entries.push(EntryReport {
            entry: entry.to_string(),
            outcome,
        });
    }

    pub fn entries(&self) -> &[EntryReport] {
        &self.entries
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Skipped))
    }

    pub fn downloaded(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Downloaded { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Failed(_)))
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| match e.outcome {
                EntryOutcome::Downloaded { bytes } => bytes,
                _ => 0,
            })
            .sum()
    }

    /// Failing entries with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &SyncError)> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            EntryOutcome::Failed(err) => Some((e.entry.as_str(), err)),
            _ => None,
        })
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total: self.entries.len(),
            skipped: self.skipped(),
            downloaded: self.downloaded(),
            failed: self.failed(),
            bytes_downloaded: self.bytes_downloaded(),
            failures: self
                .failures()
                .map(|(entry, err)| FailureSummary {
                    entry: entry.to_string(),
                    error: err.to_string(),
                })
                .collect(),
        }
    }
}

/// Serializable view of a `SyncReport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub skipped: usize,
    pub downloaded: usize,
    pub failed: usize,
    pub bytes_downloaded: u64,
    pub failures: Vec<FailureSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureSummary {
    pub entry: String,
    pub error: String,
}

impl ReportSummary {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
