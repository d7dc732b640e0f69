//! Run reports. Every report serializes to JSON and prints a text summary.

use bids_types::SubjectId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

const RULE: &str = "==================================================";

/// Wall-clock bounds of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunWindow {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunWindow {
    pub(crate) fn start() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of deleting legacy-named copies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanupReport {
    pub window: RunWindow,
    pub dry_run: bool,
    pub patterns: Vec<String>,
    pub matched: Vec<PathBuf>,
    pub deleted: usize,
    pub failures: Vec<FileFailure>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for CleanupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Cleanup summary{}:", dry_run_tag(self.dry_run))?;
        writeln!(f, "  Files matched: {}", self.matched.len())?;
        writeln!(f, "  Successfully deleted: {} files", self.deleted)?;
        writeln!(f, "  Errors: {} files", self.failures.len())?;
        for failure in &self.failures {
            writeln!(f, "    {}: {}", failure.path.display(), failure.message)?;
        }
        Ok(())
    }
}

/// Why a subject was passed over without counting as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingEegDir,
    MissingMarker,
    MissingData,
    MissingHeader,
    Unmapped,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingEegDir => "no 'eeg' subdirectory",
            SkipReason::MissingMarker => "no source vmrk file",
            SkipReason::MissingData => "no source eeg file",
            SkipReason::MissingHeader => "no source vhdr file",
            SkipReason::Unmapped => "subject outside every naming segment",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectSkip {
    pub subject: SubjectId,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectFailure {
    pub subject: SubjectId,
    pub message: String,
}

/// A legacy-named file written (or planned, in a dry run) for a subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedFile {
    pub subject: SubjectId,
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Outcome of recreating legacy-named copies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecreateReport {
    pub window: RunWindow,
    pub dry_run: bool,
    pub cancelled: bool,
    pub subjects_found: usize,
    pub markers_created: usize,
    pub data_created: usize,
    pub created: Vec<CreatedFile>,
    pub skipped: Vec<SubjectSkip>,
    pub failures: Vec<SubjectFailure>,
}

impl RecreateReport {
    pub(crate) fn new(dry_run: bool) -> Self {
        Self {
            window: RunWindow::start(),
            dry_run,
            cancelled: false,
            subjects_found: 0,
            markers_created: 0,
            data_created: 0,
            created: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

impl fmt::Display for RecreateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Summary{}:", dry_run_tag(self.dry_run))?;
        writeln!(f, "  Successfully created vmrk files: {}", self.markers_created)?;
        writeln!(f, "  Successfully created eeg files: {}", self.data_created)?;
        writeln!(f, "  Skipped subjects: {}", self.skipped.len())?;
        writeln!(f, "  Errors: {}", self.failures.len())?;
        writeln!(f, "  Total subjects processed: {}", self.subjects_found)?;
        for skip in &self.skipped {
            writeln!(f, "    skipped {}: {}", skip.subject, skip.reason)?;
        }
        for failure in &self.failures {
            writeln!(f, "    failed {}: {}", failure.subject, failure.message)?;
        }
        if self.cancelled {
            writeln!(f, "\nRun was cancelled before every subject was processed.")?;
        } else if self.failures.is_empty() {
            writeln!(f, "\nAll vmrk and eeg files have been successfully created!")?;
        } else {
            writeln!(
                f,
                "\nThere were {} errors. Please check the output above.",
                self.failures.len()
            )?;
        }
        Ok(())
    }
}

/// Per-subject audit verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditStatus {
    /// Header names match the scheme and both companions exist
    Consistent,
    /// Header names differ from what the scheme computes
    Mismatch {
        expected: Vec<String>,
        declared: Vec<String>,
    },
    /// Names agree but the companion files are absent
    Unresolved { missing: Vec<String> },
    NoHeader,
    Unmapped,
    Unreadable { message: String },
}

impl AuditStatus {
    pub fn is_problem(&self) -> bool {
        !matches!(self, AuditStatus::Consistent | AuditStatus::Unmapped)
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditStatus::Consistent => f.write_str("consistent"),
            AuditStatus::Mismatch { expected, declared } => write!(
                f,
                "header declares [{}], scheme expects [{}]",
                declared.join(", "),
                expected.join(", ")
            ),
            AuditStatus::Unresolved { missing } => {
                write!(f, "missing companions [{}]", missing.join(", "))
            }
            AuditStatus::NoHeader => f.write_str("no source vhdr file"),
            AuditStatus::Unmapped => f.write_str("not covered by the naming scheme"),
            AuditStatus::Unreadable { message } => write!(f, "unreadable header: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub subject: SubjectId,
    pub header: Option<PathBuf>,
    #[serde(flatten)]
    pub status: AuditStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub window: RunWindow,
    pub entries: Vec<AuditEntry>,
}

impl AuditReport {
    pub fn mismatches(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, AuditStatus::Mismatch { .. }))
    }

    pub fn problems(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter().filter(|e| e.status.is_problem())
    }

    pub fn is_consistent(&self) -> bool {
        self.problems().next().is_none()
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "  {}: {}", entry.subject, entry.status)?;
        }
        let consistent = self
            .entries
            .iter()
            .filter(|e| e.status == AuditStatus::Consistent)
            .count();
        writeln!(f, "{}", RULE)?;
        writeln!(f, "Audit summary:")?;
        writeln!(f, "  Subjects checked: {}", self.entries.len())?;
        writeln!(f, "  Consistent: {}", consistent)?;
        writeln!(f, "  Mismatched: {}", self.mismatches().count())?;
        writeln!(f, "  Problems: {}", self.problems().count())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixReport {
    pub cleanup: CleanupReport,
    pub recreate: RecreateReport,
}

impl FixReport {
    pub fn is_clean(&self) -> bool {
        self.cleanup.is_clean() && self.recreate.is_clean()
    }
}

impl fmt::Display for FixReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Step 1: Cleaning up incorrect files...")?;
        write!(f, "{}", self.cleanup)?;
        writeln!(f, "\nStep 2: Recreating files with correct names...")?;
        write!(f, "{}", self.recreate)
    }
}

fn dry_run_tag(dry_run: bool) -> &'static str {
    if dry_run {
        " (dry run)"
    } else {
        ""
    }
}
