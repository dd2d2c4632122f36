//! Per-run counters and skip records for the transform passes.

use std::collections::BTreeMap;
use std::fmt;

use owo_colors::OwoColorize;
use thiserror::Error;

use crate::utils::plural::plural_s;

/// Why a file, or one step on a file, was left alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// Could not be read or written.
    #[error("i/o error: {0}")]
    Io(String),
    /// No anchor to insert at, or an unterminated attribute in the way.
    #[error("malformed document: {0}")]
    MalformedDocument(&'static str),
}

/// What one pass did to one file.
#[derive(Debug, Clone, Default)]
pub struct FileOutcome {
    /// Site-relative path.
    pub path: String,
    pub changed: bool,
    /// Values that could not be parsed safely and were left untouched.
    pub unmatched: usize,
    /// Internal references with no route mapping, rewritten to their normalized form.
    pub passthrough: usize,
    pub skips: Vec<SkipReason>,
}

impl FileOutcome {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn skipped(path: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            path: path.into(),
            skips: vec![reason],
            ..Self::default()
        }
    }
}

/// Aggregated result of one pass over the file tree.
#[derive(Debug, Default)]
pub struct RunReport {
    pub scanned: usize,
    pub updated: usize,
    pub skipped: usize,
    pub unmatched: usize,
    pub passthrough: usize,
    pub violations: usize,
    /// Skip reasons grouped by file, for the detail listing.
    pub skips: BTreeMap<String, Vec<SkipReason>>,
}

impl RunReport {
    pub fn record(&mut self, outcome: FileOutcome) {
        self.scanned += 1;
        self.updated += usize::from(outcome.changed);
        self.unmatched += outcome.unmatched;
        self.passthrough += outcome.passthrough;
        if !outcome.skips.is_empty() {
            self.skipped += 1;
            self.skips
                .entry(outcome.path)
                .or_default()
                .extend(outcome.skips);
        }
    }

    /// Fold a later pass over the same pages into this one, as `all` does.
    ///
    /// Pages are counted once; `updated` counts writes across both passes.
    pub fn merge(&mut self, other: Self) {
        self.scanned = self.scanned.max(other.scanned);
        self.updated += other.updated;
        self.unmatched += other.unmatched;
        self.passthrough += other.passthrough;
        self.violations += other.violations;
        for (path, reasons) in other.skips {
            self.skips.entry(path).or_default().extend(reasons);
        }
        self.skipped = self.skips.len();
    }

    /// No unmatched values and no violations. Skips alone do not fail a run.
    pub fn is_clean(&self) -> bool {
        self.unmatched == 0 && self.violations == 0
    }

    /// Print skip details to stderr, grouped by file.
    pub fn print_skips(&self) {
        if self.skips.is_empty() {
            return;
        }
        eprintln!();
        eprintln!(
            "{} {}",
            "skipped".yellow().bold(),
            format!("({} file{})", self.skips.len(), plural_s(self.skips.len())).dimmed()
        );
        for (path, reasons) in &self.skips {
            eprintln!("{}{}{}", "[".dimmed(), path.cyan(), "]".dimmed());
            for reason in reasons {
                eprintln!("{} {reason}", "→".yellow());
            }
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scanned {}, updated {}, skipped {}, unmatched {}, violations {}",
            self.scanned, self.updated, self.skipped, self.unmatched, self.violations
        )?;
        if self.passthrough > 0 {
            write!(f, " ({} unmapped passed through)", self.passthrough)?;
        }
        Ok(())
    }
}
