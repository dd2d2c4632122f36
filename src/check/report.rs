//! Consistency report types and formatting.

use std::fmt;
use std::fmt::Write as _;
use std::path::Path;

use owo_colors::OwoColorize;

use crate::utils::plural::plural_s;

/// Details listed per check in the markdown report.
const MARKDOWN_DETAIL_LIMIT: usize = 25;

/// The checks, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckKind {
    RequiredFile,
    TopUrl,
    RedirectDestination,
    DeployRedirect,
    RouteFile,
    Canonical,
    LegacyLink,
    ReadablePage,
}

impl CheckKind {
    pub const ALL: [Self; 8] = [
        Self::RequiredFile,
        Self::TopUrl,
        Self::RedirectDestination,
        Self::DeployRedirect,
        Self::RouteFile,
        Self::Canonical,
        Self::LegacyLink,
        Self::ReadablePage,
    ];

    /// Human-readable check name.
    pub fn title(self) -> &'static str {
        match self {
            Self::RequiredFile => "Required files present",
            Self::TopUrl => "Top URLs resolve to a page or a redirect",
            Self::RedirectDestination => "Redirect destinations exist",
            Self::DeployRedirect => "Declared redirects are deployed",
            Self::RouteFile => "Canonical routes have files",
            Self::Canonical => "Canonical tag on every page",
            Self::LegacyLink => "No links into the legacy namespace",
            Self::ReadablePage => "Pages readable",
        }
    }
}

/// One failed expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: CheckKind,
    /// What failed: a path, a URL, or `from -> to`.
    pub subject: String,
}

impl Violation {
    pub fn new(kind: CheckKind, subject: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.title(), self.subject)
    }
}

/// Result of a consistency check. Never mutates anything it checked.
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Pages read.
    pub pages: usize,
    /// Sorted by check, then in discovery order.
    pub violations: Vec<Violation>,
}

impl CheckReport {
    pub fn ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn push(&mut self, kind: CheckKind, subject: impl Into<String>) {
        self.violations.push(Violation::new(kind, subject));
    }

    /// Order violations by check, keeping discovery order within each.
    pub fn sort(&mut self) {
        self.violations.sort_by_key(|v| v.kind);
    }

    pub fn of_kind(&self, kind: CheckKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// Print violations to stderr, grouped by check.
    pub fn print(&self) {
        for kind in CheckKind::ALL {
            let subjects: Vec<&str> = self.of_kind(kind).map(|v| v.subject.as_str()).collect();
            if subjects.is_empty() {
                continue;
            }
            eprintln!();
            eprintln!(
                "{} {}",
                kind.title().red().bold(),
                format!("({} issue{})", subjects.len(), plural_s(subjects.len())).dimmed()
            );
            for subject in subjects {
                eprintln!("{} {}", "→".red(), subject);
            }
        }
    }

    /// Markdown QA report: overall status, then one line per check.
    pub fn to_markdown(&self, root: &Path, date: &str) -> String {
        let mut out = String::new();
        let status = if self.ok() { "PASS" } else { "FAIL" };

        let _ = writeln!(out, "# QA Report\n");
        let _ = writeln!(out, "**Report Date:** {date}");
        let _ = writeln!(out, "**Site Root:** `{}`", root.display());
        let _ = writeln!(out, "**Pages Checked:** {}", self.pages);
        let _ = writeln!(out, "**Overall Status:** {status}\n");
        let _ = writeln!(out, "## Checks\n");

        for kind in CheckKind::ALL {
            let subjects: Vec<&str> = self.of_kind(kind).map(|v| v.subject.as_str()).collect();
            let mark = if subjects.is_empty() { "✅" } else { "❌" };
            let _ = writeln!(out, "- {mark} **{}**", kind.title());
            for subject in subjects.iter().take(MARKDOWN_DETAIL_LIMIT) {
                let _ = writeln!(out, "  - {subject}");
            }
            if subjects.len() > MARKDOWN_DETAIL_LIMIT {
                let _ = writeln!(
                    out,
                    "  - ...and {} more",
                    subjects.len() - MARKDOWN_DETAIL_LIMIT
                );
            }
        }

        out
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.violations.len();
        if total == 0 {
            write!(f, "{}", "all checks passed".green())
        } else {
            write!(
                f,
                "{} {} {}",
                "found".dimmed(),
                total.to_string().red().bold(),
                format!("violation{}", plural_s(total)).dimmed()
            )
        }
    }
}
