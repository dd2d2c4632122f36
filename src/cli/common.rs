//! Common utilities shared across CLI commands.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use rayon::prelude::*;

use crate::core::{FileOutcome, RunReport, SiteTree, SkipReason};
use crate::debug;
use crate::logger::ProgressLine;

/// Collect site-relative HTML files based on CLI paths.
///
/// No paths means every page in `tree`. A single `-` reads paths from stdin.
/// Directories expand to the pages under them that `tree` does not exclude;
/// files named explicitly are always taken.
pub fn collect_pages(paths: &[PathBuf], tree: &SiteTree) -> Result<Vec<String>> {
    let paths: Vec<PathBuf> = if paths.len() == 1 && paths[0].as_os_str() == "-" {
        read_paths_from_stdin()?
    } else {
        paths.to_vec()
    };

    if paths.is_empty() {
        return Ok(tree.html_files());
    }

    let mut all: Option<Vec<String>> = None;
    let mut selected = BTreeSet::new();

    for path in &paths {
        let resolved = resolve_path(path, tree.root());
        let Some(rel) = tree.relative(&resolved) else {
            bail!(
                "{} is outside the site root {}",
                path.display(),
                tree.root().display()
            );
        };

        if resolved.is_file() {
            if !is_html(&resolved) {
                bail!("not an HTML file: {}", path.display());
            }
            selected.insert(rel);
        } else if resolved.is_dir() {
            let pages = all.get_or_insert_with(|| tree.html_files());
            let prefix = format!("{rel}/");
            selected.extend(
                pages
                    .iter()
                    .filter(|page| rel.is_empty() || page.starts_with(&prefix))
                    .cloned(),
            );
        } else {
            bail!(
                "path not found: {}\n  Tried:\n    - {}\n    - {}",
                path.display(),
                path.display(),
                tree.root().join(path).display()
            );
        }
    }

    Ok(selected.into_iter().collect())
}

/// Read file paths from stdin, one per line
pub fn read_paths_from_stdin() -> Result<Vec<PathBuf>> {
    let stdin = io::stdin();
    let mut paths = Vec::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            paths.push(PathBuf::from(trimmed));
        }
    }

    Ok(paths)
}

/// Resolve a CLI path: absolute as-is, then cwd-relative, then root-relative.
fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    let candidate = if path.is_absolute() || path.exists() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    candidate.canonicalize().unwrap_or(candidate)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
}

// ============================================================================
// Per-page passes
// ============================================================================

/// Run a document transform over `files` in parallel.
///
/// `transform` gets the site-relative path and the document text and
/// returns its outcome plus the new text, if any. Each file is read,
/// transformed and written by one worker; outcomes are folded in file
/// order so counts are deterministic.
pub fn run_pass<F>(
    module: &'static str,
    tree: &SiteTree,
    files: &[String],
    dry: bool,
    transform: F,
) -> RunReport
where
    F: Fn(&str, &str) -> (FileOutcome, Option<String>) + Sync,
{
    let progress = ProgressLine::new(module, &[("files", files.len())]);

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|rel| {
            let outcome = process_file(tree, rel, dry, &transform);
            progress.inc("files");
            outcome
        })
        .collect();

    progress.finish();

    let mut report = RunReport::default();
    for outcome in outcomes {
        if outcome.changed {
            debug!(module; "{}{}", if dry { "would update " } else { "updated " }, outcome.path);
        }
        report.record(outcome);
    }
    report
}

fn process_file<F>(tree: &SiteTree, rel: &str, dry: bool, transform: &F) -> FileOutcome
where
    F: Fn(&str, &str) -> (FileOutcome, Option<String>),
{
    let path = tree.abs(rel);
    let html = match fs::read_to_string(&path) {
        Ok(html) => html,
        Err(err) => return FileOutcome::skipped(rel, SkipReason::Io(err.to_string())),
    };

    let (mut outcome, new_html) = transform(rel, &html);
    let Some(new_html) = new_html.filter(|new| *new != html) else {
        return outcome;
    };

    if dry {
        outcome.changed = true;
    } else {
        match fs::write(&path, new_html) {
            Ok(()) => outcome.changed = true,
            Err(err) => outcome.skips.push(SkipReason::Io(err.to_string())),
        }
    }
    outcome
}
