//! Commit history lookups.
//!
//! Sitemap `<lastmod>` prefers the author date of the last commit that
//! touched a page. The history is walked once for all pages. A commit touches
//! a page when its tree entry differs from the entry in every parent, so a
//! merge that only carries a change over from one side does not count.

use crate::utils::date::DateTimeUtc;
use anyhow::Result;
use gix::{ObjectId, Repository};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

pub struct GitHistory {
    repo: Repository,
    /// Site root relative to the worktree root.
    prefix: PathBuf,
}

impl GitHistory {
    /// Open the repository containing `site_root`, if any.
    pub fn discover(site_root: &Path) -> Option<Self> {
        let repo = gix::discover(site_root).ok()?;
        let worktree = repo.workdir()?.canonicalize().ok()?;
        let site_root = site_root.canonicalize().ok()?;
        let prefix = site_root.strip_prefix(&worktree).ok()?.to_path_buf();
        Some(Self { repo, prefix })
    }

    /// Last commit date for each site-relative path that appears in history.
    ///
    /// Paths never committed are absent from the result.
    pub fn last_commit_dates(&self, paths: &[String]) -> Result<FxHashMap<String, DateTimeUtc>> {
        let mut dates: FxHashMap<String, i64> = FxHashMap::default();
        if paths.is_empty() {
            return Ok(FxHashMap::default());
        }

        let Ok(head) = self.repo.head_commit() else {
            // Unborn branch: nothing committed yet
            return Ok(FxHashMap::default());
        };

        let repo_paths: Vec<(PathBuf, &String)> =
            paths.iter().map(|p| (self.prefix.join(p), p)).collect();

        for info in head.ancestors().all()? {
            let info = info?;
            let commit = info.object()?;
            let seconds = commit.author()?.time()?.seconds;
            let tree = commit.tree()?;

            let parent_trees = info
                .parent_ids()
                .map(|id| Ok(id.object()?.try_into_commit()?.tree()?))
                .collect::<Result<Vec<_>>>()?;

            for (repo_path, site_path) in &repo_paths {
                if dates.get(*site_path).is_some_and(|&known| known >= seconds) {
                    continue;
                }
                let current = entry_id(&tree, repo_path)?;
                if current.is_none() {
                    continue;
                }
                let mut touched = true;
                for parent in &parent_trees {
                    if entry_id(parent, repo_path)? == current {
                        touched = false;
                        break;
                    }
                }
                if touched {
                    dates.insert((*site_path).clone(), seconds);
                }
            }
        }

        Ok(dates
            .into_iter()
            .map(|(path, secs)| (path, DateTimeUtc::from_unix_secs(secs)))
            .collect())
    }
}

fn entry_id(tree: &gix::Tree<'_>, path: &Path) -> Result<Option<ObjectId>> {
    Ok(tree.lookup_entry_by_path(path)?.map(|entry| entry.object_id()))
}
