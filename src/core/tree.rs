//! The site's file tree: which HTML files exist and which routes they serve.

use super::path::file_for_route;
use jwalk::WalkDir;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Site root plus the site-relative prefixes no pass should touch.
#[derive(Debug, Clone)]
pub struct SiteTree {
    root: PathBuf,
    exclude: Arc<Vec<String>>,
}

impl SiteTree {
    /// `exclude` entries are site-relative paths, e.g. `miboflo` or
    /// `blog/drafts`; hidden entries are always skipped.
    pub fn new(root: impl Into<PathBuf>, exclude: impl IntoIterator<Item = String>) -> Self {
        let exclude = exclude
            .into_iter()
            .map(|e| e.trim_matches('/').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Self {
            root: root.into(),
            exclude: Arc::new(exclude),
        }
    }

    /// Same root, extra excluded prefixes for one pass.
    pub fn excluding(&self, extra: &[String]) -> Self {
        Self::new(
            self.root.clone(),
            self.exclude.iter().chain(extra).cloned(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a site-relative file.
    pub fn abs(&self, rel: &str) -> PathBuf {
        self.root.join(rel.trim_start_matches('/'))
    }

    /// Site-relative form of an absolute path inside the root.
    pub fn relative(&self, path: &Path) -> Option<String> {
        path.strip_prefix(&self.root).ok().map(to_slash)
    }

    /// All `.html` files, site-relative with `/` separators, sorted.
    pub fn html_files(&self) -> Vec<String> {
        let root = self.root.clone();
        let exclude = Arc::clone(&self.exclude);

        let walker = WalkDir::new(&self.root)
            .skip_hidden(true)
            .process_read_dir(move |_depth, dir, _state, children| {
                children.retain(|entry| {
                    entry.as_ref().map_or(true, |e| {
                        let path = dir.join(&e.file_name);
                        path.strip_prefix(&root)
                            .map(|rel| !is_under_any(&to_slash(rel), &exclude))
                            .unwrap_or(true)
                    })
                });
            });

        let mut files: Vec<String> = walker
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
            })
            .filter_map(|e| e.path().strip_prefix(&self.root).ok().map(to_slash))
            .collect();

        files.sort();
        files
    }

    /// Whether a served route has a file behind it.
    pub fn route_exists(&self, route: &str) -> bool {
        self.root.join(file_for_route(route)).is_file()
    }

    /// Whether a site-relative file exists.
    pub fn file_exists(&self, rel: &str) -> bool {
        self.abs(rel).is_file()
    }
}

fn is_under_any(rel: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| {
        rel.strip_prefix(p.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
