//! `copy` command: materialize canonical routes as `<route>/index.html`.
//!
//! Each directory-style canonical route gets a copy of its first declared
//! source. Existing destinations are kept unless `--overwrite` is given.

use std::fmt;
use std::fs;
use std::path::Path;

use owo_colors::OwoColorize;

use crate::config::SiteConfig;
use crate::core::RouteMap;
use crate::core::path::{file_for_route, is_file_like};
use crate::utils::plural::plural_s;
use crate::{debug, log};

/// What a copy run did.
#[derive(Debug, Default)]
pub struct CopyReport {
    pub copied: usize,
    /// Destinations left alone because they already existed.
    pub existing: usize,
    /// `route <- source` pairs whose source file does not exist.
    pub missing: Vec<String>,
    /// `route: error` for copies that failed.
    pub failed: Vec<String>,
}

impl CopyReport {
    /// Every route has its file.
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }

    /// Print missing sources and failures to stderr.
    pub fn print(&self) {
        for (title, items) in [("missing sources", &self.missing), ("failed", &self.failed)] {
            if items.is_empty() {
                continue;
            }
            eprintln!();
            eprintln!(
                "{} {}",
                title.red().bold(),
                format!("({} route{})", items.len(), plural_s(items.len())).dimmed()
            );
            for item in items {
                eprintln!("{} {item}", "→".red());
            }
        }
    }
}

impl fmt::Display for CopyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "copied {}, existing {}, missing {}, failed {}",
            self.copied,
            self.existing,
            self.missing.len(),
            self.failed.len()
        )
    }
}

enum CopyStatus {
    Copied,
    Exists,
    Missing,
}

/// Copy each route's first declared source to its canonical location.
pub fn run_copy(config: &SiteConfig, routes: &RouteMap, overwrite: bool, dry: bool) -> CopyReport {
    let mut report = CopyReport::default();

    for canonical in routes.canonicals() {
        if canonical == "/" || is_file_like(canonical) {
            continue;
        }
        let Some(source) = routes.sources_for(canonical).first().copied() else {
            continue;
        };

        let from = config.root_join(source);
        let to = config.root_join(file_for_route(canonical));
        if from == to {
            continue;
        }

        match copy_one(&from, &to, overwrite, dry) {
            Ok(CopyStatus::Copied) => {
                debug!("copy"; "{}{canonical} <- {source}", if dry { "would copy " } else { "" });
                report.copied += 1;
            }
            Ok(CopyStatus::Exists) => {
                debug!("copy"; "{canonical} exists, kept");
                report.existing += 1;
            }
            Ok(CopyStatus::Missing) => report.missing.push(format!("{canonical} <- {source}")),
            Err(err) => report.failed.push(format!("{canonical}: {err}")),
        }
    }

    log!("copy"; "{report}");
    report.print();
    report
}

fn copy_one(from: &Path, to: &Path, overwrite: bool, dry: bool) -> std::io::Result<CopyStatus> {
    if !from.is_file() {
        return Ok(CopyStatus::Missing);
    }
    if to.exists() && !overwrite {
        return Ok(CopyStatus::Exists);
    }
    if !dry {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)?;
    }
    Ok(CopyStatus::Copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SiteConfig, RouteMap) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("pages/about")).unwrap();
        fs::write(root.join("pages/about/index.html"), "about v1").unwrap();
        fs::write(root.join("pages/book.html"), "book").unwrap();
        fs::create_dir_all(root.join("book-now")).unwrap();
        fs::write(root.join("book-now/index.html"), "old book").unwrap();

        let mut config = test_parse_config(
            "[[route]]\nsource = \"pages/about/index.html\"\ncanonical = \"/about-us/\"\n\
             [[route]]\nsource = \"pages/about.html\"\ncanonical = \"/about-us/\"\n\
             [[route]]\nsource = \"pages/book.html\"\ncanonical = \"/book-now/\"\n\
             [[route]]\nsource = \"pages/gone.html\"\ncanonical = \"/gone/\"\n\
             [[route]]\nsource = \"pages/home.html\"\ncanonical = \"/\"",
        );
        config.root = root;
        let routes = config.route_map().unwrap();
        (dir, config, routes)
    }

    #[test]
    fn test_copy_first_declared_source() {
        let (dir, config, routes) = setup();
        let report = run_copy(&config, &routes, false, false);

        assert_eq!(report.copied, 1);
        assert_eq!(report.existing, 1);
        assert_eq!(report.missing, vec!["/gone/ <- pages/gone.html"]);
        assert!(!report.is_clean());
        assert_eq!(
            fs::read_to_string(dir.path().join("about-us/index.html")).unwrap(),
            "about v1"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("book-now/index.html")).unwrap(),
            "old book"
        );
        assert!(!dir.path().join("index.html").exists());
    }

    #[test]
    fn test_copy_overwrite() {
        let (dir, config, routes) = setup();
        let report = run_copy(&config, &routes, true, false);

        assert_eq!(report.copied, 2);
        assert_eq!(report.existing, 0);
        assert_eq!(
            fs::read_to_string(dir.path().join("book-now/index.html")).unwrap(),
            "book"
        );
    }

    #[test]
    fn test_copy_dry_run() {
        let (dir, config, routes) = setup();
        let report = run_copy(&config, &routes, false, true);

        assert_eq!(report.copied, 1);
        assert!(!dir.path().join("about-us").exists());
    }
}
