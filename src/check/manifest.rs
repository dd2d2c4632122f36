//! External manifests the checker reconciles against.
//!
//! - deploy config (`vercel.json`): `{"redirects": [{"source", "destination"}]}`
//! - top URLs: CSV with a path column, or a plain list with one path per line
//! - declared redirects: CSV with `from_path,to_path` columns
//!
//! A configured manifest that cannot be loaded is fatal; the run stops before
//! any page is read.

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read {0}")]
    Read(PathBuf, #[source] io::Error),

    #[error("invalid JSON in {0}")]
    Json(PathBuf, #[source] serde_json::Error),

    #[error("invalid CSV in {0}")]
    Csv(PathBuf, #[source] csv::Error),

    #[error("{path} has no `{column}` column")]
    MissingColumn { path: PathBuf, column: String },
}

/// One `source -> destination` redirect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Redirect {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub destination: String,
}

impl Redirect {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DeployConfig {
    #[serde(default)]
    redirects: Vec<Redirect>,
}

/// Redirects deployed by the hosting platform.
///
/// `Ok(None)` when the file does not exist.
pub fn load_deploy_redirects(path: &Path) -> Result<Option<Vec<Redirect>>, ManifestError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = read(path)?;
    let config: DeployConfig = serde_json::from_str(&content)
        .map_err(|err| ManifestError::Json(path.to_path_buf(), err))?;
    Ok(Some(config.redirects))
}

/// Paths from a top-URLs export.
///
/// With a header naming `column` the file is read as CSV; otherwise every
/// non-blank line not starting with `#` is a path.
pub fn load_top_urls(path: &Path, column: &str) -> Result<Vec<String>, ManifestError> {
    let content = read(path)?;
    let csv_err = |err: csv::Error| ManifestError::Csv(path.to_path_buf(), err);

    let mut reader = csv_reader(&content);
    let index = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .position(|header| header == column);

    let Some(index) = index else {
        return Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect());
    };

    let mut paths = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        if let Some(value) = record.get(index).filter(|v| !v.is_empty()) {
            paths.push(value.to_string());
        }
    }
    Ok(paths)
}

/// A `from_path,to_path` row. Other columns are ignored.
#[derive(Debug, Deserialize)]
struct DeclaredRow {
    #[serde(default)]
    from_path: Option<String>,
    #[serde(default)]
    to_path: Option<String>,
}

/// Declared redirects from a `from_path,to_path` CSV. Incomplete rows are kept
/// with empty sides so the checker can report them.
pub fn load_declared_redirects(path: &Path) -> Result<Vec<Redirect>, ManifestError> {
    let content = read(path)?;
    let csv_err = |err: csv::Error| ManifestError::Csv(path.to_path_buf(), err);

    let mut reader = csv_reader(&content);
    let headers = reader.headers().map_err(csv_err)?.clone();
    for column in ["from_path", "to_path"] {
        if !headers.iter().any(|header| header == column) {
            return Err(ManifestError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut redirects = Vec::new();
    for row in reader.deserialize::<DeclaredRow>() {
        let row = row.map_err(csv_err)?;
        if row.from_path.is_none() && row.to_path.is_none() {
            continue;
        }
        redirects.push(Redirect::new(
            row.from_path.unwrap_or_default(),
            row.to_path.unwrap_or_default(),
        ));
    }
    Ok(redirects)
}

/// Header-keyed reader that tolerates short rows and trims every field.
fn csv_reader(content: &str) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes())
}

fn read(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|err| ManifestError::Read(path.to_path_buf(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_deploy_redirects() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "vercel.json",
            r#"{"cleanUrls": true, "redirects": [
                {"source": "/pages/about/index.html", "destination": "/about-us/", "permanent": true}
            ]}"#,
        );
        assert_eq!(
            load_deploy_redirects(&path).unwrap(),
            Some(vec![Redirect::new("/pages/about/index.html", "/about-us/")])
        );
    }

    #[test]
    fn test_deploy_config_absent_or_without_redirects() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_deploy_redirects(&dir.path().join("vercel.json")).unwrap(), None);

        let path = write(&dir, "vercel.json", "{}");
        assert_eq!(load_deploy_redirects(&path).unwrap(), Some(vec![]));
    }

    #[test]
    fn test_deploy_config_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "vercel.json", "{ redirects: ");
        assert!(matches!(
            load_deploy_redirects(&path),
            Err(ManifestError::Json(..))
        ));
    }

    #[test]
    fn test_top_urls_csv() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "top.csv",
            "current_path,clicks\n/,900\n/book-now/,120\n,4\n",
        );
        assert_eq!(
            load_top_urls(&path, "current_path").unwrap(),
            vec!["/", "/book-now/"]
        );
    }

    #[test]
    fn test_top_urls_plain_list() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "top.txt", "# exported 2025-06\n/\n\n  /about-us/ \n");
        assert_eq!(
            load_top_urls(&path, "current_path").unwrap(),
            vec!["/", "/about-us/"]
        );
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = load_top_urls(&dir.path().join("nope.csv"), "current_path").unwrap_err();
        assert!(matches!(err, ManifestError::Read(..)));
        assert!(err.to_string().contains("nope.csv"));
    }

    #[test]
    fn test_declared_redirects() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "redirects.csv",
            "from_path,to_path,note\r\n/old/,/new/,moved\r\n/gone/,,\r\n",
        );
        assert_eq!(
            load_declared_redirects(&path).unwrap(),
            vec![Redirect::new("/old/", "/new/"), Redirect::new("/gone/", "")]
        );
    }

    #[test]
    fn test_declared_redirects_quoted_fields() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "redirects.csv",
            "\u{feff}note,from_path,to_path\n\"moved, see \"\"ops\"\"\",/a/,/b/\n,,\n",
        );
        assert_eq!(
            load_declared_redirects(&path).unwrap(),
            vec![Redirect::new("/a/", "/b/")]
        );
    }

    #[test]
    fn test_declared_redirects_require_columns() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "redirects.csv", "from,to\n/a/,/b/\n");
        assert!(matches!(
            load_declared_redirects(&path),
            Err(ManifestError::MissingColumn { column, .. }) if column == "from_path"
        ));
    }
}
