//! Route path normalization.
//!
//! Every path the tool emits goes through [`normalize`]: one leading slash,
//! and a trailing slash unless the final segment looks like a file.
//!
//! | input                    | output                    |
//! |--------------------------|---------------------------|
//! | `""`, `"/"`, `"//"`      | `/`                       |
//! | `about-us`               | `/about-us/`              |
//! | `/about-us//`            | `/about-us/`              |
//! | `images/logo.png`        | `/images/logo.png`        |
//! | `/v1.2/app`              | `/v1.2/app/`              |

use percent_encoding::percent_decode_str;
use std::path::PathBuf;

/// Normalize a path to its served form.
pub fn normalize(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches('/');
    let body = trimmed.trim_end_matches('/');

    if body.is_empty() {
        return "/".to_string();
    }

    if is_file_like(body) {
        // Only the final segment decides; a trailing slash was explicit intent
        if trimmed.len() == body.len() {
            return format!("/{body}");
        }
    }
    format!("/{body}/")
}

/// True when the final path segment has an interior dot with text after it.
///
/// `logo.png` and `a.b.` are file-like; `a.`, `.htaccess` and directory
/// segments such as `v1.2/app` are not. A trailing slash means a directory.
pub fn is_file_like(path: &str) -> bool {
    if path.ends_with('/') {
        return false;
    }
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < segment.len())
}

/// Served path of a site-relative file.
///
/// `index.html` -> `/`, `blog/index.html` -> `/blog/`, `a.html` -> `/a.html`.
pub fn served_path(rel: &str) -> String {
    let rel = rel.trim_start_matches('/');
    if rel == "index.html" {
        return "/".to_string();
    }
    match rel.strip_suffix("/index.html") {
        Some(dir) => normalize(dir),
        None => normalize(rel),
    }
}

/// Site-relative file that serves a route path.
///
/// `/` -> `index.html`, `/about-us/` -> `about-us/index.html`,
/// `/a.html` -> `a.html`. Percent-escapes are decoded and query or
/// fragment suffixes ignored.
pub fn file_for_route(route: &str) -> PathBuf {
    let route = route.split(['?', '#']).next().unwrap_or("");
    let decoded = percent_decode_str(route).decode_utf8_lossy();
    let normalized = normalize(&decoded);
    let rel = normalized.trim_start_matches('/');

    if rel.is_empty() {
        PathBuf::from("index.html")
    } else if normalized.ends_with('/') {
        PathBuf::from(rel).join("index.html")
    } else {
        PathBuf::from(rel)
    }
}

/// Join an origin and a path without doubling or dropping the slash.
pub fn canonical_url(origin: &str, path: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), normalize(path))
}
