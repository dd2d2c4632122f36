//! Dotted config field paths for diagnostics.

/// A config field path such as `site.origin` or `check.deploy_config`.
///
/// Each section exposes its paths as associated constants so diagnostics
/// never spell a field by hand:
///
/// ```ignore
/// diag.error(SiteSection::ORIGIN, "origin is required");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}
