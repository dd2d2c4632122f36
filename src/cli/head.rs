//! `head` command: canonical link and social tags on every page.

use std::borrow::Cow;

use anyhow::Result;

use crate::cli::PassArgs;
use crate::cli::common::{collect_pages, run_pass};
use crate::config::SiteConfig;
use crate::core::path::canonical_url;
use crate::core::{FileOutcome, RouteMap, RunReport};
use crate::pipeline::{HeadMeta, SocialTags, Upsert, upsert_canonical, upsert_social_tags};
use crate::{debug, log};

/// Upsert the canonical link, then rebuild the Open Graph / Twitter block.
pub fn run_head(config: &SiteConfig, routes: &RouteMap, args: &PassArgs) -> Result<RunReport> {
    let tree = config.tree(&config.head.exclude);
    let files = collect_pages(&args.paths, &tree)?;
    log!("head"; "{} pages", files.len());

    let origin = config.site.origin();

    Ok(run_pass("head", &tree, &files, args.dry, |rel, html| {
        let path = routes.canonical_for_file(rel);
        let url = canonical_url(origin, &path);
        let mut outcome = FileOutcome::new(rel);
        let mut doc = Cow::Borrowed(html);

        let canonical = upsert_canonical(&doc, &url);
        apply(&mut doc, canonical, &mut outcome);

        let meta = HeadMeta::extract(&doc);
        let social = SocialTags {
            url: &url,
            title: meta.title.as_deref(),
            description: meta.description.as_deref(),
            og_type: config.head.og_type_for(&path),
            twitter_card: &config.head.twitter_card,
        };
        let tags = upsert_social_tags(&doc, &social);
        apply(&mut doc, tags, &mut outcome);

        let new_html = matches!(doc, Cow::Owned(_)).then(|| doc.into_owned());
        (outcome, new_html)
    }))
}

fn apply(doc: &mut Cow<'_, str>, upsert: Upsert, outcome: &mut FileOutcome) {
    match upsert {
        Upsert::Updated(html) => *doc = Cow::Owned(html),
        Upsert::Unchanged => {}
        Upsert::Skipped(reason) => {
            debug!("head"; "{}: {reason}", outcome.path);
            outcome.skips.push(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use crate::core::SkipReason;
    use std::fs;
    use tempfile::TempDir;

    const PAGE: &str = "<html>\n<head>\n  <title>Eye Care &amp; Services</title>\n  \
        <meta name=\"description\" content=\"Exams for the whole family.\">\n  \
        <meta property=\"og:title\" content=\"Stale\">\n</head>\n<body></body>\n</html>\n";

    fn setup() -> (TempDir, SiteConfig, RouteMap) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("pages/services")).unwrap();
        fs::write(root.join("pages/services/index.html"), PAGE).unwrap();
        fs::write(root.join("fragment.html"), "<div>no head</div>").unwrap();

        let mut config = test_parse_config(
            "[[route]]\nsource = \"pages/services/index.html\"\ncanonical = \"/eye-care-services/\"\n\
             [head.og_type_overrides]\n\"/eye-care-services/\" = \"article\"",
        );
        config.root = root;
        let routes = config.route_map().unwrap();
        (dir, config, routes)
    }

    #[test]
    fn test_head_pass_writes_tags() {
        let (dir, config, routes) = setup();
        let report = run_head(&config, &routes, &PassArgs::default()).unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 1);
        assert!(
            report.skips["fragment.html"]
                .iter()
                .all(|r| matches!(r, SkipReason::MalformedDocument(_)))
        );

        let html = fs::read_to_string(dir.path().join("pages/services/index.html")).unwrap();
        assert!(html.contains(
            r#"<link rel="canonical" href="https://example.com/eye-care-services/">"#
        ));
        assert!(html.contains(r#"<meta property="og:title" content="Eye Care &amp; Services">"#));
        assert!(html.contains(r#"<meta property="og:type" content="article">"#));
        assert!(!html.contains("Stale"));
        assert_eq!(html.matches("og:title").count(), 1);
    }

    #[test]
    fn test_head_pass_is_a_fixed_point() {
        let (dir, config, routes) = setup();
        run_head(&config, &routes, &PassArgs::default()).unwrap();
        let first = fs::read_to_string(dir.path().join("pages/services/index.html")).unwrap();

        let again = run_head(&config, &routes, &PassArgs::default()).unwrap();
        assert_eq!(again.updated, 0);
        assert_eq!(
            fs::read_to_string(dir.path().join("pages/services/index.html")).unwrap(),
            first
        );
    }

    #[test]
    fn test_head_pass_dry_run() {
        let (dir, config, routes) = setup();
        let args = PassArgs {
            dry: true,
            ..PassArgs::default()
        };
        let report = run_head(&config, &routes, &args).unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("pages/services/index.html")).unwrap(),
            PAGE
        );
    }
}
