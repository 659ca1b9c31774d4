//! `inkpost json`: declared pages as JSON instead of HTML.
//!
//! Each page is converted with links rewritten as in a normal build, then
//! written to its output path with a `.json` extension.

use anyhow::{Context, Result, bail};

use crate::{
    compiler::{JobEnv, SiteValues},
    config::SiteConfig,
    generator::{Catalog, PageBuilder},
    log,
    pipeline::Templates,
    utils::plural_count,
};

/// Dump every declared page. Returns the number written.
pub fn dump_json(config: &SiteConfig) -> Result<usize> {
    let nav = config.nav().context("invalid page declarations")?;
    let templates = Templates::new(config.build.theme_dir.as_deref());
    let env = JobEnv::new(config, &nav, &templates);
    let site = SiteValues::from_config(config, &nav);
    let catalog = Catalog::default();

    let report = PageBuilder::new(env, &site, &catalog, &[]).dump_all();
    for failure in &report.failures {
        log!("error"; "{}: {}", failure.path.display(), failure.error);
    }
    if !report.failures.is_empty() {
        bail!("json dump failed: {}", plural_count(report.failures.len(), "page"));
    }

    log!("json"; "wrote {}", plural_count(report.built, "page"));
    Ok(report.built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dump_json_pages() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(docs.join("sub")).unwrap();
        fs::write(docs.join("index.md"), "# Home\n\n[b](sub/b.md)\n").unwrap();
        fs::write(docs.join("sub/b.md"), "# B\n").unwrap();
        fs::write(docs.join("post.md"), "undeclared\n").unwrap();
        let config = test_config(dir.path(), r#"pages = ["index.md", "sub/b.md"]"#);

        assert_eq!(dump_json(&config).unwrap(), 2);
        let index = fs::read_to_string(dir.path().join("site/index.json")).unwrap();
        assert!(index.contains(r#"\"sub/b.html\""#), "{index}");
        assert!(dir.path().join("site/sub/b.json").is_file());
        assert!(!dir.path().join("site/post.json").exists());
        assert!(!dir.path().join("site/index.html").exists());
    }

    #[test]
    fn test_dump_json_strict_broken_link_fails() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/index.md"), "[gone](gone.md)\n").unwrap();
        let config = test_config(
            dir.path(),
            "pages = [\"index.md\"]\n[build]\nstrict = true",
        );

        let err = dump_json(&config).unwrap_err();
        assert!(err.to_string().contains("1 page"), "{err}");
    }
}
