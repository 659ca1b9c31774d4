//! Declared pages: rendered after the worker pool drains, with the tag
//! catalog and recency index available to their templates.

use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::catalog::{Catalog, recent};
use crate::cache::{BuildRecord, RecordStore};
use crate::compiler::job::{JobEnv, read_source, write_output};
use crate::compiler::{BuildError, Failure, PageContext, RenderContext, SiteValues, TemplateContext};
use crate::core::DocumentContext;
use crate::core::path::{to_posix, to_site_url};
use crate::log;
use crate::nav::PageId;
use crate::pipeline::LinkRewriter;
use crate::pipeline::markdown::{self, Converted, split_meta};

/// Optional page rendered when the theme provides it.
pub const NOT_FOUND_TEMPLATE: &str = "404.html";

/// A recent document as shown on a declared page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentPost {
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub path: String,
    /// URL relative to the page showing the post.
    pub url: String,
    /// Leading part of the post as HTML, links relative to the showing page.
    pub excerpt: String,
}

/// A recent document with the markdown of its excerpt, converted once the
/// showing page is known.
#[derive(Debug, Clone)]
pub struct Excerpt {
    pub path: String,
    pub record: BuildRecord,
    text: String,
}

impl Excerpt {
    /// Read the first `excerpt_lines` body lines of the `n` most recent records.
    pub fn load_recent(env: &JobEnv<'_>, store: &RecordStore) -> Vec<Self> {
        let build = &env.config.build;
        recent(store, build.n_blogs_to_show)
            .into_iter()
            .map(|(path, record)| {
                let text = match read_source(&build.docs_dir, Path::new(path)) {
                    Ok(text) => {
                        let (_, body) = split_meta(&text);
                        first_lines(body, build.excerpt_lines).to_string()
                    }
                    Err(e) => {
                        crate::debug!("excerpt"; "{e}");
                        String::new()
                    }
                };
                Self {
                    path: path.to_string(),
                    record: record.clone(),
                    text,
                }
            })
            .collect()
    }

    /// Convert the excerpt for a page rendered at `doc`.
    pub fn for_page(&self, env: &JobEnv<'_>, doc: &DocumentContext) -> RecentPost {
        let post = DocumentContext::for_source(Path::new(&self.path));
        let prefix = doc.url.make_relative(post.url.base_path());
        // Broken links were already reported when the post itself was built.
        let rewriter = LinkRewriter::new(&env.config.build.docs_dir, false).with_prefix(&prefix);
        let mut broken = Vec::new();
        let excerpt = markdown::convert_body(&self.text, env.markdown, |event| {
            rewriter.rewrite_event(event, &post, &mut broken)
        })
        .map(|converted| converted.html)
        .unwrap_or_default();

        RecentPost {
            title: self.record.title.clone(),
            date: self.record.date.clone(),
            tags: self.record.tags.iter().cloned().collect(),
            path: self.path.clone(),
            url: doc.url.make_relative(&to_site_url(Path::new(&self.path))),
            excerpt,
        }
    }
}

/// The first `n` lines of `text`, line endings included.
fn first_lines(text: &str, n: usize) -> &str {
    match text.match_indices('\n').nth(n.saturating_sub(1)) {
        Some((idx, _)) if n > 0 => &text[..=idx],
        _ if n == 0 => "",
        _ => text,
    }
}

/// One declared page as written by `dump_page`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageJson {
    pub content: String,
    pub title: String,
    /// Absolute site URL.
    pub url: String,
    pub language: &'static str,
}

/// Outcome of rendering the declared pages.
#[derive(Debug, Default)]
pub struct PagesReport {
    pub built: usize,
    pub failures: Vec<Failure>,
    pub skipped: Vec<PathBuf>,
}

/// Renders declared pages and the optional 404 page.
pub struct PageBuilder<'a> {
    env: JobEnv<'a>,
    site: &'a SiteValues,
    catalog: &'a Catalog,
    excerpts: &'a [Excerpt],
}

impl<'a> PageBuilder<'a> {
    pub fn new(
        env: JobEnv<'a>,
        site: &'a SiteValues,
        catalog: &'a Catalog,
        excerpts: &'a [Excerpt],
    ) -> Self {
        Self {
            env,
            site,
            catalog,
            excerpts,
        }
    }

    /// Render every declared page in parallel.
    pub fn build_all(&self) -> PagesReport {
        self.each_page(|id| self.build_page(id))
    }

    /// Write every declared page as JSON next to where its HTML would go.
    pub fn dump_all(&self) -> PagesReport {
        self.each_page(|id| self.dump_page(id))
    }

    fn each_page(&self, job: impl Fn(PageId) -> Result<(), BuildError> + Sync) -> PagesReport {
        let ids: Vec<PageId> = self.env.nav.walk().map(|(id, _)| id).collect();
        let results: Vec<_> = ids.par_iter().map(|&id| (id, job(id))).collect();

        let mut report = PagesReport::default();
        for (id, result) in results {
            let source = self.env.nav.page(id).source.clone();
            match result {
                Ok(()) => report.built += 1,
                Err(BuildError::SourceNotFound { path }) => {
                    log!("warning"; "declared page `{}` not found, skipping", path.display());
                    report.skipped.push(path);
                }
                Err(error) => report.failures.push(Failure {
                    path: source,
                    error,
                }),
            }
        }
        report
    }

    /// Read and convert a declared page, links relative to its output.
    fn convert_page(&self, id: PageId) -> Result<(RenderContext, Converted), BuildError> {
        let page = self.env.nav.page(id);
        let text = read_source(&self.env.config.build.docs_dir, &page.source)?;
        let mut ctx = RenderContext::new(self.site.clone());
        ctx.set_source(&page.source);

        let rewriter = self.env.rewriter();
        let mut broken = Vec::new();
        let converted = markdown::convert(&text, self.env.markdown, |event| {
            rewriter.rewrite_event(event, &ctx.doc, &mut broken)
        })?;
        for target in &broken {
            log!("warning"; "`{}` links to `{target}` which does not exist", to_posix(&page.source));
        }
        Ok((ctx, converted))
    }

    /// Render one declared page with `id` as the current page.
    pub fn build_page(&self, id: PageId) -> Result<(), BuildError> {
        let nav = self.env.nav;
        let page = nav.page(id);
        let build = &self.env.config.build;
        let (ctx, converted) = self.convert_page(id)?;

        let template = converted
            .meta
            .get("template")
            .and_then(|v| v.first())
            .cloned()
            .unwrap_or_else(|| build.default_template.clone());

        let homepage = page.is_homepage();
        let page_ctx = PageContext {
            page_title: (!homepage).then(|| page.title.clone()),
            page_description: homepage.then(|| self.site.description.clone()),
            content: converted.html,
            toc: converted.toc,
            meta: converted.meta,
            canonical_url: self.site.canonical_url(&page.url),
            current_page: Some(nav.link(id, &ctx.doc.url)),
            previous_page: page.previous.map(|p| nav.link(p, &ctx.doc.url)),
            next_page: page.next.map(|p| nav.link(p, &ctx.doc.url)),
            ..PageContext::default()
        };
        self.render(&ctx, Some(id), &page_ctx, &template, &build.site_dir.join(&page.output))
            .map_err(|e| match e {
                BuildError::Render { source, .. } => BuildError::Render {
                    path: page.source.clone(),
                    source,
                },
                other => other,
            })
    }

    /// Write the converted content of one declared page as JSON.
    pub fn dump_page(&self, id: PageId) -> Result<(), BuildError> {
        let page = self.env.nav.page(id);
        let (_, converted) = self.convert_page(id)?;
        let dump = PageJson {
            content: converted.html,
            title: page.title.clone(),
            url: page.url.clone(),
            language: "en",
        };
        let json = serde_json::to_string_pretty(&dump).map_err(|e| BuildError::Convert {
            path: page.source.clone(),
            message: e.to_string(),
        })?;
        let output = self.env.config.build.site_dir.join(&page.output);
        write_output(&output.with_extension("json"), &json)
    }

    /// Render `404.html` if the theme has one. Returns whether it was written.
    pub fn build_not_found(&self) -> Result<bool, BuildError> {
        if !self.env.templates.exists(NOT_FOUND_TEMPLATE) {
            log!("build"; "no {NOT_FOUND_TEMPLATE} template, skipping");
            return Ok(false);
        }
        let mut ctx = RenderContext::new(self.site.clone());
        ctx.set_output_url(&format!("/{NOT_FOUND_TEMPLATE}"));
        let output = self.env.config.build.site_dir.join(NOT_FOUND_TEMPLATE);
        self.render(&ctx, None, &PageContext::default(), NOT_FOUND_TEMPLATE, &output)?;
        Ok(true)
    }

    fn render(
        &self,
        ctx: &RenderContext,
        current: Option<PageId>,
        page: &PageContext,
        template: &str,
        output: &Path,
    ) -> Result<(), BuildError> {
        let global = ctx.global(self.env.nav, current);
        let recent: Vec<RecentPost> = self
            .excerpts
            .iter()
            .map(|e| e.for_page(&self.env, &ctx.doc))
            .collect();

        let html = self
            .env
            .templates
            .render(
                template,
                &TemplateContext {
                    global: &global,
                    page,
                    catalog: Some(self.catalog),
                    recent: &recent,
                },
            )
            .map_err(|e| BuildError::template(output.to_path_buf(), e))?;
        write_output(output, &html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SiteConfig, test_config};
    use crate::nav::NavGraph;
    use crate::pipeline::Templates;
    use std::fs;
    use tempfile::TempDir;

    fn setup(theme: &[(&str, &str)]) -> (TempDir, SiteConfig, NavGraph) {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(docs.join("guide")).unwrap();
        fs::create_dir_all(docs.join("img")).unwrap();
        fs::write(docs.join("index.md"), "# Welcome\n").unwrap();
        fs::write(docs.join("guide/intro.md"), "## Setup\n\n[home](../index.md)\n").unwrap();
        fs::write(
            docs.join("post.md"),
            "title: Post\ndate: 2024-02-02\n\nline one ![x](img/x.png)\n\nline two\n\nline three\n",
        )
        .unwrap();
        fs::write(docs.join("img/x.png"), "").unwrap();

        let mut extra = String::from("pages = [\"index.md\", \"guide/intro.md\"]\n[build]\nexcerpt_lines = 2\n");
        if !theme.is_empty() {
            fs::create_dir_all(dir.path().join("theme")).unwrap();
            for (name, body) in theme {
                fs::write(dir.path().join("theme").join(name), body).unwrap();
            }
            extra.push_str("theme_dir = \"theme\"\n");
        }
        let config = test_config(dir.path(), &extra);
        let nav = config.nav().unwrap();
        (dir, config, nav)
    }

    fn store() -> RecordStore {
        [(
            "post.md".to_string(),
            BuildRecord::new("Post", "2024-02-02", vec!["rust".to_string()]),
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_first_lines() {
        assert_eq!(first_lines("a\nb\nc\n", 2), "a\nb\n");
        assert_eq!(first_lines("a\nb", 5), "a\nb");
        assert_eq!(first_lines("a\nb", 0), "");
    }

    #[test]
    fn test_declared_pages_get_catalog_and_recent() {
        let theme = [(
            "base.html",
            "{{ page_title or 'home' }}|{{ current_page.url|safe }}|{% for p in recent %}{{ p.url|safe }}={{ p.excerpt|safe }}{% endfor %}|{{ catalog.rust[0].title }}|{% if next_page %}{{ next_page.url|safe }}{% endif %}",
        )];
        let (dir, config, nav) = setup(&theme);
        let templates = Templates::new(config.build.theme_dir.as_deref());
        let env = JobEnv::new(&config, &nav, &templates);
        let site = SiteValues::from_config(&config, &nav);
        let store = store();
        let catalog = Catalog::from_records(store.iter());
        let excerpts = Excerpt::load_recent(&env, &store);

        let report = PageBuilder::new(env, &site, &catalog, &excerpts).build_all();
        assert_eq!(report.built, 2);
        assert!(report.failures.is_empty());

        let index = fs::read_to_string(dir.path().join("site/index.html")).unwrap();
        assert!(index.starts_with("home|index.html|post.html="), "{index}");
        assert!(index.contains(r#"src="img/x.png""#));
        assert!(!index.contains("line two"));
        assert!(index.ends_with("|Post|guide/intro.html"));

        let intro = fs::read_to_string(dir.path().join("site/guide/intro.html")).unwrap();
        assert!(intro.starts_with("Intro|intro.html|../post.html="), "{intro}");
        assert!(intro.contains(r#"src="../img/x.png""#));
    }

    #[test]
    fn test_not_found_page_optional() {
        let (dir, config, nav) = setup(&[]);
        let templates = Templates::new(None);
        let env = JobEnv::new(&config, &nav, &templates);
        let site = SiteValues::from_config(&config, &nav);
        let catalog = Catalog::default();
        let builder = PageBuilder::new(env, &site, &catalog, &[]);
        assert!(!builder.build_not_found().unwrap());

        let (dir2, config2, nav2) = setup(&[("404.html", "missing: {{ homepage_url }}")]);
        let templates = Templates::new(config2.build.theme_dir.as_deref());
        let env = JobEnv::new(&config2, &nav2, &templates);
        let site = SiteValues::from_config(&config2, &nav2);
        let builder = PageBuilder::new(env, &site, &catalog, &[]);
        assert!(builder.build_not_found().unwrap());
        assert_eq!(
            fs::read_to_string(dir2.path().join("site/404.html")).unwrap(),
            "missing: index.html"
        );
        assert!(!dir.path().join("site/404.html").exists());
    }

    #[test]
    fn test_missing_declared_page_is_skipped() {
        let (dir, config, nav) = setup(&[]);
        fs::remove_file(dir.path().join("docs/guide/intro.md")).unwrap();
        let templates = Templates::new(None);
        let env = JobEnv::new(&config, &nav, &templates);
        let site = SiteValues::from_config(&config, &nav);
        let catalog = Catalog::default();

        let report = PageBuilder::new(env, &site, &catalog, &[]).build_all();
        assert_eq!(report.built, 1);
        assert_eq!(report.skipped, [PathBuf::from("guide/intro.md")]);
    }

    #[test]
    fn test_dump_writes_json_instead_of_html() {
        let (dir, config, nav) = setup(&[]);
        let templates = Templates::new(None);
        let env = JobEnv::new(&config, &nav, &templates);
        let site = SiteValues::from_config(&config, &nav);
        let catalog = Catalog::default();

        let report = PageBuilder::new(env, &site, &catalog, &[]).dump_all();
        assert_eq!(report.built, 2);
        assert!(!dir.path().join("site/guide/intro.html").exists());

        let json = fs::read_to_string(dir.path().join("site/guide/intro.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "Intro");
        assert_eq!(value["url"], "/guide/intro.html");
        assert_eq!(value["language"], "en");
        assert!(value["content"].as_str().unwrap().contains(r#"href="../index.html""#));
    }
}
