//! A single document build job.
//!
//! read source → convert (links rewritten per event) → extract metadata → render → write

use std::fs;
use std::io;
use std::path::Path;

use super::context::{PageContext, RenderContext, TemplateContext};
use super::error::BuildError;
use crate::cache::{BuildRecord, PLACEHOLDER_TAG};
use crate::config::SiteConfig;
use crate::core::path::{to_output_path, to_posix, to_site_url};
use crate::log;
use crate::nav::{NavGraph, filename_to_title};
use crate::pipeline::{LinkRewriter, MarkdownOptions, Meta, Templates, markdown};
use crate::utils::date::{PLACEHOLDER_DATE, normalize_date};

/// Read-only state shared by every worker.
#[derive(Debug, Clone, Copy)]
pub struct JobEnv<'a> {
    pub config: &'a SiteConfig,
    pub nav: &'a NavGraph,
    pub templates: &'a Templates,
    pub markdown: MarkdownOptions,
}

impl<'a> JobEnv<'a> {
    pub fn new(config: &'a SiteConfig, nav: &'a NavGraph, templates: &'a Templates) -> Self {
        Self {
            config,
            nav,
            templates,
            markdown: config.markdown_options(),
        }
    }

    pub fn rewriter(&self) -> LinkRewriter<'a> {
        LinkRewriter::new(&self.config.build.docs_dir, self.config.build.strict)
    }
}

/// Metadata of one document, with placeholders filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub template: Option<String>,
    pub description: Option<String>,
}

impl DocumentMeta {
    /// Title: `title` meta, else the first `<h1>`, else the file name.
    /// Date: normalized `date` meta, else the placeholder date.
    /// Tags: every `tags` value split on commas, else the placeholder tag.
    pub fn extract(meta: &Meta, heading: Option<&str>, source: &Path) -> Self {
        let first = |key: &str| {
            meta.get(key)
                .and_then(|v| v.first())
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
        };

        let title = first("title")
            .or(heading)
            .map(str::to_string)
            .unwrap_or_else(|| {
                let name = source
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_default();
                filename_to_title(&name)
            });

        let date = match first("date") {
            Some(raw) => normalize_date(raw).unwrap_or_else(|| {
                log!("warning"; "`{}`: unrecognized date `{raw}`", to_posix(source));
                PLACEHOLDER_DATE.to_string()
            }),
            None => PLACEHOLDER_DATE.to_string(),
        };

        let mut tags: Vec<String> = meta
            .get("tags")
            .into_iter()
            .flatten()
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if tags.is_empty() {
            tags.push(PLACEHOLDER_TAG.to_string());
        }

        Self {
            title,
            date,
            tags,
            template: first("template").map(str::to_string),
            description: first("description").map(str::to_string),
        }
    }

    pub fn into_record(self) -> BuildRecord {
        BuildRecord::new(self.title, self.date, self.tags)
    }
}

/// Read a source document as UTF-8.
pub fn read_source(docs_dir: &Path, source: &Path) -> Result<String, BuildError> {
    let path = docs_dir.join(source);
    let bytes = fs::read(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BuildError::SourceNotFound {
            path: source.to_path_buf(),
        },
        _ => BuildError::io(&path, e),
    })?;
    String::from_utf8(bytes).map_err(|_| BuildError::Convert {
        path: source.to_path_buf(),
        message: "not valid UTF-8".to_string(),
    })
}

/// Write rendered HTML, creating parent directories.
pub fn write_output(path: &Path, html: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    fs::write(path, html).map_err(|e| BuildError::io(path, e))
}

/// Build one undeclared document and return its record.
pub fn build_document(
    env: &JobEnv<'_>,
    ctx: &mut RenderContext,
    source: &Path,
) -> Result<BuildRecord, BuildError> {
    let build = &env.config.build;
    let text = read_source(&build.docs_dir, source)?;
    ctx.set_source(source);

    let rewriter = env.rewriter();
    let mut broken = Vec::new();
    let converted = markdown::convert(&text, env.markdown, |event| {
        rewriter.rewrite_event(event, &ctx.doc, &mut broken)
    })?;
    for target in &broken {
        log!("warning"; "`{}` links to `{target}` which does not exist", to_posix(source));
    }

    let meta = DocumentMeta::extract(&converted.meta, converted.title.as_deref(), source);
    let template = meta
        .template
        .clone()
        .unwrap_or_else(|| build.default_template.clone());

    let page = PageContext {
        page_title: Some(meta.title.clone()),
        page_description: meta.description.clone(),
        page_date: Some(meta.date.clone()),
        page_tags: meta.tags.clone(),
        content: converted.html,
        meta: converted.meta,
        canonical_url: ctx.site().canonical_url(&to_site_url(source)),
        ..PageContext::default()
    };
    let global = ctx.global(env.nav, None);
    let html = env
        .templates
        .render(
            &template,
            &TemplateContext {
                global: &global,
                page: &page,
                catalog: None,
                recent: &[],
            },
        )
        .map_err(|e| BuildError::template(source.to_path_buf(), e))?;

    write_output(&build.site_dir.join(to_output_path(source)), &html)?;
    Ok(meta.into_record())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::context::SiteValues;
    use crate::config::test_config;
    use crate::pipeline::markdown::split_meta;
    use tempfile::TempDir;

    fn extract(source: &str, heading: Option<&str>, file: &str) -> DocumentMeta {
        let (meta, _) = split_meta(source);
        DocumentMeta::extract(&meta, heading, Path::new(file))
    }

    #[test]
    fn test_extract_full_meta() {
        let meta = extract(
            "Title: Parsing\nDate: 2024/06/15\nTags: rust, parsing\n    web\nTemplate: post.html\n\n",
            Some("Heading"),
            "parsing.md",
        );
        assert_eq!(meta.title, "Parsing");
        assert_eq!(meta.date, "2024-06-15");
        assert_eq!(meta.tags, ["rust", "parsing", "web"]);
        assert_eq!(meta.template.as_deref(), Some("post.html"));
    }

    #[test]
    fn test_extract_placeholders() {
        let meta = extract("no metadata here\n", None, "my-first_post.md");
        assert_eq!(meta.title, "My first post");
        assert_eq!(meta.date, PLACEHOLDER_DATE);
        assert_eq!(meta.tags, [PLACEHOLDER_TAG]);
        assert_eq!(meta.template, None);

        let meta = extract("date: someday\n\n", Some("From H1"), "x.md");
        assert_eq!(meta.title, "From H1");
        assert_eq!(meta.date, PLACEHOLDER_DATE);
    }

    #[test]
    fn test_build_document_writes_output() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(docs.join("img")).unwrap();
        fs::write(docs.join("img/x.png"), "").unwrap();
        fs::write(
            docs.join("post.md"),
            "title: Post\ndate: 2024-01-02\n\n# Hello\n\n![x](img/x.png)\n",
        )
        .unwrap();

        let config = test_config(dir.path(), r#"pages = ["index.md"]"#);
        let nav = config.nav().unwrap();
        let templates = Templates::new(None);
        let env = JobEnv::new(&config, &nav, &templates);
        let mut ctx = RenderContext::new(SiteValues::from_config(&config, &nav));

        let record = build_document(&env, &mut ctx, Path::new("post.md")).unwrap();
        assert_eq!(record.title, "Post");
        assert_eq!(record.date, "2024-01-02");

        let html = fs::read_to_string(dir.path().join("site/post.html")).unwrap();
        assert!(html.contains(r#"src="img/x.png""#));
        assert!(html.contains("<title>Post - Test</title>"));
    }

    #[test]
    fn test_build_document_missing_source() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        let config = test_config(dir.path(), "");
        let nav = config.nav().unwrap();
        let templates = Templates::new(None);
        let env = JobEnv::new(&config, &nav, &templates);
        let mut ctx = RenderContext::new(SiteValues::from_config(&config, &nav));

        let err = build_document(&env, &mut ctx, Path::new("gone.md")).unwrap_err();
        assert!(matches!(err, BuildError::SourceNotFound { .. }));
    }
}
