//! Page templates (minijinja).
//!
//! Templates are looked up in `build.theme_dir` first, then in the embedded
//! default theme. The environment is shared read-only by every worker.

use minijinja::{Environment, ErrorKind};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::embed::theme;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template `{0}` not found")]
    NotFound(String),

    #[error("failed to render template `{name}`")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

impl TemplateError {
    fn from_minijinja(name: &str, err: minijinja::Error) -> Self {
        if err.kind() == ErrorKind::TemplateNotFound {
            Self::NotFound(name.to_string())
        } else {
            Self::Render {
                name: name.to_string(),
                source: err,
            }
        }
    }
}

/// Named templates, rendered against any `Serialize` context.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new(theme_dir: Option<&Path>) -> Self {
        let mut env = Environment::new();
        let theme = theme_dir.map(minijinja::path_loader);
        env.set_loader(move |name| {
            if let Some(load) = &theme
                && let Some(source) = load(name)?
            {
                return Ok(Some(source));
            }
            Ok(theme::get(name).map(str::to_string))
        });
        Self { env }
    }

    /// Check that a template can be loaded without rendering it.
    pub fn exists(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: &S) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| TemplateError::from_minijinja(name, e))?;
        template
            .render(ctx)
            .map_err(|e| TemplateError::from_minijinja(name, e))
    }
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Ctx<'a> {
        site_name: &'a str,
        content: &'a str,
    }

    #[test]
    fn test_embedded_fallback() {
        let templates = Templates::new(None);
        assert!(templates.exists("base.html"));
        let html = templates
            .render(
                "base.html",
                &Ctx {
                    site_name: "Blog <1>",
                    content: "<p>hi</p>",
                },
            )
            .unwrap();
        assert!(html.contains("<p>hi</p>"));
        assert!(html.contains("Blog &lt;1&gt;"));
    }

    #[test]
    fn test_theme_overrides_embedded() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("base.html"), "theme: {{ site_name }}").unwrap();
        fs::write(dir.path().join("post.html"), "post: {{ content }}").unwrap();

        let templates = Templates::new(Some(dir.path()));
        let ctx = Ctx {
            site_name: "Blog",
            content: "body",
        };
        assert_eq!(templates.render("base.html", &ctx).unwrap(), "theme: Blog");
        assert_eq!(templates.render("post.html", &ctx).unwrap(), "post: body");
    }

    #[test]
    fn test_not_found() {
        let templates = Templates::new(None);
        assert!(!templates.exists("404.html"));
        let err = templates.render("404.html", &()).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(name) if name == "404.html"));
    }

    #[test]
    fn test_render_error_is_distinct() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.html"), "{{ missing.field.deep }}").unwrap();
        let mut templates = Templates::new(Some(dir.path()));
        templates.env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        let err = templates.render("bad.html", &()).unwrap_err();
        assert!(matches!(err, TemplateError::Render { .. }));
    }
}
