//! `inkpost new`: scaffold a project.
//!
//! Writes `inkpost.toml` and `docs/index.md`. An existing config file aborts
//! the command; an existing `docs/index.md` is kept.

use anyhow::{Context, Result, bail};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::log;

/// Default config filename
pub const CONFIG_FILE: &str = "inkpost.toml";

const INDEX_TEXT: &str = "\
# Welcome to inkpost

## Commands

* `inkpost new <dir>` - Create a new project.
* `inkpost build` - Build stale documents and the declared pages.
* `inkpost status` - List documents the next build would compile.
* `inkpost json` - Write the declared pages as JSON.

## Project layout

    inkpost.toml   # The configuration file.
    docs/
        index.md   # The homepage.
        ...        # Posts, pages, images and other files.
";

fn config_text() -> String {
    format!(
        "# inkpost configuration file (v{})\n\n\
         pages = [\"index.md\"]\n\n\
         [site]\n\
         name = \"My Blog\"\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Create a project in `dir`, creating the directory when missing.
/// Returns the path of the written config file.
pub fn new_project(dir: &Path) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() {
        bail!("project already exists: `{}`", config_path.display());
    }

    let docs_dir = dir.join("docs");
    fs::create_dir_all(&docs_dir)
        .with_context(|| format!("failed to create `{}`", docs_dir.display()))?;

    log!("new"; "writing {}", config_path.display());
    fs::write(&config_path, config_text())
        .with_context(|| format!("failed to write `{}`", config_path.display()))?;

    let index_path = docs_dir.join("index.md");
    if !index_path.exists() {
        log!("new"; "writing {}", index_path.display());
        fs::write(&index_path, INDEX_TEXT)
            .with_context(|| format!("failed to write `{}`", index_path.display()))?;
    }
    Ok(config_path)
}
