//! Build errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::{LinkError, TemplateError};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("source `{}` not found", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("`{document}` links to `{target}` which does not exist")]
    BrokenLink { document: String, target: String },

    #[error("template `{name}` not found")]
    TemplateNotFound { name: String },

    #[error("failed to render `{}`", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },

    #[error("failed to convert `{}`: {message}", path.display())]
    Convert { path: PathBuf, message: String },

    #[error("IO error on `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    /// Errors that stop the whole build rather than one document.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::BrokenLink { .. } | Self::TemplateNotFound { .. })
    }

    pub(crate) fn template(path: PathBuf, err: TemplateError) -> Self {
        match err {
            TemplateError::NotFound(name) => Self::TemplateNotFound { name },
            source => Self::Render { path, source },
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<LinkError> for BuildError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Broken { document, target } => Self::BrokenLink { document, target },
        }
    }
}
