//! Concurrent incremental build of undeclared documents.
//!
//! - [`scheduler`]: fixed worker pool, work queue and result map
//! - [`job`]: one document from source to written HTML
//! - [`context`]: per-worker render state and template values

pub mod context;
mod error;
pub mod job;
pub mod scheduler;

pub use context::{PageContext, RenderContext, SiteValues, TemplateContext};
pub use error::BuildError;
pub use job::JobEnv;
pub use scheduler::{BuildReport, Failure, Scheduler, worker_count};
