//! Fixed-size worker pool for document builds.
//!
//! ```text
//!            ┌──────────── WorkQueue (Mutex<Vec>) ────────────┐
//!            │                                                │
//!   worker 0 ─ pop → build → insert ─┐     failures ──► crossbeam channel
//!   worker 1 ─ pop → build → insert ─┼──► ResultMap (Mutex<BTreeMap>)
//!   worker N ─ pop → build → insert ─┘
//! ```
//!
//! Each worker owns its [`RenderContext`]. Workers stop when the queue is
//! empty or the stop flag is set; the flag is raised by fatal errors and by
//! Ctrl+C.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam::channel::{self, Sender};
use parking_lot::Mutex;

use super::context::{RenderContext, SiteValues};
use super::error::BuildError;
use super::job::{JobEnv, build_document};
use crate::cache::BuildRecord;
use crate::core::{is_shutdown, path::to_posix};
use crate::log;
use crate::logger::ProgressLine;

/// Worker count when available parallelism is unknown.
const FALLBACK_WORKERS: usize = 4;

/// Pool size: explicit override, else available parallelism.
pub fn worker_count(jobs: Option<usize>) -> usize {
    jobs.filter(|&n| n > 0).unwrap_or_else(|| {
        thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(FALLBACK_WORKERS)
    })
}

// =============================================================================
// Shared state
// =============================================================================

/// Pending source paths. Pops come out in ascending path order.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<Vec<PathBuf>>,
}

impl WorkQueue {
    pub fn new(mut paths: Vec<PathBuf>) -> Self {
        paths.sort_unstable_by(|a, b| b.cmp(a));
        Self {
            items: Mutex::new(paths),
        }
    }

    #[cfg(test)]
    pub fn push(&self, path: PathBuf) {
        self.items.lock().push(path);
    }

    pub fn pop(&self) -> Option<PathBuf> {
        self.items.lock().pop()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }
}

/// Finished records keyed by docs-relative path. Each key is written once.
#[derive(Debug, Default)]
pub struct ResultMap {
    records: Mutex<BTreeMap<String, BuildRecord>>,
}

impl ResultMap {
    /// Insert a record. A second insert for the same key is rejected.
    pub fn insert(&self, key: String, record: BuildRecord) -> bool {
        let mut records = self.records.lock();
        if records.contains_key(&key) {
            log!("warning"; "duplicate result for `{key}` ignored");
            return false;
        }
        records.insert(key, record);
        true
    }

    pub fn into_inner(self) -> BTreeMap<String, BuildRecord> {
        self.records.into_inner()
    }
}

// =============================================================================
// Report
// =============================================================================

/// A document that failed to build.
#[derive(Debug)]
pub struct Failure {
    pub path: PathBuf,
    pub error: BuildError,
}

/// Outcome of one scheduler run.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub records: BTreeMap<String, BuildRecord>,
    pub failures: Vec<Failure>,
    /// Sources that disappeared before they were built.
    pub skipped: Vec<PathBuf>,
    /// Jobs left in the queue when the run stopped early.
    pub remaining: usize,
}

impl BuildReport {
    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.remaining == 0
    }

    pub fn fatal(&self) -> Option<&Failure> {
        self.failures.iter().find(|f| f.error.is_fatal())
    }
}

enum Outcome {
    Failed(Failure),
    Skipped(PathBuf),
}

// =============================================================================
// Scheduler
// =============================================================================

pub struct Scheduler<'a> {
    env: JobEnv<'a>,
    site: &'a SiteValues,
    workers: usize,
    stop: AtomicBool,
}

impl<'a> Scheduler<'a> {
    pub fn new(env: JobEnv<'a>, site: &'a SiteValues, workers: usize) -> Self {
        Self {
            env,
            site,
            workers: workers.max(1),
            stop: AtomicBool::new(false),
        }
    }

    /// Ask workers to stop after their current job.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::SeqCst) || is_shutdown()
    }

    /// Build every path and wait for all workers.
    pub fn run(&self, paths: Vec<PathBuf>) -> BuildReport {
        let total = paths.len();
        let queue = WorkQueue::new(paths);
        let results = ResultMap::default();
        let (tx, rx) = channel::unbounded();
        let progress = ProgressLine::new(&[("posts", total)]);
        let workers = self.workers.min(total.max(1));

        crate::debug!("build"; "{} documents on {} workers", total, workers);

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                scope.spawn(|| self.worker(&queue, &results, &progress, tx));
            }
        });
        drop(tx);
        progress.finish();

        let mut report = BuildReport {
            records: results.into_inner(),
            remaining: queue.len(),
            ..BuildReport::default()
        };
        for outcome in rx.try_iter() {
            match outcome {
                Outcome::Failed(failure) => report.failures.push(failure),
                Outcome::Skipped(path) => report.skipped.push(path),
            }
        }
        report.failures.sort_by(|a, b| a.path.cmp(&b.path));
        report.skipped.sort();
        report
    }

    fn worker(
        &self,
        queue: &WorkQueue,
        results: &ResultMap,
        progress: &ProgressLine,
        tx: Sender<Outcome>,
    ) {
        let mut ctx = RenderContext::new(self.site.clone());

        while !self.should_stop() {
            let Some(path) = queue.pop() else {
                break;
            };
            match build_document(&self.env, &mut ctx, &path) {
                Ok(record) => {
                    results.insert(key(&path), record);
                }
                Err(BuildError::SourceNotFound { path }) => {
                    log!("warning"; "`{}` disappeared, skipping", path.display());
                    tx.send(Outcome::Skipped(path)).ok();
                }
                Err(error) => {
                    if error.is_fatal() {
                        self.stop();
                    }
                    tx.send(Outcome::Failed(Failure { path, error })).ok();
                }
            }
            progress.inc("posts");
        }
    }
}

/// Result map key for a source path.
pub fn key(path: &Path) -> String {
    to_posix(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SiteConfig, test_config};
    use crate::nav::NavGraph;
    use crate::pipeline::Templates;
    use std::fs;
    use tempfile::TempDir;

    fn site(posts: usize) -> (TempDir, SiteConfig, NavGraph) {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        for i in 0..posts {
            fs::write(
                docs.join(format!("post-{i:02}.md")),
                format!("title: Post {i}\ndate: 2024-01-{:02}\ntags: t{}\n\nBody {i}\n", i + 1, i % 3),
            )
            .unwrap();
        }
        let config = test_config(dir.path(), r#"pages = ["index.md"]"#);
        let nav = config.nav().unwrap();
        (dir, config, nav)
    }

    fn run(config: &SiteConfig, nav: &NavGraph, workers: usize, paths: Vec<PathBuf>) -> BuildReport {
        let templates = Templates::new(None);
        let values = SiteValues::from_config(config, nav);
        let env = JobEnv::new(config, nav, &templates);
        Scheduler::new(env, &values, workers).run(paths)
    }

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("post-{i:02}.md"))).collect()
    }

    #[test]
    fn test_work_queue_order() {
        let queue = WorkQueue::new(vec!["b.md".into(), "a.md".into(), "c.md".into()]);
        assert_eq!(queue.pop(), Some(PathBuf::from("a.md")));
        queue.push("z.md".into());
        assert_eq!(queue.pop(), Some(PathBuf::from("z.md")));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_result_map_write_once() {
        let map = ResultMap::default();
        let record = BuildRecord::new("A", "2024-01-01", vec![]);
        assert!(map.insert("a.md".into(), record.clone()));
        assert!(!map.insert("a.md".into(), BuildRecord::new("B", "2024-01-01", vec![])));
        assert_eq!(map.into_inner()["a.md"], record);
    }

    #[test]
    fn test_worker_count() {
        assert_eq!(worker_count(Some(3)), 3);
        assert!(worker_count(None) >= 1);
        assert!(worker_count(Some(0)) >= 1);
    }

    #[test]
    fn test_one_vs_many_workers_identical() {
        let (_dir, config, nav) = site(12);
        let single = run(&config, &nav, 1, paths(12));
        let many = run(&config, &nav, 6, paths(12));

        assert!(single.is_success());
        assert!(many.is_success());
        assert_eq!(single.records.len(), 12);
        assert_eq!(single.records, many.records);
        assert_eq!(single.records["post-03.md"].title, "Post 3");
    }

    #[test]
    fn test_missing_source_is_skipped() {
        let (_dir, config, nav) = site(2);
        let mut list = paths(2);
        list.push(PathBuf::from("gone.md"));

        let report = run(&config, &nav, 2, list);
        assert!(report.failures.is_empty());
        assert_eq!(report.skipped, [PathBuf::from("gone.md")]);
        assert_eq!(report.records.len(), 2);
    }

    #[test]
    fn test_missing_template_stops_build() {
        let (dir, config, nav) = site(0);
        fs::write(
            dir.path().join("docs/a.md"),
            "template: nope.html\n\nbody\n",
        )
        .unwrap();

        let report = run(&config, &nav, 1, vec![PathBuf::from("a.md")]);
        let fatal = report.fatal().unwrap();
        assert!(matches!(&fatal.error, BuildError::TemplateNotFound { name } if name == "nope.html"));
        assert!(!report.is_success());
    }
}
