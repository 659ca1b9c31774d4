//! Site building orchestration.
//!
//! Build pipeline phases:
//! - **Prepare** - navigation graph, templates, `--clean`
//! - **Scan** - stale documents by output mtime
//! - **Compile** - worker pool over the stale set
//! - **Record** - merge results into the record store and persist it
//! - **Pages** - declared pages with catalog and recent posts, optional 404
//! - **Media** - copy non-markup files into the site dir

use anyhow::{Context, Result, anyhow, bail};
use std::error::Error;
use std::path::Path;

use crate::{
    asset::{copy_all, scan_media},
    cache::RecordStore,
    compiler::{BuildReport, Failure, JobEnv, Scheduler, SiteValues, worker_count},
    config::SiteConfig,
    core::{is_markup_file, is_shutdown},
    freshness::StalenessDetector,
    generator::{Catalog, Excerpt, PageBuilder},
    log,
    nav::NavGraph,
    pipeline::Templates,
    utils::{
        path::{clear_dir, has_visible_entries},
        plural_count,
    },
};

/// Counters of a finished build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub built: usize,
    pub fresh: usize,
    pub skipped: usize,
    pub pages: usize,
    pub media: usize,
    pub pruned: usize,
}

/// Build the site.
///
/// Pipeline: prepare -> scan -> compile -> record -> pages -> media
pub fn build_site(config: &SiteConfig) -> Result<BuildSummary> {
    let nav = config.nav().context("invalid page declarations")?;
    let templates = Templates::new(config.build.theme_dir.as_deref());
    prepare_site_dir(config)?;

    let scan = StalenessDetector::new(config, &nav)
        .scan()
        .with_context(|| format!("failed to scan `{}`", config.build.docs_dir.display()))?;
    log!("build"; "{} stale, {} fresh",
        plural_count(scan.stale.len(), "document"), scan.fresh.len());

    let env = JobEnv::new(config, &nav, &templates);
    let site = SiteValues::from_config(config, &nav);
    let workers = worker_count(config.build.jobs);
    let report = Scheduler::new(env, &site, workers).run(scan.stale);

    let mut summary = BuildSummary {
        built: report.records.len(),
        fresh: scan.fresh.len(),
        skipped: report.skipped.len(),
        ..BuildSummary::default()
    };

    let store = update_records(config, &nav, &report, &mut summary)?;
    check_compile(&report)?;

    let catalog = Catalog::from_records(store.iter());
    let excerpts = Excerpt::load_recent(&env, &store);
    let builder = PageBuilder::new(env, &site, &catalog, &excerpts);
    let pages = builder.build_all();
    summary.pages = pages.built;
    summary.skipped += pages.skipped.len();

    let mut failures = report.failures;
    failures.extend(pages.failures);
    if let Err(error) = builder.build_not_found() {
        failures.push(Failure {
            path: "404.html".into(),
            error,
        });
    }

    let (copied, failed_media) = copy_all(&scan_media(config), config.build.clean);
    summary.media = copied;

    if !failures.is_empty() || failed_media > 0 {
        print_failures(&failures);
        bail!(
            "build failed: {}, {}",
            plural_count(failures.len(), "document"),
            plural_count(failed_media, "media file")
        );
    }

    log!("build"; "done: {} built, {} pages, {} copied",
        plural_count(summary.built, "document"), summary.pages, plural_count(summary.media, "file"));
    Ok(summary)
}

/// Empty the site dir on `--clean`, otherwise note leftover output.
fn prepare_site_dir(config: &SiteConfig) -> Result<()> {
    let site_dir = &config.build.site_dir;
    if config.build.clean {
        let removed = clear_dir(site_dir)
            .with_context(|| format!("failed to clear `{}`", site_dir.display()))?;
        crate::debug!("build"; "removed {} from site dir", plural_count(removed, "entry"));
    } else if has_visible_entries(site_dir) {
        log!("build"; "`{}` holds a previous build, rebuilding stale documents only",
            site_dir.display());
    }
    Ok(())
}

/// Merge new records, drop records of deleted documents and persist.
fn update_records(
    config: &SiteConfig,
    nav: &NavGraph,
    report: &BuildReport,
    summary: &mut BuildSummary,
) -> Result<RecordStore> {
    let path = config.record_path();
    let docs_dir = &config.build.docs_dir;

    let mut store = RecordStore::load(&path);
    store.merge(report.records.clone());
    summary.pruned = store.retain(|doc| {
        let doc = Path::new(doc);
        is_markup_file(doc) && !nav.is_declared(doc) && docs_dir.join(doc).is_file()
    });
    if summary.pruned > 0 {
        crate::debug!("record"; "dropped {} of deleted documents", plural_count(summary.pruned, "record"));
    }

    store
        .save(&path)
        .with_context(|| format!("failed to write `{}`", path.display()))?;
    Ok(store)
}

/// Stop before declared pages on a fatal error or an interrupted run.
fn check_compile(report: &BuildReport) -> Result<()> {
    if let Some(fatal) = report.fatal() {
        print_failures(&report.failures);
        return Err(anyhow!("{}", fatal.error).context("build aborted"));
    }
    if report.remaining > 0 && is_shutdown() {
        bail!("interrupted, {} left", plural_count(report.remaining, "document"));
    }
    Ok(())
}

fn print_failures(failures: &[Failure]) {
    for failure in failures {
        let mut message = failure.error.to_string();
        let mut source = failure.error.source();
        while let Some(err) = source {
            message.push_str(&format!(": {err}"));
            source = err.source();
        }
        log!("error"; "{}: {message}", failure.path.display());
    }
}
