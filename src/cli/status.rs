//! `inkpost status`: list what the next build would compile.

use anyhow::{Context, Result};

use crate::{
    config::SiteConfig,
    core::path::to_posix,
    freshness::{StaleScan, StalenessDetector},
    log,
    utils::plural_count,
};

/// Print stale documents without building anything.
pub fn show_status(config: &SiteConfig) -> Result<StaleScan> {
    let nav = config.nav().context("invalid page declarations")?;
    let scan = StalenessDetector::new(config, &nav)
        .scan()
        .with_context(|| format!("failed to scan `{}`", config.build.docs_dir.display()))?;

    for path in &scan.stale {
        println!("  {}", to_posix(path));
    }
    log!("status"; "{} stale, {} up to date, {} declared",
        plural_count(scan.stale.len(), "document"), scan.fresh.len(), nav.len());
    Ok(scan)
}
