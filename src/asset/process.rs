//! Media copying (side effects).

use rayon::prelude::*;
use std::fs;
use std::io;

use crate::freshness::is_newer_than;
use crate::log;

use super::MediaRoute;

/// Copy one media file unless the output is already up to date.
///
/// Returns `true` if the file was copied.
pub fn copy_media(route: &MediaRoute, clean: bool) -> io::Result<bool> {
    if !clean && route.output.exists() && !is_newer_than(&route.source, &route.output) {
        return Ok(false);
    }
    if let Some(parent) = route.output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&route.source, &route.output)?;
    crate::debug!("media"; "{}", route.rel.display());
    Ok(true)
}

/// Copy all media in parallel. Failures are logged and counted.
///
/// Returns `(copied, failed)`.
pub fn copy_all(routes: &[MediaRoute], clean: bool) -> (usize, usize) {
    routes
        .par_iter()
        .map(|route| match copy_media(route, clean) {
            Ok(copied) => (usize::from(copied), 0),
            Err(e) => {
                log!("error"; "failed to copy `{}`: {e}", route.rel.display());
                (0, 1)
            }
        })
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1))
}
