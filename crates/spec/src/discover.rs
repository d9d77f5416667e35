// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! App spec discovery

use crate::model::AppSpec;
use crate::parser::{load_app_spec, Format};
use std::path::{Path, PathBuf};

/// File stem of a spec nested one level down (`<dir>/<app>/keel.toml`)
const NESTED_SPEC_STEM: &str = "keel";

/// A deployable spec found on disk.
#[derive(Debug, Clone)]
pub struct DiscoveredApp {
    pub path: PathBuf,
    pub spec: AppSpec,
}

/// Result of scanning a directory.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Specs with `deploy = true`, sorted by path
    pub apps: Vec<DiscoveredApp>,
    /// Files that failed to load, with the error message
    pub skipped: Vec<(PathBuf, String)>,
}

/// Scan `dir` for spec files and keep those opted in to deployment.
///
/// Looks at spec files directly in `dir` plus `keel.*` one level down.
/// Unparsable files are reported in [`Discovery::skipped`], not returned as errors.
pub fn discover_apps(dir: &Path) -> Result<Discovery, std::io::Error> {
    let mut discovery = Discovery::default();
    if !dir.exists() {
        return Ok(discovery);
    }

    for path in collect_spec_files(dir)? {
        match load_app_spec(&path) {
            Ok(spec) if spec.deploy => discovery.apps.push(DiscoveredApp { path, spec }),
            Ok(spec) => {
                tracing::debug!(path = %path.display(), app = %spec.name, "skipping spec without deploy flag");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping invalid spec");
                discovery.skipped.push((path, e.to_string()));
            }
        }
    }
    Ok(discovery)
}

fn collect_spec_files(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            for nested in std::fs::read_dir(&path)?.flatten() {
                let nested = nested.path();
                let is_spec_stem =
                    nested.file_stem().and_then(|s| s.to_str()) == Some(NESTED_SPEC_STEM);
                if nested.is_file() && is_spec_stem && Format::for_path(&nested).is_some() {
                    files.push(nested);
                }
            }
        } else if Format::for_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "discover_tests.rs"]
mod tests;
