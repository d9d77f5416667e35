// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON route table consumed by the edge proxy

use super::{EdgeRouterAdapter, RouterError};
use crate::subprocess::{combined_output, run_with_timeout, RELOAD_TIMEOUT};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;

/// Route table stored as a JSON object of `host -> url`.
///
/// Writes are atomic (tmp + rename). `apply` runs the optional reload command.
#[derive(Clone)]
pub struct FileEdgeRouter {
    path: PathBuf,
    reload_command: Option<String>,
    lock: Arc<Mutex<()>>,
}

impl FileEdgeRouter {
    pub fn new(path: impl Into<PathBuf>, reload_command: Option<String>) -> Self {
        Self {
            path: path.into(),
            reload_command,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Current route table (empty when the file does not exist yet).
    pub fn routes(&self) -> Result<BTreeMap<String, String>, RouterError> {
        load_table(&self.path)
    }

    fn update(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<bool, RouterError> {
        let _guard = self.lock.lock();
        let mut table = load_table(&self.path)?;
        let changed = f(&mut table);
        if changed {
            save_table(&self.path, &table)?;
        }
        Ok(changed)
    }
}

#[async_trait]
impl EdgeRouterAdapter for FileEdgeRouter {
    async fn add_route(&self, host: &str, url: &str) -> Result<bool, RouterError> {
        let changed = self.update(|table| {
            if table.get(host).map(String::as_str) == Some(url) {
                return false;
            }
            table.insert(host.to_string(), url.to_string());
            true
        })?;
        tracing::info!(host, url, changed, "route set");
        Ok(changed)
    }

    async fn remove_route(&self, host: &str) -> Result<bool, RouterError> {
        let changed = self.update(|table| table.remove(host).is_some())?;
        tracing::info!(host, changed, "route removed");
        Ok(changed)
    }

    async fn apply(&self) -> Result<(), RouterError> {
        let Some(ref command) = self.reload_command else {
            return Ok(());
        };
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        let output = run_with_timeout(cmd, RELOAD_TIMEOUT, "route reload")
            .await
            .map_err(RouterError::ReloadFailed)?;
        if !output.status.success() {
            return Err(RouterError::ReloadFailed(combined_output(&output)));
        }
        Ok(())
    }
}

fn load_table(path: &Path) -> Result<BTreeMap<String, String>, RouterError> {
    match std::fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
        Ok(content) => serde_json::from_str(&content)
            .map_err(|e| RouterError::Table(format!("{}: {}", path.display(), e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(RouterError::Table(format!("{}: {}", path.display(), e))),
    }
}

fn save_table(path: &Path, table: &BTreeMap<String, String>) -> Result<(), RouterError> {
    let err = |e: std::io::Error| RouterError::Table(format!("{}: {}", path.display(), e));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(err)?;
    }
    let body = serde_json::to_vec_pretty(table).map_err(|e| RouterError::Table(e.to_string()))?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, body).map_err(err)?;
    std::fs::rename(&tmp, path).map_err(err)?;
    Ok(())
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
