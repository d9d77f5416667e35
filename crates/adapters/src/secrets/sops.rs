// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! sops-encrypted secrets files

use super::{SecretsAdapter, SecretsError};
use crate::subprocess::{combined_output, run_with_timeout, SECRETS_TIMEOUT};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Decrypts `<dir>/<app>.enc.json` with the `sops` CLI.
#[derive(Clone, Debug)]
pub struct SopsSecretsAdapter {
    dir: PathBuf,
    bin: String,
}

impl SopsSecretsAdapter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            bin: "sops".to_string(),
        }
    }

    pub fn with_bin(mut self, bin: impl Into<String>) -> Self {
        self.bin = bin.into();
        self
    }

    pub fn secrets_path(&self, app: &str) -> PathBuf {
        self.dir.join(format!("{}.enc.json", app))
    }

    async fn decrypt(&self, path: &Path) -> Result<String, SecretsError> {
        let mut cmd = Command::new(&self.bin);
        cmd.args(["--decrypt", "--output-type", "json"]).arg(path);
        let output = run_with_timeout(cmd, SECRETS_TIMEOUT, "sops decrypt")
            .await
            .map_err(SecretsError::DecryptFailed)?;
        if !output.status.success() {
            return Err(SecretsError::DecryptFailed(combined_output(&output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl SecretsAdapter for SopsSecretsAdapter {
    async fn env_map(&self, app: &str) -> Result<BTreeMap<String, String>, SecretsError> {
        let path = self.secrets_path(app);
        if !path.exists() {
            tracing::debug!(app, path = %path.display(), "no secrets file");
            return Ok(BTreeMap::new());
        }
        let plain = self.decrypt(&path).await?;
        let env = parse_secrets(&plain)?;
        tracing::info!(app, keys = env.len(), "resolved secrets");
        Ok(env)
    }
}

/// Flatten a decrypted JSON object into string values.
///
/// `sops` metadata is dropped; non-string scalars are stringified.
pub(crate) fn parse_secrets(plain: &str) -> Result<BTreeMap<String, String>, SecretsError> {
    let value: serde_json::Value =
        serde_json::from_str(plain).map_err(|e| SecretsError::InvalidDocument(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| SecretsError::InvalidDocument("expected a JSON object".to_string()))?;

    let mut env = BTreeMap::new();
    for (key, value) in object {
        if key == "sops" {
            continue;
        }
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(_) | serde_json::Value::Bool(_) => value.to_string(),
            serde_json::Value::Null => String::new(),
            _ => {
                return Err(SecretsError::InvalidDocument(format!(
                    "secret '{}' must be a scalar",
                    key
                )))
            }
        };
        env.insert(key.clone(), value);
    }
    Ok(env)
}

#[cfg(test)]
#[path = "sops_tests.rs"]
mod tests;
