// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake secrets adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{SecretsAdapter, SecretsError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Default)]
struct FakeSecretsState {
    secrets: HashMap<String, BTreeMap<String, String>>,
    error: Option<String>,
    requests: Vec<String>,
}

/// In-memory secrets for testing
#[derive(Clone, Default)]
pub struct FakeSecrets {
    inner: Arc<Mutex<FakeSecretsState>>,
}

impl FakeSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, app: &str, key: &str, value: &str) {
        self.inner
            .lock()
            .secrets
            .entry(app.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Make every lookup fail with `message`
    pub fn fail(&self, message: &str) {
        self.inner.lock().error = Some(message.to_string());
    }

    /// Apps looked up, in order
    pub fn requests(&self) -> Vec<String> {
        self.inner.lock().requests.clone()
    }
}

#[async_trait]
impl SecretsAdapter for FakeSecrets {
    async fn env_map(&self, app: &str) -> Result<BTreeMap<String, String>, SecretsError> {
        let mut inner = self.inner.lock();
        inner.requests.push(app.to_string());
        if let Some(ref message) = inner.error {
            return Err(SecretsError::DecryptFailed(message.clone()));
        }
        Ok(inner.secrets.get(app).cloned().unwrap_or_default())
    }
}
