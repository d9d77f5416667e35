// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secrets resolution adapters

mod sops;

pub use sops::SopsSecretsAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSecrets;

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from secrets resolution
#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("decrypt failed: {0}")]
    DecryptFailed(String),
    #[error("invalid secrets document: {0}")]
    InvalidDocument(String),
}

/// Adapter that resolves an app's secrets into environment variables
#[async_trait]
pub trait SecretsAdapter: Clone + Send + Sync + 'static {
    /// Decrypted key/value pairs for `app`; empty when none are configured
    async fn env_map(&self, app: &str) -> Result<BTreeMap<String, String>, SecretsError>;
}
