// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Source, image, and command tooling adapters

mod shell;

pub use shell::ShellToolchain;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeToolchain, ToolCall};

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from external tools
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool ran and exited non-zero; carries its combined output
    #[error("{tool} failed: {output}")]
    Failed { tool: String, output: String },
    /// The tool could not be started or timed out
    #[error("{0}")]
    Exec(String),
}

/// Image build request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuild {
    pub tag: String,
    /// Build context directory
    pub context: PathBuf,
    pub dockerfile: PathBuf,
    pub build_args: BTreeMap<String, String>,
}

/// Adapter for the opaque tooling steps of a pipeline
#[async_trait]
pub trait ToolchainAdapter: Clone + Send + Sync + 'static {
    /// Fetch `repo` at `git_ref` into `dest`, returning the resolved commit hash
    async fn fetch_source(&self, repo: &str, git_ref: &str, dest: &Path)
        -> Result<String, ToolError>;

    /// Copy a local checkout into `dest`, returning its commit hash when it has one
    async fn local_source(&self, src: &Path, dest: &Path) -> Result<Option<String>, ToolError>;

    /// Monotonic build number derived from source history (0 when unavailable)
    async fn build_number(&self, dir: &Path) -> u64;

    async fn build_image(&self, build: &ImageBuild) -> Result<(), ToolError>;

    async fn push_image(&self, tag: &str) -> Result<(), ToolError>;

    /// Run a shell command in `dir`, returning its combined output
    async fn run_command(
        &self,
        dir: &Path,
        command: &str,
        env: &BTreeMap<String, String>,
    ) -> Result<String, ToolError>;

    /// Write a point-in-time dump of `database` to `dest`
    async fn dump_database(&self, database: &str, dest: &Path) -> Result<(), ToolError>;
}
