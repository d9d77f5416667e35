// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake toolchain for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ImageBuild, ToolError, ToolchainAdapter};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded toolchain call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    FetchSource {
        repo: String,
        git_ref: String,
        dest: PathBuf,
    },
    LocalSource {
        src: PathBuf,
        dest: PathBuf,
    },
    BuildNumber {
        dir: PathBuf,
    },
    BuildImage(ImageBuild),
    PushImage {
        tag: String,
    },
    RunCommand {
        dir: PathBuf,
        command: String,
        env: BTreeMap<String, String>,
    },
    DumpDatabase {
        database: String,
        dest: PathBuf,
    },
}

impl ToolCall {
    /// Short name used for failure injection and assertions
    pub fn kind(&self) -> &'static str {
        match self {
            ToolCall::FetchSource { .. } => "fetch_source",
            ToolCall::LocalSource { .. } => "local_source",
            ToolCall::BuildNumber { .. } => "build_number",
            ToolCall::BuildImage(_) => "build_image",
            ToolCall::PushImage { .. } => "push_image",
            ToolCall::RunCommand { .. } => "run_command",
            ToolCall::DumpDatabase { .. } => "dump_database",
        }
    }
}

struct FakeToolchainState {
    calls: Vec<ToolCall>,
    /// Failure output keyed by call kind, or by command text for `run_command`
    failures: HashMap<String, String>,
    commit: String,
    local_commit: Option<String>,
    build_number: u64,
}

/// Fake toolchain that records calls and creates working directories
#[derive(Clone)]
pub struct FakeToolchain {
    inner: Arc<Mutex<FakeToolchainState>>,
}

impl Default for FakeToolchain {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeToolchainState {
                calls: Vec::new(),
                failures: HashMap::new(),
                commit: "0123456789abcdef0123456789abcdef01234567".to_string(),
                local_commit: None,
                build_number: 7,
            })),
        }
    }
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.inner.lock().calls.clone()
    }

    /// Kinds of recorded calls, in order
    pub fn call_kinds(&self) -> Vec<&'static str> {
        self.inner.lock().calls.iter().map(ToolCall::kind).collect()
    }

    /// Commit hash returned by `fetch_source`
    pub fn set_commit(&self, sha: &str) {
        self.inner.lock().commit = sha.to_string();
    }

    /// Commit hash returned by `local_source`
    pub fn set_local_commit(&self, sha: Option<&str>) {
        self.inner.lock().local_commit = sha.map(str::to_string);
    }

    pub fn set_build_number(&self, n: u64) {
        self.inner.lock().build_number = n;
    }

    /// Fail calls of `kind` (e.g. `"build_image"`) or `run_command` calls
    /// whose command equals `kind`, with `output`.
    pub fn fail(&self, kind: &str, output: &str) {
        self.inner
            .lock()
            .failures
            .insert(kind.to_string(), output.to_string());
    }

    fn record(&self, call: ToolCall, key: &str) -> Result<(), ToolError> {
        let mut inner = self.inner.lock();
        let kind = call.kind();
        inner.calls.push(call);
        match inner.failures.get(key).or_else(|| inner.failures.get(kind)) {
            Some(output) => Err(ToolError::Failed {
                tool: kind.to_string(),
                output: output.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ToolchainAdapter for FakeToolchain {
    async fn fetch_source(
        &self,
        repo: &str,
        git_ref: &str,
        dest: &Path,
    ) -> Result<String, ToolError> {
        let call = ToolCall::FetchSource {
            repo: repo.to_string(),
            git_ref: git_ref.to_string(),
            dest: dest.to_path_buf(),
        };
        self.record(call, "fetch_source")?;
        std::fs::create_dir_all(dest).map_err(|e| ToolError::Exec(e.to_string()))?;
        Ok(self.inner.lock().commit.clone())
    }

    async fn local_source(&self, src: &Path, dest: &Path) -> Result<Option<String>, ToolError> {
        let call = ToolCall::LocalSource {
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
        };
        self.record(call, "local_source")?;
        std::fs::create_dir_all(dest).map_err(|e| ToolError::Exec(e.to_string()))?;
        Ok(self.inner.lock().local_commit.clone())
    }

    async fn build_number(&self, dir: &Path) -> u64 {
        let mut inner = self.inner.lock();
        inner.calls.push(ToolCall::BuildNumber {
            dir: dir.to_path_buf(),
        });
        inner.build_number
    }

    async fn build_image(&self, build: &ImageBuild) -> Result<(), ToolError> {
        self.record(ToolCall::BuildImage(build.clone()), "build_image")
    }

    async fn push_image(&self, tag: &str) -> Result<(), ToolError> {
        let call = ToolCall::PushImage {
            tag: tag.to_string(),
        };
        self.record(call, "push_image")
    }

    async fn run_command(
        &self,
        dir: &Path,
        command: &str,
        env: &BTreeMap<String, String>,
    ) -> Result<String, ToolError> {
        let call = ToolCall::RunCommand {
            dir: dir.to_path_buf(),
            command: command.to_string(),
            env: env.clone(),
        };
        self.record(call, command)?;
        Ok(String::new())
    }

    async fn dump_database(&self, database: &str, dest: &Path) -> Result<(), ToolError> {
        let call = ToolCall::DumpDatabase {
            database: database.to_string(),
            dest: dest.to_path_buf(),
        };
        self.record(call, "dump_database")
    }
}
