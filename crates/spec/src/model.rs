// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! App spec definitions

use crate::duration::parse_duration;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CPU: u32 = 100;
pub const DEFAULT_MEMORY_MB: u32 = 128;
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_DRAIN_SIGNAL: &str = "SIGTERM";
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// A declarative application spec.
///
/// Loaded once per pipeline run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSpec {
    pub name: String,
    /// Opt-in flag for directory discovery
    #[serde(default)]
    pub deploy: bool,
    /// Processes in declaration order (name injected from map key)
    #[serde(default, alias = "process")]
    pub processes: IndexMap<String, Process>,
    /// Public hostnames routed to a process
    #[serde(default, alias = "endpoint")]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Secret keys expected from the secrets store
    #[serde(default)]
    pub secrets: Vec<String>,
    #[serde(default)]
    pub build: Option<BuildSpec>,
    #[serde(default)]
    pub test: Option<CommandSpec>,
    #[serde(default)]
    pub migrate: Option<CommandSpec>,
    #[serde(default)]
    pub dependencies: Dependencies,
    #[serde(default)]
    pub source: Option<SourceSpec>,
    /// Directory the spec was loaded from (empty for in-memory specs)
    #[serde(skip)]
    pub root: PathBuf,
}

impl AppSpec {
    /// Processes without a schedule, in declaration order.
    pub fn long_running(&self) -> impl Iterator<Item = &Process> {
        self.processes.values().filter(|p| !p.is_scheduled())
    }

    /// Processes with a cron schedule, in declaration order.
    pub fn scheduled(&self) -> impl Iterator<Item = &Process> {
        self.processes.values().filter(|p| p.is_scheduled())
    }

    pub fn process(&self, name: &str) -> Option<&Process> {
        self.processes.get(name)
    }

    pub fn has_endpoints(&self) -> bool {
        !self.endpoints.is_empty()
    }

    /// Database name of the declared relational datastore, if any.
    pub fn relational_database(&self) -> Option<&str> {
        self.dependencies
            .postgres
            .as_ref()
            .map(|pg| pg.database.as_str())
    }

    pub fn test_command(&self) -> Option<&str> {
        command_of(&self.test)
    }

    pub fn migrate_command(&self) -> Option<&str> {
        command_of(&self.migrate)
    }
}

fn command_of(spec: &Option<CommandSpec>) -> Option<&str> {
    spec.as_ref()
        .map(|c| c.command.trim())
        .filter(|c| !c.is_empty())
}

/// How a process is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMode {
    LongRunning,
    Scheduled,
    Function,
}

/// One process of an app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    /// Process name (injected from map key)
    #[serde(skip)]
    pub name: String,
    /// Listening port; 0 means none
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub run: String,
    /// Five-field cron expression; empty means not scheduled
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub function: Option<FunctionSpec>,
    #[serde(default)]
    pub health: Option<HealthSpec>,
    #[serde(default)]
    pub scaling: ScalingSpec,
    #[serde(default)]
    pub drain: Option<DrainSpec>,
    #[serde(default)]
    pub resources: ResourceSpec,
}

impl Process {
    pub fn mode(&self) -> ProcessMode {
        if self.is_scheduled() {
            ProcessMode::Scheduled
        } else if self.function.is_some() {
            ProcessMode::Function
        } else {
            ProcessMode::LongRunning
        }
    }

    pub fn is_scheduled(&self) -> bool {
        !self.schedule.trim().is_empty()
    }

    pub fn has_port(&self) -> bool {
        self.port != 0
    }

    /// Run command, or `None` to use the image default.
    pub fn command(&self) -> Option<&str> {
        let run = self.run.trim();
        (!run.is_empty()).then_some(run)
    }
}

/// On-demand invocation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    #[serde(default)]
    pub timeout: Option<String>,
    #[serde(default)]
    pub concurrency: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSpec {
    pub path: String,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub timeout: Option<String>,
}

impl HealthSpec {
    pub fn interval(&self) -> Duration {
        duration_or(&self.interval, DEFAULT_HEALTH_INTERVAL)
    }

    pub fn timeout(&self) -> Duration {
        duration_or(&self.timeout, DEFAULT_HEALTH_TIMEOUT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingSpec {
    #[serde(default = "default_min")]
    pub min: u32,
    /// Defaults to `min`
    #[serde(default)]
    pub max: Option<u32>,
    /// Upper bound of instances in one region
    #[serde(default)]
    pub per_region: Option<u32>,
}

fn default_min() -> u32 {
    1
}

impl Default for ScalingSpec {
    fn default() -> Self {
        Self {
            min: default_min(),
            max: None,
            per_region: None,
        }
    }
}

impl ScalingSpec {
    pub fn max(&self) -> u32 {
        self.max.unwrap_or(self.min)
    }

    pub fn allows(&self, count: u32) -> bool {
        (self.min..=self.max()).contains(&count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainSpec {
    #[serde(default)]
    pub signal: Option<String>,
    #[serde(default)]
    pub timeout: Option<String>,
}

impl DrainSpec {
    pub fn signal(&self) -> &str {
        self.signal
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_DRAIN_SIGNAL)
    }

    pub fn timeout(&self) -> Duration {
        duration_or(&self.timeout, DEFAULT_DRAIN_TIMEOUT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    #[serde(default = "default_cpu")]
    pub cpu: u32,
    /// Memory in MB
    #[serde(default = "default_memory")]
    pub memory: u32,
}

fn default_cpu() -> u32 {
    DEFAULT_CPU
}

fn default_memory() -> u32 {
    DEFAULT_MEMORY_MB
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self {
            cpu: DEFAULT_CPU,
            memory: DEFAULT_MEMORY_MB,
        }
    }
}

/// A public route: hostname to process.
///
/// Accepts either a bare hostname or `{ host, process }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EndpointDef")]
pub struct Endpoint {
    pub host: String,
    /// Target process; filled in at parse time when omitted
    #[serde(default)]
    pub process: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EndpointDef {
    Host(String),
    Route {
        host: String,
        #[serde(default)]
        process: Option<String>,
    },
}

impl From<EndpointDef> for Endpoint {
    fn from(def: EndpointDef) -> Self {
        match def {
            EndpointDef::Host(host) => Endpoint {
                host,
                process: String::new(),
            },
            EndpointDef::Route { host, process } => Endpoint {
                host,
                process: process.unwrap_or_default(),
            },
        }
    }
}

/// Container image build settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    #[serde(default = "default_dockerfile")]
    pub dockerfile: String,
    #[serde(default = "default_context")]
    pub context: String,
    #[serde(default)]
    pub args: BTreeMap<String, String>,
}

fn default_dockerfile() -> String {
    "Dockerfile".to_string()
}

fn default_context() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub command: String,
}

/// Infrastructure dependencies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dependencies {
    #[serde(default)]
    pub postgres: Option<PostgresDependency>,
    /// Other dependency kinds, recorded but not acted on
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresDependency {
    pub database: String,
}

/// Where the app's source lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Local checkout used when the remote fetch fails
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_branch() -> String {
    "main".to_string()
}

fn duration_or(value: &Option<String>, default: Duration) -> Duration {
    value
        .as_deref()
        .and_then(|s| parse_duration(s).ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
