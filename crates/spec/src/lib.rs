// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! App spec parsing, defaulting, validation, and discovery

mod discover;
mod duration;
mod model;
mod parser;
mod validate;

pub use discover::{discover_apps, DiscoveredApp, Discovery};
pub use duration::parse_duration;
pub use model::{
    AppSpec, BuildSpec, CommandSpec, Dependencies, DrainSpec, Endpoint, FunctionSpec, HealthSpec,
    PostgresDependency, Process, ProcessMode, ResourceSpec, ScalingSpec, SourceSpec, DEFAULT_CPU,
    DEFAULT_DRAIN_SIGNAL, DEFAULT_DRAIN_TIMEOUT, DEFAULT_HEALTH_INTERVAL, DEFAULT_HEALTH_TIMEOUT,
    DEFAULT_MEMORY_MB,
};
pub use parser::{
    load_app_spec, parse_app_spec, parse_app_spec_with_format, Format, LoadError, ParseError,
};
