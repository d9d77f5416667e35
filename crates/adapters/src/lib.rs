// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external collaborators

mod env;
pub mod events;
pub mod router;
pub mod scheduler;
pub mod secrets;
pub mod subprocess;
pub mod toolchain;
pub mod traced;

pub use events::{BroadcastPublisher, EventPublisher, NoOpPublisher};
pub use router::{EdgeRouterAdapter, FileEdgeRouter, RouterError};
pub use scheduler::{EvalId, NomadCliAdapter, SchedulerAdapter, SchedulerError};
pub use secrets::{SecretsAdapter, SecretsError, SopsSecretsAdapter};
pub use toolchain::{ImageBuild, ShellToolchain, ToolError, ToolchainAdapter};
pub use traced::TracedScheduler;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use events::FakePublisher;
#[cfg(any(test, feature = "test-support"))]
pub use router::{FakeEdgeRouter, RouterCall};
#[cfg(any(test, feature = "test-support"))]
pub use scheduler::{FakeScheduler, SchedulerCall};
#[cfg(any(test, feature = "test-support"))]
pub use secrets::FakeSecrets;
#[cfg(any(test, feature = "test-support"))]
pub use toolchain::{FakeToolchain, ToolCall};
