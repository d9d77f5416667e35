// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keel deployment engine

mod config;
pub mod converge;
mod error;
mod ops;
mod pipeline;
pub mod recovery;
mod saga;
pub mod translate;

pub use config::{EngineConfig, DEFAULT_DATACENTER, DEFAULT_HEALTH_TIMEOUT, DEFAULT_POLL_INTERVAL};
pub use converge::{wait_healthy, Convergence};
pub use error::PipelineError;
pub use pipeline::{
    Engine, EngineDeps, PipelineContext, PipelineRun, Step, DEPLOY_STEPS, ROLLBACK_STEPS,
    SHA_PREFIX_LEN,
};
pub use recovery::recover_in_flight;
pub use saga::Saga;
pub use translate::{periodic_job_id, service_job_id, translate, translate_periodic};
