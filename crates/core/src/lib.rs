// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keel-core: Domain types for the keel deployment control plane

pub mod allocation;
pub mod clock;
pub mod deployment;
pub mod id;
pub mod live;
pub mod saga;
pub mod time_fmt;
pub mod workload;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use allocation::{AllocationStatus, ClientStatus, NodeInfo};
pub use clock::{Clock, FakeClock, SystemClock};
pub use deployment::{Deployment, DeploymentId, DeploymentStatus};
pub use id::{IdGen, SequentialIdGen, ShortId, UuidIdGen};
pub use live::{LiveEvent, StepState};
pub use saga::{action, SagaCategory, SagaEvent, SagaEventId, SagaId, SagaSource};
pub use time_fmt::format_utc_compact;
pub use workload::{
    BatchGroup, BatchJob, HttpCheck, JobDefinition, Network, PeriodicConfig, PortMapping,
    PortValue, Resources, RestartPolicy, ServiceJob, ServiceRegistration, Task, TaskGroup,
    UpdateStrategy,
};
