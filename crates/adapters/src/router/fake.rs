// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake edge router for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{EdgeRouterAdapter, RouterError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Recorded router call
#[derive(Debug, Clone, PartialEq)]
pub enum RouterCall {
    Add { host: String, url: String },
    Remove { host: String },
    Apply,
}

#[derive(Default)]
struct FakeRouterState {
    routes: BTreeMap<String, String>,
    calls: Vec<RouterCall>,
}

/// In-memory edge router for testing
#[derive(Clone, Default)]
pub struct FakeEdgeRouter {
    inner: Arc<Mutex<FakeRouterState>>,
}

impl FakeEdgeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RouterCall> {
        self.inner.lock().calls.clone()
    }

    pub fn routes(&self) -> BTreeMap<String, String> {
        self.inner.lock().routes.clone()
    }
}

#[async_trait]
impl EdgeRouterAdapter for FakeEdgeRouter {
    async fn add_route(&self, host: &str, url: &str) -> Result<bool, RouterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RouterCall::Add {
            host: host.to_string(),
            url: url.to_string(),
        });
        let previous = inner.routes.insert(host.to_string(), url.to_string());
        Ok(previous.as_deref() != Some(url))
    }

    async fn remove_route(&self, host: &str) -> Result<bool, RouterError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RouterCall::Remove {
            host: host.to_string(),
        });
        Ok(inner.routes.remove(host).is_some())
    }

    async fn apply(&self) -> Result<(), RouterError> {
        self.inner.lock().calls.push(RouterCall::Apply);
        Ok(())
    }
}
