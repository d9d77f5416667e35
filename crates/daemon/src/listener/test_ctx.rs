// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener context wired to fakes

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use keel_adapters::{FakeEdgeRouter, FakePublisher, FakeScheduler, FakeSecrets, FakeToolchain};
use keel_core::{FakeClock, SequentialIdGen};
use keel_engine::{Engine, EngineConfig, EngineDeps};
use keel_storage::Store;
use tempfile::TempDir;
use tokio::sync::Notify;

use super::ListenCtx;

pub(crate) type FakeCtx =
    ListenCtx<FakeScheduler, FakeSecrets, FakeEdgeRouter, FakeToolchain, FakePublisher, FakeClock>;

pub(crate) struct Harness {
    pub ctx: FakeCtx,
    pub scheduler: FakeScheduler,
    pub router: FakeEdgeRouter,
    pub store: Store,
    pub dir: TempDir,
}

pub(crate) const WEB_SPEC: &str = r#"
name = "shop"
endpoints = ["shop.example.com"]

[process.web]
port = 3000
run = "./serve"
scaling = { min = 1, max = 3 }

[process.nightly]
schedule = "0 2 * * *"
run = "./report"
"#;

pub(crate) fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = FakeScheduler::new();
    let router = FakeEdgeRouter::new();
    let store = Store::in_memory();
    let engine = Engine::new(
        EngineDeps {
            scheduler: scheduler.clone(),
            secrets: FakeSecrets::new(),
            router: router.clone(),
            toolchain: FakeToolchain::new(),
            publisher: FakePublisher::new(),
            store: store.clone(),
            ids: Arc::new(SequentialIdGen::new("id")),
        },
        FakeClock::new(),
        EngineConfig::new(dir.path())
            .with_poll_interval(Duration::from_secs(1))
            .with_health_timeout(Duration::from_secs(5)),
    );
    let ctx = ListenCtx {
        engine,
        store: store.clone(),
        start_time: Instant::now(),
        shutdown: Arc::new(Notify::new()),
    };
    Harness {
        ctx,
        scheduler,
        router,
        store,
        dir,
    }
}

impl Harness {
    /// Write a spec file under the temp dir and return its path.
    pub fn write_spec(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }
}
