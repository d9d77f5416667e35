// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step implementations.
//!
//! Each step must be safe to re-run from a fresh pipeline: job submission is
//! a declarative upsert, routing skips unchanged entries, and working
//! directories are per deployment.

use super::{Engine, PipelineContext};
use crate::converge::{wait_healthy, Convergence};
use crate::saga::Saga;
use crate::translate::{service_job_id, translate, translate_periodic};
use crate::PipelineError;
use keel_adapters::{
    EdgeRouterAdapter, EventPublisher, ImageBuild, SchedulerAdapter, SecretsAdapter,
    ToolchainAdapter,
};
use keel_core::{format_utc_compact, AllocationStatus, Clock, JobDefinition, LiveEvent, ShortId};
use keel_storage::{DeploymentStore, SagaStore};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

impl<S, K, R, T, P, St, C> Engine<S, K, R, T, P, St, C>
where
    S: SchedulerAdapter,
    K: SecretsAdapter,
    R: EdgeRouterAdapter,
    T: ToolchainAdapter,
    P: EventPublisher,
    St: SagaStore + DeploymentStore + Clone + 'static,
    C: Clock,
{
    pub(super) async fn clone_source(
        &self,
        ctx: &mut PipelineContext,
        saga: &Saga<St, C>,
    ) -> Result<(), PipelineError> {
        let toolchain = &self.inner.deps.toolchain;
        if let Some(parent) = ctx.workdir.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let local = local_checkout(&ctx.spec.root, ctx.spec.source.as_ref().and_then(|s| s.path.as_deref()));
        let repo = ctx.spec.source.as_ref().and_then(|s| s.repo.clone());

        let sha = match repo {
            Some(repo) => match toolchain.fetch_source(&repo, &ctx.git_ref, &ctx.workdir).await {
                Ok(sha) => sha,
                Err(fetch_err) => {
                    let Some(local) = local else {
                        return Err(fetch_err.into());
                    };
                    warn!(error = %fetch_err, path = %local.display(), "fetch failed, using local copy");
                    saga.log(
                        "clone.fallback",
                        format!("fetch failed, using {}: {}", local.display(), fetch_err),
                        meta([("path", local.display().to_string())]),
                    )?;
                    copy_local(toolchain, &local, ctx).await?
                }
            },
            None => {
                let Some(local) = local else {
                    return Err(PipelineError::Configuration(format!(
                        "{} has no source repo or local path",
                        ctx.app()
                    )));
                };
                copy_local(toolchain, &local, ctx).await?
            }
        };

        debug!(commit = %sha, "source resolved");
        ctx.commit_sha = sha;
        Ok(())
    }

    pub(super) async fn build(
        &self,
        ctx: &mut PipelineContext,
        saga: &Saga<St, C>,
    ) -> Result<(), PipelineError> {
        let Some(build) = ctx.spec.build.clone() else {
            ctx.image_tag = format!("{}:latest", ctx.app());
            return Ok(());
        };
        let toolchain = &self.inner.deps.toolchain;

        let local_tag = format!("{}:{}", ctx.app(), ctx.short_sha());
        let tag = match self.inner.config.registry.as_deref() {
            Some(registry) => format!("{}/{}", registry.trim_end_matches('/'), local_tag),
            None => local_tag,
        };

        let build_number = toolchain.build_number(&ctx.workdir).await;
        let mut build_args = build.args.clone();
        build_args.insert("BUILD_NUMBER".to_string(), build_number.to_string());

        let request = ImageBuild {
            tag: tag.clone(),
            context: ctx.workdir.join(&build.context),
            dockerfile: ctx.workdir.join(&build.dockerfile),
            build_args,
        };
        saga.log(
            "build.info",
            format!("build #{} as {}", build_number, tag),
            meta([
                ("build_number", build_number.to_string()),
                ("image_tag", tag.clone()),
            ]),
        )?;
        toolchain.build_image(&request).await?;

        if self.inner.config.registry.is_some() {
            toolchain.push_image(&tag).await?;
        }
        ctx.image_tag = tag;
        Ok(())
    }

    pub(super) async fn test(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let Some(command) = ctx.spec.test_command() else {
            return Ok(());
        };
        let output = self
            .inner
            .deps
            .toolchain
            .run_command(&ctx.workdir, command, &ctx.spec.env)
            .await?;
        debug!(output_len = output.len(), "tests passed");
        Ok(())
    }

    pub(super) async fn snapshot(
        &self,
        ctx: &mut PipelineContext,
        saga: &Saga<St, C>,
    ) -> Result<(), PipelineError> {
        let Some(database) = ctx.spec.relational_database() else {
            return Ok(());
        };
        let backup_dir = &self.inner.config.backup_dir;
        tokio::fs::create_dir_all(backup_dir).await?;

        let name = format!(
            "{}_{}_{}",
            database,
            ctx.short_sha(),
            format_utc_compact(self.inner.clock.epoch_ms())
        );
        let dest = backup_dir.join(&name);
        self.inner
            .deps
            .toolchain
            .dump_database(database, &dest)
            .await?;

        saga.log(
            "snapshot.saved",
            format!("dumped {} to {}", database, name),
            meta([("path", dest.display().to_string())]),
        )?;
        Ok(())
    }

    pub(super) async fn migrate(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        let Some(command) = ctx.spec.migrate_command().map(str::to_string) else {
            return Ok(());
        };
        let env = self.resolve_env(ctx).await?;
        self.inner
            .deps
            .toolchain
            .run_command(&ctx.workdir, &command, &env)
            .await?;
        Ok(())
    }

    pub(super) async fn submit(
        &self,
        ctx: &mut PipelineContext,
        saga: &Saga<St, C>,
    ) -> Result<(), PipelineError> {
        let image_tag = ctx.image_tag.clone();
        self.submit_jobs(ctx, saga, &image_tag).await
    }

    /// Submit the last successful deployment's image.
    pub(super) async fn submit_rollback(
        &self,
        ctx: &mut PipelineContext,
        saga: &Saga<St, C>,
    ) -> Result<(), PipelineError> {
        let target = self
            .inner
            .deps
            .store
            .last_successful_deployment(ctx.app(), &ctx.deployment_id)?
            .ok_or_else(|| {
                PipelineError::Configuration(format!(
                    "no previous successful deployment of {}",
                    ctx.app()
                ))
            })?;

        saga.log(
            "rollback.target",
            format!("rolling back to {} ({})", target.image_tag, target.id),
            meta([
                ("deployment_id", target.id.to_string()),
                ("image_tag", target.image_tag.clone()),
            ]),
        )?;
        ctx.commit_sha = target.commit_sha;
        ctx.image_tag = target.image_tag;

        let image_tag = ctx.image_tag.clone();
        self.submit_jobs(ctx, saga, &image_tag).await
    }

    async fn submit_jobs(
        &self,
        ctx: &mut PipelineContext,
        saga: &Saga<St, C>,
        image_tag: &str,
    ) -> Result<(), PipelineError> {
        let env = self.resolve_env(ctx).await?;
        let datacenters = &self.inner.config.datacenters;

        let mut jobs = Vec::new();
        let service = translate(&ctx.spec, image_tag, &env, datacenters);
        if !service.task_groups.is_empty() {
            jobs.push(JobDefinition::Service(service));
        }
        for process in ctx.spec.scheduled() {
            jobs.push(JobDefinition::Batch(translate_periodic(
                &ctx.spec,
                process,
                image_tag,
                &env,
                datacenters,
            )));
        }

        for job in &jobs {
            let eval_id = self.inner.deps.scheduler.submit_job(job).await?;
            info!(job_id = job.id(), kind = job.kind(), %eval_id, "job submitted");
            saga.log(
                "job.submitted",
                format!("submitted {} job {}", job.kind(), job.id()),
                meta([
                    ("job_id", job.id().to_string()),
                    ("eval_id", eval_id),
                ]),
            )?;
        }
        Ok(())
    }

    pub(super) async fn healthy(
        &self,
        ctx: &mut PipelineContext,
        saga: &Saga<St, C>,
    ) -> Result<(), PipelineError> {
        if ctx.spec.long_running().next().is_none() {
            return Ok(());
        }
        let bounds = Convergence {
            timeout: self.inner.config.health_timeout,
            interval: self.inner.config.poll_interval,
        };
        let job_id = service_job_id(&ctx.spec);
        let app = ctx.app().to_string();
        let publisher = &self.inner.deps.publisher;

        let healthy = wait_healthy(&self.inner.deps.scheduler, &app, &job_id, bounds, |alloc| {
            let message = describe(alloc);
            saga.log(
                "alloc.status",
                message.clone(),
                meta([
                    ("alloc_id", alloc.id.clone()),
                    ("node", alloc.node_name.clone()),
                    ("status", alloc.client_status.to_string()),
                    ("healthy", health_label(alloc).to_string()),
                ]),
            )?;
            publisher.publish(LiveEvent::Progress {
                app: app.clone(),
                step: "healthy".to_string(),
                message,
                alloc_id: Some(alloc.id.clone()),
                node: Some(alloc.node_name.clone()),
                alloc_status: Some(alloc.client_status.to_string()),
            });
            Ok(())
        })
        .await?;

        ctx.healthy = healthy;
        Ok(())
    }

    /// Point each endpoint hostname at a running allocation's node.
    pub(super) async fn forge(
        &self,
        ctx: &mut PipelineContext,
        saga: &Saga<St, C>,
    ) -> Result<(), PipelineError> {
        if !ctx.spec.has_endpoints() {
            return Ok(());
        }
        let router = &self.inner.deps.router;
        let mut changed = false;

        for endpoint in ctx.spec.endpoints.clone() {
            let port = match ctx.spec.process(&endpoint.process) {
                Some(process) if process.has_port() => process.port,
                _ => {
                    return Err(PipelineError::Configuration(format!(
                        "endpoint {} targets {} which declares no port",
                        endpoint.host, endpoint.process
                    )))
                }
            };

            let alloc = self.running_alloc(ctx, &endpoint.process).await?;
            let node = self.inner.deps.scheduler.node_info(&alloc.node_id).await?;
            let url = format!("http://{}:{}", node.address, port);

            if router.add_route(&endpoint.host, &url).await? {
                changed = true;
                saga.log(
                    "route.updated",
                    format!("{} -> {}", endpoint.host, url),
                    meta([("host", endpoint.host.clone()), ("url", url)]),
                )?;
            } else {
                debug!(host = %endpoint.host, "route unchanged");
            }
        }

        if changed {
            router.apply().await?;
        }
        Ok(())
    }

    pub(super) async fn cleanup(&self, ctx: &mut PipelineContext) -> Result<(), PipelineError> {
        match tokio::fs::remove_dir_all(&ctx.workdir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Spec env overlaid with secrets, resolved once per run.
    async fn resolve_env(
        &self,
        ctx: &mut PipelineContext,
    ) -> Result<BTreeMap<String, String>, PipelineError> {
        if let Some(ref env) = ctx.env {
            return Ok(env.clone());
        }
        let secrets = self.inner.deps.secrets.env_map(ctx.app()).await?;
        let mut env = ctx.spec.env.clone();
        env.extend(secrets);
        ctx.env = Some(env.clone());
        Ok(env)
    }

    /// A running allocation of `process`, preferring the last convergence result.
    async fn running_alloc(
        &self,
        ctx: &PipelineContext,
        process: &str,
    ) -> Result<AllocationStatus, PipelineError> {
        if let Some(alloc) = ctx.healthy.iter().find(|a| a.task_group == process) {
            return Ok(alloc.clone());
        }
        let allocs = self
            .inner
            .deps
            .scheduler
            .job_allocations(&service_job_id(&ctx.spec))
            .await?;
        allocs
            .into_iter()
            .find(|a| a.task_group == process && a.is_healthy())
            .ok_or_else(|| {
                PipelineError::Configuration(format!("no running allocation of {}", process))
            })
    }
}

async fn copy_local<T: ToolchainAdapter>(
    toolchain: &T,
    local: &Path,
    ctx: &PipelineContext,
) -> Result<String, PipelineError> {
    let sha = toolchain.local_source(local, &ctx.workdir).await?;
    Ok(sha.unwrap_or_else(|| ctx.git_ref.clone()))
}

/// Local source directory: `source.path` (relative to the spec) or the spec's own directory.
fn local_checkout(root: &Path, path: Option<&Path>) -> Option<PathBuf> {
    let candidate = match path {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => root.join(p),
        None if root.as_os_str().is_empty() => return None,
        None => root.to_path_buf(),
    };
    candidate.is_dir().then_some(candidate)
}

fn describe(alloc: &AllocationStatus) -> String {
    format!(
        "alloc {} on {}: {} (healthy: {})",
        alloc.id.short(8),
        alloc.node_name,
        alloc.client_status,
        health_label(alloc)
    )
}

fn health_label(alloc: &AllocationStatus) -> &'static str {
    match alloc.healthy {
        Some(true) => "true",
        Some(false) => "false",
        None => "unknown",
    }
}

fn meta<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
