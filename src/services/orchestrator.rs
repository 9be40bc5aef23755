// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::class::ScrapeClass;
use crate::models::config::{DispatchMode, Settings};
use crate::models::engine::EngineJob;
use crate::models::error::{EngineUnavailable, ScrapeError};
use crate::models::report::AggregateReport;
use crate::models::request::ScrapeRequest;
use crate::services::bridge::{EngineBridge, JobReport};
use crate::services::engine::Engine;
use crate::services::proxy_pool::ProxyPoolResolver;
use crate::services::validator::validate;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Drives one scrape request through validation, per-class engine runs and aggregation.
///
/// Holds no per-request state, so one instance serves all requests concurrently.
pub struct Orchestrator {
    resolver: ProxyPoolResolver,
    bridge: EngineBridge,
    dispatch_mode: DispatchMode,
}

impl Orchestrator {
    pub fn new(settings: &Settings, engine: Arc<dyn Engine>) -> Self {
        Self {
            resolver: ProxyPoolResolver::new(Arc::new(settings.proxy_pools.clone())),
            bridge: EngineBridge::new(engine),
            dispatch_mode: settings.dispatch_mode,
        }
    }

    pub fn engine_available(&self) -> bool {
        self.bridge.engine_available()
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        self.dispatch_mode
    }

    /// Validate and execute `request`.
    ///
    /// Fails only with a validation error (before any engine work) or when the engine cannot
    /// be started for some class, in which case no report is produced at all.
    pub async fn run(&self, request: &ScrapeRequest) -> Result<AggregateReport, ScrapeError> {
        validate(request).inspect_err(|e| {
            tracing::info!(field = %e.field, reason = %e.reason, "rejected scrape request");
        })?;

        let request_id = Uuid::now_v7();
        let span = tracing::info_span!("scrape", %request_id);
        self.execute(request, request_id).instrument(span).await
    }

    async fn execute(
        &self,
        request: &ScrapeRequest,
        request_id: Uuid,
    ) -> Result<AggregateReport, ScrapeError> {
        let started_at = Utc::now();
        let started = Instant::now();
        let classes = request.populated_classes();

        tracing::info!(
            classes = ?classes,
            urls = request.url_count(),
            mode = %self.dispatch_mode,
            "scrape started"
        );

        let jobs = match self.dispatch_mode {
            DispatchMode::Sequential => {
                let mut jobs = Vec::with_capacity(classes.len());
                for class in classes {
                    jobs.push(self.run_class(request, class).await?);
                }
                jobs
            }
            DispatchMode::Concurrent => {
                try_join_all(classes.into_iter().map(|class| self.run_class(request, class)))
                    .await?
            }
        };

        let report = assemble(request_id, started_at, started.elapsed(), jobs);

        tracing::info!(
            total = report.total,
            successful = report.successful,
            failed = report.failed,
            total_time = report.total_time_seconds,
            overhead = report.orchestration_overhead_seconds,
            "scrape completed"
        );
        Ok(report)
    }

    async fn run_class(
        &self,
        request: &ScrapeRequest,
        class: ScrapeClass,
    ) -> Result<JobReport, EngineUnavailable> {
        let class_started = Instant::now();

        // timeout and max_retries are range-checked by the validator
        let job = EngineJob {
            class,
            urls: request.urls_for(class).to_vec(),
            proxies: self.resolver.resolve(class),
            timeout_secs: request.timeout as u64,
            max_retries: request.max_retries as u32,
        };

        tracing::info!(
            %class,
            urls = job.urls.len(),
            proxies = job.proxies.len(),
            "dispatching class to engine"
        );

        let mut report = self.bridge.run(&job).await?;
        report.class_report.wall_clock_seconds = class_started.elapsed().as_secs_f64();
        Ok(report)
    }
}

/// Merge per-class job reports, already in class order, into the final report.
pub fn assemble(
    request_id: Uuid,
    started_at: DateTime<Utc>,
    wall_clock: Duration,
    jobs: Vec<JobReport>,
) -> AggregateReport {
    let mut results = Vec::new();
    let mut classes = BTreeMap::new();
    for job in jobs {
        results.extend(job.results);
        classes.insert(job.class_report.class, job.class_report);
    }

    let total = results.len();
    let successful = results.iter().filter(|r| r.success).count();
    let total_time_seconds = wall_clock.as_secs_f64();
    let engine_time_seconds: f64 = classes.values().map(|c| c.elapsed_seconds).sum();

    AggregateReport {
        request_id,
        started_at,
        results,
        classes,
        total,
        successful,
        failed: total - successful,
        total_time_seconds,
        engine_time_seconds,
        orchestration_overhead_seconds: (total_time_seconds - engine_time_seconds).max(0.0),
    }
}
