// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::class::ScrapeClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Why a single URL failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UrlErrorKind {
    /// The engine ran and reported that fetching this URL failed
    FetchFailed,
    /// The engine process exited with a non-zero status (or was killed)
    EngineExecutionFailed,
    /// The engine exited cleanly but its output could not be used for this URL
    EngineOutputMalformed,
}

impl std::fmt::Display for UrlErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlErrorKind::FetchFailed => write!(f, "fetch_failed"),
            UrlErrorKind::EngineExecutionFailed => write!(f, "engine_execution_failed"),
            UrlErrorKind::EngineOutputMalformed => write!(f, "engine_output_malformed"),
        }
    }
}

/// Error attached to a failed URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UrlError {
    pub kind: UrlErrorKind,
    /// Short human-readable summary
    pub message: String,
    /// Diagnostic detail (engine trace, captured process output, parse error)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl UrlError {
    pub fn new(kind: UrlErrorKind, message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail,
        }
    }
}

/// Outcome for one submitted URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UrlResult {
    pub url: String,
    pub success: bool,
    /// Always present when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<UrlError>,
    pub proxy_class: ScrapeClass,
    /// Zero when the failure happened before the engine could fetch anything
    pub attempts_made: u32,
    pub elapsed_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<BTreeMap<String, String>>,
}

impl UrlResult {
    /// Failed result for a URL the engine never produced a record for.
    pub fn failed(
        url: impl Into<String>,
        proxy_class: ScrapeClass,
        error: UrlError,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            url: url.into(),
            success: false,
            error: Some(error),
            proxy_class,
            attempts_made: 0,
            elapsed_seconds,
            status_code: None,
            final_url: None,
            content: None,
            response_headers: None,
        }
    }

    pub fn error_kind(&self) -> Option<UrlErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Per-class summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClassReport {
    pub class: ScrapeClass,
    pub url_count: usize,
    pub successful: usize,
    pub failed: usize,
    /// Engine-reported execution time (measured invocation time for degraded runs)
    pub elapsed_seconds: f64,
    /// Time measured by the orchestrator around the whole bridge call
    pub wall_clock_seconds: f64,
    pub proxies_used: usize,
}

/// Consolidated result of one orchestration run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AggregateReport {
    pub request_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// One entry per submitted URL: classes in fixed order, submission order within a class
    pub results: Vec<UrlResult>,
    #[schema(value_type = Object)]
    pub classes: BTreeMap<ScrapeClass, ClassReport>,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Wall-clock time of the whole run
    pub total_time_seconds: f64,
    /// Sum of per-class engine-reported elapsed time
    pub engine_time_seconds: f64,
    /// `total_time_seconds - engine_time_seconds`, never negative
    pub orchestration_overhead_seconds: f64,
}

impl AggregateReport {
    /// Results submitted under `class`, in submission order.
    pub fn results_for(&self, class: ScrapeClass) -> impl Iterator<Item = &UrlResult> {
        self.results.iter().filter(move |r| r.proxy_class == class)
    }
}
