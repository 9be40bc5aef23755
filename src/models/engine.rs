// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Engine job description and the document the engine prints on stdout.

use crate::models::class::ScrapeClass;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One engine invocation: a single class and its URL batch
#[derive(Debug, Clone, PartialEq)]
pub struct EngineJob {
    pub class: ScrapeClass,
    pub urls: Vec<String>,
    /// Proxy endpoints for this class; empty means direct fetching
    pub proxies: Vec<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl EngineJob {
    /// Command-line arguments for the engine.
    ///
    /// `-proxies` is only passed when the pool is non-empty.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-urls".to_string(),
            self.urls.join(","),
            "-proxy-type".to_string(),
            self.class.to_string(),
            "-timeout".to_string(),
            self.timeout_secs.to_string(),
            "-max-retries".to_string(),
            self.max_retries.to_string(),
        ];
        if !self.proxies.is_empty() {
            args.push("-proxies".to_string());
            args.push(self.proxies.join(","));
        }
        args
    }
}

/// Document the engine emits on stdout when it exits with status zero
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOutput {
    /// Per-URL records in completion order. The engine prints `null` for an empty batch.
    #[serde(deserialize_with = "null_as_empty")]
    pub results: Vec<EngineRecord>,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_time_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_type_used: Option<String>,
}

impl EngineOutput {
    /// Parse exactly one JSON document; surrounding whitespace is allowed, trailing data is not.
    pub fn parse(stdout: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(stdout)
    }
}

/// Per-URL record inside [`EngineOutput`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineRecord {
    pub url: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_used: Option<String>,
    #[serde(default)]
    pub attempts_made: u32,
    #[serde(default)]
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

impl EngineRecord {
    /// Minimal record, handy for building engine output in tests.
    pub fn new(url: impl Into<String>, success: bool) -> Self {
        Self {
            url: url.into(),
            success,
            error: None,
            detailed_error: None,
            proxy_used: None,
            attempts_made: 1,
            elapsed_seconds: 0.0,
            status_code: None,
            final_url: None,
            content: None,
            response_headers: None,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<EngineRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<EngineRecord>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
