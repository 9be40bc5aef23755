// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::class::ScrapeClass;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Batch of URLs to scrape, partitioned by egress class.
///
/// `timeout` and `max_retries` are signed so that out-of-range values reach the validator
/// and come back as a field-level error instead of a body rejection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScrapeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residential: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<Vec<String>>,
    /// Per-request timeout forwarded to the engine, in seconds (1-60)
    #[serde(default = "default_timeout")]
    pub timeout: i64,
    /// Per-URL retry budget forwarded to the engine (0-10)
    #[serde(default = "default_max_retries")]
    pub max_retries: i64,
}

fn default_timeout() -> i64 {
    10
}

fn default_max_retries() -> i64 {
    3
}

impl Default for ScrapeRequest {
    fn default() -> Self {
        Self {
            datacenter: None,
            residential: None,
            mobile: None,
            timeout: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl ScrapeRequest {
    /// URLs submitted for `class`, empty when the list is absent.
    pub fn urls_for(&self, class: ScrapeClass) -> &[String] {
        let urls = match class {
            ScrapeClass::Datacenter => &self.datacenter,
            ScrapeClass::Residential => &self.residential,
            ScrapeClass::Mobile => &self.mobile,
        };
        urls.as_deref().unwrap_or(&[])
    }

    /// Classes with at least one URL, in fixed enumeration order.
    pub fn populated_classes(&self) -> Vec<ScrapeClass> {
        ScrapeClass::ALL
            .into_iter()
            .filter(|class| !self.urls_for(*class).is_empty())
            .collect()
    }

    /// Total number of URLs across all classes.
    pub fn url_count(&self) -> usize {
        ScrapeClass::ALL
            .iter()
            .map(|class| self.urls_for(*class).len())
            .sum()
    }

    /// Builder-style setter, mostly for tests and clients.
    pub fn with_urls(mut self, class: ScrapeClass, urls: &[&str]) -> Self {
        let urls = Some(urls.iter().map(|u| u.to_string()).collect());
        match class {
            ScrapeClass::Datacenter => self.datacenter = urls,
            ScrapeClass::Residential => self.residential = urls,
            ScrapeClass::Mobile => self.mobile = urls,
        }
        self
    }
}
