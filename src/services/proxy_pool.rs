// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::class::ScrapeClass;
use crate::models::config::ProxyPools;
use crate::services::logging::redact_proxy;
use std::sync::Arc;

/// Split a comma-separated proxy list, trimming entries and dropping blanks.
pub fn parse_proxy_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Hands out the configured proxy pool for a class
#[derive(Debug, Clone)]
pub struct ProxyPoolResolver {
    pools: Arc<ProxyPools>,
}

impl ProxyPoolResolver {
    pub fn new(pools: Arc<ProxyPools>) -> Self {
        Self { pools }
    }

    /// Ordered proxy endpoints for `class`.
    ///
    /// An empty pool is valid and means the engine fetches directly.
    pub fn resolve(&self, class: ScrapeClass) -> Vec<String> {
        let proxies = self.pools.get(class).to_vec();
        if proxies.is_empty() {
            tracing::warn!(
                %class,
                env_var = class.proxies_env_var(),
                "no proxies configured, engine will fetch directly"
            );
        } else {
            tracing::debug!(
                %class,
                count = proxies.len(),
                first = %redact_proxy(&proxies[0]),
                "resolved proxy pool"
            );
        }
        proxies
    }
}
