// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Process-wide settings, read from the environment once at startup.

use crate::models::class::ScrapeClass;
use crate::services::proxy_pool::parse_proxy_list;
use anyhow::{anyhow, bail, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default engine location, relative to the working directory
pub const DEFAULT_ENGINE_PATH: &str = "./go-scraper/go-scraper";

/// How populated classes are dispatched within one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// One class after another, in enumeration order
    #[default]
    Sequential,
    /// All classes at once; results are still merged in enumeration order
    Concurrent,
}

impl DispatchMode {
    pub fn parse(mode: &str) -> Result<Self> {
        match mode {
            "sequential" => Ok(DispatchMode::Sequential),
            "concurrent" => Ok(DispatchMode::Concurrent),
            _ => bail!(
                "SCRAPE_DISPATCH_MODE must be 'sequential' or 'concurrent', got: {}",
                mode
            ),
        }
    }
}

impl std::fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchMode::Sequential => write!(f, "sequential"),
            DispatchMode::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Proxy endpoints per class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyPools {
    pub datacenter: Vec<String>,
    pub residential: Vec<String>,
    pub mobile: Vec<String>,
}

impl ProxyPools {
    pub fn get(&self, class: ScrapeClass) -> &[String] {
        match class {
            ScrapeClass::Datacenter => &self.datacenter,
            ScrapeClass::Residential => &self.residential,
            ScrapeClass::Mobile => &self.mobile,
        }
    }

    /// Read `<CLASS>_PROXIES` for every class. Missing variables give empty pools.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pool = |class: ScrapeClass| {
            lookup(class.proxies_env_var())
                .map(|raw| parse_proxy_list(&raw))
                .unwrap_or_default()
        };
        Self {
            datacenter: pool(ScrapeClass::Datacenter),
            residential: pool(ScrapeClass::Residential),
            mobile: pool(ScrapeClass::Mobile),
        }
    }
}

/// Where the engine lives and how long the orchestrator is willing to wait for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub path: PathBuf,
    /// `None` waits for the engine indefinitely
    pub deadline: Option<Duration>,
}

impl EngineSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            deadline: None,
        }
    }
}

/// Immutable configuration shared by every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub engine: EngineSettings,
    pub proxy_pools: ProxyPools,
    pub dispatch_mode: DispatchMode,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let path = get("SCRAPE_ENGINE_PATH").unwrap_or_else(|| DEFAULT_ENGINE_PATH.to_string());

        let deadline = get("SCRAPE_ENGINE_DEADLINE_SECS")
            .map(|raw| parse_deadline(raw.trim()))
            .transpose()?;

        let dispatch_mode = get("SCRAPE_DISPATCH_MODE")
            .map(|raw| DispatchMode::parse(raw.trim()))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            engine: EngineSettings {
                path: PathBuf::from(path),
                deadline,
            },
            proxy_pools: ProxyPools::from_lookup(&lookup),
            dispatch_mode,
        })
    }
}

fn parse_deadline(raw: &str) -> Result<Duration> {
    let secs = raw
        .parse::<u64>()
        .map_err(|e| anyhow!("SCRAPE_ENGINE_DEADLINE_SECS must be a whole number: {e}"))?;
    if secs == 0 {
        bail!("SCRAPE_ENGINE_DEADLINE_SECS must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();

        assert_eq!(settings.engine.path, PathBuf::from(DEFAULT_ENGINE_PATH));
        assert_eq!(settings.engine.deadline, None);
        assert_eq!(settings.dispatch_mode, DispatchMode::Sequential);
        assert_eq!(settings.proxy_pools, ProxyPools::default());
    }

    #[test]
    fn test_reads_pools_per_class() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATACENTER_PROXIES", "http://d1:8080, http://d2:8080"),
            ("MOBILE_PROXIES", " , "),
        ]))
        .unwrap();

        assert_eq!(
            settings.proxy_pools.get(ScrapeClass::Datacenter),
            ["http://d1:8080", "http://d2:8080"]
        );
        assert!(settings.proxy_pools.get(ScrapeClass::Residential).is_empty());
        assert!(settings.proxy_pools.get(ScrapeClass::Mobile).is_empty());
    }

    #[test]
    fn test_engine_knobs() {
        let settings = Settings::from_lookup(lookup(&[
            ("SCRAPE_ENGINE_PATH", "/usr/local/bin/engine"),
            ("SCRAPE_ENGINE_DEADLINE_SECS", "90"),
            ("SCRAPE_DISPATCH_MODE", "concurrent"),
        ]))
        .unwrap();

        assert_eq!(settings.engine.path, PathBuf::from("/usr/local/bin/engine"));
        assert_eq!(settings.engine.deadline, Some(Duration::from_secs(90)));
        assert_eq!(settings.dispatch_mode, DispatchMode::Concurrent);
    }

    #[test]
    fn test_invalid_dispatch_mode_is_an_error() {
        let err = Settings::from_lookup(lookup(&[("SCRAPE_DISPATCH_MODE", "parallel")]))
            .unwrap_err()
            .to_string();
        assert!(err.contains("'sequential' or 'concurrent'"));
    }

    #[test]
    fn test_zero_or_garbage_deadline_is_an_error() {
        assert!(Settings::from_lookup(lookup(&[("SCRAPE_ENGINE_DEADLINE_SECS", "0")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("SCRAPE_ENGINE_DEADLINE_SECS", "soon")])).is_err());
    }

    #[test]
    fn test_dispatch_mode_display() {
        assert_eq!(DispatchMode::Sequential.to_string(), "sequential");
        assert_eq!(DispatchMode::Concurrent.to_string(), "concurrent");
    }
}
