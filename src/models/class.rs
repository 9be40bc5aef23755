// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Network egress class a batch of URLs is fetched through.
///
/// The declaration order is the processing and reporting order: `Ord` is derived so that
/// per-class maps iterate datacenter, residential, mobile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeClass {
    /// Datacenter proxies: fast, cheap, easily fingerprinted
    Datacenter,
    /// Residential ISP proxies
    Residential,
    /// Mobile carrier proxies
    Mobile,
}

impl ScrapeClass {
    /// Every class, in fixed enumeration order.
    pub const ALL: [ScrapeClass; 3] = [
        ScrapeClass::Datacenter,
        ScrapeClass::Residential,
        ScrapeClass::Mobile,
    ];

    /// Tag passed to the engine as `-proxy-type` and used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeClass::Datacenter => "datacenter",
            ScrapeClass::Residential => "residential",
            ScrapeClass::Mobile => "mobile",
        }
    }

    /// Environment variable holding this class's proxy pool.
    pub fn proxies_env_var(&self) -> &'static str {
        match self {
            ScrapeClass::Datacenter => "DATACENTER_PROXIES",
            ScrapeClass::Residential => "RESIDENTIAL_PROXIES",
            ScrapeClass::Mobile => "MOBILE_PROXIES",
        }
    }
}

impl std::fmt::Display for ScrapeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_all_is_in_enumeration_order() {
        let mut sorted = ScrapeClass::ALL;
        sorted.sort();
        assert_eq!(sorted, ScrapeClass::ALL);
        assert_eq!(ScrapeClass::ALL[0], ScrapeClass::Datacenter);
        assert_eq!(ScrapeClass::ALL[2], ScrapeClass::Mobile);
    }

    #[test]
    fn test_display_matches_wire_tag() {
        for class in ScrapeClass::ALL {
            let json = serde_json::to_string(&class).unwrap();
            assert_eq!(json, format!("\"{}\"", class));
        }
    }

    #[test]
    fn test_map_keys_serialize_in_fixed_order() {
        let mut map = BTreeMap::new();
        map.insert(ScrapeClass::Mobile, 3);
        map.insert(ScrapeClass::Datacenter, 1);
        map.insert(ScrapeClass::Residential, 2);

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"datacenter":1,"residential":2,"mobile":3}"#);
    }

    #[test]
    fn test_unknown_class_is_rejected() {
        assert!(serde_json::from_str::<ScrapeClass>("\"satellite\"").is_err());
    }
}
