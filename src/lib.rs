// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Orchestration layer that fans scrape batches out to an external engine per egress class
//! and consolidates the results into one report.

pub mod app;
pub mod models;
pub mod services;
