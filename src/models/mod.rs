// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod class;
pub mod config;
pub mod engine;
pub mod error;
pub mod health;
pub mod report;
pub mod request;
