// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod bridge;
pub mod engine;
pub mod logging;
pub mod orchestrator;
pub mod proxy_pool;
pub mod validator;
