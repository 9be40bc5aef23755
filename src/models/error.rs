// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Request-level failures. Everything else an engine run can go wrong with is reported per URL.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request rejected before any engine work started
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason} (got {value})")]
pub struct ValidationError {
    /// Offending field, e.g. `timeout` or `residential[2]`
    pub field: String,
    pub value: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// The engine executable is missing or cannot be started
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("engine executable {path} is not invocable: {reason}")]
pub struct EngineUnavailable {
    pub path: String,
    pub reason: String,
}

/// Failures that abort a whole scrape request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    EngineUnavailable(#[from] EngineUnavailable),
}

impl ScrapeError {
    /// Stable machine-readable tag used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Validation(_) => "validation_error",
            ScrapeError::EngineUnavailable(_) => "engine_unavailable",
        }
    }
}

/// Error body returned by the HTTP API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&ScrapeError> for ErrorResponse {
    fn from(err: &ScrapeError) -> Self {
        Self {
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}
