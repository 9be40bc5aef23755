// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Structural and range checks on incoming scrape requests.

use crate::models::class::ScrapeClass;
use crate::models::error::ValidationError;
use crate::models::request::ScrapeRequest;
use std::ops::RangeInclusive;

pub const TIMEOUT_RANGE: RangeInclusive<i64> = 1..=60;
pub const MAX_RETRIES_RANGE: RangeInclusive<i64> = 0..=10;

const ALLOWED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// The engine receives its URLs as one comma-joined argument
const URL_LIST_SEPARATOR: char = ',';

/// Check a request before any proxy resolution or engine work.
///
/// Returns the first violation found: timeout, then max_retries, then presence of URLs, then
/// each URL in class order and submission order (scheme, then no embedded comma).
pub fn validate(request: &ScrapeRequest) -> Result<(), ValidationError> {
    if !TIMEOUT_RANGE.contains(&request.timeout) {
        return Err(ValidationError::new(
            "timeout",
            request.timeout,
            "must be between 1 and 60 seconds",
        ));
    }

    if !MAX_RETRIES_RANGE.contains(&request.max_retries) {
        return Err(ValidationError::new(
            "max_retries",
            request.max_retries,
            "must be between 0 and 10",
        ));
    }

    if request.populated_classes().is_empty() {
        return Err(ValidationError::new(
            "urls",
            "[]",
            "at least one of datacenter, residential or mobile must list a URL",
        ));
    }

    for class in ScrapeClass::ALL {
        for (index, url) in request.urls_for(class).iter().enumerate() {
            if !ALLOWED_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
                return Err(ValidationError::new(
                    format!("{class}[{index}]"),
                    format!("{url:?}"),
                    "URL must start with http:// or https://",
                ));
            }
            if url.contains(URL_LIST_SEPARATOR) {
                return Err(ValidationError::new(
                    format!("{class}[{index}]"),
                    format!("{url:?}"),
                    "URL must not contain ',' (percent-encode it as %2C)",
                ));
            }
        }
    }

    Ok(())
}
