// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Turns one engine invocation into per-URL results and a class summary.
//!
//! Only an engine that cannot be started is an error here. A non-zero exit, a deadline kill or
//! unparseable output all degrade into a failed [`UrlResult`] for every URL of the job, so the
//! caller can always carry on with the next class.

use crate::models::engine::{EngineJob, EngineOutput, EngineRecord};
use crate::models::error::EngineUnavailable;
use crate::models::report::{ClassReport, UrlError, UrlErrorKind, UrlResult};
use crate::services::engine::{Engine, EngineOutcome, ExitState};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Maximum number of characters of each captured engine stream kept in a diagnostic
pub const OUTPUT_PREVIEW_CHARS: usize = 1000;

/// Results of one job plus its class summary
#[derive(Debug, Clone)]
pub struct JobReport {
    /// One entry per job URL, in job order
    pub results: Vec<UrlResult>,
    pub class_report: ClassReport,
}

pub struct EngineBridge {
    engine: Arc<dyn Engine>,
}

impl EngineBridge {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }

    pub fn engine_available(&self) -> bool {
        self.engine.is_available()
    }

    /// Run `job` on the engine and translate whatever happened into a [`JobReport`].
    pub async fn run(&self, job: &EngineJob) -> Result<JobReport, EngineUnavailable> {
        if job.urls.is_empty() {
            return Ok(JobReport {
                results: Vec::new(),
                class_report: class_report(job, 0, 0.0, Duration::ZERO),
            });
        }

        let started = Instant::now();
        let outcome = self.engine.run(job).await.inspect_err(|e| {
            tracing::error!(class = %job.class, error = %e, "engine could not be started");
        })?;
        let elapsed = started.elapsed();

        let report = match outcome.exit {
            ExitState::Success => match EngineOutput::parse(&outcome.stdout) {
                Ok(output) => reconcile(job, output, elapsed),
                Err(e) => {
                    tracing::error!(
                        class = %job.class,
                        error = %e,
                        stdout_len = outcome.stdout.len(),
                        "engine output is malformed"
                    );
                    degrade(job, elapsed, malformed_error(&e, &outcome.stdout))
                }
            },
            ExitState::Failed { code } => {
                tracing::error!(
                    class = %job.class,
                    exit_code = ?code,
                    stderr = %outcome.stderr.trim(),
                    "engine exited with failure"
                );
                degrade(job, elapsed, execution_error(&outcome, code))
            }
            ExitState::DeadlineExceeded { after } => {
                tracing::error!(
                    class = %job.class,
                    deadline_secs = after.as_secs(),
                    "engine killed after deadline"
                );
                degrade(job, elapsed, deadline_error(&outcome, after))
            }
        };
        Ok(report)
    }
}

fn class_report(job: &EngineJob, successful: usize, elapsed: f64, wall: Duration) -> ClassReport {
    ClassReport {
        class: job.class,
        url_count: job.urls.len(),
        successful,
        failed: job.urls.len() - successful,
        elapsed_seconds: elapsed,
        wall_clock_seconds: wall.as_secs_f64(),
        proxies_used: job.proxies.len(),
    }
}

/// Every URL of the job fails with `error`; the invocation time is split evenly between them.
///
/// The engine reported no elapsed time, so the class contributes nothing to engine time and the
/// measured invocation only shows up as wall clock.
fn degrade(job: &EngineJob, elapsed: Duration, error: UrlError) -> JobReport {
    let per_url = elapsed.as_secs_f64() / job.urls.len() as f64;
    let results = job
        .urls
        .iter()
        .map(|url| UrlResult::failed(url.clone(), job.class, error.clone(), per_url))
        .collect();

    JobReport {
        results,
        class_report: class_report(job, 0, 0.0, elapsed),
    }
}

fn execution_error(outcome: &EngineOutcome, code: Option<i32>) -> UrlError {
    let message = match code {
        Some(code) => format!("engine exited with status {code}"),
        None => "engine was terminated by a signal".to_string(),
    };
    let detail = format!(
        "command: {}\nstdout:\n{}\nstderr:\n{}",
        outcome.command,
        preview(&outcome.stdout),
        preview(&outcome.stderr)
    );
    UrlError::new(UrlErrorKind::EngineExecutionFailed, message, Some(detail))
}

/// First [`OUTPUT_PREVIEW_CHARS`] characters of captured engine output.
fn preview(output: &str) -> String {
    output.chars().take(OUTPUT_PREVIEW_CHARS).collect()
}

fn deadline_error(outcome: &EngineOutcome, after: Duration) -> UrlError {
    UrlError::new(
        UrlErrorKind::EngineExecutionFailed,
        format!(
            "engine did not finish within {}s and was killed",
            after.as_secs()
        ),
        Some(format!("command: {}", outcome.command)),
    )
}

fn malformed_error(err: &serde_json::Error, stdout: &str) -> UrlError {
    UrlError::new(
        UrlErrorKind::EngineOutputMalformed,
        "engine output could not be parsed",
        Some(format!(
            "parse error: {err}\noutput preview: {}",
            preview(stdout)
        )),
    )
}

/// Line engine records up with the submitted URLs.
///
/// The engine reports in completion order, so records are matched by URL. Submitted URLs
/// without a record fail as malformed output, records for unknown URLs are dropped, and the
/// counters are recomputed from the matched results.
fn reconcile(job: &EngineJob, output: EngineOutput, wall: Duration) -> JobReport {
    let EngineOutput {
        results: records,
        total,
        successful: reported_successful,
        failed: reported_failed,
        total_time_seconds,
        ..
    } = output;

    let mut by_url: HashMap<String, VecDeque<EngineRecord>> = HashMap::new();
    for record in records {
        by_url
            .entry(record.url.trim().to_string())
            .or_default()
            .push_back(record);
    }

    let results: Vec<UrlResult> = job
        .urls
        .iter()
        .map(|url| match by_url.get_mut(url.trim()).and_then(VecDeque::pop_front) {
            Some(record) => from_record(url, job, record),
            None => UrlResult::failed(
                url.clone(),
                job.class,
                UrlError::new(
                    UrlErrorKind::EngineOutputMalformed,
                    "engine output has no result for this url",
                    None,
                ),
                0.0,
            ),
        })
        .collect();

    let unmatched: Vec<&str> = by_url
        .values()
        .flatten()
        .map(|record| record.url.as_str())
        .collect();
    if !unmatched.is_empty() {
        tracing::warn!(
            class = %job.class,
            count = unmatched.len(),
            urls = ?unmatched,
            "dropping engine records for URLs that were not submitted"
        );
    }

    let successful = results.iter().filter(|r| r.success).count();
    let report = class_report(job, successful, non_negative(total_time_seconds), wall);

    if (total, reported_successful, reported_failed)
        != (report.url_count, report.successful, report.failed)
    {
        tracing::warn!(
            class = %job.class,
            reported_total = total,
            reported_successful,
            reported_failed,
            url_count = report.url_count,
            successful = report.successful,
            "engine counters disagree with its results, using recomputed counts"
        );
    }

    tracing::info!(
        class = %job.class,
        urls = report.url_count,
        successful = report.successful,
        failed = report.failed,
        engine_elapsed = report.elapsed_seconds,
        "engine run completed"
    );

    JobReport {
        results,
        class_report: report,
    }
}

fn from_record(url: &str, job: &EngineJob, record: EngineRecord) -> UrlResult {
    let error = if record.success {
        None
    } else {
        let message = record
            .error
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| match record.status_code {
                Some(code) => format!("engine reported HTTP status {code}"),
                None => "engine reported failure without a message".to_string(),
            });
        Some(UrlError::new(
            UrlErrorKind::FetchFailed,
            message,
            record.detailed_error,
        ))
    };

    UrlResult {
        url: url.to_string(),
        success: record.success,
        error,
        proxy_class: job.class,
        attempts_made: record.attempts_made,
        elapsed_seconds: non_negative(record.elapsed_seconds),
        status_code: record.status_code,
        final_url: record.final_url,
        content: record.content,
        response_headers: record.response_headers,
    }
}

fn non_negative(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
