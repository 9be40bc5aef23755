// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

#![cfg(unix)]

// Shell scripts standing in for the engine. Kept to a single test so no other thread can fork
// while a freshly written script is still open for writing.

use scrape_orchestrator::models::class::ScrapeClass;
use scrape_orchestrator::models::config::Settings;
use scrape_orchestrator::models::report::UrlErrorKind;
use scrape_orchestrator::models::request::ScrapeRequest;
use scrape_orchestrator::services::engine::ProcessEngine;
use scrape_orchestrator::services::orchestrator::Orchestrator;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Reports every URL it is given as fetched, in reverse order and with wrong counters.
const ECHO_ENGINE: &str = r#"#!/bin/sh
urls=""
proxy_type=""
while [ $# -gt 1 ]; do
  case "$1" in
    -urls) urls="$2" ;;
    -proxy-type) proxy_type="$2" ;;
  esac
  shift 2
done
records=""
IFS=','
for url in $urls; do
  record="{\"url\":\"$url\",\"status_code\":200,\"elapsed_seconds\":0.01,\"success\":true,\"proxy_used\":\"$proxy_type\",\"attempts_made\":1}"
  if [ -z "$records" ]; then records="$record"; else records="$record,$records"; fi
done
printf '{"results":[%s],"total":99,"successful":99,"failed":0,"total_time_seconds":0.25,"proxy_type_used":"%s"}\n' "$records" "$proxy_type"
"#;

const HANGING_ENGINE: &str = "#!/bin/sh\nexec sleep 30\n";

const FAILING_ENGINE: &str = "#!/bin/sh\necho 'dial tcp: connection refused' >&2\nexit 3\n";

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn orchestrator(pairs: &[(&str, String)]) -> Orchestrator {
    let settings = Settings::from_lookup(|key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    })
    .unwrap();
    let engine = Arc::new(ProcessEngine::new(&settings.engine));
    Orchestrator::new(&settings, engine)
}

#[tokio::test]
async fn test_script_engines() {
    let dir = tempfile::tempdir().unwrap();
    let echo = write_script(dir.path(), "echo-engine", ECHO_ENGINE);
    let hanging = write_script(dir.path(), "hanging-engine", HANGING_ENGINE);
    let failing = write_script(dir.path(), "failing-engine", FAILING_ENGINE);

    // successful run, records re-ordered and counters recomputed
    let request = ScrapeRequest::default()
        .with_urls(
            ScrapeClass::Datacenter,
            &["http://a.example", "http://b.example", "http://c.example"],
        )
        .with_urls(ScrapeClass::Mobile, &["https://m.example"]);
    let report = orchestrator(&[
        ("SCRAPE_ENGINE_PATH", echo.display().to_string()),
        ("MOBILE_PROXIES", "http://u:p@mobile-proxy:8080".to_string()),
    ])
    .run(&request)
    .await
    .unwrap();

    assert!(orchestrator(&[("SCRAPE_ENGINE_PATH", echo.display().to_string())]).engine_available());
    let urls: Vec<&str> = report.results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "http://a.example",
            "http://b.example",
            "http://c.example",
            "https://m.example"
        ]
    );
    assert_eq!(report.total, 4);
    assert_eq!(report.successful, 4);
    let datacenter = &report.classes[&ScrapeClass::Datacenter];
    assert_eq!(datacenter.url_count, 3);
    assert_eq!(datacenter.successful, 3);
    assert_eq!(datacenter.elapsed_seconds, 0.25);
    assert_eq!(report.classes[&ScrapeClass::Mobile].proxies_used, 1);
    assert_eq!(report.results[3].proxy_class, ScrapeClass::Mobile);
    assert_eq!(report.results[3].status_code, Some(200));
    assert!(report.orchestration_overhead_seconds >= 0.0);

    // a failed run is not counted as engine time
    let request =
        ScrapeRequest::default().with_urls(ScrapeClass::Datacenter, &["http://down.example"]);
    let report = orchestrator(&[("SCRAPE_ENGINE_PATH", failing.display().to_string())])
        .run(&request)
        .await
        .unwrap();

    let datacenter = &report.classes[&ScrapeClass::Datacenter];
    assert_eq!(datacenter.elapsed_seconds, 0.0);
    assert!(datacenter.wall_clock_seconds > 0.0);
    assert_eq!(report.engine_time_seconds, 0.0);
    assert_eq!(
        report.orchestration_overhead_seconds,
        report.total_time_seconds
    );
    let error = report.results[0].error.as_ref().unwrap();
    assert_eq!(error.message, "engine exited with status 3");
    assert!(error
        .detail
        .as_deref()
        .unwrap()
        .contains("connection refused"));

    // a hung engine is killed at the deadline
    let request =
        ScrapeRequest::default().with_urls(ScrapeClass::Residential, &["http://slow.example"]);
    let started = Instant::now();
    let report = orchestrator(&[
        ("SCRAPE_ENGINE_PATH", hanging.display().to_string()),
        ("SCRAPE_ENGINE_DEADLINE_SECS", "1".to_string()),
    ])
    .run(&request)
    .await
    .unwrap();

    assert!(started.elapsed() < Duration::from_secs(20));
    let result = &report.results[0];
    assert_eq!(
        result.error_kind(),
        Some(UrlErrorKind::EngineExecutionFailed)
    );
    assert!(result.error.as_ref().unwrap().message.contains("1s"));
}
