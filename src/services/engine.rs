// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! The scraping engine as a capability, and the adapter that runs the real executable.

use crate::models::config::EngineSettings;
use crate::models::engine::EngineJob;
use crate::models::error::EngineUnavailable;
use crate::services::logging::redact_proxy_list;
use async_trait::async_trait;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// How an engine invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitState {
    /// Exit status zero
    Success,
    /// Non-zero exit; `code` is `None` when the process was killed by a signal
    Failed { code: Option<i32> },
    /// Killed by the orchestrator after the configured deadline
    DeadlineExceeded { after: Duration },
}

/// Raw result of running the engine once
#[derive(Debug, Clone)]
pub struct EngineOutcome {
    pub exit: ExitState,
    pub stdout: String,
    pub stderr: String,
    /// Command line that was run, proxy passwords redacted
    pub command: String,
}

/// Anything that can execute an [`EngineJob`].
///
/// `Err` is reserved for "could not start at all"; every process that did start yields an
/// [`EngineOutcome`], whatever its exit status or output.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn run(&self, job: &EngineJob) -> Result<EngineOutcome, EngineUnavailable>;

    /// Whether the engine looks invocable right now (used by the health check).
    fn is_available(&self) -> bool;
}

/// Runs the engine executable as a child process per job
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    settings: EngineSettings,
}

impl ProcessEngine {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    fn unavailable(&self, reason: impl ToString) -> EngineUnavailable {
        EngineUnavailable {
            path: self.settings.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl Engine for ProcessEngine {
    async fn run(&self, job: &EngineJob) -> Result<EngineOutcome, EngineUnavailable> {
        let args = job.to_args();
        let command = describe_command(&self.settings.path, &args);

        let child = Command::new(&self.settings.path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.unavailable(e))?;

        tracing::debug!(pid = child.id(), %command, "engine started");

        // Dropping the wait future on deadline drops the child, which kills it.
        let waited = match self.settings.deadline {
            Some(deadline) => {
                match tokio::time::timeout(deadline, child.wait_with_output()).await {
                    Ok(waited) => waited,
                    Err(_) => {
                        return Ok(EngineOutcome {
                            exit: ExitState::DeadlineExceeded { after: deadline },
                            stdout: String::new(),
                            stderr: String::new(),
                            command,
                        })
                    }
                }
            }
            None => child.wait_with_output().await,
        };

        let outcome = match waited {
            Ok(output) => EngineOutcome {
                exit: if output.status.success() {
                    ExitState::Success
                } else {
                    ExitState::Failed {
                        code: output.status.code(),
                    }
                },
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                command,
            },
            Err(e) => EngineOutcome {
                exit: ExitState::Failed { code: None },
                stdout: String::new(),
                stderr: format!("failed to collect engine output: {e}"),
                command,
            },
        };
        Ok(outcome)
    }

    fn is_available(&self) -> bool {
        resolve_executable(&self.settings.path).is_some()
    }
}

/// Locate an executable the way the OS would: paths with a directory part are checked as
/// given, bare names are searched on `PATH`.
pub fn resolve_executable(path: &Path) -> Option<PathBuf> {
    if path.is_absolute() || path.components().count() > 1 {
        return is_executable(path).then(|| path.to_path_buf());
    }
    let search = env::var_os("PATH")?;
    env::split_paths(&search)
        .map(|dir| dir.join(path))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Printable command line with the `-proxies` value redacted.
fn describe_command(program: &Path, args: &[String]) -> String {
    let mut parts = vec![program.display().to_string()];
    let mut redact_next = false;
    for arg in args {
        if redact_next {
            parts.push(redact_proxy_list(arg));
        } else {
            parts.push(arg.clone());
        }
        redact_next = arg == "-proxies";
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::class::ScrapeClass;

    #[test]
    fn test_describe_command_redacts_proxy_passwords() {
        let job = EngineJob {
            class: ScrapeClass::Datacenter,
            urls: vec!["http://a.example".into()],
            proxies: vec!["http://u:pw@p1:8080".into(), "http://p2:8080".into()],
            timeout_secs: 5,
            max_retries: 2,
        };
        let command = describe_command(Path::new("/opt/engine"), &job.to_args());

        assert_eq!(
            command,
            "/opt/engine -urls http://a.example -proxy-type datacenter -timeout 5 \
             -max-retries 2 -proxies http://u:***@p1:8080,http://p2:8080"
        );
        assert!(!command.contains("pw"));
    }

    #[test]
    fn test_resolve_executable_missing_path() {
        assert!(resolve_executable(Path::new("/definitely/not/here/engine")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_executable_rejects_non_executable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine");
        std::fs::write(&path, "not a program").unwrap();

        assert!(resolve_executable(&path).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_executable_searches_path_for_bare_names() {
        assert!(resolve_executable(Path::new("sh")).is_some());
    }
}
