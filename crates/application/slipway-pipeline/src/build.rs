//! Build supervision.
//!
//! Spawns the external script host against a solution path, streams every
//! stdout/stderr line as it arrives, and resolves the run as success,
//! failure, or timeout. Supervision is a `select!` over the child's
//! completion future rather than sleep polling, so the timeout path can
//! kill the child instead of abandoning it.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use slipway_core::{BuildOutcome, BuildRequest, BuildStatus};
use slipway_infra::{terminate, RunnerError, ScriptHost};

/// How long the pumps may keep draining after the child has been killed.
/// The group kill closes the pipes almost immediately; the bound is for
/// any straggler that still holds a write end.
const STREAM_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// One line arriving on a stream of the running build script. Lines within
/// a stream keep arrival order; interleaving between the two streams is
/// unspecified.
#[derive(Debug, Clone)]
pub enum RunnerEvent {
    Stdout(String),
    Stderr(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to launch build script: {0}")]
    Launch(#[from] RunnerError),
}

pub struct BuildSupervisor {
    host: ScriptHost,
}

impl BuildSupervisor {
    pub fn new(host: ScriptHost) -> Self {
        Self { host }
    }

    pub fn for_request(req: &BuildRequest) -> Self {
        Self::new(ScriptHost::new(
            req.script_runner_path.to_string(),
            req.build_script_path.to_string(),
        ))
    }

    /// Run the build script to completion, timeout, or cancellation.
    /// Every output line is forwarded over `events` as it arrives and also
    /// accumulated into the returned outcome.
    pub async fn run(
        &self,
        req: &BuildRequest,
        events: mpsc::Sender<RunnerEvent>,
        cancel: CancellationToken,
    ) -> Result<BuildOutcome, BuildError> {
        if let Err(e) = self.host.preflight() {
            warn!("Script host preflight failed: {e}");
        }

        let started = Instant::now();
        let running = self.host.spawn(&req.solution_path)?;
        let mut child = running.child;

        let out_tx = events.clone();
        let mut stdout = running.stdout;
        let stdout_pump = tokio::spawn(async move {
            let mut lines = Vec::new();
            while let Ok(Some(line)) = stdout.next_line().await {
                let _ = out_tx.send(RunnerEvent::Stdout(line.clone())).await;
                lines.push(line);
            }
            lines
        });

        let err_tx = events;
        let mut stderr = running.stderr;
        let stderr_pump = tokio::spawn(async move {
            let mut lines = Vec::new();
            while let Ok(Some(line)) = stderr.next_line().await {
                let _ = err_tx.send(RunnerEvent::Stderr(line.clone())).await;
                lines.push(line);
            }
            lines
        });

        let (status, killed) = tokio::select! {
            res = child.wait() => {
                let status = match res {
                    Ok(st) if st.success() => BuildStatus::Success,
                    Ok(st) => BuildStatus::Failed(format!("Build script exited with {st}")),
                    Err(e) => BuildStatus::Failed(format!("Failed to wait on build script: {e}")),
                };
                (status, false)
            }
            _ = tokio::time::sleep(req.timeout) => {
                warn!(timeout_secs = req.timeout.as_secs(), "Build script taking too long, killing it");
                terminate(&mut child).await;
                (BuildStatus::TimedOut, true)
            }
            _ = cancel.cancelled() => {
                terminate(&mut child).await;
                (BuildStatus::Failed("Build cancelled".into()), true)
            }
        };

        let elapsed = started.elapsed();

        // A clean exit closes the pipes and the pumps finish on their own.
        // After a kill the wait is bounded so a leftover pipe holder cannot
        // delay the terminal event.
        let output_lines = drain_pump(stdout_pump, killed).await;
        let error_lines = drain_pump(stderr_pump, killed).await;

        info!(
            ?status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Build run finished"
        );

        Ok(BuildOutcome {
            status,
            elapsed,
            output_lines,
            error_lines,
        })
    }
}

async fn drain_pump(pump: JoinHandle<Vec<String>>, bounded: bool) -> Vec<String> {
    if !bounded {
        return pump.await.unwrap_or_default();
    }
    let abort = pump.abort_handle();
    match tokio::time::timeout(STREAM_DRAIN_GRACE, pump).await {
        Ok(lines) => lines.unwrap_or_default(),
        Err(_) => {
            abort.abort();
            Vec::new()
        }
    }
}
