use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::app_core::{BuildRunEvent, BuildRunId, DomainEvent};

use slipway_core::{BuildRequest, BuildStatus, CopyRequest};
use slipway_pipeline::{run_copy, BuildSupervisor, CopyEvent, RunnerEvent};

/// Copy-stage inputs captured at trigger time. The `CopyRequest` itself is
/// only constructed after a successful build, once the destination has been
/// checked for emptiness.
#[derive(Debug, Clone)]
pub struct CopyPlan {
    pub destination_dir: String,
    pub patterns: Vec<String>,
}

/// Runs one build (and optional copy pass) on a dedicated worker thread,
/// forwarding everything the stages produce over the event channel. At most
/// one worker is active; the kernel's phase guard enforces that.
pub struct BuildOrchestrator {
    tx: mpsc::Sender<DomainEvent>,
    cancel: Option<CancellationToken>,
}

impl BuildOrchestrator {
    pub fn new(tx: mpsc::Sender<DomainEvent>) -> Self {
        Self { tx, cancel: None }
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }

    pub fn start_build(
        &mut self,
        req: BuildRequest,
        copy: Option<CopyPlan>,
        run_id: BuildRunId,
    ) -> anyhow::Result<()> {
        self.cancel();
        let token = CancellationToken::new();
        self.cancel = Some(token.clone());

        let tx = self.tx.clone();

        std::thread::Builder::new()
            .name("slipway-build".into())
            .spawn(move || {
                let rt = match crate::async_runtime::runtime() {
                    Ok(rt) => rt,
                    Err(e) => {
                        let _ = tx.blocking_send(DomainEvent::BuildEvent {
                            run_id,
                            ev: BuildRunEvent::BuildFailed {
                                message: format!("Failed to start async runtime: {e}"),
                            },
                        });
                        return;
                    }
                };

                rt.block_on(run_stages(req, copy, run_id, tx, token));
            })
            .context("Failed to spawn background build worker thread")?;

        Ok(())
    }
}

async fn run_stages(
    req: BuildRequest,
    copy: Option<CopyPlan>,
    run_id: BuildRunId,
    tx: mpsc::Sender<DomainEvent>,
    token: CancellationToken,
) {
    let send = |ev: BuildRunEvent| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(DomainEvent::BuildEvent { run_id, ev }).await;
        }
    };

    send(BuildRunEvent::Started).await;

    let (line_tx, mut line_rx) = mpsc::channel(slipway_config::EVENT_CHANNEL_CAPACITY);
    let supervisor = BuildSupervisor::for_request(&req);
    let work = supervisor.run(&req, line_tx, token.clone());
    tokio::pin!(work);

    // Forward stream lines as they arrive until the supervisor resolves.
    let run_res = loop {
        tokio::select! {
            res = &mut work => break res,
            maybe_line = line_rx.recv() => {
                if let Some(line) = maybe_line {
                    send(map_line(line)).await;
                }
            }
        }
    };

    // The supervisor has returned, so both pumps have dropped their
    // senders; drain whatever is still buffered before the terminal event.
    while let Some(line) = line_rx.recv().await {
        send(map_line(line)).await;
    }

    let outcome = match run_res {
        Ok(o) => o,
        Err(e) => {
            send(BuildRunEvent::BuildFailed {
                message: e.to_string(),
            })
            .await;
            return;
        }
    };

    match outcome.status {
        BuildStatus::TimedOut => {
            send(BuildRunEvent::BuildTimedOut {
                elapsed: outcome.elapsed,
            })
            .await;
        }
        BuildStatus::Failed(message) => {
            send(BuildRunEvent::BuildFailed { message }).await;
        }
        BuildStatus::Success => {
            send(BuildRunEvent::BuildSucceeded {
                elapsed: outcome.elapsed,
                copying: copy.is_some(),
            })
            .await;

            if let Some(plan) = copy {
                run_copy_stage(&req, plan, &send).await;
            }
        }
    }
}

fn map_line(line: RunnerEvent) -> BuildRunEvent {
    match line {
        RunnerEvent::Stdout(l) => BuildRunEvent::OutputLine(l),
        RunnerEvent::Stderr(l) => BuildRunEvent::ErrorLine(l),
    }
}

async fn run_copy_stage<F, Fut>(req: &BuildRequest, plan: CopyPlan, send: &F)
where
    F: Fn(BuildRunEvent) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    send(BuildRunEvent::CopyStarted).await;

    let copy_req = match CopyRequest::new(req.source_root(), plan.destination_dir, plan.patterns) {
        Ok(r) => r,
        Err(e) => {
            send(BuildRunEvent::CopyFailed {
                message: e.to_string(),
            })
            .await;
            return;
        }
    };

    // run_copy is synchronous filesystem work; the unbounded channel lets
    // its callback hand events back into this async context.
    let (copy_tx, mut copy_rx) = mpsc::unbounded_channel();
    let join = tokio::task::spawn_blocking(move || {
        run_copy(&copy_req, |ev| {
            let _ = copy_tx.send(ev);
        })
    });

    while let Some(ev) = copy_rx.recv().await {
        match ev {
            CopyEvent::Starting { summary } => {
                send(BuildRunEvent::CopyScanned {
                    bin_dirs: summary.bin_dirs,
                    files: summary.files_matched,
                })
                .await;
            }
            CopyEvent::Copying { from, to } => {
                send(BuildRunEvent::CopyingFile { from, to }).await;
            }
        }
    }

    match join.await {
        Ok(result) if result.succeeded => {
            send(BuildRunEvent::CopySucceeded {
                files: result.copied.len(),
            })
            .await;
        }
        Ok(result) => {
            send(BuildRunEvent::CopyFailed {
                message: result
                    .failure_reason
                    .unwrap_or_else(|| "Copy failed".to_string()),
            })
            .await;
        }
        Err(e) => {
            send(BuildRunEvent::CopyFailed {
                message: format!("Copy worker panicked: {e}"),
            })
            .await;
        }
    }
}
