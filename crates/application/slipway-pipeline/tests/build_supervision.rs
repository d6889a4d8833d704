#![cfg(unix)]

use std::time::Duration;

use camino::Utf8PathBuf;
use slipway_core::{BuildRequest, BuildStatus};
use slipway_pipeline::{BuildSupervisor, RunnerEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn utf8(p: &std::path::Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(p.to_path_buf()).expect("utf8 path")
}

/// Write an executable stand-in for the scripting host. It ignores the
/// `-Script`/`-solutionPath` arguments the same way a real host forwards
/// them to the build script.
fn fake_runner(dir: &std::path::Path, body: &str) -> Utf8PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("runner.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write runner");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod");
    utf8(&path)
}

fn request(runner: Utf8PathBuf, timeout: Duration) -> BuildRequest {
    BuildRequest::new("/work/app/app.sln", runner, "build.cake", timeout).expect("request")
}

async fn drain(mut rx: mpsc::Receiver<RunnerEvent>) -> (Vec<String>, Vec<String>) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    while let Some(ev) = rx.recv().await {
        match ev {
            RunnerEvent::Stdout(l) => out.push(l),
            RunnerEvent::Stderr(l) => err.push(l),
        }
    }
    (out, err)
}

#[tokio::test]
async fn streams_stdout_and_stderr_lines() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = fake_runner(dir.path(), "echo building\necho step two\necho oops >&2");
    let req = request(runner, Duration::from_secs(30));

    let (tx, rx) = mpsc::channel(64);
    let supervisor = BuildSupervisor::for_request(&req);
    let outcome = supervisor
        .run(&req, tx, CancellationToken::new())
        .await
        .expect("run");

    assert_eq!(outcome.status, BuildStatus::Success);
    assert_eq!(outcome.output_lines, vec!["building", "step two"]);
    assert_eq!(outcome.error_lines, vec!["oops"]);

    let (out, err) = drain(rx).await;
    assert_eq!(out, vec!["building", "step two"]);
    assert_eq!(err, vec!["oops"]);
}

#[tokio::test]
async fn nonzero_exit_is_a_failure_not_a_panic() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = fake_runner(dir.path(), "echo partial\nexit 3");
    let req = request(runner, Duration::from_secs(30));

    let (tx, _rx) = mpsc::channel(64);
    let supervisor = BuildSupervisor::for_request(&req);
    let outcome = supervisor
        .run(&req, tx, CancellationToken::new())
        .await
        .expect("run");

    assert!(matches!(outcome.status, BuildStatus::Failed(_)));
    assert_eq!(outcome.output_lines, vec!["partial"]);
}

#[tokio::test]
async fn stderr_lines_do_not_fail_the_build() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = fake_runner(dir.path(), "echo warn >&2\necho done\nexit 0");
    let req = request(runner, Duration::from_secs(30));

    let (tx, _rx) = mpsc::channel(64);
    let supervisor = BuildSupervisor::for_request(&req);
    let outcome = supervisor
        .run(&req, tx, CancellationToken::new())
        .await
        .expect("run");

    assert_eq!(outcome.status, BuildStatus::Success);
    assert_eq!(outcome.error_lines, vec!["warn"]);
}

#[tokio::test]
async fn timeout_kills_the_child_and_reports_timed_out() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = fake_runner(dir.path(), "echo started\nsleep 30");
    let req = request(runner, Duration::from_millis(300));

    let (tx, _rx) = mpsc::channel(64);
    let supervisor = BuildSupervisor::for_request(&req);

    let started = std::time::Instant::now();
    let outcome = supervisor
        .run(&req, tx, CancellationToken::new())
        .await
        .expect("run");

    assert_eq!(outcome.status, BuildStatus::TimedOut);
    assert!(outcome.elapsed >= Duration::from_millis(300));
    // The child was killed, not abandoned: the whole run returns promptly.
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(outcome.output_lines, vec!["started"]);
}

#[tokio::test]
async fn timeout_kills_the_whole_process_tree() {
    let dir = tempfile::tempdir().expect("tempdir");
    // The host backgrounds a long-lived child that inherits the pipe write
    // ends; killing only the host would leave it stalling the streams.
    let runner = fake_runner(dir.path(), "echo started\nsleep 30 &\nsleep 30");
    let req = request(runner, Duration::from_millis(300));

    let (tx, _rx) = mpsc::channel(64);
    let supervisor = BuildSupervisor::for_request(&req);

    let started = std::time::Instant::now();
    let outcome = supervisor
        .run(&req, tx, CancellationToken::new())
        .await
        .expect("run");

    assert_eq!(outcome.status, BuildStatus::TimedOut);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn cancellation_kills_the_child() {
    let dir = tempfile::tempdir().expect("tempdir");
    let runner = fake_runner(dir.path(), "sleep 30");
    let req = request(runner, Duration::from_secs(60));

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let (tx, _rx) = mpsc::channel(64);
    let supervisor = BuildSupervisor::for_request(&req);

    let started = std::time::Instant::now();
    let outcome = supervisor.run(&req, tx, cancel).await.expect("run");

    assert_eq!(outcome.status, BuildStatus::Failed("Build cancelled".into()));
    assert!(started.elapsed() < Duration::from_secs(10));
}
