use camino::Utf8Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::debug;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Script host configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The external scripting host that runs the build script. Opaque beyond
/// its command line: the invocation shape below is the only wire contract
/// shared with the existing build script and must be preserved exactly.
pub struct ScriptHost {
    runner_path: String,
    script_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedInvocation {
    pub program: String,
    pub args: Vec<String>,
}

/// A spawned build process with both output streams piped for line-wise
/// consumption. The child is killed if the handle is dropped early.
pub struct RunningBuild {
    pub child: Child,
    pub stdout: Lines<BufReader<ChildStdout>>,
    pub stderr: Lines<BufReader<ChildStderr>>,
}

impl ScriptHost {
    pub fn new(runner_path: String, script_path: String) -> Self {
        Self {
            runner_path,
            script_path,
        }
    }

    /// Check that the configured runner exists before spawning. Failures are
    /// reported to the caller, which logs them and still attempts the spawn.
    pub fn preflight(&self) -> Result<(), RunnerError> {
        if self.runner_path.trim().is_empty() {
            return Err(RunnerError::Config("Script runner path is empty".into()));
        }
        if !std::path::Path::new(&self.runner_path).exists() {
            return Err(RunnerError::Config(format!(
                "Script runner not found at {}",
                self.runner_path
            )));
        }
        Ok(())
    }

    pub(crate) fn resolve_invocation(&self, solution_path: &Utf8Path) -> ResolvedInvocation {
        // The quotes embedded around the solution path are part of the
        // contract with the build script; they are not shell quoting.
        ResolvedInvocation {
            program: self.runner_path.clone(),
            args: vec![
                "-Script".to_string(),
                self.script_path.clone(),
                format!("-solutionPath=\"{solution_path}\""),
            ],
        }
    }

    pub fn spawn(&self, solution_path: &Utf8Path) -> Result<RunningBuild, RunnerError> {
        let invocation = self.resolve_invocation(solution_path);

        debug!(
            program = %invocation.program,
            args = ?invocation.args,
            "Spawning build script host"
        );

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // The script host forks its own children; putting it in a fresh
        // process group lets `terminate` reach all of them.
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::Config("Child stdout was not piped".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RunnerError::Config("Child stderr was not piped".into()))?;

        Ok(RunningBuild {
            child,
            stdout: BufReader::new(stdout).lines(),
            stderr: BufReader::new(stderr).lines(),
        })
    }
}

/// Kill the spawned script host and everything it forked. Killing only the
/// direct child would leave grandchildren running with the piped streams
/// still open on their side.
pub async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // The host leads its own process group (see `spawn`); signalling
        // the negative pgid takes down the whole tree.
        unsafe {
            libc::kill(-(pid as i32), libc::SIGKILL);
        }
    }
    let _ = child.kill().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_shape_matches_wire_contract() {
        let host = ScriptHost::new(
            "/opt/host/runner".to_string(),
            "/opt/scripts/build.cake".to_string(),
        );

        let inv = host.resolve_invocation(Utf8Path::new("/work/app/app.sln"));

        assert_eq!(inv.program, "/opt/host/runner");
        assert_eq!(
            inv.args,
            vec![
                "-Script".to_string(),
                "/opt/scripts/build.cake".to_string(),
                "-solutionPath=\"/work/app/app.sln\"".to_string(),
            ]
        );
    }

    #[test]
    fn solution_paths_with_spaces_stay_one_argument() {
        let host = ScriptHost::new("runner".to_string(), "build.cake".to_string());

        let inv = host.resolve_invocation(Utf8Path::new("/work/my app/app.sln"));

        assert_eq!(inv.args.len(), 3);
        assert_eq!(inv.args[2], "-solutionPath=\"/work/my app/app.sln\"");
    }

    #[test]
    fn preflight_rejects_missing_runner() {
        let host = ScriptHost::new("/no/such/runner".to_string(), "build.cake".to_string());
        assert!(matches!(host.preflight(), Err(RunnerError::Config(_))));
    }

    #[test]
    fn preflight_accepts_existing_runner() {
        let dir = tempfile::tempdir().expect("tempdir");
        let runner = dir.path().join("runner");
        std::fs::write(&runner, "#!/bin/sh\n").expect("write runner");

        let host = ScriptHost::new(
            runner.to_string_lossy().into_owned(),
            "build.cake".to_string(),
        );
        assert!(host.preflight().is_ok());
    }
}
