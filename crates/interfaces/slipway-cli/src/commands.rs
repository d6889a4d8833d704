use std::time::Duration;

use anyhow::Result;
use camino::Utf8PathBuf;

use slipway_app_core::app_core::{AppCommand, AppStore, BuildInputs};
use slipway_app_core::domain::{AppSettings, AppState, LogKind, Phase};
use slipway_app_core::kernel::AppKernel;
use slipway_app_core::ports::SettingsRepo;
use slipway_core::{patterns::split_patterns, BuildStatus, CopyRequest};
use slipway_pipeline::{run_copy, CopyEvent};

const PUMP_INTERVAL: Duration = Duration::from_millis(50);

/// Per-invocation overrides layered over the persisted settings.
#[derive(Debug, Clone, Default)]
pub struct BuildOverrides {
    pub timeout_secs: Option<u64>,
    pub runner: Option<Utf8PathBuf>,
    pub script: Option<Utf8PathBuf>,
}

pub fn cmd_build<S: SettingsRepo>(
    settings_repo: S,
    solution: Utf8PathBuf,
    dest: Option<Utf8PathBuf>,
    patterns: String,
    copy: bool,
    overrides: BuildOverrides,
) -> Result<()> {
    let settings = applied_settings(settings_repo.load()?, &overrides);

    let state = AppState {
        settings,
        ..AppState::default()
    };
    let mut kernel = AppKernel::new(AppStore::new(state), settings_repo);

    kernel.dispatch(AppCommand::StartBuild(BuildInputs {
        solution_path: solution.into_string(),
        copy_enabled: copy,
        destination_dir: dest.map(Utf8PathBuf::into_string).unwrap_or_default(),
        extension_patterns: patterns,
    }));

    // Trigger rejected synchronously (validation failure): report and stop.
    let state = kernel.store.state();
    if state.run_id.is_none() {
        let reason = state
            .log
            .last()
            .map(|l| l.text.clone())
            .unwrap_or_else(|| "Build was not started".to_string());
        anyhow::bail!(reason);
    }

    let final_state = pump_log(&mut kernel);

    match final_state.last_status {
        Some(BuildStatus::Success) => {}
        Some(BuildStatus::TimedOut) => anyhow::bail!("Build timed out"),
        Some(BuildStatus::Failed(reason)) => anyhow::bail!("Build failed: {reason}"),
        None => anyhow::bail!("Build ended without a status"),
    }

    if copy && final_state.last_copy_succeeded != Some(true) {
        anyhow::bail!("Artifact copy failed");
    }

    Ok(())
}

/// Drain kernel events, echoing each new log line, until the run settles.
fn pump_log<S: SettingsRepo>(kernel: &mut AppKernel<S>) -> AppState {
    let mut printed = 0usize;
    loop {
        kernel.tick();
        let state = kernel.store.state();

        // The log is cleared when a run starts.
        if printed > state.log.len() {
            printed = 0;
        }
        for line in &state.log[printed..] {
            match line.kind {
                LogKind::Info => println!("{}", line.text),
                LogKind::Error => eprintln!("{}", line.text),
            }
        }
        printed = state.log.len();

        if state.phase == Phase::Idle && state.last_status.is_some() {
            return state;
        }
        std::thread::sleep(PUMP_INTERVAL);
    }
}

/// Copy-only pass over an existing tree, without running a build first.
pub fn cmd_copy(source: Utf8PathBuf, dest: Utf8PathBuf, patterns: &str) -> Result<()> {
    let source_root = if source.is_file() {
        source
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| Utf8PathBuf::from("."))
    } else {
        source
    };

    let req = CopyRequest::new(source_root, dest, split_patterns(patterns))?;

    let result = run_copy(&req, |ev| match ev {
        CopyEvent::Starting { summary } => {
            println!(
                "Found {} bin directories, {} matching files",
                summary.bin_dirs, summary.files_matched
            );
        }
        CopyEvent::Copying { from, to } => {
            println!("Copy from: {from}");
            println!("Copy to: {to}");
        }
    });

    if result.succeeded {
        println!("----- Copy Success ----- ({} files)", result.copied.len());
        Ok(())
    } else {
        let reason = result
            .failure_reason
            .unwrap_or_else(|| "Copy failed".to_string());
        anyhow::bail!(reason);
    }
}

pub fn applied_settings(base: AppSettings, overrides: &BuildOverrides) -> AppSettings {
    let mut settings = base;
    if let Some(t) = overrides.timeout_secs {
        settings.execution_timeout_secs = t;
    }
    if let Some(r) = &overrides.runner {
        settings.script_runner_path = r.to_string();
    }
    if let Some(s) = &overrides.script {
        settings.build_script_path = s.to_string();
    }
    settings
}
