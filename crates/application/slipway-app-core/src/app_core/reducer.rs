use slipway_core::BuildStatus;

use crate::domain::{AppState, LogLine, Phase};

use super::events::{BuildRunEvent, DomainEvent};

pub fn reduce(mut state: AppState, ev: DomainEvent) -> AppState {
    match ev {
        DomainEvent::SettingsLoaded(s) => {
            state.settings = s;
        }

        DomainEvent::BuildEvent { run_id: _, ev } => apply_build_event(&mut state, ev),

        DomainEvent::UserError(msg) => {
            state.log.push(LogLine::error(format!("Warning: {msg}")));
        }
    }
    state
}

fn apply_build_event(state: &mut AppState, ev: BuildRunEvent) {
    match ev {
        BuildRunEvent::Started => {
            // Each trigger starts with a cleared output panel.
            state.log.clear();
            state.phase = Phase::Building;
            state.last_status = None;
            state.last_copy_succeeded = None;
        }

        BuildRunEvent::OutputLine(line) => {
            state.log.push(LogLine::info(line));
        }

        BuildRunEvent::ErrorLine(line) => {
            state.log.push(LogLine::error(line));
        }

        BuildRunEvent::BuildSucceeded { elapsed, copying } => {
            state
                .log
                .push(LogLine::info("--------------------------------------------------"));
            state.log.push(LogLine::info(format!(
                "----- Build Success ----- ({:.1}s)",
                elapsed.as_secs_f64()
            )));
            state.last_status = Some(BuildStatus::Success);
            state.phase = if copying { Phase::Copying } else { Phase::Idle };
        }

        BuildRunEvent::BuildTimedOut { elapsed } => {
            state.log.push(LogLine::error(format!(
                "Warning: build script taking too long ({:.0}s), process killed",
                elapsed.as_secs_f64()
            )));
            state.last_status = Some(BuildStatus::TimedOut);
            state.phase = Phase::Idle;
        }

        BuildRunEvent::BuildFailed { message } => {
            state.log.push(LogLine::error(format!("Warning: {message}")));
            state.log.push(LogLine::error("----- Build Fail -----"));
            state.last_status = Some(BuildStatus::Failed(message));
            state.phase = Phase::Idle;
        }

        BuildRunEvent::CopyStarted => {
            state
                .log
                .push(LogLine::info("Proceed to copy bin files to destination path"));
            state.phase = Phase::Copying;
        }

        BuildRunEvent::CopyScanned { bin_dirs, files } => {
            state.log.push(LogLine::info(format!(
                "Found {bin_dirs} bin directories, {files} matching files"
            )));
        }

        BuildRunEvent::CopyingFile { from, to } => {
            state.log.push(LogLine::info(format!("Copy from: {from}")));
            state.log.push(LogLine::info(format!("Copy to: {to}")));
        }

        BuildRunEvent::CopySucceeded { files } => {
            state
                .log
                .push(LogLine::info(format!("----- Copy Success ----- ({files} files)")));
            state.last_copy_succeeded = Some(true);
            state.phase = Phase::Idle;
        }

        BuildRunEvent::CopyFailed { message } => {
            state.log.push(LogLine::error(format!("Warning: {message}")));
            state.log.push(LogLine::error("----- Copy Fail -----"));
            state.last_copy_succeeded = Some(false);
            state.phase = Phase::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_core::events::BuildRunId;
    use crate::domain::LogKind;
    use std::time::Duration;

    fn build_ev(ev: BuildRunEvent) -> DomainEvent {
        DomainEvent::BuildEvent {
            run_id: BuildRunId::new_v4(),
            ev,
        }
    }

    #[test]
    fn started_clears_log_and_enters_building() {
        let mut state = AppState::default();
        state.log.push(LogLine::info("stale"));

        let state = reduce(state, build_ev(BuildRunEvent::Started));

        assert!(state.log.is_empty());
        assert_eq!(state.phase, Phase::Building);
    }

    #[test]
    fn stream_lines_keep_arrival_order_and_kind() {
        let state = AppState::default();
        let state = reduce(state, build_ev(BuildRunEvent::OutputLine("one".into())));
        let state = reduce(state, build_ev(BuildRunEvent::ErrorLine("bad".into())));
        let state = reduce(state, build_ev(BuildRunEvent::OutputLine("two".into())));

        let texts: Vec<_> = state.log.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "bad", "two"]);
        assert_eq!(state.log[1].kind, LogKind::Error);
    }

    #[test]
    fn success_without_copy_returns_to_idle_with_marker() {
        let state = reduce(
            AppState::default(),
            build_ev(BuildRunEvent::BuildSucceeded {
                elapsed: Duration::from_secs(12),
                copying: false,
            }),
        );

        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.last_status, Some(slipway_core::BuildStatus::Success));
        assert!(state.log.iter().any(|l| l.text.contains("Build Success")));
    }

    #[test]
    fn success_with_copy_pending_stays_busy() {
        let state = reduce(
            AppState::default(),
            build_ev(BuildRunEvent::BuildSucceeded {
                elapsed: Duration::from_secs(12),
                copying: true,
            }),
        );

        assert_eq!(state.phase, Phase::Copying);
    }

    #[test]
    fn timeout_logs_warning_and_idles() {
        let state = reduce(
            AppState::default(),
            build_ev(BuildRunEvent::BuildTimedOut {
                elapsed: Duration::from_secs(300),
            }),
        );

        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.last_status, Some(slipway_core::BuildStatus::TimedOut));
        assert!(state
            .log
            .iter()
            .any(|l| l.kind == LogKind::Error && l.text.contains("taking too long")));
    }

    #[test]
    fn copying_file_logs_a_from_to_pair() {
        let state = reduce(
            AppState::default(),
            build_ev(BuildRunEvent::CopyingFile {
                from: "/src/bin/a.dll".into(),
                to: "/dest/a.dll".into(),
            }),
        );

        let texts: Vec<_> = state.log.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Copy from: /src/bin/a.dll", "Copy to: /dest/a.dll"]);
    }

    #[test]
    fn copy_failure_logs_reason_then_fail_marker() {
        let state = reduce(
            AppState::default(),
            build_ev(BuildRunEvent::CopyFailed {
                message: "permission denied".into(),
            }),
        );

        let texts: Vec<_> = state.log.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Warning: permission denied", "----- Copy Fail -----"]
        );
        assert_eq!(state.last_copy_succeeded, Some(false));
        assert_eq!(state.phase, Phase::Idle);
    }
}
