use std::sync::Arc;
use tokio::sync::mpsc;

use crate::app_core::{AppCommand, BuildInputs, BuildRunId, DomainEvent};
use crate::domain::Phase;
use crate::orchestrator::{BuildOrchestrator, CopyPlan};
use crate::ports::SettingsRepo;

use slipway_core::{patterns::split_patterns, BuildRequest};

pub struct AppKernel<S> {
    pub store: crate::app_core::AppStore,
    settings: Arc<S>,
    orchestrator: BuildOrchestrator,

    tx: mpsc::Sender<DomainEvent>,
    rx: mpsc::Receiver<DomainEvent>,
}

impl<S> AppKernel<S>
where
    S: SettingsRepo,
{
    pub fn new(store: crate::app_core::AppStore, settings: S) -> Self {
        let (tx, rx) = mpsc::channel(slipway_config::EVENT_CHANNEL_CAPACITY);
        let orchestrator = BuildOrchestrator::new(tx.clone());
        Self {
            store,
            settings: Arc::new(settings),
            orchestrator,
            tx,
            rx,
        }
    }

    pub fn dispatch(&mut self, cmd: AppCommand) {
        match cmd {
            AppCommand::LoadSettings => {
                let tx = self.tx.clone();
                let settings = self.settings.clone();
                let spawn_res = std::thread::Builder::new()
                    .name("slipway-load-settings".into())
                    .spawn(move || match settings.load() {
                        Ok(s) => {
                            let _ = tx.blocking_send(DomainEvent::SettingsLoaded(s));
                        }
                        Err(e) => {
                            let _ = tx.blocking_send(DomainEvent::UserError(e.to_string()));
                        }
                    });
                if let Err(e) = spawn_res {
                    self.store.apply(DomainEvent::UserError(format!(
                        "Failed to start settings load worker thread: {e}"
                    )));
                }
            }

            AppCommand::UpdateSettings(s) => {
                self.store.apply(DomainEvent::SettingsLoaded(s.clone()));
                let tx = self.tx.clone();
                let settings = self.settings.clone();
                let spawn_res = std::thread::Builder::new()
                    .name("slipway-save-settings".into())
                    .spawn(move || {
                        if let Err(e) = settings.save(&s) {
                            let _ = tx.blocking_send(DomainEvent::UserError(e.to_string()));
                        }
                    });
                if let Err(e) = spawn_res {
                    self.store.apply(DomainEvent::UserError(format!(
                        "Failed to start settings save worker thread: {e}"
                    )));
                }
            }

            AppCommand::StartBuild(inputs) => self.start_build(inputs),

            AppCommand::CancelBuild => self.orchestrator.cancel(),
        }
    }

    fn start_build(&mut self, inputs: BuildInputs) {
        let snapshot = self.store.state();

        // One build at a time: reject triggers while a run is in flight.
        if !snapshot.is_idle() {
            self.store
                .apply(DomainEvent::UserError("A build is already running".into()));
            return;
        }

        let settings = snapshot.settings;
        let req = match BuildRequest::new(
            inputs.solution_path.as_str(),
            settings.script_runner_path.as_str(),
            settings.build_script_path.as_str(),
            settings.timeout(),
        ) {
            Ok(r) => r,
            Err(e) => {
                self.store.apply(DomainEvent::UserError(e.to_string()));
                return;
            }
        };

        let copy = inputs.copy_enabled.then(|| CopyPlan {
            destination_dir: inputs.destination_dir.clone(),
            patterns: split_patterns(&inputs.extension_patterns),
        });

        let run_id: BuildRunId = uuid::Uuid::new_v4();

        // Enter Building before the worker's Started event lands so a
        // second trigger arriving in between is already rejected.
        self.store.with_state_mut(|state| {
            state.run_id = Some(run_id);
            state.phase = Phase::Building;
        });

        if let Err(e) = self.orchestrator.start_build(req, copy, run_id) {
            self.abort_start(e.to_string());
        }
    }

    /// Roll back a trigger whose worker never started: no terminal event
    /// will arrive, so the run must not stay registered as in flight.
    fn abort_start(&self, message: String) {
        self.store.with_state_mut(|state| {
            state.phase = Phase::Idle;
            state.run_id = None;
        });
        self.store.apply(DomainEvent::UserError(message));
    }

    /// Call from the consumer loop to fold pending worker events into the
    /// store. Events from a superseded run are dropped.
    pub fn tick(&mut self) {
        while let Ok(ev) = self.rx.try_recv() {
            if let DomainEvent::BuildEvent { run_id, .. } = &ev {
                let current = self.store.state().run_id;
                if current != Some(*run_id) {
                    continue;
                }
            }
            self.store.apply(ev);
        }
    }

    pub fn sender(&self) -> mpsc::Sender<DomainEvent> {
        self.tx.clone()
    }
}
