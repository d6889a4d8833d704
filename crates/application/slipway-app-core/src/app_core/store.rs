use std::sync::{Arc, Mutex};

use crate::domain::AppState;

use super::{events::DomainEvent, reducer::reduce};

/// Shared application state. All mutation funnels through `apply`, which
/// runs the pure reducer; the mutex makes the log panel safe to read from
/// the consumer thread while a worker is running.
#[derive(Clone)]
pub struct AppStore {
    inner: Arc<Mutex<AppState>>,
}

impl AppStore {
    pub fn new(state: AppState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn state(&self) -> AppState {
        self.inner.lock().unwrap().clone()
    }

    pub fn apply(&self, ev: DomainEvent) {
        let mut guard = self.inner.lock().unwrap();
        let next = reduce(guard.clone(), ev);
        *guard = next;
    }

    pub(crate) fn with_state_mut<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut guard = self.inner.lock().unwrap();
        f(&mut guard)
    }
}
