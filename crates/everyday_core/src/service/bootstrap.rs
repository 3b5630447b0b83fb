//! One-shot workspace initialization.
//!
//! # Responsibility
//! - Open the store exactly once per handle, whichever caller arrives first.
//! - Let a background warm-up thread and foreground commands race safely.
//!
//! # Invariants
//! - Concurrent first calls collapse into a single opener run.
//! - A failed open leaves the handle uninitialized; the next call retries.
//! - Callers must not hold a guard from [`WorkspaceHandle::ready`] while
//!   calling it again on the same thread.

use crate::config::{StoreConfig, WorkspaceOptions};
use crate::service::streak::SystemClock;
use crate::service::workspace_service::{WorkspaceResult, WorkspaceService};
use crate::store::DocumentStore;
use log::{error, info};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

type Opener = dyn Fn() -> WorkspaceResult<WorkspaceService> + Send + Sync;

/// Lazily opened, shareable workspace.
pub struct WorkspaceHandle {
    opener: Box<Opener>,
    cell: OnceCell<Mutex<WorkspaceService>>,
}

impl WorkspaceHandle {
    /// Handle that opens the live store described by `config`.
    pub fn new(config: StoreConfig, options: WorkspaceOptions) -> Self {
        Self::with_opener(move || {
            let store = DocumentStore::open(config.db_path())?;
            WorkspaceService::open(store, Box::new(SystemClock), options.clone())
        })
    }

    /// Handle with a custom open routine.
    pub fn with_opener(
        opener: impl Fn() -> WorkspaceResult<WorkspaceService> + Send + Sync + 'static,
    ) -> Self {
        Self {
            opener: Box::new(opener),
            cell: OnceCell::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Foreground access: opens the workspace if needed and waits for it.
    pub fn ready(&self) -> WorkspaceResult<MutexGuard<'_, WorkspaceService>> {
        let cell = self.cell.get_or_try_init(|| {
            let started_at = Instant::now();
            info!("event=workspace_init module=bootstrap status=start");
            match (self.opener)() {
                Ok(service) => {
                    info!(
                        "event=workspace_init module=bootstrap status=ok duration_ms={}",
                        started_at.elapsed().as_millis()
                    );
                    Ok(Mutex::new(service))
                }
                Err(err) => {
                    error!(
                        "event=workspace_init module=bootstrap status=error duration_ms={} error={}",
                        started_at.elapsed().as_millis(),
                        err
                    );
                    Err(err)
                }
            }
        })?;
        Ok(lock(cell))
    }

    /// Background access: `None` until the workspace is ready, never blocks on
    /// initialization.
    pub fn try_ready(&self) -> Option<MutexGuard<'_, WorkspaceService>> {
        self.cell.get().map(lock)
    }

    /// Starts initialization on a background thread.
    pub fn warm_up(self: &Arc<Self>) -> JoinHandle<()> {
        let handle = Arc::clone(self);
        thread::spawn(move || {
            if let Err(err) = handle.ready() {
                error!(
                    "event=workspace_warm_up module=bootstrap status=error error={}",
                    err
                );
            }
        })
    }
}

fn lock(service: &Mutex<WorkspaceService>) -> MutexGuard<'_, WorkspaceService> {
    service.lock().unwrap_or_else(PoisonError::into_inner)
}
