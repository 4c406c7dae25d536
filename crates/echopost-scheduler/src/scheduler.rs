//! Lifecycle wrapper around the engine.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use echopost_linkedin::PublishClient;
use echopost_store::PostStore;

use crate::SchedulerEngine;

struct RunningLoop {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owns the engine and guarantees at most one polling loop per process.
///
/// Construct one at process startup and hand references to whatever
/// supervises lifecycle. This is per-process only: multiple processes
/// polling the same store can each publish the same post.
pub struct Scheduler<S, P> {
    engine: Arc<SchedulerEngine<S, P>>,
    running: Mutex<Option<RunningLoop>>,
}

impl<S, P> Scheduler<S, P>
where
    S: PostStore + 'static,
    P: PublishClient + 'static,
{
    pub fn new(engine: SchedulerEngine<S, P>) -> Self {
        Self {
            engine: Arc::new(engine),
            running: Mutex::new(None),
        }
    }

    /// Direct access to the engine, e.g. to run a cycle on demand.
    pub fn engine(&self) -> &SchedulerEngine<S, P> {
        &self.engine
    }

    /// Spawn the polling loop. No-op if already running.
    pub async fn start(&self) {
        let mut running = self.running.lock().await;
        if running.is_some() {
            debug!("scheduler already running");
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let engine = Arc::clone(&self.engine);
        let task = tokio::spawn(async move {
            engine.run(shutdown_rx).await;
        });

        *running = Some(RunningLoop { shutdown_tx, task });
        info!("scheduler started");
    }

    /// Signal shutdown and wait for the loop to finish. Safe to call when
    /// not started.
    pub async fn stop(&self) {
        let Some(RunningLoop { shutdown_tx, task }) = self.running.lock().await.take() else {
            return;
        };

        let _ = shutdown_tx.send(true);
        let _ = task.await;
        info!("scheduler stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }
}
