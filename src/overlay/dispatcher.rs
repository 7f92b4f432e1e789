use std::{
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use tokio::sync::oneshot;

use crate::platform::OverlaySurface;

use super::surface::{execute, OpOutcome, SurfaceOp};

type SurfaceTask = Box<dyn FnOnce(&mut dyn OverlaySurface) + Send + 'static>;

enum SurfaceCommand {
    Execute(SurfaceTask),
    Shutdown,
}

struct DispatcherInner {
    sender: mpsc::Sender<SurfaceCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DispatcherInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(SurfaceCommand::Shutdown) {
                error!("Failed to send shutdown to surface thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join surface thread: {join_err:?}");
            }
        }
    }
}

/// Handle to the thread that owns the overlay surface.
///
/// Window operations must run on the thread that owns the display, so the
/// surface is built on a dedicated thread and every batch of operations is
/// marshalled there. Callers await the batch result without blocking the
/// runtime.
#[derive(Clone)]
pub struct SurfaceDispatcher {
    inner: Arc<DispatcherInner>,
}

impl SurfaceDispatcher {
    /// Spawns the surface thread and builds the surface on it with `factory`.
    pub fn spawn<F, S>(factory: F) -> Result<Self>
    where
        F: FnOnce() -> Result<S> + Send + 'static,
        S: OverlaySurface + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel::<SurfaceCommand>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();

        let worker = thread::Builder::new()
            .name("tapguard-surface".into())
            .spawn(move || {
                let mut surface = match factory() {
                    Ok(surface) => surface,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err.context("failed to create overlay surface")));
                        return;
                    }
                };

                if ready_tx.send(Ok(())).is_err() {
                    error!("Surface initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        SurfaceCommand::Execute(task) => task(&mut surface),
                        SurfaceCommand::Shutdown => break,
                    }
                }

                info!("Surface thread shutting down");
            })
            .context("failed to spawn surface thread")?;

        ready_rx
            .recv()
            .context("surface thread exited before signaling readiness")??;

        Ok(Self {
            inner: Arc::new(DispatcherInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    pub async fn run<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut dyn OverlaySurface) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = SurfaceCommand::Execute(Box::new(move |surface| {
            if reply_tx.send(task(surface)).is_err() {
                error!("Surface caller dropped before receiving result");
            }
        }));

        self.inner
            .sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to surface thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("surface thread terminated unexpectedly"))
    }

    /// Executes `ops` on the surface thread in order.
    pub async fn apply(&self, ops: Vec<SurfaceOp>) -> Result<Vec<OpOutcome>> {
        if ops.is_empty() {
            return Ok(Vec::new());
        }
        self.run(move |surface| execute(surface, ops)).await
    }
}
