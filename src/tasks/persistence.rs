use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::{
    select,
    sync::{watch, Notify},
};
use tracing::{error, instrument, trace};

use crate::{storage::save_state, store::Shared};

/// Published as the completed generation once the worker has exited, so
/// nothing waits on a save that will never run
const STOPPED: u64 = u64::MAX;

/// Save requests waiting for the background writer.
///
/// Requests only bump a generation counter and wake the writer. The writer
/// always persists the latest state, so a burst of requests collapses into
/// one or two writes and there is never more than one write in flight.
#[derive(Debug)]
pub(crate) struct SaveQueue {
    wake: Notify,
    stop: Notify,
    requested: AtomicU64,
    completed: watch::Sender<u64>,
}

impl Default for SaveQueue {
    fn default() -> Self {
        Self {
            wake: Notify::new(),
            stop: Notify::new(),
            requested: AtomicU64::new(0),
            completed: watch::channel(0).0,
        }
    }
}

impl SaveQueue {
    /// Returns the generation that has to complete for this request to be on disk
    pub fn request(&self) -> u64 {
        let generation = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        self.wake.notify_one();
        generation
    }

    pub fn requested(&self) -> u64 {
        self.requested.load(Ordering::SeqCst)
    }

    /// Waits until every generation up to `generation` has been attempted
    pub async fn wait_for(&self, generation: u64) {
        let mut completed = self.completed.subscribe();
        // The sender lives as long as `self`, so this only ends once the generation is reached
        let _ = completed.wait_for(|done| *done >= generation).await;
    }

    pub fn stop(&self) {
        self.stop.notify_one();
    }

    /// Waits until the worker has finished its last write and exited
    pub async fn wait_stopped(&self) {
        self.wait_for(STOPPED).await;
    }
}

#[instrument(skip_all)]
pub(crate) async fn save_worker(shared: Arc<Shared>) {
    let saves = &shared.saves;

    loop {
        select! {
            biased;

            () = saves.wake.notified() => {
                let generation = saves.requested();
                let snapshot = shared.snapshot();
                trace!(generation, entries = snapshot.entries.len(), "Saving hydration data");

                if let Err(error) = save_state(shared.storage.as_ref(), &snapshot).await {
                    error!(%error, generation, "Failed to save hydration data");
                }

                saves.completed.send_replace(generation);
            },
            () = saves.stop.notified() => {
                trace!("Save worker stopping");
                break;
            },
        };
    }

    saves.completed.send_replace(STOPPED);
}
