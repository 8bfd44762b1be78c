use std::collections::BTreeSet;
use std::sync::Arc;

use futures::stream::BoxStream;
use futures::{FutureExt as _, StreamExt as _};
use pims_database::Collection;
use pims_remote::TreeEvent;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::error::AppError;
use crate::snapshot::Snapshot;

/// One subscription to every collection. Each item holds everything one write changed.
pub type Events = BoxStream<'static, Vec<(Collection, TreeEvent)>>;

/// Owns the task that folds remote events into the published [`Snapshot`].
#[derive(Debug)]
pub struct SyncHandle {
    send_barrier: mpsc::UnboundedSender<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    pub fn spawn(events: Events, published: watch::Sender<Arc<Snapshot>>) -> Self {
        let (send_barrier, receive_barrier) = mpsc::unbounded_channel();
        let task = tokio::spawn(
            SyncTask {
                snapshot: Snapshot::default(),
                events,
                receive_barrier,
                published,
            }
            .run(),
        );
        Self { send_barrier, task }
    }

    /// Resolves once every event that was ready when called has been published.
    pub async fn settle(&self) -> Result<(), AppError> {
        let (tx, rx) = oneshot::channel();
        self.send_barrier
            .send(tx)
            .map_err(|_| AppError::SyncTaskExited)?;
        rx.await.map_err(|_| AppError::SyncTaskExited)
    }

    /// Stops the task. Its listeners are dropped with it, which detaches them from the remote.
    pub fn abort(&self) {
        self.task.abort();
    }
}

struct SyncTask {
    snapshot: Snapshot,
    events: Events,
    receive_barrier: mpsc::UnboundedReceiver<oneshot::Sender<()>>,
    published: watch::Sender<Arc<Snapshot>>,
}

impl SyncTask {
    async fn run(mut self) {
        loop {
            tokio::select! {
                event = self.events.next() => {
                    let Some(batch) = event else {
                        debug!("listener closed, stopping sync");
                        break;
                    };
                    self.apply_ready(Some(batch));
                }
                barrier = self.receive_barrier.recv() => {
                    let Some(done) = barrier else {
                        break;
                    };
                    self.apply_ready(None);
                    let _ = done.send(());
                }
            }
        }
    }

    /// Applies `first` and every batch already queued behind it, then publishes once.
    ///
    /// A batch carries all events of one write and a write is acknowledged only after its batch
    /// is queued, so a multi-location write is never published half-applied and a settled
    /// barrier covers every write acknowledged before it.
    fn apply_ready(&mut self, first: Option<Vec<(Collection, TreeEvent)>>) {
        let mut touched = BTreeSet::new();
        let mut count = 0_usize;
        // Unconstrained, or the runtime's cooperative budget could end a large batch early.
        let queued = std::iter::from_fn(|| {
            tokio::task::unconstrained(self.events.next())
                .now_or_never()
                .flatten()
        });
        for (collection, event) in first.into_iter().chain(queued).flatten() {
            trace!(%collection, ?event, "applying");
            self.snapshot.apply(collection, event);
            touched.insert(collection);
            count += 1;
        }
        if count == 0 {
            return;
        }
        self.snapshot.refresh_derived();
        debug!(count, ?touched, "publishing snapshot");
        self.published.send_replace(Arc::new(self.snapshot.clone()));
    }
}
