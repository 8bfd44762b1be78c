mod clubs;
mod events;
mod participants;
mod relations;
mod users;
mod volunteers;

use std::sync::Arc;

use futures::StreamExt as _;
use pims_config::Config;
use pims_database::{codec, Collection, Record};
use pims_remote::{Path, RemoteStore};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::cascade::{DeletionPlan, DeletionTarget};
use crate::error::AppError;
use crate::seed;
use crate::snapshot::{Snapshot, Table};
use crate::sync::SyncHandle;

/// The synchronization and mutation store.
///
/// Mirrors every collection of the remote into a local [`Snapshot`] and is the only place that
/// writes to the remote. Every operation returns after the remote acknowledged the write and the
/// local mirror reflects it, so a caller always reads its own writes.
///
/// Dropping the store detaches from the remote.
pub struct PimsStore<R: RemoteStore> {
    remote: R,
    membership_id_prefix: String,
    snapshot: watch::Receiver<Arc<Snapshot>>,
    sync: SyncHandle,
}

impl<R: RemoteStore> PimsStore<R> {
    /// Seeds an empty remote if configured to, subscribes to every collection and waits until
    /// each one has been received once.
    #[instrument(skip_all)]
    pub async fn connect(remote: R, config: &Config) -> Result<Self, AppError> {
        if config.seed_on_empty {
            seed::seed_if_empty(&remote).await?;
        }

        let paths = Collection::ALL.map(Collection::path);
        let events = remote
            .subscribe(&paths)
            .await?
            .map(|batch| {
                batch
                    .into_iter()
                    .filter_map(|(index, event)| {
                        Collection::ALL.get(index).map(|collection| (*collection, event))
                    })
                    .collect::<Vec<_>>()
            })
            .boxed();
        let (published, mut snapshot) = watch::channel(Arc::new(Snapshot::default()));
        let sync = SyncHandle::spawn(events, published);

        snapshot
            .wait_for(|snapshot| snapshot.is_fully_synced())
            .await
            .map_err(|_| AppError::SyncTaskExited)?;
        info!(kpis = ?snapshot.borrow().kpis(), "connected");

        Ok(Self {
            remote,
            membership_id_prefix: config.membership_id_prefix.clone(),
            snapshot,
            sync,
        })
    }

    /// The current state of the local mirror.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    /// A receiver that is notified whenever a new snapshot is published.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.clone()
    }

    #[must_use]
    pub const fn remote(&self) -> &R {
        &self.remote
    }

    pub fn close(self) {
        debug!("closing store");
    }

    /// Waits until everything the remote has sent so far is published.
    pub async fn settle(&self) -> Result<(), AppError> {
        self.sync.settle().await
    }

    /// Writes every `(root relative location, value)` pair in one atomic update.
    async fn write(&self, update: Map<String, Value>) -> Result<(), AppError> {
        debug!(locations = update.len(), "writing");
        self.remote.update(&Path::root(), update).await?;
        self.settle().await
    }

    /// Replaces the record at its key.
    async fn put<T: Table>(&self, record: &T) -> Result<(), AppError> {
        let path = T::COLLECTION.record_path(record.id())?;
        debug!(%path, "writing");
        self.remote
            .set(&path, Value::Object(codec::encode(record)?))
            .await?;
        self.settle().await
    }

    /// Overwrites the stored fields of an existing record with those of `record`. Fields that
    /// are absent in `record`, including every `None`, keep their stored value.
    async fn patch<T: Table>(&self, record: &T) -> Result<(), AppError> {
        self.ensure_exists::<T>(record.id())?;
        let path = T::COLLECTION.record_path(record.id())?;
        debug!(%path, "updating");
        self.remote.update(&path, codec::encode(record)?).await?;
        self.settle().await
    }

    fn ensure_exists<T: Table>(&self, id: &str) -> Result<(), AppError> {
        if self.snapshot.borrow().contains::<T>(id) {
            Ok(())
        } else {
            Err(AppError::NotFound {
                collection: T::COLLECTION,
                id: id.to_owned(),
            })
        }
    }

    /// Deletes the targets and everything depending on them in one write.
    async fn delete(
        &self,
        targets: impl IntoIterator<Item = DeletionTarget> + Send,
    ) -> Result<(), AppError> {
        let plan = DeletionPlan::new(&self.snapshot(), targets);
        if plan.is_empty() {
            debug!("nothing to delete");
            return Ok(());
        }
        self.write(plan.to_update()).await
    }
}

impl<R: RemoteStore> Drop for PimsStore<R> {
    fn drop(&mut self) {
        self.sync.abort();
    }
}

/// Adds `record` to a root relative multi-location update.
fn insert_record<T: Record>(update: &mut Map<String, Value>, record: &T) -> Result<(), AppError> {
    update.insert(
        format!("{}/{}", T::COLLECTION, record.id()),
        Value::Object(codec::encode(record)?),
    );
    Ok(())
}
