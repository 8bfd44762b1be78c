//! A real-time, tree structured key-value store as seen from a client.
//!
//! Writers address values by [`Path`]. Readers [`RemoteStore::subscribe`] to a set of paths and
//! receive a [`TreeEvent::Snapshot`] of each first, followed by incremental [`TreeEvent::Child`]
//! changes for their direct children. Everything one write changes arrives as one [`Batch`].

pub mod key;
pub mod memory;
pub mod path;
pub mod result;
pub mod tree;

use core::future::Future;

use futures::Stream;
pub use memory::MemoryStore;
pub use path::Path;
pub use result::{Error, Result};
use serde_json::{Map, Value};

/// What a subscriber of path `S` receives.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeEvent {
    /// The whole value at `S`. Sent when subscribing and whenever `S` or one of its ancestors is
    /// written.
    Snapshot(Option<Value>),
    /// The new value of `S/key` after a write inside of it. `None` means it was removed.
    Child { key: String, value: Option<Value> },
}

/// Events for the subscribed paths, each tagged with the index of its path in the slice passed
/// to [`RemoteStore::subscribe`]. One batch never mixes two writes and holds all of one write.
pub type Batch = Vec<(usize, TreeEvent)>;

/// Handle to a remote tree store. Handles are cheap to clone and share one connection.
///
/// The batch a write causes is queued on the affected listeners of all handles before the
/// write resolves. Readers rely on this to observe their own writes.
pub trait RemoteStore: Clone + Send + Sync + 'static {
    /// Yields one batch with the current snapshot of every path first. Listeners never lag or
    /// drop batches. Dropping it detaches the subscription.
    type Listener: Stream<Item = Batch> + Send + Unpin + 'static;

    fn get(&self, path: &Path) -> impl Future<Output = Result<Option<Value>>> + Send;

    /// Replaces the value at `path`. Writing `null` removes it.
    fn set(&self, path: &Path, value: Value) -> impl Future<Output = Result<()>> + Send;

    /// Writes every `(relative path, value)` pair below `path` in one atomic step. Locations not
    /// named are left untouched, `null` removes.
    fn update(
        &self,
        path: &Path,
        fields: Map<String, Value>,
    ) -> impl Future<Output = Result<()>> + Send;

    fn remove(&self, path: &Path) -> impl Future<Output = Result<()>> + Send;

    /// A fresh key that is unique with overwhelming probability.
    fn push_key(&self) -> String;

    fn subscribe(&self, paths: &[Path]) -> impl Future<Output = Result<Self::Listener>> + Send;
}
