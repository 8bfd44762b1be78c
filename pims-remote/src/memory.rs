use std::collections::BTreeSet;

use futures::stream::{self, BoxStream};
use futures::StreamExt as _;
use serde_json::{Map, Value};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use crate::path::Path;
use crate::result::{Error, Result};
use crate::{key, tree, Batch, RemoteStore, TreeEvent};

#[derive(Debug)]
enum Command {
    Get(Path, oneshot::Sender<Option<Value>>),
    Write(Vec<(Path, Option<Value>)>, oneshot::Sender<Result<()>>),
    Subscribe(Vec<Path>, oneshot::Sender<mpsc::UnboundedReceiver<Batch>>),
    RejectWrites(Option<String>),
}

/// An in-process real-time store. All handles talk to one handler task that owns the tree, so
/// commands from every client are applied in a single order and every subscriber sees the
/// same sequence of events.
///
/// Every subscription has its own unbounded queue. The batch a write causes is pushed onto all
/// of them before that write is acknowledged.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    send_command: mpsc::UnboundedSender<Command>,
}

impl MemoryStore {
    /// Starts an empty store.
    ///
    /// ## Panics
    /// Panics when called outside of a tokio runtime.
    #[must_use]
    pub fn spawn() -> Self {
        Self::spawn_with(Value::Null)
    }

    /// Starts a store holding `root`.
    #[must_use]
    pub fn spawn_with(root: Value) -> Self {
        let (send_command, receive_command) = mpsc::unbounded_channel();
        tokio::spawn(MemoryHandler::handle(root, receive_command));
        Self { send_command }
    }

    /// While `reason` is set every write fails with [`Error::Rejected`], like a remote that
    /// denies permission.
    pub fn reject_writes(&self, reason: Option<&str>) {
        if self
            .send_command
            .send(Command::RejectWrites(reason.map(ToOwned::to_owned)))
            .is_err()
        {
            warn!("store task exited, ignoring reject_writes");
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.send_command
            .send(command(tx))
            .map_err(|_| Error::StoreTaskExited)?;
        rx.await.map_err(|_| Error::StoreTaskExited)
    }

    async fn write(&self, writes: Vec<(Path, Option<Value>)>) -> Result<()> {
        self.request(|tx| Command::Write(writes, tx)).await?
    }
}

impl RemoteStore for MemoryStore {
    type Listener = BoxStream<'static, Batch>;

    async fn get(&self, path: &Path) -> Result<Option<Value>> {
        self.request(|tx| Command::Get(path.clone(), tx)).await
    }

    async fn set(&self, path: &Path, value: Value) -> Result<()> {
        self.write(vec![(path.clone(), Some(value))]).await
    }

    async fn update(&self, path: &Path, fields: Map<String, Value>) -> Result<()> {
        let writes = fields
            .into_iter()
            .map(|(relative, value)| Ok((path.join(&Path::parse(&relative)?), Some(value))))
            .collect::<Result<Vec<_>>>()?;
        self.write(writes).await
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        self.write(vec![(path.clone(), None)]).await
    }

    fn push_key(&self) -> String {
        key::push_key(&mut rand::thread_rng())
    }

    async fn subscribe(&self, paths: &[Path]) -> Result<Self::Listener> {
        let mut receiver = self
            .request(|tx| Command::Subscribe(paths.to_vec(), tx))
            .await?;
        Ok(stream::poll_fn(move |cx| receiver.poll_recv(cx)).boxed())
    }
}

struct Subscription {
    paths: Vec<Path>,
    sender: mpsc::UnboundedSender<Batch>,
}

impl Subscription {
    /// What the `written` locations changed below the subscribed paths.
    fn batch(&self, root: &Value, written: &[Path]) -> Batch {
        let mut batch = Vec::new();
        for (index, subscribed) in self.paths.iter().enumerate() {
            let current = tree::get(root, subscribed);
            if written.iter().any(|path| path.is_ancestor_of(subscribed)) {
                batch.push((index, TreeEvent::Snapshot(current.cloned())));
                continue;
            }
            let keys: BTreeSet<&str> = written
                .iter()
                .filter_map(|path| subscribed.child_towards(path))
                .collect();
            batch.extend(keys.into_iter().map(|key| {
                (
                    index,
                    TreeEvent::Child {
                        key: key.to_owned(),
                        value: current.and_then(|value| value.get(key)).cloned(),
                    },
                )
            }));
        }
        batch
    }
}

struct MemoryHandler {
    root: Value,
    receive_command: mpsc::UnboundedReceiver<Command>,
    subscriptions: Vec<Subscription>,
    rejecting: Option<String>,
}

impl MemoryHandler {
    async fn handle(root: Value, receive_command: mpsc::UnboundedReceiver<Command>) {
        let mut this = Self {
            root: tree::normalize(root).unwrap_or(Value::Null),
            receive_command,
            subscriptions: Vec::new(),
            rejecting: None,
        };
        while let Some(command) = this.receive_command.recv().await {
            if let Err(error) = this.handle_command(command) {
                debug!("{error}");
            }
        }
        debug!("store handler closed");
    }

    fn handle_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Get(path, respond) => respond
                .send(tree::get(&self.root, &path).cloned())
                .map_err(|_| Error::CommandCallerExited),
            Command::Write(writes, respond) => {
                let result = self.handle_write(writes);
                respond.send(result).map_err(|_| Error::CommandCallerExited)
            }
            Command::Subscribe(paths, respond) => {
                let (sender, receiver) = mpsc::unbounded_channel();
                let initial = paths
                    .iter()
                    .enumerate()
                    .map(|(index, path)| {
                        (index, TreeEvent::Snapshot(tree::get(&self.root, path).cloned()))
                    })
                    .collect();
                // the receiver is still in hand, this cannot fail
                let _ = sender.send(initial);
                debug!(?paths, "subscribed");
                self.subscriptions.push(Subscription { paths, sender });
                respond
                    .send(receiver)
                    .map_err(|_| Error::CommandCallerExited)
            }
            Command::RejectWrites(reason) => {
                self.rejecting = reason;
                Ok(())
            }
        }
    }

    fn handle_write(&mut self, writes: Vec<(Path, Option<Value>)>) -> Result<()> {
        if let Some(reason) = &self.rejecting {
            return Err(Error::Rejected {
                path: writes
                    .first()
                    .map(|(path, _)| path.to_string())
                    .unwrap_or_default(),
                reason: reason.clone(),
            });
        }
        let mut written = Vec::with_capacity(writes.len());
        for (path, value) in writes {
            trace!(%path, "write");
            tree::write(&mut self.root, &path, value);
            written.push(path);
        }
        self.notify(&written);
        Ok(())
    }

    fn notify(&mut self, written: &[Path]) {
        let root = &self.root;
        self.subscriptions.retain(|subscription| {
            let batch = subscription.batch(root, written);
            let attached = if batch.is_empty() {
                !subscription.sender.is_closed()
            } else {
                subscription.sender.send(batch).is_ok()
            };
            if !attached {
                debug!(paths = ?subscription.paths, "detached");
            }
            attached
        });
    }
}
