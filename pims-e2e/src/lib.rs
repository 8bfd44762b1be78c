//! Several clients sharing one [`MemoryStore`], as several open consoles share one remote.

use std::sync::Arc;

use futures::future::try_join_all;
use pims_backend::{AppError, PimsStore, Snapshot};
use pims_config::Config;
use pims_database::models::{Gender, NewParticipant, Region};
use pims_remote::MemoryStore;
use tracing::info;

pub struct Cluster {
    pub remote: MemoryStore,
    pub clients: Vec<PimsStore<MemoryStore>>,
}

impl Cluster {
    /// Connects `clients` stores one after another. With `seed` the first one seeds the empty
    /// remote.
    pub async fn start(clients: usize, seed: bool) -> Result<Self, AppError> {
        Self::start_on(MemoryStore::spawn(), clients, seed).await
    }

    /// Like [`Self::start`] over a remote that may already hold data.
    pub async fn start_on(
        remote: MemoryStore,
        clients: usize,
        seed: bool,
    ) -> Result<Self, AppError> {
        pims_telemetry::setup_test_logging();
        let config = Config {
            seed_on_empty: seed,
            ..Config::default()
        };
        let mut connected = Vec::with_capacity(clients);
        for _ in 0..clients {
            connected.push(PimsStore::connect(remote.clone(), &config).await?);
        }
        info!(clients, seed, "cluster started");
        Ok(Self {
            remote,
            clients: connected,
        })
    }

    /// Waits until every client has published everything the remote sent so far.
    pub async fn settle(&self) -> Result<(), AppError> {
        try_join_all(self.clients.iter().map(PimsStore::settle)).await?;
        Ok(())
    }

    #[must_use]
    pub fn snapshots(&self) -> Vec<Arc<Snapshot>> {
        self.clients.iter().map(PimsStore::snapshot).collect()
    }

    /// Settles and checks that all clients mirror the same state.
    pub async fn assert_converged(&self) -> Result<Arc<Snapshot>, AppError> {
        self.settle().await?;
        let snapshots = self.snapshots();
        for (index, snapshot) in snapshots.iter().enumerate().skip(1) {
            assert_eq!(
                **snapshot, *snapshots[0],
                "client {index} diverged from client 0"
            );
        }
        Ok(Arc::clone(&snapshots[0]))
    }
}

#[must_use]
pub fn new_participant(name: &str) -> NewParticipant {
    NewParticipant {
        name: name.to_owned(),
        gender: Gender::Male,
        institution: "University of Cape Coast".to_owned(),
        region: Region::Central,
        contact: "+233 55 000 0000".to_owned(),
        membership_status: true,
        certificate_issued: false,
        notes: String::new(),
        photo_url: None,
    }
}

/// Panics if any relation in `snapshot` points at a record that does not exist.
pub fn assert_no_dangling_references(snapshot: &Snapshot) {
    for participation in snapshot.participations().values() {
        assert!(
            snapshot.participants().contains_key(&participation.participant_id),
            "participation of missing participant {participation:?}"
        );
        assert!(
            snapshot.events().contains_key(&participation.event_id),
            "participation in missing event {participation:?}"
        );
    }
    for membership in snapshot.club_memberships().values() {
        assert!(
            snapshot.participants().contains_key(&membership.participant_id),
            "membership of missing participant {membership:?}"
        );
        assert!(
            snapshot.clubs().contains_key(&membership.club_id),
            "membership in missing club {membership:?}"
        );
    }
    for volunteer in snapshot.volunteers().values() {
        assert!(
            snapshot.participants().contains_key(&volunteer.participant_id),
            "volunteer record of missing participant {volunteer:?}"
        );
    }
    for activity in snapshot.activities().values() {
        assert!(
            snapshot.volunteers().contains_key(&activity.volunteer_id),
            "activity of missing volunteer {activity:?}"
        );
        if let Some(event_id) = &activity.event_id {
            assert!(
                snapshot.events().contains_key(event_id),
                "activity at missing event {activity:?}"
            );
        }
    }
}
