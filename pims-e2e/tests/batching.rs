use std::sync::Arc;

use chrono::{TimeZone as _, Utc};
use pims_backend::membership::relation_key;
use pims_backend::Snapshot;
use pims_database::codec;
use pims_database::models::{Event, Gender, Participant, Participation, Region};
use pims_e2e::{assert_no_dangling_references, new_participant, Cluster};
use pims_remote::MemoryStore;
use serde_json::{Map, Value};

/// Whether `participant_id` and its participations are both present or both gone.
fn is_consistent(snapshot: &Snapshot, participant_id: &str) -> bool {
    let present = snapshot.participants().contains_key(participant_id);
    let registered = snapshot
        .participations()
        .values()
        .any(|participation| participation.participant_id == participant_id);
    present == registered
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cascades_are_never_observed_half_applied() {
    let cluster = Cluster::start(2, true).await.unwrap();
    let [deleting, observing] = &cluster.clients[..] else {
        unreachable!()
    };

    for round in 0..200 {
        let participant = deleting
            .add_participant(new_participant(&format!("Round {round}")), None)
            .await
            .unwrap();
        for event in ["event_1", "event_2", "event_3"] {
            assert!(deleting
                .add_participation(&participant.id, event)
                .await
                .unwrap());
        }
        cluster.settle().await.unwrap();

        let deleted = participant.id.clone();
        let mut watch = observing.watch();
        let _ = watch.borrow_and_update();
        let observer = tokio::spawn(async move {
            while watch.changed().await.is_ok() {
                let snapshot = Arc::clone(&watch.borrow_and_update());
                assert!(is_consistent(&snapshot, &deleted), "torn snapshot");
                assert_no_dangling_references(&snapshot);
                if !snapshot.participants().contains_key(&deleted) {
                    break;
                }
            }
        });

        deleting.delete_participant(&participant.id).await.unwrap();
        observer.await.unwrap();
    }
    cluster.assert_converged().await.unwrap();
}

const BULK: usize = 1100;

/// A remote with `BULK` participants, each registered for one event.
fn bulk_remote() -> MemoryStore {
    let created_at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    let event = Event {
        id: "e1".to_owned(),
        title: "Investment Summit".to_owned(),
        date: created_at,
        year: 2024,
        location: "Accra".to_owned(),
        category: "Conference".to_owned(),
    };
    let mut participants = Map::new();
    let mut participations = Map::new();
    for n in 0..BULK {
        let participant = Participant {
            id: format!("p{n}"),
            name: format!("Participant {n}"),
            gender: Gender::Female,
            institution: "Ashesi University".to_owned(),
            region: Region::Eastern,
            contact: String::new(),
            membership_status: true,
            certificate_issued: false,
            notes: String::new(),
            created_at,
            membership_id: format!("YIN-2024-{n:04}"),
            engagement_score: 0,
            photo_url: None,
            last_membership_card_generated_at: None,
        };
        let participation = Participation {
            id: Some(relation_key(&participant.id, &event.id)),
            participant_id: participant.id.clone(),
            event_id: event.id.clone(),
        };
        participations.insert(
            relation_key(&participant.id, &event.id),
            Value::Object(codec::encode(&participation).unwrap()),
        );
        participants.insert(
            participant.id.clone(),
            Value::Object(codec::encode(&participant).unwrap()),
        );
    }
    let mut events = Map::new();
    events.insert(event.id.clone(), Value::Object(codec::encode(&event).unwrap()));

    let mut root = Map::new();
    root.insert("participants".to_owned(), Value::Object(participants));
    root.insert("participations".to_owned(), Value::Object(participations));
    root.insert("events".to_owned(), Value::Object(events));
    MemoryStore::spawn_with(Value::Object(root))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bulk_deletes_of_more_than_a_thousand_records_are_read_back() {
    for _ in 0..10 {
        let cluster = Cluster::start_on(bulk_remote(), 2, false).await.unwrap();
        let [deleting, observing] = &cluster.clients[..] else {
            unreachable!()
        };
        assert_eq!(deleting.snapshot().participants().len(), BULK);
        assert_eq!(deleting.snapshot().kpis().average_participation_rate, 100.0);

        let mut watch = observing.watch();
        let _ = watch.borrow_and_update();
        let observer = tokio::spawn(async move {
            while watch.changed().await.is_ok() {
                let snapshot = Arc::clone(&watch.borrow_and_update());
                assert_no_dangling_references(&snapshot);
                if snapshot.participants().is_empty() {
                    return snapshot.participations().len();
                }
                assert_eq!(snapshot.participants().len(), BULK, "partially deleted");
            }
            usize::MAX
        });

        let ids: Vec<String> = (0..BULK).map(|n| format!("p{n}")).collect();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        deleting.delete_participants(&ids).await.unwrap();

        let snapshot = deleting.snapshot();
        assert!(snapshot.participants().is_empty());
        assert!(snapshot.participations().is_empty());
        assert_eq!(snapshot.events().len(), 1);
        assert_eq!(snapshot.kpis().total_participants, 0);
        assert_eq!(observer.await.unwrap(), 0);
        cluster.assert_converged().await.unwrap();
    }
}
