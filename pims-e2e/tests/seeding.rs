use pims_backend::seed::SeedData;
use pims_backend::PimsStore;
use pims_config::Config;
use pims_e2e::{new_participant, Cluster};

#[tokio::test]
async fn only_the_first_client_seeds() {
    let cluster = Cluster::start(2, true).await.unwrap();
    let snapshot = cluster.assert_converged().await.unwrap();
    let seed = SeedData::new();
    assert_eq!(snapshot.participants().len(), seed.participants.len());
    assert_eq!(snapshot.participations().len(), seed.participations.len());
    assert_eq!(snapshot.users().len(), seed.users.len());
}

#[tokio::test]
async fn edited_data_is_not_reseeded() {
    let cluster = Cluster::start(1, true).await.unwrap();
    let client = &cluster.clients[0];
    let mut participant = client.snapshot().participants()["participant_4"].clone();
    participant.name = "Renamed".to_owned();
    client.update_participant(&participant).await.unwrap();
    client.delete_event("event_5").await.unwrap();

    let late = PimsStore::connect(cluster.remote.clone(), &Config::default())
        .await
        .unwrap();
    let snapshot = late.snapshot();
    assert_eq!(snapshot.participants()["participant_4"].name, "Renamed");
    assert!(!snapshot.events().contains_key("event_5"));
    assert_eq!(*snapshot, *client.snapshot());
}

#[tokio::test]
async fn a_store_with_participants_is_left_as_is() {
    let cluster = Cluster::start(1, false).await.unwrap();
    let participant = cluster.clients[0]
        .add_participant(new_participant("Esi"), None)
        .await
        .unwrap();

    let late = PimsStore::connect(cluster.remote.clone(), &Config::default())
        .await
        .unwrap();
    let snapshot = late.snapshot();
    assert_eq!(snapshot.participants().len(), 1);
    assert!(snapshot.participants().contains_key(&participant.id));
    assert!(snapshot.users().is_empty());
    assert!(snapshot.events().is_empty());
}
