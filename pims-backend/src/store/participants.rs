use std::collections::HashSet;

use chrono::{DateTime, Datelike as _, Utc};
use pims_database::models::{ClubMembership, NewParticipant, Participant};
use pims_database::{date, Collection};
use pims_remote::RemoteStore;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use super::{insert_record, PimsStore};
use crate::cascade::DeletionTarget;
use crate::error::AppError;
use crate::membership::{membership_id, relation_key};

impl<R: RemoteStore> PimsStore<R> {
    /// Creates a participant with a fresh id and membership id. With `club_id` the participant
    /// joins that club in the same write.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn add_participant(
        &self,
        new: NewParticipant,
        club_id: Option<&str>,
    ) -> Result<Participant, AppError> {
        let created_at = Utc::now();
        let membership_id = {
            let snapshot = self.snapshot();
            let taken: HashSet<&str> = snapshot
                .participants()
                .values()
                .map(|participant| participant.membership_id.as_str())
                .collect();
            membership_id(
                &self.membership_id_prefix,
                created_at.year(),
                &taken,
                &mut rand::thread_rng(),
            )
        };
        let participant = Participant {
            id: self.remote.push_key(),
            name: new.name,
            gender: new.gender,
            institution: new.institution,
            region: new.region,
            contact: new.contact,
            membership_status: new.membership_status,
            certificate_issued: new.certificate_issued,
            notes: new.notes,
            created_at,
            membership_id,
            engagement_score: 0,
            photo_url: new.photo_url,
            last_membership_card_generated_at: None,
        };

        let mut update = Map::new();
        insert_record(&mut update, &participant)?;
        if let Some(club_id) = club_id {
            insert_record(
                &mut update,
                &ClubMembership {
                    id: Some(relation_key(&participant.id, club_id)),
                    participant_id: participant.id.clone(),
                    club_id: club_id.to_owned(),
                    join_date: created_at,
                },
            )?;
        }
        self.write(update).await?;
        info!(id = %participant.id, membership_id = %participant.membership_id, "added participant");
        Ok(participant)
    }

    /// Overwrites the stored fields with those of `participant`. Optional fields that are
    /// `None` keep their stored value, so a photo cannot be removed this way.
    pub async fn update_participant(&self, participant: &Participant) -> Result<(), AppError> {
        self.patch(participant).await
    }

    /// Deletes the participant with their participations, club memberships, volunteer record
    /// and that volunteer's activities.
    #[instrument(skip(self))]
    pub async fn delete_participant(&self, id: &str) -> Result<(), AppError> {
        self.delete([DeletionTarget::Participant(id.to_owned())])
            .await
    }

    /// Like [`Self::delete_participant`] for many participants, in a single write.
    #[instrument(skip(self))]
    pub async fn delete_participants(&self, ids: &[&str]) -> Result<(), AppError> {
        let targets: Vec<DeletionTarget> = ids
            .iter()
            .map(|id| DeletionTarget::Participant((*id).to_owned()))
            .collect();
        self.delete(targets).await
    }

    /// Stamps the time the participant's membership card was last generated.
    #[instrument(skip(self))]
    pub async fn record_membership_card_generated(
        &self,
        id: &str,
    ) -> Result<DateTime<Utc>, AppError> {
        self.ensure_exists::<Participant>(id)?;
        let generated_at = Utc::now();
        let mut fields = Map::new();
        fields.insert(
            "lastMembershipCardGeneratedAt".to_owned(),
            Value::String(date::to_iso8601(&generated_at)),
        );
        self.remote
            .update(&Collection::Participants.record_path(id)?, fields)
            .await?;
        self.settle().await?;
        Ok(generated_at)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike as _, Utc};
    use pims_database::models::{NewClub, Region};

    use super::*;
    use crate::store::tests::{empty_store, new_participant};

    #[tokio::test]
    async fn created_participants_are_unique_and_dated() {
        let (_remote, store) = empty_store().await;
        let year = Utc::now().year().to_string();
        let mut ids = HashSet::new();
        for n in 0..20 {
            let participant = store
                .add_participant(new_participant(&format!("Member {n}")), None)
                .await
                .unwrap();
            assert!(participant.membership_id.starts_with("YIN-"));
            assert!(participant.membership_id.contains(&year));
            assert!(ids.insert(participant.id.clone()));
            assert!(store.snapshot().participants().contains_key(&participant.id));
        }
        let snapshot = store.snapshot();
        let membership_ids: HashSet<&str> = snapshot
            .participants()
            .values()
            .map(|participant| participant.membership_id.as_str())
            .collect();
        assert_eq!(membership_ids.len(), 20);
    }

    #[tokio::test]
    async fn participant_can_join_a_club_on_creation() {
        let (_remote, store) = empty_store().await;
        let club = store
            .add_club(NewClub {
                name: "KNUST Finance Club".to_owned(),
                description: String::new(),
                institution: "KNUST".to_owned(),
            })
            .await
            .unwrap();
        let participant = store
            .add_participant(new_participant("Akua"), Some(club.id.as_str()))
            .await
            .unwrap();
        let snapshot = store.snapshot();
        assert!(snapshot.has_club_membership(&participant.id, &club.id));
        assert_eq!(snapshot.members_of_club(&club.id)[0].id, participant.id);
        assert!(!store.add_club_membership(&participant.id, &club.id).await.unwrap());
    }

    #[tokio::test]
    async fn update_keeps_derived_fields_and_missing_records_are_rejected() {
        let (_remote, store) = empty_store().await;
        let mut participant = store
            .add_participant(new_participant("Esi"), None)
            .await
            .unwrap();
        participant.notes = "Moved to Volta".to_owned();
        participant.region = Region::Volta;
        store.update_participant(&participant).await.unwrap();
        let stored = store.snapshot().participants()[&participant.id].clone();
        assert_eq!(stored.notes, "Moved to Volta");
        assert_eq!(stored.membership_id, participant.membership_id);

        let generated_at = store
            .record_membership_card_generated(&participant.id)
            .await
            .unwrap();
        assert_eq!(
            store.snapshot().participants()[&participant.id]
                .last_membership_card_generated_at
                .map(|date| date.timestamp_millis()),
            Some(generated_at.timestamp_millis())
        );

        store.delete_participant(&participant.id).await.unwrap();
        assert!(matches!(
            store.update_participant(&participant).await,
            Err(AppError::NotFound {
                collection: Collection::Participants,
                ..
            })
        ));
        assert!(store
            .record_membership_card_generated(&participant.id)
            .await
            .is_err());
        assert!(store.snapshot().participants().is_empty());
    }
}
