use chrono::Utc;
use pims_database::models::{ClubMembership, Participation};
use pims_remote::RemoteStore;
use tracing::{debug, instrument};

use super::PimsStore;
use crate::cascade::DeletionTarget;
use crate::error::AppError;
use crate::membership::relation_key;

impl<R: RemoteStore> PimsStore<R> {
    /// Registers the participant for the event. Returns `false` without writing if the local
    /// mirror already has that registration.
    ///
    /// Registrations are stored under a key derived from the pair, so even when two clients
    /// register the same pair at once only one record results.
    #[instrument(skip(self))]
    pub async fn add_participation(
        &self,
        participant_id: &str,
        event_id: &str,
    ) -> Result<bool, AppError> {
        if self
            .snapshot
            .borrow()
            .has_participation(participant_id, event_id)
        {
            debug!("already registered");
            return Ok(false);
        }
        self.put(&Participation {
            id: Some(relation_key(participant_id, event_id)),
            participant_id: participant_id.to_owned(),
            event_id: event_id.to_owned(),
        })
        .await?;
        Ok(true)
    }

    #[instrument(skip(self))]
    pub async fn delete_participation(
        &self,
        participant_id: &str,
        event_id: &str,
    ) -> Result<(), AppError> {
        self.delete([DeletionTarget::Participation {
            participant_id: participant_id.to_owned(),
            event_id: event_id.to_owned(),
        }])
        .await
    }

    /// Same contract as [`Self::add_participation`].
    #[instrument(skip(self))]
    pub async fn add_club_membership(
        &self,
        participant_id: &str,
        club_id: &str,
    ) -> Result<bool, AppError> {
        if self
            .snapshot
            .borrow()
            .has_club_membership(participant_id, club_id)
        {
            debug!("already a member");
            return Ok(false);
        }
        self.put(&ClubMembership {
            id: Some(relation_key(participant_id, club_id)),
            participant_id: participant_id.to_owned(),
            club_id: club_id.to_owned(),
            join_date: Utc::now(),
        })
        .await?;
        Ok(true)
    }

    #[instrument(skip(self))]
    pub async fn delete_club_membership(
        &self,
        participant_id: &str,
        club_id: &str,
    ) -> Result<(), AppError> {
        self.delete([DeletionTarget::ClubMembership {
            participant_id: participant_id.to_owned(),
            club_id: club_id.to_owned(),
        }])
        .await
    }
}
