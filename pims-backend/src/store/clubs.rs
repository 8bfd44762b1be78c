use chrono::Utc;
use pims_database::models::{Club, NewClub};
use pims_remote::RemoteStore;
use tracing::instrument;

use super::PimsStore;
use crate::cascade::DeletionTarget;
use crate::error::AppError;

impl<R: RemoteStore> PimsStore<R> {
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn add_club(&self, new: NewClub) -> Result<Club, AppError> {
        let club = Club {
            id: self.remote.push_key(),
            name: new.name,
            description: new.description,
            institution: new.institution,
            created_at: Utc::now(),
        };
        self.put(&club).await?;
        Ok(club)
    }

    pub async fn update_club(&self, club: &Club) -> Result<(), AppError> {
        self.patch(club).await
    }

    /// Deletes the club with its memberships. Club executives assigned to it are unassigned.
    #[instrument(skip(self))]
    pub async fn delete_club(&self, id: &str) -> Result<(), AppError> {
        self.delete([DeletionTarget::Club(id.to_owned())]).await
    }
}
