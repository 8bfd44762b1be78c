use chrono::Utc;
use pims_database::models::{NewUser, User};
use pims_remote::RemoteStore;
use tracing::instrument;

use super::PimsStore;
use crate::cascade::DeletionTarget;
use crate::error::AppError;

impl<R: RemoteStore> PimsStore<R> {
    #[instrument(skip(self, new), fields(email = %new.email, role = ?new.role))]
    pub async fn add_user(&self, new: NewUser) -> Result<User, AppError> {
        let user = User {
            id: self.remote.push_key(),
            email: new.email,
            password: new.password,
            role: new.role,
            created_at: Utc::now(),
            assigned_club_id: new.assigned_club_id,
        };
        self.put(&user).await?;
        Ok(user)
    }

    /// Overwrites the stored fields with those of `user`. A `None` `assigned_club_id` keeps the
    /// stored assignment; only deleting the club clears it.
    pub async fn update_user(&self, user: &User) -> Result<(), AppError> {
        self.patch(user).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        self.delete([DeletionTarget::User(id.to_owned())]).await
    }
}
