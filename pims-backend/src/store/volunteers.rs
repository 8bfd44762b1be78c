use pims_database::models::{Activity, NewActivity, NewVolunteer, Volunteer};
use pims_remote::RemoteStore;
use tracing::instrument;

use super::PimsStore;
use crate::cascade::DeletionTarget;
use crate::error::AppError;

impl<R: RemoteStore> PimsStore<R> {
    /// Registers a participant as volunteer. The console offers only participants that are not
    /// volunteers yet. This is not checked here.
    #[instrument(skip(self, new), fields(participant_id = %new.participant_id))]
    pub async fn add_volunteer(&self, new: NewVolunteer) -> Result<Volunteer, AppError> {
        let volunteer = Volunteer {
            id: self.remote.push_key(),
            participant_id: new.participant_id,
            role: new.role,
            status: new.status,
            start_date: new.start_date,
        };
        self.put(&volunteer).await?;
        Ok(volunteer)
    }

    pub async fn update_volunteer(&self, volunteer: &Volunteer) -> Result<(), AppError> {
        self.patch(volunteer).await
    }

    /// Deletes the volunteer record and its activities. The participant stays.
    #[instrument(skip(self))]
    pub async fn delete_volunteer(&self, id: &str) -> Result<(), AppError> {
        self.delete([DeletionTarget::Volunteer(id.to_owned())])
            .await
    }

    #[instrument(skip(self, new), fields(volunteer_id = %new.volunteer_id))]
    pub async fn add_activity(&self, new: NewActivity) -> Result<Activity, AppError> {
        let activity = Activity {
            id: self.remote.push_key(),
            volunteer_id: new.volunteer_id,
            event_id: new.event_id,
            description: new.description,
            hours: new.hours,
            date: new.date,
        };
        self.put(&activity).await?;
        Ok(activity)
    }

    /// A `None` `event_id` keeps the stored event. Deleting the event is what unlinks it.
    pub async fn update_activity(&self, activity: &Activity) -> Result<(), AppError> {
        self.patch(activity).await
    }

    #[instrument(skip(self))]
    pub async fn delete_activity(&self, id: &str) -> Result<(), AppError> {
        self.delete([DeletionTarget::Activity(id.to_owned())]).await
    }
}
