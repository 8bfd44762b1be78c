use chrono::Datelike as _;
use pims_database::models::{Event, NewEvent};
use pims_remote::RemoteStore;
use tracing::instrument;

use super::PimsStore;
use crate::cascade::DeletionTarget;
use crate::error::AppError;

impl<R: RemoteStore> PimsStore<R> {
    #[instrument(skip(self, new), fields(title = %new.title))]
    pub async fn add_event(&self, new: NewEvent) -> Result<Event, AppError> {
        let event = Event {
            id: self.remote.push_key(),
            title: new.title,
            year: new.date.year(),
            date: new.date,
            location: new.location,
            category: new.category,
        };
        self.put(&event).await?;
        Ok(event)
    }

    /// Writes `event` with `year` taken from its date, whatever the caller put there.
    pub async fn update_event(&self, event: Event) -> Result<Event, AppError> {
        let event = Event {
            year: event.date.year(),
            ..event
        };
        self.patch(&event).await?;
        Ok(event)
    }

    /// Deletes the event and its participations. Activities logged at the event are kept
    /// without an event.
    #[instrument(skip(self))]
    pub async fn delete_event(&self, id: &str) -> Result<(), AppError> {
        self.delete([DeletionTarget::Event(id.to_owned())]).await
    }
}
