pub mod codec;
pub mod date;
pub mod error;
pub mod models;
pub mod schema;

pub use error::DatabaseError;
use models::{Activity, Club, ClubMembership, Event, Participant, Participation, User, Volunteer};
pub use schema::Collection;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// An entity stored under `COLLECTION/id`.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
}

impl Record for Participant {
    const COLLECTION: Collection = Collection::Participants;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Event {
    const COLLECTION: Collection = Collection::Events;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Participation {
    const COLLECTION: Collection = Collection::Participations;

    fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Club {
    const COLLECTION: Collection = Collection::Clubs;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for ClubMembership {
    const COLLECTION: Collection = Collection::ClubMemberships;

    fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

impl Record for Volunteer {
    const COLLECTION: Collection = Collection::Volunteers;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Activity {
    const COLLECTION: Collection = Collection::Activities;

    fn id(&self) -> &str {
        &self.id
    }
}
