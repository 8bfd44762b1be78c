//! Deletion planning. Given what to delete, collects every dependent record across all
//! collections so the whole cascade can be written as one multi-location update.
//!
//! - participant: its participations and club memberships, its volunteer records and their
//!   activities
//! - event: its participations. Activities logged at the event lose their `eventId`.
//! - club: its memberships. Club executives assigned to it lose their `assignedClubId`.
//! - volunteer: its activities

use std::collections::BTreeSet;

use pims_database::Collection;
use serde_json::{Map, Value};

use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionTarget {
    Participant(String),
    Event(String),
    Club(String),
    Volunteer(String),
    User(String),
    Activity(String),
    /// Every participation of the pair.
    Participation {
        participant_id: String,
        event_id: String,
    },
    /// Every membership of the pair.
    ClubMembership {
        participant_id: String,
        club_id: String,
    },
}

/// A weak reference that is cleared instead of deleting the record holding it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Unlink {
    ActivityEvent { activity_id: String },
    UserClub { user_id: String },
}

impl Unlink {
    fn location(&self) -> String {
        match self {
            Self::ActivityEvent { activity_id } => {
                format!("{}/{activity_id}/eventId", Collection::Activities)
            }
            Self::UserClub { user_id } => format!("{}/{user_id}/assignedClubId", Collection::Users),
        }
    }

    fn record(&self) -> (Collection, &str) {
        match self {
            Self::ActivityEvent { activity_id } => (Collection::Activities, activity_id.as_str()),
            Self::UserClub { user_id } => (Collection::Users, user_id.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionPlan {
    removals: BTreeSet<(Collection, String)>,
    unlinks: BTreeSet<Unlink>,
}

impl DeletionPlan {
    #[must_use]
    pub fn new(snapshot: &Snapshot, targets: impl IntoIterator<Item = DeletionTarget>) -> Self {
        let mut plan = Self::default();
        for target in targets {
            plan.add(snapshot, target);
        }
        let removals = &plan.removals;
        plan.unlinks.retain(|unlink| {
            let (collection, id) = unlink.record();
            !removals.contains(&(collection, id.to_owned()))
        });
        plan
    }

    fn add(&mut self, snapshot: &Snapshot, target: DeletionTarget) {
        match target {
            DeletionTarget::Participant(id) => {
                self.remove_matching(
                    Collection::Participations,
                    snapshot.participations(),
                    |participation| participation.participant_id == id,
                );
                self.remove_matching(
                    Collection::ClubMemberships,
                    snapshot.club_memberships(),
                    |membership| membership.participant_id == id,
                );
                for (volunteer_id, _) in snapshot
                    .volunteers()
                    .iter()
                    .filter(|(_, volunteer)| volunteer.participant_id == id)
                {
                    self.add_volunteer(snapshot, volunteer_id);
                }
                self.removals.insert((Collection::Participants, id));
            }
            DeletionTarget::Event(id) => {
                self.remove_matching(
                    Collection::Participations,
                    snapshot.participations(),
                    |participation| participation.event_id == id,
                );
                self.unlinks.extend(
                    snapshot
                        .activities()
                        .iter()
                        .filter(|(_, activity)| activity.event_id.as_deref() == Some(id.as_str()))
                        .map(|(activity_id, _)| Unlink::ActivityEvent {
                            activity_id: activity_id.clone(),
                        }),
                );
                self.removals.insert((Collection::Events, id));
            }
            DeletionTarget::Club(id) => {
                self.remove_matching(
                    Collection::ClubMemberships,
                    snapshot.club_memberships(),
                    |membership| membership.club_id == id,
                );
                self.unlinks.extend(
                    snapshot
                        .users()
                        .iter()
                        .filter(|(_, user)| user.assigned_club_id.as_deref() == Some(id.as_str()))
                        .map(|(user_id, _)| Unlink::UserClub {
                            user_id: user_id.clone(),
                        }),
                );
                self.removals.insert((Collection::Clubs, id));
            }
            DeletionTarget::Volunteer(id) => self.add_volunteer(snapshot, &id),
            DeletionTarget::User(id) => {
                self.removals.insert((Collection::Users, id));
            }
            DeletionTarget::Activity(id) => {
                self.removals.insert((Collection::Activities, id));
            }
            DeletionTarget::Participation {
                participant_id,
                event_id,
            } => self.remove_matching(
                Collection::Participations,
                snapshot.participations(),
                |participation| {
                    participation.participant_id == participant_id
                        && participation.event_id == event_id
                },
            ),
            DeletionTarget::ClubMembership {
                participant_id,
                club_id,
            } => self.remove_matching(
                Collection::ClubMemberships,
                snapshot.club_memberships(),
                |membership| membership.participant_id == participant_id && membership.club_id == club_id,
            ),
        }
    }

    fn add_volunteer(&mut self, snapshot: &Snapshot, volunteer_id: &str) {
        self.remove_matching(
            Collection::Activities,
            snapshot.activities(),
            |activity| activity.volunteer_id == volunteer_id,
        );
        self.removals
            .insert((Collection::Volunteers, volunteer_id.to_owned()));
    }

    fn remove_matching<'a, R: 'a>(
        &mut self,
        collection: Collection,
        table: impl IntoIterator<Item = (&'a String, &'a R)>,
        mut predicate: impl FnMut(&R) -> bool,
    ) {
        self.removals.extend(
            table
                .into_iter()
                .filter(|&(_, record)| predicate(record))
                .map(|(id, _)| (collection, id.clone())),
        );
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.unlinks.is_empty()
    }

    /// The plan as one root-relative multi-location update.
    #[must_use]
    pub fn to_update(&self) -> Map<String, Value> {
        self.removals
            .iter()
            .map(|(collection, id)| format!("{collection}/{id}"))
            .chain(self.unlinks.iter().map(Unlink::location))
            .map(|location| (location, Value::Null))
            .collect()
    }
}
