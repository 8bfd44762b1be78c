//! The read model: a local mirror of every collection plus the values derived from them.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use pims_database::models::{
    Activity, Club, ClubMembership, Event, Participant, Participation, User, Volunteer,
};
use pims_database::{codec, Collection, Record};
use pims_remote::TreeEvent;
use tracing::warn;

use crate::kpi::{self, Kpis};

/// A record type with a table in the [`Snapshot`].
pub trait Table: Record {
    fn table(snapshot: &Snapshot) -> &Arc<BTreeMap<String, Self>>;

    fn table_mut(snapshot: &mut Snapshot) -> &mut Arc<BTreeMap<String, Self>>;
}

macro_rules! tables {
    ($($variant:ident => $field:ident: $record:ty),* $(,)?) => {
        /// Immutable view of all collections, keyed by id.
        ///
        /// Cloning is cheap. Tables are shared between snapshots and only copied when a change
        /// touches them.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct Snapshot {
            $($field: Arc<BTreeMap<String, $record>>,)*
            kpis: Kpis,
            synced: BTreeSet<Collection>,
        }

        impl Snapshot {
            $(
                #[must_use]
                pub fn $field(&self) -> &BTreeMap<String, $record> {
                    &self.$field
                }
            )*

            pub(crate) fn apply(&mut self, collection: Collection, event: TreeEvent) {
                match collection {
                    $(Collection::$variant => self.apply_to::<$record>(event),)*
                }
                self.synced.insert(collection);
            }

            #[cfg(test)]
            pub(crate) fn remove_record(&mut self, collection: Collection, id: &str) {
                match collection {
                    $(Collection::$variant => {
                        self.remove::<$record>(id);
                    })*
                }
            }
        }

        $(
            impl Table for $record {
                fn table(snapshot: &Snapshot) -> &Arc<BTreeMap<String, Self>> {
                    &snapshot.$field
                }

                fn table_mut(snapshot: &mut Snapshot) -> &mut Arc<BTreeMap<String, Self>> {
                    &mut snapshot.$field
                }
            }
        )*
    };
}

tables! {
    Participants => participants: Participant,
    Events => events: Event,
    Participations => participations: Participation,
    Users => users: User,
    Clubs => clubs: Club,
    ClubMemberships => club_memberships: ClubMembership,
    Volunteers => volunteers: Volunteer,
    Activities => activities: Activity,
}

impl Snapshot {
    #[must_use]
    pub fn get<R: Table>(&self, id: &str) -> Option<&R> {
        R::table(self).get(id)
    }

    #[must_use]
    pub fn contains<R: Table>(&self, id: &str) -> bool {
        R::table(self).contains_key(id)
    }

    #[must_use]
    pub const fn kpis(&self) -> &Kpis {
        &self.kpis
    }

    /// Whether the first value of `collection` has arrived.
    #[must_use]
    pub fn is_synced(&self, collection: Collection) -> bool {
        self.synced.contains(&collection)
    }

    #[must_use]
    pub fn is_fully_synced(&self) -> bool {
        Collection::ALL
            .iter()
            .all(|collection| self.synced.contains(collection))
    }

    pub(crate) fn insert<R: Table>(&mut self, record: R) {
        Arc::make_mut(R::table_mut(self)).insert(record.id().to_owned(), record);
    }

    pub(crate) fn remove<R: Table>(&mut self, id: &str) -> Option<R> {
        if !R::table(self).contains_key(id) {
            return None;
        }
        Arc::make_mut(R::table_mut(self)).remove(id)
    }

    fn apply_to<R: Table>(&mut self, event: TreeEvent) {
        match event {
            TreeEvent::Snapshot(value) => {
                let records = codec::decode_children::<R>(value)
                    .into_iter()
                    .filter_map(|record| {
                        record
                            .map_err(|error| warn!(%error, "skipping undecodable record"))
                            .ok()
                    })
                    .map(|record| (record.id().to_owned(), record))
                    .collect();
                *R::table_mut(self) = Arc::new(records);
            }
            TreeEvent::Child {
                key,
                value: Some(value),
            } => match codec::decode::<R>(&key, value) {
                Ok(record) => self.insert(record),
                Err(error) => {
                    warn!(%error, "dropping undecodable record");
                    self.remove::<R>(&key);
                }
            },
            TreeEvent::Child { key, value: None } => {
                self.remove::<R>(&key);
            }
        }
    }

    /// Recomputes engagement scores and KPIs. Participants are only copied if a score changed.
    pub(crate) fn refresh_derived(&mut self) {
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for participation in self.participations.values() {
            *counts.entry(participation.participant_id.as_str()).or_default() += 1;
        }
        let score = |id: &str| counts.get(id).copied().unwrap_or_default();
        if self
            .participants
            .values()
            .any(|participant| participant.engagement_score != score(&participant.id))
        {
            for participant in Arc::make_mut(&mut self.participants).values_mut() {
                participant.engagement_score = score(&participant.id);
            }
        }

        self.kpis = Kpis {
            total_participants: self.participants.len(),
            active_members: self
                .participants
                .values()
                .filter(|participant| participant.membership_status)
                .count(),
            total_events: self.events.len(),
            average_participation_rate: kpi::average_participation_rate(
                self.participations.len(),
                self.participants.len(),
                self.events.len(),
            ),
        };
    }

    /// Card verification: the participant whose card shows `membership_id`.
    #[must_use]
    pub fn find_participant_by_membership_id(&self, membership_id: &str) -> Option<&Participant> {
        let membership_id = membership_id.trim();
        self.participants
            .values()
            .find(|participant| participant.membership_id == membership_id)
    }

    /// Email is compared case-insensitively, the password verbatim. This is a convenience for
    /// the console and protects nothing.
    #[must_use]
    pub fn authenticate(&self, email: &str, password: &str) -> Option<&User> {
        let email = email.trim();
        self.users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email) && user.password == password)
    }

    #[must_use]
    pub fn volunteer_hours(&self, volunteer_id: &str) -> f64 {
        self.activities
            .values()
            .filter(|activity| activity.volunteer_id == volunteer_id)
            .map(|activity| activity.hours)
            .sum()
    }

    #[must_use]
    pub fn volunteer_for_participant(&self, participant_id: &str) -> Option<&Volunteer> {
        self.volunteers
            .values()
            .find(|volunteer| volunteer.participant_id == participant_id)
    }

    #[must_use]
    pub fn has_participation(&self, participant_id: &str, event_id: &str) -> bool {
        self.participations.values().any(|participation| {
            participation.participant_id == participant_id && participation.event_id == event_id
        })
    }

    #[must_use]
    pub fn has_club_membership(&self, participant_id: &str, club_id: &str) -> bool {
        self.club_memberships.values().any(|membership| {
            membership.participant_id == participant_id && membership.club_id == club_id
        })
    }

    /// Participants registered for the event, each once.
    #[must_use]
    pub fn participants_of_event(&self, event_id: &str) -> Vec<&Participant> {
        let ids: BTreeSet<&str> = self
            .participations
            .values()
            .filter(|participation| participation.event_id == event_id)
            .map(|participation| participation.participant_id.as_str())
            .collect();
        ids.into_iter()
            .filter_map(|id| self.participants.get(id))
            .collect()
    }

    #[must_use]
    pub fn members_of_club(&self, club_id: &str) -> Vec<&Participant> {
        let ids: BTreeSet<&str> = self
            .club_memberships
            .values()
            .filter(|membership| membership.club_id == club_id)
            .map(|membership| membership.participant_id.as_str())
            .collect();
        ids.into_iter()
            .filter_map(|id| self.participants.get(id))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{TimeZone as _, Utc};
    use pims_database::models::{Gender, Region, UserRole};
    use serde_json::json;

    use super::*;

    pub fn participant(id: &str, membership_id: &str) -> Participant {
        Participant {
            id: id.to_owned(),
            name: format!("Participant {id}"),
            gender: Gender::Other,
            institution: "KNUST".to_owned(),
            region: Region::Ashanti,
            contact: String::new(),
            membership_status: true,
            certificate_issued: false,
            notes: String::new(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            membership_id: membership_id.to_owned(),
            engagement_score: 0,
            photo_url: None,
            last_membership_card_generated_at: None,
        }
    }

    pub fn event(id: &str) -> Event {
        Event {
            id: id.to_owned(),
            title: format!("Event {id}"),
            date: Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap(),
            year: 2024,
            location: "Accra".to_owned(),
            category: "Workshop".to_owned(),
        }
    }

    pub fn participation(key: &str, participant_id: &str, event_id: &str) -> Participation {
        Participation {
            id: Some(key.to_owned()),
            participant_id: participant_id.to_owned(),
            event_id: event_id.to_owned(),
        }
    }

    #[test]
    fn engagement_scores_and_kpis_follow_participations() {
        let mut snapshot = Snapshot::default();
        for n in 1..=10 {
            snapshot.insert(participant(&format!("p{n}"), &format!("YIN-2024-{n:04}")));
        }
        snapshot.insert(event("e1"));
        snapshot.insert(event("e2"));
        for (key, p, e) in [
            ("k1", "p1", "e1"),
            ("k2", "p1", "e2"),
            ("k3", "p2", "e1"),
            ("k4", "p3", "e1"),
            ("k5", "p4", "e2"),
        ] {
            snapshot.insert(participation(key, p, e));
        }
        snapshot.refresh_derived();

        assert_eq!(snapshot.participants()["p1"].engagement_score, 2);
        assert_eq!(snapshot.participants()["p2"].engagement_score, 1);
        assert_eq!(snapshot.participants()["p10"].engagement_score, 0);
        assert_eq!(
            *snapshot.kpis(),
            Kpis {
                total_participants: 10,
                active_members: 10,
                total_events: 2,
                average_participation_rate: 25.0,
            }
        );

        snapshot.remove::<Participation>("k1");
        snapshot.refresh_derived();
        assert_eq!(snapshot.participants()["p1"].engagement_score, 1);
    }

    #[test]
    fn unchanged_scores_keep_the_participants_table_shared() {
        let mut snapshot = Snapshot::default();
        snapshot.insert(participant("p1", "YIN-2024-0001"));
        snapshot.refresh_derived();
        let before = snapshot.clone();
        snapshot.insert(event("e1"));
        snapshot.refresh_derived();
        assert!(Arc::ptr_eq(&before.participants, &snapshot.participants));
        assert!(!Arc::ptr_eq(&before.events, &snapshot.events));
    }

    #[test]
    fn events_replace_and_patch_tables() {
        let mut snapshot = Snapshot::default();
        assert!(!snapshot.is_synced(Collection::Events));
        snapshot.apply(
            Collection::Events,
            TreeEvent::Snapshot(Some(json!({
                "e1": { "title": "Gala", "date": "2024-07-10", "year": 2024 },
                "e2": { "title": "Broken" },
            }))),
        );
        assert!(snapshot.is_synced(Collection::Events));
        assert_eq!(snapshot.events().keys().collect::<Vec<_>>(), ["e1"]);
        assert_eq!(snapshot.events()["e1"].location, "");

        snapshot.apply(
            Collection::Events,
            TreeEvent::Child {
                key: "e3".to_owned(),
                value: Some(json!({ "title": "Summit", "date": "2024-05-20", "year": 2024 })),
            },
        );
        snapshot.apply(
            Collection::Events,
            TreeEvent::Child {
                key: "e1".to_owned(),
                value: None,
            },
        );
        assert_eq!(snapshot.events().keys().collect::<Vec<_>>(), ["e3"]);

        snapshot.apply(Collection::Events, TreeEvent::Snapshot(None));
        assert!(snapshot.events().is_empty());
        assert!(!snapshot.is_fully_synced());
    }

    #[test]
    fn queries() {
        let mut snapshot = Snapshot::default();
        snapshot.insert(participant("p1", "YIN-2024-0001"));
        snapshot.insert(participant("p2", "YIN-2024-0002"));
        snapshot.insert(participation("k1", "p1", "e1"));
        snapshot.insert(participation("k2", "p1", "e1"));
        snapshot.insert(participation("k3", "p2", "e2"));
        snapshot.insert(User {
            id: "u1".to_owned(),
            email: "Admin@yin.com".to_owned(),
            password: "password".to_owned(),
            role: UserRole::Admin,
            created_at: Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap(),
            assigned_club_id: None,
        });
        for (id, hours) in [("a1", 2.5), ("a2", 1.0)] {
            snapshot.insert(Activity {
                id: id.to_owned(),
                volunteer_id: "v1".to_owned(),
                event_id: None,
                description: String::new(),
                hours,
                date: Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap(),
            });
        }

        assert_eq!(
            snapshot
                .find_participant_by_membership_id(" YIN-2024-0002 ")
                .map(|participant| participant.id.as_str()),
            Some("p2")
        );
        assert!(snapshot.find_participant_by_membership_id("YIN-2024-0003").is_none());
        assert!(snapshot.authenticate("admin@YIN.com", "password").is_some());
        assert!(snapshot.authenticate("admin@yin.com", "Password").is_none());
        assert!((snapshot.volunteer_hours("v1") - 3.5).abs() < f64::EPSILON);
        assert!(snapshot.volunteer_hours("v2") == 0.0);
        assert_eq!(snapshot.participants_of_event("e1").len(), 1);
        assert!(snapshot.has_participation("p2", "e2"));
        assert!(!snapshot.has_participation("p2", "e1"));
        assert!(snapshot.members_of_club("c1").is_empty());
    }
}
