//! Sample data written to an empty store on first start.

use chrono::{DateTime, TimeZone as _, Utc};
use pims_database::models::{
    Activity, Club, ClubMembership, Event, Gender, Participant, Participation, Region, User,
    UserRole, Volunteer, VolunteerRole, VolunteerStatus,
};
use pims_database::{codec, Collection, Record};
use pims_remote::RemoteStore;
use serde_json::{Map, Value};
use tracing::info;

use crate::error::AppError;
use crate::membership::relation_key;

const PARTICIPANT_NAMES: [&str; 15] = [
    "Ama Badu",
    "Kofi Mensah",
    "Adwoa Serwaa",
    "Yaw Owusu",
    "Akua Agyemang",
    "Kwame Appiah",
    "Esi Nkrumah",
    "Kweku Annan",
    "Abena Darko",
    "Kwasi Boakye",
    "Yaa Asantewaa",
    "Kojo Antwi",
    "Afia Amponsah",
    "Kwabena Asante",
    "Akosua Boateng",
];

const INSTITUTIONS: [&str; 5] = [
    "University of Ghana",
    "KNUST",
    "University of Cape Coast",
    "Ashesi University",
    "Accra Technical University",
];

#[derive(Debug, Clone)]
pub struct SeedData {
    pub users: Vec<User>,
    pub participants: Vec<Participant>,
    pub events: Vec<Event>,
    pub participations: Vec<Participation>,
    pub clubs: Vec<Club>,
    pub club_memberships: Vec<ClubMembership>,
    pub volunteers: Vec<Volunteer>,
    pub activities: Vec<Activity>,
}

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn users() -> Vec<User> {
    [
        ("user_super_admin", "super@yin.com", UserRole::SuperAdmin),
        ("user_admin", "admin@yin.com", UserRole::Admin),
        ("user_organizer", "organizer@yin.com", UserRole::Organizer),
        ("user_viewer", "viewer@yin.com", UserRole::Viewer),
    ]
    .into_iter()
    .zip(1..)
    .map(|((id, email, role), n)| User {
        id: id.to_owned(),
        email: email.to_owned(),
        password: "password".to_owned(),
        role,
        created_at: day(2023, 1, n),
        assigned_club_id: None,
    })
    .collect()
}

/// Ten participants joined in 2023, the rest in 2024. Every fifth one has lapsed.
fn participants() -> Vec<Participant> {
    PARTICIPANT_NAMES
        .iter()
        .zip(0_u32..)
        .map(|(name, index)| {
            let year = 2023 + i32::try_from(index / 10).unwrap_or_default();
            let n = index as usize;
            Participant {
                id: format!("participant_{}", index + 1),
                name: (*name).to_owned(),
                gender: if index % 3 == 0 {
                    Gender::Female
                } else {
                    Gender::Male
                },
                institution: INSTITUTIONS[n % INSTITUTIONS.len()].to_owned(),
                region: Region::ALL[n % Region::ALL.len()],
                contact: format!("+233 24 123 {}", 1000 + index),
                membership_status: index % 5 != 4,
                certificate_issued: false,
                notes: format!("Sample note for {name}."),
                created_at: day(year, index % 12 + 1, index % 28 + 1),
                membership_id: format!("YIN-{year}-{:03}", index % 10 + 1),
                engagement_score: 0,
                photo_url: None,
                last_membership_card_generated_at: None,
            }
        })
        .collect()
}

fn events() -> Vec<Event> {
    [
        ("Intro to Stock Market Investing", day(2024, 3, 15), "Accra", "Workshop"),
        ("Real Estate Investment Summit", day(2024, 5, 20), "Kumasi", "Conference"),
        ("YIN Annual Networking Gala", day(2024, 7, 10), "Accra", "Networking"),
        ("Financial Literacy for Students", day(2023, 11, 5), "Cape Coast", "Seminar"),
        ("The YIN Investment Challenge", day(2024, 8, 1), "Online", "Competition"),
    ]
    .into_iter()
    .zip(1..)
    .map(|((title, date, location, category), n)| Event {
        id: format!("event_{n}"),
        title: title.to_owned(),
        year: chrono::Datelike::year(&date),
        date,
        location: location.to_owned(),
        category: category.to_owned(),
    })
    .collect()
}

/// Event `i` is attended by `5 + 2i` consecutive participants starting at participant `3i`.
fn participations(participants: &[Participant], events: &[Event]) -> Vec<Participation> {
    events
        .iter()
        .enumerate()
        .flat_map(move |(i, event)| {
            (0..5 + 2 * i).map(move |k| {
                let participant = &participants[(3 * i + k) % participants.len()];
                Participation {
                    id: Some(relation_key(&participant.id, &event.id)),
                    participant_id: participant.id.clone(),
                    event_id: event.id.clone(),
                }
            })
        })
        .collect()
}

fn clubs() -> Vec<Club> {
    [
        (
            "Legon Investment Society",
            "Stock market study group of the University of Ghana.",
            INSTITUTIONS[0],
        ),
        (
            "KNUST Finance Club",
            "Personal finance and real estate workshops.",
            INSTITUTIONS[1],
        ),
        (
            "Ashesi Venture Circle",
            "Startup funding and venture capital.",
            INSTITUTIONS[3],
        ),
    ]
    .into_iter()
    .zip(1..)
    .map(|((name, description, institution), n)| Club {
        id: format!("club_{n}"),
        name: name.to_owned(),
        description: description.to_owned(),
        institution: institution.to_owned(),
        created_at: day(2023, 9, n),
    })
    .collect()
}

/// Every participant belongs to the club of their institution, if there is one.
fn club_memberships(participants: &[Participant], clubs: &[Club]) -> Vec<ClubMembership> {
    participants
        .iter()
        .filter_map(|participant| {
            let club = clubs
                .iter()
                .find(|club| club.institution == participant.institution)?;
            Some(ClubMembership {
                id: Some(relation_key(&participant.id, &club.id)),
                participant_id: participant.id.clone(),
                club_id: club.id.clone(),
                join_date: participant.created_at.max(club.created_at),
            })
        })
        .collect()
}

fn volunteers() -> Vec<Volunteer> {
    [
        ("participant_2", VolunteerRole::EventStaff, VolunteerStatus::Active, day(2023, 6, 1)),
        ("participant_5", VolunteerRole::Mentor, VolunteerStatus::Active, day(2023, 9, 15)),
        ("participant_9", VolunteerRole::Logistics, VolunteerStatus::Pending, day(2024, 1, 10)),
    ]
    .into_iter()
    .zip(1..)
    .map(|((participant_id, role, status, start_date), n)| Volunteer {
        id: format!("volunteer_{n}"),
        participant_id: participant_id.to_owned(),
        role,
        status,
        start_date,
    })
    .collect()
}

fn activities() -> Vec<Activity> {
    [
        ("volunteer_1", Some("event_1"), "Registration desk", 4.0, day(2024, 3, 15)),
        ("volunteer_1", Some("event_3"), "Guest check-in", 3.5, day(2024, 7, 10)),
        ("volunteer_2", Some("event_2"), "Mentoring session", 2.0, day(2024, 5, 20)),
        ("volunteer_2", None, "Online mentoring for new members", 1.5, day(2024, 6, 1)),
        ("volunteer_3", Some("event_5"), "Challenge portal setup", 5.0, day(2024, 8, 1)),
    ]
    .into_iter()
    .zip(1..)
    .map(|((volunteer_id, event_id, description, hours, date), n)| Activity {
        id: format!("activity_{n}"),
        volunteer_id: volunteer_id.to_owned(),
        event_id: event_id.map(ToOwned::to_owned),
        description: description.to_owned(),
        hours,
        date,
    })
    .collect()
}

impl SeedData {
    #[must_use]
    pub fn new() -> Self {
        let participants = participants();
        let events = events();
        let clubs = clubs();
        Self {
            users: users(),
            participations: participations(&participants, &events),
            club_memberships: club_memberships(&participants, &clubs),
            participants,
            events,
            clubs,
            volunteers: volunteers(),
            activities: activities(),
        }
    }

    /// One value per collection, in the order they are written.
    pub fn collections(&self) -> Result<Vec<(Collection, Value)>, AppError> {
        Ok(vec![
            (Collection::Users, encode_all(&self.users)?),
            (Collection::Participants, encode_all(&self.participants)?),
            (Collection::Events, encode_all(&self.events)?),
            (Collection::Participations, encode_all(&self.participations)?),
            (Collection::Clubs, encode_all(&self.clubs)?),
            (Collection::ClubMemberships, encode_all(&self.club_memberships)?),
            (Collection::Volunteers, encode_all(&self.volunteers)?),
            (Collection::Activities, encode_all(&self.activities)?),
        ])
    }
}

impl Default for SeedData {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_all<R: Record>(records: &[R]) -> Result<Value, AppError> {
    records
        .iter()
        .map(|record| -> Result<(String, Value), AppError> {
            Ok((record.id().to_owned(), Value::Object(codec::encode(record)?)))
        })
        .collect::<Result<Map<String, Value>, AppError>>()
        .map(Value::Object)
}

fn is_empty(collection: Option<&Value>) -> bool {
    match collection {
        None => true,
        Some(Value::Object(children)) => children.is_empty(),
        Some(Value::Array(children)) => children.iter().all(Value::is_null),
        Some(_) => false,
    }
}

/// Seeds the store if it has no participants. Returns whether it did.
///
/// Collections are written one after another. An interrupted seed is not repaired, and as soon
/// as participants exist it is not retried either.
pub async fn seed_if_empty<R: RemoteStore>(remote: &R) -> Result<bool, AppError> {
    let participants = remote.get(&Collection::Participants.path()).await?;
    if !is_empty(participants.as_ref()) {
        return Ok(false);
    }
    info!("participants are empty, seeding sample data");
    for (collection, value) in SeedData::new().collections()? {
        remote.set(&collection.path(), value).await?;
    }
    Ok(true)
}
