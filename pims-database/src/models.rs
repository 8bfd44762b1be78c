use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Ashanti,
    #[serde(rename = "Greater Accra")]
    GreaterAccra,
    Volta,
    Western,
    Eastern,
    Central,
}

impl Region {
    pub const ALL: [Self; 6] = [
        Self::Ashanti,
        Self::GreaterAccra,
        Self::Volta,
        Self::Western,
        Self::Eastern,
        Self::Central,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    Admin,
    Organizer,
    Viewer,
    #[serde(rename = "Volunteer Coordinator")]
    VolunteerCoordinator,
    #[serde(rename = "Club Executive")]
    ClubExecutive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolunteerRole {
    #[serde(rename = "Event Staff")]
    EventStaff,
    Mentor,
    Logistics,
    Administrative,
    Fundraising,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolunteerStatus {
    Active,
    Inactive,
    Pending,
}

/// A person tracked by the program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    #[serde(default)]
    pub institution: String,
    pub region: Region,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub membership_status: bool,
    #[serde(default)]
    pub certificate_issued: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(with = "date")]
    pub created_at: DateTime<Utc>,
    /// Human readable code printed on the membership card, e.g. `YIN-2024-0042`.
    #[serde(default)]
    pub membership_id: String,
    /// Number of participations referencing this participant. Derived, never stored.
    #[serde(skip)]
    pub engagement_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(
        default,
        with = "date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_membership_card_generated_at: Option<DateTime<Utc>>,
}

/// `year` always equals the calendar year of `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(with = "date")]
    pub date: DateTime<Utc>,
    pub year: i32,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
}

/// A participant attended or registered for an event. At most one per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub participant_id: String,
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    /// Stored in plain text. The login check is a convenience, not an access control boundary.
    #[serde(default)]
    pub password: String,
    pub role: UserRole,
    #[serde(with = "date")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_club_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub institution: String,
    #[serde(with = "date")]
    pub created_at: DateTime<Utc>,
}

/// At most one per (participant, club) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubMembership {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub participant_id: String,
    pub club_id: String,
    #[serde(with = "date")]
    pub join_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub id: String,
    pub participant_id: String,
    pub role: VolunteerRole,
    pub status: VolunteerStatus,
    #[serde(with = "date")]
    pub start_date: DateTime<Utc>,
}

/// Logged volunteer work. `event_id` is a weak reference and is cleared when the event goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub volunteer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default)]
    pub description: String,
    pub hours: f64,
    #[serde(with = "date")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParticipant {
    pub name: String,
    pub gender: Gender,
    pub institution: String,
    pub region: Region,
    pub contact: String,
    pub membership_status: bool,
    pub certificate_issued: bool,
    pub notes: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    #[serde(with = "date")]
    pub date: DateTime<Utc>,
    pub location: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub assigned_club_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClub {
    pub name: String,
    pub description: String,
    pub institution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVolunteer {
    pub participant_id: String,
    pub role: VolunteerRole,
    pub status: VolunteerStatus,
    #[serde(with = "date")]
    pub start_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
    pub volunteer_id: String,
    #[serde(default)]
    pub event_id: Option<String>,
    pub description: String,
    pub hours: f64,
    #[serde(with = "date")]
    pub date: DateTime<Utc>,
}
