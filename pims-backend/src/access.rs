//! Which parts of the console a user gets to see. These checks gate the user interface only:
//! [`PimsStore`](crate::PimsStore) performs every operation regardless of who asks.

use pims_database::models::{User, UserRole};

pub trait Capabilities {
    fn can_manage_participants(&self) -> bool;

    /// Create and edit events and registrations.
    fn can_manage_events(&self) -> bool;

    /// Delete events and registrations.
    fn can_delete_events(&self) -> bool;

    fn can_manage_clubs(&self) -> bool;

    /// Add and remove members of `club_id`. Club executives may do this for their own club.
    fn can_manage_club_members(&self, club_id: &str) -> bool;

    fn can_manage_volunteers(&self) -> bool;

    fn can_manage_users(&self) -> bool;
}

impl Capabilities for User {
    fn can_manage_participants(&self) -> bool {
        matches!(self.role, UserRole::SuperAdmin | UserRole::Admin)
    }

    fn can_manage_events(&self) -> bool {
        matches!(
            self.role,
            UserRole::SuperAdmin | UserRole::Admin | UserRole::Organizer
        )
    }

    fn can_delete_events(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    fn can_manage_clubs(&self) -> bool {
        self.can_manage_events()
    }

    fn can_manage_club_members(&self, club_id: &str) -> bool {
        self.can_manage_clubs()
            || (self.role == UserRole::ClubExecutive
                && self.assigned_club_id.as_deref() == Some(club_id))
    }

    fn can_manage_volunteers(&self) -> bool {
        matches!(
            self.role,
            UserRole::SuperAdmin | UserRole::Admin | UserRole::VolunteerCoordinator
        )
    }

    fn can_manage_users(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }
}
