use core::fmt::{self, Display};

use pims_remote::Path;

/// The top level subtrees of the store, one per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Participants,
    Events,
    Participations,
    Users,
    Clubs,
    ClubMemberships,
    Volunteers,
    Activities,
}

impl Collection {
    pub const ALL: [Self; 8] = [
        Self::Participants,
        Self::Events,
        Self::Participations,
        Self::Users,
        Self::Clubs,
        Self::ClubMemberships,
        Self::Volunteers,
        Self::Activities,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Participants => "participants",
            Self::Events => "events",
            Self::Participations => "participations",
            Self::Users => "users",
            Self::Clubs => "clubs",
            Self::ClubMemberships => "clubMemberships",
            Self::Volunteers => "volunteers",
            Self::Activities => "activities",
        }
    }

    #[must_use]
    pub fn path(self) -> Path {
        Path::single(self.key())
    }

    /// `collection/id`, relative to the root.
    pub fn record_path(self, id: &str) -> pims_remote::Result<Path> {
        self.path().child(id)
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
