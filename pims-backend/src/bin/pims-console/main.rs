use pims_backend::{AppError, PimsStore};
use pims_config::get_config;
use pims_database::Collection;
use pims_remote::MemoryStore;
use pims_telemetry::setup_logging;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!(%error, "pims-console failed");
        eprintln!("{error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = get_config()?;
    setup_logging(config.log_filter.as_deref())?;

    let remote = MemoryStore::spawn();
    let store = PimsStore::connect(remote, &config).await?;
    let snapshot = store.snapshot();

    let kpis = snapshot.kpis();
    info!(
        total_participants = kpis.total_participants,
        active_members = kpis.active_members,
        total_events = kpis.total_events,
        average_participation_rate = kpis.average_participation_rate,
        "dashboard"
    );
    for collection in Collection::ALL {
        let count = match collection {
            Collection::Participants => snapshot.participants().len(),
            Collection::Events => snapshot.events().len(),
            Collection::Participations => snapshot.participations().len(),
            Collection::Users => snapshot.users().len(),
            Collection::Clubs => snapshot.clubs().len(),
            Collection::ClubMemberships => snapshot.club_memberships().len(),
            Collection::Volunteers => snapshot.volunteers().len(),
            Collection::Activities => snapshot.activities().len(),
        };
        info!(%collection, count, "mirrored");
    }
    if let Some(top) = snapshot
        .participants()
        .values()
        .max_by_key(|participant| participant.engagement_score)
    {
        info!(
            name = %top.name,
            membership_id = %top.membership_id,
            engagement_score = top.engagement_score,
            "most engaged participant"
        );
    }

    store.close();
    Ok(())
}
