use pims_config::ConfigError;
use pims_database::{Collection, DatabaseError};
use pims_telemetry::TelemetryError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("remote store error: {0}")]
    Remote(#[from] pims_remote::Error),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("{collection}/{id} does not exist")]
    NotFound { collection: Collection, id: String },
    #[error("the sync task exited, the local mirror is no longer updated")]
    SyncTaskExited,
}
