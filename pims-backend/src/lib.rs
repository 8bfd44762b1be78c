//! The synchronization and mutation layer of the participant information management system.
//!
//! [`PimsStore`] mirrors all collections of a [`RemoteStore`](pims_remote::RemoteStore) into a
//! local [`Snapshot`] and is the only component that writes to it.

pub mod access;
pub mod cascade;
pub mod error;
pub mod kpi;
pub mod membership;
pub mod seed;
pub mod snapshot;
pub mod store;
mod sync;

pub use error::AppError;
pub use kpi::Kpis;
pub use snapshot::Snapshot;
pub use store::PimsStore;
