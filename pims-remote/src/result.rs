use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid path {0:?}")]
    InvalidPath(String),
    #[error("invalid key {0:?}, keys must be non-empty and may not contain . $ # [ ] or /")]
    InvalidKey(String),
    #[error("the store task exited. this may be because every handle was dropped or because it crashed")]
    StoreTaskExited,
    #[error("a caller that issued a command has exited before receiving the response")]
    CommandCallerExited,
    #[error("write to {path} was rejected: {reason}")]
    Rejected { path: String, reason: String },
}

pub type Result<T> = core::result::Result<T, Error>;
