use thiserror::Error;

use crate::schema::Collection;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to encode {collection}/{key}: {source}")]
    Encode {
        collection: Collection,
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to decode {collection}/{key}: {source}")]
    Decode {
        collection: Collection,
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Stored value at {collection}/{key} is not an object")]
    NotAnObject { collection: Collection, key: String },
}
