use thiserror::Error;

#[derive(Debug, Error)]
pub enum NametabError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Persist: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("malformed record, need a name triple plus an id: {0:?}")]
    MalformedRecord(String),

    #[error("record id is not an unsigned integer: {0:?}")]
    BadId(String),
}

pub type Result<T> = std::result::Result<T, NametabError>;
